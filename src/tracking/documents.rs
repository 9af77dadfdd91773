//! Downloadable documents available for a chain

use serde::{Deserialize, Serialize};

use super::chain::Chain;
use crate::core::identity::RecordId;
use crate::entities::{FinalStatus, InvoiceStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Report,
    Invoice,
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentKind::Report => write!(f, "report"),
            DocumentKind::Invoice => write!(f, "invoice"),
        }
    }
}

/// A document the customer can download
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    #[serde(rename = "type")]
    pub kind: DocumentKind,
    pub id: RecordId,
    /// Human-facing number (invoice number) when the document has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    pub status: String,
    pub downloadable: bool,
}

/// Documents a chain currently exposes, report first
pub fn documents(chain: &Chain) -> Vec<DocumentRef> {
    let mut docs = Vec::with_capacity(2);

    if let Some(report) = &chain.report {
        if report.final_status == FinalStatus::Approved {
            docs.push(DocumentRef {
                kind: DocumentKind::Report,
                id: report.id.clone(),
                number: None,
                status: report.final_status.to_string(),
                downloadable: true,
            });
        }
    }

    if let Some(invoice) = &chain.invoice {
        if invoice_published(invoice.status) {
            docs.push(DocumentRef {
                kind: DocumentKind::Invoice,
                id: invoice.id.clone(),
                number: Some(invoice.invoice_no.clone()),
                status: invoice.status.to_string(),
                downloadable: true,
            });
        }
    }

    docs
}

fn invoice_published(status: InvoiceStatus) -> bool {
    match status {
        InvoiceStatus::Issued | InvoiceStatus::Sent | InvoiceStatus::Paid => true,
        InvoiceStatus::Draft | InvoiceStatus::Cancelled => false,
    }
}
