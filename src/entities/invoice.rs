//! INVC record type - Invoice raised for an approved report

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::identity::{RecordId, RecordPrefix};
use crate::core::record::Record;

/// Billing state of an invoice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum InvoiceStatus {
    #[default]
    Draft,
    Issued,
    Sent,
    Paid,
    Cancelled,
}

impl InvoiceStatus {
    pub fn all() -> &'static [InvoiceStatus] {
        &[
            InvoiceStatus::Draft,
            InvoiceStatus::Issued,
            InvoiceStatus::Sent,
            InvoiceStatus::Paid,
            InvoiceStatus::Cancelled,
        ]
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvoiceStatus::Draft => write!(f, "draft"),
            InvoiceStatus::Issued => write!(f, "issued"),
            InvoiceStatus::Sent => write!(f, "sent"),
            InvoiceStatus::Paid => write!(f, "paid"),
            InvoiceStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(InvoiceStatus::Draft),
            "issued" => Ok(InvoiceStatus::Issued),
            "sent" => Ok(InvoiceStatus::Sent),
            "paid" => Ok(InvoiceStatus::Paid),
            "cancelled" | "canceled" => Ok(InvoiceStatus::Cancelled),
            _ => Err(format!(
                "Invalid invoice status: {}. Use draft, issued, sent, paid, or cancelled",
                s
            )),
        }
    }
}

/// An invoice owned by a report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    /// Unique identifier (INVC-...)
    pub id: RecordId,

    /// Owning report (RPT-...)
    pub report: RecordId,

    /// Human-facing invoice number, e.g. INV-2024-0001
    pub invoice_no: String,

    /// Billing state
    #[serde(default)]
    pub status: InvoiceStatus,

    /// Invoice amount
    #[serde(default)]
    pub amount: f64,

    /// When the invoice was issued
    pub issued_at: DateTime<Utc>,

    /// When payment was received
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Last update timestamp
    pub updated: DateTime<Utc>,
}

impl Record for Invoice {
    const PREFIX: RecordPrefix = RecordPrefix::Invc;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn status(&self) -> String {
        self.status.to_string()
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }

    fn updated(&self) -> DateTime<Utc> {
        self.updated
    }
}

impl Invoice {
    /// Draft a new invoice for a report
    pub fn new(report: RecordId, invoice_no: String, amount: f64) -> Self {
        let now = Utc::now();
        Self {
            id: RecordId::new(RecordPrefix::Invc),
            report,
            invoice_no,
            status: InvoiceStatus::default(),
            amount,
            issued_at: now,
            paid_at: None,
            created: now,
            updated: now,
        }
    }
}

/// Format an invoice number as INV-{year}-{sequence:04}
pub fn format_invoice_number(year: i32, sequence: u32) -> String {
    format!("INV-{}-{:04}", year, sequence)
}
