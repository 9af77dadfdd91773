//! Identifier resolution
//!
//! A tracking query is an opaque string. It is offered to an ordered list of
//! lookups and the first lookup that finds a record wins:
//!
//! 1. courier AWB of an intake receipt
//! 2. intake receipt ID
//! 3. lab test ID
//! 4. report ID
//! 5. invoice number, then invoice ID

use serde::{Deserialize, Serialize};

use super::{RecordReader, TrackError};
use crate::core::cache::{CachedIntake, CachedInvoice, CachedReport, CachedTest};
use crate::core::identity::{RecordId, RecordPrefix};

/// Depth of the chain the query landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Depth {
    Intake,
    Test,
    Report,
    Invoice,
}

impl Depth {
    pub fn as_str(&self) -> &'static str {
        match self {
            Depth::Intake => "intake",
            Depth::Test => "test",
            Depth::Report => "report",
            Depth::Invoice => "invoice",
        }
    }
}

impl std::fmt::Display for Depth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which field matched the query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryPoint {
    Awb,
    IntakeId,
    TestId,
    ReportId,
    InvoiceNumber,
    InvoiceId,
}

impl EntryPoint {
    pub fn depth(&self) -> Depth {
        match self {
            EntryPoint::Awb | EntryPoint::IntakeId => Depth::Intake,
            EntryPoint::TestId => Depth::Test,
            EntryPoint::ReportId => Depth::Report,
            EntryPoint::InvoiceNumber | EntryPoint::InvoiceId => Depth::Invoice,
        }
    }
}

/// The record a lookup found
#[derive(Debug, Clone, PartialEq)]
pub enum Hit {
    Intake(CachedIntake),
    Test(CachedTest),
    Report(CachedReport),
    Invoice(CachedInvoice),
}

/// A successfully resolved query
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedEntry {
    pub via: EntryPoint,
    pub hit: Hit,
}

impl ResolvedEntry {
    pub fn depth(&self) -> Depth {
        self.via.depth()
    }

    /// ID of the matched record
    pub fn id(&self) -> &RecordId {
        match &self.hit {
            Hit::Intake(intake) => &intake.id,
            Hit::Test(test) => &test.id,
            Hit::Report(report) => &report.id,
            Hit::Invoice(invoice) => &invoice.id,
        }
    }
}

type Lookup = fn(&dyn RecordReader, &str) -> Result<Option<ResolvedEntry>, TrackError>;

/// Lookups in priority order
const LOOKUPS: [(EntryPoint, Lookup); 6] = [
    (EntryPoint::Awb, lookup_awb),
    (EntryPoint::IntakeId, lookup_intake_id),
    (EntryPoint::TestId, lookup_test_id),
    (EntryPoint::ReportId, lookup_report_id),
    (EntryPoint::InvoiceNumber, lookup_invoice_number),
    (EntryPoint::InvoiceId, lookup_invoice_id),
];

/// Resolve a query to the record it identifies, if any
pub fn resolve(reader: &dyn RecordReader, query: &str) -> Result<Option<ResolvedEntry>, TrackError> {
    for (entry_point, lookup) in LOOKUPS {
        if let Some(entry) = lookup(reader, query)? {
            tracing::debug!(?entry_point, id = %entry.id(), "tracking query resolved");
            return Ok(Some(entry));
        }
    }
    tracing::debug!(query, "tracking query matched no record");
    Ok(None)
}

/// Parse the query as an ID of the given kind; anything else is a non-match
fn identity(query: &str, prefix: RecordPrefix) -> Option<RecordId> {
    match RecordId::parse_with_prefix(query, prefix) {
        Ok(id) => Some(id),
        Err(e) => {
            tracing::trace!(query, kind = prefix.kind(), error = %e, "not an identity");
            None
        }
    }
}

fn lookup_awb(reader: &dyn RecordReader, query: &str) -> Result<Option<ResolvedEntry>, TrackError> {
    if query.is_empty() {
        return Ok(None);
    }
    Ok(reader.intake_by_awb(query)?.map(|intake| ResolvedEntry {
        via: EntryPoint::Awb,
        hit: Hit::Intake(intake),
    }))
}

fn lookup_intake_id(
    reader: &dyn RecordReader,
    query: &str,
) -> Result<Option<ResolvedEntry>, TrackError> {
    let Some(id) = identity(query, RecordPrefix::Rcpt) else {
        return Ok(None);
    };
    Ok(reader.intake_by_id(&id)?.map(|intake| ResolvedEntry {
        via: EntryPoint::IntakeId,
        hit: Hit::Intake(intake),
    }))
}

fn lookup_test_id(reader: &dyn RecordReader, query: &str) -> Result<Option<ResolvedEntry>, TrackError> {
    let Some(id) = identity(query, RecordPrefix::Lab) else {
        return Ok(None);
    };
    Ok(reader.test_by_id(&id)?.map(|test| ResolvedEntry {
        via: EntryPoint::TestId,
        hit: Hit::Test(test),
    }))
}

fn lookup_report_id(
    reader: &dyn RecordReader,
    query: &str,
) -> Result<Option<ResolvedEntry>, TrackError> {
    let Some(id) = identity(query, RecordPrefix::Rpt) else {
        return Ok(None);
    };
    Ok(reader.report_by_id(&id)?.map(|report| ResolvedEntry {
        via: EntryPoint::ReportId,
        hit: Hit::Report(report),
    }))
}

fn lookup_invoice_number(
    reader: &dyn RecordReader,
    query: &str,
) -> Result<Option<ResolvedEntry>, TrackError> {
    if query.is_empty() {
        return Ok(None);
    }
    Ok(reader.invoice_by_number(query)?.map(|invoice| ResolvedEntry {
        via: EntryPoint::InvoiceNumber,
        hit: Hit::Invoice(invoice),
    }))
}

fn lookup_invoice_id(
    reader: &dyn RecordReader,
    query: &str,
) -> Result<Option<ResolvedEntry>, TrackError> {
    let Some(id) = identity(query, RecordPrefix::Invc) else {
        return Ok(None);
    };
    Ok(reader.invoice_by_id(&id)?.map(|invoice| ResolvedEntry {
        via: EntryPoint::InvoiceId,
        hit: Hit::Invoice(invoice),
    }))
}
