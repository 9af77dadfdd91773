//! Status timeline engine
//!
//! `track` turns one opaque query into a tracking result: the query is
//! resolved to a record, the record's chain (intake, test, report, invoice)
//! is loaded, and the timeline and document list are derived from it. The
//! engine only reads through a [`RecordReader`]; a caller hands it a reader
//! bound to one consistent snapshot of the store.

pub mod chain;
pub mod documents;
pub mod error;
pub mod resolver;
pub mod timeline;

#[cfg(test)]
pub(crate) mod test_support;

use serde::{Deserialize, Serialize};

use crate::core::cache::{CachedIntake, CachedInvoice, CachedReport, CachedTest};
use crate::core::identity::RecordId;

pub use chain::Chain;
pub use documents::{DocumentKind, DocumentRef};
pub use error::TrackError;
pub use resolver::{Depth, EntryPoint, ResolvedEntry};
pub use timeline::{Stage, Step, StepStatus, Timeline};

/// Read access the engine needs from the record store.
///
/// Every lookup returns `Ok(None)` for absence. Errors mean the store itself
/// could not be read.
pub trait RecordReader {
    fn intake_by_awb(&self, awb: &str) -> Result<Option<CachedIntake>, TrackError>;
    fn intake_by_id(&self, id: &RecordId) -> Result<Option<CachedIntake>, TrackError>;
    fn test_by_id(&self, id: &RecordId) -> Result<Option<CachedTest>, TrackError>;
    fn report_by_id(&self, id: &RecordId) -> Result<Option<CachedReport>, TrackError>;
    fn invoice_by_number(&self, number: &str) -> Result<Option<CachedInvoice>, TrackError>;
    fn invoice_by_id(&self, id: &RecordId) -> Result<Option<CachedInvoice>, TrackError>;

    /// Earliest test of an intake, by creation time then ID
    fn first_test_of(&self, intake: &RecordId) -> Result<Option<CachedTest>, TrackError>;
    /// Earliest report of a test, by creation time then ID
    fn first_report_of(&self, test: &RecordId) -> Result<Option<CachedReport>, TrackError>;
    /// Earliest invoice of a report, by creation time then ID
    fn first_invoice_of(&self, report: &RecordId) -> Result<Option<CachedInvoice>, TrackError>;
}

/// Result of one tracking query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingResult {
    pub found: bool,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<Depth>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_by: Option<EntryPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_stage: Option<Stage>,
    #[serde(default)]
    pub timeline: Vec<Step>,
    #[serde(default)]
    pub documents: Vec<DocumentRef>,
}

impl TrackingResult {
    pub fn not_found() -> Self {
        Self {
            found: false,
            kind: None,
            matched_by: None,
            id: None,
            current_stage: None,
            timeline: Vec::new(),
            documents: Vec::new(),
        }
    }
}

/// Run one tracking query against a reader.
///
/// Only store failures are errors; an unknown or malformed query, or a
/// record whose owners are gone, yields `found = false`.
pub fn track(reader: &dyn RecordReader, query: &str) -> Result<TrackingResult, TrackError> {
    let Some(entry) = resolver::resolve(reader, query)? else {
        return Ok(TrackingResult::not_found());
    };
    let Some(chain) = chain::load(reader, &entry)? else {
        return Ok(TrackingResult::not_found());
    };

    let timeline = timeline::derive(&chain);
    let documents = documents::documents(&chain);

    Ok(TrackingResult {
        found: true,
        kind: Some(entry.depth()),
        matched_by: Some(entry.via),
        id: Some(entry.id().clone()),
        current_stage: Some(timeline.current_stage),
        timeline: timeline.steps,
        documents,
    })
}
