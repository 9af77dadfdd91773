//! Chain loading
//!
//! From the resolved record the loader climbs owner references up to the
//! intake receipt, then descends from the intake taking the first child (by
//! creation time, then ID) at each level until a level is empty. Every entry
//! point of a sample therefore yields the same chain.

use super::resolver::{Hit, ResolvedEntry};
use super::{RecordReader, TrackError};
use crate::core::cache::{CachedIntake, CachedInvoice, CachedReport, CachedTest};

/// The records linked to one tracking query
#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    pub intake: CachedIntake,
    pub test: Option<CachedTest>,
    pub report: Option<CachedReport>,
    pub invoice: Option<CachedInvoice>,
}

impl Chain {
    /// A chain holding only the intake receipt
    pub fn new(intake: CachedIntake) -> Self {
        Self {
            intake,
            test: None,
            report: None,
            invoice: None,
        }
    }
}

/// Assemble the chain for a resolved entry.
///
/// Returns `None` when an owner reference on the way up cannot be loaded:
/// without its intake receipt the entry cannot be placed in any chain.
pub fn load(reader: &dyn RecordReader, entry: &ResolvedEntry) -> Result<Option<Chain>, TrackError> {
    let Some(intake) = climb(reader, &entry.hit)? else {
        tracing::debug!(id = %entry.id(), "owner chain is broken above the matched record");
        return Ok(None);
    };
    let mut chain = Chain::new(intake);
    descend(reader, &mut chain)?;
    Ok(Some(chain))
}

/// Follow owner references up to the intake receipt
fn climb(reader: &dyn RecordReader, hit: &Hit) -> Result<Option<CachedIntake>, TrackError> {
    let test_id = match hit {
        Hit::Intake(intake) => return Ok(Some(intake.clone())),
        Hit::Test(test) => return reader.intake_by_id(&test.intake_id),
        Hit::Report(report) => report.test_id.clone(),
        Hit::Invoice(invoice) => match reader.report_by_id(&invoice.report_id)? {
            Some(report) => report.test_id,
            None => return Ok(None),
        },
    };
    match reader.test_by_id(&test_id)? {
        Some(test) => reader.intake_by_id(&test.intake_id),
        None => Ok(None),
    }
}

fn descend(reader: &dyn RecordReader, chain: &mut Chain) -> Result<(), TrackError> {
    chain.test = reader.first_test_of(&chain.intake.id)?;
    let Some(test) = &chain.test else {
        return Ok(());
    };

    chain.report = reader.first_report_of(&test.id)?;
    let Some(report) = &chain.report else {
        return Ok(());
    };

    chain.invoice = reader.first_invoice_of(&report.id)?;
    Ok(())
}
