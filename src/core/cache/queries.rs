//! Cache query methods
//!
//! Point lookups and first-child lookups behind the tracking engine. All of
//! them run inside one deferred transaction so a query sees a single state of
//! the cache even while another process syncs it.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};

use super::types::{CachedIntake, CachedInvoice, CachedReport, CachedTest};
use crate::core::identity::RecordId;
use crate::tracking::{RecordReader, TrackError};

const INTAKE_COLUMNS: &str =
    "id, courier_awb, forward_to_central, branch, company, receiving_mode, created, updated";
const TEST_COLUMNS: &str = "id, intake_id, lab_doc_no, test_status, created, updated";
const REPORT_COLUMNS: &str =
    "id, test_id, final_status, approved_by, comm_status, comm_channel, created, updated";
const INVOICE_COLUMNS: &str =
    "id, report_id, invoice_no, invoice_status, issued_at, paid_at, created, updated";

/// A read transaction over the cache
pub struct Snapshot<'conn> {
    tx: Transaction<'conn>,
}

impl<'conn> Snapshot<'conn> {
    pub(super) fn begin(conn: &'conn Connection) -> Result<Self, TrackError> {
        Ok(Self {
            tx: conn.unchecked_transaction()?,
        })
    }

    fn one<T>(
        &self,
        sql: &str,
        key: &str,
        map: fn(&Row<'_>) -> rusqlite::Result<T>,
    ) -> Result<Option<T>, TrackError> {
        Ok(self.tx.query_row(sql, params![key], map).optional()?)
    }
}

impl RecordReader for Snapshot<'_> {
    fn intake_by_awb(&self, awb: &str) -> Result<Option<CachedIntake>, TrackError> {
        self.one(
            &format!(
                "SELECT {INTAKE_COLUMNS} FROM intakes WHERE courier_awb = ?1 ORDER BY created, id LIMIT 1"
            ),
            awb,
            intake_from_row,
        )
    }

    fn intake_by_id(&self, id: &RecordId) -> Result<Option<CachedIntake>, TrackError> {
        self.one(
            &format!("SELECT {INTAKE_COLUMNS} FROM intakes WHERE id = ?1"),
            &id.to_string(),
            intake_from_row,
        )
    }

    fn test_by_id(&self, id: &RecordId) -> Result<Option<CachedTest>, TrackError> {
        self.one(
            &format!("SELECT {TEST_COLUMNS} FROM lab_tests WHERE id = ?1"),
            &id.to_string(),
            test_from_row,
        )
    }

    fn report_by_id(&self, id: &RecordId) -> Result<Option<CachedReport>, TrackError> {
        self.one(
            &format!("SELECT {REPORT_COLUMNS} FROM reports WHERE id = ?1"),
            &id.to_string(),
            report_from_row,
        )
    }

    fn invoice_by_number(&self, number: &str) -> Result<Option<CachedInvoice>, TrackError> {
        self.one(
            &format!(
                "SELECT {INVOICE_COLUMNS} FROM invoices WHERE invoice_no = ?1 ORDER BY created, id LIMIT 1"
            ),
            number,
            invoice_from_row,
        )
    }

    fn invoice_by_id(&self, id: &RecordId) -> Result<Option<CachedInvoice>, TrackError> {
        self.one(
            &format!("SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = ?1"),
            &id.to_string(),
            invoice_from_row,
        )
    }

    fn first_test_of(&self, intake: &RecordId) -> Result<Option<CachedTest>, TrackError> {
        self.one(
            &format!(
                "SELECT {TEST_COLUMNS} FROM lab_tests WHERE intake_id = ?1 ORDER BY created, id LIMIT 1"
            ),
            &intake.to_string(),
            test_from_row,
        )
    }

    fn first_report_of(&self, test: &RecordId) -> Result<Option<CachedReport>, TrackError> {
        self.one(
            &format!(
                "SELECT {REPORT_COLUMNS} FROM reports WHERE test_id = ?1 ORDER BY created, id LIMIT 1"
            ),
            &test.to_string(),
            report_from_row,
        )
    }

    fn first_invoice_of(&self, report: &RecordId) -> Result<Option<CachedInvoice>, TrackError> {
        self.one(
            &format!(
                "SELECT {INVOICE_COLUMNS} FROM invoices WHERE report_id = ?1 ORDER BY created, id LIMIT 1"
            ),
            &report.to_string(),
            invoice_from_row,
        )
    }
}

// Row mapping

fn intake_from_row(row: &Row<'_>) -> rusqlite::Result<CachedIntake> {
    Ok(CachedIntake {
        id: parsed(row, 0)?,
        courier_awb: row.get(1)?,
        forward_to_central: row.get(2)?,
        branch: row.get(3)?,
        company: row.get(4)?,
        receiving_mode: parsed(row, 5)?,
        created: timestamp(row, 6)?,
        updated: timestamp(row, 7)?,
    })
}

fn test_from_row(row: &Row<'_>) -> rusqlite::Result<CachedTest> {
    Ok(CachedTest {
        id: parsed(row, 0)?,
        intake_id: parsed(row, 1)?,
        lab_doc_no: row.get(2)?,
        status: parsed(row, 3)?,
        created: timestamp(row, 4)?,
        updated: timestamp(row, 5)?,
    })
}

fn report_from_row(row: &Row<'_>) -> rusqlite::Result<CachedReport> {
    Ok(CachedReport {
        id: parsed(row, 0)?,
        test_id: parsed(row, 1)?,
        final_status: parsed(row, 2)?,
        approved_by: row.get(3)?,
        comm_status: parsed(row, 4)?,
        comm_channel: parsed(row, 5)?,
        created: timestamp(row, 6)?,
        updated: timestamp(row, 7)?,
    })
}

fn invoice_from_row(row: &Row<'_>) -> rusqlite::Result<CachedInvoice> {
    let paid_at: Option<String> = row.get(5)?;
    Ok(CachedInvoice {
        id: parsed(row, 0)?,
        report_id: parsed(row, 1)?,
        invoice_no: row.get(2)?,
        status: parsed(row, 3)?,
        issued_at: timestamp(row, 4)?,
        paid_at: paid_at.map(|s| parse_timestamp(5, &s)).transpose()?,
        created: timestamp(row, 6)?,
        updated: timestamp(row, 7)?,
    })
}

/// Read a text column through `FromStr`
fn parsed<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let text: String = row.get(idx)?;
    text.parse()
        .map_err(|e: T::Err| conversion_failure(idx, e.to_string()))
}

fn timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    parse_timestamp(idx, &text)
}

fn parse_timestamp(idx: usize, text: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_failure(idx, e.to_string()))
}

fn conversion_failure(idx: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, message.into())
}
