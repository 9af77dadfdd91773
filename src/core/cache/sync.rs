//! Cache synchronization with filesystem
//!
//! Methods for rebuilding and incrementally syncing the cache with YAML files.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use miette::{IntoDiagnostic, Result};
use rusqlite::{params, Connection, OptionalExtension};

use super::{compute_hash, format_datetime, get_file_mtime, RecordCache, SyncStats};
use crate::core::identity::RecordPrefix;
use crate::core::record::Record;
use crate::entities::{Intake, Invoice, LabTest, Report};
use crate::yaml::parse_record;

/// Where a record came from on disk
struct FileMeta<'a> {
    rel_path: &'a str,
    mtime: i64,
    hash: String,
}

impl RecordCache {
    /// Full rebuild of cache from filesystem
    pub fn rebuild(&mut self) -> Result<SyncStats> {
        let start = std::time::Instant::now();
        let mut stats = SyncStats::default();
        let files = self.record_files();

        let tx = self.conn.transaction().into_diagnostic()?;
        tx.execute_batch(
            r#"
            DELETE FROM invoices;
            DELETE FROM reports;
            DELETE FROM lab_tests;
            DELETE FROM intakes;
            DELETE FROM records;
            "#,
        )
        .into_diagnostic()?;

        for (prefix, rel_path, path) in &files {
            stats.files_scanned += 1;
            if cache_record_file(&tx, *prefix, rel_path, path)? {
                stats.records_added += 1;
            } else {
                stats.files_skipped += 1;
            }
        }
        tx.commit().into_diagnostic()?;

        stats.duration_ms = start.elapsed().as_millis() as u64;
        tracing::debug!(
            scanned = stats.files_scanned,
            skipped = stats.files_skipped,
            "cache rebuilt"
        );
        Ok(stats)
    }

    /// Incremental sync - only update changed files
    pub fn sync(&mut self) -> Result<SyncStats> {
        let start = std::time::Instant::now();
        let mut stats = SyncStats::default();
        let files = self.record_files();

        let tx = self.conn.transaction().into_diagnostic()?;

        let mut cached_files: HashMap<String, (i64, String)> = HashMap::new();
        {
            let mut stmt = tx
                .prepare("SELECT file_path, file_mtime, file_hash FROM records")
                .into_diagnostic()?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                })
                .into_diagnostic()?;

            for row in rows {
                let (path, mtime, hash) = row.into_diagnostic()?;
                cached_files.insert(path, (mtime, hash));
            }
        }

        for (prefix, rel_path, path) in &files {
            stats.files_scanned += 1;

            let existing = cached_files.get(rel_path);
            if let Some((cached_mtime, cached_hash)) = existing {
                let current_mtime = get_file_mtime(path)?;
                if current_mtime == *cached_mtime {
                    continue;
                }
                let content = fs::read_to_string(path).into_diagnostic()?;
                if compute_hash(&content) == *cached_hash {
                    // Touched but unchanged
                    tx.execute(
                        "UPDATE records SET file_mtime = ?1 WHERE file_path = ?2",
                        params![current_mtime, rel_path],
                    )
                    .into_diagnostic()?;
                    continue;
                }
                remove_file_records(&tx, rel_path)?;
            }

            if cache_record_file(&tx, *prefix, rel_path, path)? {
                if existing.is_some() {
                    stats.records_updated += 1;
                } else {
                    stats.records_added += 1;
                }
            } else {
                stats.files_skipped += 1;
            }
        }

        for rel_path in cached_files.keys() {
            if !files.iter().any(|(_, current, _)| current == rel_path) {
                remove_file_records(&tx, rel_path)?;
                stats.records_removed += 1;
            }
        }

        tx.commit().into_diagnostic()?;

        stats.duration_ms = start.elapsed().as_millis() as u64;
        Ok(stats)
    }
}

/// Cache a single record file. Returns `false` when the file was skipped.
fn cache_record_file(
    conn: &Connection,
    prefix: RecordPrefix,
    rel_path: &str,
    path: &Path,
) -> Result<bool> {
    let content = fs::read_to_string(path).into_diagnostic()?;
    let file = FileMeta {
        rel_path,
        mtime: get_file_mtime(path)?,
        hash: compute_hash(&content),
    };

    match prefix {
        RecordPrefix::Rcpt => store(conn, &content, &file, insert_intake),
        RecordPrefix::Lab => store(conn, &content, &file, insert_lab_test),
        RecordPrefix::Rpt => store(conn, &content, &file, insert_report),
        RecordPrefix::Invc => store(conn, &content, &file, insert_invoice),
    }
}

fn store<R: Record>(
    conn: &Connection,
    content: &str,
    file: &FileMeta<'_>,
    insert: fn(&Connection, &R) -> Result<()>,
) -> Result<bool> {
    let record: R = match parse_record(content, file.rel_path) {
        Ok(record) => record,
        Err(e) => {
            tracing::warn!(file = file.rel_path, "skipping record file: {}", e);
            return Ok(false);
        }
    };

    if record.id().prefix() != R::PREFIX {
        tracing::warn!(
            file = file.rel_path,
            id = %record.id(),
            "skipping record file: expected a {} ID",
            R::PREFIX
        );
        return Ok(false);
    }

    conn.execute(
        r#"INSERT OR REPLACE INTO records
           (id, prefix, status, created, updated, file_path, file_mtime, file_hash)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"#,
        params![
            record.id().to_string(),
            R::PREFIX.as_str(),
            record.status(),
            format_datetime(&record.created()),
            format_datetime(&record.updated()),
            file.rel_path,
            file.mtime,
            file.hash
        ],
    )
    .into_diagnostic()?;

    insert(conn, &record)?;
    Ok(true)
}

/// Remove whatever record a file contributed
fn remove_file_records(conn: &Connection, rel_path: &str) -> Result<()> {
    let record_id: Option<String> = conn
        .query_row(
            "SELECT id FROM records WHERE file_path = ?1",
            params![rel_path],
            |row| row.get(0),
        )
        .optional()
        .into_diagnostic()?;

    let Some(id) = record_id else {
        return Ok(());
    };

    for table in ["intakes", "lab_tests", "reports", "invoices", "records"] {
        conn.execute(&format!("DELETE FROM {} WHERE id = ?1", table), params![id])
            .into_diagnostic()?;
    }
    Ok(())
}

// Record-specific caching

fn insert_intake(conn: &Connection, intake: &Intake) -> Result<()> {
    conn.execute(
        r#"INSERT OR REPLACE INTO intakes
           (id, courier_awb, forward_to_central, branch, company, receiving_mode, created, updated)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"#,
        params![
            intake.id.to_string(),
            intake.courier_awb.as_deref().filter(|awb| !awb.is_empty()),
            intake.forward_to_central,
            intake.branch,
            intake.company,
            intake.receiving_mode.to_string(),
            format_datetime(&intake.created),
            format_datetime(&intake.updated)
        ],
    )
    .into_diagnostic()?;
    Ok(())
}

fn insert_lab_test(conn: &Connection, test: &LabTest) -> Result<()> {
    conn.execute(
        r#"INSERT OR REPLACE INTO lab_tests
           (id, intake_id, lab_doc_no, test_status, created, updated)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
        params![
            test.id.to_string(),
            test.receipt.to_string(),
            test.lab_doc_no,
            test.test_status.to_string(),
            format_datetime(&test.created),
            format_datetime(&test.updated)
        ],
    )
    .into_diagnostic()?;
    Ok(())
}

fn insert_report(conn: &Connection, report: &Report) -> Result<()> {
    conn.execute(
        r#"INSERT OR REPLACE INTO reports
           (id, test_id, final_status, approved_by, comm_status, comm_channel, created, updated)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"#,
        params![
            report.id.to_string(),
            report.test.to_string(),
            report.final_status.to_string(),
            report.approved_by,
            report.comm_status.to_string(),
            report.comm_channel.to_string(),
            format_datetime(&report.created),
            format_datetime(&report.updated)
        ],
    )
    .into_diagnostic()?;
    Ok(())
}

fn insert_invoice(conn: &Connection, invoice: &Invoice) -> Result<()> {
    conn.execute(
        r#"INSERT OR REPLACE INTO invoices
           (id, report_id, invoice_no, invoice_status, issued_at, paid_at, created, updated)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"#,
        params![
            invoice.id.to_string(),
            invoice.report.to_string(),
            invoice.invoice_no,
            invoice.status.to_string(),
            format_datetime(&invoice.issued_at),
            invoice.paid_at.as_ref().map(format_datetime),
            format_datetime(&invoice.created),
            format_datetime(&invoice.updated)
        ],
    )
    .into_diagnostic()?;
    Ok(())
}
