//! Database schema initialization
//!
//! Timestamps are stored as RFC 3339 text in UTC with fixed nanosecond precision,
//! so text ordering matches time ordering.

use miette::{IntoDiagnostic, Result};
use rusqlite::params;

use super::{RecordCache, SCHEMA_VERSION};

/// Every table the cache owns, children first
pub(super) const TABLES: &[&str] = &[
    "invoices",
    "reports",
    "lab_tests",
    "intakes",
    "records",
    "schema_version",
];

impl RecordCache {
    /// Initialize database schema
    pub(super) fn init_schema(&mut self) -> Result<()> {
        self.conn
            .execute_batch(
                r#"
            -- Schema version tracking
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            );

            -- One row per record file
            CREATE TABLE IF NOT EXISTS records (
                id TEXT PRIMARY KEY,
                prefix TEXT NOT NULL,
                status TEXT NOT NULL,
                created TEXT NOT NULL,
                updated TEXT NOT NULL,
                file_path TEXT NOT NULL,
                file_mtime INTEGER NOT NULL,
                file_hash TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_records_prefix ON records(prefix);
            CREATE INDEX IF NOT EXISTS idx_records_file_path ON records(file_path);

            -- Intake receipts
            CREATE TABLE IF NOT EXISTS intakes (
                id TEXT PRIMARY KEY,
                courier_awb TEXT,
                forward_to_central INTEGER NOT NULL,
                branch TEXT NOT NULL,
                company TEXT NOT NULL,
                receiving_mode TEXT NOT NULL,
                created TEXT NOT NULL,
                updated TEXT NOT NULL,
                FOREIGN KEY (id) REFERENCES records(id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_intakes_awb ON intakes(courier_awb);

            -- Lab tests
            CREATE TABLE IF NOT EXISTS lab_tests (
                id TEXT PRIMARY KEY,
                intake_id TEXT NOT NULL,
                lab_doc_no TEXT NOT NULL,
                test_status TEXT NOT NULL,
                created TEXT NOT NULL,
                updated TEXT NOT NULL,
                FOREIGN KEY (id) REFERENCES records(id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_lab_tests_intake ON lab_tests(intake_id, created, id);

            -- Reports
            CREATE TABLE IF NOT EXISTS reports (
                id TEXT PRIMARY KEY,
                test_id TEXT NOT NULL,
                final_status TEXT NOT NULL,
                approved_by TEXT,
                comm_status TEXT NOT NULL,
                comm_channel TEXT NOT NULL,
                created TEXT NOT NULL,
                updated TEXT NOT NULL,
                FOREIGN KEY (id) REFERENCES records(id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_reports_test ON reports(test_id, created, id);

            -- Invoices
            CREATE TABLE IF NOT EXISTS invoices (
                id TEXT PRIMARY KEY,
                report_id TEXT NOT NULL,
                invoice_no TEXT NOT NULL,
                invoice_status TEXT NOT NULL,
                issued_at TEXT NOT NULL,
                paid_at TEXT,
                created TEXT NOT NULL,
                updated TEXT NOT NULL,
                FOREIGN KEY (id) REFERENCES records(id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_invoices_number ON invoices(invoice_no);
            CREATE INDEX IF NOT EXISTS idx_invoices_report ON invoices(report_id, created, id);
            "#,
            )
            .into_diagnostic()?;

        self.conn
            .execute(
                "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
                params![SCHEMA_VERSION],
            )
            .into_diagnostic()?;

        Ok(())
    }

    /// Drop every cache table
    pub(super) fn drop_schema(&mut self) -> Result<()> {
        let sql: String = TABLES
            .iter()
            .map(|table| format!("DROP TABLE IF EXISTS {};\n", table))
            .collect();
        self.conn.execute_batch(&sql).into_diagnostic()?;
        Ok(())
    }
}
