//! Cache type definitions
//!
//! Rows read back from the cache and the reports produced by cache operations.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::core::identity::RecordId;
use crate::entities::{
    CommChannel, CommStatus, FinalStatus, InvoiceStatus, ReceivingMode, TestStatus,
};

// =========================================================================
// Cached Record Types
// =========================================================================

/// Cached intake receipt
#[derive(Debug, Clone, PartialEq)]
pub struct CachedIntake {
    pub id: RecordId,
    pub courier_awb: Option<String>,
    pub forward_to_central: bool,
    pub branch: String,
    pub company: String,
    pub receiving_mode: ReceivingMode,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

/// Cached lab test
#[derive(Debug, Clone, PartialEq)]
pub struct CachedTest {
    pub id: RecordId,
    pub intake_id: RecordId,
    pub lab_doc_no: String,
    pub status: TestStatus,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

/// Cached report
#[derive(Debug, Clone, PartialEq)]
pub struct CachedReport {
    pub id: RecordId,
    pub test_id: RecordId,
    pub final_status: FinalStatus,
    pub approved_by: Option<String>,
    pub comm_status: CommStatus,
    pub comm_channel: CommChannel,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

/// Cached invoice
#[derive(Debug, Clone, PartialEq)]
pub struct CachedInvoice {
    pub id: RecordId,
    pub report_id: RecordId,
    pub invoice_no: String,
    pub status: InvoiceStatus,
    pub issued_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

// =========================================================================
// Summary Types
// =========================================================================

/// Count of records grouped by a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupCount {
    pub group: String,
    pub count: usize,
}

/// Dashboard figures across the whole store
#[derive(Debug, Clone, Default)]
pub struct StoreSummary {
    pub receipts: usize,
    pub receipts_by_mode: Vec<GroupCount>,
    pub receipts_by_branch: Vec<GroupCount>,
    pub receipts_with_awb: usize,
    pub receipts_forwarded: usize,
    pub tests_by_status: Vec<GroupCount>,
    pub reports_by_status: Vec<GroupCount>,
    pub invoices_by_status: Vec<GroupCount>,
}

// =========================================================================
// Operation Result Types
// =========================================================================

/// Statistics from sync operation
#[derive(Debug, Default)]
pub struct SyncStats {
    pub files_scanned: usize,
    pub records_added: usize,
    pub records_updated: usize,
    pub records_removed: usize,
    /// Files that could not be parsed and were left out
    pub files_skipped: usize,
    pub duration_ms: u64,
}

/// Cache statistics
#[derive(Debug, Default)]
pub struct CacheStats {
    pub total_records: usize,
    pub by_prefix: HashMap<String, usize>,
    pub db_size_bytes: u64,
}
