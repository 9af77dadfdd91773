//! Core module - identity, project layout, configuration and the record cache

pub mod cache;
pub mod config;
pub mod identity;
pub mod project;
pub mod record;

pub use cache::{
    CacheStats, CachedIntake, CachedInvoice, CachedReport, CachedTest, GroupCount, RecordCache,
    Snapshot, StoreSummary, SyncStats,
};
pub use config::Config;
pub use identity::{IdParseError, RecordId, RecordPrefix};
pub use project::{Project, ProjectError};
pub use record::Record;
