//! SQLite-backed record cache for fast lookups
//!
//! This module provides a local SQLite cache that:
//! - Indexes every record file by ID, courier AWB, invoice number and owner
//! - Auto-detects file changes and syncs incrementally
//! - Serves tracking queries from one read transaction per query
//!
//! IMPORTANT: The cache is user-local and gitignored. Record files are the
//! source of truth; the cache can always be rebuilt from them.

mod queries;
mod schema;
mod sync;
mod types;

pub use queries::Snapshot;
pub use types::*;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use chrono::{DateTime, SecondsFormat, Utc};
use miette::{IntoDiagnostic, Result};
use rusqlite::{Connection, OptionalExtension};
use sha2::{Digest, Sha256};

use crate::core::identity::RecordPrefix;
use crate::core::project::{Project, PROJECT_DIR, RECORD_SUFFIX};
use crate::tracking::TrackError;

/// Cache file name inside the project directory
const CACHE_FILE: &str = "cache.db";

/// Current schema version - cache is rebuilt on version mismatch
const SCHEMA_VERSION: i32 = 1;

/// The record cache backed by SQLite
pub struct RecordCache {
    conn: Connection,
    project_root: PathBuf,
}

impl RecordCache {
    /// Open or create cache for a project
    ///
    /// If the cache doesn't exist, it will be created and populated.
    /// If the cache is stale (files changed), it will be synced automatically.
    pub fn open(project: &Project) -> Result<Self> {
        let (mut cache, needs_init) = Self::connect(project)?;

        if needs_init {
            cache.init_schema()?;
            cache.rebuild()?;
        } else {
            // Check schema version - if mismatch, reinitialize (no migrations needed)
            if cache.needs_schema_rebuild()? {
                cache.reinitialize_schema()?;
            }
            cache.auto_sync()?;
        }

        Ok(cache)
    }

    /// Open cache without auto-sync
    pub fn open_without_sync(project: &Project) -> Result<Self> {
        let (mut cache, needs_init) = Self::connect(project)?;

        if needs_init {
            cache.init_schema()?;
        } else if cache.needs_schema_rebuild()? {
            cache.drop_schema()?;
            cache.init_schema()?;
        }

        Ok(cache)
    }

    fn connect(project: &Project) -> Result<(Self, bool)> {
        let cache_path = Self::cache_path(project.root());

        if let Some(parent) = cache_path.parent() {
            fs::create_dir_all(parent).into_diagnostic()?;
        }

        let needs_init = !cache_path.exists();
        let conn = Connection::open(&cache_path).into_diagnostic()?;

        // WAL lets readers keep their snapshot while a sync writes
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .into_diagnostic()?;

        Ok((
            Self {
                conn,
                project_root: project.root().to_path_buf(),
            },
            needs_init,
        ))
    }

    fn cache_path(root: &Path) -> PathBuf {
        root.join(PROJECT_DIR).join(CACHE_FILE)
    }

    /// Location of the cache database
    pub fn path(&self) -> PathBuf {
        Self::cache_path(&self.project_root)
    }

    /// Location of a project's cache database, whether or not it exists yet
    pub fn location(project: &Project) -> PathBuf {
        Self::cache_path(project.root())
    }

    /// Check if schema version matches current version
    fn needs_schema_rebuild(&self) -> Result<bool> {
        let current_version: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        Ok(current_version != SCHEMA_VERSION)
    }

    /// Drop all tables and reinitialize schema, then rebuild
    fn reinitialize_schema(&mut self) -> Result<()> {
        tracing::debug!(version = SCHEMA_VERSION, "cache schema changed, rebuilding");
        self.drop_schema()?;
        self.init_schema()?;
        self.rebuild()?;
        Ok(())
    }

    /// Auto-sync: quickly check if any files changed and sync if needed
    fn auto_sync(&mut self) -> Result<()> {
        let cached_max_mtime: Option<i64> = self
            .conn
            .query_row("SELECT MAX(file_mtime) FROM records", [], |row| row.get(0))
            .optional()
            .into_diagnostic()?
            .flatten();

        if self.has_changed_files(cached_max_mtime.unwrap_or(0))? {
            let stats = self.sync()?;
            tracing::debug!(
                added = stats.records_added,
                updated = stats.records_updated,
                removed = stats.records_removed,
                "cache synced"
            );
        }

        Ok(())
    }

    /// Check for files newer than the cache, or added/deleted files
    fn has_changed_files(&self, max_cached_mtime: i64) -> Result<bool> {
        let files = self.record_files();

        for (_, _, path) in &files {
            if get_file_mtime(path)? > max_cached_mtime {
                return Ok(true);
            }
        }

        let cached_count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))
            .into_diagnostic()?;

        Ok(files.len() as i64 != cached_count)
    }

    /// All record files on disk as (kind, path relative to root, full path)
    fn record_files(&self) -> Vec<(RecordPrefix, String, PathBuf)> {
        let mut files = Vec::new();
        for prefix in RecordPrefix::all() {
            let dir = self.project_root.join(Project::record_directory(*prefix));
            if !dir.exists() {
                continue;
            }
            for entry in walkdir::WalkDir::new(&dir)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
            {
                let path = entry.path();
                if !path.to_string_lossy().ends_with(RECORD_SUFFIX) {
                    continue;
                }
                let rel_path = path
                    .strip_prefix(&self.project_root)
                    .unwrap_or(path)
                    .to_string_lossy()
                    .to_string();
                files.push((*prefix, rel_path, path.to_path_buf()));
            }
        }
        files
    }

    /// Begin a consistent read view for one tracking query
    pub fn snapshot(&self) -> std::result::Result<Snapshot<'_>, TrackError> {
        Snapshot::begin(&self.conn)
    }

    /// Get cache statistics
    pub fn statistics(&self) -> Result<CacheStats> {
        let total_records: usize = self
            .conn
            .query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))
            .into_diagnostic()?;

        let mut by_prefix = HashMap::new();
        {
            let mut stmt = self
                .conn
                .prepare("SELECT prefix, COUNT(*) FROM records GROUP BY prefix")
                .into_diagnostic()?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, usize>(1)?))
                })
                .into_diagnostic()?;

            for row in rows {
                let (prefix, count) = row.into_diagnostic()?;
                by_prefix.insert(prefix, count);
            }
        }

        let db_size_bytes = fs::metadata(self.path()).map(|m| m.len()).unwrap_or(0);

        Ok(CacheStats {
            total_records,
            by_prefix,
            db_size_bytes,
        })
    }

    /// Dashboard figures for the whole store
    pub fn summary(&self) -> Result<StoreSummary> {
        let receipts: usize = self
            .conn
            .query_row("SELECT COUNT(*) FROM intakes", [], |row| row.get(0))
            .into_diagnostic()?;
        let receipts_with_awb: usize = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM intakes WHERE courier_awb IS NOT NULL AND courier_awb != ''",
                [],
                |row| row.get(0),
            )
            .into_diagnostic()?;
        let receipts_forwarded: usize = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM intakes WHERE forward_to_central = 1",
                [],
                |row| row.get(0),
            )
            .into_diagnostic()?;

        Ok(StoreSummary {
            receipts,
            receipts_by_mode: self.group_counts("intakes", "receiving_mode")?,
            receipts_by_branch: self.group_counts("intakes", "branch")?,
            receipts_with_awb,
            receipts_forwarded,
            tests_by_status: self.group_counts("lab_tests", "test_status")?,
            reports_by_status: self.group_counts("reports", "final_status")?,
            invoices_by_status: self.group_counts("invoices", "invoice_status")?,
        })
    }

    fn group_counts(&self, table: &str, column: &str) -> Result<Vec<GroupCount>> {
        let sql = format!(
            "SELECT {column}, COUNT(*) AS cnt FROM {table} GROUP BY {column} ORDER BY cnt DESC, {column}"
        );
        let mut stmt = self.conn.prepare(&sql).into_diagnostic()?;
        let rows = stmt
            .query_map([], |row| {
                Ok(GroupCount {
                    group: row.get(0)?,
                    count: row.get::<_, i64>(1)? as usize,
                })
            })
            .into_diagnostic()?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .into_diagnostic()
    }
}

/// Get file modification time as Unix milliseconds
fn get_file_mtime(path: &Path) -> Result<i64> {
    let metadata = fs::metadata(path).into_diagnostic()?;
    let mtime = metadata
        .modified()
        .into_diagnostic()?
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0);
    Ok(mtime)
}

/// Compute SHA256 hash of content
fn compute_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Format a timestamp for storage
fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}
