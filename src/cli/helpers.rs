//! Shared formatting helpers for CLI output

use chrono::{DateTime, Local, Utc};

use crate::core::identity::RecordId;

/// Format a RecordId for display, truncating if too long
///
/// IDs longer than 16 characters are truncated to 13 chars with "..." suffix.
pub fn format_short_id(id: &RecordId) -> String {
    let full = id.to_string();
    if full.len() <= 16 {
        full
    } else {
        format!("{}...", &full[..13])
    }
}

/// Format an optional UTC timestamp in local time, `-` when absent
pub fn format_timestamp(ts: Option<&DateTime<Utc>>) -> String {
    match ts {
        Some(ts) => ts.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
        None => "-".to_string(),
    }
}

/// Make a value safe for a tab-separated line
pub fn tsv_field(s: &str) -> String {
    s.replace(['\t', '\n', '\r'], " ")
}
