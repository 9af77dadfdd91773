//! Errors surfaced by the tracking engine

use miette::Diagnostic;
use thiserror::Error;

/// The only failure the engine reports to callers.
///
/// Absence, malformed identifiers and broken owner references are all folded
/// into a `found = false` result instead.
#[derive(Debug, Error, Diagnostic)]
pub enum TrackError {
    #[error("record store unavailable: {0}")]
    #[diagnostic(
        code(tracklite::store::unavailable),
        help("Try `tracklite cache rebuild` if the cache database is damaged")
    )]
    StoreUnavailable(String),
}

impl From<rusqlite::Error> for TrackError {
    fn from(err: rusqlite::Error) -> Self {
        TrackError::StoreUnavailable(err.to_string())
    }
}
