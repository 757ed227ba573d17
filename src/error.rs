//! Error taxonomy shared by the parser, the table builder
//! and the searches.
//!
//! Every variant is fatal at the call that produces it. A
//! search that simply finds nothing is not an error: see
//! [`SearchResult::span`][crate::search::SearchResult::span].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuxError {
    /// Required header fields absent or unreadable.
    #[error("malformed AUX header: {0}")]
    MalformedHeader(String),

    /// Body rows do not honor the column contract.
    #[error("schema mismatch at line {line}: {detail}")]
    SchemaMismatch { line: usize, detail: String },

    #[error(
        "non-monotonic timeline: sample {index} at {current} precedes previous sample at {previous}"
    )]
    NonMonotonicTimeline {
        index: usize,
        previous: f64,
        current: f64,
    },

    #[error("invalid search geometry: {0}")]
    InvalidGeometry(String),

    #[error("unexpected time format: `{input}` (expected UTC `YYYY-MM-DDTHH:MM:SS.ffffff`)")]
    TimeFormat { input: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub type Result<T, E = AuxError> = std::result::Result<T, E>;
