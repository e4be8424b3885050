//! oeis-client: the sequence-database collaborators of the delta-grid
//! pipeline.
//!
//! - [`search`]: look up a short run of terms, return `(A-number, name)` matches.
//!   Never fails outward; every problem degrades to "no match".
//! - [`bfile`]: fetch and parse a two-column `index value` table, and compare a
//!   computed stream against it offline.

pub mod bfile;
pub mod search;

pub use bfile::{compare, fetch_bfile, parse_bfile, BFile, Comparison, ComparisonEntry, TableEntry};
pub use search::{parse_search_response, ClientConfig, OeisClient, SequenceMatch, MAX_WAIT_SECS};

/// Errors from talking to the sequence database.
#[derive(Debug, thiserror::Error)]
pub enum OeisError {
    /// Transport failure, timeout or non-success status. Callers fall back to
    /// offline comparison.
    #[error("sequence database unreachable: {0}")]
    Unreachable(String),

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for OeisError {
    fn from(err: reqwest::Error) -> Self {
        OeisError::Unreachable(err.to_string())
    }
}
