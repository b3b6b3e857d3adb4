//! Error type for the search core

use thiserror::Error;

/// Errors raised before any matching work starts.
///
/// The matcher itself is total: "not found" is an empty match list, never an
/// error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// Empty sequence or empty pattern
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl SearchError {
    pub(crate) fn empty_input() -> Self {
        SearchError::InvalidInput("sequence and pattern cannot be empty".to_string())
    }
}
