//! Exact pattern search over symbol sequences
//!
//! The pipeline is linear:
//!
//! 1. [`build_failure_table`] derives the prefix function of the pattern
//! 2. [`find_positions`] scans the sequence once, honoring the overlap policy
//! 3. [`enrich_matches`] attaches bounded context windows to each hit
//!
//! [`Searcher`] wraps the three behind input validation and timing, and is
//! exposed to transports through the [`SearchService`] trait.
//!
//! Symbols are opaque bytes; nothing here assumes a nucleotide alphabet.

pub mod enrich;
pub mod error;
pub mod failure;
pub mod kmp;
pub mod naive;
pub mod searcher;

pub use enrich::{enrich_matches, Match, DEFAULT_CONTEXT_WINDOW};
pub use error::SearchError;
pub use failure::build_failure_table;
pub use kmp::find_positions;
pub use naive::find_positions_naive;
pub use searcher::{
    search, Algorithm, SearchOptions, SearchRequest, SearchResult, SearchService, Searcher,
    ALGORITHM_KMP, ALGORITHM_NAIVE,
};
