//! Search orchestration: validation, matching, enrichment and timing

use super::enrich::{enrich_matches, Match, DEFAULT_CONTEXT_WINDOW};
use super::error::SearchError;
use super::kmp::find_positions;
use super::naive::find_positions_naive;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

/// Identifier reported for the failure-table matcher
pub const ALGORITHM_KMP: &str = "KMP";

/// Identifier reported for the brute-force matcher
pub const ALGORITHM_NAIVE: &str = "naive-local";

/// Matching strategy used by a [`Searcher`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    #[default]
    Kmp,
    Naive,
}

impl Algorithm {
    /// Label attached to results produced with this strategy
    pub fn identifier(self) -> &'static str {
        match self {
            Algorithm::Kmp => ALGORITHM_KMP,
            Algorithm::Naive => ALGORITHM_NAIVE,
        }
    }

    /// Run the matcher for this strategy
    pub fn find_positions(self, sequence: &[u8], pattern: &[u8], allow_overlapping: bool) -> Vec<usize> {
        match self {
            Algorithm::Kmp => find_positions(sequence, pattern, allow_overlapping),
            Algorithm::Naive => find_positions_naive(sequence, pattern, allow_overlapping),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::Kmp => write!(f, "kmp"),
            Algorithm::Naive => write!(f, "naive"),
        }
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "kmp" => Ok(Algorithm::Kmp),
            "naive" | "naive-local" => Ok(Algorithm::Naive),
            other => Err(format!("unknown algorithm '{}' (expected kmp or naive)", other)),
        }
    }
}

/// A single search invocation. Borrows its inputs so that many patterns can
/// be run against one resident sequence without copying it.
#[derive(Debug, Clone, Copy)]
pub struct SearchRequest<'a> {
    pub sequence: &'a [u8],
    pub pattern: &'a [u8],
    pub allow_overlapping: bool,
}

impl<'a> SearchRequest<'a> {
    pub fn new(sequence: &'a [u8], pattern: &'a [u8], allow_overlapping: bool) -> Self {
        Self {
            sequence,
            pattern,
            allow_overlapping,
        }
    }
}

/// Matches plus metadata for one search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// Matches in ascending position order
    pub matches: Vec<Match>,
    /// Always equal to `matches.len()`
    pub total_matches: usize,
    /// Time spent matching and enriching (validation excluded)
    pub elapsed: Duration,
    /// Identifier of the matching strategy
    pub algorithm: &'static str,
}

impl SearchResult {
    /// Elapsed time in fractional milliseconds
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }

    /// Match positions in order
    pub fn positions(&self) -> Vec<usize> {
        self.matches.iter().map(|m| m.position).collect()
    }
}

/// Capability interface for anything that can answer a search request.
///
/// Transports depend on this trait rather than on a concrete searcher.
pub trait SearchService: Send + Sync {
    fn search(&self, request: &SearchRequest<'_>) -> Result<SearchResult, SearchError>;

    /// Context window and algorithm this service actually applies
    fn search_options(&self) -> SearchOptions;
}

/// Tunables for a [`Searcher`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// Symbols of context kept on each side of a match
    pub context_window: usize,
    pub algorithm: Algorithm,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            context_window: DEFAULT_CONTEXT_WINDOW,
            algorithm: Algorithm::default(),
        }
    }
}

/// Validates requests, runs the matcher and assembles results.
///
/// Holds no per-call state, so one instance can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct Searcher {
    options: SearchOptions,
}

impl Searcher {
    pub fn new(options: SearchOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// Run independent requests in parallel. Results keep the input order.
    pub fn search_many(&self, requests: &[SearchRequest<'_>]) -> Vec<Result<SearchResult, SearchError>> {
        requests
            .par_iter()
            .map(|request| self.search(request))
            .collect()
    }
}

impl SearchService for Searcher {
    fn search(&self, request: &SearchRequest<'_>) -> Result<SearchResult, SearchError> {
        if request.sequence.is_empty() || request.pattern.is_empty() {
            return Err(SearchError::empty_input());
        }

        let algorithm = self.options.algorithm;

        let start = Instant::now();
        let positions = algorithm.find_positions(request.sequence, request.pattern, request.allow_overlapping);
        let matches = enrich_matches(
            request.sequence,
            request.pattern.len(),
            self.options.context_window,
            &positions,
        );
        let elapsed = start.elapsed();

        tracing::debug!(
            sequence_len = request.sequence.len(),
            pattern_len = request.pattern.len(),
            allow_overlapping = request.allow_overlapping,
            matches = matches.len(),
            elapsed_us = elapsed.as_micros() as u64,
            algorithm = algorithm.identifier(),
            "search finished"
        );

        Ok(SearchResult {
            total_matches: matches.len(),
            matches,
            elapsed,
            algorithm: algorithm.identifier(),
        })
    }

    fn search_options(&self) -> SearchOptions {
        self.options
    }
}

/// Search with default options (KMP, 10-symbol context window)
pub fn search(sequence: &[u8], pattern: &[u8], allow_overlapping: bool) -> Result<SearchResult, SearchError> {
    Searcher::default().search(&SearchRequest::new(sequence, pattern, allow_overlapping))
}
