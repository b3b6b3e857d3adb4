//! # dnaseek - Exact Pattern Search for DNA Sequences
//!
//! dnaseek finds every occurrence of a pattern in a sequence in a single
//! linear pass, and reports each hit with a bounded window of surrounding
//! context.
//!
//! ## Architecture
//!
//! The crate is organized into these main modules:
//!
//! - [`search`] - Failure table, KMP matcher, context enrichment, orchestration
//! - [`sequence`] - Normalization, alphabet validation, FASTA/CSV/file loading
//! - [`server`] - TCP search server, client, and wire protocol
//! - [`output`] - Result formatting (human-readable and JSON)
//! - [`config`] - Configuration file and environment overrides
//! - [`logging`] - `tracing` subscriber setup
//!
//! ## Quick Start
//!
//! ```
//! use dnaseek::search::{search, SearchError};
//!
//! let result = search(b"ATCGATCG", b"TCG", false)?;
//! assert_eq!(result.positions(), vec![1, 5]);
//! assert_eq!(result.matches[0].context_before, "A");
//! assert_eq!(result.matches[0].context_after, "ATCG");
//! # Ok::<(), SearchError>(())
//! ```
//!
//! ## Overlap Policy
//!
//! With overlapping allowed, searching `AA` in `AAAA` yields `[0, 1, 2]`;
//! without it, each hit starts at or after the end of the previous one and
//! the same search yields `[0, 2]`.

pub mod config;
pub mod logging;
pub mod output;
pub mod search;
pub mod sequence;
pub mod server;
