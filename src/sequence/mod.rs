//! Sequence preparation
//!
//! Turns raw user input into searchable sequences:
//!
//! - [`normalize`] strips whitespace and uppercases
//! - [`validate_dna`] restricts the alphabet to `A`, `T`, `C`, `G`, `N`
//! - [`parse_sequence_text`] reads plain text, FASTA or comma-separated input
//! - [`load_sequence_file`] memory-maps a file and parses it; [`load_raw_sequence_file`]
//!   does the same without touching the symbols
//!
//! The search core does not depend on any of this; it treats symbols as
//! opaque bytes.

mod file;
mod parse;

pub use file::{load_raw_sequence_file, load_sequence_file, DEFAULT_MAX_FILE_BYTES};
pub use parse::{
    gc_content, normalize, parse_sequence_column, parse_sequence_text, validate_dna,
    validate_pattern, DEFAULT_MAX_PATTERN_LEN,
};

use thiserror::Error;

/// Errors raised while preparing a sequence or pattern
#[derive(Debug, Error)]
pub enum SequenceError {
    #[error("sequence is empty")]
    Empty,

    #[error("invalid symbol '{symbol}' at offset {offset} (only A, T, C, G and N are allowed)")]
    InvalidSymbol { symbol: char, offset: usize },

    #[error("pattern is too long ({len} symbols, maximum {max})")]
    PatternTooLong { len: usize, max: usize },

    #[error("file is too large ({size} bytes, maximum {max})")]
    FileTooLarge { size: u64, max: u64 },

    #[error("column '{0}' not found in header")]
    MissingColumn(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
