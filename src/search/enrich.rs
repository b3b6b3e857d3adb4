//! Context windows around match positions

use serde::{Deserialize, Serialize};

/// Number of symbols kept on each side of a match unless configured otherwise
pub const DEFAULT_CONTEXT_WINDOW: usize = 10;

/// A single hit with the symbols surrounding it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    /// Zero-based offset of the first matched symbol
    pub position: usize,
    /// Up to `window` symbols immediately before the match
    pub context_before: String,
    /// Up to `window` symbols immediately after the match
    pub context_after: String,
}

/// UTF-8 continuation byte (`10xxxxxx`)
#[inline]
fn is_continuation(byte: u8) -> bool {
    byte & 0xC0 == 0x80
}

/// Attach context windows to each position.
///
/// Windows are clipped at the sequence boundaries; no padding is added, so
/// matches near either end simply carry shorter context. A window edge that
/// would split a multi-byte UTF-8 symbol is pulled inward to the symbol
/// boundary, so each context is an exact slice of at most `window` bytes.
pub fn enrich_matches(
    sequence: &[u8],
    pattern_len: usize,
    window: usize,
    positions: &[usize],
) -> Vec<Match> {
    let n = sequence.len();

    positions
        .iter()
        .map(|&position| {
            let start = position.min(n);
            let end = position.saturating_add(pattern_len).min(n);

            let mut before_start = start.saturating_sub(window);
            while before_start < start && is_continuation(sequence[before_start]) {
                before_start += 1;
            }

            let mut after_end = end.saturating_add(window).min(n);
            while after_end > end && after_end < n && is_continuation(sequence[after_end]) {
                after_end -= 1;
            }

            let before = &sequence[before_start..start];
            let after = &sequence[end..after_end];

            Match {
                position,
                context_before: String::from_utf8_lossy(before).into_owned(),
                context_after: String::from_utf8_lossy(after).into_owned(),
            }
        })
        .collect()
}
