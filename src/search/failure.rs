//! Failure table (prefix function) construction
//!
//! Entry `i` of the table holds the length of the longest proper prefix of
//! `pattern[..=i]` that is also a suffix of it. The matcher uses it to resume
//! after a mismatch without re-reading sequence symbols it already consumed.

/// Build the failure table for a pattern.
///
/// Runs in O(M) and allocates only the returned table. An empty pattern
/// yields an empty table.
pub fn build_failure_table(pattern: &[u8]) -> Vec<usize> {
    let mut table = vec![0usize; pattern.len()];
    let mut len = 0usize;
    let mut i = 1usize;

    while i < pattern.len() {
        if pattern[i] == pattern[len] {
            len += 1;
            table[i] = len;
            i += 1;
        } else if len != 0 {
            // Fall back to the next shorter border, keep i
            len = table[len - 1];
        } else {
            table[i] = 0;
            i += 1;
        }
    }

    table
}
