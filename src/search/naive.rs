//! Brute-force reference matcher
//!
//! Compares the pattern against every candidate window. Quadratic in the
//! worst case, but trivially correct, which makes it the oracle the KMP
//! matcher is checked against.

/// Find every start offset of `pattern` in `sequence` by direct comparison.
///
/// Follows the same conventions as [`super::find_positions`]: ascending
/// offsets, vacuous inputs give an empty list, and without overlapping the
/// scan resumes at the end of each hit.
pub fn find_positions_naive(sequence: &[u8], pattern: &[u8], allow_overlapping: bool) -> Vec<usize> {
    let n = sequence.len();
    let m = pattern.len();
    let mut positions = Vec::new();

    if m == 0 || n == 0 || m > n {
        return positions;
    }

    let step_after_hit = if allow_overlapping { 1 } else { m };
    let mut start = 0usize;

    while start + m <= n {
        if &sequence[start..start + m] == pattern {
            positions.push(start);
            start += step_after_hit;
        } else {
            start += 1;
        }
    }

    positions
}
