//! Linear-time pattern matcher driven by the failure table

use super::failure::build_failure_table;
use memchr::memchr;

/// Find every start offset of `pattern` in `sequence`.
///
/// Offsets are returned in ascending order. With `allow_overlapping` set, a
/// hit may begin before the previous one ends; otherwise each reported hit
/// starts at or after the end of the previous one.
///
/// An empty pattern, an empty sequence, or a pattern longer than the sequence
/// produce an empty list.
///
/// ```
/// use dnaseek::search::find_positions;
///
/// assert_eq!(find_positions(b"AAAA", b"AA", true), vec![0, 1, 2]);
/// assert_eq!(find_positions(b"AAAA", b"AA", false), vec![0, 2]);
/// ```
pub fn find_positions(sequence: &[u8], pattern: &[u8], allow_overlapping: bool) -> Vec<usize> {
    let n = sequence.len();
    let m = pattern.len();
    let mut positions = Vec::new();

    if m == 0 || n == 0 || m > n {
        return positions;
    }

    let table = build_failure_table(pattern);
    let first = pattern[0];

    let mut i = 0usize; // sequence cursor
    let mut j = 0usize; // pattern cursor

    while i < n {
        if j == 0 {
            // Nothing matched yet: jump to the next candidate start
            match memchr(first, &sequence[i..]) {
                Some(offset) => i += offset,
                None => break,
            }
            if n - i < m {
                break;
            }
        }

        if sequence[i] == pattern[j] {
            i += 1;
            j += 1;

            if j == m {
                let hit = i - m;
                positions.push(hit);

                if allow_overlapping {
                    j = table[m - 1];
                } else {
                    j = 0;
                    i = hit + m;
                }
            }
        } else if j != 0 {
            j = table[j - 1];
        } else {
            i += 1;
        }
    }

    positions
}
