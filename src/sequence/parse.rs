use super::SequenceError;

/// Longest pattern accepted by [`validate_pattern`] unless configured otherwise
pub const DEFAULT_MAX_PATTERN_LEN: usize = 1000;

/// Lookup table for the accepted nucleotide alphabet
const DNA_SYMBOLS: [bool; 256] = {
    let mut table = [false; 256];
    table[b'A' as usize] = true;
    table[b'T' as usize] = true;
    table[b'C' as usize] = true;
    table[b'G' as usize] = true;
    table[b'N' as usize] = true;
    table
};

/// Remove all whitespace (including line breaks) and uppercase the rest
pub fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if !c.is_whitespace() {
            out.push(c.to_ascii_uppercase());
        }
    }
    out
}

/// Check that a normalized sequence is non-empty and uses only `ATCGN`.
///
/// Returns the input unchanged on success so calls can be chained.
pub fn validate_dna(seq: &str) -> Result<&str, SequenceError> {
    if seq.is_empty() {
        return Err(SequenceError::Empty);
    }

    // Fast path over bytes; only fall back to chars to report the culprit
    if seq.bytes().all(|b| DNA_SYMBOLS[b as usize]) {
        return Ok(seq);
    }

    let (offset, symbol) = seq
        .chars()
        .enumerate()
        .find(|(_, c)| !c.is_ascii() || !DNA_SYMBOLS[*c as usize])
        .unwrap_or((0, '?'));

    Err(SequenceError::InvalidSymbol { symbol, offset })
}

/// Normalize and validate a search pattern, enforcing a length cap
pub fn validate_pattern(raw: &str, max_len: usize) -> Result<String, SequenceError> {
    let pattern = normalize(raw);
    validate_dna(&pattern)?;

    if pattern.len() > max_len {
        return Err(SequenceError::PatternTooLong {
            len: pattern.len(),
            max: max_len,
        });
    }

    Ok(pattern)
}

/// Parse plain text, FASTA or simple comma-separated input into one sequence.
///
/// Header lines (starting with `>`) are skipped, commas dropped, and the
/// remaining lines concatenated before normalization. Multi-record FASTA input
/// is therefore joined into a single sequence.
pub fn parse_sequence_text(raw: &str) -> Result<String, SequenceError> {
    let normalized = normalize(&join_sequence_lines(raw));
    validate_dna(&normalized)?;
    Ok(normalized)
}

/// Extract one named column from comma-separated input with a header row,
/// concatenating its values over all rows.
pub fn parse_sequence_column(raw: &str, column: &str) -> Result<String, SequenceError> {
    let normalized = normalize(&extract_column(raw, column)?);
    validate_dna(&normalized)?;
    Ok(normalized)
}

/// Layout-only half of [`parse_sequence_text`]: skip headers, drop commas and
/// line breaks. Symbols are left untouched.
pub(crate) fn join_sequence_lines(raw: &str) -> String {
    let mut joined = String::with_capacity(raw.len());

    for line in raw.lines() {
        if line.starts_with('>') {
            continue;
        }
        joined.extend(line.chars().filter(|&c| c != ','));
    }

    joined
}

/// Layout-only half of [`parse_sequence_column`]
pub(crate) fn extract_column(raw: &str, column: &str) -> Result<String, SequenceError> {
    let mut lines = raw.lines();

    let header = lines.next().ok_or(SequenceError::Empty)?;
    let index = header
        .split(',')
        .position(|name| name.trim() == column)
        .ok_or_else(|| SequenceError::MissingColumn(column.to_string()))?;

    let mut joined = String::new();
    for line in lines {
        if let Some(value) = line.split(',').nth(index) {
            joined.push_str(value);
        }
    }

    Ok(joined)
}

/// Percentage of `G` and `C` symbols; 0.0 for an empty sequence
pub fn gc_content(seq: &[u8]) -> f64 {
    if seq.is_empty() {
        return 0.0;
    }

    let gc = seq.iter().filter(|&&b| matches!(b, b'G' | b'C' | b'g' | b'c')).count();
    (gc as f64 / seq.len() as f64) * 100.0
}
