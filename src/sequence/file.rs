use super::parse::{extract_column, join_sequence_lines, parse_sequence_column, parse_sequence_text};
use super::SequenceError;
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;

/// Largest sequence file accepted unless configured otherwise (150 MiB)
pub const DEFAULT_MAX_FILE_BYTES: u64 = 150 * 1024 * 1024;

/// Load a sequence from a plain text, FASTA or CSV file.
///
/// The file is memory-mapped rather than read into a buffer, so only the
/// parsed sequence is held in memory afterwards. When `column` is given the
/// file is treated as CSV with a header row and that column is extracted.
pub fn load_sequence_file(
    path: &Path,
    column: Option<&str>,
    max_bytes: u64,
) -> Result<String, SequenceError> {
    let mmap = map_file(path, max_bytes)?;
    let text = String::from_utf8_lossy(&mmap);

    match column {
        Some(column) => parse_sequence_column(&text, column),
        None => parse_sequence_text(&text),
    }
}

/// Like [`load_sequence_file`], but symbols are kept exactly as written: no
/// case folding, whitespace removal or alphabet check. Headers, commas, line
/// breaks and the `column` selection are still honored.
pub fn load_raw_sequence_file(
    path: &Path,
    column: Option<&str>,
    max_bytes: u64,
) -> Result<String, SequenceError> {
    let mmap = map_file(path, max_bytes)?;
    let text = String::from_utf8_lossy(&mmap);

    let sequence = match column {
        Some(column) => extract_column(&text, column)?,
        None => join_sequence_lines(&text),
    };

    if sequence.is_empty() {
        return Err(SequenceError::Empty);
    }
    Ok(sequence)
}

/// Open and map a file after checking its size against `max_bytes`
fn map_file(path: &Path, max_bytes: u64) -> Result<Mmap, SequenceError> {
    let file = File::open(path)?;
    let size = file.metadata()?.len();

    if size > max_bytes {
        return Err(SequenceError::FileTooLarge { size, max: max_bytes });
    }

    // Mapping a zero-length file fails on some platforms
    if size == 0 {
        return Err(SequenceError::Empty);
    }

    let mmap = unsafe { Mmap::map(&file)? };
    Ok(mmap)
}
