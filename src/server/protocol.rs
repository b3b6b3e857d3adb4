//! Wire format between the search client and server
//!
//! Every frame is a little-endian `u32` byte count followed by that many
//! bytes of JSON. Frames above the configured ceiling are refused before the
//! body is allocated.

use crate::config::DEFAULT_MAX_MESSAGE_BYTES;
use crate::search::SearchResult;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

pub use crate::search::Match;

/// Client-to-server message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    /// Search a sequence for every occurrence of a pattern
    Search {
        sequence: String,
        pattern: String,
        #[serde(default = "default_allow_overlapping")]
        allow_overlapping: bool,
    },

    /// Uptime and counters
    Status,

    /// Stop accepting connections and exit
    Shutdown,

    /// Liveness check
    Ping,
}

fn default_allow_overlapping() -> bool {
    true
}

/// Server-to-client message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Response {
    /// Matches for a `Search` request
    Search(SearchResponse),

    /// Reply to `Status`
    Status(StatusResponse),

    /// Shutdown acknowledged
    ShuttingDown,

    /// Reply to `Ping`
    Pong,

    /// Error response; carries no search body
    Error { code: ErrorCode, message: String },
}

/// Failure category for [`Response::Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Empty sequence or pattern
    InvalidArgument,
    /// Frame could not be decoded
    BadRequest,
    /// Anything else on the server side
    Internal,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::InvalidArgument => write!(f, "invalid argument"),
            ErrorCode::BadRequest => write!(f, "bad request"),
            ErrorCode::Internal => write!(f, "internal"),
        }
    }
}

/// Matches and timing for one search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Matches in ascending position order
    pub matches: Vec<Match>,
    /// Equal to `matches.len()`
    pub total_matches: u64,
    /// Matching + enrichment time in milliseconds
    pub elapsed_time_ms: f64,
    /// Matching strategy identifier
    pub algorithm_used: String,
}

impl From<SearchResult> for SearchResponse {
    fn from(result: SearchResult) -> Self {
        Self {
            elapsed_time_ms: result.elapsed_ms(),
            total_matches: result.total_matches as u64,
            algorithm_used: result.algorithm.to_string(),
            matches: result.matches,
        }
    }
}

/// Server counters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Seconds since the server started
    pub uptime_secs: u64,
    /// Successful searches answered
    pub searches_served: u64,
    /// Requests rejected as invalid
    pub invalid_requests: u64,
    /// Sum of `total_matches` over all answered searches
    pub total_matches_reported: u64,
    /// Matching strategy identifier in use
    pub algorithm: String,
    /// Symbols of context per side
    pub context_window: usize,
}

/// Write a message to a stream with length prefix
pub fn write_message<W: Write>(writer: &mut W, msg: &impl Serialize) -> std::io::Result<()> {
    let json = serde_json::to_vec(msg).map_err(|e| {
        std::io::Error::new(std::io::ErrorKind::InvalidData, e)
    })?;

    let len = u32::try_from(json.len()).map_err(|_| {
        std::io::Error::new(std::io::ErrorKind::InvalidData, "Message too large")
    })?;
    writer.write_all(&len.to_le_bytes())?;
    writer.write_all(&json)?;
    writer.flush()?;

    Ok(())
}

/// Read a message from a stream with length prefix, using the default size
/// ceiling
pub fn read_message<R: Read, T: for<'de> Deserialize<'de>>(reader: &mut R) -> std::io::Result<T> {
    read_message_limited(reader, DEFAULT_MAX_MESSAGE_BYTES)
}

/// Read a message from a stream with length prefix.
///
/// Frames longer than `max_len` are rejected before any allocation. The body
/// of a rejected frame is left unread, so the stream should be dropped.
pub fn read_message_limited<R: Read, T: for<'de> Deserialize<'de>>(
    reader: &mut R,
    max_len: usize,
) -> std::io::Result<T> {
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf)?;
    let len = u32::from_le_bytes(len_buf) as usize;

    if len > max_len {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            MessageTooLarge { len, max: max_len },
        ));
    }

    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf)?;

    serde_json::from_slice(&buf).map_err(|e| {
        std::io::Error::new(std::io::ErrorKind::InvalidData, e)
    })
}

/// Frame length exceeded the configured ceiling
#[derive(Debug, thiserror::Error)]
#[error("message too large ({len} bytes, maximum {max})")]
pub struct MessageTooLarge {
    pub len: usize,
    pub max: usize,
}

/// Whether an I/O error came from an oversized frame
pub fn is_message_too_large(err: &std::io::Error) -> bool {
    err.get_ref()
        .is_some_and(|inner| inner.is::<MessageTooLarge>())
}
