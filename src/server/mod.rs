//! Search service over TCP
//!
//! Architecture:
//! - [`SearchServer`]: owns a [`crate::search::SearchService`], listens on a
//!   TCP address, answers length-prefixed JSON requests
//! - [`SearchClient`]: connects, sends requests, receives responses
//! - Fallback: if the server is unreachable, callers search in-process

mod client;
pub mod daemon;
pub mod protocol;

pub use client::{ClientError, ClientResult, SearchClient};
pub use daemon::SearchServer;

use std::time::Duration;

/// Timeout used when probing whether a server is up
const PROBE_TIMEOUT: Duration = Duration::from_millis(500);

/// Check if a server answers pings at the given address
pub fn is_server_running(addr: &str) -> bool {
    SearchClient::connect(addr, PROBE_TIMEOUT)
        .map(|mut client| client.ping().is_ok())
        .unwrap_or(false)
}
