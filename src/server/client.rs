//! Client for connecting to the search server

use crate::config::DEFAULT_MAX_MESSAGE_BYTES;
use crate::server::protocol::{
    read_message_limited, write_message, ErrorCode, Request, Response, SearchResponse,
    StatusResponse,
};
use std::io::{BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;
use thiserror::Error;

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in client operations
#[derive(Debug, Error)]
pub enum ClientError {
    /// Server is not running
    #[error("search server is not running")]
    NotRunning,
    /// Communication error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Server returned an error
    #[error("server error ({code}): {message}")]
    Server { code: ErrorCode, message: String },
    /// Invalid response
    #[error("invalid response from server")]
    InvalidResponse,
}

/// Client for the search server
pub struct SearchClient {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
    max_message_bytes: usize,
}

impl SearchClient {
    /// Try to connect to a running server.
    /// Returns None if nothing is listening (allowing fallback to local search)
    pub fn connect(addr: &str, timeout: Duration) -> Option<Self> {
        let stream = addr
            .to_socket_addrs()
            .ok()?
            .find_map(|sock| TcpStream::connect_timeout(&sock, timeout).ok())?;

        let _ = stream.set_read_timeout(Some(timeout));
        let _ = stream.set_write_timeout(Some(timeout));
        let _ = stream.set_nodelay(true);

        let reader = BufReader::new(stream.try_clone().ok()?);
        let writer = BufWriter::new(stream);

        Some(Self {
            reader,
            writer,
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
        })
    }

    /// Connect or return an error (for when the server is required)
    pub fn connect_required(addr: &str, timeout: Duration) -> ClientResult<Self> {
        Self::connect(addr, timeout).ok_or(ClientError::NotRunning)
    }

    /// Set the largest response frame accepted
    pub fn with_max_message_bytes(mut self, max: usize) -> Self {
        self.max_message_bytes = max;
        self
    }

    fn roundtrip(&mut self, request: &Request) -> ClientResult<Response> {
        write_message(&mut self.writer, request)?;
        let response = read_message_limited(&mut self.reader, self.max_message_bytes)?;

        match response {
            Response::Error { code, message } => Err(ClientError::Server { code, message }),
            other => Ok(other),
        }
    }

    /// Execute a search
    pub fn search(
        &mut self,
        sequence: &str,
        pattern: &str,
        allow_overlapping: bool,
    ) -> ClientResult<SearchResponse> {
        let request = Request::Search {
            sequence: sequence.to_string(),
            pattern: pattern.to_string(),
            allow_overlapping,
        };

        match self.roundtrip(&request)? {
            Response::Search(sr) => Ok(sr),
            _ => Err(ClientError::InvalidResponse),
        }
    }

    /// Get server status
    pub fn status(&mut self) -> ClientResult<StatusResponse> {
        match self.roundtrip(&Request::Status)? {
            Response::Status(status) => Ok(status),
            _ => Err(ClientError::InvalidResponse),
        }
    }

    /// Request graceful shutdown
    pub fn shutdown(&mut self) -> ClientResult<()> {
        match self.roundtrip(&Request::Shutdown)? {
            Response::ShuttingDown => Ok(()),
            _ => Err(ClientError::InvalidResponse),
        }
    }

    /// Ping the server
    pub fn ping(&mut self) -> ClientResult<()> {
        match self.roundtrip(&Request::Ping)? {
            Response::Pong => Ok(()),
            _ => Err(ClientError::InvalidResponse),
        }
    }
}
