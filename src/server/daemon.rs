//! Search server
//!
//! Accepts TCP connections and answers search requests, one thread per
//! connection. The search itself runs to completion on the connection's
//! thread; there is nothing to cancel.

use crate::config::{get_app_data_dir, AppConfig};
use crate::search::{SearchError, SearchRequest, SearchService, Searcher};
use crate::server::protocol::{
    is_message_too_large, read_message_limited, write_message, ErrorCode, Request, Response,
    SearchResponse, StatusResponse,
};
use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::{BufReader, BufWriter};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener, TcpStream};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread;
use std::time::Instant;

/// Statistics for the server
struct ServerStats {
    start_time: Instant,
    searches_served: AtomicU64,
    invalid_requests: AtomicU64,
    total_matches_reported: AtomicU64,
}

impl ServerStats {
    fn new() -> Self {
        Self {
            start_time: Instant::now(),
            searches_served: AtomicU64::new(0),
            invalid_requests: AtomicU64::new(0),
            total_matches_reported: AtomicU64::new(0),
        }
    }
}

/// The search server
pub struct SearchServer<S = Searcher> {
    service: S,
    config: AppConfig,
    stats: ServerStats,
    /// Shutdown flag
    shutdown: AtomicBool,
    /// Address used to wake the accept loop after a shutdown request
    wake_addr: OnceLock<SocketAddr>,
}

impl SearchServer<Searcher> {
    /// Create a server backed by a [`Searcher`] built from the config
    pub fn new(config: AppConfig) -> Arc<Self> {
        let searcher = Searcher::new(config.search_options());
        Self::with_service(searcher, config)
    }
}

impl<S: SearchService + 'static> SearchServer<S> {
    /// Create a server around any search implementation. Status replies
    /// report the service's own options; the config only supplies transport
    /// settings.
    pub fn with_service(service: S, config: AppConfig) -> Arc<Self> {
        Arc::new(Self {
            service,
            config,
            stats: ServerStats::new(),
            shutdown: AtomicBool::new(false),
            wake_addr: OnceLock::new(),
        })
    }

    /// Bind the configured address and serve until shut down (blocking)
    pub fn run(self: &Arc<Self>) -> Result<()> {
        let listener = TcpListener::bind(&self.config.listen_addr)
            .with_context(|| format!("Failed to bind to {}", self.config.listen_addr))?;
        self.serve(listener)
    }

    /// Serve on an already bound listener until shut down (blocking)
    pub fn serve(self: &Arc<Self>, listener: TcpListener) -> Result<()> {
        let local_addr = listener.local_addr()?;
        let _ = self.wake_addr.set(connectable(local_addr));

        let options = self.service.search_options();
        tracing::info!(
            addr = %local_addr,
            algorithm = options.algorithm.identifier(),
            context_window = options.context_window,
            "listening"
        );

        let timeout = self.config.io_timeout();

        for stream in listener.incoming() {
            if self.shutdown.load(Ordering::Relaxed) {
                break;
            }

            match stream {
                Ok(stream) => {
                    let _ = stream.set_read_timeout(Some(timeout));
                    let _ = stream.set_write_timeout(Some(timeout));
                    let _ = stream.set_nodelay(true);

                    let server = Arc::clone(self);
                    thread::spawn(move || {
                        let peer = stream.peer_addr().ok();
                        if let Err(e) = server.handle_connection(stream) {
                            tracing::warn!(peer = ?peer, error = %e, "connection error");
                        }
                    });
                }
                Err(e) => {
                    tracing::warn!(error = %e, "accept error");
                }
            }
        }

        tracing::info!("server stopped");
        Ok(())
    }

    /// Whether a shutdown has been requested
    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    /// Handle a single client connection
    fn handle_connection(&self, stream: TcpStream) -> Result<()> {
        let mut reader = BufReader::new(stream.try_clone()?);
        let mut writer = BufWriter::new(stream);

        loop {
            let request: Request = match read_message_limited(&mut reader, self.config.max_message_bytes) {
                Ok(req) => req,
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    // Client disconnected
                    break;
                }
                Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                    self.stats.invalid_requests.fetch_add(1, Ordering::Relaxed);
                    let resp = Response::Error {
                        code: ErrorCode::BadRequest,
                        message: format!("Invalid request: {}", e),
                    };
                    write_message(&mut writer, &resp)?;

                    // The unread body of an oversized frame desyncs the stream
                    if is_message_too_large(&e) {
                        break;
                    }
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let response = self.handle_request(request);
            write_message(&mut writer, &response)?;

            if matches!(response, Response::ShuttingDown) {
                self.wake_accept_loop();
                break;
            }
        }

        Ok(())
    }

    /// Handle a single request
    fn handle_request(&self, request: Request) -> Response {
        match request {
            Request::Search {
                sequence,
                pattern,
                allow_overlapping,
            } => self.handle_search(&sequence, &pattern, allow_overlapping),

            Request::Status => self.handle_status(),

            Request::Shutdown => {
                tracing::info!("shutdown requested");
                self.shutdown.store(true, Ordering::Relaxed);
                Response::ShuttingDown
            }

            Request::Ping => Response::Pong,
        }
    }

    /// Handle a search request
    fn handle_search(&self, sequence: &str, pattern: &str, allow_overlapping: bool) -> Response {
        let request = SearchRequest::new(sequence.as_bytes(), pattern.as_bytes(), allow_overlapping);

        match self.service.search(&request) {
            Ok(result) => {
                self.stats.searches_served.fetch_add(1, Ordering::Relaxed);
                self.stats
                    .total_matches_reported
                    .fetch_add(result.total_matches as u64, Ordering::Relaxed);

                tracing::info!(
                    sequence_len = sequence.len(),
                    pattern_len = pattern.len(),
                    allow_overlapping,
                    matches = result.total_matches,
                    elapsed_ms = result.elapsed_ms(),
                    "search"
                );

                Response::Search(SearchResponse::from(result))
            }
            Err(SearchError::InvalidInput(message)) => {
                self.stats.invalid_requests.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(%message, "rejected search");

                Response::Error {
                    code: ErrorCode::InvalidArgument,
                    message,
                }
            }
        }
    }

    /// Handle status request
    fn handle_status(&self) -> Response {
        let options = self.service.search_options();

        Response::Status(StatusResponse {
            uptime_secs: self.stats.start_time.elapsed().as_secs(),
            searches_served: self.stats.searches_served.load(Ordering::Relaxed),
            invalid_requests: self.stats.invalid_requests.load(Ordering::Relaxed),
            total_matches_reported: self.stats.total_matches_reported.load(Ordering::Relaxed),
            algorithm: options.algorithm.identifier().to_string(),
            context_window: options.context_window,
        })
    }

    /// The accept loop only re-checks the shutdown flag when a connection
    /// arrives, so make one
    fn wake_accept_loop(&self) {
        if let Some(addr) = self.wake_addr.get() {
            let _ = TcpStream::connect_timeout(addr, self.config.io_timeout());
        }
    }
}

/// Map a wildcard bind address to the matching loopback address
fn connectable(addr: SocketAddr) -> SocketAddr {
    match addr.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), addr.port()),
        IpAddr::V6(ip) if ip.is_unspecified() => SocketAddr::new(IpAddr::V6(Ipv6Addr::LOCALHOST), addr.port()),
        _ => addr,
    }
}

/// Run the server in the foreground
pub fn run_foreground(config: AppConfig) -> Result<()> {
    let server = SearchServer::new(config);
    server.run()
}

/// Start the server as a detached child process running `serve`.
///
/// The child's stderr goes to `server.log` in the app data directory.
pub fn spawn_background() -> Result<u32> {
    let exe = std::env::current_exe().context("Failed to locate current executable")?;
    let log_path = log_path()?;
    let log = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open {}", log_path.display()))?;

    let child = Command::new(exe)
        .arg("serve")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::from(log))
        .spawn()
        .context("Failed to spawn server process")?;

    tracing::debug!(pid = child.id(), log = %log_path.display(), "spawned server");
    Ok(child.id())
}

/// Path of the background server's log file
pub fn log_path() -> Result<PathBuf> {
    Ok(get_app_data_dir()?.join("server.log"))
}
