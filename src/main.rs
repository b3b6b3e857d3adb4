use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use dnaseek::config::AppConfig;
use dnaseek::output::{self, PatternReport};
use dnaseek::search::{Algorithm, SearchRequest, Searcher};
use dnaseek::sequence::{
    gc_content, load_raw_sequence_file, load_sequence_file, normalize, validate_dna, validate_pattern,
};
use dnaseek::server::protocol::{ErrorCode, SearchResponse};
use dnaseek::server::{self, daemon, ClientError, SearchClient};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use termcolor::ColorChoice;

#[derive(Parser)]
#[command(name = "dnaseek", version)]
#[command(about = "Exact pattern search over DNA sequences")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Find every occurrence of one or more patterns
    Search(SearchArgs),
    /// Run the search server in the foreground
    Serve,
    /// Manage a background search server
    Server {
        #[command(subcommand)]
        action: ServerAction,
    },
    /// Show sequence length and GC content
    Stats {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Print the effective configuration
    Config {
        /// Write the effective configuration to the config file
        #[arg(long)]
        save: bool,
    },
}

#[derive(Subcommand)]
enum ServerAction {
    /// Start the server in background
    Start,
    /// Stop the running server
    Stop,
    /// Check server status
    Status,
    /// Check that the server answers
    Ping,
}

#[derive(Args)]
struct InputArgs {
    /// Sequence given on the command line
    #[arg(short, long, conflicts_with = "file", required_unless_present = "file")]
    sequence: Option<String>,

    /// Read the sequence from a plain text, FASTA or CSV file
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// CSV column holding the sequence (with --file)
    #[arg(long, requires = "file")]
    column: Option<String>,

    /// Search symbols as given: no normalization or alphabet check
    #[arg(long)]
    raw: bool,
}

#[derive(Args)]
struct SearchArgs {
    /// Patterns to search for
    #[arg(required = true)]
    patterns: Vec<String>,

    #[command(flatten)]
    input: InputArgs,

    /// Allow matches to overlap
    #[arg(short, long)]
    overlap: bool,

    /// Symbols of context on each side (forces a local search)
    #[arg(short = 'C', long)]
    context: Option<usize>,

    /// Matching algorithm: kmp or naive (forces a local search)
    #[arg(long)]
    algorithm: Option<Algorithm>,

    /// Print results as JSON
    #[arg(long, conflicts_with = "count")]
    json: bool,

    /// Only print the number of matches per pattern
    #[arg(short, long)]
    count: bool,

    /// Never use the search server
    #[arg(long)]
    local: bool,

    /// When to use colors
    #[arg(long, value_enum, default_value_t = ColorWhen::Auto)]
    color: ColorWhen,
}

#[derive(Clone, Copy, ValueEnum)]
enum ColorWhen {
    Auto,
    Always,
    Never,
}

impl From<ColorWhen> for ColorChoice {
    fn from(when: ColorWhen) -> Self {
        match when {
            ColorWhen::Auto => ColorChoice::Auto,
            ColorWhen::Always => ColorChoice::Always,
            ColorWhen::Never => ColorChoice::Never,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_directive = match (cli.verbose, &cli.command) {
        (0, Commands::Serve) => "info",
        (0, _) => "warn",
        (1, _) => "debug",
        _ => "trace",
    };
    dnaseek::logging::init(default_directive);

    let config = AppConfig::load()?;

    match cli.command {
        Commands::Search(args) => run_search(args, &config)?,
        Commands::Serve => daemon::run_foreground(config)?,
        Commands::Server { action } => handle_server_command(action, &config)?,
        Commands::Stats { input } => {
            let seq = read_sequence(&input, &config)?;
            println!("length: {}", seq.len());
            println!("GC content: {:.2}%", gc_content(seq.as_bytes()));
        }
        Commands::Config { save } => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            if save {
                let path = config.save()?;
                eprintln!("Saved to {}", path.display());
            }
        }
    }

    Ok(())
}

/// Load the sequence from the command line or a file
fn read_sequence(input: &InputArgs, config: &AppConfig) -> Result<String> {
    if let Some(path) = &input.file {
        let load = if input.raw {
            load_raw_sequence_file
        } else {
            load_sequence_file
        };

        return load(path, input.column.as_deref(), config.max_file_bytes)
            .with_context(|| format!("Failed to load sequence from {}", path.display()));
    }

    let raw = input.sequence.clone().unwrap_or_default();
    if input.raw {
        return Ok(raw);
    }

    let normalized = normalize(&raw);
    validate_dna(&normalized).context("Invalid sequence")?;
    Ok(normalized)
}

fn run_search(args: SearchArgs, config: &AppConfig) -> Result<()> {
    let sequence = read_sequence(&args.input, config)?;

    let patterns: Vec<String> = if args.input.raw {
        args.patterns.clone()
    } else {
        args.patterns
            .iter()
            .map(|p| validate_pattern(p, config.max_pattern_len))
            .collect::<Result<_, _>>()
            .context("Invalid pattern")?
    };

    // The server applies its own context window and algorithm
    let use_server = !args.local && args.context.is_none() && args.algorithm.is_none();

    let remote = if use_server {
        search_remote(&sequence, &patterns, args.overlap, config)?
    } else {
        None
    };

    let (source, responses) = match remote {
        Some(responses) => ("server", responses),
        None => {
            let mut options = config.search_options();
            if let Some(context) = args.context {
                options.context_window = context;
            }
            if let Some(algorithm) = args.algorithm {
                options.algorithm = algorithm;
            }
            ("local", search_local(&sequence, &patterns, args.overlap, Searcher::new(options))?)
        }
    };

    let reports: Vec<PatternReport<'_>> = patterns
        .iter()
        .zip(responses.iter())
        .map(|(pattern, response)| PatternReport {
            pattern: pattern.as_str(),
            source,
            response,
        })
        .collect();

    if args.json {
        output::print_json(&reports)?;
    } else if args.count {
        output::print_match_counts(&reports, args.color.into())?;
    } else {
        output::print_search_results(&reports, args.color.into())?;
    }

    Ok(())
}

/// Search through the server. `Ok(None)` means the caller should fall back
/// to a local search.
fn search_remote(
    sequence: &str,
    patterns: &[String],
    allow_overlapping: bool,
    config: &AppConfig,
) -> Result<Option<Vec<SearchResponse>>> {
    let Some(client) = SearchClient::connect(&config.listen_addr, config.io_timeout()) else {
        tracing::debug!(addr = %config.listen_addr, "server not reachable, searching locally");
        return Ok(None);
    };
    let mut client = client.with_max_message_bytes(config.max_message_bytes);

    let mut responses = Vec::with_capacity(patterns.len());
    for pattern in patterns {
        match client.search(sequence, pattern, allow_overlapping) {
            Ok(response) => responses.push(response),
            Err(ClientError::Server {
                code: ErrorCode::InvalidArgument,
                message,
            }) => bail!("Invalid search: {}", message),
            Err(e) => {
                tracing::warn!(error = %e, "server search failed, falling back to local search");
                return Ok(None);
            }
        }
    }

    Ok(Some(responses))
}

/// Search in-process, all patterns in parallel
fn search_local(
    sequence: &str,
    patterns: &[String],
    allow_overlapping: bool,
    searcher: Searcher,
) -> Result<Vec<SearchResponse>> {
    let requests: Vec<SearchRequest<'_>> = patterns
        .iter()
        .map(|p| SearchRequest::new(sequence.as_bytes(), p.as_bytes(), allow_overlapping))
        .collect();

    searcher
        .search_many(&requests)
        .into_iter()
        .map(|result| result.map(SearchResponse::from).map_err(anyhow::Error::from))
        .collect()
}

fn handle_server_command(action: ServerAction, config: &AppConfig) -> Result<()> {
    let addr = config.listen_addr.as_str();

    match action {
        ServerAction::Start => {
            if server::is_server_running(addr) {
                println!("Server is already running on {}", addr);
                return Ok(());
            }

            println!("Starting dnaseek server...");
            let pid = daemon::spawn_background()?;

            // Wait a moment for the server to bind
            std::thread::sleep(Duration::from_millis(500));

            if server::is_server_running(addr) {
                println!("Server started (pid {}, listening on {})", pid, addr);
            } else {
                println!(
                    "Server may have failed to start. Check {}",
                    daemon::log_path()?.display()
                );
            }
        }

        ServerAction::Stop => match SearchClient::connect(addr, config.io_timeout()) {
            Some(mut client) => {
                client.shutdown()?;
                println!("Server stopped");
            }
            None => println!("Server is not running"),
        },

        ServerAction::Status => {
            let Some(mut client) = SearchClient::connect(addr, config.io_timeout()) else {
                println!("Server is not running");
                return Ok(());
            };

            match client.status() {
                Ok(status) => {
                    println!("dnaseek server status ({}):", addr);
                    println!("  Uptime: {}s", status.uptime_secs);
                    println!("  Searches served: {}", status.searches_served);
                    println!("  Invalid requests: {}", status.invalid_requests);
                    println!("  Matches reported: {}", status.total_matches_reported);
                    println!("  Algorithm: {}", status.algorithm);
                    println!("  Context window: {}", status.context_window);
                }
                Err(e) => {
                    println!("Failed to get status: {}", e);
                }
            }
        }

        ServerAction::Ping => {
            let mut client = SearchClient::connect_required(addr, config.io_timeout())?;
            let start = Instant::now();
            client.ping()?;
            println!("pong from {} ({:.3} ms)", addr, start.elapsed().as_secs_f64() * 1000.0);
        }
    }

    Ok(())
}
