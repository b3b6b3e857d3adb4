//! Integration tests for the dnaseek command line.
//!
//! Every run gets a private data directory so a user's config file or a
//! running server never leaks into the results.

use dnaseek::config::AppConfig;
use dnaseek::server::{SearchClient, SearchServer};
use std::fs;
use std::net::{SocketAddr, TcpListener};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tempfile::TempDir;

/// Get path to dnaseek binary
fn dnaseek_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_dnaseek"))
}

/// Run dnaseek with given args inside an isolated home
fn run_dnaseek(args: &[&str], home: &Path) -> (String, String, bool) {
    run_dnaseek_with_env(args, home, &[])
}

/// Run dnaseek inside an isolated home with extra environment variables
fn run_dnaseek_with_env(args: &[&str], home: &Path, env: &[(&str, &str)]) -> (String, String, bool) {
    let output = Command::new(dnaseek_binary())
        .args(args)
        .env("HOME", home)
        .env("XDG_DATA_HOME", home.join("data"))
        .env_remove("DNASEEK_ADDR")
        .env_remove("DNASEEK_PORT")
        .env_remove("DNASEEK_CONTEXT_WINDOW")
        .env_remove("RUST_LOG")
        .envs(env.iter().copied())
        .output()
        .expect("Failed to run dnaseek");

    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.success(),
    )
}

/// Write `config.json` where the binary will look for it
fn write_config(home: &Path, json: &str) {
    let dir = home.join("data").join("dnaseek");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("config.json"), json).unwrap();
}

/// Start an in-process server on an ephemeral port
fn start_server(config: AppConfig) -> (SocketAddr, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind test listener");
    let addr = listener.local_addr().unwrap();

    let server = SearchServer::new(config);
    let handle = thread::spawn(move || {
        server.serve(listener).expect("server failed");
    });

    (addr, handle)
}

fn stop_server(addr: SocketAddr, handle: JoinHandle<()>) {
    SearchClient::connect(&addr.to_string(), Duration::from_secs(5))
        .expect("server should still be up")
        .shutdown()
        .unwrap();
    handle.join().unwrap();
}

/// Run a local, uncoloured search
fn search(extra: &[&str], home: &Path) -> (String, String, bool) {
    let mut args = vec!["search", "--local", "--color", "never"];
    args.extend(extra);
    run_dnaseek(&args, home)
}

#[test]
fn test_search_plain_output() {
    let home = TempDir::new().unwrap();
    let (out, err, ok) = search(&["-s", "ATCGATCG", "TCG"], home.path());

    assert!(ok, "search should succeed: {}", err);
    let lines: Vec<&str> = out.lines().collect();
    assert!(lines[0].starts_with("TCG: 2 matches ("), "header: {}", lines[0]);
    assert!(lines[0].ends_with(", KMP, local)"), "header: {}", lines[0]);
    assert_eq!(&lines[1..], &["1:ATCGATCG", "5:ATCGATCG"]);
}

#[test]
fn test_search_normalizes_input() {
    let home = TempDir::new().unwrap();
    let (out, err, ok) = search(&["-s", "  atcg atcg\n", "tcg", "-c"], home.path());

    assert!(ok, "search should succeed: {}", err);
    assert_eq!(out, "TCG:2\n");
}

#[test]
fn test_overlap_flag() {
    let home = TempDir::new().unwrap();

    let (out, _, ok) = search(&["-s", "AAAA", "AA", "-c"], home.path());
    assert!(ok);
    assert_eq!(out, "AA:2\n");

    let (out, _, ok) = search(&["-s", "AAAA", "AA", "-c", "--overlap"], home.path());
    assert!(ok);
    assert_eq!(out, "AA:3\n");
}

#[test]
fn test_multiple_patterns_keep_order() {
    let home = TempDir::new().unwrap();
    let (out, _, ok) = search(&["-s", "ACGTACGTTT", "TT", "ACG", "GGG", "-c"], home.path());

    assert!(ok);
    assert_eq!(out, "TT:1\nACG:2\nGGG:0\n");
}

#[test]
fn test_json_output() {
    let home = TempDir::new().unwrap();
    let (out, err, ok) = search(&["-s", "GGGGATTACAGGGG", "TTA", "--json", "-C", "2"], home.path());

    assert!(ok, "search should succeed: {}", err);
    let json: serde_json::Value = serde_json::from_str(&out).expect("valid JSON");
    let report = &json[0];

    assert_eq!(report["pattern"], "TTA");
    assert_eq!(report["source"], "local");
    assert_eq!(report["total_matches"], 1);
    assert_eq!(report["algorithm_used"], "KMP");
    assert_eq!(report["matches"][0]["position"], 5);
    assert_eq!(report["matches"][0]["context_before"], "GA");
    assert_eq!(report["matches"][0]["context_after"], "CA");
}

#[test]
fn test_naive_algorithm_flag() {
    let home = TempDir::new().unwrap();
    let (out, _, ok) = search(&["-s", "ABABABAB", "ABAB", "--raw", "--algorithm", "naive", "--json"], home.path());

    assert!(ok);
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json[0]["algorithm_used"], "naive-local");
    assert_eq!(json[0]["total_matches"], 2);
}

#[test]
fn test_invalid_symbols_rejected() {
    let home = TempDir::new().unwrap();

    let (_, err, ok) = search(&["-s", "ACGXT", "CG"], home.path());
    assert!(!ok, "invalid sequence should fail");
    assert!(err.contains("Invalid sequence"), "stderr: {}", err);

    let (_, err, ok) = search(&["-s", "ACGT", "C-G"], home.path());
    assert!(!ok, "invalid pattern should fail");
    assert!(err.contains("Invalid pattern"), "stderr: {}", err);
}

#[test]
fn test_raw_mode_accepts_any_symbols() {
    let home = TempDir::new().unwrap();
    let (out, _, ok) = search(&["-s", "xyzxyz", "yz", "--raw", "-c"], home.path());

    assert!(ok);
    assert_eq!(out, "yz:2\n");
}

#[test]
fn test_fasta_file_input() {
    let home = TempDir::new().unwrap();
    let fasta = home.path().join("sample.fa");
    fs::write(&fasta, ">chr1 test\nACGTAC\nGTACGT\n>chr2\nTTTT\n").unwrap();

    let (out, err, ok) = search(&["-f", fasta.to_str().unwrap(), "CGTA", "-c"], home.path());
    assert!(ok, "search should succeed: {}", err);
    assert_eq!(out, "CGTA:2\n");
}

#[test]
fn test_csv_column_input() {
    let home = TempDir::new().unwrap();
    let csv = home.path().join("sample.csv");
    fs::write(&csv, "id,sequence\n1,ACGT\n2,ACGT\n").unwrap();

    let (out, err, ok) = search(
        &["-f", csv.to_str().unwrap(), "--column", "sequence", "GTAC", "-c"],
        home.path(),
    );
    assert!(ok, "search should succeed: {}", err);
    assert_eq!(out, "GTAC:1\n");
}

#[test]
fn test_stats_command() {
    let home = TempDir::new().unwrap();
    let (out, err, ok) = run_dnaseek(&["stats", "-s", "GGCCAATT"], home.path());

    assert!(ok, "stats should succeed: {}", err);
    assert!(out.contains("length: 8"), "stdout: {}", out);
    assert!(out.contains("GC content: 50.00%"), "stdout: {}", out);
}

#[test]
fn test_config_honours_environment() {
    let home = TempDir::new().unwrap();
    let output = Command::new(dnaseek_binary())
        .arg("config")
        .env("HOME", home.path())
        .env("XDG_DATA_HOME", home.path().join("data"))
        .env_remove("DNASEEK_ADDR")
        .env("DNASEEK_PORT", "6000")
        .env("DNASEEK_CONTEXT_WINDOW", "4")
        .output()
        .expect("Failed to run dnaseek");

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["listen_addr"], "127.0.0.1:6000");
    assert_eq!(json["context_window"], 4);
}

#[test]
fn test_missing_input_is_usage_error() {
    let home = TempDir::new().unwrap();
    let (_, err, ok) = run_dnaseek(&["search", "ACGT"], home.path());

    assert!(!ok);
    assert!(err.contains("--sequence") || err.contains("--file"), "stderr: {}", err);
}

#[test]
fn test_raw_file_respects_size_limit() {
    let home = TempDir::new().unwrap();
    write_config(home.path(), r#"{"max_file_bytes": 4}"#);
    let csv = home.path().join("sample.csv");
    fs::write(&csv, "id,sequence\n1,ACGT\n2,ACGT\n").unwrap();
    let path = csv.to_str().unwrap();

    let (_, err, ok) = search(&["-f", path, "--column", "sequence", "ACGT", "-c"], home.path());
    assert!(!ok, "oversized file should fail");
    assert!(err.contains("too large"), "stderr: {}", err);

    let (_, err, ok) = search(&["-f", path, "--column", "sequence", "--raw", "ACGT", "-c"], home.path());
    assert!(!ok, "oversized file should fail in raw mode too");
    assert!(err.contains("too large"), "stderr: {}", err);
}

#[test]
fn test_raw_file_honours_column() {
    let home = TempDir::new().unwrap();
    let csv = home.path().join("sample.csv");
    fs::write(&csv, "id,sequence\n1,acgt\n2,ACGT\n").unwrap();
    let path = csv.to_str().unwrap();

    // Only the column is searched, and case is kept
    let (out, err, ok) = search(&["-f", path, "--column", "sequence", "--raw", "ACGT", "-c"], home.path());
    assert!(ok, "search should succeed: {}", err);
    assert_eq!(out, "ACGT:1\n");

    let (out, _, ok) = search(&["-f", path, "--column", "sequence", "--raw", "sequence", "-c"], home.path());
    assert!(ok);
    assert_eq!(out, "sequence:0\n");
}

#[test]
fn test_search_uses_running_server() {
    let home = TempDir::new().unwrap();
    let (addr, handle) = start_server(AppConfig::default());
    let addr_str = addr.to_string();

    let (out, err, ok) = run_dnaseek_with_env(
        &["search", "-s", "ATCGATCG", "TCG", "AAA", "--json"],
        home.path(),
        &[("DNASEEK_ADDR", addr_str.as_str())],
    );
    assert!(ok, "search should succeed: {}", err);

    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json[0]["source"], "server");
    assert_eq!(json[0]["total_matches"], 2);
    assert_eq!(json[0]["matches"][1]["position"], 5);
    assert_eq!(json[1]["source"], "server");
    assert_eq!(json[1]["total_matches"], 0);

    let status = SearchClient::connect(&addr_str, Duration::from_secs(5))
        .unwrap()
        .status()
        .unwrap();
    assert_eq!(status.searches_served, 2);

    stop_server(addr, handle);
}

#[test]
fn test_local_overrides_bypass_server() {
    let home = TempDir::new().unwrap();
    let (addr, handle) = start_server(AppConfig::default());
    let addr_str = addr.to_string();

    let (out, _, ok) = run_dnaseek_with_env(
        &["search", "-s", "ATCGATCG", "TCG", "--json", "-C", "1"],
        home.path(),
        &[("DNASEEK_ADDR", addr_str.as_str())],
    );
    assert!(ok);
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json[0]["source"], "local");
    assert_eq!(json[0]["matches"][0]["context_before"], "A");
    assert_eq!(json[0]["matches"][0]["context_after"], "A");

    let status = SearchClient::connect(&addr_str, Duration::from_secs(5))
        .unwrap()
        .status()
        .unwrap();
    assert_eq!(status.searches_served, 0);

    stop_server(addr, handle);
}

#[test]
fn test_falls_back_when_server_unreachable() {
    let home = TempDir::new().unwrap();
    // Bind then drop to get a port nobody listens on
    let dead = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().to_string();

    let (out, err, ok) = run_dnaseek_with_env(
        &["search", "-s", "AAAA", "AA", "--json"],
        home.path(),
        &[("DNASEEK_ADDR", dead.as_str())],
    );
    assert!(ok, "search should fall back: {}", err);
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json[0]["source"], "local");
    assert_eq!(json[0]["total_matches"], 2);
}

#[test]
fn test_falls_back_when_server_refuses_request() {
    let home = TempDir::new().unwrap();
    let (addr, handle) = start_server(AppConfig {
        max_message_bytes: 64,
        ..AppConfig::default()
    });
    let addr_str = addr.to_string();
    let sequence = "ACGT".repeat(100);

    let (out, err, ok) = run_dnaseek_with_env(
        &["search", "-s", sequence.as_str(), "GTAC", "-c", "--color", "never"],
        home.path(),
        &[("DNASEEK_ADDR", addr_str.as_str())],
    );
    assert!(ok, "search should fall back: {}", err);
    assert_eq!(out, "GTAC:99\n");

    stop_server(addr, handle);
}

#[test]
fn test_invalid_argument_from_server_is_an_error() {
    let home = TempDir::new().unwrap();
    let (addr, handle) = start_server(AppConfig::default());
    let addr_str = addr.to_string();

    let (out, err, ok) = run_dnaseek_with_env(
        &["search", "--raw", "-s", "", "ACGT"],
        home.path(),
        &[("DNASEEK_ADDR", addr_str.as_str())],
    );
    assert!(!ok, "empty sequence should fail");
    assert!(out.is_empty(), "stdout: {}", out);
    assert!(err.contains("Invalid search"), "stderr: {}", err);

    // Rejected by the server, not retried locally
    let status = SearchClient::connect(&addr_str, Duration::from_secs(5))
        .unwrap()
        .status()
        .unwrap();
    assert_eq!(status.invalid_requests, 1);
    assert_eq!(status.searches_served, 0);

    stop_server(addr, handle);
}
