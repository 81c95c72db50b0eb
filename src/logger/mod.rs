//! Logger module
//!
//! Provides logging utilities for the server including:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Failure, warning and error logging
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::Config;
use crate::handler::ServeError;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU8, Ordering};

const LEVEL_ERROR: u8 = 0;
const LEVEL_WARN: u8 = 1;
const LEVEL_INFO: u8 = 2;

/// Most verbose level written by the helpers below
static MAX_LEVEL: AtomicU8 = AtomicU8::new(LEVEL_INFO);

fn parse_level(level: &str) -> u8 {
    match level.to_ascii_lowercase().as_str() {
        "error" => LEVEL_ERROR,
        "warn" | "warning" => LEVEL_WARN,
        _ => LEVEL_INFO,
    }
}

fn enabled(level: u8) -> bool {
    MAX_LEVEL.load(Ordering::Relaxed) >= level
}

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    MAX_LEVEL.store(parse_level(&config.logging.level), Ordering::Relaxed);
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

/// Write to info/access log
fn write_info(message: &str) {
    if writer::is_initialized() {
        writer::get().write_info(message);
    } else {
        println!("{message}");
    }
}

/// Write to error log
fn write_error(message: &str) {
    if writer::is_initialized() {
        writer::get().write_error(message);
    } else {
        eprintln!("{message}");
    }
}

/// Write to access log specifically
fn write_access(message: &str) {
    if writer::is_initialized() {
        writer::get().write_access(message);
    } else {
        println!("{message}");
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write_info("======================================");
    write_info("casefile started");
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!("Serving: {}", config.site.root.display()));
    match config.script.interpreter() {
        Some(program) => write_info(&format!(
            "Scripts: *{} via {program} (timeout {}s)",
            config.script.extension, config.script.timeout_secs
        )),
        None => write_info(&format!(
            "Scripts: *{} run directly (timeout {}s)",
            config.script.extension, config.script.timeout_secs
        )),
    }
    write_info(&format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================\n");
}

pub fn log_shutdown() {
    write_info("[Shutdown] Stopped accepting connections");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    write_info(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    if enabled(LEVEL_WARN) {
        write_error(&format!("[WARN] {message}"));
    }
}

/// Log a request that ended on the error page
pub fn log_outcome_failure(url_path: &str, err: &ServeError) {
    write_error(&format!("[FAIL] {url_path} ({}): {err}", err.kind()));
}

pub fn log_script_finished(url_path: &str, output_bytes: usize) {
    if enabled(LEVEL_INFO) {
        write_info(&format!("[Script] {url_path} produced {output_bytes} bytes"));
    }
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_access(&entry.format(format));
}
