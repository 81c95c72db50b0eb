// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub site: SiteConfig,
    pub script: ScriptConfig,
    pub logging: LoggingConfig,
    pub http: HttpConfig,
    pub performance: PerformanceConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Served directory and resolution policy
#[derive(Debug, Deserialize, Clone)]
pub struct SiteConfig {
    /// Base directory every request path is resolved against
    pub root: PathBuf,
    /// Default document served for a directory
    #[serde(default = "default_index_file")]
    pub index_file: String,
    /// Reject request paths whose `..` segments climb above `root`
    #[serde(default = "default_true")]
    pub contain_paths: bool,
    /// Sort directory listings by entry name
    #[serde(default = "default_true")]
    pub sort_listing: bool,
    /// HTML-escape entry names in directory listings
    #[serde(default = "default_true")]
    pub escape_listing: bool,
}

/// Script execution settings
#[derive(Debug, Deserialize, Clone)]
pub struct ScriptConfig {
    /// File name suffix that marks a file as executable content
    #[serde(default = "default_script_extension")]
    pub extension: String,
    /// Program the script is handed to; empty means run the file itself
    #[serde(default = "default_interpreter")]
    pub interpreter: String,
    #[serde(default = "default_script_timeout")]
    pub timeout_secs: u64,
}

impl ScriptConfig {
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Interpreter program, if one is configured
    pub fn interpreter(&self) -> Option<&str> {
        let trimmed = self.interpreter.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    /// Seconds allowed for a request head to arrive; 0 disables
    pub read_timeout: u64,
    pub max_connections: Option<u64>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_true() -> bool {
    true
}

fn default_index_file() -> String {
    "index.html".to_string()
}

fn default_script_extension() -> String {
    ".py".to_string()
}

fn default_interpreter() -> String {
    "python3".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_script_timeout() -> u64 {
    30
}

fn default_access_log_format() -> String {
    "common".to_string()
}
