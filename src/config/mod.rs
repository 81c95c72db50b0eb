// Configuration module entry point
// Loads application configuration and holds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;
use std::path::PathBuf;

// Re-export public types
pub use state::AppState;
pub use types::{Config, SiteConfig};

/// Default config file name (without extension)
pub const DEFAULT_CONFIG_FILE: &str = "casefile";

/// Environment overrides look like `CASEFILE_SERVER__PORT=9100`
const ENV_PREFIX: &str = "CASEFILE";

/// Startup options taken from the command line
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub config_path: Option<String>,
    pub root: Option<PathBuf>,
}

impl CliArgs {
    /// Parse `[--config <path>] [ROOT]` from an argument list (program name excluded)
    pub fn parse<I>(args: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = String>,
    {
        let mut parsed = Self::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-c" | "--config" => {
                    let path = args
                        .next()
                        .ok_or_else(|| format!("{arg} requires a file path"))?;
                    parsed.config_path = Some(path);
                }
                flag if flag.starts_with('-') => {
                    return Err(format!("Unknown option: {flag}"));
                }
                _ if parsed.root.is_some() => {
                    return Err(format!("Unexpected argument: {arg}"));
                }
                _ => parsed.root = Some(PathBuf::from(arg)),
            }
        }

        Ok(parsed)
    }
}

impl Config {
    /// Load configuration from the config file, environment and defaults,
    /// then apply command line overrides
    pub fn load(cli: &CliArgs) -> Result<Self, config::ConfigError> {
        let path = cli.config_path.as_deref().unwrap_or(DEFAULT_CONFIG_FILE);
        let mut cfg = Self::load_from(path)?;
        if let Some(root) = &cli.root {
            cfg.site.root.clone_from(root);
        }
        Ok(cfg)
    }

    /// Load configuration from specified file path (extension optional)
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        Self::load_with_env(config_path, environment())
    }

    fn load_with_env(
        config_path: &str,
        env: config::Environment,
    ) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(env)
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 9000)?
            .set_default("site.root", ".")?
            .set_default("site.index_file", "index.html")?
            .set_default("site.contain_paths", true)?
            .set_default("site.sort_listing", true)?
            .set_default("site.escape_listing", true)?
            .set_default("script.extension", ".py")?
            .set_default("script.interpreter", "python3")?
            .set_default("script.timeout_secs", 30)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "common")?
            .set_default(
                "http.server_name",
                concat!("casefile/", env!("CARGO_PKG_VERSION")),
            )?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
}
