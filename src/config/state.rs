// Application state module
// Holds the loaded configuration and the shared case chain

use std::sync::Arc;

use super::types::Config;
use crate::handler::CaseChain;

/// Application state, built once at startup and shared by every connection
pub struct AppState {
    pub config: Config,
    pub chain: Arc<CaseChain>,
    access_log: bool,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        let chain = CaseChain::from_config(config);

        Self {
            config: config.clone(),
            chain: Arc::new(chain),
            access_log: config.logging.access_log,
        }
    }

    pub const fn access_log_enabled(&self) -> bool {
        self.access_log
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_log_flag_follows_config() {
        let mut config = Config::load_from("casefile-test-missing-config").unwrap();
        assert!(AppState::new(&config).access_log_enabled());

        config.logging.access_log = false;
        assert!(!AppState::new(&config).access_log_enabled());
    }
}
