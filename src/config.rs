//! Runtime configuration.
//!
//! Defaults suit a local planner on port 8000. Each field can be overridden
//! through the environment (`LIFTMAP_DB`, `LIFTMAP_API`,
//! `LIFTMAP_TIMEOUT_SECS`) and again by command-line flags.

use log::warn;
use std::time::Duration;

pub const ENV_DB_PATH: &str = "LIFTMAP_DB";
pub const ENV_API_ENDPOINT: &str = "LIFTMAP_API";
pub const ENV_TIMEOUT_SECS: &str = "LIFTMAP_TIMEOUT_SECS";

/// Timeout applied to every call to the generation endpoint.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    /// SQLite database file
    pub db_path: String,
    /// Base URL of the workout planner, without trailing slash
    pub api_endpoint: String,
    pub request_timeout: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            db_path: "liftmap.db".to_string(),
            api_endpoint: "http://127.0.0.1:8000/api".to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl TrackerConfig {
    /// Defaults overridden by whatever is set in the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (used by tests).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup(ENV_DB_PATH).filter(|v| !v.trim().is_empty()) {
            config.db_path = path;
        }
        if let Some(endpoint) = lookup(ENV_API_ENDPOINT).filter(|v| !v.trim().is_empty()) {
            config.api_endpoint = endpoint.trim_end_matches('/').to_string();
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.request_timeout = Duration::from_secs(secs),
                _ => warn!(
                    "[Config] Ignoring invalid {}={:?}, using {:?}",
                    ENV_TIMEOUT_SECS, raw, config.request_timeout
                ),
            }
        }

        config
    }
}
