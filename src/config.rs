//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries per cache, 0 = unbounded
    pub max_entries: usize,
    /// Default TTL in seconds for cached computations
    pub default_ttl: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Simulated cost of one aggregate computation, in milliseconds
    pub compute_delay_ms: u64,
    /// How long a request waits for its aggregate, in milliseconds
    pub request_timeout_ms: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - Maximum entries per cache, 0 = unbounded (default: 1000)
    /// - `DEFAULT_TTL` - Default TTL in seconds (default: 900)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `COMPUTE_DELAY_MS` - Simulated aggregate query latency (default: 250)
    /// - `REQUEST_TIMEOUT_MS` - Time a request waits for its aggregate (default: 5000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_entries: env_or("MAX_ENTRIES", defaults.max_entries),
            default_ttl: env_or("DEFAULT_TTL", defaults.default_ttl),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            compute_delay_ms: env_or("COMPUTE_DELAY_MS", defaults.compute_delay_ms),
            request_timeout_ms: env_or("REQUEST_TIMEOUT_MS", defaults.request_timeout_ms),
        }
    }

    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl)
    }

    pub fn compute_delay(&self) -> Duration {
        Duration::from_millis(self.compute_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            default_ttl: 900,
            server_port: 3000,
            compute_delay_ms: 250,
            request_timeout_ms: 5000,
        }
    }
}

/// Parses an environment variable, falling back when unset or invalid.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
