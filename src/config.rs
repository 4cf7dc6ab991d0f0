//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Prefix of the offline shell cache name; the version is appended.
pub const CACHE_NAME_PREFIX: &str = "triptrack-cache-v";

/// Deployment environment. The offline shell is only installed in production.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(ConfigError::Invalid("APP_ENV", s.to_string())),
        }
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Base URL of the hosted data/auth service
    pub data_service_url: String,
    /// Public API key sent as `apikey` on every data service call
    pub data_service_key: String,
    /// Freshness window of the expenses query, in seconds
    pub query_ttl: u64,
    /// How long a stale query result is kept before it is swept, in seconds
    pub query_gc_time: u64,
    /// Background sweep interval in seconds
    pub cleanup_interval: u64,
    /// Origin serving the static application shell
    pub asset_origin: String,
    /// Offline shell cache version; bumping it discards older caches on activation
    pub cache_version: u32,
    /// Hosts containing this fragment are treated as API traffic by the shell cache
    pub api_host_fragment: String,
    /// Directory the offline shell caches are kept in across restarts
    pub shell_cache_dir: PathBuf,
    pub environment: Environment,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `DATA_SERVICE_URL` - data service base URL (default: http://localhost:54321)
    /// - `DATA_SERVICE_KEY` - data service API key (default: empty)
    /// - `QUERY_TTL` - query freshness in seconds (default: 300)
    /// - `QUERY_GC_TIME` - stale retention in seconds (default: 300)
    /// - `CLEANUP_INTERVAL` - sweep frequency in seconds (default: 60)
    /// - `ASSET_ORIGIN` - static shell origin (default: http://localhost:8080)
    /// - `CACHE_VERSION` - offline cache version (default: 1)
    /// - `API_HOST_FRAGMENT` - API host marker (default: supabase)
    /// - `SHELL_CACHE_DIR` - offline shell cache directory (default: shell-cache)
    /// - `APP_ENV` - `development` or `production` (default: development)
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            server_port: parse_var("SERVER_PORT", defaults.server_port)?,
            data_service_url: string_var("DATA_SERVICE_URL", defaults.data_service_url),
            data_service_key: string_var("DATA_SERVICE_KEY", defaults.data_service_key),
            query_ttl: parse_var("QUERY_TTL", defaults.query_ttl)?,
            query_gc_time: parse_var("QUERY_GC_TIME", defaults.query_gc_time)?,
            cleanup_interval: parse_var("CLEANUP_INTERVAL", defaults.cleanup_interval)?,
            asset_origin: string_var("ASSET_ORIGIN", defaults.asset_origin),
            cache_version: parse_var("CACHE_VERSION", defaults.cache_version)?,
            api_host_fragment: string_var("API_HOST_FRAGMENT", defaults.api_host_fragment),
            shell_cache_dir: env::var_os("SHELL_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.shell_cache_dir),
            environment: match env::var("APP_ENV") {
                Ok(v) => v.parse()?,
                Err(_) => defaults.environment,
            },
        })
    }

    /// Name of the current offline shell cache, e.g. `triptrack-cache-v1`.
    pub fn cache_name(&self) -> String {
        format!("{}{}", CACHE_NAME_PREFIX, self.cache_version)
    }

    pub fn query_ttl(&self) -> Duration {
        Duration::from_secs(self.query_ttl)
    }

    pub fn query_gc_time(&self) -> Duration {
        Duration::from_secs(self.query_gc_time)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            data_service_url: "http://localhost:54321".to_string(),
            data_service_key: String::new(),
            query_ttl: 300,
            query_gc_time: 300,
            cleanup_interval: 60,
            asset_origin: "http://localhost:8080".to_string(),
            cache_version: 1,
            api_host_fragment: "supabase".to_string(),
            shell_cache_dir: PathBuf::from("shell-cache"),
            environment: Environment::Development,
        }
    }
}

fn string_var(name: &str, default: String) -> String {
    env::var(name).unwrap_or(default)
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(name, raw)),
        Err(_) => Ok(default),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
