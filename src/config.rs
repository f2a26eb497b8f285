use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Cache sizing and expiry
    #[serde(default)]
    pub cache: CacheConfig,

    /// Listing page defaults
    #[serde(default)]
    pub pagination: PaginationConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/default.toml".to_string());
        Self::load_from(&config_path)
    }

    /// Load configuration layered over the built-in defaults from `path`
    pub fn load_from(path: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            // Override with config file if it exists
            .add_source(config::File::with_name(path).required(false))
            // Override with environment variables (prefix: INCIDENT_DESK_)
            .add_source(
                config::Environment::with_prefix("INCIDENT_DESK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of cached listing pages
    #[serde(default = "default_listing_capacity")]
    pub listing_capacity: u64,

    /// Maximum number of cached incidents
    #[serde(default = "default_item_capacity")]
    pub item_capacity: u64,

    /// Maximum number of cached comment pages
    #[serde(default = "default_comment_capacity")]
    pub comment_capacity: u64,

    /// Optional time-to-live for every cached entry (seconds).
    ///
    /// Invalidation keeps the caches coherent on its own; a TTL only bounds
    /// memory held by cold entries.
    #[serde(default)]
    pub ttl_secs: Option<u64>,
}

impl CacheConfig {
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_secs.map(Duration::from_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            listing_capacity: default_listing_capacity(),
            item_capacity: default_item_capacity(),
            comment_capacity: default_comment_capacity(),
            ttl_secs: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Page size used when a request does not specify one
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,

    /// Upper bound applied to requested page sizes
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
}

impl PaginationConfig {
    /// Resolve a requested page size against the configured bounds
    pub fn page_size(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size.max(1))
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logs: bool,

    /// Service name
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Enable Prometheus metrics
    #[serde(default = "default_true")]
    pub prometheus_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
            service_name: default_service_name(),
            prometheus_enabled: true,
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

fn default_listing_capacity() -> u64 {
    10_000
}

fn default_item_capacity() -> u64 {
    50_000
}

fn default_comment_capacity() -> u64 {
    10_000
}

fn default_page_size() -> u32 {
    20
}

fn default_max_page_size() -> u32 {
    100
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_service_name() -> String {
    "incident-desk".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_values() {
        assert_eq!(default_http_port(), 8080);
        assert_eq!(default_log_level(), "info");
        assert!(default_true());
        assert!(CacheConfig::default().ttl().is_none());
    }

    #[test]
    fn test_page_size_is_clamped() {
        let pagination = PaginationConfig::default();
        assert_eq!(pagination.page_size(None), 20);
        assert_eq!(pagination.page_size(Some(500)), 100);
        assert_eq!(pagination.page_size(Some(0)), 1);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[cache]\nttl_secs = 60\n\n[server]\nhttp_port = 9999").unwrap();

        let config = Config::load_from(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.server.http_port, 9999);
        assert_eq!(config.cache.ttl(), Some(Duration::from_secs(60)));
        assert_eq!(config.pagination.max_page_size, 100);
    }
}
