// Configuration types module
// Defines all configuration-related data structures

use crate::http::CachePolicy;
use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub delivery: DeliveryConfig,
    #[serde(default)]
    pub routes: RoutesConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Log file path (optional, stderr if not set)
    #[serde(default)]
    pub log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    pub max_connections: Option<u64>,
    pub listen_backlog: i32,
    /// Seconds in-flight connections get to finish after a shutdown signal
    pub shutdown_grace_period: u64,
}

/// File delivery configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DeliveryConfig {
    /// Directory files are served from
    pub root: String,
    /// Chunk count used when `/chunked` gets no `chunks` parameter
    pub default_chunks: i64,
    /// Pause before each chunk of a chunked delivery
    pub chunk_delay_ms: u64,
    /// `Cache-Control` value sent with delivered files
    #[serde(default)]
    pub cache_control: CachePolicy,
    /// `Content-Type` of chunked deliveries
    pub chunked_content_type: String,
}

/// Routes configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct RoutesConfig {
    /// Health check configuration
    #[serde(default)]
    pub health: HealthConfig,
}

/// Health check configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HealthConfig {
    /// Enable health check endpoints
    #[serde(default = "default_health_enabled")]
    pub enabled: bool,
    /// Liveness probe path (default: /healthz)
    #[serde(default = "default_healthz_path")]
    pub liveness_path: String,
    /// Readiness probe path (default: /readyz)
    #[serde(default = "default_readyz_path")]
    pub readiness_path: String,
}

#[allow(clippy::missing_const_for_fn)]
fn default_health_enabled() -> bool {
    true
}

#[allow(clippy::missing_const_for_fn)]
fn default_healthz_path() -> String {
    "/healthz".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_readyz_path() -> String {
    "/readyz".to_string()
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: default_health_enabled(),
            liveness_path: default_healthz_path(),
            readiness_path: default_readyz_path(),
        }
    }
}
