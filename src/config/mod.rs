// Configuration module entry point
// Loads the process-wide configuration once at startup; it is never mutated afterwards

mod state;
mod types;

use config::ConfigError;
use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{Config, DeliveryConfig, LoggingConfig, RoutesConfig};

/// Config file used when no path is given on the command line
pub const DEFAULT_CONFIG_PATH: &str = "config";

/// Environment variable prefix, e.g. `FILE_DELIVERY_DELIVERY__ROOT=/srv/files`
const ENV_PREFIX: &str = "FILE_DELIVERY";

impl Config {
    /// Load configuration from the path given as first CLI argument,
    /// falling back to `config.{toml,yaml,json}` in the working directory
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::args()
            .nth(1)
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(&path)
    }

    /// Load configuration from specified file path (extension optional)
    /// The file is optional; environment variables override it and defaults fill the rest
    pub fn load_from(config_path: &str) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.listen_backlog", 128)?
            .set_default("performance.shutdown_grace_period", 10)?
            .set_default("delivery.root", ".")?
            .set_default("delivery.default_chunks", 1)?
            .set_default("delivery.chunk_delay_ms", 1000)?
            .set_default("delivery.cache_control", "max-age=3600")?
            .set_default("delivery.chunked_content_type", "text")?
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the server cannot start with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.delivery.default_chunks < 1 {
            return Err(ConfigError::Message(format!(
                "delivery.default_chunks must be at least 1, got {}",
                self.delivery.default_chunks
            )));
        }
        if self.server.workers == Some(0) {
            return Err(ConfigError::Message(
                "server.workers must be at least 1 when set".to_string(),
            ));
        }
        if self.performance.listen_backlog < 1 {
            return Err(ConfigError::Message(format!(
                "performance.listen_backlog must be at least 1, got {}",
                self.performance.listen_backlog
            )));
        }
        self.get_socket_addr().map(|_| ())
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| ConfigError::Message(format!("Invalid address: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::CachePolicy;

    #[test]
    fn test_defaults_without_file() {
        let cfg = Config::load_from("does/not/exist").unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.delivery.root, ".");
        assert_eq!(cfg.delivery.default_chunks, 1);
        assert_eq!(cfg.delivery.chunk_delay_ms, 1000);
        assert_eq!(cfg.delivery.cache_control, CachePolicy::MaxAge(3600));
        assert_eq!(cfg.delivery.chunked_content_type, "text");
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert!(cfg.routes.health.enabled);
        assert_eq!(cfg.routes.health.liveness_path, "/healthz");
        assert_eq!(
            cfg.get_socket_addr().unwrap(),
            "127.0.0.1:8080".parse().unwrap()
        );
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            r#"
[server]
port = 9090

[delivery]
root = "/srv/files"
chunk_delay_ms = 250
cache_control = "public, max-age=60"

[routes.health]
enabled = false
"#,
        )
        .unwrap();

        let cfg = Config::load_from(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 9090);
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.delivery.root, "/srv/files");
        assert_eq!(cfg.delivery.chunk_delay_ms, 250);
        assert_eq!(cfg.delivery.cache_control, CachePolicy::Public(60));
        assert!(!cfg.routes.health.enabled);
        assert_eq!(cfg.routes.health.readiness_path, "/readyz");
    }

    #[test]
    fn test_rejects_zero_default_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[delivery]\ndefault_chunks = 0\n").unwrap();

        let err = Config::load_from(path.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("default_chunks"));
    }

    #[test]
    fn test_rejects_zero_workers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[server]\nworkers = 0\n").unwrap();

        let err = Config::load_from(path.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("server.workers"));

        std::fs::write(&path, "[server]\nworkers = 2\n").unwrap();
        let cfg = Config::load_from(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.workers, Some(2));
    }

    #[test]
    fn test_rejects_bad_host() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[server]\nhost = \"not a host\"\n").unwrap();

        assert!(Config::load_from(path.to_str().unwrap()).is_err());
    }
}
