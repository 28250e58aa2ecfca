// Configuration module entry point
// Loads layered configuration and holds the shared application state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{
    Config, DocumentConfig, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig,
    ServiceMode, StorageConfig,
};

/// Environment variable that overrides `server.port`
pub const PORT_ENV: &str = "PORT";

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        Self::load_with_port(config_path, std::env::var(PORT_ENV).ok())
    }

    /// Same as [`Config::load_from`] with an explicit `PORT` value
    pub fn load_with_port(
        config_path: &str,
        port: Option<String>,
    ) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("server.mode", "files")?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.connection_timeout", 75)?
            .set_default("performance.shutdown_grace_period", 5)?
            .set_default("http.max_body_size", 10_485_760)? // 10MB
            .set_default("http.header_lookup", true)?
            .set_default("storage.upload_dir", "uploads")?
            .set_default("document.path", "response.json")?
            .set_override_option("server.port", port)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let cfg = Config::load_with_port("does-not-exist/config", None).unwrap();
        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.server.mode, ServiceMode::Files);
        assert_eq!(cfg.http.max_body_size, 10 * 1024 * 1024);
        assert!(cfg.http.header_lookup);
        assert_eq!(cfg.storage.upload_dir, "uploads");
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert!(cfg.logging.access_log_file.is_none());
    }

    #[test]
    fn test_port_override() {
        let cfg = Config::load_with_port("does-not-exist/config", Some("8081".to_string())).unwrap();
        assert_eq!(cfg.server.port, 8081);
        assert_eq!(cfg.get_socket_addr().unwrap().port(), 8081);
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        assert!(Config::load_with_port("does-not-exist/config", Some("http".to_string())).is_err());
    }

    #[test]
    fn test_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("service.toml");
        std::fs::write(
            &path,
            "[server]\nmode = \"static\"\n\n[document]\npath = \"/srv/reply.json\"\n",
        )
        .unwrap();

        let stem = dir.path().join("service");
        let cfg = Config::load_with_port(stem.to_str().unwrap(), None).unwrap();
        assert_eq!(cfg.server.mode, ServiceMode::Static);
        assert_eq!(cfg.document.path, "/srv/reply.json");
        assert_eq!(cfg.server.port, 3000);
    }
}
