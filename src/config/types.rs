//! Core configuration types and loading.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use super::binder::BinderConfig;
use super::defaults::default_server_name;
use super::storage::StoreConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Daemon configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Process identity and side listeners.
    #[serde(default)]
    pub server: ServerConfig,
    /// Document actor timing.
    #[serde(default)]
    pub binder: BinderConfig,
    /// Document persistence backend.
    #[serde(default)]
    pub storage: StoreConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Server identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Name reported in logs.
    #[serde(default = "default_server_name")]
    pub name: String,
    /// Prometheus metrics HTTP port. Defaults to 9090; 0 disables the endpoint.
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: default_server_name(),
            metrics_port: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreKind;
    use std::io::Write;

    #[test]
    fn test_empty_config_is_valid() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.name, "scribed");
        assert_eq!(config.storage.kind, StoreKind::Memory);
        assert_eq!(config.binder.retention_period_secs, 60);
    }

    #[test]
    fn test_full_config() {
        let config: Config = toml::from_str(
            r#"
            [server]
            name = "docs-1"
            metrics_port = 9191

            [binder]
            retention_period_secs = 120
            flush_period_ms = 500
            kick_period_ms = 20

            [storage]
            type = "sqlite"
            path = "/tmp/docs.db"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.metrics_port, Some(9191));
        assert_eq!(config.binder.flush_period_ms, 500);
        assert_eq!(config.storage.kind, StoreKind::Sqlite);
        assert_eq!(config.storage.path, "/tmp/docs.db");
    }

    #[test]
    fn test_unknown_store_type_rejected() {
        let result = toml::from_str::<Config>("[storage]\ntype = \"azure\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[storage]\ntype = \"mock\"\nname = \"demo\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.storage.kind, StoreKind::Mock);
        assert_eq!(config.storage.name, "demo");
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
