//! Layered gateway configuration.
//!
//! Values come from built-in defaults, an optional `config/default.toml`, and
//! `FLUIDFILL__`-prefixed environment variables (`.env` files are honoured),
//! in increasing order of precedence.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const ENV_PREFIX: &str = "FLUIDFILL";
const DEFAULT_CONFIG_FILE: &str = "config/default.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub doc_service: DocServiceConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub json_limit_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub database_path: PathBuf,
    pub blob_dir: PathBuf,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocServiceConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Extra attempts for operations that are safe to repeat.
    pub max_retries: u32,
    pub backoff_ms: u64,
}

impl DocServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}

impl Config {
    /// Loads the configuration, reading `.env` first when present.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let file = match path {
            Some(path) => config::File::from(path),
            None => config::File::from(Path::new(DEFAULT_CONFIG_FILE)).required(false),
        };

        let settings = Self::builder_with_defaults()?
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn builder_with_defaults(
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Ok(config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.json_limit_bytes", 10 * 1024 * 1024)?
            .set_default("storage.database_path", "fluidfill.sqlite")?
            .set_default("storage.blob_dir", "./uploads")?
            .set_default("storage.max_upload_bytes", 5 * 1024 * 1024)?
            .set_default("doc_service.base_url", "http://127.0.0.1:8000")?
            .set_default("doc_service.timeout_secs", 30)?
            .set_default("doc_service.max_retries", 1)?
            .set_default("doc_service.backoff_ms", 250)?)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server.port must be non-zero".into()));
        }
        let base_url = self.doc_service.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid(
                "doc_service.base_url must be an http(s) URL".into(),
            ));
        }
        if self.doc_service.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "doc_service.timeout_secs must be greater than 0".into(),
            ));
        }
        if self.storage.max_upload_bytes == 0 {
            return Err(ConfigError::Invalid(
                "storage.max_upload_bytes must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}
