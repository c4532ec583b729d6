use std::path::PathBuf;
use std::str::FromStr;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use tracing::Level;

pub use common::config::StorageConfig;

/// Where downloads are saved.
#[derive(Debug, Deserialize, Clone)]
pub struct DownloadConfig {
    /// Destination directory. Default: the user's download dir, else ".".
    #[serde(default = "default_download_dir")]
    pub dir: PathBuf,
}

fn default_download_dir() -> PathBuf {
    dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            dir: default_download_dir(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    /// Maximum log level written to stderr. Default: "warn".
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "warn".into()
}

impl LogConfig {
    pub fn max_level(&self) -> Result<Level, ConfigError> {
        Level::from_str(&self.level)
            .map_err(|_| ConfigError::Message(format!("invalid log level '{}'", self.level)))
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Application configuration for the `filedrop` binary.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub download: DownloadConfig,
    #[serde(default)]
    pub log: LogConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("FILEDROP_CONFIG").unwrap_or_else(|_| "config/filedrop".to_string());

        let s = Config::builder()
            .set_default("storage.snapshot_key", "fileStorage")?
            .set_default("log.level", "warn")?
            // Load from config/filedrop.{toml,json,yaml,...}
            .add_source(File::with_name(&config_path).required(false))
            // Override from environment (e.g., FILEDROP__STORAGE__DATA_DIR)
            .add_source(Environment::with_prefix("FILEDROP").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
