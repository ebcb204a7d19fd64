//! Configuration for order-desk.
//!
//! Loaded from a JSON file (`order-desk.json` in the working directory, or
//! the path given with `--config`), then overridden from the environment:
//! - `GEMINI_API_KEY` - API key for the assistant
//! - `ORDER_DESK_ADMIN_PASSWORD` - admin password
//!
//! Every field is optional; missing fields take their defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::assistant::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};

pub const DEFAULT_CONFIG_FILE: &str = "order-desk.json";
pub const ENV_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_ADMIN_PASSWORD: &str = "ORDER_DESK_ADMIN_PASSWORD";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Stock file (`{"products": [...]}`).
    pub stock_path: PathBuf,
    /// Orders file (bare JSON array).
    pub orders_path: PathBuf,
    /// Directory invoices are written to.
    pub invoice_dir: PathBuf,
    pub shop_name: String,
    /// Currency label shown next to prices.
    pub currency: String,
    pub admin_password: String,
    /// Channel capacity of each store actor.
    pub mailbox_size: usize,
    /// How long a command waits for another process to release the stores.
    pub lock_timeout_ms: u64,
    pub llm: LlmConfig,
}

/// Language model settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stock_path: PathBuf::from("stock.json"),
            orders_path: PathBuf::from("orders.json"),
            invoice_dir: PathBuf::from("invoices"),
            shop_name: "RAMAD Perfumes".to_string(),
            currency: "AED".to_string(),
            admin_password: "perfumes".to_string(),
            mailbox_size: 32,
            lock_timeout_ms: 10_000,
            llm: LlmConfig::default(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
        }
    }
}

impl Config {
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, `order-desk.json` in the
    /// working directory is used if present, else the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(path)?
                } else {
                    debug!("No config file, using defaults");
                    Self::default()
                }
            }
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        debug!(path = %path.display(), "Loading config");

        let content = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply environment overrides. `lookup` is `std::env::var` outside tests.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(ENV_API_KEY).filter(|v| !v.is_empty()) {
            self.llm.api_key = Some(key);
        }
        if let Some(password) = lookup(ENV_ADMIN_PASSWORD).filter(|v| !v.is_empty()) {
            self.admin_password = password;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.mailbox_size == 0 {
            return Err(ConfigError::Invalid("mailbox_size must be at least 1".to_string()));
        }
        if self.admin_password.is_empty() {
            return Err(ConfigError::Invalid("admin_password must not be empty".to_string()));
        }
        Ok(())
    }
}
