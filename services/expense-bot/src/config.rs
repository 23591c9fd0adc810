//! Service configuration
//!
//! Loaded through `common::config` layers: built-in defaults, `config/*.toml|yaml`,
//! then `EXPENSE_BOT_*` environment variables (`EXPENSE_BOT_REDIS__URL=...`).

use std::path::Path;
use std::time::Duration;

use common::{LogConfig, LogFormat};
use serde::{Deserialize, Serialize};

use crate::error::{BotError, Result};

pub const SERVICE_NAME: &str = "expense-bot";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub app: AppConfig,
    pub redis: RedisConfig,
    pub state: StateConfig,
    pub log: LogSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub name: String,
    pub environment: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: SERVICE_NAME.to_string(),
            environment: "development".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    pub url: String,
    /// Use the in-memory store when false
    pub enabled: bool,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            enabled: false,
        }
    }
}

/// Conversation state lifetimes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateConfig {
    /// Inactivity expiry of an in-flight expense entry
    pub expense_ttl_secs: u64,
    /// Expiry of a pending status such as `budget`
    pub status_ttl_secs: u64,
    /// Upper bound on one store round-trip
    pub storage_timeout_secs: u64,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            expense_ttl_secs: 3600,
            status_ttl_secs: 86400,
            storage_timeout_secs: 5,
        }
    }
}

impl StateConfig {
    pub fn expense_ttl(&self) -> Duration {
        Duration::from_secs(self.expense_ttl_secs)
    }

    pub fn status_ttl(&self) -> Duration {
        Duration::from_secs(self.status_ttl_secs)
    }

    pub fn storage_timeout(&self) -> Duration {
        Duration::from_secs(self.storage_timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub level: String,
    pub format: LogFormat,
    pub file: Option<String>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            file: None,
        }
    }
}

impl BotConfig {
    /// Layered load from `./config` and the environment
    pub fn load() -> Result<Self> {
        let config: Self = common::load_config(SERVICE_NAME)?;
        config.validate()?;
        Ok(config)
    }

    /// Load one explicit file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let config: Self = common::load_config_from_file(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let durations = [
            ("state.expense_ttl_secs", self.state.expense_ttl_secs),
            ("state.status_ttl_secs", self.state.status_ttl_secs),
            ("state.storage_timeout_secs", self.state.storage_timeout_secs),
        ];
        if let Some((name, _)) = durations.iter().find(|(_, secs)| *secs == 0) {
            return Err(BotError::config(format!("{} must be greater than zero", name)));
        }
        if self.redis.enabled && self.redis.url.trim().is_empty() {
            return Err(BotError::config("redis.url is required when redis is enabled"));
        }
        Ok(())
    }

    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            level: self.log.level.clone(),
            file: self.log.file.clone(),
            format: self.log.format,
            ..LogConfig::default()
        }
    }
}
