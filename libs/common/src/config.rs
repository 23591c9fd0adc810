//! Layered configuration loading
//!
//! Priority (highest to lowest):
//! 1. Environment variables prefixed with the service name (`EXPENSE_BOT_REDIS__URL`)
//! 2. Service-specific file (`config/expense-bot.toml`)
//! 3. Environment-specific file (`config/production.yaml`), selected by `EXPENSE_ENV`
//! 4. Default file (`config/default.toml`)
//! 5. `T::default()`

use std::path::Path;

use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Variable selecting the environment-specific config file
pub const ENV_SELECTOR: &str = "EXPENSE_ENV";

const DEFAULT_ENVIRONMENT: &str = "development";

/// Load configuration for `service` from `./config` and the environment
pub fn load_config<T>(service: &str) -> Result<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    load_config_from_dir("config", service)
}

/// Same as [`load_config`] with an explicit config directory
pub fn load_config_from_dir<T, P>(dir: P, service: &str) -> Result<T>
where
    T: Serialize + DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let dir = dir.as_ref();
    let env = std::env::var(ENV_SELECTOR).unwrap_or_else(|_| DEFAULT_ENVIRONMENT.to_string());
    debug!("Loading {} config from {:?} (env: {})", service, dir, env);

    let figment = Figment::from(Serialized::defaults(T::default()))
        .merge(Toml::file(dir.join("default.toml")))
        .merge(Yaml::file(dir.join("default.yaml")))
        .merge(Toml::file(dir.join(format!("{}.toml", env))))
        .merge(Yaml::file(dir.join(format!("{}.yaml", env))))
        .merge(Toml::file(dir.join(format!("{}.toml", service))))
        .merge(Yaml::file(dir.join(format!("{}.yaml", service))))
        .merge(Env::prefixed(&env_prefix(service)).split("__"));

    figment
        .extract()
        .map_err(|e| Error::config(format!("Failed to load configuration: {}", e)))
}

/// Load configuration from one file, format chosen by extension
pub fn load_config_from_file<T, P>(path: P) -> Result<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::config(format!(
            "Config file not found: {}",
            path.display()
        )));
    }

    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| Error::config("Config file must have an extension"))?;

    let figment = match extension {
        "toml" => Figment::new().merge(Toml::file(path)),
        "yaml" | "yml" => Figment::new().merge(Yaml::file(path)),
        "json" => Figment::new().merge(Json::file(path)),
        _ => {
            return Err(Error::config(format!(
                "Unsupported config file format: {}",
                extension
            )))
        },
    };

    figment
        .extract()
        .map_err(|e| Error::config(format!("Failed to load configuration from file: {}", e)))
}

/// `expense-bot` -> `EXPENSE_BOT_`
pub fn env_prefix(service: &str) -> String {
    format!("{}_", service.replace('-', "_").to_uppercase())
}
