//! Builds an `AppConfig` from layered sources:
//! `config/base.toml`, then `config/{environment}.toml`, then `APP_` prefixed env variables
//! (`__` separates nested keys), then the `StorageConnection` env variable.
//!
//! The config is loaded once in `main` and handed to `App::build_from_config`.

mod data;
mod error;

use std::path::Path;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use tracing::info;

// Re-export config structs
pub use data::{AppConfig, Environment, NetConfig, StorageAccount, StorageConfig};
pub use error::{ConfigError, ConfigResult};

/// Name of the env variable holding the storage connection string.
pub const STORAGE_CONNECTION_ENV: &str = "StorageConnection";

/// Loads the configuration from the `config` dir in the current working directory.
/// The environment is selected with `APP_ENVIRONMENT` and defaults to `local`.
pub fn load_config() -> ConfigResult<AppConfig> {
    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()?;
    info!(
        "{:<20} - Loading {} configuration",
        "load_config",
        environment.as_ref()
    );

    let base_path = std::env::current_dir()?;
    let config = figment(&base_path.join("config"), environment).extract::<AppConfig>()?;

    Ok(config)
}

/// The layered `Figment` the configuration gets extracted from.
pub fn figment(config_dir: &Path, environment: Environment) -> Figment {
    Figment::new()
        .merge(Toml::file(config_dir.join("base.toml")))
        .merge(Toml::file(config_dir.join(environment.file_name())))
        .merge(Env::prefixed("APP_").split("__"))
        .merge(
            Env::raw()
                .only(&[STORAGE_CONNECTION_ENV])
                .map(|_| "storage_config.connection_string".into()),
        )
}
