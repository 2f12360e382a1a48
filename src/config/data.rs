//! The configuration structs used to build the AppConfig, and their impls.
use std::{collections::HashMap, time::Duration};

use secrecy::{ExposeSecret, SecretSlice, SecretString};
use serde::Deserialize;
use strum_macros::AsRefStr;

use crate::config::{ConfigError, ConfigResult};
use crate::utils;

/// Table endpoint of the local storage emulator (Azurite).
const DEV_STORAGE_TABLE_ENDPOINT: &str = "http://127.0.0.1:10002/devstoreaccount1";
const DEV_STORAGE_ACCOUNT_NAME: &str = "devstoreaccount1";
/// The publicly documented emulator key.
const DEV_STORAGE_ACCOUNT_KEY: &str =
    "Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==";

// ###################################
// ->   STRUCTS
// ###################################
#[derive(AsRefStr, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Local,
    Production,
}

#[derive(Deserialize, Clone, Debug)]
pub struct AppConfig {
    pub net_config: NetConfig,
    pub storage_config: StorageConfig,
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct NetConfig {
    pub host: [u8; 4],
    pub app_port: u16,
}

#[derive(Deserialize, Clone, Debug)]
pub struct StorageConfig {
    /// Azure storage connection string, usually provided through `StorageConnection`.
    #[serde(default = "empty_secret")]
    pub connection_string: SecretString,
    #[serde(default = "default_table_name")]
    pub table_name: String,
    #[serde(default = "default_timeout_millis")]
    pub timeout_millis: u64,
}

/// The parts of a connection string the table client needs.
#[derive(Debug)]
pub struct StorageAccount {
    pub account_name: String,
    pub account_key: SecretSlice<u8>,
    /// Base URL of the table service, without a trailing slash.
    pub table_endpoint: String,
}

// ###################################
// ->   IMPLs
// ###################################
impl Environment {
    pub fn file_name(&self) -> String {
        format!("{}.toml", self.as_ref().to_lowercase())
    }
}

impl StorageConfig {
    pub fn storage_account(&self) -> ConfigResult<StorageAccount> {
        StorageAccount::try_from(self.connection_string.expose_secret())
    }
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_millis)
    }
}

fn empty_secret() -> SecretString {
    SecretString::from(String::new())
}

fn default_table_name() -> String {
    "WattlySignups".to_string()
}

fn default_timeout_millis() -> u64 {
    10_000
}

// ###################################
// ->   TRY FROMs
// ###################################
impl TryFrom<String> for Environment {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            _ => Err(Self::Error::StringToEnvironmentFail(value)),
        }
    }
}

impl TryFrom<&str> for StorageAccount {
    type Error = ConfigError;

    /// Parses `Key=Value;Key=Value` connection strings.
    /// Error messages never contain setting values, the string carries the account key.
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let value = value.trim();
        if value.is_empty() {
            return Err(ConfigError::MissingConnectionString);
        }

        let mut settings = HashMap::new();
        for (idx, segment) in value
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .enumerate()
        {
            // Split at the first '=' only, base64 keys end with padding.
            let (key, val) = segment.split_once('=').ok_or_else(|| {
                ConfigError::ConnectionStringMalformed(format!(
                    "segment {} is not a 'Key=Value' pair",
                    idx + 1
                ))
            })?;
            settings.insert(key.trim().to_ascii_lowercase(), val.trim());
        }

        if settings
            .get("usedevelopmentstorage")
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
        {
            return Ok(StorageAccount {
                account_name: DEV_STORAGE_ACCOUNT_NAME.to_string(),
                account_key: SecretSlice::from(
                    utils::b64_decode(DEV_STORAGE_ACCOUNT_KEY)
                        .map_err(|_| ConfigError::AccountKeyNotBase64)?,
                ),
                table_endpoint: DEV_STORAGE_TABLE_ENDPOINT.to_string(),
            });
        }

        let account_name = settings
            .get("accountname")
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::ConnectionStringMissingKey("AccountName"))?
            .to_string();
        let account_key = settings
            .get("accountkey")
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::ConnectionStringMissingKey("AccountKey"))?;
        let account_key =
            utils::b64_decode(account_key).map_err(|_| ConfigError::AccountKeyNotBase64)?;

        let table_endpoint = match settings.get("tableendpoint") {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => {
                let protocol = settings
                    .get("defaultendpointsprotocol")
                    .copied()
                    .unwrap_or("https");
                let suffix = settings
                    .get("endpointsuffix")
                    .copied()
                    .unwrap_or("core.windows.net");
                format!("{protocol}://{account_name}.table.{suffix}")
            }
        };
        reqwest::Url::parse(&table_endpoint).map_err(|er| {
            ConfigError::ConnectionStringMalformed(format!("invalid table endpoint: {er}"))
        })?;

        Ok(StorageAccount {
            account_name,
            account_key: SecretSlice::from(account_key),
            table_endpoint,
        })
    }
}
