//! Environment configuration

use std::env;
use std::path::PathBuf;
use thiserror::Error;
use crate::storage::DEFAULT_QUOTA_BYTES;

#[derive(Debug, Error)]
#[error("Invalid {name} value: {value}")]
pub struct ConfigError {
    pub name: &'static str,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    /// `None` disables the quota.
    pub quota_bytes: Option<usize>,
}

impl AppConfig {
    /// Reads `HOST`, `PORT`, `CATALOG_DATA_DIR` and `CATALOG_STORAGE_QUOTA`
    /// (bytes, `0` for unlimited).
    pub fn from_env() -> Result<Self, ConfigError> {
        let quota: usize = parse_var("CATALOG_STORAGE_QUOTA", DEFAULT_QUOTA_BYTES)?;
        Ok(Self {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: parse_var("PORT", 8083)?,
            },
            storage: StorageConfig {
                data_dir: env::var("CATALOG_DATA_DIR").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("data")),
                quota_bytes: (quota > 0).then_some(quota),
            },
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError { name, value }),
        Err(_) => Ok(default),
    }
}
