//! Configuration management for PDF Shelf Server

use serde::Deserialize;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub upload: UploadConfig,
    pub thumbnail: ThumbnailConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub database_url: String,
    /// Total bytes the store may hold (0 = unlimited)
    pub quota_bytes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    pub max_file_size: u64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ThumbnailConfig {
    pub width: u32,
    pub height: u32,
}

/// Default upload limit: 100MB
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:./pdf-shelf.db";

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            storage: StorageConfig {
                backend: StorageBackend::Sqlite,
                database_url: DEFAULT_DATABASE_URL.to_string(),
                quota_bytes: 0,
            },
            upload: UploadConfig {
                max_file_size: DEFAULT_MAX_UPLOAD_BYTES,
            },
            thumbnail: ThumbnailConfig::default(),
        }
    }
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            width: 200,
            height: 280,
        }
    }
}

impl StorageConfig {
    /// Human-readable location of the store for startup logs
    pub fn describe(&self) -> String {
        match self.backend {
            StorageBackend::Sqlite => format!("sqlite ({})", self.database_url),
            StorageBackend::Memory => "memory (not persisted)".to_string(),
        }
    }
}

impl Config {
    /// Read configuration from the environment. Unset variables take their
    /// defaults; a variable that is set but invalid is an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Config::default();

        Ok(Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: parse_var("SERVER_PORT", defaults.server.port)?,
            },
            storage: StorageConfig {
                backend: match env::var("STORAGE_BACKEND")
                    .unwrap_or_else(|_| "sqlite".to_string())
                    .to_lowercase()
                    .as_str()
                {
                    "sqlite" => StorageBackend::Sqlite,
                    "memory" => StorageBackend::Memory,
                    other => {
                        return Err(ConfigError::InvalidValue {
                            var: "STORAGE_BACKEND",
                            value: other.to_string(),
                        })
                    }
                },
                database_url: env::var("DATABASE_URL")
                    .unwrap_or(defaults.storage.database_url),
                quota_bytes: parse_var("STORAGE_QUOTA_BYTES", defaults.storage.quota_bytes)?,
            },
            upload: UploadConfig {
                max_file_size: parse_var("MAX_UPLOAD_BYTES", defaults.upload.max_file_size)?,
            },
            thumbnail: ThumbnailConfig {
                width: parse_var("THUMBNAIL_WIDTH", defaults.thumbnail.width)?,
                height: parse_var("THUMBNAIL_HEIGHT", defaults.thumbnail.height)?,
            },
        })
    }
}

/// Read a numeric variable, falling back to `default` when it is unset
fn parse_var<T: FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { var, value }),
        Err(_) => Ok(default),
    }
}
