//! Configuration management for milestoned.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "milestoned";

/// Default milestone collection file name.
const DB_FILE_NAME: &str = "milestones_db.json";

/// Default upload directory name.
const UPLOAD_DIR_NAME: &str = "uploads";

/// Default listen port.
const DEFAULT_PORT: u16 = 3000;

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. The bare `PORT` environment variable (deployment contract)
/// 2. Environment variables (prefixed with `MILESTONED_`)
/// 3. TOML config file at `~/.config/milestoned/config.toml`
/// 4. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Upload configuration.
    pub upload: UploadConfig,
}

/// Server-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port to listen on.
    pub port: u16,
    /// Address to bind to. All interfaces by default.
    pub bind: String,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Base data directory.
    /// Defaults to `~/.local/share/milestoned`.
    pub data_dir: Option<PathBuf>,
    /// Path to the milestone collection file.
    /// Defaults to `<data_dir>/milestones_db.json`.
    pub db_path: Option<PathBuf>,
    /// Directory for uploaded images.
    /// Defaults to `<data_dir>/uploads`.
    pub upload_dir: Option<PathBuf>,
}

/// Upload-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Maximum accepted request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: "0.0.0.0".to_string(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            // 25 MB covers phone photos without inviting arbitrary blobs
            max_body_bytes: 25 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if it exists)
    /// 3. Environment variables (prefixed with `MILESTONED_`)
    /// 4. The bare `PORT` environment variable
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file).nested())
            .merge(Env::prefixed("MILESTONED_").split("_"))
            .merge(Env::raw().only(&["PORT"]).map(|_| "server.port".into()));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::ConfigValidation {
                message: "server.port must be greater than 0".to_string(),
            });
        }

        if self.server.bind.parse::<IpAddr>().is_err() {
            return Err(Error::ConfigValidation {
                message: format!("server.bind is not an IP address: {}", self.server.bind),
            });
        }

        if self.upload.max_body_bytes == 0 {
            return Err(Error::ConfigValidation {
                message: "upload.max_body_bytes must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Get the data directory, resolving defaults if not set.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.storage
            .data_dir
            .clone()
            .unwrap_or_else(Self::default_data_dir)
    }

    /// Get the milestone collection path, resolving defaults if not set.
    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.storage
            .db_path
            .clone()
            .unwrap_or_else(|| self.data_dir().join(DB_FILE_NAME))
    }

    /// Get the upload directory, resolving defaults if not set.
    #[must_use]
    pub fn upload_dir(&self) -> PathBuf {
        self.storage
            .upload_dir
            .clone()
            .unwrap_or_else(|| self.data_dir().join(UPLOAD_DIR_NAME))
    }

    /// Get the socket address to bind the server to.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured bind address cannot be parsed.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .server
            .bind
            .parse()
            .map_err(|source| Error::BindAddress {
                addr: self.server.bind.clone(),
                source,
            })?;
        Ok(SocketAddr::new(ip, self.server.port))
    }
}
