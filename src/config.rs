//! Application configuration
//!
//! Values come from, in increasing priority: built-in defaults, an optional
//! TOML file, then environment variables (`HOST`, `PORT`,
//! `FLASHCARDS_DATA_DIR`, `FLASHCARDS_CATALOG`, `FLASHCARDS_LOG_FILE`).
//!
//! ```toml
//! port = 3000
//! data_dir = "/var/lib/smart-flashcards"
//! cache_ttl_secs = 600
//!
//! [rate_limit]
//! window_secs = 900
//! max_requests = 100
//! ```

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::flashcards::{CatalogError, LimitPolicy, SubjectCatalog};

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "FLASHCARDS_CONFIG";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid value for {name}: {value:?}")]
    InvalidEnv { name: &'static str, value: String },

    #[error("Invalid listen address: {0}")]
    InvalidAddress(String),

    #[error("Data directory not found")]
    DataDirNotFound,

    #[error("Subject catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Fixed-window rate limiting per client IP
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub window_secs: u64,
    pub max_requests: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: 15 * 60,
            max_requests: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Where cards are stored; defaults to the platform data dir
    pub data_dir: Option<PathBuf>,
    /// Subject catalog file; the built-in catalog is used when unset
    pub catalog_path: Option<PathBuf>,
    /// Default log filter when `RUST_LOG` is not set
    pub log_level: String,
    /// Also append log lines to this file
    pub log_file: Option<PathBuf>,
    pub default_limit: i64,
    pub max_limit: i64,
    /// How long a mixed-subject response is reused
    pub cache_ttl_secs: u64,
    pub rate_limit: RateLimitConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let limits = LimitPolicy::default();
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            data_dir: None,
            catalog_path: None,
            log_level: "info".to_string(),
            log_file: None,
            default_limit: limits.default,
            max_limit: limits.max,
            cache_ttl_secs: 600,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from `path` (or `$FLASHCARDS_CONFIG`) and the process environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let env_path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let path = path.map(Path::to_path_buf).or(env_path);
        Self::from_sources(path.as_deref(), |name| std::env::var(name).ok())
    }

    /// Load from an optional file, then apply overrides looked up through `env`
    pub fn from_sources<F>(path: Option<&Path>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match path {
            Some(path) => {
                let content = fs::read_to_string(path)?;
                let config: AppConfig = toml::from_str(&content)?;
                config
            }
            None => AppConfig::default(),
        };

        if let Some(host) = env("HOST") {
            config.host = host;
        }
        if let Some(port) = env("PORT") {
            config.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidEnv { name: "PORT", value: port.clone() })?;
        }
        if let Some(dir) = env("FLASHCARDS_DATA_DIR") {
            config.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(catalog) = env("FLASHCARDS_CATALOG") {
            config.catalog_path = Some(PathBuf::from(catalog));
        }
        if let Some(log_file) = env("FLASHCARDS_LOG_FILE") {
            config.log_file = Some(PathBuf::from(log_file));
        }

        Ok(config)
    }

    /// Socket address the server binds to
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|_| ConfigError::InvalidAddress(addr))
    }

    /// Configured data dir, or `<platform data dir>/smart-flashcards`
    pub fn resolve_data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        dirs::data_local_dir()
            .map(|p| p.join("smart-flashcards"))
            .ok_or(ConfigError::DataDirNotFound)
    }

    /// Load the subject catalog. A broken catalog is fatal at startup.
    pub fn load_catalog(&self) -> Result<SubjectCatalog> {
        let catalog = match &self.catalog_path {
            Some(path) => SubjectCatalog::load(path)?,
            None => SubjectCatalog::builtin()?,
        };
        Ok(catalog)
    }

    pub fn limit_policy(&self) -> LimitPolicy {
        LimitPolicy {
            default: self.default_limit,
            max: self.max_limit,
        }
    }
}
