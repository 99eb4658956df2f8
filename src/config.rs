//! Application configuration management.
//!
//! Settings are layered with figment, later layers winning:
//!
//! 1. Built-in defaults
//! 2. TOML config file (`--config`, or the platform config directory)
//! 3. Environment variables prefixed with `FILETRACK_`
//! 4. Command-line flags (applied by the caller)

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scanner::{Hasher, DEFAULT_CHUNK_SIZE, DEFAULT_READ_ATTEMPTS};

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "FILETRACK_";

/// Errors loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// A layer could not be parsed.
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),

    /// A value is out of range.
    #[error("Invalid value for {key}: {message}")]
    Value {
        /// Offending key
        key: &'static str,
        /// What is wrong with it
        message: String,
    },
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum number of registry entries added per run (unbounded if unset).
    pub max_files: Option<usize>,
    /// Read chunk size in bytes.
    pub chunk_size: usize,
    /// Pause between failed read attempts, in milliseconds.
    pub retry_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_files: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            retry_delay_ms: 0,
        }
    }
}

impl Config {
    /// Build the layered figment.
    ///
    /// An explicit `path` is always merged; otherwise the default platform
    /// config file is merged if it exists.
    #[must_use]
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        match path {
            Some(p) => figment = figment.merge(Toml::file(p)),
            None => {
                if let Some(default) = Self::default_path().filter(|p| p.exists()) {
                    log::debug!("Using config file {}", default.display());
                    figment = figment.merge(Toml::file(default));
                }
            }
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Load and validate configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if an explicit path is missing, or
    /// [`ConfigError::Invalid`]/[`ConfigError::Value`] on bad content.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(p) = path {
            if !p.is_file() {
                return Err(ConfigError::NotFound(p.to_path_buf()));
            }
        }
        Self::from_figment(&Self::figment(path))
    }

    /// Extract and validate configuration from a figment.
    ///
    /// # Errors
    ///
    /// See [`Config::load`].
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        if figment.contains("read_attempts") {
            return Err(ConfigError::Value {
                key: "read_attempts",
                message: format!("is fixed at {DEFAULT_READ_ATTEMPTS} attempts"),
            });
        }
        let config: Self = figment.extract().map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Value`] for the first out-of-range value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_files == Some(0) {
            return Err(ConfigError::Value {
                key: "max_files",
                message: "must be a positive integer".to_string(),
            });
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::Value {
                key: "chunk_size",
                message: "must be at least 1 byte".to_string(),
            });
        }
        Ok(())
    }

    /// Hasher configured from these settings.
    ///
    /// The number of read attempts is fixed at [`DEFAULT_READ_ATTEMPTS`].
    #[must_use]
    pub fn hasher(&self) -> Hasher {
        Hasher::new()
            .with_chunk_size(self.chunk_size)
            .with_retry_delay(Duration::from_millis(self.retry_delay_ms))
    }

    /// Default platform-specific configuration path.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "filetrack", "filetrack")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
