//! Configuration types for Sigil.
//!
//! Configuration is loaded from a YAML file (`sigil.yaml`):
//!
//! ```yaml
//! application_id: 100
//! secret:
//!   id: sid1
//!   key_file: secret.key
//! default_expire: 2h
//! legacy_trim: false
//! ```

pub mod secret;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub use secret::SecretConfig;

/// Complete Sigil configuration loaded from a file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SigilConfig {
    /// Application tokens are issued for and verified against.
    #[serde(default)]
    pub application_id: Option<u64>,

    /// Shared secret configuration.
    #[serde(default)]
    pub secret: SecretConfig,

    /// Lifetime of session tokens when none is given (e.g., "30m", "2h").
    #[serde(default)]
    pub default_expire: Option<String>,

    /// Strip field markers by character set instead of by prefix when verifying.
    #[serde(default)]
    pub legacy_trim: bool,
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SigilConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(ConfigError::from)
    }

    /// Load configuration and resolve paths relative to the file's directory.
    pub fn load_with_context(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut config = Self::from_file(path)?;

        let base_dir = path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));
        config.secret.rebase(&base_dir);

        Ok(config)
    }

    /// The application id, or an error naming the missing setting.
    pub fn require_application_id(&self) -> Result<u64, ConfigError> {
        self.application_id
            .ok_or_else(|| ConfigError::Config("application_id is not set".to_string()))
    }
}
