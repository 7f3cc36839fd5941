//! Shared secret configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where the secret id and secret key come from.
///
/// Each value is resolved from its environment variable first, then its
/// file, then the inline value.
#[derive(Clone, Serialize, Deserialize)]
pub struct SecretConfig {
    /// Inline secret id. The id is not sensitive.
    #[serde(default)]
    pub id: Option<String>,

    /// Environment variable containing the secret id.
    #[serde(default = "default_id_env")]
    pub id_env: Option<String>,

    /// Inline secret key. Prefer `key_env` or `key_file`.
    #[serde(default)]
    pub key: Option<String>,

    /// Environment variable containing the secret key.
    #[serde(default = "default_key_env")]
    pub key_env: Option<String>,

    /// Path to a file holding the secret key.
    #[serde(default)]
    pub key_file: Option<PathBuf>,
}

impl SecretConfig {
    /// Resolve the secret id from environment or inline value.
    pub fn resolve_id(&self) -> Option<String> {
        if let Some(env_var) = &self.id_env {
            if let Ok(id) = std::env::var(env_var) {
                return Some(id);
            }
        }

        self.id.clone()
    }

    /// Resolve the secret key from environment, file or inline value.
    pub fn resolve_key(&self) -> Result<Option<String>, std::io::Error> {
        // Try environment variable first
        if let Some(env_var) = &self.key_env {
            if let Ok(key) = std::env::var(env_var) {
                return Ok(Some(key));
            }
        }

        // Try file path
        if let Some(path) = &self.key_file {
            if path.exists() {
                let key = std::fs::read_to_string(path)?;
                return Ok(Some(key.trim().to_string()));
            }
        }

        Ok(self.key.clone())
    }

    /// Make a relative `key_file` relative to `base_dir`.
    pub(crate) fn rebase(&mut self, base_dir: &Path) {
        if let Some(path) = self.key_file.take() {
            self.key_file = Some(if path.is_absolute() {
                path
            } else {
                base_dir.join(path)
            });
        }
    }
}

impl Default for SecretConfig {
    fn default() -> Self {
        Self {
            id: None,
            id_env: default_id_env(),
            key: None,
            key_env: default_key_env(),
            key_file: None,
        }
    }
}

impl std::fmt::Debug for SecretConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretConfig")
            .field("id", &self.id)
            .field("id_env", &self.id_env)
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .field("key_env", &self.key_env)
            .field("key_file", &self.key_file)
            .finish()
    }
}

fn default_id_env() -> Option<String> {
    Some("SIGIL_SECRET_ID".to_string())
}

fn default_key_env() -> Option<String> {
    Some("SIGIL_SECRET_KEY".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_key_from_file_is_trimmed() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "key-from-file").unwrap();

        let config = SecretConfig {
            key_env: None,
            key_file: Some(file.path().to_path_buf()),
            key: Some("inline".to_string()),
            ..Default::default()
        };

        assert_eq!(
            config.resolve_key().unwrap(),
            Some("key-from-file".to_string())
        );
    }

    #[test]
    fn test_env_wins_over_inline() {
        // SAFETY: We're in a test and controlling the environment
        unsafe {
            std::env::set_var("SIGIL_TEST_SECRET_ID", "sid-from-env");
        }

        let config = SecretConfig {
            id: Some("inline".to_string()),
            id_env: Some("SIGIL_TEST_SECRET_ID".to_string()),
            ..Default::default()
        };

        assert_eq!(config.resolve_id(), Some("sid-from-env".to_string()));
    }

    #[test]
    fn test_missing_file_falls_back_to_inline() {
        let config = SecretConfig {
            key: Some("inline".to_string()),
            key_env: None,
            key_file: Some(PathBuf::from("/nonexistent/sigil.key")),
            ..Default::default()
        };

        assert_eq!(config.resolve_key().unwrap(), Some("inline".to_string()));
    }

    #[test]
    fn test_debug_redacts_inline_key() {
        let config = SecretConfig {
            key: Some("super-secret".to_string()),
            ..Default::default()
        };

        assert!(!format!("{:?}", config).contains("super-secret"));
    }
}
