//! Persisted application configuration.
//!
//! The user's API key lives in a small `config.json` (`{"apiKey": "..."}`)
//! under the platform config directory. Reads are forgiving (a missing or
//! unreadable file behaves like an empty configuration) while writes
//! report their errors.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::ENV_API_KEY;
use crate::error::{Error, Result};

/// File name of the persisted configuration.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Scaffold value some setups ship in `.env` files; never a real key.
const PLACEHOLDER_KEY: &str = "your-key-here";

/// Answer to the settings UI's credential status query.
///
/// "Set" and "valid" are equivalent: no live validation call is made, a
/// key is considered valid by being present and non-placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyStatus {
    /// Whether a usable key is stored.
    pub is_set: bool,
    /// Treated as equivalent to `is_set`.
    pub is_valid: bool,
}

/// On-disk shape of `config.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<String>,
}

/// Reads and writes the persisted configuration file.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Create a store over the given config file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The default config file path under the platform config dir.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("claudechat")
            .join(CONFIG_FILE_NAME)
    }

    /// The path this store reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> ConfigFile {
        if !self.path.exists() {
            return ConfigFile::default();
        }
        match std::fs::read_to_string(&self.path) {
            Ok(data) => serde_json::from_str(&data).unwrap_or_else(|err| {
                tracing::error!(path = %self.path.display(), error = %err, "failed to parse config file");
                ConfigFile::default()
            }),
            Err(err) => {
                tracing::error!(path = %self.path.display(), error = %err, "failed to read config file");
                ConfigFile::default()
            }
        }
    }

    fn write(&self, config: &ConfigFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(Error::Io)?;
        }
        let data = serde_json::to_string_pretty(config)?;
        std::fs::write(&self.path, data).map_err(Error::Io)?;
        tracing::debug!(path = %self.path.display(), "config written");
        Ok(())
    }

    /// The stored API key, if a usable one is present.
    pub fn api_key(&self) -> Option<String> {
        self.read().api_key.filter(|key| is_usable_key(key))
    }

    /// Whether a usable API key is stored.
    pub fn has_api_key(&self) -> bool {
        self.api_key().is_some()
    }

    /// Credential status for the settings UI.
    pub fn api_key_status(&self) -> ApiKeyStatus {
        let is_set = self.has_api_key();
        ApiKeyStatus {
            is_set,
            is_valid: is_set,
        }
    }

    /// Store a new API key.
    ///
    /// # Errors
    ///
    /// Rejects empty and placeholder keys with [`Error::InvalidRequest`];
    /// propagates filesystem failures.
    pub fn set_api_key(&self, key: &str) -> Result<()> {
        if !is_usable_key(key) {
            return Err(Error::invalid_request("API key must not be empty"));
        }
        let mut config = self.read();
        config.api_key = Some(key.to_string());
        self.write(&config)?;
        tracing::info!("API key saved to config file");
        Ok(())
    }

    /// One-time migration of `ANTHROPIC_API_KEY` from the environment into
    /// the config file. Skipped when the file already exists.
    pub fn migrate_from_env(&self) -> Result<()> {
        if self.path.exists() {
            tracing::debug!("config file already exists, skipping migration");
            return Ok(());
        }
        if let Ok(key) = std::env::var(ENV_API_KEY) {
            if is_usable_key(&key) {
                tracing::info!("migrating API key from environment to config file");
                self.write(&ConfigFile { api_key: Some(key) })?;
            }
        }
        Ok(())
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(Self::default_path())
    }
}

fn is_usable_key(key: &str) -> bool {
    !key.is_empty() && key != PLACEHOLDER_KEY
}
