//! User configuration for ontograph.
//!
//! Settings are read from a TOML file, by default `~/.ontograph/config.toml`
//! (`%LOCALAPPDATA%\ontograph\config.toml` on Windows). The CLI accepts another
//! location through `--config` or the `ONTOGRAPH_CONFIG` environment variable.
//! A missing file is not an error: every setting has a default.
//!
//! ```toml
//! # Session language for labels and definitions
//! language = "en"
//!
//! # JSON snapshot of the document store
//! store = "/data/ontology/store.json"
//!
//! [dictionary]
//! # Seconds before dictionary entries expire (0 = never)
//! ttl = 0
//! # Tag whose presence marks a populated dictionary
//! bootstrap_tag = "tag:persistent-id"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::constants::{BOOTSTRAP_TAG, DEFAULT_SESSION_LANGUAGE};
use crate::core::OntologyError;

fn default_language() -> String {
    DEFAULT_SESSION_LANGUAGE.to_string()
}

fn default_bootstrap_tag() -> String {
    BOOTSTRAP_TAG.to_string()
}

/// Dictionary settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryConfig {
    /// Seconds before entries expire; zero never expires
    #[serde(default)]
    pub ttl: u64,

    /// Sentinel tag checked by `is_populated`
    #[serde(default = "default_bootstrap_tag")]
    pub bootstrap_tag: String,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            ttl: 0,
            bootstrap_tag: default_bootstrap_tag(),
        }
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OntologyConfig {
    /// Language used to collapse labels, definitions and descriptions
    #[serde(default = "default_language")]
    pub language: String,

    /// Default store snapshot, used when the CLI gets no `--store`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<PathBuf>,

    #[serde(default)]
    pub dictionary: DictionaryConfig,
}

impl Default for OntologyConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            store: None,
            dictionary: DictionaryConfig::default(),
        }
    }
}

impl OntologyConfig {
    /// Load from the default location, or defaults if the file does not exist.
    pub async fn load() -> Result<Self> {
        Self::load_with_optional(None).await
    }

    /// Load from `path` if given, else from the default location.
    ///
    /// A missing file yields the defaults.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => Self::default_path()?,
        };

        if path.exists() {
            Self::load_from(&path).await
        } else {
            debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load and validate a specific file.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config in {}", path.display()))?;

        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save to a specific file, creating parent directories.
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }

    /// Platform location of the configuration file.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join("ontograph")
        } else {
            dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
                .join(".ontograph")
        };

        Ok(config_dir.join("config.toml"))
    }

    /// Check values that parse but cannot be used.
    pub fn validate(&self) -> std::result::Result<(), OntologyError> {
        if self.language.trim().is_empty() {
            return Err(OntologyError::Config {
                message: "language must not be empty".to_string(),
            });
        }
        if self.dictionary.bootstrap_tag.trim().is_empty() {
            return Err(OntologyError::Config {
                message: "dictionary.bootstrap_tag must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
