//! Shared state for CLI commands

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::OntologyConfig;
use crate::core::{NodeId, OntologyError};
use crate::dictionary::Dictionary;
use crate::store::{DocumentStore, MemoryStore};
use crate::structure::{CachedStructure, TemplateStructure};

/// A loaded store, its dictionary and the configuration they came from.
#[derive(Debug)]
pub struct Session {
    pub config: OntologyConfig,
    pub store: Arc<MemoryStore>,
    pub dictionary: Dictionary,
}

impl Session {
    /// Load the configuration, then the store snapshot it names (or
    /// `store_path`), and warm the dictionary from the store.
    pub async fn open(config_path: Option<PathBuf>, store_path: Option<PathBuf>) -> Result<Self> {
        let config = OntologyConfig::load_with_optional(config_path).await?;

        let path = store_path.or_else(|| config.store.clone()).ok_or_else(|| {
            OntologyError::Config {
                message: "no store snapshot given: pass --store or set `store` in the configuration"
                    .to_string(),
            }
        })?;
        let store = MemoryStore::load_from(&path).await?;

        Ok(Self::from_parts(config, store)?)
    }

    /// Build a session around an already loaded store.
    pub fn from_parts(config: OntologyConfig, store: MemoryStore) -> crate::core::Result<Self> {
        let dictionary = Dictionary::from_config(&config.dictionary);
        if !dictionary.is_populated() {
            let loaded = dictionary.reload(&store)?;
            info!("Dictionary warmed with {} tag(s)", loaded);
        }

        Ok(Self {
            config,
            store: Arc::new(store),
            dictionary,
        })
    }

    pub fn shared_store(&self) -> Arc<dyn DocumentStore> {
        self.store.clone()
    }

    pub fn language(&self) -> &str {
        &self.config.language
    }

    /// Open a traversal session rooted at `root`.
    pub fn structure(&self, root: NodeId) -> Result<CachedStructure> {
        debug!("Opening structure at node {}", root);
        CachedStructure::new(self.shared_store(), self.dictionary.clone(), root, self.language())
            .with_context(|| format!("Failed to open node {root}"))
    }

    /// Load the template rooted at `root`.
    pub fn template(&self, root: NodeId) -> Result<TemplateStructure> {
        TemplateStructure::new(self.shared_store(), self.dictionary.clone(), root, self.language())
            .with_context(|| format!("Failed to load template {root}"))
    }
}
