//! Shared tag dictionary.
//!
//! Tags are looked up constantly while traversing the graph: by persistent
//! identifier when a node names its tag, and by serial when a compact record
//! refers to a field. The dictionary keeps both mappings in a shared key-value
//! cache so these lookups never reach the document store.
//!
//! # Architecture
//!
//! ```text
//! persistent id ──► serial ──► TagDefinition
//!   CacheKey::Persistent        CacheKey::Serial
//! ```
//!
//! The two entries are written independently. A concurrent reader may briefly
//! see a serial without its definition (or the reverse); callers resolve through
//! [`Dictionary::resolve_definition`] with `assert` set when they need both.
//!
//! A bootstrap tag, committed when the ontology is first populated, doubles as a
//! sentinel: [`Dictionary::is_populated`] only checks whether it resolves.

pub mod backing;

pub use backing::{CacheBackend, CacheKey, CacheValue, MemoryCache};

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::DictionaryConfig;
use crate::constants::BOOTSTRAP_TAG;
use crate::core::{LanguageString, OntologyError, Result, TagId};
use crate::graph::{DataKind, DataType, Tag};
use crate::store::{DocumentStore, DocumentStoreExt, Filter};

/// Cached copy of the fields of a tag needed to interpret its values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TagDefinition {
    pub persistent_id: String,
    pub data_type: Option<DataType>,
    pub kind: BTreeSet<DataKind>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub pattern: Option<String>,
    pub label: Vec<LanguageString>,
}

impl TagDefinition {
    fn from_tag(tag: &Tag, persistent_id: String) -> Self {
        Self {
            persistent_id,
            data_type: tag.data_type(),
            kind: tag.kind().clone(),
            min: tag.min(),
            max: tag.max(),
            pattern: tag.pattern().map(str::to_string),
            label: tag.label().to_vec(),
        }
    }
}

/// Either identifier of a tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagIdentifier {
    Persistent(String),
    Serial(u64),
}

impl From<&str> for TagIdentifier {
    fn from(value: &str) -> Self {
        Self::Persistent(value.to_string())
    }
}

impl From<&TagId> for TagIdentifier {
    fn from(value: &TagId) -> Self {
        Self::Persistent(value.to_string())
    }
}

impl From<u64> for TagIdentifier {
    fn from(value: u64) -> Self {
        Self::Serial(value)
    }
}

/// Handle on the shared tag dictionary.
///
/// Cloning is cheap; clones share the same backend.
#[derive(Clone)]
pub struct Dictionary {
    backend: Arc<dyn CacheBackend>,
    ttl: u64,
    bootstrap_tag: String,
}

impl std::fmt::Debug for Dictionary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dictionary")
            .field("ttl", &self.ttl)
            .field("bootstrap_tag", &self.bootstrap_tag)
            .finish_non_exhaustive()
    }
}

impl Dictionary {
    /// Wrap a backend with no expiry and the default bootstrap tag.
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self {
            backend,
            ttl: 0,
            bootstrap_tag: BOOTSTRAP_TAG.to_string(),
        }
    }

    /// Dictionary over a fresh [`MemoryCache`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryCache::new()))
    }

    /// Dictionary over a fresh [`MemoryCache`] configured from `config`.
    pub fn from_config(config: &DictionaryConfig) -> Self {
        Self::in_memory()
            .with_ttl(config.ttl)
            .with_bootstrap_tag(config.bootstrap_tag.clone())
    }

    /// Default time-to-live in seconds for new entries; zero never expires.
    #[must_use]
    pub fn with_ttl(mut self, ttl: u64) -> Self {
        self.ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_bootstrap_tag(mut self, tag: impl Into<String>) -> Self {
        self.bootstrap_tag = tag.into();
        self
    }

    pub fn bootstrap_tag(&self) -> &str {
        &self.bootstrap_tag
    }

    /// Serial id of the tag with persistent identifier `persistent_id`.
    ///
    /// A missing entry yields `Ok(None)`, or [`OntologyError::NotFound`] when
    /// `assert` is set.
    pub fn resolve_serial(&self, persistent_id: &str, assert: bool) -> Result<Option<u64>> {
        match self.backend.get(&CacheKey::Persistent(persistent_id.to_string())) {
            Some(CacheValue::Serial(serial)) => Ok(Some(serial)),
            _ if assert => Err(OntologyError::not_found("tag serial", persistent_id)),
            _ => Ok(None),
        }
    }

    /// Definition of the tag with serial id `serial`.
    ///
    /// A missing entry yields an empty definition, or [`OntologyError::NotFound`]
    /// when `assert` is set.
    pub fn resolve_definition(&self, serial: u64, assert: bool) -> Result<TagDefinition> {
        match self.backend.get(&CacheKey::Serial(serial)) {
            Some(CacheValue::Definition(definition)) => Ok(definition),
            _ if assert => Err(OntologyError::not_found("tag definition", serial)),
            _ => Ok(TagDefinition::default()),
        }
    }

    /// Write both mappings of a committed tag.
    ///
    /// `ttl` overrides the dictionary default for these two entries.
    pub fn set_tag(&self, tag: &Tag, ttl: Option<u64>) -> Result<()> {
        let (Some(id), Some(serial)) = (tag.id(), tag.serial()) else {
            return Err(OntologyError::InvalidInput {
                reason: "tag needs both a persistent identifier and a serial id".to_string(),
            });
        };

        let ttl = ttl.unwrap_or(self.ttl);
        let persistent_id = id.to_string();
        self.backend.set(
            CacheKey::Persistent(persistent_id.clone()),
            CacheValue::Serial(serial),
            ttl,
        );
        self.backend.set(
            CacheKey::Serial(serial),
            CacheValue::Definition(TagDefinition::from_tag(tag, persistent_id)),
            ttl,
        );
        debug!("Dictionary set '{}' -> {}", id, serial);
        Ok(())
    }

    /// Remove both mappings of a tag, given either identifier.
    ///
    /// Returns whether any entry was removed; with `assert` set, removing nothing
    /// fails with [`OntologyError::NotFound`].
    pub fn delete_tag(&self, identifier: impl Into<TagIdentifier>, assert: bool) -> Result<bool> {
        let identifier = identifier.into();
        let (persistent_id, serial) = match &identifier {
            TagIdentifier::Persistent(id) => (Some(id.clone()), self.resolve_serial(id, false)?),
            TagIdentifier::Serial(serial) => {
                let definition = self.resolve_definition(*serial, false)?;
                let id = (!definition.persistent_id.is_empty()).then_some(definition.persistent_id);
                (id, Some(*serial))
            }
        };

        let mut removed = false;
        if let Some(id) = persistent_id {
            removed |= self.backend.delete(&CacheKey::Persistent(id));
        }
        if let Some(serial) = serial {
            removed |= self.backend.delete(&CacheKey::Serial(serial));
        }

        if !removed && assert {
            return Err(match identifier {
                TagIdentifier::Persistent(id) => OntologyError::not_found("tag", id),
                TagIdentifier::Serial(serial) => OntologyError::not_found("tag", serial),
            });
        }
        Ok(removed)
    }

    /// Whether the bootstrap tag resolves.
    pub fn is_populated(&self) -> bool {
        matches!(self.resolve_serial(&self.bootstrap_tag, false), Ok(Some(_)))
    }

    /// Invalidate the dictionary after `delay_seconds`; zero clears at once.
    pub fn flush(&self, delay_seconds: u64) {
        self.backend.flush(Duration::from_secs(delay_seconds));
        debug!("Dictionary flush scheduled in {}s", delay_seconds);
    }

    /// Write every committed tag of `store` into the dictionary.
    ///
    /// Returns the number of tags written. Tags lacking a serial are skipped.
    pub fn reload(&self, store: &dyn DocumentStore) -> Result<usize> {
        let mut count = 0;
        for tag in store.find_tags(&Filter::new())? {
            if tag.serial().is_some() {
                self.set_tag(&tag, None)?;
                count += 1;
            }
        }
        info!("Reloaded {} tag(s) into the dictionary", count);
        Ok(count)
    }
}
