//! In-process document store with JSON snapshots.

use anyhow::{Context, Result as AnyResult};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

use super::{Collection, DocumentStore, Filter, StoredRecord};
use crate::constants::{SEQUENCE_NODES, SEQUENCE_TAGS};
use crate::core::{OntologyError, Result};

/// Rows of one collection, kept in insertion order.
#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<u64, StoredRecord>,
    keys: HashMap<String, u64>,
    next_row: u64,
}

impl Table {
    fn get(&self, key: &str) -> Option<&StoredRecord> {
        self.keys.get(key).and_then(|row| self.rows.get(row))
    }

    fn put(&mut self, key: String, record: StoredRecord) {
        if let Some(row) = self.keys.get(&key) {
            self.rows.insert(*row, record);
        } else {
            let row = self.next_row;
            self.next_row += 1;
            self.keys.insert(key, row);
            self.rows.insert(row, record);
        }
    }

    fn remove(&mut self, key: &str) -> bool {
        match self.keys.remove(key) {
            Some(row) => self.rows.remove(&row).is_some(),
            None => false,
        }
    }
}

/// Serialized form of a [`MemoryStore`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub terms: Vec<StoredRecord>,
    #[serde(default)]
    pub tags: Vec<StoredRecord>,
    #[serde(default)]
    pub nodes: Vec<StoredRecord>,
    #[serde(default)]
    pub edges: Vec<StoredRecord>,
    #[serde(default)]
    pub sequences: BTreeMap<String, u64>,
}

impl StoreSnapshot {
    fn records_mut(&mut self, collection: Collection) -> &mut Vec<StoredRecord> {
        match collection {
            Collection::Terms => &mut self.terms,
            Collection::Tags => &mut self.tags,
            Collection::Nodes => &mut self.nodes,
            Collection::Edges => &mut self.edges,
        }
    }
}

/// [`DocumentStore`] held entirely in memory.
///
/// Each collection sits behind its own lock, so readers of one collection never
/// wait on writers of another. Counters live in a [`DashMap`] and are
/// incremented under the entry lock, which makes [`DocumentStore::next_sequence`]
/// safe to call from concurrent committers.
#[derive(Debug, Default)]
pub struct MemoryStore {
    terms: RwLock<Table>,
    tags: RwLock<Table>,
    nodes: RwLock<Table>,
    edges: RwLock<Table>,
    sequences: DashMap<String, u64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self, collection: Collection) -> &RwLock<Table> {
        match collection {
            Collection::Terms => &self.terms,
            Collection::Tags => &self.tags,
            Collection::Nodes => &self.nodes,
            Collection::Edges => &self.edges,
        }
    }

    fn read(&self, collection: Collection) -> Result<RwLockReadGuard<'_, Table>> {
        self.table(collection).read().map_err(|_| OntologyError::Store {
            operation: format!("read {collection}"),
            reason: "lock poisoned".to_string(),
        })
    }

    fn write(&self, collection: Collection) -> Result<RwLockWriteGuard<'_, Table>> {
        self.table(collection).write().map_err(|_| OntologyError::Store {
            operation: format!("write {collection}"),
            reason: "lock poisoned".to_string(),
        })
    }

    fn record_key(record: &StoredRecord) -> Result<String> {
        record.key().ok_or_else(|| OntologyError::Store {
            operation: format!("write {}", record.collection()),
            reason: "record has no identifier".to_string(),
        })
    }

    /// Build a store from a snapshot.
    ///
    /// Every record must sit in the list of its own collection. Counters are
    /// raised to at least the highest serial found, so snapshots written by hand
    /// without a `sequences` table still hand out fresh ids.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Result<Self> {
        let store = Self::new();
        let StoreSnapshot {
            terms,
            tags,
            nodes,
            edges,
            sequences,
        } = snapshot;

        for (collection, records) in [
            (Collection::Terms, terms),
            (Collection::Tags, tags),
            (Collection::Nodes, nodes),
            (Collection::Edges, edges),
        ] {
            for record in records {
                if record.collection() != collection {
                    return Err(OntologyError::InvalidCollection {
                        collection: format!("{} record in {collection}", record.collection().entity_name()),
                    });
                }
                store.insert(record)?;
            }
        }

        for (counter, value) in sequences {
            store.sequences.insert(counter, value);
        }
        store.raise_to_stored(SEQUENCE_TAGS, Collection::Tags)?;
        store.raise_to_stored(SEQUENCE_NODES, Collection::Nodes)?;

        Ok(store)
    }

    fn raise_to_stored(&self, counter: &str, collection: Collection) -> Result<()> {
        let highest = self
            .read(collection)?
            .rows
            .values()
            .filter_map(|record| match record {
                StoredRecord::Tag(tag) => tag.serial(),
                StoredRecord::Node(node) => node.id().map(|id| id.get()),
                _ => None,
            })
            .max()
            .unwrap_or(0);

        self.raise_sequence(counter, highest)
    }

    /// Copy the current contents into a snapshot.
    pub fn snapshot(&self) -> Result<StoreSnapshot> {
        let mut snapshot = StoreSnapshot::default();
        for collection in Collection::ALL {
            let table = self.read(collection)?;
            snapshot
                .records_mut(collection)
                .extend(table.rows.values().cloned());
        }
        snapshot.sequences = self
            .sequences
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect();
        Ok(snapshot)
    }

    /// Load a store from a JSON snapshot file.
    pub async fn load_from(path: &Path) -> AnyResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read store snapshot: {}", path.display()))?;

        let snapshot: StoreSnapshot = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse store snapshot: {}", path.display()))?;

        let store = Self::from_snapshot(snapshot)
            .with_context(|| format!("Invalid store snapshot: {}", path.display()))?;

        info!(
            "Loaded store from {} ({} nodes, {} edges)",
            path.display(),
            store.count(Collection::Nodes)?,
            store.count(Collection::Edges)?
        );
        Ok(store)
    }

    /// Save the store as a JSON snapshot file, creating parent directories.
    pub async fn save_to(&self, path: &Path) -> AnyResult<()> {
        let content = serde_json::to_string_pretty(&self.snapshot()?)
            .context("Failed to serialize store snapshot")?;

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create directory: {}", parent.display())
            })?;
        }

        tokio::fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write store snapshot: {}", path.display()))?;

        debug!("Saved store snapshot to {}", path.display());
        Ok(())
    }
}

impl DocumentStore for MemoryStore {
    fn get(&self, collection: Collection, key: &str) -> Result<Option<StoredRecord>> {
        Ok(self.read(collection)?.get(key).cloned())
    }

    fn find(&self, collection: Collection, filter: &Filter) -> Result<Vec<StoredRecord>> {
        let table = self.read(collection)?;
        Ok(table
            .rows
            .values()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect())
    }

    fn insert(&self, record: StoredRecord) -> Result<()> {
        let collection = record.collection();
        let key = Self::record_key(&record)?;
        let mut table = self.write(collection)?;
        if table.keys.contains_key(&key) {
            return Err(OntologyError::Duplicate {
                collection: collection.to_string(),
                identifier: key,
            });
        }
        table.put(key, record);
        Ok(())
    }

    fn upsert(&self, record: StoredRecord) -> Result<()> {
        let key = Self::record_key(&record)?;
        self.write(record.collection())?.put(key, record);
        Ok(())
    }

    fn remove(&self, collection: Collection, key: &str) -> Result<bool> {
        Ok(self.write(collection)?.remove(key))
    }

    fn next_sequence(&self, counter: &str) -> Result<u64> {
        let mut entry = self.sequences.entry(counter.to_string()).or_insert(0);
        *entry += 1;
        Ok(*entry)
    }

    fn raise_sequence(&self, counter: &str, at_least: u64) -> Result<()> {
        let mut entry = self.sequences.entry(counter.to_string()).or_insert(0);
        if *entry < at_least {
            *entry = at_least;
        }
        Ok(())
    }

    fn count(&self, collection: Collection) -> Result<usize> {
        Ok(self.read(collection)?.rows.len())
    }
}
