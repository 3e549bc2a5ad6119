//! Key-value backends for the tag dictionary.

use dashmap::DashMap;
use std::time::{Duration, Instant};
use tracing::trace;

use super::TagDefinition;

/// Key of a dictionary entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Persistent tag identifier, maps to a serial
    Persistent(String),
    /// Serial id, maps to a definition
    Serial(u64),
}

/// Value of a dictionary entry.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheValue {
    Serial(u64),
    Definition(TagDefinition),
}

/// Shared key-value cache.
///
/// The dictionary writes its two mappings as independent entries, so a backend
/// only needs per-key atomicity. A `ttl` of zero means the entry never expires.
pub trait CacheBackend: Send + Sync {
    /// Store `value` under `key`, expiring after `ttl` seconds.
    fn set(&self, key: CacheKey, value: CacheValue, ttl: u64);

    /// Fetch a live entry.
    fn get(&self, key: &CacheKey) -> Option<CacheValue>;

    /// Remove an entry, returning whether a live one existed.
    fn delete(&self, key: &CacheKey) -> bool;

    /// Invalidate every current entry after `delay`; a zero delay clears at once.
    fn flush(&self, delay: Duration);
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: CacheValue,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// In-process [`CacheBackend`] over a [`DashMap`].
///
/// Expired entries are dropped lazily when read.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: DashMap<CacheKey, CacheEntry>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries held, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CacheBackend for MemoryCache {
    fn set(&self, key: CacheKey, value: CacheValue, ttl: u64) {
        let expires_at = (ttl > 0).then(|| Instant::now() + Duration::from_secs(ttl));
        self.entries.insert(key, CacheEntry { value, expires_at });
    }

    fn get(&self, key: &CacheKey) -> Option<CacheValue> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key)
            && !entry.is_expired(now)
        {
            return Some(entry.value.clone());
        }

        if self.entries.remove_if(key, |_, entry| entry.is_expired(now)).is_some() {
            trace!("Evicted expired dictionary entry {key:?}");
        }
        None
    }

    fn delete(&self, key: &CacheKey) -> bool {
        let now = Instant::now();
        self.entries
            .remove(key)
            .is_some_and(|(_, entry)| !entry.is_expired(now))
    }

    fn flush(&self, delay: Duration) {
        if delay.is_zero() {
            self.entries.clear();
            return;
        }

        let deadline = Instant::now() + delay;
        for mut entry in self.entries.iter_mut() {
            if entry.expires_at.is_none_or(|at| at > deadline) {
                entry.expires_at = Some(deadline);
            }
        }
    }
}
