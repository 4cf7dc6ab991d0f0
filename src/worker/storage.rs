//! Versioned named caches.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::debug;

use super::lru::Recency;
use super::request::CachedResponse;
use super::{WorkerError, SHELL_CACHE_MAX_ENTRIES};

/// One named cache: request URL to stored response.
///
/// Pinned entries (the precached shell) stay until the cache is deleted.
/// Every other entry is evicted least recently used first once the cache is
/// at capacity.
#[derive(Debug, Clone)]
pub struct NamedCache {
    name: String,
    entries: HashMap<String, CachedResponse>,
    pinned: HashSet<String>,
    recency: Recency,
    capacity: usize,
}

impl NamedCache {
    pub(crate) fn new(name: &str, capacity: usize) -> Self {
        Self {
            name: name.to_string(),
            entries: HashMap::new(),
            pinned: HashSet::new(),
            recency: Recency::new(),
            capacity,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the entry without marking it used.
    pub fn get(&self, key: &str) -> Option<&CachedResponse> {
        self.entries.get(key)
    }

    /// Returns the entry and marks it used.
    pub fn lookup(&mut self, key: &str) -> Option<CachedResponse> {
        let hit = self.entries.get(key).cloned()?;
        if !self.pinned.contains(key) {
            self.recency.touch(key);
        }
        Some(hit)
    }

    /// Stores `response` under `key`, replacing an existing entry.
    ///
    /// A new key in a full cache evicts the least recently used unpinned
    /// entry; when every entry is pinned it fails with `CacheFull`.
    pub fn put(&mut self, key: String, response: CachedResponse) -> Result<(), WorkerError> {
        self.make_room(&key)?;
        if !self.pinned.contains(&key) {
            self.recency.touch(&key);
        }
        self.entries.insert(key, response);
        Ok(())
    }

    /// Stores `response` under `key` and exempts it from eviction.
    pub fn pin(&mut self, key: String, response: CachedResponse) -> Result<(), WorkerError> {
        self.make_room(&key)?;
        self.recency.remove(&key);
        self.pinned.insert(key.clone());
        self.entries.insert(key, response);
        Ok(())
    }

    fn make_room(&mut self, key: &str) -> Result<(), WorkerError> {
        if self.entries.contains_key(key) || self.entries.len() < self.capacity {
            return Ok(());
        }
        match self.recency.evict_oldest() {
            Some(evicted) => {
                debug!(cache = %self.name, "Evicting {}", evicted);
                self.entries.remove(&evicted);
                Ok(())
            }
            None => Err(WorkerError::CacheFull {
                name: self.name.clone(),
                capacity: self.capacity,
            }),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn is_pinned(&self, key: &str) -> bool {
        self.pinned.contains(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries with their pinned flag: pinned ones in key order, then the
    /// rest from least to most recently used. Storing them back in this
    /// order rebuilds the same cache.
    pub fn entries_oldest_first(&self) -> Vec<(&str, &CachedResponse, bool)> {
        let mut pinned: Vec<&String> = self.pinned.iter().collect();
        pinned.sort();

        let pinned = pinned.into_iter().map(|key| (key, true));
        let unpinned = self.recency.oldest_first().map(|key| (key, false));
        pinned
            .chain(unpinned)
            .filter_map(|(key, is_pinned)| {
                self.entries
                    .get(key)
                    .map(|response| (key.as_str(), response, is_pinned))
            })
            .collect()
    }
}

/// All named caches of the shell, keyed by name.
#[derive(Debug, Clone)]
pub struct CacheStorage {
    caches: BTreeMap<String, NamedCache>,
    /// Entry limit of each named cache
    capacity: usize,
}

impl Default for CacheStorage {
    fn default() -> Self {
        Self::new(SHELL_CACHE_MAX_ENTRIES)
    }
}

impl CacheStorage {
    pub fn new(capacity: usize) -> Self {
        Self {
            caches: BTreeMap::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the named cache, creating it if needed.
    pub fn open(&mut self, name: &str) -> &mut NamedCache {
        let capacity = self.capacity;
        self.caches
            .entry(name.to_string())
            .or_insert_with(|| NamedCache::new(name, capacity))
    }

    /// Adds a cache built elsewhere, replacing one of the same name.
    pub fn insert(&mut self, cache: NamedCache) {
        self.caches.insert(cache.name.clone(), cache);
    }

    pub fn get(&self, name: &str) -> Option<&NamedCache> {
        self.caches.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.caches.contains_key(name)
    }

    /// Cache names in sorted order.
    pub fn keys(&self) -> Vec<String> {
        self.caches.keys().cloned().collect()
    }

    pub fn delete(&mut self, name: &str) -> bool {
        self.caches.remove(name).is_some()
    }

    /// Looks `key` up in the named cache and marks it used.
    pub fn match_in(&mut self, name: &str, key: &str) -> Option<CachedResponse> {
        self.caches.get_mut(name)?.lookup(key)
    }

    pub fn put_in(&mut self, name: &str, key: String, response: CachedResponse) -> Result<(), WorkerError> {
        self.open(name).put(key, response)
    }
}
