//! Query Cache Store Module
//!
//! Main cache engine: a map from query identity to the last fetched result,
//! with a freshness window per entry.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::cache::{CacheEntry, CacheStats, QueryKey};

// == Lookup ==
/// Outcome of a cache read.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<V> {
    /// Within the freshness window
    Fresh(V),
    /// Past the freshness window; usable, but the caller should refetch
    Stale(V),
    /// Nothing cached, or the entry was invalidated
    Miss,
}

impl<V> Lookup<V> {
    pub fn into_value(self) -> Option<V> {
        match self {
            Lookup::Fresh(v) | Lookup::Stale(v) => Some(v),
            Lookup::Miss => None,
        }
    }

    pub fn is_fresh(&self) -> bool {
        matches!(self, Lookup::Fresh(_))
    }
}

// == Query Cache ==
/// Time-bounded cache of query results.
#[derive(Debug)]
pub struct QueryCache<V> {
    entries: HashMap<QueryKey, CacheEntry<V>>,
    stats: CacheStats,
    /// Freshness window used when `set` is given no TTL
    default_ttl: Duration,
}

impl<V: Clone> QueryCache<V> {
    // == Constructor ==
    /// Creates an empty cache whose entries stay fresh for `default_ttl`.
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            default_ttl,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    // == Get ==
    /// Reads the result cached under `key`.
    ///
    /// Stale entries are returned as `Lookup::Stale` and kept; they are only
    /// replaced by `set` or removed by `invalidate` and `sweep`.
    pub fn get(&mut self, key: QueryKey) -> Lookup<V> {
        match self.entries.get(&key) {
            Some(entry) if entry.is_stale() => {
                self.stats.record_stale_hit();
                Lookup::Stale(entry.value.clone())
            }
            Some(entry) => {
                self.stats.record_hit();
                Lookup::Fresh(entry.value.clone())
            }
            None => {
                self.stats.record_miss();
                Lookup::Miss
            }
        }
    }

    /// Returns the cached value only while it is fresh, without touching
    /// the statistics.
    pub fn peek_fresh(&self, key: QueryKey) -> Option<V> {
        self.entries
            .get(&key)
            .filter(|entry| !entry.is_stale())
            .map(|entry| entry.value.clone())
    }

    // == Set ==
    /// Stores `value` under `key`, replacing any previous result and
    /// restarting the freshness window.
    pub fn set(&mut self, key: QueryKey, value: V, ttl: Option<Duration>) {
        let ttl = ttl.unwrap_or(self.default_ttl);
        self.entries.insert(key, CacheEntry::new(value, ttl));
        self.stats.set_total_entries(self.entries.len());
    }

    // == Invalidate ==
    /// Drops the result cached under `key` so the next read misses.
    ///
    /// Returns whether anything was cached.
    pub fn invalidate(&mut self, key: QueryKey) -> bool {
        let removed = self.entries.remove(&key).is_some();
        if removed {
            self.stats.record_invalidation();
            self.stats.set_total_entries(self.entries.len());
        }
        removed
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Sweep ==
    /// Removes entries that have been stale for at least `gc_time`.
    ///
    /// Returns the number of entries removed.
    pub fn sweep(&mut self, gc_time: Duration) -> usize {
        self.sweep_at(Instant::now(), gc_time)
    }

    pub fn sweep_at(&mut self, now: Instant, gc_time: Duration) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| entry.stale_for_at(now).map_or(true, |stale| stale < gc_time));
        self.stats.set_total_entries(self.entries.len());
        before - self.entries.len()
    }

    // == Length ==
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
