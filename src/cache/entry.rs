//! Cache Entry Module
//!
//! Defines the structure for individual cached query results with a
//! freshness window.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// A cached query result and the time it was fetched.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored result
    pub value: V,
    /// When the result was stored
    pub fetched_at: Instant,
    /// How long the result counts as fresh
    pub ttl: Duration,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry stamped with the current time.
    pub fn new(value: V, ttl: Duration) -> Self {
        Self {
            value,
            fetched_at: Instant::now(),
            ttl,
        }
    }

    // == Is Stale ==
    /// Checks whether the freshness window has elapsed.
    ///
    /// Boundary condition: an entry is stale once its age is greater than or
    /// equal to the TTL, so a zero TTL is stale immediately.
    pub fn is_stale(&self) -> bool {
        self.is_stale_at(Instant::now())
    }

    pub fn is_stale_at(&self, now: Instant) -> bool {
        self.age_at(now) >= self.ttl
    }

    // == Age ==
    pub fn age_at(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.fetched_at)
    }

    // == Stale For ==
    /// How long the entry has been stale, or `None` while it is still fresh.
    pub fn stale_for_at(&self, now: Instant) -> Option<Duration> {
        self.age_at(now).checked_sub(self.ttl)
    }

    // == Fresh Remaining ==
    /// Remaining freshness, zero once stale.
    pub fn fresh_remaining(&self) -> Duration {
        self.ttl.saturating_sub(self.age_at(Instant::now()))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_entry_is_fresh_when_created() {
        let entry = CacheEntry::new("value", Duration::from_secs(60));

        assert_eq!(entry.value, "value");
        assert!(!entry.is_stale());
        assert!(entry.fresh_remaining() > Duration::from_secs(59));
    }

    #[test]
    fn test_entry_goes_stale() {
        let entry = CacheEntry::new("value", Duration::from_millis(50));

        assert!(!entry.is_stale());

        sleep(Duration::from_millis(80));

        assert!(entry.is_stale());
        assert_eq!(entry.fresh_remaining(), Duration::ZERO);
    }

    #[test]
    fn test_zero_ttl_is_stale_immediately() {
        let entry = CacheEntry::new("value", Duration::ZERO);
        assert!(entry.is_stale_at(entry.fetched_at));
    }

    #[test]
    fn test_stale_for() {
        let entry = CacheEntry::new("value", Duration::from_secs(10));
        let start = entry.fetched_at;

        assert_eq!(entry.stale_for_at(start + Duration::from_secs(5)), None);
        assert_eq!(
            entry.stale_for_at(start + Duration::from_secs(10)),
            Some(Duration::ZERO)
        );
        assert_eq!(
            entry.stale_for_at(start + Duration::from_secs(25)),
            Some(Duration::from_secs(15))
        );
    }
}
