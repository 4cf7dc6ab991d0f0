//! Recency order of evictable shell cache entries.

use std::collections::VecDeque;

// == Recency ==
/// Tracks use order of cache keys.
///
/// - Front = most recently used
/// - Back = least recently used
#[derive(Debug, Clone, Default)]
pub struct Recency {
    order: VecDeque<String>,
}

impl Recency {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `key` as just used.
    pub fn touch(&mut self, key: &str) {
        self.remove(key);
        self.order.push_front(key.to_string());
    }

    pub fn remove(&mut self, key: &str) {
        self.order.retain(|k| k != key);
    }

    /// Removes and returns the least recently used key.
    pub fn evict_oldest(&mut self) -> Option<String> {
        self.order.pop_back()
    }

    /// Keys from least to most recently used.
    pub fn oldest_first(&self) -> impl Iterator<Item = &String> {
        self.order.iter().rev()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touch_moves_key_to_front() {
        let mut recency = Recency::new();
        recency.touch("a");
        recency.touch("b");
        recency.touch("c");
        recency.touch("a");

        let order: Vec<_> = recency.oldest_first().cloned().collect();
        assert_eq!(order, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_evict_oldest() {
        let mut recency = Recency::new();
        recency.touch("a");
        recency.touch("b");

        assert_eq!(recency.evict_oldest().as_deref(), Some("a"));
        assert_eq!(recency.evict_oldest().as_deref(), Some("b"));
        assert!(recency.evict_oldest().is_none());
        assert_eq!(recency.oldest_first().count(), 0);
    }

    #[test]
    fn test_remove() {
        let mut recency = Recency::new();
        recency.touch("a");
        recency.touch("b");
        recency.remove("a");

        assert_eq!(recency.oldest_first().count(), 1);
        assert_eq!(recency.evict_oldest().as_deref(), Some("b"));
    }
}
