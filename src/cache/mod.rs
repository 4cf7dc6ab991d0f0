//! Cache Module
//!
//! Time-bounded query cache for results fetched from the data service.
//! The cache is an explicit object handed to whoever needs it; there is no
//! process-global instance.

mod entry;
mod key;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::CacheEntry;
pub use key::QueryKey;
pub use stats::CacheStats;
pub use store::{Lookup, QueryCache};

use std::time::Duration;

// == Public Constants ==
/// How long a fetched result counts as fresh
pub const DEFAULT_QUERY_TTL: Duration = Duration::from_secs(5 * 60);

/// How long a stale result is kept around before the sweeper drops it
pub const DEFAULT_GC_TIME: Duration = Duration::from_secs(5 * 60);
