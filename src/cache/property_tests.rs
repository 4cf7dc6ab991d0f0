//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the query cache against a simple model.

use proptest::prelude::*;
use std::time::Duration;

use crate::cache::{Lookup, QueryCache, QueryKey};

// == Test Configuration ==
const TEST_TTL: Duration = Duration::from_secs(300);

// == Strategies ==
#[derive(Debug, Clone)]
enum CacheOp {
    Set(u32),
    Get,
    Invalidate,
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        any::<u32>().prop_map(CacheOp::Set),
        Just(CacheOp::Get),
        Just(CacheOp::Invalidate),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // For any sequence of operations, every read returns the last value set
    // since the most recent invalidation, or a miss if there is none.
    #[test]
    fn prop_reads_follow_last_set_and_invalidate(
        ops in prop::collection::vec(cache_op_strategy(), 1..60)
    ) {
        let mut cache = QueryCache::new(TEST_TTL);
        let mut model: Option<u32> = None;

        for op in ops {
            match op {
                CacheOp::Set(v) => {
                    cache.set(QueryKey::Expenses, v, None);
                    model = Some(v);
                }
                CacheOp::Get => {
                    let expected = match model {
                        Some(v) => Lookup::Fresh(v),
                        None => Lookup::Miss,
                    };
                    prop_assert_eq!(cache.get(QueryKey::Expenses), expected);
                }
                CacheOp::Invalidate => {
                    let had = model.take().is_some();
                    prop_assert_eq!(cache.invalidate(QueryKey::Expenses), had);
                }
            }
        }
    }

    // Statistics count exactly the reads, by outcome, and the effective
    // invalidations.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        let mut cache = QueryCache::new(TEST_TTL);
        let mut hits = 0u64;
        let mut misses = 0u64;
        let mut invalidations = 0u64;

        for op in ops {
            match op {
                CacheOp::Set(v) => cache.set(QueryKey::Expenses, v, None),
                CacheOp::Get => match cache.get(QueryKey::Expenses) {
                    Lookup::Fresh(_) | Lookup::Stale(_) => hits += 1,
                    Lookup::Miss => misses += 1,
                },
                CacheOp::Invalidate => {
                    if cache.invalidate(QueryKey::Expenses) {
                        invalidations += 1;
                    }
                }
            }
        }

        let stats = cache.stats();
        prop_assert_eq!(stats.hits + stats.stale_hits, hits);
        prop_assert_eq!(stats.misses, misses);
        prop_assert_eq!(stats.invalidations, invalidations);
        prop_assert_eq!(stats.total_entries, cache.len());
        prop_assert!(cache.len() <= 1);
    }
}
