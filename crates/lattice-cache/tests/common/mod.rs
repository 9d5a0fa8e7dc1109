//! Shared fixtures for the cache behavior tests.

use lattice_cache::{CacheConfig, QueryCache, RetryPolicy};
use lattice_commons::QueryKey;
use std::time::Duration;

/// Minimal two-level key: list variants and per-record detail entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TestKey {
    List(u32),
    Detail(u32),
}

#[derive(Debug, Clone)]
pub enum TestScope {
    Lists,
    Detail(u32),
    All,
}

impl QueryKey for TestKey {
    type Scope = TestScope;

    fn in_scope(&self, scope: &TestScope) -> bool {
        match (self, scope) {
            (_, TestScope::All) => true,
            (TestKey::List(_), TestScope::Lists) => true,
            (TestKey::Detail(id), TestScope::Detail(target)) => id == target,
            _ => false,
        }
    }
}

/// Cache with short, test-friendly windows and no retries.
pub fn test_cache(stale_ms: u64, evict_ms: u64) -> QueryCache<TestKey, String> {
    QueryCache::new(CacheConfig {
        stale_after: Duration::from_millis(stale_ms),
        evict_after: Duration::from_millis(evict_ms),
        retry: RetryPolicy::none(),
    })
}
