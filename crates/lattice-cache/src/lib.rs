//! # lattice-cache
//!
//! Keyed cache of asynchronous read results, plus the mutation coordinator
//! that keeps it consistent across writes.
//!
//! ## Architecture
//!
//! ```text
//! lattice-core (orchestration)
//!     ↓
//! QueryCache<K, V>          ← read coalescing, freshness, eviction (cache.rs)
//! MutationCoordinator<K, V> ← optimistic apply / rollback / invalidate (mutation.rs)
//!     ↓
//! EntityBackend             ← canonical data (lattice-store)
//! ```
//!
//! Per-key lifecycle: `empty → pending → (success | error)`, back to
//! `pending` on invalidation or staleness, evicted after the gc window with
//! no live subscriber. Concurrent reads of one key coalesce into a single
//! in-flight fetch; superseded fetches settle into the void.

pub mod cache;
pub mod entry;
pub mod mutation;
pub mod retry;

pub use cache::{CacheConfig, QueryCache, Subscription};
pub use mutation::{CacheTxn, EditFn, MutationCoordinator, MutationPlan, SettleWrite};
pub use retry::RetryPolicy;
