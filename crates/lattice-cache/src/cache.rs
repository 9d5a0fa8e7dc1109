//! The query cache: keyed async read results with freshness and eviction.

use crate::entry::{CacheEntry, EntryState};
use crate::retry::RetryPolicy;
use dashmap::DashMap;
use lattice_commons::{QueryKey, StoreError, StoreResult};
use lattice_configs::CacheSettings;
use log::{debug, warn};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// Cache tuning: freshness window, eviction window, retry policy.
#[derive(Debug, Clone, Copy)]
pub struct CacheConfig {
    /// Age after which a settled entry is refetched on the next read.
    pub stale_after: Duration,
    /// Idle time after which an unsubscribed, settled entry is evicted.
    pub evict_after: Duration,
    pub retry: RetryPolicy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_after: Duration::from_secs(5 * 60),
            evict_after: Duration::from_secs(10 * 60),
            retry: RetryPolicy::default(),
        }
    }
}

impl CacheConfig {
    pub fn from_settings(settings: &CacheSettings) -> Self {
        Self {
            stale_after: Duration::from_millis(settings.stale_after_ms),
            evict_after: Duration::from_millis(settings.evict_after_ms),
            retry: RetryPolicy::from_settings(&settings.retry),
        }
    }
}

struct CacheInner<K: QueryKey, V> {
    config: CacheConfig,
    entries: DashMap<K, CacheEntry<V>>,
}

/// Keyed cache of asynchronous read results.
///
/// Cheaply cloneable; clones share the same entries. The cache never runs a
/// fetch of its own accord: [`read`](QueryCache::read) drives everything,
/// and concurrent reads of one key coalesce into a single in-flight fetch.
pub struct QueryCache<K: QueryKey, V> {
    inner: Arc<CacheInner<K, V>>,
}

impl<K: QueryKey, V> Clone for QueryCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

/// What a read decided to do while it held the entry lock.
enum Step<V> {
    Hit(V),
    Replay(StoreError),
    Wait(watch::Receiver<()>),
    Fetch {
        generation: u64,
        notify: Arc<watch::Sender<()>>,
    },
}

impl<K, V> QueryCache<K, V>
where
    K: QueryKey,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(config: CacheConfig) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                config,
                entries: DashMap::new(),
            }),
        }
    }

    /// Reads through the cache.
    ///
    /// - Fresh `success`: returns the cached value, no fetch.
    /// - Fresh `error`: replays the stored error, no fetch. Terminal errors
    ///   are never swallowed; they keep surfacing until a later fetch
    ///   succeeds or the entry is invalidated.
    /// - `pending`: awaits the in-flight fetch instead of issuing another.
    /// - Otherwise: claims the flight and runs `fetcher` under the retry
    ///   policy.
    ///
    /// A fetch that was superseded while in flight (cancelled, invalidated,
    /// overwritten by `set_data`) still returns its result to its own
    /// caller but does not touch the entry.
    pub async fn read<F, Fut>(&self, key: K, fetcher: F) -> StoreResult<V>
    where
        F: Fn() -> Fut + Send + Sync,
        Fut: Future<Output = StoreResult<V>> + Send,
    {
        loop {
            let step = {
                let mut entry = self.inner.entries.entry(key.clone()).or_default();
                let stale_after = self.inner.config.stale_after;
                let step = match &entry.state {
                    EntryState::Success { data, fetched_at }
                        if !entry.stale && fetched_at.elapsed() < stale_after =>
                    {
                        Step::Hit(data.clone())
                    }
                    EntryState::Error { error, failed_at }
                        if !entry.stale && failed_at.elapsed() < stale_after =>
                    {
                        Step::Replay(error.clone())
                    }
                    EntryState::Pending { done, .. } => Step::Wait(done.clone()),
                    _ => {
                        let (tx, rx) = watch::channel(());
                        let notify = Arc::new(tx);
                        entry.generation += 1;
                        entry.stale = false;
                        entry.state = EntryState::Pending {
                            notify: notify.clone(),
                            done: rx,
                        };
                        Step::Fetch {
                            generation: entry.generation,
                            notify,
                        }
                    }
                };
                if matches!(step, Step::Hit(_)) {
                    entry.touch();
                }
                step
            };

            match step {
                Step::Hit(data) => {
                    debug!("cache hit for {:?}", key);
                    return Ok(data);
                }
                Step::Replay(error) => {
                    debug!("replaying cached error for {:?}", key);
                    return Err(error);
                }
                Step::Wait(mut done) => {
                    // Woken on settle, cancellation, or leader abandonment;
                    // loop around and re-inspect the entry either way.
                    let _ = done.changed().await;
                }
                Step::Fetch { generation, notify } => {
                    debug!("cache miss for {:?}, fetching", key);
                    let guard = FlightGuard {
                        cache: self,
                        key: &key,
                        generation,
                        armed: true,
                    };

                    let result = self.inner.config.retry.run(&fetcher).await;

                    {
                        let mut entry = self.inner.entries.entry(key.clone()).or_default();
                        if entry.generation == generation && entry.is_pending() {
                            entry.state = match &result {
                                Ok(data) => EntryState::Success {
                                    data: data.clone(),
                                    fetched_at: Instant::now(),
                                },
                                Err(error) => EntryState::Error {
                                    error: error.clone(),
                                    failed_at: Instant::now(),
                                },
                            };
                            entry.stale = false;
                            entry.touch();
                        } else {
                            debug!("dropping superseded fetch result for {:?}", key);
                        }
                    }

                    guard.disarm();
                    let _ = notify.send(());
                    return result;
                }
            }
        }
    }

    /// Current cached value, if the entry is in `success` state. Does not
    /// refresh, fetch, or touch anything.
    pub fn peek(&self, key: &K) -> Option<V> {
        self.inner.entries.get(key).and_then(|entry| match &entry.state {
            EntryState::Success { data, .. } => Some(data.clone()),
            _ => None,
        })
    }

    /// Direct cache write: the entry becomes fresh `success` immediately.
    ///
    /// Any in-flight fetch for the key is superseded; the optimistic value
    /// must not be clobbered by a slow read that started earlier.
    pub fn set_data(&self, key: K, data: V) {
        let mut entry = self.inner.entries.entry(key).or_default();
        if entry.is_pending() {
            entry.abort_flight();
        } else {
            entry.generation += 1;
        }
        entry.state = EntryState::Success {
            data,
            fetched_at: Instant::now(),
        };
        entry.stale = false;
        entry.touch();
    }

    /// Immediate eviction (used after a confirmed delete). Waiters on an
    /// in-flight fetch are woken and will re-claim against the now-empty
    /// slot.
    pub fn remove(&self, key: &K) {
        if let Some((_, entry)) = self.inner.entries.remove(key) {
            if let EntryState::Pending { notify, .. } = &entry.state {
                let _ = notify.send(());
            }
        }
    }

    /// Cancels the in-flight fetch for a key, if any. The fetch's eventual
    /// resolution is dropped silently; settled data is left alone.
    pub fn cancel(&self, key: &K) {
        if let Some(mut entry) = self.inner.entries.get_mut(key) {
            if entry.is_pending() {
                debug!("cancelling in-flight fetch for {:?}", key);
                entry.abort_flight();
                entry.touch();
            }
        }
    }

    /// Marks every entry in the scope stale, forcing the next read to
    /// refetch regardless of age. Pending entries are aborted so their
    /// (possibly pre-invalidation) results never land.
    pub fn invalidate(&self, scope: &K::Scope) {
        let mut count = 0usize;
        for mut item in self.inner.entries.iter_mut() {
            if !item.key().in_scope(scope) {
                continue;
            }
            if item.is_pending() {
                item.abort_flight();
            } else {
                item.stale = true;
            }
            count += 1;
        }
        debug!("invalidated {} entries in scope {:?}", count, scope);
    }

    /// Registers interest in a key. Entries with live subscriptions are
    /// never evicted by [`sweep`](Self::sweep).
    pub fn subscribe(&self, key: K) -> Subscription<K, V> {
        {
            let mut entry = self.inner.entries.entry(key.clone()).or_default();
            entry.subscribers += 1;
        }
        Subscription {
            inner: self.inner.clone(),
            key,
        }
    }

    /// Evicts settled entries that have had no subscriber and no activity
    /// for the gc window. Returns how many entries were dropped.
    pub fn sweep(&self) -> usize {
        let evict_after = self.inner.config.evict_after;
        let before = self.inner.entries.len();
        self.inner.entries.retain(|_, entry| {
            entry.subscribers > 0
                || entry.is_pending()
                || entry.last_touch.elapsed() < evict_after
        });
        let evicted = before - self.inner.entries.len();
        if evicted > 0 {
            debug!("gc sweep evicted {} entries", evicted);
        }
        evicted
    }

    /// Spawns a periodic [`sweep`](Self::sweep). Abort the returned handle
    /// to stop. Eviction stays explicit; nothing inside `read` ever runs a
    /// sweep behind the caller's back.
    pub fn spawn_gc(&self, interval: Duration) -> tokio::task::JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await; // first tick fires immediately; skip it
            loop {
                ticker.tick().await;
                cache.sweep();
            }
        })
    }

    /// Number of entries currently held (any state).
    pub fn entry_count(&self) -> usize {
        self.inner.entries.len()
    }
}

/// Wakes waiters and clears the pending slot if the flight leader's future
/// is dropped before it could settle (task cancelled mid-fetch).
struct FlightGuard<'a, K: QueryKey, V> {
    cache: &'a QueryCache<K, V>,
    key: &'a K,
    generation: u64,
    armed: bool,
}

impl<K: QueryKey, V> FlightGuard<'_, K, V> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl<K: QueryKey, V> Drop for FlightGuard<'_, K, V> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Some(mut entry) = self.cache.inner.entries.get_mut(self.key) {
            if entry.generation == self.generation && entry.is_pending() {
                warn!("fetch for {:?} abandoned mid-flight", self.key);
                entry.abort_flight();
            }
        }
    }
}

/// Subscription guard returned by [`QueryCache::subscribe`].
pub struct Subscription<K: QueryKey, V> {
    inner: Arc<CacheInner<K, V>>,
    key: K,
}

impl<K: QueryKey, V> Drop for Subscription<K, V> {
    fn drop(&mut self) {
        if let Some(mut entry) = self.inner.entries.get_mut(&self.key) {
            entry.subscribers = entry.subscribers.saturating_sub(1);
            if entry.subscribers == 0 {
                // The gc window starts counting from release
                entry.touch();
            }
        }
    }
}
