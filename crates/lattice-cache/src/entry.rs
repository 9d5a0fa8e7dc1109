//! Per-key cache entry state.

use lattice_commons::StoreError;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::Instant;

/// Lifecycle state of one cache entry.
///
/// `Empty` stands in for both "never fetched" and "cancelled mid-flight";
/// the containing map not having the key at all is equivalent to `Empty`
/// with no history.
pub(crate) enum EntryState<V> {
    Empty,
    Pending {
        /// Wakes waiters when the flight settles or is superseded. The
        /// sender side lives in the flight leader's guard and (via the Arc)
        /// in the entry itself, so both settling and cancellation can wake.
        notify: Arc<watch::Sender<()>>,
        done: watch::Receiver<()>,
    },
    Success {
        data: V,
        fetched_at: Instant,
    },
    Error {
        error: StoreError,
        failed_at: Instant,
    },
}

pub(crate) struct CacheEntry<V> {
    pub state: EntryState<V>,
    /// Bumped whenever the entry's fate is decided by someone other than
    /// the in-flight fetch (cancel, direct write, invalidate-while-pending).
    /// A fetch may only settle if the generation it started under is still
    /// current.
    pub generation: u64,
    /// Set by `invalidate`: the next read refetches regardless of age.
    pub stale: bool,
    /// Live subscription guards.
    pub subscribers: usize,
    /// Last settle / release instant, for gc-window accounting.
    pub last_touch: Instant,
}

impl<V> Default for CacheEntry<V> {
    fn default() -> Self {
        Self {
            state: EntryState::Empty,
            generation: 0,
            stale: false,
            subscribers: 0,
            last_touch: Instant::now(),
        }
    }
}

impl<V> CacheEntry<V> {
    pub fn touch(&mut self) {
        self.last_touch = Instant::now();
    }

    /// Wakes any waiters parked on a pending flight and marks the entry
    /// empty. The superseded fetch will find its generation stale and drop
    /// its result. No-op for settled entries.
    pub fn abort_flight(&mut self) {
        if let EntryState::Pending { notify, .. } = &self.state {
            let _ = notify.send(());
            self.generation += 1;
            self.state = EntryState::Empty;
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, EntryState::Pending { .. })
    }
}
