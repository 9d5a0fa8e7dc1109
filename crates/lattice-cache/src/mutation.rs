//! Mutation coordination: optimistic apply, rollback, settle-time
//! invalidation.
//!
//! A mutation is described by a [`MutationPlan`]: which cache keys it edits
//! optimistically, which keys it claims for settle ordering, and which
//! scopes it invalidates on success and at settle. The coordinator runs the
//! protocol:
//!
//! 1. cancel in-flight reads for every edited key,
//! 2. snapshot current values into explicit [`CacheTxn`] records,
//! 3. apply the optimistic edits,
//! 4. execute the write,
//! 5. on success write the authoritative value and invalidate the declared
//!    success scopes,
//! 6. on failure restore every snapshot exactly and propagate the error,
//! 7. either way invalidate the settle scopes (detail-level consistency).
//!
//! Per-key ordering: every claimed key gets a version at issue time; settle
//! writes and rollbacks apply only while that version is still current, so
//! a slow mutation can never clobber the cache effects of one issued after
//! it.

use crate::cache::QueryCache;
use dashmap::DashMap;
use lattice_commons::{QueryKey, StoreResult};
use log::{debug, warn};
use std::future::Future;
use std::sync::Arc;

/// Optimistic cache edit: maps the current value (if any) to the predicted
/// post-mutation value; `None` means the entry should be removed.
pub type EditFn<V> = Box<dyn FnOnce(Option<&V>) -> Option<V> + Send>;

/// Explicit pre/post record of one optimistic cache edit. Rollback is a
/// pure data operation over these, with no closure-captured state.
#[derive(Debug, Clone)]
pub struct CacheTxn<K, V> {
    pub key: K,
    pub before: Option<V>,
    pub after: Option<V>,
}

/// Authoritative cache effect of a successful write.
pub enum SettleWrite<K, V> {
    /// Overwrite the entry with the server-returned value.
    Set(K, V),
    /// Drop the entry (confirmed delete).
    Remove(K),
    /// No direct write; rely on invalidation alone.
    None,
}

/// Declarative description of one mutation's cache footprint.
pub struct MutationPlan<K: QueryKey, V> {
    /// Keys edited optimistically before the write executes.
    pub edits: Vec<(K, EditFn<V>)>,
    /// Keys this mutation will write at settle time (beyond the edited
    /// ones); claimed up front so settle ordering covers them.
    pub claims: Vec<K>,
    /// Scopes invalidated only when the write succeeds (list-level entries
    /// whose membership/order may have changed).
    pub success_scopes: Vec<K::Scope>,
    /// Scopes invalidated on success *and* failure (the detail entry for
    /// the target, forcing eventual consistency with the store).
    pub settle_scopes: Vec<K::Scope>,
}

impl<K: QueryKey, V> MutationPlan<K, V> {
    /// Plan with no optimistic edits; callers show a loading state until
    /// the write settles.
    pub fn plain(claims: Vec<K>) -> Self {
        Self {
            edits: Vec::new(),
            claims,
            success_scopes: Vec::new(),
            settle_scopes: Vec::new(),
        }
    }
}

/// Runs mutations against a [`QueryCache`] with optimistic apply and
/// rollback. Never owns data; it only orchestrates transitions between
/// the store's canonical state and the cache's derived copy.
pub struct MutationCoordinator<K: QueryKey, V> {
    cache: QueryCache<K, V>,
    versions: Arc<DashMap<K, u64>>,
}

impl<K: QueryKey, V> Clone for MutationCoordinator<K, V> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            versions: self.versions.clone(),
        }
    }
}

impl<K, V> MutationCoordinator<K, V>
where
    K: QueryKey,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(cache: QueryCache<K, V>) -> Self {
        Self {
            cache,
            versions: Arc::new(DashMap::new()),
        }
    }

    /// Claims the next version for a key, superseding earlier in-flight
    /// mutations on it.
    fn issue(&self, key: &K) -> u64 {
        let mut version = self.versions.entry(key.clone()).or_insert(0);
        *version += 1;
        *version
    }

    /// Whether a version claimed at issue time is still the latest.
    fn is_current(&self, key: &K, ticket: u64) -> bool {
        self.versions
            .get(key)
            .map(|version| *version == ticket)
            .unwrap_or(false)
    }

    /// Executes one mutation through the full protocol.
    ///
    /// `op` performs the write against the entity store; `on_success` maps
    /// the store's return value to the authoritative cache effect.
    pub async fn run<T, Op, Fut, S>(
        &self,
        plan: MutationPlan<K, V>,
        op: Op,
        on_success: S,
    ) -> StoreResult<T>
    where
        T: Send,
        Op: FnOnce() -> Fut + Send,
        Fut: Future<Output = StoreResult<T>> + Send,
        S: FnOnce(&T) -> SettleWrite<K, V> + Send,
    {
        let MutationPlan {
            edits,
            claims,
            success_scopes,
            settle_scopes,
        } = plan;

        let mut tickets: Vec<(K, u64)> = Vec::with_capacity(claims.len() + edits.len());
        for key in &claims {
            tickets.push((key.clone(), self.issue(key)));
        }

        // Steps 1-3: cancel racing reads, snapshot, optimistically apply.
        let mut txns: Vec<CacheTxn<K, V>> = Vec::with_capacity(edits.len());
        for (key, edit) in edits {
            self.cache.cancel(&key);
            if !tickets.iter().any(|(k, _)| k == &key) {
                tickets.push((key.clone(), self.issue(&key)));
            }
            let before = self.cache.peek(&key);
            let after = edit(before.as_ref());
            match &after {
                Some(value) => self.cache.set_data(key.clone(), value.clone()),
                None => self.cache.remove(&key),
            }
            debug!("optimistically applied edit to {:?}", key);
            txns.push(CacheTxn { key, before, after });
        }

        let ticket_for = |key: &K| tickets.iter().find(|(k, _)| k == key).map(|(_, t)| *t);

        // Step 4: the actual write.
        let result = op().await;

        match &result {
            Ok(value) => {
                // Step 5: authoritative overwrite, then list invalidation.
                match on_success(value) {
                    SettleWrite::Set(key, data) => {
                        let current = ticket_for(&key).map_or(true, |t| self.is_current(&key, t));
                        if current {
                            self.cache.set_data(key, data);
                        } else {
                            debug!("skipping stale settle write for {:?}", key);
                        }
                    }
                    SettleWrite::Remove(key) => {
                        let current = ticket_for(&key).map_or(true, |t| self.is_current(&key, t));
                        if current {
                            self.cache.remove(&key);
                        }
                    }
                    SettleWrite::None => {}
                }
                for scope in &success_scopes {
                    self.cache.invalidate(scope);
                }
            }
            Err(error) => {
                // Step 6: exact rollback, newest edits first. Entries a
                // newer mutation has since claimed are left to that
                // mutation's settle.
                warn!("mutation failed, rolling back {} cache edits: {}", txns.len(), error);
                for txn in txns.iter().rev() {
                    let current = ticket_for(&txn.key)
                        .map_or(true, |t| self.is_current(&txn.key, t));
                    if !current {
                        debug!("skipping rollback of superseded key {:?}", txn.key);
                        continue;
                    }
                    match &txn.before {
                        Some(value) => self.cache.set_data(txn.key.clone(), value.clone()),
                        None => self.cache.remove(&txn.key),
                    }
                }
            }
        }

        // Step 7: detail-level consistency, success or failure.
        for scope in &settle_scopes {
            self.cache.invalidate(scope);
        }

        result
    }
}
