//! Shared fixtures for customer flow tests: a counting backend with
//! injectable failures, wrapped around the in-memory store.

use async_trait::async_trait;
use lattice_cache::{CacheConfig, RetryPolicy};
use lattice_commons::{
    Customer, CustomerDraft, CustomerPatch, ListFilter, Page, RecordId, StoreError, StoreResult,
};
use lattice_core::CustomerDirectory;
use lattice_store::{seed::sample_customers, EntityBackend, LatencyProfile, MemoryBackend};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Wraps the memory backend, counting calls per operation and failing on
/// demand.
pub struct CountingBackend {
    inner: MemoryBackend<Customer>,
    pub list_calls: AtomicU32,
    pub get_calls: AtomicU32,
    pub update_calls: AtomicU32,
    pub delete_calls: AtomicU32,
    pub fail_updates: AtomicBool,
    pub fail_deletes: AtomicBool,
    pub delete_delay: Duration,
}

impl CountingBackend {
    pub fn seeded() -> Self {
        Self {
            inner: MemoryBackend::with_seed(sample_customers(), LatencyProfile::instant()),
            list_calls: AtomicU32::new(0),
            get_calls: AtomicU32::new(0),
            update_calls: AtomicU32::new(0),
            delete_calls: AtomicU32::new(0),
            fail_updates: AtomicBool::new(false),
            fail_deletes: AtomicBool::new(false),
            delete_delay: Duration::ZERO,
        }
    }

    pub fn with_delete_delay(mut self, delay: Duration) -> Self {
        self.delete_delay = delay;
        self
    }

    pub fn list_count(&self) -> u32 {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn get_count(&self) -> u32 {
        self.get_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EntityBackend<Customer> for CountingBackend {
    async fn list(&self, filter: &ListFilter) -> StoreResult<Page<Customer>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.list(filter).await
    }

    async fn get(&self, id: &RecordId) -> StoreResult<Customer> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get(id).await
    }

    async fn create(&self, draft: CustomerDraft) -> StoreResult<Customer> {
        self.inner.create(draft).await
    }

    async fn update(&self, id: &RecordId, patch: CustomerPatch) -> StoreResult<Customer> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(StoreError::backend("injected update failure"));
        }
        self.inner.update(id, patch).await
    }

    async fn delete(&self, id: &RecordId) -> StoreResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if !self.delete_delay.is_zero() {
            tokio::time::sleep(self.delete_delay).await;
        }
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StoreError::backend("injected delete failure"));
        }
        self.inner.delete(id).await
    }
}

/// Directory over a counting backend, with generous windows and no
/// retries so call counts stay exact.
pub fn directory(backend: Arc<CountingBackend>) -> CustomerDirectory {
    CustomerDirectory::new(
        backend,
        CacheConfig {
            stale_after: Duration::from_secs(600),
            evict_after: Duration::from_secs(1200),
            retry: RetryPolicy::none(),
        },
    )
}
