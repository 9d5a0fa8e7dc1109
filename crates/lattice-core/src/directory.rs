//! The customer data API: cached reads, coordinated writes.

use crate::keys::{CustomerData, CustomerKey, CustomerScope};
use chrono::Utc;
use lattice_cache::{CacheConfig, MutationCoordinator, MutationPlan, QueryCache, SettleWrite};
use lattice_commons::{
    Customer, CustomerDraft, CustomerPatch, Entity, ListFilter, Page, RecordId, StoreResult,
};
use lattice_configs::EngineConfig;
use lattice_store::{backend_from_config, EntityBackend};
use log::debug;
use std::sync::Arc;

/// High-level customer data access.
///
/// Every read is served through the query cache (single-flight, freshness
/// windows); every write runs the mutation protocol (optimistic apply,
/// rollback, declared invalidation). The directory owns no record data:
/// the backend holds canonical state, the cache a time-bounded copy.
pub struct CustomerDirectory {
    backend: Arc<dyn EntityBackend<Customer>>,
    cache: QueryCache<CustomerKey, CustomerData>,
    coordinator: MutationCoordinator<CustomerKey, CustomerData>,
}

impl CustomerDirectory {
    pub fn new(backend: Arc<dyn EntityBackend<Customer>>, config: CacheConfig) -> Self {
        let cache = QueryCache::new(config);
        let coordinator = MutationCoordinator::new(cache.clone());
        Self {
            backend,
            cache,
            coordinator,
        }
    }

    /// Builds the whole stack from configuration: backend selection (mock
    /// or HTTP) plus cache windows and retry policy.
    pub fn from_config(config: &EngineConfig) -> StoreResult<Self> {
        let backend = backend_from_config(&config.store)?;
        Ok(Self::new(backend, CacheConfig::from_settings(&config.cache)))
    }

    /// The underlying cache, for subscriptions and gc scheduling.
    pub fn cache(&self) -> &QueryCache<CustomerKey, CustomerData> {
        &self.cache
    }

    /// Cached list read. Equivalent filters (same normalized form) share
    /// one cache entry and one in-flight fetch.
    pub async fn customers(&self, filter: &ListFilter) -> StoreResult<Page<Customer>> {
        let normalized = filter.normalized();
        let key = CustomerKey::list(&normalized);
        let backend = Arc::clone(&self.backend);

        self.cache
            .read(key, move || {
                let backend = Arc::clone(&backend);
                let filter = normalized.clone();
                async move { backend.list(&filter).await.map(CustomerData::List) }
            })
            .await?
            .into_page()
    }

    /// Cached detail read.
    pub async fn customer(&self, id: &RecordId) -> StoreResult<Customer> {
        let key = CustomerKey::detail(id.clone());
        let backend = Arc::clone(&self.backend);
        let id = id.clone();

        self.cache
            .read(key, move || {
                let backend = Arc::clone(&backend);
                let id = id.clone();
                async move { backend.get(&id).await.map(CustomerData::Detail) }
            })
            .await?
            .into_record()
    }

    /// Creates a customer. On success the new record seeds its own detail
    /// entry (no follow-up fetch needed) and every list variant is
    /// invalidated, since membership changed.
    pub async fn create_customer(&self, draft: CustomerDraft) -> StoreResult<Customer> {
        let backend = Arc::clone(&self.backend);
        self.coordinator
            .run(
                MutationPlan {
                    edits: Vec::new(),
                    claims: Vec::new(),
                    success_scopes: vec![CustomerScope::Lists],
                    settle_scopes: Vec::new(),
                },
                move || async move { backend.create(draft).await },
                |created: &Customer| {
                    debug!("created customer {}", created.id);
                    SettleWrite::Set(
                        CustomerKey::detail(created.id.clone()),
                        CustomerData::Detail(created.clone()),
                    )
                },
            )
            .await
    }

    /// Updates a customer without optimistic apply; callers show a loading
    /// state until the write settles.
    pub async fn update_customer(
        &self,
        id: &RecordId,
        patch: CustomerPatch,
    ) -> StoreResult<Customer> {
        let backend = Arc::clone(&self.backend);
        let detail = CustomerKey::detail(id.clone());
        let target = id.clone();

        self.coordinator
            .run(
                MutationPlan {
                    edits: Vec::new(),
                    claims: vec![detail],
                    success_scopes: vec![CustomerScope::Lists],
                    settle_scopes: vec![CustomerScope::Detail(id.clone())],
                },
                move || async move { backend.update(&target, patch).await },
                |updated: &Customer| {
                    SettleWrite::Set(
                        CustomerKey::detail(updated.id.clone()),
                        CustomerData::Detail(updated.clone()),
                    )
                },
            )
            .await
    }

    /// Updates a customer with optimistic apply: the merged record (with
    /// `updated_at` bumped) lands in the detail entry before the write
    /// resolves; a failing write restores the exact previous entry.
    pub async fn update_customer_optimistic(
        &self,
        id: &RecordId,
        patch: CustomerPatch,
    ) -> StoreResult<Customer> {
        // Validate up front so an invalid patch never reaches the cache as
        // a prediction.
        Customer::validate_patch(&patch)?;

        let backend = Arc::clone(&self.backend);
        let detail = CustomerKey::detail(id.clone());
        let target = id.clone();
        let predicted_patch = patch.clone();

        self.coordinator
            .run(
                MutationPlan {
                    edits: vec![(
                        detail.clone(),
                        Box::new(move |previous: Option<&CustomerData>| {
                            match previous.and_then(CustomerData::as_record) {
                                Some(record) => {
                                    let mut predicted = record.clone();
                                    predicted.apply_patch(&predicted_patch, Utc::now());
                                    Some(CustomerData::Detail(predicted))
                                }
                                // Nothing cached to predict from; leave the
                                // entry as it was.
                                None => previous.cloned(),
                            }
                        }),
                    )],
                    claims: vec![detail],
                    success_scopes: vec![CustomerScope::Lists],
                    settle_scopes: vec![CustomerScope::Detail(id.clone())],
                },
                move || async move { backend.update(&target, patch).await },
                |updated: &Customer| {
                    SettleWrite::Set(
                        CustomerKey::detail(updated.id.clone()),
                        CustomerData::Detail(updated.clone()),
                    )
                },
            )
            .await
    }

    /// Deletes a customer without optimistic apply.
    pub async fn delete_customer(&self, id: &RecordId) -> StoreResult<()> {
        let backend = Arc::clone(&self.backend);
        let detail = CustomerKey::detail(id.clone());
        let target = id.clone();
        let settle_key = detail.clone();

        self.coordinator
            .run(
                MutationPlan {
                    edits: Vec::new(),
                    claims: vec![detail],
                    success_scopes: vec![CustomerScope::Lists],
                    settle_scopes: vec![CustomerScope::Detail(id.clone())],
                },
                move || async move { backend.delete(&target).await },
                move |_: &()| SettleWrite::Remove(settle_key),
            )
            .await
    }

    /// Deletes a customer optimistically: the row disappears at once from
    /// the list entry the caller is viewing (and the detail entry goes
    /// with it). A failing write restores the exact previous page: same
    /// rows, same positions.
    pub async fn delete_customer_optimistic(
        &self,
        id: &RecordId,
        filter: &ListFilter,
    ) -> StoreResult<()> {
        let backend = Arc::clone(&self.backend);
        let normalized = filter.normalized();
        let limit = normalized.limit();
        let list_key = CustomerKey::list(&normalized);
        let detail = CustomerKey::detail(id.clone());
        let target = id.clone();
        let removed = id.clone();
        let settle_key = detail.clone();

        self.coordinator
            .run(
                MutationPlan {
                    edits: vec![
                        (
                            list_key.clone(),
                            Box::new(move |previous: Option<&CustomerData>| {
                                match previous.and_then(CustomerData::as_page) {
                                    Some(page) => {
                                        let mut page = page.clone();
                                        let before = page.records.len();
                                        page.records.retain(|record| record.id() != &removed);
                                        if page.records.len() < before {
                                            page.total = page.total.saturating_sub(1);
                                            page.total_pages =
                                                page.total.div_ceil(limit as usize) as u32;
                                            page.has_next_page = page.page < page.total_pages;
                                            page.has_previous_page =
                                                page.page > 1 && page.total > 0;
                                        }
                                        Some(CustomerData::List(page))
                                    }
                                    None => previous.cloned(),
                                }
                            }),
                        ),
                        (detail.clone(), Box::new(|_| None)),
                    ],
                    claims: vec![list_key, detail],
                    success_scopes: vec![CustomerScope::Lists],
                    settle_scopes: vec![CustomerScope::Detail(id.clone())],
                },
                move || async move { backend.delete(&target).await },
                move |_: &()| SettleWrite::Remove(settle_key),
            )
            .await
    }
}
