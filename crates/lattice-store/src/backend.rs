//! The async CRUD contract every entity backend implements.

use async_trait::async_trait;
use lattice_commons::{Entity, ListFilter, Page, RecordId, StoreResult};

/// Asynchronous CRUD over one entity collection.
///
/// Implementations must be thread-safe; callers hold them as
/// `Arc<dyn EntityBackend<E>>` and share them across tasks. Every method may
/// suspend; the await points are exactly where a call crosses into storage
/// (real or simulated).
///
/// ## Error contract
///
/// - `list` never fails with `NotFound`; an empty result is a valid page.
/// - `get`, `update`, `delete` fail with `StoreError::NotFound` when no
///   record has the identifier.
/// - `create` and `update` fail with `StoreError::Validation` before any
///   storage call when the payload is malformed.
/// - Anything else surfaces as `Backend`/`Transport`.
#[async_trait]
pub trait EntityBackend<E: Entity>: Send + Sync {
    /// Lists records matching the filter, paged per `filter.page()` /
    /// `filter.limit()`. Status is applied before search; both before
    /// paging.
    async fn list(&self, filter: &ListFilter) -> StoreResult<Page<E>>;

    /// Fetches a single record by identifier.
    async fn get(&self, id: &RecordId) -> StoreResult<E>;

    /// Creates a record from a draft; the store assigns the identifier and
    /// both timestamps.
    async fn create(&self, draft: E::Draft) -> StoreResult<E>;

    /// Merges a patch over an existing record and refreshes `updated_at`.
    /// Identifier and `created_at` are immutable.
    async fn update(&self, id: &RecordId, patch: E::Patch) -> StoreResult<E>;

    /// Removes a record irreversibly.
    async fn delete(&self, id: &RecordId) -> StoreResult<()>;
}
