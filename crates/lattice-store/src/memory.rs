//! In-memory entity backend with simulated latency.
//!
//! This is the development/mock store: an explicitly constructed instance
//! holding its records in a `parking_lot::RwLock<Vec<_>>`, with injected
//! initial state and an explicit [`reset`](MemoryBackend::reset) lifecycle.
//! There is deliberately no global, module-level database; every test and
//! every engine instance owns its own backend.
//!
//! Latency is simulated per operation with `tokio::time::sleep` so that
//! callers exercise their loading states. It is a tunable, not a
//! correctness requirement; tests run with [`LatencyProfile::instant`].

use crate::backend::EntityBackend;
use async_trait::async_trait;
use chrono::Utc;
use lattice_commons::{Entity, ListFilter, Page, RecordId, RowView, SortOrder, StoreError, StoreResult};
use lattice_configs::LatencySettings;
use log::debug;
use parking_lot::RwLock;
use std::time::Duration;
use uuid::Uuid;

/// Per-operation simulated latency.
#[derive(Debug, Clone, Copy, Default)]
pub struct LatencyProfile {
    pub list: Duration,
    pub get: Duration,
    pub create: Duration,
    pub update: Duration,
    pub delete: Duration,
}

impl LatencyProfile {
    /// Zero latency everywhere.
    pub fn instant() -> Self {
        Self::default()
    }

    /// Converts the configured millisecond values.
    pub fn from_settings(settings: &LatencySettings) -> Self {
        Self {
            list: Duration::from_millis(settings.list_ms),
            get: Duration::from_millis(settings.get_ms),
            create: Duration::from_millis(settings.create_ms),
            update: Duration::from_millis(settings.update_ms),
            delete: Duration::from_millis(settings.delete_ms),
        }
    }
}

/// In-memory backend over one entity collection.
pub struct MemoryBackend<E: Entity> {
    records: RwLock<Vec<E>>,
    seed: Vec<E>,
    latency: LatencyProfile,
}

impl<E: Entity> MemoryBackend<E> {
    /// Creates a backend pre-loaded with `seed`; [`reset`](Self::reset)
    /// restores exactly this state.
    pub fn with_seed(seed: Vec<E>, latency: LatencyProfile) -> Self {
        Self {
            records: RwLock::new(seed.clone()),
            seed,
            latency,
        }
    }

    /// Creates an empty backend.
    pub fn empty(latency: LatencyProfile) -> Self {
        Self::with_seed(Vec::new(), latency)
    }

    /// Restores the seed state, discarding every mutation since
    /// construction.
    pub fn reset(&self) {
        *self.records.write() = self.seed.clone();
    }

    /// Number of records currently stored.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Copy of the current canonical state, in insertion order.
    pub fn snapshot(&self) -> Vec<E> {
        self.records.read().clone()
    }

    async fn simulate(&self, latency: Duration) {
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl<E> EntityBackend<E> for MemoryBackend<E>
where
    E: Entity + RowView,
{
    async fn list(&self, filter: &ListFilter) -> StoreResult<Page<E>> {
        self.simulate(self.latency.list).await;

        let mut matching: Vec<E> = self
            .records
            .read()
            .iter()
            .filter(|record| record.matches(filter))
            .cloned()
            .collect();

        if let Some(field) = filter.sort_by.as_deref().and_then(E::parse_field) {
            let order = filter.sort_order.unwrap_or(SortOrder::Asc);
            matching.sort_by(|a, b| {
                let ordering = a.cell(field).compare(&b.cell(field));
                match order {
                    SortOrder::Asc => ordering,
                    SortOrder::Desc => ordering.reverse(),
                }
            });
        }

        debug!(
            "list {}: {} matching of {} stored",
            E::KIND,
            matching.len(),
            self.len()
        );
        Ok(Page::paginate(matching, filter.page(), filter.limit()))
    }

    async fn get(&self, id: &RecordId) -> StoreResult<E> {
        self.simulate(self.latency.get).await;

        self.records
            .read()
            .iter()
            .find(|record| record.id() == id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(E::KIND, id.as_str()))
    }

    async fn create(&self, draft: E::Draft) -> StoreResult<E> {
        // Validation runs before the simulated network hop: malformed input
        // never reaches storage.
        E::validate_draft(&draft)?;
        self.simulate(self.latency.create).await;

        let record = E::from_draft(RecordId::new(Uuid::new_v4().to_string()), draft, Utc::now());
        self.records.write().push(record.clone());
        debug!("create {}: assigned id {}", E::KIND, record.id());
        Ok(record)
    }

    async fn update(&self, id: &RecordId, patch: E::Patch) -> StoreResult<E> {
        E::validate_patch(&patch)?;
        self.simulate(self.latency.update).await;

        let mut records = self.records.write();
        let record = records
            .iter_mut()
            .find(|record| record.id() == id)
            .ok_or_else(|| StoreError::not_found(E::KIND, id.as_str()))?;
        record.apply_patch(&patch, Utc::now());
        Ok(record.clone())
    }

    async fn delete(&self, id: &RecordId) -> StoreResult<()> {
        self.simulate(self.latency.delete).await;

        let mut records = self.records.write();
        let position = records
            .iter()
            .position(|record| record.id() == id)
            .ok_or_else(|| StoreError::not_found(E::KIND, id.as_str()))?;
        records.remove(position);
        debug!("delete {}: removed {}", E::KIND, id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::sample_customers;
    use lattice_commons::{Customer, CustomerDraft, CustomerPatch, CustomerStatus};

    fn backend() -> MemoryBackend<Customer> {
        MemoryBackend::with_seed(sample_customers(), LatencyProfile::instant())
    }

    #[tokio::test]
    async fn test_list_status_filter() {
        let store = backend();
        let page = store
            .list(&ListFilter {
                status: Some("active".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(page.total, 2);
        assert_eq!(page.records.len(), 2);
        assert!(page
            .records
            .iter()
            .all(|c| c.status == CustomerStatus::Active));
    }

    #[tokio::test]
    async fn test_list_search_and_paging() {
        let store = backend();
        let page = store
            .list(&ListFilter {
                search: Some("TECHSTART".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.records[0].name, "TechStart Inc.");

        // Page far past the end: empty records, counts intact
        let page = store
            .list(&ListFilter {
                page: Some(7),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(page.records.is_empty());
        assert_eq!(page.total, 3);
    }

    #[tokio::test]
    async fn test_list_backend_side_sort() {
        let store = backend();
        let page = store
            .list(&ListFilter {
                sort_by: Some("totalValue".to_string()),
                sort_order: Some(SortOrder::Desc),
                ..Default::default()
            })
            .await
            .unwrap();
        let values: Vec<f64> = page.records.iter().map(|c| c.total_value).collect();
        assert_eq!(values, vec![78500.0, 45000.0, 12000.0]);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let store = backend();
        let err = store.get(&RecordId::from("missing-id")).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_create_assigns_identity_and_timestamps() {
        let store = backend();
        let created = store
            .create(CustomerDraft {
                name: "Innovate Corp".to_string(),
                email: "emily@innovate.com".to_string(),
                phone: None,
                company: Some("Innovate Corp".to_string()),
                status: CustomerStatus::Inactive,
                total_value: 23000.0,
                last_contact: None,
            })
            .await
            .unwrap();

        assert!(!created.id.as_str().is_empty());
        assert_eq!(created.created_at, created.updated_at);
        assert_eq!(store.len(), 4);

        let fetched = store.get(&created.id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_draft() {
        let store = backend();
        let err = store
            .create(CustomerDraft {
                name: String::new(),
                email: "x@y.com".to_string(),
                phone: None,
                company: None,
                status: CustomerStatus::Prospect,
                total_value: 0.0,
                last_contact: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        // Nothing was stored
        assert_eq!(store.len(), 3);
    }

    #[tokio::test]
    async fn test_update_merges_and_bumps_updated_at() {
        let store = backend();
        let before = store.get(&RecordId::from("1")).await.unwrap();

        let updated = store
            .update(
                &RecordId::from("1"),
                CustomerPatch {
                    total_value: Some(46000.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.total_value, 46000.0);
        assert_eq!(updated.name, before.name);
        assert_eq!(updated.created_at, before.created_at);
        assert!(updated.updated_at >= before.updated_at);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let store = backend();
        let err = store
            .update(&RecordId::from("missing-id"), CustomerPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_and_reset() {
        let store = backend();
        store.delete(&RecordId::from("2")).await.unwrap();
        assert_eq!(store.len(), 2);
        assert!(matches!(
            store.delete(&RecordId::from("2")).await.unwrap_err(),
            StoreError::NotFound { .. }
        ));

        store.reset();
        assert_eq!(store.len(), 3);
        assert!(store.get(&RecordId::from("2")).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_is_simulated() {
        let store = MemoryBackend::with_seed(
            sample_customers(),
            LatencyProfile {
                get: Duration::from_millis(500),
                ..LatencyProfile::instant()
            },
        );

        let started = tokio::time::Instant::now();
        store.get(&RecordId::from("1")).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(500));
    }
}
