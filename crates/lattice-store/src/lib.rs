//! # lattice-store
//!
//! The entity store: canonical record data behind a pluggable backend.
//!
//! ## Architecture
//!
//! ```text
//! lattice-core (orchestration, caching)
//!     ↓
//! EntityBackend<E>          ← async CRUD contract (backend.rs)
//!     ↓
//! MemoryBackend / HttpBackend
//! ```
//!
//! Two implementations ship: [`MemoryBackend`], an in-memory store with
//! injected seed data and simulated latency, and [`HttpBackend`], a REST
//! client over the same contract. Which one runs is a configuration choice
//! ([`backend_from_config`]), not a compile-time one, so the mock is a
//! first-class backend rather than a commented-out fallback.

pub mod backend;
pub mod http;
pub mod memory;
pub mod seed;

pub use backend::EntityBackend;
pub use http::HttpBackend;
pub use memory::{LatencyProfile, MemoryBackend};

use lattice_commons::{Customer, StoreResult};
use lattice_configs::{BackendKind, StoreSettings};
use std::sync::Arc;

/// Builds the customer backend selected by configuration.
///
/// `mock` yields a [`MemoryBackend`] pre-loaded with the sample data set;
/// `http` yields an [`HttpBackend`] pointed at `base_url`.
pub fn backend_from_config(
    settings: &StoreSettings,
) -> StoreResult<Arc<dyn EntityBackend<Customer>>> {
    match settings.backend {
        BackendKind::Mock => {
            let backend = MemoryBackend::with_seed(
                seed::sample_customers(),
                LatencyProfile::from_settings(&settings.latency),
            );
            Ok(Arc::new(backend))
        }
        BackendKind::Http => Ok(Arc::new(HttpBackend::new(settings)?)),
    }
}
