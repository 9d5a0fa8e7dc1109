//! # lattice-commons
//!
//! Shared domain model for the LatticeDB workspace: record identifiers, the
//! `Customer` entity, list filters and page envelopes, the cache key
//! abstraction, and the error taxonomy used by every other crate.
//!
//! ## Architecture
//!
//! ```text
//! lattice-core (orchestration)
//!     ↓
//! lattice-store / lattice-cache / lattice-views
//!     ↓
//! lattice-commons (this crate: types only, no I/O)
//! ```
//!
//! This crate performs no I/O and spawns no tasks; it exists so the store,
//! cache, and view crates can agree on types without depending on each other.

pub mod errors;
pub mod keys;
pub mod models;

pub use errors::{StoreError, StoreResult};
pub use keys::QueryKey;
pub use models::customer::{Customer, CustomerDraft, CustomerField, CustomerPatch, CustomerStatus};
pub use models::entity::{Entity, RowView};
pub use models::field_value::FieldValue;
pub use models::filters::{ListFilter, Page, SortOrder};
pub use models::record_id::RecordId;
