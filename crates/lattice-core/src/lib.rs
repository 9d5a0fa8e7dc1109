//! # lattice-core
//!
//! The orchestration layer: binds an entity backend, the query cache, and
//! the mutation coordinator into the customer-facing data API.
//!
//! ## Architecture
//!
//! ```text
//! presentation layer (out of scope)
//!     ↓ intents                ↑ { visible, total, loading, error }
//! CustomerDirectory            ← this crate
//!     ↓                 ↓
//! QueryCache     MutationCoordinator      (lattice-cache)
//!     ↓                 ↓
//! EntityBackend (mock or HTTP)            (lattice-store)
//! ```
//!
//! Reads go through the cache keyed by [`keys::CustomerKey`]; writes go
//! through the coordinator, which applies optimistic edits, rolls back on
//! failure, and invalidates exactly the declared key scopes.

pub mod directory;
pub mod keys;

pub use directory::CustomerDirectory;
pub use keys::{CustomerData, CustomerKey, CustomerScope, ListFingerprint};
