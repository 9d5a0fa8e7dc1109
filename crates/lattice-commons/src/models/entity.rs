//! Entity abstraction implemented by stored record types.

use crate::errors::StoreResult;
use crate::models::field_value::FieldValue;
use crate::models::filters::ListFilter;
use crate::models::record_id::RecordId;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

/// A record type the entity store can manage.
///
/// The store/cache/view layers are generic over this trait; `Customer` is the
/// shipped implementation. The associated `Draft` is the create payload (no
/// id, no timestamps), `Patch` the partial-update payload. Identifier and
/// `created_at` are immutable by construction: neither appears in `Patch`.
pub trait Entity:
    Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    type Draft: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static;
    type Patch: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Entity kind label; doubles as the REST collection segment and the
    /// cache-key entity prefix (e.g. `"customers"`).
    const KIND: &'static str;

    fn id(&self) -> &RecordId;
    fn created_at(&self) -> DateTime<Utc>;
    fn updated_at(&self) -> DateTime<Utc>;

    /// Checks a create payload before any store call is attempted.
    fn validate_draft(draft: &Self::Draft) -> StoreResult<()>;

    /// Checks an update payload before any store call is attempted.
    fn validate_patch(patch: &Self::Patch) -> StoreResult<()>;

    /// Materializes a record from a draft with a store-assigned identifier.
    /// Both timestamps are set to `now`.
    fn from_draft(id: RecordId, draft: Self::Draft, now: DateTime<Utc>) -> Self;

    /// Merges a patch over this record and refreshes `updated_at`.
    fn apply_patch(&mut self, patch: &Self::Patch, now: DateTime<Utc>);

    /// Whether this record matches the status + search predicate of the
    /// given filter (paging fields are ignored here).
    fn matches(&self, filter: &ListFilter) -> bool;
}

/// Typed column access for sorting.
///
/// Separated from [`Entity`] so the pure view pipeline can require only the
/// column surface.
pub trait RowView {
    /// Column identifier type, a small `Copy` enum.
    type Field: Copy + Eq + Debug + Send + Sync + 'static;

    /// Extracts the typed cell for a column.
    fn cell(&self, field: Self::Field) -> FieldValue;

    /// Resolves a column name (as used in filters and wire payloads) to a
    /// field identifier. Returns `None` for unknown columns.
    fn parse_field(name: &str) -> Option<Self::Field>;
}
