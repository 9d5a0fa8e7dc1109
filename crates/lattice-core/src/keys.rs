//! Customer cache keys, scopes, and cached value shapes.
//!
//! Key convention: list entries are keyed by the canonical fingerprint of
//! their (normalized) filter, detail entries by record identifier. The
//! [`CustomerScope::Lists`] scope matches every list variant regardless of
//! filter payload; that is the prefix-invalidation contract mutations rely
//! on.

use lattice_commons::{Customer, ListFilter, Page, QueryKey, RecordId, StoreError, StoreResult};

/// Canonical form of a list filter, as stored in the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListFingerprint(String);

impl ListFingerprint {
    pub fn of(filter: &ListFilter) -> Self {
        Self(filter.fingerprint())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Cache key for customer queries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CustomerKey {
    List(ListFingerprint),
    Detail(RecordId),
}

impl CustomerKey {
    pub fn list(filter: &ListFilter) -> Self {
        Self::List(ListFingerprint::of(filter))
    }

    pub fn detail(id: RecordId) -> Self {
        Self::Detail(id)
    }
}

/// Invalidation scopes a mutation can declare.
#[derive(Debug, Clone)]
pub enum CustomerScope {
    /// Every list variant, whatever its filter: membership or order may
    /// have changed.
    Lists,
    /// One record's detail entry.
    Detail(RecordId),
    /// Everything; used by wholesale resets.
    All,
}

impl QueryKey for CustomerKey {
    type Scope = CustomerScope;

    fn in_scope(&self, scope: &CustomerScope) -> bool {
        match (self, scope) {
            (_, CustomerScope::All) => true,
            (CustomerKey::List(_), CustomerScope::Lists) => true,
            (CustomerKey::Detail(id), CustomerScope::Detail(target)) => id == target,
            _ => false,
        }
    }
}

/// What a customer cache entry holds: a page under a list key, a single
/// record under a detail key. The pairing is maintained by construction in
/// [`crate::CustomerDirectory`]; the accessors fail loudly if it ever
/// breaks.
#[derive(Debug, Clone, PartialEq)]
pub enum CustomerData {
    List(Page<Customer>),
    Detail(Customer),
}

impl CustomerData {
    pub fn as_page(&self) -> Option<&Page<Customer>> {
        match self {
            Self::List(page) => Some(page),
            Self::Detail(_) => None,
        }
    }

    pub fn as_record(&self) -> Option<&Customer> {
        match self {
            Self::Detail(record) => Some(record),
            Self::List(_) => None,
        }
    }

    pub fn into_page(self) -> StoreResult<Page<Customer>> {
        match self {
            Self::List(page) => Ok(page),
            Self::Detail(_) => Err(StoreError::internal(
                "detail-shaped entry stored under a list key",
            )),
        }
    }

    pub fn into_record(self) -> StoreResult<Customer> {
        match self {
            Self::Detail(record) => Ok(record),
            Self::List(_) => Err(StoreError::internal(
                "list-shaped entry stored under a detail key",
            )),
        }
    }
}
