//! Cache key abstraction.
//!
//! The query cache is generic over its key type. A key identifies one cached
//! query (one list variant, one detail record); a *scope* names a family of
//! keys so that mutations can declare which entries they affect without
//! enumerating them. Scopes are plain enums per entity kind, so a mutation's
//! invalidation set is spelled out in the type system instead of being a
//! string-prefix convention.

use std::fmt::Debug;
use std::hash::Hash;

/// A cache key with typed prefix matching.
///
/// Implementors are small value enums, e.g. a customer key with `List` and
/// `Detail` variants and a scope enum with `Lists` / `Detail(id)` / `All`.
pub trait QueryKey: Clone + Eq + Hash + Debug + Send + Sync + 'static {
    /// The scope (key-prefix) type used for invalidation declarations.
    type Scope: Clone + Debug + Send + Sync + 'static;

    /// Whether this key falls inside the given scope.
    fn in_scope(&self, scope: &Self::Scope) -> bool;
}
