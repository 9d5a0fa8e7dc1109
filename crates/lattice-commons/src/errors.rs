//! Shared error types for LatticeDB.
//!
//! Every fallible operation in the workspace returns [`StoreError`]. The
//! variants split into three retry classes:
//!
//! - **Never retried, surfaced immediately**: [`StoreError::NotFound`],
//!   [`StoreError::Validation`] (raised before any store call is attempted),
//!   [`StoreError::Internal`].
//! - **Retried by the query cache**, then surfaced: [`StoreError::Backend`],
//!   [`StoreError::Transport`].
//! - [`StoreError::Serialization`] is treated as terminal; a malformed
//!   payload will not deserialize better on the second attempt.

use thiserror::Error;

/// Result type for store, cache, and orchestration operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in the data engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The operation referenced an identifier that does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Malformed input to create/update; raised before any store call.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Generic backend failure (the store itself misbehaved).
    #[error("Store error: {0}")]
    Backend(String),

    /// Network-level failure talking to a remote backend.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Payload could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Unexpected internal state.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Creates a NotFound error for the given entity kind and identifier.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Creates a Validation error with a message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates a Backend error with a message.
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Creates a Transport error with a message.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Creates a Serialization error with a message.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Creates an Internal error with a message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether the retry policy may re-attempt the failed operation.
    ///
    /// Only transient backend/transport failures qualify; `NotFound` and
    /// `Validation` are answers, not outages.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Backend(_) | Self::Transport(_))
    }
}
