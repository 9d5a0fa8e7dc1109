use super::defaults::*;
use serde::{Deserialize, Serialize};

/// Main engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default)]
    pub cache: CacheSettings,
}

/// Which entity-store implementation backs the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// In-memory store with injected seed data and simulated latency.
    #[default]
    Mock,
    /// REST backend reached over HTTP.
    Http,
}

/// Entity-store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Backend selection. Default: mock.
    #[serde(default)]
    pub backend: BackendKind,

    /// Base URL for the HTTP backend, e.g. "http://localhost:3001/api".
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout for the HTTP backend.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Optional bearer token sent as `Authorization: Bearer <token>`.
    #[serde(default)]
    pub auth_token: Option<String>,

    /// Simulated latency profile for the mock backend.
    #[serde(default)]
    pub latency: LatencySettings,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            base_url: default_base_url(),
            request_timeout_ms: default_request_timeout_ms(),
            auth_token: None,
            latency: LatencySettings::default(),
        }
    }
}

/// Per-operation simulated latency for the mock backend, in milliseconds.
///
/// Latency is a tunable, not a correctness requirement; tests zero it out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatencySettings {
    #[serde(default = "default_list_latency_ms")]
    pub list_ms: u64,
    #[serde(default = "default_get_latency_ms")]
    pub get_ms: u64,
    #[serde(default = "default_create_latency_ms")]
    pub create_ms: u64,
    #[serde(default = "default_update_latency_ms")]
    pub update_ms: u64,
    #[serde(default = "default_delete_latency_ms")]
    pub delete_ms: u64,
}

impl Default for LatencySettings {
    fn default() -> Self {
        Self {
            list_ms: default_list_latency_ms(),
            get_ms: default_get_latency_ms(),
            create_ms: default_create_latency_ms(),
            update_ms: default_update_latency_ms(),
            delete_ms: default_delete_latency_ms(),
        }
    }
}

impl LatencySettings {
    /// Zero latency everywhere; the profile tests want.
    pub fn instant() -> Self {
        Self {
            list_ms: 0,
            get_ms: 0,
            create_ms: 0,
            update_ms: 0,
            delete_ms: 0,
        }
    }
}

/// Query-cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Age after which a successful entry is refetched on read.
    #[serde(default = "default_stale_after_ms")]
    pub stale_after_ms: u64,

    /// Idle time after which an unsubscribed, settled entry is evicted.
    #[serde(default = "default_evict_after_ms")]
    pub evict_after_ms: u64,

    #[serde(default)]
    pub retry: RetrySettings,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            stale_after_ms: default_stale_after_ms(),
            evict_after_ms: default_evict_after_ms(),
            retry: RetrySettings::default(),
        }
    }
}

/// Retry policy for cache fetches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Retries after the initial attempt (2 means up to 3 calls total).
    #[serde(default = "default_retry_attempts")]
    pub attempts: u32,

    /// First backoff delay; doubles per retry.
    #[serde(default = "default_retry_base_backoff_ms")]
    pub base_backoff_ms: u64,

    /// Backoff ceiling.
    #[serde(default = "default_retry_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            attempts: default_retry_attempts(),
            base_backoff_ms: default_retry_base_backoff_ms(),
            max_backoff_ms: default_retry_max_backoff_ms(),
        }
    }
}
