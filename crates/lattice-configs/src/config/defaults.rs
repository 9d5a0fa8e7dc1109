// Default value functions referenced from the serde derives in types.rs.

/// Mock-store latency defaults mirror a believable mid-latency API so that
/// loading states in callers actually get exercised.
pub fn default_list_latency_ms() -> u64 {
    800
}

pub fn default_get_latency_ms() -> u64 {
    500
}

pub fn default_create_latency_ms() -> u64 {
    1000
}

pub fn default_update_latency_ms() -> u64 {
    800
}

pub fn default_delete_latency_ms() -> u64 {
    600
}

pub fn default_base_url() -> String {
    "http://localhost:3001/api".to_string()
}

pub fn default_request_timeout_ms() -> u64 {
    5000
}

pub fn default_stale_after_ms() -> u64 {
    300_000 // 5 minutes
}

pub fn default_evict_after_ms() -> u64 {
    600_000 // 10 minutes
}

pub fn default_retry_attempts() -> u32 {
    2
}

pub fn default_retry_base_backoff_ms() -> u64 {
    1000
}

pub fn default_retry_max_backoff_ms() -> u64 {
    30_000
}
