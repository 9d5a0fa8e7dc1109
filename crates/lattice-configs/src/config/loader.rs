use super::types::{BackendKind, EngineConfig};
use std::fs;
use std::path::Path;

/// Environment variable that overrides `[store] backend`.
pub const BACKEND_ENV_VAR: &str = "LATTICE_STORE_BACKEND";

impl EngineConfig {
    /// Load configuration from a TOML file.
    ///
    /// Note: environment overrides are applied separately via
    /// `apply_env_overrides()`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| anyhow::anyhow!("Failed to read config file: {}", e))?;

        let config: EngineConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file: {}", e))?;

        config.validate()?;

        Ok(config)
    }

    /// Apply environment overrides on top of the loaded file.
    ///
    /// Currently `LATTICE_STORE_BACKEND=mock|http` switches the backend, the
    /// knob deployments most often flip without editing files.
    pub fn apply_env_overrides(&mut self) -> anyhow::Result<()> {
        if let Ok(value) = std::env::var(BACKEND_ENV_VAR) {
            self.store.backend = match value.to_lowercase().as_str() {
                "mock" => BackendKind::Mock,
                "http" => BackendKind::Http,
                other => {
                    return Err(anyhow::anyhow!(
                        "Invalid {} value '{}'. Must be 'mock' or 'http'",
                        BACKEND_ENV_VAR,
                        other
                    ))
                }
            };
        }
        Ok(())
    }

    /// Validate configuration settings.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.store.backend == BackendKind::Http {
            if self.store.base_url.trim().is_empty() {
                return Err(anyhow::anyhow!("base_url cannot be empty for the http backend"));
            }
            if !self.store.base_url.starts_with("http://") && !self.store.base_url.starts_with("https://")
            {
                return Err(anyhow::anyhow!(
                    "base_url must start with http:// or https://, got '{}'",
                    self.store.base_url
                ));
            }
            if self.store.request_timeout_ms == 0 {
                return Err(anyhow::anyhow!("request_timeout_ms cannot be 0"));
            }
        }

        if self.cache.evict_after_ms < self.cache.stale_after_ms {
            return Err(anyhow::anyhow!(
                "evict_after_ms ({}) cannot be smaller than stale_after_ms ({}); entries would be \
                 evicted while still fresh",
                self.cache.evict_after_ms,
                self.cache.stale_after_ms
            ));
        }

        if self.cache.retry.base_backoff_ms > self.cache.retry.max_backoff_ms {
            return Err(anyhow::anyhow!(
                "retry base_backoff_ms ({}) cannot exceed max_backoff_ms ({})",
                self.cache.retry.base_backoff_ms,
                self.cache.retry.max_backoff_ms
            ));
        }

        Ok(())
    }
}
