//! # lattice-configs
//!
//! Configuration for the LatticeDB data engine: which entity-store backend
//! to run (in-memory mock or HTTP), the simulated-latency profile for the
//! mock, and the query-cache windows and retry policy.
//!
//! Configuration is TOML on disk, deserialized with serde defaults so a
//! partial file (or none at all) yields a fully usable engine. Environment
//! overrides are applied separately via
//! [`EngineConfig::apply_env_overrides`], then the whole config is checked
//! with [`EngineConfig::validate`].

pub mod config;

pub use config::types::{
    BackendKind, CacheSettings, EngineConfig, LatencySettings, RetrySettings, StoreSettings,
};
