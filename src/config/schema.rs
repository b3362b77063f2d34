//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the form configuration service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Where configuration documents are persisted.
    pub storage: StorageConfig,

    /// Where the server-side cache loads from.
    pub cache: CacheConfig,

    /// Static snapshot file settings.
    pub snapshot: SnapshotConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Storage backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// In-process map; contents are lost on restart.
    Memory,
    /// One JSON file per form under `storage.path`.
    File,
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,

    /// Directory for the file backend.
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::File,
            path: "data/form-config".to_string(),
        }
    }
}

/// Source the cache loads its configuration set from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheSourceKind {
    /// The configured store (always current).
    Store,
    /// The static snapshot file (`snapshot.path`).
    Snapshot,
}

/// Cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    pub source: CacheSourceKind,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            source: CacheSourceKind::Store,
        }
    }
}

/// Static snapshot configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Path of the snapshot JSON file (FormName → document).
    pub path: Option<String>,

    /// Invalidate the cache when the snapshot file changes.
    pub watch: bool,
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of human-readable output.
    pub log_json: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_json: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Request hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 1024 * 1024, // 1MB
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: ServiceConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.storage.backend, StorageBackend::File);
        assert_eq!(config.cache.source, CacheSourceKind::Store);
        assert!(config.snapshot.path.is_none());
        assert_eq!(config.timeouts.request_secs, 30);
    }

    #[test]
    fn test_parse_full_config() {
        let raw = r#"
            [listener]
            bind_address = "127.0.0.1:9000"

            [storage]
            backend = "memory"

            [cache]
            source = "snapshot"

            [snapshot]
            path = "snapshot.json"
            watch = true

            [observability]
            log_level = "debug"
            log_json = true
        "#;
        let config: ServiceConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.storage.path, "data/form-config");
        assert_eq!(config.cache.source, CacheSourceKind::Snapshot);
        assert_eq!(config.snapshot.path.as_deref(), Some("snapshot.json"));
        assert!(config.snapshot.watch);
        assert!(config.observability.log_json);
        assert_eq!(config.security.max_body_size, 1024 * 1024);
    }

    #[test]
    fn test_unknown_backend_rejected() {
        assert!(toml::from_str::<ServiceConfig>("[storage]\nbackend = \"redis\"").is_err());
    }
}
