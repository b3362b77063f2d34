//! Startup orchestration.
//!
//! Builds the pieces the server needs from a validated `ServiceConfig`.

use std::path::PathBuf;
use std::sync::Arc;

use crate::cache::{ConfigSource, SnapshotSource, StoreSource};
use crate::config::{CacheSourceKind, ServiceConfig, StorageBackend};
use crate::store::{ConfigStore, FileStore, MemoryStore, StoreResult};

/// Open the configured storage backend.
pub async fn open_store(config: &ServiceConfig) -> StoreResult<Arc<dyn ConfigStore>> {
    let store: Arc<dyn ConfigStore> = match config.storage.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; configurations are lost on restart");
            Arc::new(MemoryStore::new())
        }
        StorageBackend::File => Arc::new(FileStore::open(&config.storage.path).await?),
    };
    Ok(store)
}

/// Source the server-side cache loads from.
pub fn cache_source(config: &ServiceConfig, store: Arc<dyn ConfigStore>) -> Arc<dyn ConfigSource> {
    match (config.cache.source, snapshot_path(config)) {
        (CacheSourceKind::Snapshot, Some(path)) => Arc::new(SnapshotSource::file(path)),
        (CacheSourceKind::Snapshot, None) => {
            tracing::warn!("Snapshot cache source without snapshot.path, falling back to store");
            Arc::new(StoreSource::new(store))
        }
        (CacheSourceKind::Store, _) => Arc::new(StoreSource::new(store)),
    }
}

pub fn snapshot_path(config: &ServiceConfig) -> Option<PathBuf> {
    config
        .snapshot
        .path
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from)
}
