//! In-process configuration store.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use crate::form::{ConfigDocument, FormName, StoredConfiguration};
use crate::observability::metrics;
use crate::store::{unix_now, ConfigStore, StoreResult};

/// Concurrent map of stored configurations. Contents are lost on drop.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<DashMap<FormName, StoredConfiguration>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Stored record including metadata.
    pub fn record(&self, form: &FormName) -> Option<StoredConfiguration> {
        self.inner.get(form).map(|r| r.value().clone())
    }
}

#[async_trait]
impl ConfigStore for MemoryStore {
    fn kind(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, form: &FormName) -> StoreResult<Option<ConfigDocument>> {
        metrics::record_store_op(self.kind(), "get", true);
        Ok(self.inner.get(form).map(|r| r.value().config.clone()))
    }

    async fn put(
        &self,
        form: &FormName,
        document: ConfigDocument,
    ) -> StoreResult<StoredConfiguration> {
        let now = unix_now();
        // The entry guard holds the shard lock, so replacement is atomic per key.
        let stored = match self.inner.entry(form.clone()) {
            Entry::Occupied(mut occupied) => {
                let record = occupied.get_mut();
                record.config = document;
                record.updated_at = now;
                record.clone()
            }
            Entry::Vacant(vacant) => vacant
                .insert(StoredConfiguration {
                    id: Uuid::new_v4(),
                    form_name: form.clone(),
                    config: document,
                    created_at: now,
                    updated_at: now,
                })
                .clone(),
        };
        metrics::record_store_op(self.kind(), "put", true);
        Ok(stored)
    }

    async fn list(&self) -> StoreResult<BTreeMap<FormName, ConfigDocument>> {
        metrics::record_store_op(self.kind(), "list", true);
        Ok(self
            .inner
            .iter()
            .map(|r| (r.key().clone(), r.value().config.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(order: i64) -> ConfigDocument {
        ConfigDocument::parse(json!({"fields": [{"name": "serial", "order": order}]})).unwrap()
    }

    #[tokio::test]
    async fn test_get_absent_is_none() {
        let store = MemoryStore::new();
        let form = FormName::from_static("AssetForm");
        assert!(store.get(&form).await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_put_replaces_and_keeps_id() {
        let store = MemoryStore::new();
        let form = FormName::from_static("AssetForm");

        let first = store.put(&form, doc(0)).await.unwrap();
        let second = store.put(&form, doc(5)).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(store.get(&form).await.unwrap(), Some(doc(5)));
        assert_eq!(store.len(), 1);
        assert_eq!(store.record(&form).unwrap().form_name, form);
    }

    #[tokio::test]
    async fn test_list_returns_all() {
        let store = MemoryStore::new();
        let a = FormName::from_static("AssetForm");
        let b = FormName::from_static("MainLayout");
        store.put(&a, doc(0)).await.unwrap();
        store.put(&b, doc(1)).await.unwrap();

        let all = store.list().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all.get(&b), Some(&doc(1)));
    }

    #[tokio::test]
    async fn test_concurrent_writers_last_wins() {
        let store = MemoryStore::new();
        let form = FormName::from_static("AssetForm");
        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            let form = form.clone();
            handles.push(tokio::spawn(async move { store.put(&form, doc(i)).await }));
        }
        let mut ids = Vec::new();
        for h in handles {
            ids.push(h.await.unwrap().unwrap().id);
        }
        ids.dedup();
        assert_eq!(ids.len(), 1, "all writers must see the same record id");
        assert_eq!(store.len(), 1);
    }
}
