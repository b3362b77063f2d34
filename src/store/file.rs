//! JSON file configuration store.
//!
//! One `<FormName>.json` file per form, holding the full
//! `StoredConfiguration` record. Writes land in a temporary file that is then
//! renamed over the target, so readers never observe a partial document.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::form::{ConfigDocument, FormName, StoredConfiguration};
use crate::observability::metrics;
use crate::store::{unix_now, ConfigStore, StoreError, StoreResult};

const EXTENSION: &str = "json";

/// Directory-backed store.
#[derive(Clone)]
pub struct FileStore {
    root: PathBuf,
    /// Serializes writers of the same form.
    write_locks: Arc<DashMap<FormName, Arc<Mutex<()>>>>,
}

impl FileStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub async fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        tracing::info!(path = %root.display(), "File store opened");
        Ok(Self {
            root,
            write_locks: Arc::new(DashMap::new()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, form: &FormName) -> PathBuf {
        self.root.join(format!("{}.{}", form, EXTENSION))
    }

    fn lock_for(&self, form: &FormName) -> Arc<Mutex<()>> {
        Arc::clone(
            self.write_locks
                .entry(form.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        )
    }

    async fn read_record(&self, form: &FormName) -> StoreResult<Option<StoredConfiguration>> {
        match tokio::fs::read(self.path_for(form)).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_record(&self, record: &StoredConfiguration) -> StoreResult<()> {
        let target = self.path_for(&record.form_name);
        let tmp = self
            .root
            .join(format!(".{}.{}.tmp", record.form_name, Uuid::new_v4()));
        let bytes = serde_json::to_vec_pretty(record)?;

        if let Err(e) = tokio::fs::write(&tmp, &bytes).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        if let Err(e) = tokio::fs::rename(&tmp, &target).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }
}

#[async_trait]
impl ConfigStore for FileStore {
    fn kind(&self) -> &'static str {
        "file"
    }

    async fn get(&self, form: &FormName) -> StoreResult<Option<ConfigDocument>> {
        let result = self.read_record(form).await;
        metrics::record_store_op(self.kind(), "get", result.is_ok());
        Ok(result?.map(|record| record.config))
    }

    async fn put(
        &self,
        form: &FormName,
        document: ConfigDocument,
    ) -> StoreResult<StoredConfiguration> {
        let lock = self.lock_for(form);
        let _guard = lock.lock().await;

        let now = unix_now();
        let record = match self.read_record(form).await {
            Ok(Some(previous)) => StoredConfiguration {
                config: document,
                updated_at: now,
                ..previous
            },
            Ok(None) => StoredConfiguration {
                id: Uuid::new_v4(),
                form_name: form.clone(),
                config: document,
                created_at: now,
                updated_at: now,
            },
            Err(StoreError::Serialization(e)) => {
                // A corrupt previous record is replaced; I/O failures are not.
                tracing::warn!(form = %form, error = %e, "Replacing corrupt stored record");
                StoredConfiguration {
                    id: Uuid::new_v4(),
                    form_name: form.clone(),
                    config: document,
                    created_at: now,
                    updated_at: now,
                }
            }
            Err(e) => {
                metrics::record_store_op(self.kind(), "put", false);
                return Err(e);
            }
        };

        let result = self.write_record(&record).await;
        metrics::record_store_op(self.kind(), "put", result.is_ok());
        result?;

        tracing::debug!(form = %form, id = %record.id, "Stored configuration written");
        Ok(record)
    }

    async fn list(&self) -> StoreResult<BTreeMap<FormName, ConfigDocument>> {
        let mut documents = BTreeMap::new();
        let mut entries = tokio::fs::read_dir(&self.root).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            let Some(form) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| FormName::new(s).ok())
            else {
                continue;
            };

            match self.read_record(&form).await {
                Ok(Some(record)) => {
                    documents.insert(form, record.config);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(form = %form, error = %e, "Skipping unreadable stored record");
                }
            }
        }

        metrics::record_store_op(self.kind(), "list", true);
        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("form-config-store-{}", Uuid::new_v4()))
    }

    fn doc(order: i64) -> ConfigDocument {
        ConfigDocument::parse(json!({"fields": [{"name": "serial", "order": order}]})).unwrap()
    }

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let dir = scratch_dir();
        let store = FileStore::open(&dir).await.unwrap();
        let form = FormName::from_static("AssetForm");

        assert!(store.get(&form).await.unwrap().is_none());

        let first = store.put(&form, doc(0)).await.unwrap();
        let second = store.put(&form, doc(3)).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(store.get(&form).await.unwrap(), Some(doc(3)));

        // A reopened store sees the same data.
        let reopened = FileStore::open(&dir).await.unwrap();
        let all = reopened.list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all.get(&form), Some(&doc(3)));

        std::fs::remove_dir_all(&dir).unwrap_or_default();
    }

    #[tokio::test]
    async fn test_list_skips_foreign_and_corrupt_files() {
        let dir = scratch_dir();
        let store = FileStore::open(&dir).await.unwrap();
        let form = FormName::from_static("MainLayout");
        store.put(&form, doc(1)).await.unwrap();

        std::fs::write(dir.join("notes.txt"), "hello").unwrap();
        std::fs::write(dir.join("Broken.json"), "{not json").unwrap();

        let all = store.list().await.unwrap();
        assert_eq!(all.keys().collect::<Vec<_>>(), vec![&form]);

        // Corrupt record surfaces as an error on direct read.
        let broken = FormName::from_static("Broken");
        assert!(store.get(&broken).await.is_err());

        // ...and is replaced by the next write.
        store.put(&broken, doc(2)).await.unwrap();
        assert_eq!(store.get(&broken).await.unwrap(), Some(doc(2)));

        std::fs::remove_dir_all(&dir).unwrap_or_default();
    }

    #[tokio::test]
    async fn test_id_survives_replacement_after_reopen() {
        let dir = scratch_dir();
        let form = FormName::from_static("TrainingForm");
        let first = FileStore::open(&dir).await.unwrap().put(&form, doc(0)).await.unwrap();

        let second = FileStore::open(&dir).await.unwrap().put(&form, doc(1)).await.unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.created_at, first.created_at);

        std::fs::remove_dir_all(&dir).unwrap_or_default();
    }

    #[tokio::test]
    async fn test_io_error_on_previous_record_is_propagated() {
        let dir = scratch_dir();
        let store = FileStore::open(&dir).await.unwrap();
        let form = FormName::from_static("AssetForm");
        // Reading a directory fails with an I/O error, not a parse error.
        std::fs::create_dir(dir.join("AssetForm.json")).unwrap();

        let err = store.put(&form, doc(0)).await.unwrap_err();
        assert!(matches!(err, StoreError::Io(_)), "got {err:?}");
        assert!(dir.join("AssetForm.json").is_dir());

        std::fs::remove_dir_all(&dir).unwrap_or_default();
    }

    #[tokio::test]
    async fn test_concurrent_puts_leave_one_record() {
        let dir = scratch_dir();
        let store = FileStore::open(&dir).await.unwrap();
        let form = FormName::from_static("ExpenseForm");

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = store.clone();
            let form = form.clone();
            handles.push(tokio::spawn(async move { store.put(&form, doc(i)).await }));
        }
        for h in handles {
            h.await.unwrap().unwrap();
        }

        let leftovers = std::fs::read_dir(&dir).unwrap().count();
        assert_eq!(leftovers, 1, "temporary files must not be left behind");
        assert!(store.get(&form).await.unwrap().is_some());

        std::fs::remove_dir_all(&dir).unwrap_or_default();
    }
}
