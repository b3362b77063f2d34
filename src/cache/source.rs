//! Where the cache loads configuration sets from.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::form::{normalize, ConfigDocument, FormConfiguration, FormName};
use crate::store::{ConfigStore, StoreResult};

/// Normalized configurations for every known form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigSet {
    configs: HashMap<FormName, FormConfiguration>,
}

impl ConfigSet {
    /// Normalize raw documents; shape mismatches are left out of the set so
    /// their forms resolve to defaults.
    pub fn from_documents(documents: impl IntoIterator<Item = (FormName, ConfigDocument)>) -> Self {
        let configs = documents
            .into_iter()
            .filter_map(|(form, document)| {
                normalize(&form, &document).map(|config| (form, config))
            })
            .collect();
        Self { configs }
    }

    pub fn get(&self, form: &FormName) -> Option<&FormConfiguration> {
        self.configs.get(form)
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    pub fn forms(&self) -> impl Iterator<Item = &FormName> {
        self.configs.keys()
    }
}

/// Loader of a complete configuration set.
#[async_trait]
pub trait ConfigSource: Send + Sync {
    /// Short description for logs.
    fn describe(&self) -> String;

    async fn load(&self) -> StoreResult<ConfigSet>;
}

/// Loads through `ConfigStore::list`.
#[derive(Clone)]
pub struct StoreSource {
    store: Arc<dyn ConfigStore>,
}

impl StoreSource {
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ConfigSource for StoreSource {
    fn describe(&self) -> String {
        format!("{} store", self.store.kind())
    }

    async fn load(&self) -> StoreResult<ConfigSet> {
        Ok(ConfigSet::from_documents(self.store.list().await?))
    }
}

#[derive(Clone)]
enum SnapshotOrigin {
    File(PathBuf),
    Bundled(Arc<BTreeMap<FormName, ConfigDocument>>),
}

/// Read-only snapshot mapping FormName → document.
#[derive(Clone)]
pub struct SnapshotSource {
    origin: SnapshotOrigin,
}

impl SnapshotSource {
    /// Snapshot read from `path` on every load.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            origin: SnapshotOrigin::File(path.into()),
        }
    }

    /// Snapshot compiled into (or built by) the client.
    pub fn bundled(documents: BTreeMap<FormName, ConfigDocument>) -> Self {
        Self {
            origin: SnapshotOrigin::Bundled(Arc::new(documents)),
        }
    }
}

#[async_trait]
impl ConfigSource for SnapshotSource {
    fn describe(&self) -> String {
        match &self.origin {
            SnapshotOrigin::File(path) => format!("snapshot {}", path.display()),
            SnapshotOrigin::Bundled(_) => "bundled snapshot".to_string(),
        }
    }

    async fn load(&self) -> StoreResult<ConfigSet> {
        match &self.origin {
            SnapshotOrigin::File(path) => {
                let bytes = tokio::fs::read(path).await?;
                Ok(ConfigSet::from_documents(parse_snapshot(&bytes)?))
            }
            SnapshotOrigin::Bundled(documents) => Ok(ConfigSet::from_documents(
                documents
                    .iter()
                    .map(|(form, doc)| (form.clone(), doc.clone())),
            )),
        }
    }
}

/// Parse snapshot JSON. Entries with invalid form names are skipped.
pub fn parse_snapshot(bytes: &[u8]) -> StoreResult<BTreeMap<FormName, ConfigDocument>> {
    let raw: Map<String, Value> = serde_json::from_slice(bytes)?;
    let mut documents = BTreeMap::new();
    for (key, value) in raw {
        match FormName::new(key) {
            Ok(form) => {
                documents.insert(form, ConfigDocument::from_stored(value));
            }
            Err(e) => tracing::warn!(error = %e, "Skipping snapshot entry"),
        }
    }
    Ok(documents)
}

/// Write a snapshot file (pretty JSON) atomically.
pub async fn write_snapshot(
    path: &Path,
    documents: &BTreeMap<FormName, ConfigDocument>,
) -> StoreResult<()> {
    let bytes = serde_json::to_vec_pretty(documents)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, &bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}
