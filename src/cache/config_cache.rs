//! Lazily populated, single-flight configuration cache.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;

use crate::cache::events::ConfigEvent;
use crate::cache::source::{ConfigSet, ConfigSource};
use crate::form::{FormConfiguration, FormName};
use crate::observability::metrics;

/// Outcome of the most recent load attempt.
#[derive(Default)]
struct LastAttempt {
    id: u64,
    /// `None` when the attempt failed.
    outcome: Option<Arc<ConfigSet>>,
}

/// Cache of the complete configuration set.
///
/// Reads after the first load are served from memory. Concurrent reads
/// share one load: the first caller loads while the others wait on
/// `last_attempt`, then take that attempt's outcome whether it succeeded,
/// failed or was discarded by an invalidation.
pub struct ConfigCache {
    source: Arc<dyn ConfigSource>,
    loaded: ArcSwapOption<ConfigSet>,
    last_attempt: Mutex<LastAttempt>,
    /// Number of finished load attempts; only written under `last_attempt`.
    attempts: AtomicU64,
    /// Bumped by every invalidation; a load that started under an older
    /// generation is handed to its callers but not retained.
    generation: AtomicU64,
}

impl ConfigCache {
    pub fn new(source: Arc<dyn ConfigSource>) -> Self {
        Self {
            source,
            loaded: ArcSwapOption::empty(),
            last_attempt: Mutex::new(LastAttempt::default()),
            attempts: AtomicU64::new(0),
            generation: AtomicU64::new(0),
        }
    }

    /// Configuration for `form`, loading the set on first use.
    ///
    /// `None` means "use defaults": the form has no configuration, its
    /// document was malformed, or the load failed.
    pub async fn get(&self, form: &FormName) -> Option<FormConfiguration> {
        let set = self.load().await?;
        let config = set.get(form).cloned();
        metrics::record_cache_lookup(config.is_some());
        config
    }

    /// The whole set, loading it on first use. `None` if loading failed.
    pub async fn load(&self) -> Option<Arc<ConfigSet>> {
        if let Some(set) = self.loaded.load_full() {
            return Some(set);
        }

        let seen = self.attempts.load(Ordering::Acquire);
        let mut last = self.last_attempt.lock().await;
        if let Some(set) = self.loaded.load_full() {
            return Some(set);
        }
        if last.id > seen {
            // An attempt finished while we waited; share its outcome.
            return last.outcome.clone();
        }

        let generation = self.generation.load(Ordering::Acquire);
        let outcome = match self.source.load().await {
            Ok(set) => {
                let set = Arc::new(set);
                metrics::record_cache_load(true);
                if self.generation.load(Ordering::Acquire) == generation {
                    self.loaded.store(Some(Arc::clone(&set)));
                    tracing::info!(
                        source = %self.source.describe(),
                        forms = set.len(),
                        "Configuration cache populated"
                    );
                } else {
                    tracing::debug!("Cache invalidated during load, result not retained");
                }
                Some(set)
            }
            Err(e) => {
                metrics::record_cache_load(false);
                tracing::warn!(
                    source = %self.source.describe(),
                    error = %e,
                    "Configuration load failed, using defaults"
                );
                None
            }
        };

        let id = self.attempts.fetch_add(1, Ordering::AcqRel) + 1;
        *last = LastAttempt {
            id,
            outcome: outcome.clone(),
        };
        outcome
    }

    /// Currently cached set, without any I/O.
    pub fn cached(&self) -> Option<Arc<ConfigSet>> {
        self.loaded.load_full()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.load().is_some()
    }

    /// Drop the cached set; the next read loads afresh.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.loaded.store(None);
        metrics::record_cache_invalidation();
    }

    /// Invalidate on every event received from `events` until the channel
    /// closes.
    pub fn listen(self: &Arc<Self>, mut events: broadcast::Receiver<ConfigEvent>) -> JoinHandle<()> {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        tracing::debug!(event = ?event, "Invalidating configuration cache");
                        cache.invalidate();
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Missed configuration events, invalidating");
                        cache.invalidate();
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}
