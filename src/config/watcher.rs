//! Snapshot file watcher for cache invalidation.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::cache::{ConfigEvent, ConfigEvents};

/// Monitors the static snapshot file and announces changes.
///
/// The parent directory is watched rather than the file: snapshot writers
/// replace the file by rename, which would orphan a watch on the old inode.
pub struct SnapshotWatcher {
    path: PathBuf,
    events: ConfigEvents,
}

impl SnapshotWatcher {
    pub fn new(path: &Path, events: ConfigEvents) -> Self {
        Self {
            path: path.to_path_buf(),
            events,
        }
    }

    /// Start watching in a background thread.
    ///
    /// The returned watcher must be kept alive for notifications to continue.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let events = self.events.clone();
        let file_name: Option<OsString> = self.path.file_name().map(|n| n.to_os_string());
        let directory = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    let relevant = event.kind.is_modify()
                        || event.kind.is_create()
                        || event.kind.is_remove();
                    let touches_snapshot = event
                        .paths
                        .iter()
                        .any(|p| p.file_name() == file_name.as_deref());
                    if relevant && touches_snapshot {
                        tracing::info!("Snapshot file change detected, invalidating cache");
                        events.publish(ConfigEvent::SnapshotReloaded);
                    }
                }
                Err(e) => tracing::error!(error = ?e, "Snapshot watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&directory, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, directory = ?directory, "Snapshot watcher started");
        Ok(watcher)
    }
}
