//! "Configuration updated" signal.

use tokio::sync::broadcast;

use crate::form::FormName;

const DEFAULT_CAPACITY: usize = 64;

/// Something that makes cached configuration stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigEvent {
    /// A new document was saved for this form.
    Updated(FormName),
    /// The static snapshot changed on disk.
    SnapshotReloaded,
}

/// Process-wide broadcast of configuration changes.
///
/// Fire-and-forget: publishing with no subscribers is not an error.
#[derive(Clone)]
pub struct ConfigEvents {
    tx: broadcast::Sender<ConfigEvent>,
}

impl ConfigEvents {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConfigEvent> {
        self.tx.subscribe()
    }

    /// Publish an event; returns how many subscribers received it.
    pub fn publish(&self, event: ConfigEvent) -> usize {
        tracing::debug!(event = ?event, "Publishing configuration event");
        self.tx.send(event).unwrap_or(0)
    }

    pub fn updated(&self, form: &FormName) -> usize {
        self.publish(ConfigEvent::Updated(form.clone()))
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ConfigEvents {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_without_subscribers() {
        let events = ConfigEvents::default();
        assert_eq!(events.publish(ConfigEvent::SnapshotReloaded), 0);
    }

    #[tokio::test]
    async fn test_subscribers_receive_updates() {
        let events = ConfigEvents::default();
        let mut a = events.subscribe();
        let mut b = events.subscribe();
        let form = FormName::from_static("AssetForm");

        assert_eq!(events.updated(&form), 2);
        assert_eq!(a.recv().await.unwrap(), ConfigEvent::Updated(form.clone()));
        assert_eq!(b.recv().await.unwrap(), ConfigEvent::Updated(form));
        assert_eq!(events.receiver_count(), 2);
    }
}
