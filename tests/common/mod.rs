//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use form_config::cache::{ConfigCache, ConfigEvents, StoreSource};
use form_config::form::DefaultRegistry;
use form_config::http::AppState;
use form_config::store::{ConfigStore, HttpConfigStore, MemoryStore};
use form_config::{HttpServer, ServiceConfig, Shutdown};

/// A service running on an ephemeral local port.
pub struct TestService {
    pub addr: SocketAddr,
    pub store: MemoryStore,
    pub cache: Arc<ConfigCache>,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<Result<(), std::io::Error>>,
}

#[allow(dead_code)]
impl TestService {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn client_store(&self) -> HttpConfigStore {
        HttpConfigStore::new(&self.url()).unwrap()
    }

    /// Stop the server and wait for it to drain.
    pub async fn stop(self) {
        self.shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("server did not stop")
            .unwrap()
            .unwrap();
    }
}

/// Start the service with an in-memory store.
pub async fn start_service() -> TestService {
    let store = MemoryStore::new();
    let shared: Arc<dyn ConfigStore> = Arc::new(store.clone());
    let events = ConfigEvents::default();
    let cache = Arc::new(ConfigCache::new(Arc::new(StoreSource::new(shared.clone()))));
    let _invalidation = cache.listen(events.subscribe());

    let state = AppState {
        store: shared,
        cache: cache.clone(),
        events,
        defaults: Arc::new(DefaultRegistry::builtin().unwrap()),
    };

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = HttpServer::new(ServiceConfig::default(), state);
    let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

    TestService {
        addr,
        store,
        cache,
        shutdown,
        handle,
    }
}
