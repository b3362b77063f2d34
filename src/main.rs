//! Form Configuration Service
//!
//! Stores the field order of forms and menus and serves it to clients.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────┐
//!                         │            FORM CONFIG SERVICE                │
//!                         │                                               │
//!     Client Request      │  ┌─────────┐    ┌──────────┐    ┌─────────┐  │
//!     ────────────────────┼─▶│  http   │───▶│ handlers │───▶│  store  │  │
//!                         │  │ server  │    │          │    │mem/file │  │
//!                         │  └─────────┘    └────┬─────┘    └────┬────┘  │
//!                         │                      │ Updated       │ list  │
//!                         │                      ▼               ▼       │
//!                         │               ┌──────────┐    ┌──────────┐   │
//!                         │               │  events  │───▶│  cache   │   │
//!                         │               └──────────┘    └────┬─────┘   │
//!                         │                                    ▼         │
//!     Resolved fields     │                             ┌──────────┐     │
//!     ◀───────────────────┼─────────────────────────────│ resolver │     │
//!                         │                             └──────────┘     │
//!                         └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use form_config::cache::{ConfigCache, ConfigEvents};
use form_config::config::loader::load_config;
use form_config::config::watcher::SnapshotWatcher;
use form_config::form::DefaultRegistry;
use form_config::http::AppState;
use form_config::lifecycle::{signals, startup};
use form_config::observability::{logging, metrics};
use form_config::{HttpServer, ServiceConfig, Shutdown};

#[derive(Parser)]
#[command(name = "form-config")]
#[command(about = "Form configuration service", long_about = None)]
struct Args {
    /// TOML configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "form-config starting");

    tracing::info!(
        bind_address = %config.listener.bind_address,
        storage = ?config.storage.backend,
        cache_source = ?config.cache.source,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let store = startup::open_store(&config).await?;
    let events = ConfigEvents::default();
    let cache = Arc::new(ConfigCache::new(startup::cache_source(&config, store.clone())));
    let _listener_task = cache.listen(events.subscribe());

    // Dropping the watcher stops notifications.
    let _watcher = match (config.snapshot.watch, startup::snapshot_path(&config)) {
        (true, Some(path)) => match SnapshotWatcher::new(&path, events.clone()).run() {
            Ok(watcher) => Some(watcher),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Snapshot watch disabled");
                None
            }
        },
        _ => None,
    };

    let state = AppState {
        store,
        cache,
        events,
        defaults: Arc::new(DefaultRegistry::builtin()?),
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    tokio::spawn(signals::shutdown_on_signal(shutdown.clone()));

    let server = HttpServer::new(config, state);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
