//! Service configuration subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!     → passed by value/clone to the server and stores
//!
//! Snapshot hot reload:
//!     watcher.rs detects a change to the snapshot file
//!     → publishes ConfigEvent::SnapshotReloaded
//!     → ConfigCache drops its contents and reloads lazily
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the service restarts to pick up changes
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use schema::CacheConfig;
pub use schema::CacheSourceKind;
pub use schema::ListenerConfig;
pub use schema::ObservabilityConfig;
pub use schema::ServiceConfig;
pub use schema::SnapshotConfig;
pub use schema::StorageBackend;
pub use schema::StorageConfig;
