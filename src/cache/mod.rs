//! Client-side configuration cache.
//!
//! # Data Flow
//! ```text
//! first get(form)
//!     → config_cache.rs (single-flight: one load, other callers wait)
//!     → source.rs (snapshot file / bundled snapshot / ConfigStore::list)
//!     → ConfigSet (normalized documents), kept until invalidated
//!
//! ConfigEditor::save / POST /form-config/{form} / snapshot watcher
//!     → events.rs (ConfigEvent broadcast)
//!     → ConfigCache::listen → invalidate → next get reloads
//! ```
//!
//! # Design Decisions
//! - Constructed object shared by Arc, never a global
//! - Whole set is loaded at once; absent forms are `None`, not errors
//! - No timer expiry; only explicit invalidation clears the cache
//! - Failed loads are logged and not cached, callers fall back to defaults

pub mod config_cache;
pub mod events;
pub mod source;

pub use config_cache::ConfigCache;
pub use events::{ConfigEvent, ConfigEvents};
pub use source::{ConfigSet, ConfigSource, SnapshotSource, StoreSource};
