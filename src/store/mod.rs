//! Configuration document persistence.
//!
//! # Data Flow
//! ```text
//! put(form, document)
//!     → backend (memory map / JSON file / remote HTTP)
//!     → StoredConfiguration { id, formName, config, createdAt, updatedAt }
//!
//! get(form) → Option<ConfigDocument>   (absent is not an error)
//! list()    → every stored document     (cache loading, snapshot export)
//! ```
//!
//! # Design Decisions
//! - Upsert only: every put fully replaces the previous document
//! - Last write wins per key; no versioning, no merge
//! - Storage identifiers survive replacement of the same key
//! - No retries; failures go straight to the caller

pub mod file;
pub mod http;
pub mod memory;

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use thiserror::Error;

use crate::form::{ConfigDocument, FormName, StoredConfiguration};

pub use file::FileStore;
pub use http::HttpConfigStore;
pub use memory::MemoryStore;

/// Errors raised by configuration storage backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing storage failed.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored record could not be encoded or decoded.
    #[error("Storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The remote store could not be reached.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The remote store answered with an unexpected status.
    #[error("Remote store returned {status}: {body}")]
    Remote { status: u16, body: String },

    /// The configured endpoint is not a usable base URL.
    #[error("Invalid store URL: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        StoreError::Transport(e.to_string())
    }
}

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Keyed persistence of configuration documents.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Backend name for logs and metrics.
    fn kind(&self) -> &'static str;

    /// Current document for `form`, or `None` if it was never saved.
    async fn get(&self, form: &FormName) -> StoreResult<Option<ConfigDocument>>;

    /// Create or fully replace the document for `form`.
    async fn put(&self, form: &FormName, document: ConfigDocument)
        -> StoreResult<StoredConfiguration>;

    /// Every stored document.
    async fn list(&self) -> StoreResult<BTreeMap<FormName, ConfigDocument>>;
}

pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
