//! Form configuration data model.
//!
//! # Data Flow
//! ```text
//! HTTP body / store file / snapshot (raw JSON)
//!     → ConfigDocument (opaque, `fields` checked on write only)
//!     → normalize.rs (shape checks, lenient field parsing)
//!     → FormConfiguration (typed, extras preserved)
//!     → resolver (merged with a DefaultFieldSet)
//! ```
//!
//! # Design Decisions
//! - Storage never interprets documents beyond "fields is a list"
//! - Shape mismatches are handled in exactly one place (normalize.rs)
//! - Default field sets are code-defined and immutable once built

pub mod defaults;
pub mod normalize;
pub mod types;

pub use defaults::{DefaultFieldSet, DefaultRegistry, FormKind};
pub use normalize::normalize;
pub use types::{
    ConfigDocument, ConfiguredField, FieldDescriptor, FieldType, FormConfiguration, FormError,
    FormName, StoredConfiguration,
};
