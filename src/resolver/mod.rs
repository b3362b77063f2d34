//! Effective field order resolution.
//!
//! # Data Flow
//! ```text
//! DefaultFieldSet (code) ─┐
//!                         ├→ merge.rs (lookup by name, effective order, stable sort)
//! FormConfiguration? ─────┘      → visibility filter
//!                                → Vec<ResolvedField> (borrows the defaults)
//!                                → menu.rs (one-level tree, menus only)
//! ```
//!
//! # Design Decisions
//! - Pure functions, no I/O, identical output for identical input
//! - Defaults are borrowed, never mutated
//! - Configuration-only fields are never rendered

pub mod menu;
pub mod merge;

pub use menu::{group_menu, MenuNode};
pub use merge::{resolve, resolve_all, ResolvedField, UNCONFIGURED_ORDER};
