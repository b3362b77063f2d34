//! Process lifecycle: building the service, stopping it cleanly.
//!
//! # Data Flow
//! ```text
//! startup.rs:
//!     ServiceConfig → open store (memory | file) → pick cache source (store | snapshot)
//!
//! signals.rs:
//!     Ctrl+C / SIGTERM → Shutdown::trigger
//!
//! shutdown.rs:
//!     broadcast → HttpServer stops accepting → in-flight requests finish → exit
//! ```
//!
//! # Design Decisions
//! - A storage directory that cannot be created aborts startup
//! - The composition root owns the cache and event channel; nothing is global

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
