//! Form Configuration Service Library
//!
//! Persists per-form field ordering and visibility, merges it with the
//! code-defined defaults, and serves the result over HTTP.

pub mod cache;
pub mod config;
pub mod editor;
pub mod form;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resolver;
pub mod store;

pub use config::schema::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
