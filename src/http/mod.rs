//! HTTP surface of the configuration service.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, limits, timeout)
//!     → handlers.rs (validate form name / document, talk to store and cache)
//!     → response.rs (map failures to JSON error bodies)
//!     → Send to client
//! ```

pub mod handlers;
pub mod response;
pub mod server;

pub use response::ApiError;
pub use server::{AppState, HttpServer, X_REQUEST_ID};
