//! HTTP server layer
//!
//! Axum server with:
//! - CORS (any origin)
//! - Request tracing
//! - Trailing-slash normalization
//! - Graceful shutdown
//! - JSON error responses

pub mod server;
pub mod error;
pub mod extractors;
pub mod routes;

pub use server::{build_router, run_server, App, AppState, ServerConfig, ServerError};
pub use error::ApiError;
