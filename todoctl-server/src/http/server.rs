//! Axum server setup
//!
//! Server skeleton with:
//! - Permissive CORS (any origin)
//! - Tracing middleware
//! - Panics in handlers become JSON 500s
//! - Trailing slashes ignored (`/todos/` routes like `/todos`)
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::any::Any as PanicPayload;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::Request;
use axum::response::{IntoResponse, Response};
use axum::{Router, ServiceExt};
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::normalize_path::NormalizePath;
use tower_http::trace::TraceLayer;

use super::error::ApiError;
use super::routes;
use crate::service::TodoService;

/// The complete HTTP service: the router behind path normalization.
///
/// Normalization has to wrap the router rather than be a route layer,
/// otherwise routing happens before the slash is trimmed.
pub type App = NormalizePath<Router>;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 0.0.0.0:3001)
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3001)),
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub todos: TodoService,
}

/// Build the application router with all routes
pub fn build_router(state: AppState) -> App {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let router = Router::new()
        .merge(routes::health::router())
        .merge(routes::todos::router())
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state));

    NormalizePath::trim_trailing_slash(router)
}

/// Log the panic payload and answer like any other internal error.
fn panic_response(payload: Box<dyn PanicPayload + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else {
        "non-string panic payload"
    };

    tracing::error!(panic = detail, "request handler panicked");
    ApiError::Internal.into_response()
}

/// Run the HTTP server.
///
/// # Example
///
/// ```ignore
/// let store = open_store(&db_config, &PoolConfig::default())?;
/// run_server(TodoService::new(store), ServerConfig::default()).await?;
/// ```
pub async fn run_server(todos: TodoService, config: ServerConfig) -> Result<(), ServerError> {
    let app = build_router(AppState { todos });

    // Bind listener
    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    // Run with graceful shutdown
    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
