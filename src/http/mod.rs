//! Axum HTTP surface.
//!
//! ## URL layout
//!
//! Every route is served at the root and again under `/api`:
//!
//! ```text
//! GET     /health
//! GET     /products
//! GET     /products/{product_id}
//! POST    /ask
//! ```
//!
//! CORS is wide open; the CORS layer answers every `OPTIONS` preflight
//! itself. Request bodies over axum's default limit (2 MB) get a JSON 413. A panic inside a handler becomes a 500 with a JSON
//! `error` body instead of a dropped connection.

mod api;

use std::{any::Any, path::Path, sync::Arc};

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{self, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};

use crate::answer::Answerer;
use crate::config::Config;
use crate::error::AppError;

// ── Shared request state ──────────────────────────────────────────────────────

/// Router state injected into every handler. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Catalog file, re-read by every request that needs products.
    pub catalog_path: Arc<Path>,
    pub answerer: Answerer,
}

impl AppState {
    pub fn new(catalog_path: &Path, answerer: Answerer) -> Self {
        Self { catalog_path: Arc::from(catalog_path), answerer }
    }
}

// ── Errors ────────────────────────────────────────────────────────────────────

/// Per-request failures. Each renders as `{"error": <message>}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    PayloadTooLarge(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(msg) = &self {
            error!(error = %msg, "request failed");
        }
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "internal server error".to_string()
    };
    error!(%message, "unhandled exception in request handler");
    ApiError::Internal(message).into_response()
}

// ── Router ────────────────────────────────────────────────────────────────────

pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/health", get(api::health))
        .route("/products", get(api::products))
        .route("/products/{product_id}", get(api::product))
        .route("/ask", post(api::ask));

    let cors_layer = CorsLayer::new()
        .allow_origin(cors::Any)
        .allow_methods(cors::Any)
        .allow_headers(cors::Any);

    Router::new()
        .merge(routes.clone())
        .nest("/api", routes)
        .fallback(api::not_found)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ── Server loop ───────────────────────────────────────────────────────────────

/// Bind `config.server.bind` and serve until `shutdown` is cancelled.
pub async fn serve(
    config: &Config,
    answerer: Answerer,
    shutdown: CancellationToken,
) -> Result<(), AppError> {
    let bind_addr = &config.server.bind;
    let state = AppState::new(&config.catalog.path, answerer);

    let listener = TcpListener::bind(bind_addr)
        .await
        .map_err(|e| AppError::Server(format!("bind failed on {bind_addr}: {e}")))?;

    info!(%bind_addr, catalog = %config.catalog.path.display(), "http server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| AppError::Server(format!("server error: {e}")))?;

    info!("http server shut down");
    Ok(())
}
