//! Route handlers.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State, rejection::BytesRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;

use super::{ApiError, AppState};
use crate::answer::Context;
use crate::catalog::{Catalog, Product};

// ── Request / response types ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(super) struct AskRequest {
    #[serde(default)]
    question: String,
    #[serde(rename = "productId", default)]
    product_id: Option<String>,
}

impl AskRequest {
    /// Validate a raw body: it must be a non-empty JSON object with a
    /// non-empty `question`. An empty `productId` counts as absent.
    fn parse(body: &[u8]) -> Result<Self, ApiError> {
        let no_json = || ApiError::BadRequest("No JSON data provided".into());

        let value: Value = serde_json::from_slice(body).map_err(|_| no_json())?;
        match &value {
            Value::Object(map) if !map.is_empty() => {}
            _ => return Err(no_json()),
        }

        let mut req: AskRequest = serde_json::from_value(value)
            .map_err(|e| ApiError::BadRequest(format!("Invalid request: {e}")))?;
        if req.question.is_empty() {
            return Err(ApiError::BadRequest("No question provided".into()));
        }
        req.product_id = req.product_id.filter(|id| !id.is_empty());
        Ok(req)
    }
}

#[derive(Debug, Serialize)]
pub(super) struct AskResponse {
    answer: String,
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// GET /health
pub(super) async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// GET /products
pub(super) async fn products(State(state): State<AppState>) -> Json<Vec<Value>> {
    Json(Catalog::load(&state.catalog_path).await.records)
}

/// GET /products/{product_id}
pub(super) async fn product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    Catalog::load(&state.catalog_path)
        .await
        .take(&product_id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Product not found".into()))
}

/// POST /ask
pub(super) async fn ask(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<AskResponse>, ApiError> {
    let body = body.map_err(body_rejection)?;
    info!(body = %String::from_utf8_lossy(&body), "received question request");
    let req = AskRequest::parse(&body)?;

    let catalog = Catalog::load(&state.catalog_path).await;
    let context = match &req.product_id {
        Some(id) => catalog
            .find(id)
            .and_then(Product::from_record)
            .map(Context::Product)
            .ok_or_else(|| ApiError::NotFound(format!("Product with ID {id} not found")))?,
        None => Context::Catalog(catalog.products()),
    };

    let answer = state.answerer.answer(&req.question, &context).await;
    Ok(Json(AskResponse { answer }))
}

fn body_rejection(rejection: BytesRejection) -> ApiError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge("Request body too large".into())
    } else {
        ApiError::BadRequest("No JSON data provided".into())
    }
}

/// Any unrouted path.
pub(super) async fn not_found() -> ApiError {
    ApiError::NotFound("Not found".into())
}
