use axum::{
    extract::{rejection::JsonRejection, Extension},
    Json,
};
use serde_json::Value;

use crate::domains::contacts::{generate_batch, BatchResult, GenerationRequest};
use crate::server::{ApiError, AxumAppState};

/// `POST /api/search-ads` with `{ query, batchSize }`.
///
/// Validation happens before any upstream call.
pub async fn search_ads_handler(
    Extension(state): Extension<AxumAppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<BatchResult>, ApiError> {
    let Json(body) = body?;
    let request = GenerationRequest::from_json(&body)?;

    let result = generate_batch(&state.deps, &state.pipeline, &request).await?;
    Ok(Json(result))
}
