use axum::{
    extract::{rejection::JsonRejection, Extension},
    Json,
};
use serde_json::Value;

use crate::domains::schools::{
    enrich_batch, list_schools, EnrichRequest, EnrichmentSummary, School,
};
use crate::server::{ApiError, AxumAppState};

/// `GET /api/schools`
pub async fn schools_handler(
    Extension(state): Extension<AxumAppState>,
) -> Result<Json<Vec<School>>, ApiError> {
    let schools = list_schools(state.deps.store.as_ref(), &state.enrichment.schools_range).await?;
    Ok(Json(schools))
}

/// `POST /api/enrich-batch` with `{ schoolIds: [..] }`.
pub async fn enrich_batch_handler(
    Extension(state): Extension<AxumAppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<EnrichmentSummary>, ApiError> {
    let Json(body) = body?;
    let request = EnrichRequest::from_json(&body)?;

    let summary = enrich_batch(&state.deps, &state.enrichment, &request).await?;
    Ok(Json(summary))
}
