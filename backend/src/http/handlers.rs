//! HTTP handlers for the REST API.
//!
//! Each handler validates its query and delegates to [`ForecastService`](crate::services::ForecastService).

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};

use super::dto::{ForecastResponse, MessageResponse, PredictQuery};
use super::error::AppError;
use super::state::AppState;
use crate::models::ForecastBackend;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// GET /
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse::new("Daily stars predictor"))
}

/// GET /health
///
/// Liveness check; does not touch the upstream provider.
pub async fn health_check() -> Json<MessageResponse> {
    Json(MessageResponse::new("Ciao"))
}

/// GET /predict?repo=owner/name
///
/// Forecast with the configured default pipeline.
pub async fn predict(
    State(state): State<AppState>,
    query: Result<Query<PredictQuery>, QueryRejection>,
) -> HandlerResult<Arc<ForecastResponse>> {
    let backend = state.default_backend;
    forecast_for(&state, query, backend).await
}

/// GET /predict/statsmodels?repo=owner/name
///
/// Holt-Winters forecast with residual-based bands.
pub async fn predict_smoothing(
    State(state): State<AppState>,
    query: Result<Query<PredictQuery>, QueryRejection>,
) -> HandlerResult<Arc<ForecastResponse>> {
    forecast_for(&state, query, ForecastBackend::Smoothing).await
}

/// GET /predict/prophet?repo=owner/name
pub async fn predict_decomposition(
    State(state): State<AppState>,
    query: Result<Query<PredictQuery>, QueryRejection>,
) -> HandlerResult<Arc<ForecastResponse>> {
    forecast_for(&state, query, ForecastBackend::Decomposition).await
}

async fn forecast_for(
    state: &AppState,
    query: Result<Query<PredictQuery>, QueryRejection>,
    backend: ForecastBackend,
) -> HandlerResult<Arc<ForecastResponse>> {
    let Query(query) = query.map_err(|rejection| {
        AppError::Validation(format!("malformed query string: {}", rejection.body_text()))
    })?;
    let repo = query
        .repo()
        .ok_or_else(|| AppError::Validation("query parameter 'repo' is required".to_string()))?;

    let response = state.service.predict(repo, backend).await.map_err(|e| {
        tracing::warn!(repo, %backend, "forecast failed: {}", e);
        AppError::from(e)
    })?;

    Ok(Json(response))
}
