// HTTP request handlers
use crate::application::prediction_source::FetchError;
use crate::application::refresh_service::RefreshOutcome;
use crate::domain::prediction::parse_target_date;
use crate::presentation::app_state::AppState;
use crate::presentation::view::{
    alert_views, dashboard_view, health_view, price_history_view, AlertView, DashboardView, HealthView,
    PriceHistoryView,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Upstream(#[from] FetchError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
        };
        (status, Json(json!({ "success": false, "error": self.to_string() }))).into_response()
    }
}

#[derive(Deserialize)]
pub struct DaysQuery {
    pub days: Option<u32>,
}

#[derive(Deserialize)]
pub struct OutcomeRequest {
    pub date: String,
    pub actual_quantity: u32,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn get_dashboard(State(state): State<Arc<AppState>>) -> Json<DashboardView> {
    let snapshot = state.refresh_service.snapshot().await;
    Json(dashboard_view(&snapshot, &state.view))
}

/// Manual refresh; a no-op while a cycle is already running
pub async fn trigger_refresh(State(state): State<Arc<AppState>>) -> Json<RefreshOutcome> {
    Json(state.refresh_service.refresh().await)
}

pub async fn dismiss_alert(
    Path(id): Path<usize>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<AlertView>>, ApiError> {
    let remaining = state
        .refresh_service
        .store()
        .dismiss_alert(id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("no alert with id {}", id)))?;
    Ok(Json(alert_views(&remaining, &state.view)))
}

/// Record an operator-confirmed quantity, then refresh
pub async fn record_outcome(
    State(state): State<Arc<AppState>>,
    Json(request): Json<OutcomeRequest>,
) -> Result<Json<RefreshOutcome>, ApiError> {
    let date = parse_target_date(&request.date)
        .ok_or_else(|| ApiError::BadRequest(format!("invalid date {:?}, expected YYYY-MM-DD", request.date)))?;
    let outcome = state
        .outcome_service
        .submit(date, request.actual_quantity)
        .await?;
    Ok(Json(outcome))
}

pub async fn price_history(
    Query(query): Query<DaysQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<PriceHistoryView>, ApiError> {
    let days = query.days.unwrap_or(state.price_history_days);
    let history = state.source.price_history(days).await?;
    Ok(Json(price_history_view(&history)))
}

pub async fn upstream_health(State(state): State<Arc<AppState>>) -> Result<Json<HealthView>, ApiError> {
    let health = state.source.health().await?;
    if !health.is_healthy() {
        tracing::warn!(status = %health.status, "Forecast service reports degraded health");
    }
    Ok(Json(health_view(&health)))
}
