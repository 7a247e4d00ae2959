// Presentation layer - JSON API consumed by the dashboard front end
pub mod app_state;
pub mod handlers;
pub mod view;

use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    dismiss_alert, get_dashboard, health_check, price_history, record_outcome, trigger_refresh,
    upstream_health,
};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/dashboard", get(get_dashboard))
        .route("/refresh", post(trigger_refresh))
        .route("/alerts/:id/dismiss", post(dismiss_alert))
        .route("/outcomes", post(record_outcome))
        .route("/price-history", get(price_history))
        .route("/upstream-health", get(upstream_health))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
