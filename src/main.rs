// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::application::dashboard_state::DashboardStore;
use crate::application::outcome_service::OutcomeService;
use crate::application::prediction_source::PredictionSource;
use crate::application::refresh_service::RefreshService;
use crate::application::scheduler::RefreshScheduler;
use crate::infrastructure::config::load_dashboard_config;
use crate::infrastructure::http_client::PredictionApiClient;
use crate::presentation::app_state::AppState;
use crate::presentation::view::ViewSettings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("restock_dashboard=info,tower_http=info")),
        )
        .init();

    // Load configuration
    let config = load_dashboard_config()?;
    let bind_addr = config.bind_addr()?;

    // Create source (infrastructure layer)
    let source: Arc<dyn PredictionSource> = Arc::new(PredictionApiClient::new(
        &config.service.base_url,
        config.request_timeout(),
    )?);

    // Create services (application layer)
    let store = Arc::new(DashboardStore::new());
    let refresh_service = RefreshService::new(source.clone(), store, config.refresh.history_days);
    let outcome_service = OutcomeService::new(source.clone(), refresh_service.clone());

    let mut scheduler = RefreshScheduler::new(refresh_service.clone(), config.refresh_interval());
    scheduler.start();

    // Create application state
    let state = Arc::new(AppState {
        refresh_service,
        outcome_service,
        source,
        view: ViewSettings {
            thresholds: config.stock_thresholds()?,
            offset: config.display_offset()?,
            date_format: config.display.date_format.clone(),
            currency: config.display.currency.clone(),
        },
        price_history_days: config.refresh.price_history_days,
    });

    // Build router (presentation layer)
    let router = presentation::router(state);

    // Start server
    tracing::info!(
        %bind_addr,
        upstream = %config.service.base_url,
        "Starting restock-dashboard service"
    );
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.stop();
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
