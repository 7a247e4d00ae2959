// Application state for HTTP handlers
use crate::application::outcome_service::OutcomeService;
use crate::application::prediction_source::PredictionSource;
use crate::application::refresh_service::RefreshService;
use crate::presentation::view::ViewSettings;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub refresh_service: RefreshService,
    pub outcome_service: OutcomeService,
    pub source: Arc<dyn PredictionSource>,
    pub view: ViewSettings,
    pub price_history_days: u32,
}
