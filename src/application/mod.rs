// Application layer - Use cases over the forecast service
pub mod alert_store;
pub mod dashboard_state;
pub mod outcome_service;
pub mod prediction_source;
pub mod refresh_service;
pub mod scheduler;

#[cfg(test)]
pub(crate) mod test_support;
