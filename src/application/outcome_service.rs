// Outcome service - Use case for confirming actual restock quantities
use crate::application::prediction_source::{FetchError, PredictionSource};
use crate::application::refresh_service::{RefreshOutcome, RefreshService};
use chrono::NaiveDate;
use std::sync::Arc;

#[derive(Clone)]
pub struct OutcomeService {
    source: Arc<dyn PredictionSource>,
    refresh: RefreshService,
}

impl OutcomeService {
    pub fn new(source: Arc<dyn PredictionSource>, refresh: RefreshService) -> Self {
        Self { source, refresh }
    }

    /// Send the confirmed quantity, then refresh once so it shows up.
    ///
    /// Failures are returned to the operator as-is; nothing is retried and
    /// dashboard state is left alone.
    pub async fn submit(&self, date: NaiveDate, actual_quantity: u32) -> Result<RefreshOutcome, FetchError> {
        match self.source.record_outcome(date, actual_quantity).await {
            Ok(ack) => {
                tracing::info!(
                    %date,
                    actual_quantity,
                    message = ack.message.as_deref().unwrap_or(""),
                    "Recorded actual quantity"
                );
            }
            Err(e) => {
                tracing::error!(%date, actual_quantity, error = %e, "Failed to record actual quantity");
                return Err(e);
            }
        }

        Ok(self.refresh.refresh().await)
    }
}
