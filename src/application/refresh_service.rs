// Refresh service - one refresh cycle over the five dashboard slices
use crate::application::dashboard_state::{DashboardSnapshot, DashboardStore, Slice};
use crate::application::prediction_source::{FetchError, PredictionSource};
use crate::domain::chart::normalize_history;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RefreshOutcome {
    /// Another cycle was already in flight.
    Skipped,
    Success,
    /// Some fetches failed. Their slices kept the previous values; the rest were committed.
    PartialFailure { failed: Vec<Slice> },
    /// Every fetch failed at the transport level; nothing was committed.
    TotalFailure { error: String },
}

#[derive(Clone)]
pub struct RefreshService {
    source: Arc<dyn PredictionSource>,
    store: Arc<DashboardStore>,
    history_days: u32,
}

impl RefreshService {
    pub fn new(source: Arc<dyn PredictionSource>, store: Arc<DashboardStore>, history_days: u32) -> Self {
        Self {
            source,
            store,
            history_days,
        }
    }

    pub fn store(&self) -> &Arc<DashboardStore> {
        &self.store
    }

    pub async fn snapshot(&self) -> DashboardSnapshot {
        self.store.snapshot().await
    }

    /// Run one refresh cycle unless one is already running.
    ///
    /// All five fetches are issued together. Results are committed under a
    /// single write lock once every fetch has finished, so readers never see
    /// half a cycle. A failed fetch only leaves its own slice stale.
    pub async fn refresh(&self) -> RefreshOutcome {
        let Some(_loading) = self.store.try_begin() else {
            tracing::debug!("Refresh already in flight, dropping trigger");
            return RefreshOutcome::Skipped;
        };

        let started = Instant::now();
        let days = self.history_days;
        let (current, weekly, history, accuracy, alerts) = futures::join!(
            self.source.current_prediction(),
            self.source.weekly_predictions(),
            self.source.history(days),
            self.source.accuracy(days),
            self.source.alerts(),
        );

        let errors = [
            current.as_ref().err(),
            weekly.as_ref().err(),
            history.as_ref().err(),
            accuracy.as_ref().err(),
            alerts.as_ref().err(),
        ];
        let service_down = errors.iter().all(|e| e.is_some_and(FetchError::is_transport));

        let mut data = self.store.write().await;

        if service_down {
            let error = errors.into_iter().flatten().next().cloned();
            let description = error
                .as_ref()
                .map(FetchError::to_string)
                .unwrap_or_else(|| "forecast service unavailable".to_string());
            tracing::error!(
                endpoint = error.as_ref().map(|e| e.endpoint().path()).unwrap_or_default(),
                error = %description,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Every fetch failed, keeping previous data"
            );
            data.error = Some(description.clone());
            return RefreshOutcome::TotalFailure { error: description };
        }

        let mut failed = Vec::new();
        let mut first_error = None;

        if let Some(prediction) = accept(current, Slice::Prediction, &mut failed, &mut first_error) {
            data.current = Some(prediction);
        }
        if let Some(weekly) = accept(weekly, Slice::WeeklyPredictions, &mut failed, &mut first_error) {
            data.weekly = weekly;
        }
        if let Some(records) = accept(history, Slice::Chart, &mut failed, &mut first_error) {
            data.chart = normalize_history(&records);
        }
        if let Some(summary) = accept(accuracy, Slice::Accuracy, &mut failed, &mut first_error) {
            data.accuracy = summary;
        }
        if let Some(raw) = accept(alerts, Slice::Alerts, &mut failed, &mut first_error) {
            data.alerts.replace_all(raw);
        }

        let committed = 5 - failed.len();
        if committed > 0 {
            data.has_loaded = true;
            data.last_success = Some(Utc::now());
        }
        data.error = first_error;

        tracing::info!(
            committed,
            failed = failed.len(),
            chart_points = data.chart.len(),
            alerts = data.alerts.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Refresh cycle complete"
        );

        if failed.is_empty() {
            RefreshOutcome::Success
        } else {
            RefreshOutcome::PartialFailure { failed }
        }
    }
}

/// Keep a fetched value for commit, or record why its slice stays stale.
fn accept<T>(
    result: Result<T, FetchError>,
    slice: Slice,
    failed: &mut Vec<Slice>,
    first_error: &mut Option<String>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(
                slice = %slice,
                transport = e.is_transport(),
                error = %e,
                "Slice fetch failed, keeping stale value"
            );
            failed.push(slice);
            first_error.get_or_insert_with(|| e.to_string());
            None
        }
    }
}
