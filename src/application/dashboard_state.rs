// Shared dashboard state - the slices one refresh cycle updates
use crate::application::alert_store::AlertStore;
use crate::domain::alert::Alert;
use crate::domain::chart::ChartPoint;
use crate::domain::prediction::{AccuracySummary, Prediction};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{RwLock, RwLockWriteGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Slice {
    Prediction,
    WeeklyPredictions,
    Chart,
    Accuracy,
    Alerts,
}

impl fmt::Display for Slice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Prediction => "prediction",
            Self::WeeklyPredictions => "weekly_predictions",
            Self::Chart => "chart",
            Self::Accuracy => "accuracy",
            Self::Alerts => "alerts",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Default)]
pub struct DashboardData {
    pub current: Option<Prediction>,
    pub weekly: Vec<Prediction>,
    pub chart: Vec<ChartPoint>,
    pub accuracy: Option<AccuracySummary>,
    pub alerts: AlertStore,
    pub error: Option<String>,
    /// Set once any slice has been committed; never cleared.
    pub has_loaded: bool,
    pub last_success: Option<DateTime<Utc>>,
}

/// Point-in-time copy of the dashboard for rendering.
#[derive(Debug, Clone, Default)]
pub struct DashboardSnapshot {
    pub current: Option<Prediction>,
    pub weekly: Vec<Prediction>,
    pub chart: Vec<ChartPoint>,
    pub accuracy: Option<AccuracySummary>,
    pub alerts: Vec<Alert>,
    pub loading: bool,
    pub error: Option<String>,
    pub has_loaded: bool,
    pub last_success: Option<DateTime<Utc>>,
}

impl DashboardSnapshot {
    /// Blocking banner, shown only while nothing has ever loaded.
    pub fn error_banner(&self) -> Option<&str> {
        self.error.as_deref().filter(|_| !self.has_loaded)
    }

    /// Non-destructive notice, shown over stale data.
    pub fn notice(&self) -> Option<&str> {
        self.error.as_deref().filter(|_| self.has_loaded)
    }
}

#[derive(Debug, Default)]
pub struct DashboardStore {
    data: RwLock<DashboardData>,
    loading: AtomicBool,
}

impl DashboardStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    pub async fn snapshot(&self) -> DashboardSnapshot {
        let data = self.data.read().await;
        DashboardSnapshot {
            current: data.current.clone(),
            weekly: data.weekly.clone(),
            chart: data.chart.clone(),
            accuracy: data.accuracy.clone(),
            alerts: data.alerts.alerts().to_vec(),
            loading: self.is_loading(),
            error: data.error.clone(),
            has_loaded: data.has_loaded,
            last_success: data.last_success,
        }
    }

    pub async fn dismiss_alert(&self, id: usize) -> Option<Vec<Alert>> {
        let mut data = self.data.write().await;
        data.alerts.dismiss(id).map(<[Alert]>::to_vec)
    }

    /// Claim the loading flag. `None` when a cycle is already in flight.
    pub(crate) fn try_begin(&self) -> Option<LoadingGuard<'_>> {
        self.loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| LoadingGuard { flag: &self.loading })
    }

    pub(crate) async fn write(&self) -> RwLockWriteGuard<'_, DashboardData> {
        self.data.write().await
    }
}

/// Clears the loading flag when dropped, including when the cycle future is cancelled.
pub(crate) struct LoadingGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
