// Periodic refresh trigger with an explicit lifecycle
use crate::application::refresh_service::{RefreshOutcome, RefreshService};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(300);

/// Owns the timer task that drives refresh cycles.
///
/// The first tick fires immediately so the dashboard loads on start. Ticks
/// that land while a cycle is still running are skipped, not queued.
pub struct RefreshScheduler {
    service: RefreshService,
    period: Duration,
    handle: Option<JoinHandle<()>>,
}

impl RefreshScheduler {
    pub fn new(service: RefreshService, period: Duration) -> Self {
        Self {
            service,
            period,
            handle: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn start(&mut self) {
        if self.is_running() {
            tracing::debug!("Refresh scheduler already running");
            return;
        }

        let service = self.service.clone();
        let period = self.period;
        tracing::info!(period_secs = period.as_secs(), "Starting refresh scheduler");

        self.handle = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                match service.refresh().await {
                    RefreshOutcome::Skipped => tracing::debug!("Timer tick skipped, refresh in flight"),
                    RefreshOutcome::TotalFailure { error } => {
                        tracing::warn!(error = %error, "Scheduled refresh failed")
                    }
                    _ => {}
                }
            }
        }));
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            tracing::info!("Stopped refresh scheduler");
        }
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
