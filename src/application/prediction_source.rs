// Source trait for forecast service data access
use crate::domain::alert::RawAlert;
use crate::domain::prediction::{AccuracySummary, HistoricalRecord, Prediction};
use crate::domain::price::{PriceHistory, ServiceHealth};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::fmt;
use thiserror::Error;

pub const DEFAULT_HISTORY_DAYS: u32 = 30;
pub const DEFAULT_PRICE_HISTORY_DAYS: u32 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Predict,
    PredictWeek,
    History,
    Accuracy,
    Alerts,
    Record,
    PriceHistory,
    Health,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Predict => "/predict",
            Self::PredictWeek => "/predict/week",
            Self::History => "/history",
            Self::Accuracy => "/accuracy",
            Self::Alerts => "/alerts",
            Self::Record => "/record",
            Self::PriceHistory => "/price/history",
            Self::Health => "/health",
        }
    }

    pub fn is_write(&self) -> bool {
        matches!(self, Self::Record)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Unreachable,
    Timeout,
    Status(u16),
    MalformedBody,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreachable => f.write_str("service unreachable"),
            Self::Timeout => f.write_str("request timed out"),
            Self::Status(code) => write!(f, "HTTP status {}", code),
            Self::MalformedBody => f.write_str("malformed response body"),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("{endpoint}: {kind}: {message}")]
    Transport {
        endpoint: Endpoint,
        kind: TransportKind,
        message: String,
    },
    #[error("{endpoint}: service reported failure: {message}")]
    Application { endpoint: Endpoint, message: String },
}

impl FetchError {
    pub fn transport(endpoint: Endpoint, kind: TransportKind, message: impl Into<String>) -> Self {
        Self::Transport {
            endpoint,
            kind,
            message: message.into(),
        }
    }

    pub fn application(endpoint: Endpoint, message: impl Into<String>) -> Self {
        Self::Application {
            endpoint,
            message: message.into(),
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    pub fn endpoint(&self) -> Endpoint {
        match self {
            Self::Transport { endpoint, .. } | Self::Application { endpoint, .. } => *endpoint,
        }
    }
}

/// Acknowledgement of a write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ack {
    pub message: Option<String>,
}

#[async_trait]
pub trait PredictionSource: Send + Sync {
    /// Prediction for the next restock day
    async fn current_prediction(&self) -> Result<Prediction, FetchError>;

    /// Predictions for the restock days of the coming week, ascending by date
    async fn weekly_predictions(&self) -> Result<Vec<Prediction>, FetchError>;

    /// Recorded predictions within the lookback window, newest first
    async fn history(&self, days: u32) -> Result<Vec<HistoricalRecord>, FetchError>;

    /// Accuracy over the lookback window; `None` while there is not enough data
    async fn accuracy(&self, days: u32) -> Result<Option<AccuracySummary>, FetchError>;

    async fn alerts(&self) -> Result<Vec<RawAlert>, FetchError>;

    /// Record the operator-confirmed quantity for a restock date
    async fn record_outcome(&self, date: NaiveDate, actual_quantity: u32) -> Result<Ack, FetchError>;

    async fn price_history(&self, days: u32) -> Result<PriceHistory, FetchError>;

    async fn health(&self) -> Result<ServiceHealth, FetchError>;
}
