// In-memory PredictionSource for service tests
use crate::application::prediction_source::{
    Ack, Endpoint, FetchError, PredictionSource, TransportKind,
};
use crate::domain::alert::{AlertKind, RawAlert};
use crate::domain::prediction::fixtures::prediction_json;
use crate::domain::prediction::{AccuracySummary, HistoricalRecord, Prediction};
use crate::domain::price::{PriceHistory, ServiceHealth};
use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

pub fn prediction(date: &str, predicted: i64, stock_total: u32, price: f64) -> Prediction {
    serde_json::from_value(prediction_json(date, predicted, stock_total, price)).unwrap()
}

pub fn unreachable(endpoint: Endpoint) -> FetchError {
    FetchError::transport(endpoint, TransportKind::Unreachable, "connection refused")
}

pub struct Script {
    pub current: Result<Prediction, FetchError>,
    pub weekly: Result<Vec<Prediction>, FetchError>,
    pub history: Result<Vec<HistoricalRecord>, FetchError>,
    pub accuracy: Result<Option<AccuracySummary>, FetchError>,
    pub alerts: Result<Vec<RawAlert>, FetchError>,
    pub record: Result<Ack, FetchError>,
}

impl Default for Script {
    fn default() -> Self {
        let current = prediction("2024-03-01", 800, 250, 8.5);
        let history = vec![
            HistoricalRecord {
                timestamp: Utc.with_ymd_and_hms(2024, 2, 28, 9, 0, 0).unwrap(),
                prediction: prediction("2024-02-28", 950, 400, 6.8),
                actual: Some(900.0),
            },
            HistoricalRecord {
                timestamp: Utc.with_ymd_and_hms(2024, 2, 26, 9, 0, 0).unwrap(),
                prediction: prediction("2024-02-26", 1000, 700, 6.5),
                actual: None,
            },
        ];
        Self {
            current: Ok(current.clone()),
            weekly: Ok(vec![current.clone(), prediction("2024-03-04", 1100, 250, 8.6)]),
            history: Ok(history),
            accuracy: Ok(Some(AccuracySummary {
                avg_accuracy: 94.4,
                total_predictions: 1,
                min_accuracy: Some(94.4),
                max_accuracy: Some(94.4),
            })),
            alerts: Ok(vec![
                RawAlert {
                    kind: AlertKind::Critical,
                    message: "Critical stock level detected".to_string(),
                    detail: "Current stock (250) is below minimum threshold of 300 units".to_string(),
                    timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap(),
                },
                RawAlert {
                    kind: AlertKind::Warning,
                    message: "Low stock warning".to_string(),
                    detail: "Stock level at 250 units. Consider restocking soon.".to_string(),
                    timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap(),
                },
            ]),
            record: Ok(Ack {
                message: Some("Actual quantity recorded".to_string()),
            }),
        }
    }
}

/// Scripted source. Each call answers from `script`, counts itself, and
/// optionally waits on `gate` so a cycle can be held in flight.
pub struct FakeSource {
    pub script: Mutex<Script>,
    calls: Mutex<HashMap<Endpoint, usize>>,
    pub recorded: Mutex<Vec<(NaiveDate, u32)>>,
    gate: Option<Arc<Semaphore>>,
}

impl FakeSource {
    pub fn new(script: Script) -> Self {
        Self {
            script: Mutex::new(script),
            calls: Mutex::new(HashMap::new()),
            recorded: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Block every read until the returned semaphore is given permits.
    pub fn gated(script: Script) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let mut source = Self::new(script);
        source.gate = Some(gate.clone());
        (source, gate)
    }

    pub fn calls(&self, endpoint: Endpoint) -> usize {
        self.calls.lock().unwrap().get(&endpoint).copied().unwrap_or(0)
    }

    pub fn fail_everything(&self) {
        let mut script = self.script.lock().unwrap();
        script.current = Err(unreachable(Endpoint::Predict));
        script.weekly = Err(unreachable(Endpoint::PredictWeek));
        script.history = Err(unreachable(Endpoint::History));
        script.accuracy = Err(unreachable(Endpoint::Accuracy));
        script.alerts = Err(unreachable(Endpoint::Alerts));
    }

    async fn enter(&self, endpoint: Endpoint) {
        *self.calls.lock().unwrap().entry(endpoint).or_insert(0) += 1;
        if let Some(gate) = &self.gate {
            let permit = gate.acquire().await.unwrap();
            permit.forget();
        }
    }
}

#[async_trait]
impl PredictionSource for FakeSource {
    async fn current_prediction(&self) -> Result<Prediction, FetchError> {
        self.enter(Endpoint::Predict).await;
        self.script.lock().unwrap().current.clone()
    }

    async fn weekly_predictions(&self) -> Result<Vec<Prediction>, FetchError> {
        self.enter(Endpoint::PredictWeek).await;
        self.script.lock().unwrap().weekly.clone()
    }

    async fn history(&self, _days: u32) -> Result<Vec<HistoricalRecord>, FetchError> {
        self.enter(Endpoint::History).await;
        self.script.lock().unwrap().history.clone()
    }

    async fn accuracy(&self, _days: u32) -> Result<Option<AccuracySummary>, FetchError> {
        self.enter(Endpoint::Accuracy).await;
        self.script.lock().unwrap().accuracy.clone()
    }

    async fn alerts(&self) -> Result<Vec<RawAlert>, FetchError> {
        self.enter(Endpoint::Alerts).await;
        self.script.lock().unwrap().alerts.clone()
    }

    /// Successful writes show up in the next history read, like the real service,
    /// stamped with the time of the write rather than the forecast date.
    async fn record_outcome(&self, date: NaiveDate, actual_quantity: u32) -> Result<Ack, FetchError> {
        *self.calls.lock().unwrap().entry(Endpoint::Record).or_insert(0) += 1;
        let mut script = self.script.lock().unwrap();
        let ack = script.record.clone()?;
        self.recorded.lock().unwrap().push((date, actual_quantity));

        let mut prediction = prediction(&date.to_string(), 800, 250, 8.5);
        prediction.target_date = date;
        let record = HistoricalRecord {
            timestamp: Utc::now(),
            prediction,
            actual: Some(f64::from(actual_quantity)),
        };
        if let Ok(history) = script.history.as_mut() {
            history.insert(0, record);
        }
        Ok(ack)
    }

    async fn price_history(&self, _days: u32) -> Result<PriceHistory, FetchError> {
        *self.calls.lock().unwrap().entry(Endpoint::PriceHistory).or_insert(0) += 1;
        Ok(PriceHistory {
            points: Vec::new(),
            current_price: Some(8.5),
            avg_price: Some(7.0),
            min_price: Some(6.2),
            max_price: Some(8.5),
        })
    }

    async fn health(&self) -> Result<ServiceHealth, FetchError> {
        Ok(ServiceHealth {
            status: "healthy".to_string(),
            timestamp: None,
        })
    }
}
