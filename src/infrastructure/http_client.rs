// HTTP client for the forecast service
use crate::application::prediction_source::{
    Ack, Endpoint, FetchError, PredictionSource, TransportKind,
};
use crate::domain::alert::RawAlert;
use crate::domain::prediction::{AccuracySummary, HistoricalRecord, Prediction};
use crate::domain::price::{PriceHistory, PricePoint, ServiceHealth};
use crate::infrastructure::envelope::Envelope;
use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct PredictionApiClient {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Default)]
pub struct RequestOptions {
    pub query: Vec<(&'static str, String)>,
    pub body: Option<serde_json::Value>,
}

impl RequestOptions {
    pub fn days(days: u32) -> Self {
        Self {
            query: vec![("days", days.to_string())],
            body: None,
        }
    }
}

/// `/price/history` puts its summary next to `data` instead of inside it.
#[derive(Debug, Deserialize)]
struct PriceHistoryBody {
    success: bool,
    #[serde(default)]
    data: Vec<PricePoint>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    current_price: Option<f64>,
    #[serde(default)]
    avg_price: Option<f64>,
    #[serde(default)]
    min_price: Option<f64>,
    #[serde(default)]
    max_price: Option<f64>,
}

impl PredictionApiClient {
    /// Every request is bounded by `timeout`; an elapsed timeout is a transport error.
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn build_url(&self, endpoint: Endpoint, query: &[(&str, String)]) -> String {
        let mut url = format!("{}{}", self.base_url, endpoint.path());
        for (i, (key, value)) in query.iter().enumerate() {
            url.push(if i == 0 { '?' } else { '&' });
            url.push_str(key);
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }
        url
    }

    /// Issue one request and decode its JSON body.
    ///
    /// A non-2xx answer that still carries a `success: false` envelope is
    /// reported as an application error with the service's message.
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        options: RequestOptions,
    ) -> Result<T, FetchError> {
        let url = self.build_url(endpoint, &options.query);
        tracing::debug!(%endpoint, %url, "Requesting forecast service");

        let mut request = if endpoint.is_write() {
            self.client.post(&url)
        } else {
            self.client.get(&url)
        };
        if let Some(body) = &options.body {
            request = request.json(body);
        }

        let response = request
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| transport_error(endpoint, e))?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| transport_error(endpoint, e))?;

        if !status.is_success() {
            if let Ok(envelope) = serde_json::from_slice::<Envelope<serde_json::Value>>(&body) {
                if !envelope.success {
                    return Err(envelope.into_failure(endpoint));
                }
            }
            let snippet: String = String::from_utf8_lossy(&body).chars().take(200).collect();
            return Err(FetchError::transport(
                endpoint,
                TransportKind::Status(status.as_u16()),
                snippet,
            ));
        }

        serde_json::from_slice(&body)
            .map_err(|e| FetchError::transport(endpoint, TransportKind::MalformedBody, e.to_string()))
    }

    async fn fetch_data<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        options: RequestOptions,
    ) -> Result<T, FetchError> {
        self.fetch_json::<Envelope<T>>(endpoint, options)
            .await?
            .into_data(endpoint)
    }
}

fn transport_error(endpoint: Endpoint, error: reqwest::Error) -> FetchError {
    let kind = if error.is_timeout() {
        TransportKind::Timeout
    } else if error.is_decode() {
        TransportKind::MalformedBody
    } else {
        TransportKind::Unreachable
    };
    FetchError::transport(endpoint, kind, error.to_string())
}

#[async_trait]
impl PredictionSource for PredictionApiClient {
    async fn current_prediction(&self) -> Result<Prediction, FetchError> {
        self.fetch_data(Endpoint::Predict, RequestOptions::default()).await
    }

    async fn weekly_predictions(&self) -> Result<Vec<Prediction>, FetchError> {
        self.fetch_data(Endpoint::PredictWeek, RequestOptions::default()).await
    }

    async fn history(&self, days: u32) -> Result<Vec<HistoricalRecord>, FetchError> {
        let records: Vec<HistoricalRecord> =
            self.fetch_data(Endpoint::History, RequestOptions::days(days)).await?;
        tracing::debug!(days, records = records.len(), "Fetched prediction history");
        Ok(records)
    }

    async fn accuracy(&self, days: u32) -> Result<Option<AccuracySummary>, FetchError> {
        let envelope: Envelope<AccuracySummary> =
            self.fetch_json(Endpoint::Accuracy, RequestOptions::days(days)).await?;
        if envelope.success && envelope.data.is_none() {
            tracing::debug!(
                days,
                message = envelope.message.as_deref().unwrap_or(""),
                "No accuracy summary yet"
            );
        }
        envelope.into_optional(Endpoint::Accuracy)
    }

    async fn alerts(&self) -> Result<Vec<RawAlert>, FetchError> {
        self.fetch_data(Endpoint::Alerts, RequestOptions::default()).await
    }

    async fn record_outcome(&self, date: NaiveDate, actual_quantity: u32) -> Result<Ack, FetchError> {
        let options = RequestOptions {
            query: Vec::new(),
            body: Some(serde_json::json!({
                "date": date.format("%Y-%m-%d").to_string(),
                "actual_quantity": actual_quantity,
            })),
        };
        let envelope: Envelope<serde_json::Value> = self.fetch_json(Endpoint::Record, options).await?;
        if !envelope.success {
            return Err(envelope.into_failure(Endpoint::Record));
        }
        Ok(Ack {
            message: envelope.message,
        })
    }

    async fn price_history(&self, days: u32) -> Result<PriceHistory, FetchError> {
        let body: PriceHistoryBody = self
            .fetch_json(Endpoint::PriceHistory, RequestOptions::days(days))
            .await?;
        if !body.success {
            let message = body.error.unwrap_or_else(|| "request was not successful".to_string());
            return Err(FetchError::application(Endpoint::PriceHistory, message));
        }
        Ok(PriceHistory {
            points: body.data,
            current_price: body.current_price,
            avg_price: body.avg_price,
            min_price: body.min_price,
            max_price: body.max_price,
        })
    }

    async fn health(&self) -> Result<ServiceHealth, FetchError> {
        self.fetch_json(Endpoint::Health, RequestOptions::default()).await
    }
}
