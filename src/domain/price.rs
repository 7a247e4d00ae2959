// Ex-farm price history, observed and forecast
use chrono::NaiveDate;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
    #[serde(default)]
    pub is_forecast: bool,
    #[serde(default)]
    pub confidence: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceHistory {
    pub points: Vec<PricePoint>,
    pub current_price: Option<f64>,
    pub avg_price: Option<f64>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

impl PriceHistory {
    pub fn observed(&self) -> impl Iterator<Item = &PricePoint> {
        self.points.iter().filter(|p| !p.is_forecast)
    }

    pub fn forecast(&self) -> impl Iterator<Item = &PricePoint> {
        self.points.iter().filter(|p| p.is_forecast)
    }
}

/// Upstream liveness as reported by the service's health route.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServiceHealth {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl ServiceHealth {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}
