// Chart series derived from prediction history
use super::prediction::HistoricalRecord;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// One history record on the chart. `label` is the ISO date the forecast was
/// for; `timestamp` is when the service stored the record.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub label: String,
    pub target_date: NaiveDate,
    pub timestamp: DateTime<Utc>,
    pub predicted: i64,
    pub actual: Option<f64>,
    pub stock_total: u32,
    pub price: f64,
}

impl ChartPoint {
    pub fn from_record(record: &HistoricalRecord) -> Self {
        Self {
            label: record.prediction.target_date.format("%Y-%m-%d").to_string(),
            target_date: record.prediction.target_date,
            timestamp: record.timestamp,
            predicted: record.prediction.predicted_quantity,
            actual: record.actual,
            stock_total: record.prediction.current_stock.total,
            price: record.prediction.price(),
        }
    }

    /// Accuracy of the prediction against the confirmed actual, floored at 0.
    /// Absent until an actual above zero has been recorded.
    pub fn accuracy(&self) -> Option<f64> {
        let actual = self.actual.filter(|a| *a > 0.0)?;
        let error = ((self.predicted as f64 - actual) / actual * 100.0).abs();
        Some((100.0 - error).max(0.0))
    }
}

/// Turn newest-first history into an oldest-first chart series.
///
/// One point per record, nothing dropped, and a missing actual stays `None`.
pub fn normalize_history(records: &[HistoricalRecord]) -> Vec<ChartPoint> {
    records.iter().rev().map(ChartPoint::from_record).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StockTrend {
    Rising,
    Falling,
    Steady,
    Unknown,
}

impl StockTrend {
    pub fn from_points(points: &[ChartPoint]) -> Self {
        match points {
            [.., previous, latest] => match latest.stock_total.cmp(&previous.stock_total) {
                std::cmp::Ordering::Greater => Self::Rising,
                std::cmp::Ordering::Less => Self::Falling,
                std::cmp::Ordering::Equal => Self::Steady,
            },
            _ => Self::Unknown,
        }
    }
}
