// Prediction domain model - what the forecast service reports
use super::adjustment::AdjustmentBreakdown;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Prediction {
    #[serde(deserialize_with = "deserialize_target_date")]
    pub target_date: NaiveDate,
    #[serde(deserialize_with = "deserialize_quantity")]
    pub predicted_quantity: i64,
    pub confidence: Confidence,
    pub current_stock: StockSnapshot,
    #[serde(default)]
    pub factors: AdjustmentBreakdown,
    pub calendar_event: CalendarEvent,
    pub price_info: PriceInfo,
    #[serde(default)]
    pub base_demand: Option<i64>,
}

impl Prediction {
    /// Ex-farm price per unit weight.
    pub fn price(&self) -> f64 {
        self.price_info.price
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct StockSnapshot {
    pub total: u32,
    pub factory: u32,
    pub kiosk: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CalendarEvent {
    #[serde(default)]
    pub has_event: bool,
    pub event_name: String,
    pub factor: f64,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PriceInfo {
    pub price: f64,
    #[serde(default)]
    pub source: PriceSource,
    #[serde(default)]
    pub confidence: Option<Confidence>,
    #[serde(default)]
    pub method: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceSource {
    Current,
    Forecasted,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confidence {
    High,
    MediumHigh,
    Medium,
    Low,
    Other(String),
}

impl Confidence {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().replace(['_', ' '], "-").as_str() {
            "high" => Self::High,
            "medium-high" => Self::MediumHigh,
            "medium" => Self::Medium,
            "low" => Self::Low,
            _ => Self::Other(raw.trim().to_string()),
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => f.write_str("High"),
            Self::MediumHigh => f.write_str("Medium-High"),
            Self::Medium => f.write_str("Medium"),
            Self::Low => f.write_str("Low"),
            Self::Other(label) => f.write_str(label),
        }
    }
}

impl<'de> Deserialize<'de> for Confidence {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Confidence::parse(&raw))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HistoricalRecord {
    #[serde(deserialize_with = "deserialize_instant")]
    pub timestamp: DateTime<Utc>,
    pub prediction: Prediction,
    /// Operator-confirmed quantity. The service stores it untyped, so it may
    /// arrive as a float or a numeric string.
    #[serde(default, deserialize_with = "deserialize_actual")]
    pub actual: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AccuracySummary {
    pub avg_accuracy: f64,
    pub total_predictions: u32,
    #[serde(default)]
    pub min_accuracy: Option<f64>,
    #[serde(default)]
    pub max_accuracy: Option<f64>,
}

/// Parse the leading `YYYY-MM-DD` of a target date such as `"2024-03-01 (Friday)"`.
pub fn parse_target_date(raw: &str) -> Option<NaiveDate> {
    let head = raw.split_whitespace().next()?;
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

/// Parse an instant from RFC 3339, naive ISO-8601 (read as UTC) or epoch seconds.
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    raw.parse::<f64>().ok().and_then(epoch_to_instant)
}

fn epoch_to_instant(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis((secs * 1000.0).round() as i64)
}

fn deserialize_target_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_target_date(&raw).ok_or_else(|| de::Error::custom(format!("invalid target date {:?}", raw)))
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawQuantity {
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawQuantity {
    fn value(&self) -> Option<f64> {
        let value = match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Text(text) => text.trim().parse::<f64>().ok(),
        };
        value.filter(|v| v.is_finite())
    }
}

/// Whole quantities: integers, integral floats (`750.0`) and numeric strings.
fn deserialize_quantity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let raw = RawQuantity::deserialize(deserializer)?;
    if let RawQuantity::Int(v) = raw {
        return Ok(v);
    }
    raw.value()
        .filter(|v| v.fract() == 0.0 && v.abs() <= i64::MAX as f64)
        .map(|v| v as i64)
        .ok_or_else(|| de::Error::custom(format!("invalid quantity {:?}", raw)))
}

fn deserialize_actual<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    match Option::<RawQuantity>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawQuantity::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .value()
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid actual quantity {:?}", raw))),
    }
}

pub(crate) fn deserialize_instant<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<DateTime<Utc>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Epoch(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Epoch(secs) => epoch_to_instant(secs)
            .ok_or_else(|| de::Error::custom(format!("epoch out of range: {}", secs))),
        Raw::Text(text) => {
            parse_instant(&text).ok_or_else(|| de::Error::custom(format!("invalid timestamp {:?}", text)))
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use chrono::{Datelike, TimeZone, Timelike};
    use serde_json::{json, Value};

    #[test]
    fn test_prediction_decodes_service_payload() {
        let prediction: Prediction =
            serde_json::from_value(prediction_json("2024-03-01", 800, 250, 8.5)).unwrap();

        assert_eq!(prediction.target_date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(prediction.predicted_quantity, 800);
        assert_eq!(prediction.confidence, Confidence::High);
        assert_eq!(prediction.current_stock.total, 250);
        assert_eq!(prediction.price(), 8.5);
        assert_eq!(prediction.price_info.source, PriceSource::Current);
        assert_eq!(prediction.factors.iter().count(), 5);
        assert_eq!(prediction.calendar_event.kind.as_deref(), Some("friday"));
    }

    #[test]
    fn test_confidence_labels() {
        assert_eq!(Confidence::parse("Medium-High"), Confidence::MediumHigh);
        assert_eq!(Confidence::parse("medium_high"), Confidence::MediumHigh);
        assert_eq!(Confidence::parse("LOW"), Confidence::Low);
        assert_eq!(Confidence::parse("Shaky").to_string(), "Shaky");
        assert_eq!(Confidence::MediumHigh.to_string(), "Medium-High");
    }

    #[test]
    fn test_parse_instant_variants() {
        let naive = parse_instant("2024-03-01T10:20:30.123456").unwrap();
        assert_eq!((naive.day(), naive.hour(), naive.minute()), (1, 10, 20));

        let offset = parse_instant("2024-03-01T08:00:00+08:00").unwrap();
        assert_eq!(offset, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());

        let epoch = parse_instant("1709251200").unwrap();
        assert_eq!(epoch, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());

        assert!(parse_instant("yesterday").is_none());
    }

    #[test]
    fn test_history_record_actual_absent_vs_zero() {
        let absent: HistoricalRecord =
            serde_json::from_value(history_json("2024-03-01T09:00:00", "2024-03-01", 900, None))
                .unwrap();
        let zero: HistoricalRecord =
            serde_json::from_value(history_json("2024-03-01T09:00:00", "2024-03-01", 900, Some(0)))
                .unwrap();

        assert_eq!(absent.actual, None);
        assert_eq!(zero.actual, Some(0.0));
    }

    #[test]
    fn test_history_record_untyped_quantities() {
        let with_actual = |actual: Value| {
            let mut json = history_json("2024-03-01T09:00:00", "2024-03-01", 900, None);
            json["actual"] = actual;
            serde_json::from_value::<HistoricalRecord>(json)
        };

        assert_eq!(with_actual(json!(750.0)).unwrap().actual, Some(750.0));
        assert_eq!(with_actual(json!(750.5)).unwrap().actual, Some(750.5));
        assert_eq!(with_actual(json!("750")).unwrap().actual, Some(750.0));
        assert_eq!(with_actual(json!("")).unwrap().actual, None);
        assert!(with_actual(json!("lots")).is_err());

        let mut json = history_json("2024-03-01T09:00:00", "2024-03-01", 900, None);
        json["prediction"]["predicted_quantity"] = json!(900.0);
        let record: HistoricalRecord = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(record.prediction.predicted_quantity, 900);

        json["prediction"]["predicted_quantity"] = json!(900.5);
        assert!(serde_json::from_value::<HistoricalRecord>(json).is_err());
    }

    #[test]
    fn test_accuracy_optional_fields() {
        let summary: AccuracySummary =
            serde_json::from_str(r#"{"avg_accuracy": 91.5, "total_predictions": 12}"#).unwrap();
        assert_eq!(summary.total_predictions, 12);
        assert_eq!(summary.min_accuracy, None);
    }
}
