// View model - maps dashboard state to display-ready JSON
use crate::application::dashboard_state::DashboardSnapshot;
use crate::domain::adjustment::{Adjustment, Direction};
use crate::domain::alert::{Alert, AlertKind};
use crate::domain::chart::{ChartPoint, StockTrend};
use crate::domain::prediction::{AccuracySummary, Prediction, PriceSource};
use crate::domain::price::{PriceHistory, PricePoint, ServiceHealth};
use crate::domain::stock::{StockSeverity, StockThresholds};
use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;

/// Display conventions applied at the edge: thresholds, timezone and formats.
#[derive(Debug, Clone)]
pub struct ViewSettings {
    pub thresholds: StockThresholds,
    pub offset: FixedOffset,
    pub date_format: String,
    pub currency: String,
}

impl ViewSettings {
    fn local(&self, ts: DateTime<Utc>, format: &str) -> String {
        ts.with_timezone(&self.offset).format(format).to_string()
    }
}

#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub current: Option<PredictionView>,
    pub weekly: Vec<PredictionView>,
    pub chart: Vec<ChartPointView>,
    pub stock_trend: StockTrend,
    pub accuracy: Option<AccuracyView>,
    pub alerts: Vec<AlertView>,
    pub loading: bool,
    pub error_banner: Option<String>,
    pub notice: Option<String>,
    pub last_updated: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PredictionView {
    pub target_date: String,
    pub weekday: String,
    pub predicted_quantity: i64,
    pub confidence: String,
    pub price: f64,
    pub price_display: String,
    pub price_label: String,
    pub price_source: PriceSource,
    pub stock: StockView,
    pub event: EventView,
    pub factors: Vec<FactorView>,
    pub total_adjustment: Option<String>,
    pub price_adjustment: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StockView {
    pub total: u32,
    pub factory: u32,
    pub kiosk: u32,
    pub severity: StockSeverity,
    pub gauge_percent: f64,
}

#[derive(Debug, Serialize)]
pub struct EventView {
    pub name: String,
    pub has_event: bool,
    pub factor_display: String,
}

#[derive(Debug, Serialize)]
pub struct FactorView {
    pub name: String,
    pub display: String,
    pub direction: Direction,
}

#[derive(Debug, Serialize)]
pub struct ChartPointView {
    pub label: String,
    pub date: String,
    pub recorded_at: String,
    pub predicted: i64,
    pub actual: Option<f64>,
    pub stock: u32,
    pub price: f64,
    pub accuracy: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct AccuracyView {
    pub avg_accuracy: f64,
    pub avg_display: String,
    pub total_predictions: u32,
    pub min_accuracy: Option<f64>,
    pub max_accuracy: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct AlertView {
    pub id: usize,
    pub kind: AlertKind,
    pub message: String,
    pub detail: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct PriceHistoryView {
    pub observed: Vec<PricePointView>,
    pub forecast: Vec<PricePointView>,
    pub current_price: Option<String>,
    pub avg_price: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PricePointView {
    pub date: String,
    pub price: f64,
    pub price_display: String,
    pub is_forecast: bool,
    pub confidence: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthView {
    pub status: String,
    pub healthy: bool,
    pub timestamp: Option<String>,
}

pub fn format_price(price: f64) -> String {
    format!("{:.2}", price)
}

pub fn format_adjustment(adjustment: Adjustment) -> String {
    format!("{:+.1}%", adjustment.signed() * 100.0)
}

pub fn dashboard_view(snapshot: &DashboardSnapshot, settings: &ViewSettings) -> DashboardView {
    DashboardView {
        current: snapshot.current.as_ref().map(|p| prediction_view(p, settings)),
        weekly: snapshot.weekly.iter().map(|p| prediction_view(p, settings)).collect(),
        chart: snapshot.chart.iter().map(|p| chart_point_view(p, settings)).collect(),
        stock_trend: StockTrend::from_points(&snapshot.chart),
        accuracy: snapshot.accuracy.as_ref().map(accuracy_view),
        alerts: alert_views(&snapshot.alerts, settings),
        loading: snapshot.loading,
        error_banner: snapshot.error_banner().map(str::to_string),
        notice: snapshot.notice().map(str::to_string),
        last_updated: snapshot
            .last_success
            .map(|ts| settings.local(ts, "%Y-%m-%d %H:%M:%S")),
    }
}

pub fn prediction_view(prediction: &Prediction, settings: &ViewSettings) -> PredictionView {
    let stock = prediction.current_stock;
    let price_display = format_price(prediction.price());
    PredictionView {
        target_date: prediction.target_date.format("%Y-%m-%d").to_string(),
        weekday: prediction.target_date.format("%A").to_string(),
        predicted_quantity: prediction.predicted_quantity,
        confidence: prediction.confidence.to_string(),
        price: prediction.price(),
        price_label: format!("{} {}", settings.currency, price_display),
        price_display,
        price_source: prediction.price_info.source,
        stock: StockView {
            total: stock.total,
            factory: stock.factory,
            kiosk: stock.kiosk,
            severity: settings.thresholds.classify(stock.total),
            gauge_percent: settings.thresholds.gauge_percent(stock.total),
        },
        event: EventView {
            name: prediction.calendar_event.event_name.clone(),
            has_event: prediction.calendar_event.has_event,
            factor_display: format_adjustment(Adjustment::from_fraction(prediction.calendar_event.factor)),
        },
        factors: prediction
            .factors
            .iter()
            .map(|entry| FactorView {
                name: entry.name.clone(),
                display: format_adjustment(entry.adjustment),
                direction: entry.adjustment.direction,
            })
            .collect(),
        total_adjustment: prediction.factors.total().map(format_adjustment),
        price_adjustment: prediction.factors.price().map(format_adjustment),
    }
}

fn chart_point_view(point: &ChartPoint, settings: &ViewSettings) -> ChartPointView {
    ChartPointView {
        label: point.target_date.format(&settings.date_format).to_string(),
        date: point.label.clone(),
        recorded_at: settings.local(point.timestamp, "%Y-%m-%d %H:%M"),
        predicted: point.predicted,
        actual: point.actual,
        stock: point.stock_total,
        price: point.price,
        accuracy: point.accuracy(),
    }
}

fn accuracy_view(summary: &AccuracySummary) -> AccuracyView {
    AccuracyView {
        avg_accuracy: summary.avg_accuracy,
        avg_display: format!("{:.1}%", summary.avg_accuracy),
        total_predictions: summary.total_predictions,
        min_accuracy: summary.min_accuracy,
        max_accuracy: summary.max_accuracy,
    }
}

pub fn alert_views(alerts: &[Alert], settings: &ViewSettings) -> Vec<AlertView> {
    alerts
        .iter()
        .map(|alert| AlertView {
            id: alert.id,
            kind: alert.kind,
            message: alert.message.clone(),
            detail: alert.detail.clone(),
            timestamp: settings.local(alert.timestamp, "%Y-%m-%d %H:%M"),
        })
        .collect()
}

pub fn price_history_view(history: &PriceHistory) -> PriceHistoryView {
    PriceHistoryView {
        observed: history.observed().map(price_point_view).collect(),
        forecast: history.forecast().map(price_point_view).collect(),
        current_price: history.current_price.map(format_price),
        avg_price: history.avg_price.map(format_price),
        min_price: history.min_price.map(format_price),
        max_price: history.max_price.map(format_price),
    }
}

fn price_point_view(point: &PricePoint) -> PricePointView {
    PricePointView {
        date: point.date.format("%Y-%m-%d").to_string(),
        price: point.price,
        price_display: format_price(point.price),
        is_forecast: point.is_forecast,
        confidence: point.confidence.clone(),
    }
}

pub fn health_view(health: &ServiceHealth) -> HealthView {
    HealthView {
        status: health.status.clone(),
        healthy: health.is_healthy(),
        timestamp: health.timestamp.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::prediction;
    use chrono::TimeZone;

    fn settings() -> ViewSettings {
        ViewSettings {
            thresholds: StockThresholds::default(),
            offset: FixedOffset::east_opt(8 * 3600).unwrap(),
            date_format: "%d %b".to_string(),
            currency: "RM".to_string(),
        }
    }

    #[test]
    fn test_formatting() {
        assert_eq!(format_price(8.5), "8.50");
        assert_eq!(format_price(6.499), "6.50");
        assert_eq!(format_adjustment(Adjustment::from_fraction(0.12)), "+12.0%");
        assert_eq!(format_adjustment(Adjustment::from_fraction(-0.25)), "-25.0%");
        assert_eq!(format_adjustment(Adjustment::from_fraction(0.0)), "+0.0%");
    }

    #[test]
    fn test_prediction_view_for_critical_stock() {
        let view = prediction_view(&prediction("2024-03-01", 800, 250, 8.5), &settings());

        assert_eq!(view.target_date, "2024-03-01");
        assert_eq!(view.weekday, "Friday");
        assert_eq!(view.confidence, "High");
        assert_eq!(view.price_display, "8.50");
        assert_eq!(view.price_label, "RM 8.50");
        assert_eq!(view.stock.severity, StockSeverity::Critical);
        assert!((view.stock.gauge_percent - 12.5).abs() < 1e-9);
        assert_eq!(view.event.factor_display, "+12.0%");
        assert_eq!(view.factors.last().unwrap().name, "total_adjustment");
        assert_eq!(view.factors.last().unwrap().display, "+72.0%");
        assert_eq!(view.total_adjustment.as_deref(), Some("+72.0%"));
    }

    #[test]
    fn test_chart_point_labels() {
        let point = ChartPoint {
            label: "2024-03-01".to_string(),
            target_date: chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            timestamp: Utc.with_ymd_and_hms(2024, 3, 3, 20, 0, 0).unwrap(),
            predicted: 800,
            actual: None,
            stock_total: 250,
            price: 8.5,
        };
        let view = chart_point_view(&point, &settings());
        assert_eq!(view.label, "01 Mar");
        assert_eq!(view.date, "2024-03-01");
        assert_eq!(view.recorded_at, "2024-03-04 04:00");
        assert_eq!(view.actual, None);
        assert_eq!(view.accuracy, None);
    }

    #[test]
    fn test_price_history_splits_forecast() {
        let point = |day: u32, price: f64, is_forecast: bool| PricePoint {
            date: chrono::NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            price,
            is_forecast,
            confidence: is_forecast.then(|| "Medium".to_string()),
        };
        let history = PriceHistory {
            points: vec![point(1, 8.5, false), point(2, 8.6, true), point(3, 8.7, true)],
            current_price: Some(8.5),
            avg_price: None,
            min_price: None,
            max_price: None,
        };

        let view = price_history_view(&history);
        assert_eq!(view.observed.len(), 1);
        assert_eq!(view.forecast.len(), 2);
        assert_eq!(view.forecast[0].price_display, "8.60");
        assert_eq!(view.current_price.as_deref(), Some("8.50"));
        assert!(view.avg_price.is_none());
    }

    #[test]
    fn test_empty_dashboard_view() {
        let view = dashboard_view(&DashboardSnapshot::default(), &settings());
        assert!(view.current.is_none());
        assert_eq!(view.stock_trend, StockTrend::Unknown);
        assert!(view.error_banner.is_none());
        assert!(view.last_updated.is_none());
    }
}
