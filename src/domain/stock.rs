// Stock health classification against fixed thresholds
use serde::Serialize;
use std::num::NonZeroU32;

pub const DEFAULT_CRITICAL_BELOW: u32 = 300;
pub const DEFAULT_LOW_BELOW: u32 = 500;
/// Full-stock baseline the gauge is measured against.
pub const DEFAULT_GAUGE_CAPACITY: NonZeroU32 = NonZeroU32::new(2000).unwrap();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StockSeverity {
    Critical,
    Low,
    Good,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockThresholds {
    pub critical_below: u32,
    pub low_below: u32,
    pub gauge_capacity: NonZeroU32,
}

impl Default for StockThresholds {
    fn default() -> Self {
        Self {
            critical_below: DEFAULT_CRITICAL_BELOW,
            low_below: DEFAULT_LOW_BELOW,
            gauge_capacity: DEFAULT_GAUGE_CAPACITY,
        }
    }
}

impl StockThresholds {
    /// Critical wins over Low; the two are never reported together.
    pub fn classify(&self, total: u32) -> StockSeverity {
        if total < self.critical_below {
            StockSeverity::Critical
        } else if total < self.low_below {
            StockSeverity::Low
        } else {
            StockSeverity::Good
        }
    }

    pub fn gauge_percent(&self, total: u32) -> f64 {
        gauge_percent(total, self.gauge_capacity)
    }
}

/// Fill level of the stock gauge, clamped to `[0, 100]`.
pub fn gauge_percent(total: u32, capacity: NonZeroU32) -> f64 {
    let percent = f64::from(total) / f64::from(capacity.get()) * 100.0;
    percent.min(100.0)
}
