use crate::application::prediction_source::{DEFAULT_HISTORY_DAYS, DEFAULT_PRICE_HISTORY_DAYS};
use crate::application::scheduler::DEFAULT_REFRESH_INTERVAL;
use crate::domain::stock::{StockThresholds, DEFAULT_CRITICAL_BELOW, DEFAULT_GAUGE_CAPACITY, DEFAULT_LOW_BELOW};
use chrono::format::{Item, StrftimeItems};
use chrono::FixedOffset;
use config::builder::DefaultState;
use config::ConfigBuilder;
use serde::Deserialize;
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("service.base_url must be an http(s) URL, got {0:?}")]
    InvalidBaseUrl(String),
    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),
    #[error("stock.low_below ({low}) must not be below stock.critical_below ({critical})")]
    InvertedThresholds { critical: u32, low: u32 },
    #[error("display.utc_offset_minutes out of range: {0}")]
    InvalidOffset(i32),
    #[error("display.date_format is not a valid strftime format: {0:?}")]
    InvalidDateFormat(String),
    #[error("server.bind is not a socket address: {0:?}")]
    InvalidBind(String),
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub service: ServiceSettings,
    pub refresh: RefreshSettings,
    pub stock: StockSettings,
    pub display: DisplaySettings,
    pub server: ServerSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceSettings {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RefreshSettings {
    pub interval_secs: u64,
    pub history_days: u32,
    pub price_history_days: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StockSettings {
    pub critical_below: u32,
    pub low_below: u32,
    pub gauge_capacity: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DisplaySettings {
    pub utc_offset_minutes: i32,
    pub date_format: String,
    pub currency: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind: String,
}

impl DashboardConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.service.request_timeout_secs)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh.interval_secs)
    }

    pub fn stock_thresholds(&self) -> Result<StockThresholds, ConfigError> {
        let gauge_capacity =
            NonZeroU32::new(self.stock.gauge_capacity).ok_or(ConfigError::ZeroValue("stock.gauge_capacity"))?;
        if self.stock.low_below < self.stock.critical_below {
            return Err(ConfigError::InvertedThresholds {
                critical: self.stock.critical_below,
                low: self.stock.low_below,
            });
        }
        Ok(StockThresholds {
            critical_below: self.stock.critical_below,
            low_below: self.stock.low_below,
            gauge_capacity,
        })
    }

    pub fn display_offset(&self) -> Result<FixedOffset, ConfigError> {
        self.display
            .utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or(ConfigError::InvalidOffset(self.display.utc_offset_minutes))
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server
            .bind
            .parse()
            .map_err(|_| ConfigError::InvalidBind(self.server.bind.clone()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = &self.service.base_url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(url.clone()));
        }
        if self.service.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroValue("service.request_timeout_secs"));
        }
        if self.refresh.interval_secs == 0 {
            return Err(ConfigError::ZeroValue("refresh.interval_secs"));
        }
        if self.refresh.history_days == 0 {
            return Err(ConfigError::ZeroValue("refresh.history_days"));
        }
        self.stock_thresholds()?;
        self.display_offset()?;
        if StrftimeItems::new(&self.display.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(ConfigError::InvalidDateFormat(self.display.date_format.clone()));
        }
        self.bind_addr()?;
        Ok(())
    }
}

fn with_defaults(builder: ConfigBuilder<DefaultState>) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(builder
        .set_default("service.base_url", "http://127.0.0.1:5000/api")?
        .set_default("service.request_timeout_secs", 10_i64)?
        .set_default("refresh.interval_secs", DEFAULT_REFRESH_INTERVAL.as_secs() as i64)?
        .set_default("refresh.history_days", i64::from(DEFAULT_HISTORY_DAYS))?
        .set_default("refresh.price_history_days", i64::from(DEFAULT_PRICE_HISTORY_DAYS))?
        .set_default("stock.critical_below", i64::from(DEFAULT_CRITICAL_BELOW))?
        .set_default("stock.low_below", i64::from(DEFAULT_LOW_BELOW))?
        .set_default("stock.gauge_capacity", i64::from(DEFAULT_GAUGE_CAPACITY.get()))?
        .set_default("display.utc_offset_minutes", 480_i64)?
        .set_default("display.date_format", "%d %b")?
        .set_default("display.currency", "RM")?
        .set_default("server.bind", "0.0.0.0:8080")?)
}

fn finish(builder: ConfigBuilder<DefaultState>) -> Result<DashboardConfig, ConfigError> {
    let config: DashboardConfig = builder.build()?.try_deserialize()?;
    config.validate()?;
    Ok(config)
}

/// Defaults, then `config/dashboard.toml` if present, then `DASHBOARD__*` environment variables.
pub fn load_dashboard_config() -> Result<DashboardConfig, ConfigError> {
    let builder = with_defaults(config::Config::builder())?
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(
            config::Environment::with_prefix("DASHBOARD")
                .separator("__")
                .try_parsing(true),
        );
    finish(builder)
}
