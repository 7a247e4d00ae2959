// Alert domain model
use super::prediction::deserialize_instant;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Critical,
    Warning,
    Info,
}

/// Alert as reported by the service, before it is given a local identity.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawAlert {
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub message: String,
    #[serde(default)]
    pub detail: String,
    #[serde(deserialize_with = "deserialize_instant")]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub id: usize,
    pub kind: AlertKind,
    pub message: String,
    pub detail: String,
    pub timestamp: DateTime<Utc>,
}

impl Alert {
    pub fn new(id: usize, raw: RawAlert) -> Self {
        Self {
            id,
            kind: raw.kind,
            message: raw.message,
            detail: raw.detail,
            timestamp: raw.timestamp,
        }
    }
}
