// The {success, data, error} wrapper on every forecast service response
use crate::application::prediction_source::{Endpoint, FetchError, TransportKind};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// Unwrap a response whose `data` may legitimately be null.
    pub fn into_optional(self, endpoint: Endpoint) -> Result<Option<T>, FetchError> {
        if self.success {
            Ok(self.data)
        } else {
            Err(self.into_failure(endpoint))
        }
    }

    pub fn into_data(self, endpoint: Endpoint) -> Result<T, FetchError> {
        self.into_optional(endpoint)?.ok_or_else(|| {
            FetchError::transport(endpoint, TransportKind::MalformedBody, "successful response carried no data")
        })
    }

    pub fn into_failure(self, endpoint: Endpoint) -> FetchError {
        let message = self
            .error
            .or(self.message)
            .unwrap_or_else(|| "request was not successful".to_string());
        FetchError::application(endpoint, message)
    }
}
