use crate::{AirQualityReport, AirQualityRequest, error::FetchError};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::fmt::Debug;

pub mod open_meteo;

pub use open_meteo::OpenMeteoProvider;

/// Source of air quality reports. One network round trip per call, no retries.
#[async_trait]
pub trait AirQualityProvider: Send + Sync + Debug {
    async fn fetch_air_quality(
        &self,
        request: &AirQualityRequest,
    ) -> Result<AirQualityReport, FetchError>;
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    reason: Option<String>,
}

/// Classify a non-success response. Open-Meteo APIs answer `{"error": true, "reason": "..."}`.
pub(crate) fn error_from_body(status: StatusCode, body: &str) -> FetchError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody { reason: Some(reason) }) if !reason.is_empty() => {
            FetchError::Rejected { status, reason }
        }
        Ok(_) => FetchError::Status(status),
        Err(_) => FetchError::Malformed { status },
    }
}

/// Keep the first 200 bytes of a body for log lines.
pub(crate) fn truncate_body(body: &str) -> &str {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body;
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
