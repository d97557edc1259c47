use reqwest::StatusCode;
use thiserror::Error;

/// Everything that can go wrong talking to an upstream API.
///
/// A report with no values is not an error; it is a successful fetch with
/// absent samples.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The provider refused the request and explained why.
    #[error("{reason}")]
    Rejected { status: StatusCode, reason: String },

    #[error("API request failed with status {}", .0.as_u16())]
    Status(StatusCode),

    #[error("API request failed with status {} and an unreadable error body", .status.as_u16())]
    Malformed { status: StatusCode },

    #[error("Failed to reach the provider")]
    Transport(#[source] reqwest::Error),

    #[error("Unexpected response from provider: {0}")]
    Decode(#[source] serde_json::Error),
}

impl FetchError {
    /// HTTP status attached to the failure, if the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            FetchError::Rejected { status, .. } | FetchError::Malformed { status } => Some(*status),
            FetchError::Status(status) => Some(*status),
            FetchError::Transport(err) => err.status(),
            FetchError::Decode(_) => None,
        }
    }
}
