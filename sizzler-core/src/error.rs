//! Failure kinds reported by the external collaborators.
//!
//! Neither kind escapes a coordinator: both are logged at the coordinator
//! boundary and the shared state keeps its last good value.

use std::time::Duration;

/// Transport, HTTP or decode failure while fetching weather.
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server responded with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode weather payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("response is not a supported image")]
    UnsupportedImage,
}

/// Permission or provider failure while resolving the device location.
#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("location service unavailable")]
    Unavailable,
    #[error("location lookup failed: {0}")]
    Lookup(String),
}

impl From<reqwest::Error> for LocationError {
    fn from(err: reqwest::Error) -> Self {
        LocationError::Lookup(err.to_string())
    }
}
