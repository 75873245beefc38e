//! Device-location collaborators.
//!
//! A request resolves to exactly one outcome: coordinates or a
//! [`LocationError`]. The location coordinator awaits that outcome instead of
//! registering a delegate.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::{fmt::Debug, time::Duration};

use crate::{error::LocationError, model::Coordinates};

pub const DEFAULT_IP_LOOKUP_URL: &str = "http://ip-api.com/json";
const LOOKUP_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = concat!("sizzler/", env!("CARGO_PKG_VERSION"));

#[async_trait]
pub trait LocationProvider: Send + Sync + Debug {
    async fn request_location(&self) -> Result<Coordinates, LocationError>;
}

/// Always answers with the same coordinates (CLI flags or `[home]` config).
#[derive(Debug, Clone, Copy)]
pub struct FixedLocationProvider {
    coordinates: Coordinates,
}

impl FixedLocationProvider {
    pub fn new(coordinates: Coordinates) -> Self {
        Self { coordinates }
    }
}

#[async_trait]
impl LocationProvider for FixedLocationProvider {
    async fn request_location(&self) -> Result<Coordinates, LocationError> {
        Ok(self.coordinates)
    }
}

/// Approximate location from the public IP address.
#[derive(Debug, Clone)]
pub struct IpLocationProvider {
    endpoint: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
}

impl IpLocationProvider {
    pub fn new() -> Result<Self, LocationError> {
        Self::with_endpoint(DEFAULT_IP_LOOKUP_URL)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Result<Self, LocationError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(LOOKUP_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { endpoint: endpoint.into(), http })
    }
}

#[async_trait]
impl LocationProvider for IpLocationProvider {
    async fn request_location(&self) -> Result<Coordinates, LocationError> {
        let res = self.http.get(&self.endpoint).send().await?;

        if !res.status().is_success() {
            return Err(LocationError::Lookup(format!("status {}", res.status())));
        }

        let body: IpLookupResponse = res.json().await?;
        if body.status != "success" {
            let reason = body.message.unwrap_or_else(|| body.status.clone());
            tracing::debug!(%reason, "ip lookup refused");
            return Err(LocationError::Unavailable);
        }

        match (body.lat, body.lon) {
            (Some(lat), Some(lon)) => Ok(Coordinates::new(lat, lon)),
            _ => Err(LocationError::Lookup("response carried no coordinates".into())),
        }
    }
}
