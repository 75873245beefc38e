use async_trait::async_trait;
use std::time::Duration;

use crate::{
    error::NetworkError,
    model::{Coordinates, WeatherRecord},
};

use super::NetworkClient;

/// Bounds every call of the wrapped client with a deadline.
///
/// This is the only place a timeout is applied; the coordinators are unaware
/// of it and treat [`NetworkError::Timeout`] like any other failure.
#[derive(Debug, Clone)]
pub struct TimeoutClient<C> {
    inner: C,
    limit: Duration,
}

impl<C: NetworkClient> TimeoutClient<C> {
    pub fn new(inner: C, limit: Duration) -> Self {
        Self { inner, limit }
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }
}

#[async_trait]
impl<C: NetworkClient> NetworkClient for TimeoutClient<C> {
    async fn fetch_by_query(&self, query: &str) -> Result<WeatherRecord, NetworkError> {
        tokio::time::timeout(self.limit, self.inner.fetch_by_query(query))
            .await
            .map_err(|_elapsed| NetworkError::Timeout(self.limit))?
    }

    async fn fetch_by_coordinates(
        &self,
        coordinates: Coordinates,
    ) -> Result<WeatherRecord, NetworkError> {
        tokio::time::timeout(self.limit, self.inner.fetch_by_coordinates(coordinates))
            .await
            .map_err(|_elapsed| NetworkError::Timeout(self.limit))?
    }
}
