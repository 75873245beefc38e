use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc, time::Duration};

use crate::{
    Config,
    error::NetworkError,
    model::{Coordinates, WeatherRecord},
};

pub mod openweather;
pub mod timeout;

pub use openweather::OpenWeatherClient;
pub use timeout::TimeoutClient;

/// Turns a search subject into a decoded [`WeatherRecord`].
#[async_trait]
pub trait NetworkClient: Send + Sync + Debug {
    async fn fetch_by_query(&self, query: &str) -> Result<WeatherRecord, NetworkError>;

    async fn fetch_by_coordinates(
        &self,
        coordinates: Coordinates,
    ) -> Result<WeatherRecord, NetworkError>;
}

#[async_trait]
impl<T: NetworkClient + ?Sized> NetworkClient for Arc<T> {
    async fn fetch_by_query(&self, query: &str) -> Result<WeatherRecord, NetworkError> {
        (**self).fetch_by_query(query).await
    }

    async fn fetch_by_coordinates(
        &self,
        coordinates: Coordinates,
    ) -> Result<WeatherRecord, NetworkError> {
        (**self).fetch_by_coordinates(coordinates).await
    }
}

/// Construct the OpenWeatherMap client described by `config`.
///
/// The request timeout is only applied when configured; without it a fetch
/// may wait indefinitely.
pub fn client_from_config(config: &Config) -> anyhow::Result<Arc<dyn NetworkClient>> {
    let api_key = config.api_key_or_hint()?;
    let client = OpenWeatherClient::new(api_key);

    let boxed: Arc<dyn NetworkClient> = match config.request_timeout_secs {
        Some(secs) => Arc::new(TimeoutClient::new(client, Duration::from_secs(secs))),
        None => Arc::new(client),
    };

    Ok(boxed)
}
