use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::NetworkError,
    model::{Coordinates, Icon, WeatherRecord},
};

use super::NetworkClient;

pub const DEFAULT_API_BASE: &str = "https://api.openweathermap.org";
pub const DEFAULT_ICON_BASE: &str = "https://openweathermap.org";

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

/// Current-weather client for the OpenWeatherMap 2.5 API.
///
/// Temperatures are requested in the API's default unit (Kelvin).
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    api_base: String,
    icon_base: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_urls(api_key, DEFAULT_API_BASE, DEFAULT_ICON_BASE)
    }

    /// Point the client at other hosts, e.g. a local mock server.
    pub fn with_base_urls(
        api_key: impl Into<String>,
        api_base: impl Into<String>,
        icon_base: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            icon_base: icon_base.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    async fn fetch_current(
        &self,
        params: &[(&str, String)],
    ) -> Result<WeatherRecord, NetworkError> {
        let url = format!("{}/data/2.5/weather", self.api_base);

        let res = self
            .http
            .get(&url)
            .query(&[("appid", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(NetworkError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let payload = decode_weather(&body)?;
        let icon = self.icon_for(&payload).await;

        Ok(payload.into_record(icon))
    }

    /// First icon that downloads and looks like a PNG, else the placeholder.
    async fn icon_for(&self, payload: &WeatherPayload) -> Icon {
        for code in payload.icon_codes() {
            match self.download_icon(code).await {
                Ok(bytes) => return Icon::Image(bytes),
                Err(err) => tracing::debug!(code, %err, "icon download failed"),
            }
        }
        Icon::Placeholder
    }

    async fn download_icon(&self, code: &str) -> Result<Arc<[u8]>, NetworkError> {
        let url = format!("{}/img/wn/{code}@2x.png", self.icon_base);

        let res = self.http.get(&url).send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(NetworkError::Status {
                status: status.as_u16(),
                body: String::new(),
            });
        }

        let bytes = res.bytes().await?;
        if !bytes.starts_with(PNG_SIGNATURE) {
            return Err(NetworkError::UnsupportedImage);
        }

        Ok(Arc::from(&bytes[..]))
    }
}

#[async_trait]
impl NetworkClient for OpenWeatherClient {
    async fn fetch_by_query(&self, query: &str) -> Result<WeatherRecord, NetworkError> {
        self.fetch_current(&[("q", query.to_string())]).await
    }

    async fn fetch_by_coordinates(
        &self,
        coordinates: Coordinates,
    ) -> Result<WeatherRecord, NetworkError> {
        self.fetch_current(&[
            ("lat", coordinates.latitude.to_string()),
            ("lon", coordinates.longitude.to_string()),
        ])
        .await
    }
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lon: f64,
    lat: f64,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    pressure: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    icon: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
    deg: f64,
}

/// Raw current-weather payload, before the icon is resolved.
#[derive(Debug, Deserialize)]
pub struct WeatherPayload {
    coord: OwCoord,
    main: OwMain,
    name: String,
    weather: Vec<OwWeather>,
    wind: OwWind,
    visibility: f64,
    #[serde(default)]
    dt: Option<i64>,
}

impl WeatherPayload {
    pub fn icon_codes(&self) -> impl Iterator<Item = &str> {
        self.weather.iter().map(|w| w.icon.as_str())
    }

    pub fn into_record(self, icon: Icon) -> WeatherRecord {
        let condition = self.weather.into_iter().find_map(|w| w.description);

        WeatherRecord {
            city: self.name,
            coordinates: Coordinates::new(self.coord.lat, self.coord.lon),
            temperature_kelvin: self.main.temp,
            pressure_hpa: self.main.pressure,
            humidity_percent: self.main.humidity,
            wind_speed_mps: self.wind.speed,
            wind_degrees: self.wind.deg,
            visibility_meters: self.visibility,
            icon,
            condition,
            observed_at: self.dt.and_then(unix_to_utc),
        }
    }
}

/// Decode an OpenWeatherMap current-weather JSON body.
pub fn decode_weather(body: &str) -> Result<WeatherPayload, NetworkError> {
    Ok(serde_json::from_str(body)?)
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
