use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Span, in degrees, of the map region shown around a weather record.
pub const REGION_SPAN_DEGREES: f64 = 0.0225;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Opaque icon handle carried by a [`WeatherRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Icon {
    /// Raw PNG bytes as served by the icon endpoint.
    Image(Arc<[u8]>),
    /// Bundled fallback used when no icon could be downloaded.
    #[default]
    Placeholder,
}

impl Icon {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Icon::Placeholder)
    }
}

/// Decoded result of one successful fetch.
///
/// Records are never mutated after construction; the shared state swaps in a
/// new `Arc<WeatherRecord>` instead.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherRecord {
    pub city: String,
    pub coordinates: Coordinates,
    pub temperature_kelvin: f64,
    pub pressure_hpa: f64,
    pub humidity_percent: f64,
    pub wind_speed_mps: f64,
    pub wind_degrees: f64,
    pub visibility_meters: f64,
    pub icon: Icon,
    pub condition: Option<String>,
    pub observed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Span {
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

/// Map viewport derived from the current weather record.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MapRegion {
    pub center: Coordinates,
    pub span: Span,
}

impl MapRegion {
    /// Region centred on `record` with the fixed [`REGION_SPAN_DEGREES`] span.
    pub fn around(record: &WeatherRecord) -> Self {
        Self {
            center: record.coordinates,
            span: Span {
                latitude_delta: REGION_SPAN_DEGREES,
                longitude_delta: REGION_SPAN_DEGREES,
            },
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// The El Segundo sample observation.
    pub fn el_segundo() -> WeatherRecord {
        record("El Segundo", Coordinates::new(33.9192, -118.4165))
    }

    pub fn record(city: &str, coordinates: Coordinates) -> WeatherRecord {
        WeatherRecord {
            city: city.to_string(),
            coordinates,
            temperature_kelvin: 287.98,
            pressure_hpa: 1016.0,
            humidity_percent: 95.0,
            wind_speed_mps: 2.57,
            wind_degrees: 240.0,
            visibility_meters: 4828.0,
            icon: Icon::Placeholder,
            condition: Some("mist".to_string()),
            observed_at: None,
        }
    }
}
