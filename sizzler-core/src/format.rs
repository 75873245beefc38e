//! Display strings derived from a [`WeatherRecord`].
//!
//! All values are rendered with two decimals, rounded from the exact binary
//! value the way `printf("%.2f")` does. Exact ties go half-to-even.

use crate::model::WeatherRecord;

const KELVIN_OFFSET: f64 = 273.15;

pub fn kelvin_to_celsius(kelvin: f64) -> f64 {
    kelvin - KELVIN_OFFSET
}

/// Render `value` with exactly two decimals. Negative zero renders as `0.00`.
pub fn two_decimals(value: f64) -> String {
    let rendered = format!("{value:.2}");
    if rendered == "-0.00" {
        return "0.00".to_string();
    }
    rendered
}

pub fn temperature_string(record: &WeatherRecord) -> String {
    format!("{}ºC", two_decimals(kelvin_to_celsius(record.temperature_kelvin)))
}

pub fn humidity_string(record: &WeatherRecord) -> String {
    format!("{}%", two_decimals(record.humidity_percent))
}

pub fn pressure_string(record: &WeatherRecord) -> String {
    format!("{} hPa", two_decimals(record.pressure_hpa))
}

pub fn wind_speed_string(record: &WeatherRecord) -> String {
    format!("{} m/s", two_decimals(record.wind_speed_mps))
}

pub fn wind_degrees_string(record: &WeatherRecord) -> String {
    format!("{}º", two_decimals(record.wind_degrees))
}

pub fn visibility_string(record: &WeatherRecord) -> String {
    format!("{} m", two_decimals(record.visibility_meters))
}
