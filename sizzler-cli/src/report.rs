use sizzler_core::{
    Icon, MapRegion, WeatherRecord,
    format::{
        humidity_string, pressure_string, temperature_string, visibility_string,
        wind_degrees_string, wind_speed_string,
    },
};

/// Multi-line, human-readable report for one record.
pub fn render(record: &WeatherRecord, region: &MapRegion) -> String {
    let mut out = String::new();

    out.push_str(&format!("{}\n", record.city));
    if let Some(condition) = &record.condition {
        out.push_str(&format!("  condition:   {condition}\n"));
    }
    if let Some(at) = record.observed_at {
        out.push_str(&format!("  observed:    {}\n", at.format("%Y-%m-%d %H:%M UTC")));
    }
    out.push_str(&format!("  temperature: {}\n", temperature_string(record)));
    out.push_str(&format!("  humidity:    {}\n", humidity_string(record)));
    out.push_str(&format!("  pressure:    {}\n", pressure_string(record)));
    out.push_str(&format!(
        "  wind:        {} at {}\n",
        wind_speed_string(record),
        wind_degrees_string(record)
    ));
    out.push_str(&format!("  visibility:  {}\n", visibility_string(record)));
    out.push_str(&format!("  icon:        {}\n", icon_label(&record.icon)));
    out.push_str(&format!(
        "  map:         {} (span {}° x {}°)",
        region.center, region.span.latitude_delta, region.span.longitude_delta
    ));

    out
}

/// One-line form used by `watch`.
pub fn summary(record: &WeatherRecord) -> String {
    format!(
        "{}: {}, {} humidity, wind {}",
        record.city,
        temperature_string(record),
        humidity_string(record),
        wind_speed_string(record)
    )
}

fn icon_label(icon: &Icon) -> String {
    match icon {
        Icon::Image(bytes) => format!("downloaded ({} bytes)", bytes.len()),
        Icon::Placeholder => "placeholder".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sizzler_core::Coordinates;

    fn sample() -> WeatherRecord {
        WeatherRecord {
            city: "El Segundo".into(),
            coordinates: Coordinates::new(33.9192, -118.4165),
            temperature_kelvin: 287.98,
            pressure_hpa: 1016.0,
            humidity_percent: 95.0,
            wind_speed_mps: 2.57,
            wind_degrees: 240.0,
            visibility_meters: 4828.0,
            icon: Icon::Placeholder,
            condition: Some("mist".into()),
            observed_at: chrono::DateTime::from_timestamp(1684250000, 0),
        }
    }

    #[test]
    fn render_includes_every_formatted_field() {
        let record = sample();
        let text = render(&record, &MapRegion::around(&record));

        assert!(text.starts_with("El Segundo\n"));
        assert!(text.contains("condition:   mist"));
        assert!(text.contains("observed:    2023-05-16 15:13 UTC"));
        assert!(text.contains("14.83ºC"));
        assert!(text.contains("95.00%"));
        assert!(text.contains("1016.00 hPa"));
        assert!(text.contains("2.57 m/s at 240.00º"));
        assert!(text.contains("4828.00 m"));
        assert!(text.contains("icon:        placeholder"));
        assert!(text.contains("33.9192, -118.4165 (span 0.0225° x 0.0225°)"));
    }

    #[test]
    fn summary_is_single_line() {
        let line = summary(&sample());
        assert_eq!(line, "El Segundo: 14.83ºC, 95.00% humidity, wind 2.57 m/s");
    }
}
