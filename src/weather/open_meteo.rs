//! `OpenMeteo` forecast API request and response structures

use reqwest::Url;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::FetchWindow;
use crate::models::Location;
use crate::table::RawTable;
use crate::{RailTempError, Result};

/// Forecast response from `OpenMeteo`; only the hourly block is used
#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub timezone: Option<String>,
    /// Variable name -> hourly values, `time` included; values may be null
    #[serde(default)]
    pub hourly: Option<Map<String, Value>>,
}

impl ForecastResponse {
    /// Convert the hourly block into a raw table tagged with `location`.
    ///
    /// Returns `None` when the response carries no hourly rows.
    pub fn into_table(self, location: &Location) -> Result<Option<RawTable>> {
        let Some(hourly) = self.hourly else {
            return Ok(None);
        };

        let mut columns = Vec::with_capacity(hourly.len());
        for (name, values) in hourly {
            match values {
                Value::Array(values) => columns.push((name, values)),
                other => {
                    return Err(RailTempError::api(format!(
                        "hourly variable '{name}' is not an array: {other}"
                    )));
                }
            }
        }

        let table = RawTable::from_columns(columns)?;
        if table.is_empty() {
            return Ok(None);
        }

        Ok(Some(
            table
                .with_constant_column("location_id", Value::from(location.id.clone()))
                .with_constant_column("latitude", Value::from(location.latitude))
                .with_constant_column("longitude", Value::from(location.longitude)),
        ))
    }
}

/// Build the forecast request URL for one location
pub fn forecast_url(
    base_url: &str,
    location: &Location,
    hourly_variables: &str,
    timezone: &str,
    window: FetchWindow,
) -> Result<Url> {
    let (window_key, days) = window.query_pair();
    let endpoint = format!("{}/forecast", base_url.trim_end_matches('/'));
    Url::parse_with_params(
        &endpoint,
        &[
            ("latitude", location.latitude.to_string()),
            ("longitude", location.longitude.to_string()),
            ("hourly", hourly_variables.to_string()),
            ("timezone", timezone.to_string()),
            (window_key, days.to_string()),
        ],
    )
    .map_err(|e| RailTempError::config(format!("Invalid weather API URL '{endpoint}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_forecast_url() {
        let location = Location::new("SB-1", -23.5, -46.25);
        let url = forecast_url(
            "https://api.open-meteo.com/v1/",
            &location,
            "temperature_2m,precipitation",
            "America/Sao_Paulo",
            FetchWindow::PastDays(7),
        )
        .unwrap();

        assert_eq!(url.path(), "/v1/forecast");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("latitude".to_string(), "-23.5".to_string())));
        let hourly = ("hourly".to_string(), "temperature_2m,precipitation".to_string());
        assert!(pairs.contains(&hourly));
        assert!(pairs.contains(&("timezone".to_string(), "America/Sao_Paulo".to_string())));
        assert!(pairs.contains(&("past_days".to_string(), "7".to_string())));
    }

    #[test]
    fn test_into_table_tags_location() {
        let response: ForecastResponse = serde_json::from_value(json!({
            "latitude": -23.5,
            "longitude": -46.625,
            "timezone": "America/Sao_Paulo",
            "hourly": {
                "time": ["2025-01-10T00:00", "2025-01-10T01:00"],
                "temperature_2m": [22.1, null],
                "precipitation": [0.0, 0.0],
                "weather_code": [0, 1],
                "wind_speed_10m": [3.2, 4.0],
                "direct_normal_irradiance": [0.0, 0.0]
            }
        }))
        .unwrap();

        let location = Location::new("SB-1", -23.55, -46.63);
        let table = response.into_table(&location).unwrap().unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.column("location_id").unwrap()[1], json!("SB-1"));
        assert_eq!(table.column("latitude").unwrap()[0], json!(-23.55));
        assert_eq!(table.column("temperature_2m").unwrap()[1], Value::Null);
    }

    #[test]
    fn test_missing_or_empty_hourly_is_none() {
        let location = Location::new("SB-1", 0.0, 0.0);
        let without: ForecastResponse =
            serde_json::from_value(json!({"latitude": 0.0, "longitude": 0.0})).unwrap();
        assert!(without.into_table(&location).unwrap().is_none());

        let empty: ForecastResponse = serde_json::from_value(
            json!({"latitude": 0.0, "longitude": 0.0, "hourly": {"time": []}}),
        )
        .unwrap();
        assert!(empty.into_table(&location).unwrap().is_none());
    }

    #[test]
    fn test_ragged_hourly_block_is_error() {
        let response: ForecastResponse = serde_json::from_value(json!({
            "latitude": 0.0,
            "longitude": 0.0,
            "hourly": {"time": ["2025-01-10T00:00"], "temperature_2m": [1.0, 2.0]}
        }))
        .unwrap();
        assert!(response.into_table(&Location::new("x", 0.0, 0.0)).is_err());
    }
}
