//! Hourly weather observation for one location

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// One complete hourly weather row, already normalised and validated
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeatherObservation {
    /// Owning location id
    pub location_id: String,
    /// Observation hour, carrying the reference timezone offset
    pub timestamp: DateTime<FixedOffset>,
    /// Latitude of the owning location
    pub latitude: f64,
    /// Longitude of the owning location
    pub longitude: f64,
    /// Air temperature at 2 m in Celsius
    pub air_temperature_c: f64,
    /// Precipitation in mm
    pub precipitation_mm: f64,
    /// Wind speed at 10 m in km/h
    pub wind_speed_kmh: f64,
    /// Direct normal irradiance in W/m²
    pub solar_radiation_wm2: f64,
    /// WMO weather code
    pub weather_code: i32,
}

impl WeatherObservation {
    #[must_use]
    pub fn is_raining(&self) -> bool {
        self.precipitation_mm > 0.0
    }
}
