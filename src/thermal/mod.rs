//! Thermal model for rail temperature estimation
//!
//! Two stages turn weather into a rail temperature:
//! - [`equilibrium`]: the temperature the rail would settle at under the
//!   current hour's weather, computed row by row
//! - [`inertia`]: an exponential smoothing recurrence over a location's
//!   ordered equilibrium temperatures that models thermal lag
//!
//! Both stages read their constants from an explicit [`ModelCoefficients`]
//! value rather than globals.

pub mod equilibrium;
pub mod inertia;

use serde::{Deserialize, Serialize};

use crate::RailTempError;

pub use equilibrium::{equilibrium_temperature, equilibrium_temperatures};
pub use inertia::{InertiaSample, apply_thermal_inertia, round_to_hundredths};

/// Immutable coefficients of the thermal model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelCoefficients {
    /// Degrees Celsius gained per W/m² of direct radiation
    pub radiation_to_celsius_factor: f64,
    /// Upper bound of the solar adjustment in Celsius
    pub solar_adjustment_ceiling: f64,
    /// Wind speed (km/h) that cools the rail by one degree
    pub wind_adjustment_factor: f64,
    /// Fixed offset over air temperature while it rains
    pub rain_addition_celsius: f64,
    /// Fraction of the previous estimate kept at each hourly step
    pub retention_factor: f64,
}

impl Default for ModelCoefficients {
    fn default() -> Self {
        Self {
            radiation_to_celsius_factor: 0.056,
            solar_adjustment_ceiling: 20.0,
            wind_adjustment_factor: 8.5,
            rain_addition_celsius: 1.5,
            retention_factor: 0.6,
        }
    }
}

impl ModelCoefficients {
    /// Weight given to the new equilibrium temperature at each step
    #[must_use]
    pub fn new_effects_factor(&self) -> f64 {
        1.0 - self.retention_factor
    }

    /// Check that the coefficients describe a usable model
    pub fn validate(&self) -> crate::Result<()> {
        if !(0.0..=1.0).contains(&self.retention_factor) {
            return Err(RailTempError::config(format!(
                "Retention factor must be within [0, 1], got {}",
                self.retention_factor
            )));
        }
        if !(self.wind_adjustment_factor > 0.0) {
            return Err(RailTempError::config(
                "Wind adjustment factor must be greater than zero",
            ));
        }
        if self.radiation_to_celsius_factor < 0.0 || self.solar_adjustment_ceiling < 0.0 {
            return Err(RailTempError::config(
                "Radiation factor and solar ceiling cannot be negative",
            ));
        }
        if !self.rain_addition_celsius.is_finite() {
            return Err(RailTempError::config("Rain addition must be a finite number"));
        }
        Ok(())
    }
}
