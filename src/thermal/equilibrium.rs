//! Instantaneous equilibrium temperature of a rail under one hour of weather

use super::ModelCoefficients;
use crate::models::WeatherObservation;

/// Temperature the rail would reach under this observation, ignoring lag.
///
/// Rain overrides sun and wind: a wet rail sits a fixed offset above the air.
/// Otherwise the solar gain is capped at the configured ceiling and wind
/// cools linearly. NaN inputs propagate.
#[must_use]
pub fn equilibrium_temperature(
    observation: &WeatherObservation,
    coefficients: &ModelCoefficients,
) -> f64 {
    if observation.is_raining() {
        return observation.air_temperature_c + coefficients.rain_addition_celsius;
    }

    let solar_adjustment = (observation.solar_radiation_wm2
        * coefficients.radiation_to_celsius_factor)
        .min(coefficients.solar_adjustment_ceiling);
    let wind_adjustment = observation.wind_speed_kmh / coefficients.wind_adjustment_factor;

    observation.air_temperature_c + solar_adjustment - wind_adjustment
}

/// Equilibrium temperature for every observation, in input order
#[must_use]
pub fn equilibrium_temperatures(
    observations: &[WeatherObservation],
    coefficients: &ModelCoefficients,
) -> Vec<f64> {
    observations
        .iter()
        .map(|observation| equilibrium_temperature(observation, coefficients))
        .collect()
}
