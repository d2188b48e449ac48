//! Thermal inertia recurrence
//!
//! The rail does not jump to its equilibrium temperature; each hour it keeps
//! a fraction of its previous temperature and moves the rest of the way
//! towards the new equilibrium:
//!
//! ```text
//! estimate[i] = round(previous * retention + equilibrium[i] * (1 - retention), 2)
//! previous    = estimate[i]
//! ```
//!
//! `previous` starts at the air temperature of the first sample, so the
//! output of any step depends on the whole ordered prefix of its location.
//! A sequence must therefore hold one location only, in timestamp order.

use super::ModelCoefficients;

/// Input to one step of the recurrence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InertiaSample {
    pub equilibrium_temperature: f64,
    pub air_temperature_c: f64,
}

impl InertiaSample {
    #[must_use]
    pub fn new(equilibrium_temperature: f64, air_temperature_c: f64) -> Self {
        Self {
            equilibrium_temperature,
            air_temperature_c,
        }
    }
}

/// Run the recurrence over one location's ordered samples.
///
/// Returns one estimate per sample; an empty input gives an empty output.
/// No state survives the call.
#[must_use]
pub fn apply_thermal_inertia(
    samples: &[InertiaSample],
    coefficients: &ModelCoefficients,
) -> Vec<f64> {
    let Some(first) = samples.first() else {
        return Vec::new();
    };
    let retention_factor = coefficients.retention_factor;
    let new_effects_factor = coefficients.new_effects_factor();

    samples
        .iter()
        .scan(first.air_temperature_c, |previous, sample| {
            let estimate = round_to_hundredths(
                *previous * retention_factor + sample.equilibrium_temperature * new_effects_factor,
            );
            *previous = estimate;
            Some(estimate)
        })
        .collect()
}

/// Round half away from zero to two decimal places
#[must_use]
pub fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
