//! End-to-end processing of a raw observation table
//!
//! Steps, in order:
//! 1. normalise column names, parse timestamps, drop incomplete rows ([`crate::table`])
//! 2. sort by (location, timestamp)
//! 3. equilibrium temperature for every row
//! 4. thermal inertia per location, locations in parallel
//! 5. sky condition labels
//! 6. projection to [`TimeSeriesRecord`]

use chrono_tz::Tz;
use rayon::prelude::*;
use tracing::{info, instrument};

use crate::models::{TimeSeriesRecord, WeatherObservation};
use crate::sky::sky_condition;
use crate::table::{RawTable, normalize};
use crate::Result;
use crate::thermal::{
    InertiaSample, ModelCoefficients, apply_thermal_inertia, equilibrium_temperatures,
};

/// Turns raw weather tables into estimated rail temperature records
#[derive(Debug, Clone)]
pub struct ProcessingPipeline {
    coefficients: ModelCoefficients,
    reference_tz: Tz,
}

impl ProcessingPipeline {
    #[must_use]
    pub fn new(coefficients: ModelCoefficients, reference_tz: Tz) -> Self {
        Self {
            coefficients,
            reference_tz,
        }
    }

    /// Run every step over `table`.
    ///
    /// An empty result is returned, not an error, when no complete row
    /// survives. Only structural problems with the table fail.
    #[instrument(name = "process_table", skip_all, fields(rows = table.len()))]
    pub fn run(&self, table: &RawTable) -> Result<Vec<TimeSeriesRecord>> {
        let observations = normalize(table, self.reference_tz)?;
        if observations.is_empty() {
            info!("No complete observation rows to process");
            return Ok(Vec::new());
        }
        Ok(self.process(observations))
    }

    /// Steps 2-6 over already normalised observations
    #[must_use]
    pub fn process(&self, mut observations: Vec<WeatherObservation>) -> Vec<TimeSeriesRecord> {
        observations.sort_by(|a, b| {
            a.location_id
                .cmp(&b.location_id)
                .then_with(|| a.timestamp.cmp(&b.timestamp))
        });

        info!("Computing equilibrium temperatures for {} rows", observations.len());
        let equilibrium = equilibrium_temperatures(&observations, &self.coefficients);

        info!("Applying thermal inertia model");
        let estimates = self.estimate_per_location(&observations, &equilibrium);

        observations
            .into_iter()
            .zip(estimates)
            .map(|(observation, estimated_temperature)| TimeSeriesRecord {
                sky_condition: sky_condition(observation.weather_code).to_string(),
                location_id: observation.location_id,
                timestamp: observation.timestamp,
                latitude: observation.latitude,
                longitude: observation.longitude,
                estimated_temperature,
                air_temperature_c: observation.air_temperature_c,
                precipitation_mm: observation.precipitation_mm,
                wind_speed_kmh: observation.wind_speed_kmh,
                solar_radiation_wm2: observation.solar_radiation_wm2,
            })
            .collect()
    }

    /// Inertia estimates aligned with `observations`, which must be sorted.
    ///
    /// Each location is one contiguous run after sorting; runs go to rayon
    /// workers while each run stays sequential.
    fn estimate_per_location(
        &self,
        observations: &[WeatherObservation],
        equilibrium: &[f64],
    ) -> Vec<f64> {
        let samples: Vec<InertiaSample> = observations
            .iter()
            .zip(equilibrium)
            .map(|(observation, &equilibrium)| {
                InertiaSample::new(equilibrium, observation.air_temperature_c)
            })
            .collect();

        let mut groups = Vec::new();
        let mut start = 0;
        for run in observations.chunk_by(|a, b| a.location_id == b.location_id) {
            groups.push(&samples[start..start + run.len()]);
            start += run.len();
        }

        groups
            .into_par_iter()
            .map(|group| apply_thermal_inertia(group, &self.coefficients))
            .collect::<Vec<Vec<f64>>>()
            .into_iter()
            .flatten()
            .collect()
    }
}
