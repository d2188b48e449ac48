//! Output records and the accumulated history series

use std::collections::BTreeSet;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

/// One row of the persisted time series.
///
/// Field order is the canonical output column order.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TimeSeriesRecord {
    pub location_id: String,
    pub timestamp: DateTime<FixedOffset>,
    pub latitude: f64,
    pub longitude: f64,
    /// Estimated rail temperature in Celsius, rounded to 2 decimals
    pub estimated_temperature: f64,
    pub sky_condition: String,
    pub air_temperature_c: f64,
    pub precipitation_mm: f64,
    pub wind_speed_kmh: f64,
    pub solar_radiation_wm2: f64,
}

impl TimeSeriesRecord {
    /// Calendar date in the reference timezone the timestamp was normalised to
    #[must_use]
    pub fn local_date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

/// Canonical output column names, in order
pub const OUTPUT_COLUMNS: [&str; 10] = [
    "location_id",
    "timestamp",
    "latitude",
    "longitude",
    "estimated_temperature",
    "sky_condition",
    "air_temperature_c",
    "precipitation_mm",
    "wind_speed_kmh",
    "solar_radiation_wm2",
];

/// Records accumulated over repeated runs, sorted by location then timestamp
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct HistorySeries {
    records: Vec<TimeSeriesRecord>,
}

impl HistorySeries {
    /// Build a series, sorting the records by (location_id, timestamp)
    #[must_use]
    pub fn new(mut records: Vec<TimeSeriesRecord>) -> Self {
        sort_records(&mut records);
        Self { records }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn records(&self) -> &[TimeSeriesRecord] {
        &self.records
    }

    #[must_use]
    pub fn into_records(self) -> Vec<TimeSeriesRecord> {
        self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct calendar dates present in the series
    #[must_use]
    pub fn dates(&self) -> BTreeSet<NaiveDate> {
        self.records.iter().map(TimeSeriesRecord::local_date).collect()
    }
}

/// Stable sort by (location_id, timestamp)
fn sort_records(records: &mut [TimeSeriesRecord]) {
    records.sort_by(|a, b| {
        a.location_id
            .cmp(&b.location_id)
            .then_with(|| a.timestamp.cmp(&b.timestamp))
    });
}
