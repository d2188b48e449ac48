//! Raw observation tables and their normalisation
//!
//! Input providers hand over loosely typed, column-oriented tables whose
//! column names depend on the source (Open-Meteo calls air temperature
//! `temperature_2m`, older exports call it `temperature_celsius`). This module
//! maps those names onto the canonical schema, coerces cells, parses
//! timestamps in the reference timezone and drops incomplete rows.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use serde_json::Value;
use tracing::debug;

use crate::models::WeatherObservation;
use crate::{RailTempError, Result};

/// Column-oriented table of JSON cells; every column has the same length
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    columns: BTreeMap<String, Vec<Value>>,
    rows: usize,
}

impl RawTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from named columns, rejecting ragged input
    pub fn from_columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Vec<Value>)>,
        S: Into<String>,
    {
        let mut table = Self::new();
        for (name, values) in columns {
            let name = name.into();
            if !table.columns.is_empty() && values.len() != table.rows {
                return Err(RailTempError::schema(format!(
                    "column '{name}' has {} rows, expected {}",
                    values.len(),
                    table.rows
                )));
            }
            table.rows = values.len();
            table.columns.insert(name, values);
        }
        Ok(table)
    }

    /// Add a column repeating one value on every row
    #[must_use]
    pub fn with_constant_column(mut self, name: impl Into<String>, value: Value) -> Self {
        self.columns.insert(name.into(), vec![value; self.rows]);
        self
    }

    /// Stack tables from several sources; missing columns are null-padded
    #[must_use]
    pub fn concat(tables: impl IntoIterator<Item = RawTable>) -> Self {
        let tables: Vec<RawTable> = tables.into_iter().collect();
        let names: BTreeSet<String> = tables
            .iter()
            .flat_map(|table| table.columns.keys().cloned())
            .collect();

        let mut merged = Self::new();
        for name in names {
            let column = tables
                .iter()
                .flat_map(|table| match table.columns.get(&name) {
                    Some(values) => values.clone(),
                    None => vec![Value::Null; table.rows],
                })
                .collect();
            merged.columns.insert(name, column);
        }
        merged.rows = tables.iter().map(|table| table.rows).sum();
        merged
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// First column present under any of the canonical column's names
    fn resolve(&self, column: CanonicalColumn) -> Result<&[Value]> {
        column
            .aliases()
            .iter()
            .find_map(|alias| self.column(alias))
            .ok_or_else(|| RailTempError::missing_column(column.name()))
    }
}

/// Required fields of an observation row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanonicalColumn {
    LocationId,
    Timestamp,
    AirTemperature,
    Precipitation,
    WindSpeed,
    SolarRadiation,
    WeatherCode,
    Latitude,
    Longitude,
}

impl CanonicalColumn {
    #[must_use]
    pub fn name(self) -> &'static str {
        self.aliases()[0]
    }

    /// Accepted source names, canonical name first
    #[must_use]
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            CanonicalColumn::LocationId => &["location_id", "SB"],
            CanonicalColumn::Timestamp => &["timestamp", "datetime", "time"],
            CanonicalColumn::AirTemperature => {
                &["air_temperature_c", "temperature_celsius", "temperature_2m"]
            }
            CanonicalColumn::Precipitation => &["precipitation_mm", "precipitation"],
            CanonicalColumn::WindSpeed => &["wind_speed_kmh", "wind_speed_10m"],
            CanonicalColumn::SolarRadiation => &["solar_radiation_wm2", "direct_normal_irradiance"],
            CanonicalColumn::WeatherCode => &["weather_code"],
            CanonicalColumn::Latitude => &["latitude", "Lat Decimal"],
            CanonicalColumn::Longitude => &["longitude", "Long Decimal"],
        }
    }
}

/// Turn a raw table into complete observations.
///
/// Rows with any missing or unparseable required cell are dropped silently.
/// A non-empty table without some required column is a schema error.
pub fn normalize(table: &RawTable, reference_tz: Tz) -> Result<Vec<WeatherObservation>> {
    if table.is_empty() {
        return Ok(Vec::new());
    }

    let location_ids = table.resolve(CanonicalColumn::LocationId)?;
    let timestamps = table.resolve(CanonicalColumn::Timestamp)?;
    let air = table.resolve(CanonicalColumn::AirTemperature)?;
    let precipitation = table.resolve(CanonicalColumn::Precipitation)?;
    let wind = table.resolve(CanonicalColumn::WindSpeed)?;
    let solar = table.resolve(CanonicalColumn::SolarRadiation)?;
    let codes = table.resolve(CanonicalColumn::WeatherCode)?;
    let latitudes = table.resolve(CanonicalColumn::Latitude)?;
    let longitudes = table.resolve(CanonicalColumn::Longitude)?;

    let observations: Vec<WeatherObservation> = (0..table.len())
        .filter_map(|row| {
            Some(WeatherObservation {
                location_id: cell_as_id(&location_ids[row])?,
                timestamp: timestamps[row]
                    .as_str()
                    .and_then(|raw| parse_timestamp(raw, reference_tz))?,
                latitude: cell_as_f64(&latitudes[row])?,
                longitude: cell_as_f64(&longitudes[row])?,
                air_temperature_c: cell_as_f64(&air[row])?,
                precipitation_mm: cell_as_f64(&precipitation[row])?,
                wind_speed_kmh: cell_as_f64(&wind[row])?,
                solar_radiation_wm2: cell_as_f64(&solar[row])?,
                weather_code: cell_as_code(&codes[row])?,
            })
        })
        .collect();

    let dropped = table.len() - observations.len();
    if dropped > 0 {
        debug!("Dropped {dropped} incomplete rows out of {}", table.len());
    }
    Ok(observations)
}

/// Parse an observation timestamp.
///
/// Every result carries the `reference_tz` offset of its instant, so calendar
/// dates agree across sources. RFC 3339 values are converted; naive
/// wall-clock values are placed in `reference_tz`, where ambiguous hours take
/// the earlier instant and hours skipped by a DST jump yield `None`.
#[must_use]
pub fn parse_timestamp(raw: &str, reference_tz: Tz) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Some(with_offset.with_timezone(&reference_tz).fixed_offset());
    }

    const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];
    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())?;

    reference_tz
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.fixed_offset())
}

fn cell_as_f64(cell: &Value) -> Option<f64> {
    let value = match cell {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    value.is_finite().then_some(value)
}

fn cell_as_code(cell: &Value) -> Option<i32> {
    let value = cell_as_f64(cell)?;
    if value.fract() != 0.0 || value < f64::from(i32::MIN) || value > f64::from(i32::MAX) {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    Some(value as i32)
}

fn cell_as_id(cell: &Value) -> Option<String> {
    let id = match cell {
        Value::String(text) => text.trim().to_string(),
        Value::Number(number) => number.to_string(),
        _ => return None,
    };
    (!id.is_empty()).then_some(id)
}
