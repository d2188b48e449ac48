//! Location list loading
//!
//! The location file is a JSON array of objects exported from a
//! spreadsheet, so key names vary between exports. Ids are trimmed strings,
//! entries without an id or coordinates are skipped, and the first entry
//! wins when an id repeats.

use std::collections::HashSet;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::{debug, info, instrument, warn};

use crate::models::Location;
use crate::{RailTempError, Result};

const ID_KEYS: [&str; 3] = ["SB", "location_id", "id"];
const LATITUDE_KEYS: [&str; 3] = ["Mediana Latitude", "Lat Decimal", "latitude"];
const LONGITUDE_KEYS: [&str; 3] = ["Mediana Longitude", "Long Decimal", "longitude"];

/// Load and validate the location file
#[instrument(level = "debug")]
pub fn load_locations(path: &Path) -> Result<Vec<Location>> {
    let text = std::fs::read_to_string(path)?;
    let locations = parse_locations(&text)?;
    info!(
        "{} unique locations loaded from {}",
        locations.len(),
        path.display()
    );
    Ok(locations)
}

/// Parse location JSON text
pub fn parse_locations(text: &str) -> Result<Vec<Location>> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| RailTempError::validation(format!("Location file is not valid JSON: {e}")))?;
    let Value::Array(entries) = value else {
        return Err(RailTempError::validation(
            "Location file must contain a JSON array of objects",
        ));
    };

    let objects: Vec<&Map<String, Value>> = entries.iter().filter_map(Value::as_object).collect();
    for (label, keys) in [
        ("id", &ID_KEYS),
        ("latitude", &LATITUDE_KEYS),
        ("longitude", &LONGITUDE_KEYS),
    ] {
        let present = objects
            .iter()
            .any(|object| keys.iter().any(|key| object.contains_key(*key)));
        if !objects.is_empty() && !present {
            return Err(RailTempError::validation(format!(
                "Location file has no {label} field (expected one of: {})",
                keys.join(", ")
            )));
        }
    }

    let mut seen = HashSet::new();
    let mut locations = Vec::new();
    for object in objects {
        let Some(location) = location_from_object(object) else {
            debug!("Skipping incomplete location entry: {:?}", object);
            continue;
        };
        if !location.has_valid_coordinates() {
            warn!(
                "Skipping location {} with out-of-range coordinates {}",
                location.id,
                location.format_coordinates()
            );
            continue;
        }
        if seen.insert(location.id.clone()) {
            locations.push(location);
        } else {
            debug!("Ignoring duplicate location id {}", location.id);
        }
    }

    Ok(locations)
}

fn location_from_object(object: &Map<String, Value>) -> Option<Location> {
    let id = match first_present(object, &ID_KEYS)? {
        Value::String(text) => text.trim().to_string(),
        Value::Number(number) => number.to_string(),
        _ => return None,
    };
    if id.is_empty() {
        return None;
    }

    let latitude = as_coordinate(first_present(object, &LATITUDE_KEYS)?)?;
    let longitude = as_coordinate(first_present(object, &LONGITUDE_KEYS)?)?;
    Some(Location::new(id, latitude, longitude))
}

fn first_present<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find(|value| !value.is_null())
}

fn as_coordinate(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        // spreadsheet exports sometimes use a decimal comma
        Value::String(text) => text.trim().replace(',', ".").parse().ok(),
        _ => None,
    }
}
