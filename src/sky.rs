//! Sky condition labels for WMO weather codes

/// Label for codes outside the known table
pub const UNCLASSIFIED: &str = "unclassified";

/// Convert a WMO weather code to a human-readable sky condition.
///
/// Total: unknown codes map to [`UNCLASSIFIED`].
#[must_use]
pub fn sky_condition(code: i32) -> &'static str {
    match code {
        0 => "clear sky",
        1 => "mostly clear",
        2 => "partly cloudy",
        3 => "overcast",
        45 => "fog",
        61 => "light rain",
        63 => "moderate rain",
        65 => "heavy rain",
        80 => "light showers",
        95 => "thunderstorm",
        _ => UNCLASSIFIED,
    }
}
