//! Data models for the rail temperature pipeline
//!
//! This module contains the core domain models organized by concern:
//! - Location: Monitored track sections and their coordinates
//! - Observation: Normalised hourly weather rows
//! - Record: Output time series rows and the accumulated history

pub mod location;
pub mod observation;
pub mod record;

// Re-export all public types for convenient access
pub use location::Location;
pub use observation::WeatherObservation;
pub use record::{HistorySeries, OUTPUT_COLUMNS, TimeSeriesRecord};
