//! `RailTemp` - Rail temperature estimation from hourly weather
//!
//! This library turns hourly weather observations into estimated rail
//! temperatures for many track locations and keeps a rolling per-location
//! history across runs.

pub mod config;
pub mod error;
pub mod history;
pub mod locations;
pub mod models;
pub mod pipeline;
pub mod reconcile;
pub mod sky;
pub mod table;
pub mod telemetry;
pub mod thermal;
pub mod weather;

// Re-export core types for public API
pub use config::RailTempConfig;
pub use error::RailTempError;
pub use history::HistoryStore;
pub use models::{HistorySeries, Location, TimeSeriesRecord, WeatherObservation};
pub use pipeline::ProcessingPipeline;
pub use reconcile::reconcile;
pub use sky::sky_condition;
pub use table::RawTable;
pub use thermal::ModelCoefficients;
pub use weather::{FetchWindow, WeatherClient};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, RailTempError>;
