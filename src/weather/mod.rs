//! Weather API client for `OpenMeteo` integration
//!
//! Fetches hourly weather for many locations concurrently, with bounded
//! parallelism, request timeouts and retries on transient failures. A
//! location that fails is logged and skipped; it never aborts the batch.

pub mod open_meteo;

use std::time::{Duration, Instant};

use futures::{StreamExt, stream};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use tracing::{debug, info, instrument, warn};

use crate::config::ApiConfig;
use crate::models::Location;
use crate::table::RawTable;
use crate::{RailTempError, Result};

use open_meteo::{ForecastResponse, forecast_url};

/// How far back or ahead to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchWindow {
    /// Recent history, used to seed an empty store
    PastDays(u32),
    /// Upcoming forecast, used on refresh runs
    ForecastDays(u32),
}

impl FetchWindow {
    /// Seed the history on the first run, refresh the forecast afterwards
    #[must_use]
    pub fn for_run(history_exists: bool, api: &ApiConfig) -> Self {
        if history_exists {
            FetchWindow::ForecastDays(api.forecast_days)
        } else {
            FetchWindow::PastDays(api.past_days)
        }
    }

    fn query_pair(self) -> (&'static str, u32) {
        match self {
            FetchWindow::PastDays(days) => ("past_days", days),
            FetchWindow::ForecastDays(days) => ("forecast_days", days),
        }
    }
}

/// Weather API client for `OpenMeteo`
pub struct WeatherClient {
    client: ClientWithMiddleware,
    config: ApiConfig,
}

impl WeatherClient {
    /// Create a new weather API client
    pub fn new(config: ApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("railtemp/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RailTempError::api(format!("Failed to create HTTP client: {e}")))?;

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(http)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self { client, config })
    }

    /// Fetch every location, at most `max_workers` at a time.
    ///
    /// The result stacks all successful responses; it is empty when none
    /// succeeded.
    #[instrument(skip_all, fields(locations = locations.len(), window = ?window))]
    pub async fn fetch_all(&self, locations: &[Location], window: FetchWindow) -> RawTable {
        let start_time = Instant::now();

        let tables: Vec<RawTable> = stream::iter(locations)
            .map(|location| async move { (location, self.fetch_location(location, window).await) })
            .buffer_unordered(self.config.max_workers)
            .filter_map(|(location, result)| async move {
                match result {
                    Ok(Some(table)) => Some(table),
                    Ok(None) => {
                        warn!("No hourly data returned for {}", location.id);
                        None
                    }
                    Err(e) => {
                        warn!("Weather request failed for {}: {}", location.id, e);
                        None
                    }
                }
            })
            .collect()
            .await;

        info!(
            "Fetched weather for {}/{} locations in {:.3}s",
            tables.len(),
            locations.len(),
            start_time.elapsed().as_secs_f64()
        );
        RawTable::concat(tables)
    }

    /// Fetch hourly weather for one location
    #[instrument(skip(self), fields(location = %location.id))]
    pub async fn fetch_location(
        &self,
        location: &Location,
        window: FetchWindow,
    ) -> Result<Option<RawTable>> {
        let url = forecast_url(
            &self.config.base_url,
            location,
            &self.config.hourly_variables,
            &self.config.timezone,
            window,
        )?;
        debug!("OpenMeteo API request URL: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| RailTempError::api(format!("Network error: {e}")))?
            .error_for_status()
            .map_err(|e| RailTempError::api(format!("Request rejected: {e}")))?;

        let forecast: ForecastResponse = response.json().await.map_err(|e| {
            RailTempError::api(format!("Failed to parse OpenMeteo forecast response: {e}"))
        })?;

        if let Some(timezone) = &forecast.timezone {
            if timezone != &self.config.timezone {
                warn!(
                    "API answered in timezone {} instead of {}",
                    timezone, self.config.timezone
                );
            }
        }

        forecast.into_table(location)
    }
}
