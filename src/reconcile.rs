//! Merge freshly computed records into the accumulated history
//!
//! A run recomputes whole calendar days. Any day present in the new batch
//! replaces that day in the history outright, across every location; days
//! the batch does not touch are carried over unchanged. Days are calendar
//! dates in the reference timezone, whose offset every timestamp carries.

use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::debug;

use crate::models::{HistorySeries, TimeSeriesRecord};

/// Replace every day of `prior` that `new_batch` covers, then sort.
///
/// Re-running with the same batch against the result gives the same series.
#[must_use]
pub fn reconcile(prior: HistorySeries, new_batch: Vec<TimeSeriesRecord>) -> HistorySeries {
    let new_dates: HashSet<NaiveDate> =
        new_batch.iter().map(TimeSeriesRecord::local_date).collect();

    let prior_len = prior.len();
    let mut records: Vec<TimeSeriesRecord> = prior
        .into_records()
        .into_iter()
        .filter(|record| !new_dates.contains(&record.local_date()))
        .collect();

    debug!(
        "Purged {} stale history rows across {} refreshed dates",
        prior_len - records.len(),
        new_dates.len()
    );

    records.extend(new_batch);
    HistorySeries::new(records)
}
