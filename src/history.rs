//! Persistent history store
//!
//! The whole [`HistorySeries`] is one postcard-encoded snapshot in a fjall
//! keyspace. Reconciliation needs both full snapshots in memory anyway, so
//! the store only ever loads or replaces the snapshot as a unit.

use std::fs;
use std::path::Path;

use fjall::Keyspace;
use serde::{Deserialize, Serialize};
use tokio::task;
use tracing::{debug, info, instrument};

use crate::models::{HistorySeries, TimeSeriesRecord};
use crate::{RailTempError, Result};

const SNAPSHOT_KEY: &[u8] = b"history";
const FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct StoredSnapshot {
    version: u32,
    saved_at: i64, // Unix timestamp (seconds)
    series: HistorySeries,
}

pub struct HistoryStore {
    store: Keyspace,
}

fn storage_error(context: &str, e: impl std::fmt::Display) -> RailTempError {
    RailTempError::storage(format!("{context}: {e}"))
}

impl HistoryStore {
    /// Open (or create) the store at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = fjall::Database::builder(path.as_ref())
            .open()
            .map_err(|e| storage_error("Failed to open history store", e))?;
        let store = db
            .keyspace("history", fjall::KeyspaceCreateOptions::default)
            .map_err(|e| storage_error("Failed to open history keyspace", e))?;
        Ok(HistoryStore { store })
    }

    /// Load the saved series, or `None` if nothing was saved yet
    #[instrument(name = "load_history", level = "debug", skip(self))]
    pub async fn load(&self) -> Result<Option<HistorySeries>> {
        let store = self.store.clone();
        let maybe_bytes = task::spawn_blocking(move || {
            store
                .get(SNAPSHOT_KEY)
                .map(|value| value.map(|bytes| bytes.to_vec()))
        })
        .await
        .map_err(|e| storage_error("History load task failed", e))?
        .map_err(|e| storage_error("Failed to read history snapshot", e))?;

        let Some(bytes) = maybe_bytes else {
            debug!("No history snapshot found");
            return Ok(None);
        };

        let snapshot: StoredSnapshot = postcard::from_bytes(&bytes)
            .map_err(|e| storage_error("Corrupt history snapshot", e))?;
        if snapshot.version != FORMAT_VERSION {
            return Err(RailTempError::storage(format!(
                "Unsupported history format version {}",
                snapshot.version
            )));
        }

        debug!(
            "Loaded {} history rows saved at {}",
            snapshot.series.len(),
            snapshot.saved_at
        );
        Ok(Some(snapshot.series))
    }

    /// Replace the saved series
    #[instrument(name = "save_history", level = "debug", skip_all, fields(rows = series.len()))]
    pub async fn save(&self, series: &HistorySeries) -> Result<()> {
        let snapshot = StoredSnapshot {
            version: FORMAT_VERSION,
            saved_at: chrono::Utc::now().timestamp(),
            series: series.clone(),
        };
        let bytes = postcard::to_stdvec(&snapshot)
            .map_err(|e| storage_error("Failed to encode history snapshot", e))?;

        let store = self.store.clone();
        task::spawn_blocking(move || store.insert(SNAPSHOT_KEY, bytes))
            .await
            .map_err(|e| storage_error("History save task failed", e))?
            .map_err(|e| storage_error("Failed to write history snapshot", e))?;

        info!("History saved with {} rows", series.len());
        Ok(())
    }
}

/// Write the series as a JSON array in canonical column order
pub fn export_json(records: &[TimeSeriesRecord], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(records)
        .map_err(|e| RailTempError::general(format!("Failed to serialise export: {e}")))?;
    fs::write(path, json)?;
    info!("Exported {} rows to {}", records.len(), path.display());
    Ok(())
}
