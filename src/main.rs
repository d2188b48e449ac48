use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use railtemp::history::{HistoryStore, export_json};
use railtemp::{
    FetchWindow, ProcessingPipeline, RailTempConfig, RailTempError, WeatherClient, locations,
    reconcile, telemetry,
};

#[derive(Parser)]
#[command(
    name = "railtemp",
    version,
    about = "Estimate rail temperatures from weather forecasts and keep a rolling history"
)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Location list, overrides paths.locations_file
    #[arg(long, value_name = "FILE")]
    locations: Option<PathBuf>,

    /// History store directory, overrides paths.history_dir
    #[arg(long, value_name = "DIR")]
    history: Option<PathBuf>,

    /// Also write the reconciled history as JSON
    #[arg(long, value_name = "FILE")]
    export: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = RailTempConfig::load_from_path(cli.config)?;
    if let Some(path) = cli.locations {
        config.paths.locations_file = path;
    }
    if let Some(path) = cli.history {
        config.paths.history_dir = path;
    }
    if cli.export.is_some() {
        config.paths.export_file = cli.export;
    }

    telemetry::init(&config.logging, cli.verbose)?;

    if let Err(e) = run(config).await {
        match e.downcast_ref::<RailTempError>() {
            Some(error) => eprintln!("Error: {}\n  {e:#}", error.user_message()),
            None => eprintln!("Error: {e:#}"),
        }
        std::process::exit(1);
    }
    Ok(())
}

async fn run(config: RailTempConfig) -> Result<()> {
    let reference_tz = config.reference_tz()?;

    let locations = locations::load_locations(&config.paths.locations_file).with_context(|| {
        format!(
            "Failed to load locations from {}",
            config.paths.locations_file.display()
        )
    })?;
    if locations.is_empty() {
        warn!("No locations to process");
        return Ok(());
    }

    let store = HistoryStore::open(&config.paths.history_dir).with_context(|| {
        format!(
            "Failed to open history store at {}",
            config.paths.history_dir.display()
        )
    })?;
    let prior = store.load().await.context("Failed to load history")?;
    let window = FetchWindow::for_run(prior.is_some(), &config.api);
    info!("Fetching {:?} for {} locations", window, locations.len());

    let client = WeatherClient::new(config.api.clone())?;
    let table = client.fetch_all(&locations, window).await;
    if table.is_empty() {
        warn!("No weather data fetched; history left unchanged");
        return Ok(());
    }

    let pipeline = ProcessingPipeline::new(config.model, reference_tz);
    let batch = pipeline.run(&table).context("Failed to process weather data")?;
    info!("Estimated {} rows", batch.len());

    let history = reconcile(prior.unwrap_or_default(), batch);
    store.save(&history).await.context("Failed to save history")?;

    if let Some(path) = &config.paths.export_file {
        export_json(history.records(), path)
            .with_context(|| format!("Failed to export history to {}", path.display()))?;
    }

    info!(
        "History holds {} rows across {} days",
        history.len(),
        history.dates().len()
    );
    Ok(())
}
