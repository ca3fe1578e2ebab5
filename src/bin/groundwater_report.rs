//! Run one aggregation offline on a JSON request file
use clap::{Parser, ValueEnum};
use groundwater_insight::analysis::sensitivity::DEFAULT_COMPOSITE_THRESHOLD;
use groundwater_insight::models::{
    OverviewRequest, SensitivityRequest, StatusRequest, VerificationRequest,
};
use groundwater_insight::services::{
    ClassificationService, ObservationService, VerificationService,
};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    /// Daily table, geomap means and trend indicators
    Overview,
    /// Multi-year forecast verification
    Verification,
    /// Rainfall/drought sensitivity classification
    Sensitivity,
    /// Percentile status bands
    Status,
}

#[derive(Parser)]
#[command(name = "groundwater-report")]
#[command(about = "Aggregate groundwater observations and forecasts from a JSON file", long_about = None)]
struct Cli {
    /// Which aggregation to run
    #[arg(long, value_enum)]
    mode: Mode,

    /// JSON file holding the same request body the HTTP API accepts
    #[arg(long)]
    input: PathBuf,

    /// Write the result here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Gap below which a station is composite-type
    #[arg(long, env = "SENSITIVITY_THRESHOLD", default_value_t = DEFAULT_COMPOSITE_THRESHOLD)]
    sensitivity_threshold: f64,
}

fn read_request<T: DeserializeOwned>(path: &Path) -> Result<T, Box<dyn std::error::Error>> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let started = Instant::now();

    let json = match cli.mode {
        Mode::Overview => {
            let request: OverviewRequest = read_request(&cli.input)?;
            let result = ObservationService::new().build_overview(&request);
            serde_json::to_string_pretty(&result)?
        }
        Mode::Verification => {
            let request: VerificationRequest = read_request(&cli.input)?;
            let result = VerificationService::new().verify(&request)?;
            serde_json::to_string_pretty(&result)?
        }
        Mode::Sensitivity => {
            let request: SensitivityRequest = read_request(&cli.input)?;
            let service = ClassificationService::new(cli.sensitivity_threshold)?;
            serde_json::to_string_pretty(&service.classify_sensitivity(&request))?
        }
        Mode::Status => {
            let request: StatusRequest = read_request(&cli.input)?;
            let service = ClassificationService::new(cli.sensitivity_threshold)?;
            serde_json::to_string_pretty(&service.band_statuses(&request))?
        }
    };

    match &cli.output {
        Some(path) => {
            fs::write(path, &json)?;
            info!("Wrote {} bytes to {}", json.len(), path.display());
        }
        None => println!("{json}"),
    }

    info!("{:?} finished in {:?}", cli.mode, started.elapsed());
    Ok(())
}
