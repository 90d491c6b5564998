//! Daily batch driver: enrich, optionally retrain, forecast

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::forecaster::{run_forecast, ForecastReport};
use crate::training::{run_training, TrainingReport};
use retail_data::enrich::run_enrichment;
use retail_data::EnrichReport;
use std::time::{Duration, Instant};
use tracing::info;

/// Outcome of one daily run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    pub enrich: EnrichReport,
    /// `None` when the run reused the saved model
    pub training: Option<TrainingReport>,
    pub forecast: ForecastReport,
    pub elapsed: Duration,
}

fn timed<T>(stage: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
    let started = Instant::now();
    info!(stage, "Stage started");
    let output = f()?;
    info!(
        stage,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Stage finished"
    );
    Ok(output)
}

/// Rebuild the enriched dataset
pub fn run_enrich(config: &PipelineConfig) -> Result<EnrichReport> {
    Ok(run_enrichment(&config.paths.enrich_paths())?)
}

/// Run every stage in order; the first failing stage aborts the rest
pub fn run_daily(config: &PipelineConfig, retrain: bool) -> Result<PipelineReport> {
    let started = Instant::now();
    info!(retrain, "Daily pipeline started");

    let enrich = timed("enrich", || run_enrich(config))?;
    let training = if retrain {
        Some(timed("train", || run_training(config))?)
    } else {
        None
    };
    let forecast = timed("forecast", || run_forecast(config))?;

    let elapsed = started.elapsed();
    info!(
        elapsed_ms = elapsed.as_millis() as u64,
        series = forecast.series,
        "Daily pipeline finished"
    );

    Ok(PipelineReport {
        enrich,
        training,
        forecast,
        elapsed,
    })
}
