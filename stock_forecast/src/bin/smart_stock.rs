//! Command line entry point for the stock forecasting pipeline.
//!
//! Usage:
//!   smart_stock [--config FILE] <COMMAND>
//!
//! Commands:
//!   enrich     Join raw sales with names and derive features
//!   train      Fit the model and label encoders on the enriched data
//!   forecast   Roll every series forward and write the alert file
//!   run        Daily driver: enrich, optionally retrain, forecast
//!   summary    Print the alert summary as JSON
//!   generate   Write a synthetic raw dataset

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use retail_data::utils::{generate_dataset, SyntheticSeries};
use std::path::PathBuf;
use std::process::ExitCode;
use stock_forecast::config::PipelineConfig;
use stock_forecast::forecaster::run_forecast;
use stock_forecast::pipeline::{run_daily, run_enrich};
use stock_forecast::records::read_forecasts;
use stock_forecast::summary::{summarize, ScopeFilter};
use stock_forecast::training::run_training;
use stock_forecast::{ForecastError, Result};
use tracing::{error, info};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Retail stock forecasting with understock/overstock alerts
#[derive(Parser, Debug)]
#[command(name = "smart_stock", version)]
struct Cli {
    /// TOML configuration file; defaults apply when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Join raw sales with names and derive features
    Enrich,
    /// Fit the model and label encoders on the enriched data
    Train,
    /// Roll every series forward and write the alert file
    Forecast,
    /// Daily driver: enrich, optionally retrain, forecast
    Run {
        /// Retrain before forecasting
        #[arg(long)]
        retrain: bool,
    },
    /// Print the alert summary as JSON
    Summary {
        /// Restrict to one city
        #[arg(long)]
        city: Option<String>,
        /// Restrict to one branch
        #[arg(long)]
        branch: Option<String>,
    },
    /// Write a synthetic raw dataset to the configured input paths
    Generate {
        #[arg(long, default_value = "3")]
        stores: i64,
        #[arg(long, default_value = "4")]
        products: i64,
        #[arg(long, default_value = "90")]
        days: usize,
        /// First date of the history (YYYY-MM-DD)
        #[arg(long, default_value = "2024-01-01")]
        start: NaiveDate,
        #[arg(long, default_value = "42")]
        seed: u64,
    },
}

fn init_tracing() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn generate(
    config: &PipelineConfig,
    stores: i64,
    products: i64,
    days: usize,
    start: NaiveDate,
    seed: u64,
) -> Result<()> {
    if stores <= 0 || products <= 0 || days == 0 {
        return Err(ForecastError::InvalidParameter(
            "stores, products and days must be positive".to_string(),
        ));
    }

    let series: Vec<SyntheticSeries> = (1..=stores)
        .flat_map(|store| {
            (1..=products).map(move |product| SyntheticSeries {
                city_id: (store + 1) / 2,
                store_id: store,
                product_id: product,
                base_sales: 5.0 * product as f64,
                trend: 0.1 * store as f64,
                stock: 10 * product,
            })
        })
        .collect();

    let dataset = generate_dataset(&series, start, days, 2.0, seed);
    let paths = &config.paths;
    dataset.write(
        &paths.raw_transactions,
        &paths.cities,
        &paths.stores,
        &paths.products,
    )?;
    info!(
        rows = dataset.transactions.len(),
        path = %paths.raw_transactions.display(),
        "Synthetic dataset written"
    );
    Ok(())
}

fn execute(cli: Cli) -> Result<()> {
    let config = PipelineConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Enrich => {
            run_enrich(&config)?;
        }
        Command::Train => {
            run_training(&config)?;
        }
        Command::Forecast => {
            run_forecast(&config)?;
        }
        Command::Run { retrain } => {
            run_daily(&config, retrain || config.retrain_daily)?;
        }
        Command::Summary { city, branch } => {
            let forecasts = read_forecasts(&config.paths.forecast)?;
            let summary = summarize(&forecasts, &ScopeFilter { city, branch });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Generate {
            stores,
            products,
            days,
            start,
            seed,
        } => generate(&config, stores, products, days, start, seed)?,
    }

    Ok(())
}

fn main() -> ExitCode {
    init_tracing();

    match execute(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
