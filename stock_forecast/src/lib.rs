//! # Stock Forecast
//!
//! Next-week demand forecasting and stock alerts for retail store/product series.
//!
//! ## Features
//!
//! - Gradient-boosted regression on lag and rolling-mean sales features
//! - Time-based train/test split with RMSE on the held-out week
//! - Seven-day autoregressive rollout per (store, product) series
//! - UNDERSTOCK / OVERSTOCK / OK alerts against the reported stock count
//! - Alert summaries and reorder suggestions, scoped by city and branch
//! - A daily batch driver and the `smart_stock` command line tool
//!
//! ## Pipeline
//!
//! The enriched dataset written by [`retail_data`] feeds training
//! ([`training::run_training`]), which persists a model and its label
//! encoders. Forecasting ([`forecaster::run_forecast`]) reloads both and
//! writes one row per series with `day_N_forecast` / `day_N_alert` columns.
//! [`summary::summarize`] and [`dashboard::Dashboard`] read that file back.
//!
//! ## Quick Start
//!
//! ```no_run
//! use stock_forecast::config::PipelineConfig;
//! use stock_forecast::dashboard::{AccessScope, Dashboard};
//! use stock_forecast::pipeline::run_daily;
//!
//! # fn main() -> stock_forecast::Result<()> {
//! let config = PipelineConfig::load(None)?;
//!
//! // Enrich, retrain and forecast
//! let report = run_daily(&config, true)?;
//! println!("forecast {} series", report.forecast.series);
//!
//! // Summaries for one branch manager
//! let dashboard = Dashboard::new(config);
//! let scope = AccessScope::manager("Springfield", "Downtown")?;
//! let summary = dashboard.summary(&scope)?;
//! println!("{} series at risk of stockout", summary.total_understock);
//! # Ok(())
//! # }
//! ```

pub mod alerts;
pub mod config;
pub mod dashboard;
pub mod encoding;
pub mod error;
pub mod features;
pub mod forecaster;
pub mod models;
pub mod pipeline;
pub mod records;
pub mod summary;
pub mod training;

// Re-export commonly used types
pub use crate::alerts::{AlertLevel, AlertThresholds};
pub use crate::config::{DataPaths, PipelineConfig};
pub use crate::error::{ForecastError, Result};
pub use crate::forecaster::Forecaster;
pub use crate::models::{GbdtRegressor, ModelParams, SalesRegressor};
pub use crate::records::{DayForecast, ForecastRecord};
pub use crate::summary::{summarize, AlertSummary, ScopeFilter};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
