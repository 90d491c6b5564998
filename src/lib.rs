//! # SmartStock
//!
//! Umbrella crate for the SmartStock workspace:
//!
//! - [`retail_math`]: lag/lead shifts, rolling windows and error metrics
//! - [`retail_data`]: raw sales loading, name joins and feature enrichment
//! - [`stock_forecast`]: model training, seven-day forecasts, alerts and summaries
//!
//! ## Example
//!
//! ```
//! use smart_stock_workspace::stock_forecast::{AlertLevel, AlertThresholds};
//!
//! let thresholds = AlertThresholds::default();
//! assert_eq!(thresholds.classify(12.0, 10.0), AlertLevel::Understock);
//! assert_eq!(thresholds.classify(4.0, 10.0), AlertLevel::Overstock);
//! ```

pub use retail_data;
pub use retail_math;
pub use stock_forecast;

/// Version of the workspace crates
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
