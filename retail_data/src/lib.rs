//! # Retail Data
//!
//! `retail_data` holds the point-of-sale record types and everything needed to
//! turn raw daily transactions into the enriched per-series dataset consumed by
//! model training and forecasting.
//!
//! - **Loading**: typed CSV readers and writers for transactions, name tables
//!   and the enriched dataset
//! - **Features**: one shared derivation of lag and rolling-mean features per
//!   (store, product) series
//! - **Enrichment**: name joins with placeholder synthesis, calendar features,
//!   chronological feature computation
//!
//! ## Usage Example
//!
//! ```no_run
//! use retail_data::enrich::{run_enrichment, EnrichPaths};
//!
//! let paths = EnrichPaths {
//!     transactions: "data/cleaned_retail_data.csv".into(),
//!     cities: "data/cities.csv".into(),
//!     stores: "data/stores.csv".into(),
//!     products: "data/products.csv".into(),
//!     output: "data/cleaned_retail_data_with_names.csv".into(),
//! };
//! let report = run_enrichment(&paths).unwrap();
//! println!("wrote {} rows", report.rows_written);
//! ```

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

pub mod dates;
pub mod enrich;
pub mod features;
pub mod loader;
pub mod utils;

pub use enrich::{EnrichReport, Enricher, NameTables};
pub use features::{derive_grouped_features, FeatureWindows, SeriesFeatures, SeriesRow};

/// Errors that can occur while loading or enriching retail data
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Input file not found: {0}")]
    MissingFile(PathBuf),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Feature calculation error: {0}")]
    Math(#[from] retail_math::MathError),
}

/// Result type for data operations
pub type Result<T> = std::result::Result<T, DataError>;

/// Identity of one sales series
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SeriesKey {
    pub store_id: i64,
    pub product_id: i64,
}

impl SeriesKey {
    pub fn new(store_id: i64, product_id: i64) -> Self {
        Self {
            store_id,
            product_id,
        }
    }
}

/// One raw point-of-sale row as stored on disk.
///
/// The date stays textual here; rows whose date cannot be parsed are dropped
/// during enrichment rather than failing the load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTransaction {
    #[serde(deserialize_with = "loader::de_integer")]
    pub city_id: i64,
    #[serde(deserialize_with = "loader::de_integer")]
    pub store_id: i64,
    #[serde(deserialize_with = "loader::de_integer")]
    pub product_id: i64,
    pub dt: String,
    pub sale_amount: f64,
    #[serde(deserialize_with = "loader::de_integer")]
    pub stock_hour6_22_cnt: i64,
    pub discount: f64,
    #[serde(deserialize_with = "loader::de_integer")]
    pub holiday_flag: i64,
    #[serde(deserialize_with = "loader::de_integer")]
    pub activity_flag: i64,
}

/// Calendar features of a sales date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarFeatures {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    /// Monday = 0 .. Sunday = 6
    pub day_of_week: u32,
    pub is_weekend: u8,
}

impl CalendarFeatures {
    pub fn from_date(date: NaiveDate) -> Self {
        let weekday = date.weekday();
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
            day_of_week: weekday.num_days_from_monday(),
            is_weekend: u8::from(matches!(weekday, Weekday::Sat | Weekday::Sun)),
        }
    }
}

/// Column order of the enriched dataset
pub const ENRICHED_COLUMNS: [&str; 20] = [
    "city_id",
    "city_name",
    "store_id",
    "company_name",
    "branch_name",
    "product_id",
    "product_name",
    "dt",
    "sale_amount",
    "stock_hour6_22_cnt",
    "discount",
    "holiday_flag",
    "activity_flag",
    "year",
    "month",
    "day",
    "day_of_week",
    "is_weekend",
    "sales_lag_1",
    "sales_ma_7",
];

/// A transaction joined with entity names, calendar and history features.
///
/// Field order is the on-disk column order, see [`ENRICHED_COLUMNS`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    #[serde(deserialize_with = "loader::de_integer")]
    pub city_id: i64,
    pub city_name: String,
    #[serde(deserialize_with = "loader::de_integer")]
    pub store_id: i64,
    pub company_name: String,
    pub branch_name: String,
    #[serde(deserialize_with = "loader::de_integer")]
    pub product_id: i64,
    pub product_name: String,
    #[serde(deserialize_with = "dates::de_date", serialize_with = "dates::ser_date")]
    pub dt: NaiveDate,
    pub sale_amount: f64,
    #[serde(deserialize_with = "loader::de_integer")]
    pub stock_hour6_22_cnt: i64,
    pub discount: f64,
    #[serde(deserialize_with = "loader::de_integer")]
    pub holiday_flag: i64,
    #[serde(deserialize_with = "loader::de_integer")]
    pub activity_flag: i64,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub day_of_week: u32,
    pub is_weekend: u8,
    pub sales_lag_1: f64,
    pub sales_ma_7: f64,
}

impl EnrichedRecord {
    pub fn series_key(&self) -> SeriesKey {
        SeriesKey::new(self.store_id, self.product_id)
    }

    pub fn calendar(&self) -> CalendarFeatures {
        CalendarFeatures {
            year: self.year,
            month: self.month,
            day: self.day,
            day_of_week: self.day_of_week,
            is_weekend: self.is_weekend,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calendar_features() {
        // 2024-03-09 is a Saturday
        let saturday = CalendarFeatures::from_date(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        assert_eq!(saturday.day_of_week, 5);
        assert_eq!(saturday.is_weekend, 1);
        assert_eq!((saturday.year, saturday.month, saturday.day), (2024, 3, 9));

        let monday = CalendarFeatures::from_date(NaiveDate::from_ymd_opt(2024, 3, 11).unwrap());
        assert_eq!(monday.day_of_week, 0);
        assert_eq!(monday.is_weekend, 0);
    }

    #[test]
    fn test_series_key_ordering() {
        let mut keys = vec![
            SeriesKey::new(2, 1),
            SeriesKey::new(1, 9),
            SeriesKey::new(1, 3),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                SeriesKey::new(1, 3),
                SeriesKey::new(1, 9),
                SeriesKey::new(2, 1)
            ]
        );
    }
}
