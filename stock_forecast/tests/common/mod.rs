//! Shared fixtures for the stock_forecast integration tests
#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use retail_data::utils::{generate_dataset, SyntheticSeries};
use retail_data::{CalendarFeatures, EnrichedRecord, Enricher, NameTables};
use stock_forecast::{AlertLevel, DayForecast, ForecastRecord, ModelParams};

pub fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

/// An enriched row with the given identity, date offset and sales
pub fn enriched(store_id: i64, product_id: i64, day: i64, sale: f64, stock: i64) -> EnrichedRecord {
    let dt = start_date() + Duration::days(day);
    let calendar = CalendarFeatures::from_date(dt);
    EnrichedRecord {
        city_id: 1,
        city_name: "Springfield".into(),
        store_id,
        company_name: "Acme".into(),
        branch_name: format!("Branch {}", store_id),
        product_id,
        product_name: format!("Product {}", product_id),
        dt,
        sale_amount: sale,
        stock_hour6_22_cnt: stock,
        discount: 1.0,
        holiday_flag: 0,
        activity_flag: 0,
        year: calendar.year,
        month: calendar.month,
        day: calendar.day,
        day_of_week: calendar.day_of_week,
        is_weekend: calendar.is_weekend,
        sales_lag_1: 0.0,
        sales_ma_7: 0.0,
    }
}

/// Enriched rows of noise-free linear series, produced by the enricher
pub fn enriched_history(series: &[SyntheticSeries], days: usize) -> Vec<EnrichedRecord> {
    let dataset = generate_dataset(series, start_date(), days, 0.0, 7);
    let tables = NameTables::new(dataset.cities, dataset.stores, dataset.products);
    let (records, _) = Enricher::new(tables).enrich(dataset.transactions).unwrap();
    records
}

pub fn linear_series(
    store_id: i64,
    product_id: i64,
    base: f64,
    trend: f64,
    stock: i64,
) -> SyntheticSeries {
    SyntheticSeries {
        city_id: 1,
        store_id,
        product_id,
        base_sales: base,
        trend,
        stock,
    }
}

/// Small, deterministic model settings for fast tests
pub fn quick_params() -> ModelParams {
    ModelParams {
        n_trees: 30,
        max_depth: 3,
        learning_rate: 0.3,
        row_subsample: 1.0,
        feature_subsample: 1.0,
        min_leaf_size: 1,
    }
}

/// A forecast row with one day per `(forecast, alert)` pair
pub fn forecast(
    store_id: i64,
    city: &str,
    branch: &str,
    product: &str,
    stock: i64,
    days: &[(f64, AlertLevel)],
) -> ForecastRecord {
    ForecastRecord {
        store_id,
        product_id: 1,
        city_name: city.to_string(),
        company_name: "Acme".to_string(),
        branch_name: branch.to_string(),
        product_name: product.to_string(),
        stock_hour6_22_cnt: stock,
        days: days
            .iter()
            .map(|&(forecast, alert)| DayForecast { forecast, alert })
            .collect(),
    }
}
