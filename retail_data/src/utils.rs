//! Synthetic retail history for demos and tests

use crate::loader::{self, CityRow, ProductRow, StoreRow};
use crate::{RawTransaction, Result};
use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;

/// Shape of one generated series
#[derive(Debug, Clone)]
pub struct SyntheticSeries {
    pub city_id: i64,
    pub store_id: i64,
    pub product_id: i64,
    /// Sales on the first day
    pub base_sales: f64,
    /// Daily sales increment
    pub trend: f64,
    /// Constant stock count reported every day
    pub stock: i64,
}

/// A complete raw dataset: transactions plus the three name tables
#[derive(Debug, Clone, Default)]
pub struct SyntheticDataset {
    pub transactions: Vec<RawTransaction>,
    pub cities: Vec<CityRow>,
    pub stores: Vec<StoreRow>,
    pub products: Vec<ProductRow>,
}

/// Generate `days` daily rows per series starting at `start`.
///
/// Sales follow `base + trend * day` with uniform noise of +/- `noise`,
/// clamped at zero. A fixed `seed` makes the output reproducible.
pub fn generate_history(
    series: &[SyntheticSeries],
    start: NaiveDate,
    days: usize,
    noise: f64,
    seed: u64,
) -> Vec<RawTransaction> {
    let mut random = StdRng::seed_from_u64(seed);
    let mut rows = Vec::with_capacity(series.len() * days);

    for s in series {
        for day in 0..days {
            let date = start + Duration::days(day as i64);
            let jitter = if noise > 0.0 {
                random.gen_range(-noise..=noise)
            } else {
                0.0
            };
            let sale = (s.base_sales + s.trend * day as f64 + jitter).max(0.0);

            rows.push(RawTransaction {
                city_id: s.city_id,
                store_id: s.store_id,
                product_id: s.product_id,
                dt: date.format("%Y-%m-%d").to_string(),
                sale_amount: (sale * 100.0).round() / 100.0,
                stock_hour6_22_cnt: s.stock,
                discount: if day % 7 == 5 { 0.9 } else { 1.0 },
                holiday_flag: i64::from(day % 7 == 6),
                activity_flag: i64::from(day % 10 == 0),
            });
        }
    }

    rows
}

/// Generate a dataset with names for every city, store and product in `series`
pub fn generate_dataset(
    series: &[SyntheticSeries],
    start: NaiveDate,
    days: usize,
    noise: f64,
    seed: u64,
) -> SyntheticDataset {
    let mut dataset = SyntheticDataset {
        transactions: generate_history(series, start, days, noise, seed),
        ..Default::default()
    };

    for s in series {
        if !dataset.cities.iter().any(|c| c.city_id == s.city_id) {
            dataset.cities.push(CityRow {
                city_id: s.city_id,
                city_name: format!("City {}", s.city_id),
            });
        }
        if !dataset.stores.iter().any(|st| st.store_id == s.store_id) {
            dataset.stores.push(StoreRow {
                store_id: s.store_id,
                company_name: format!("Fresh Mart {}", s.store_id),
                branch_name: format!("Branch {}", s.store_id),
            });
        }
        if !dataset.products.iter().any(|p| p.product_id == s.product_id) {
            dataset.products.push(ProductRow {
                product_id: s.product_id,
                product_name: format!("Product {}", s.product_id),
            });
        }
    }

    dataset
}

impl SyntheticDataset {
    /// Write the four raw CSV files
    pub fn write(
        &self,
        transactions: &Path,
        cities: &Path,
        stores: &Path,
        products: &Path,
    ) -> Result<()> {
        loader::write_transactions(transactions, &self.transactions)?;
        loader::write_csv(cities, &["city_id", "city_name"], &self.cities)?;
        loader::write_csv(
            stores,
            &["store_id", "company_name", "branch_name"],
            &self.stores,
        )?;
        loader::write_csv(products, &["product_id", "product_name"], &self.products)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_stores() -> Vec<SyntheticSeries> {
        vec![
            SyntheticSeries {
                city_id: 1,
                store_id: 10,
                product_id: 100,
                base_sales: 20.0,
                trend: 1.5,
                stock: 5,
            },
            SyntheticSeries {
                city_id: 1,
                store_id: 11,
                product_id: 100,
                base_sales: 30.0,
                trend: 2.0,
                stock: 5,
            },
        ]
    }

    #[test]
    fn test_generate_history_trend() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let rows = generate_history(&two_stores(), start, 20, 0.0, 7);

        assert_eq!(rows.len(), 40);
        assert_eq!(rows[0].dt, "2024-01-01");
        assert_eq!(rows[19].dt, "2024-01-20");
        assert_eq!(rows[19].sale_amount, 20.0 + 1.5 * 19.0);
        assert_eq!(rows[20].store_id, 11);
    }

    #[test]
    fn test_generate_is_reproducible() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let a = generate_history(&two_stores(), start, 10, 3.0, 42);
        let b = generate_history(&two_stores(), start, 10, 3.0, 42);
        assert_eq!(a, b);
        assert!(a.iter().all(|r| r.sale_amount >= 0.0));
    }

    #[test]
    fn test_dataset_names_are_unique() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let dataset = generate_dataset(&two_stores(), start, 3, 0.0, 1);
        assert_eq!(dataset.cities.len(), 1);
        assert_eq!(dataset.stores.len(), 2);
        assert_eq!(dataset.products.len(), 1);
    }
}
