//! Alert aggregation over a forecast dataset

use crate::alerts::AlertLevel;
use crate::records::ForecastRecord;
use retail_math::round_to;
use serde::Serialize;
use std::collections::BTreeMap;

/// Length of the top understocked product and location lists
pub const TOP_UNDERSTOCK_LIMIT: usize = 10;
/// Length of the reorder list
pub const REORDER_LIMIT: usize = 20;

/// Exact-match restriction on city and branch; `None` matches anything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeFilter {
    pub city: Option<String>,
    pub branch: Option<String>,
}

impl ScopeFilter {
    pub fn matches(&self, record: &ForecastRecord) -> bool {
        record.matches(self.city.as_deref(), self.branch.as_deref())
    }

    /// Records inside the scope, in input order
    pub fn apply<'a>(&self, records: &'a [ForecastRecord]) -> Vec<&'a ForecastRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductCount {
    pub product_name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationCount {
    pub city_name: String,
    pub branch_name: String,
    pub count: usize,
}

/// Suggested extra stock for one series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReorderLine {
    pub store_id: i64,
    pub product_id: i64,
    pub city_name: String,
    pub branch_name: String,
    pub product_name: String,
    pub stock_hour6_22_cnt: i64,
    pub reorder_qty: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AlertSummary {
    pub total_rows: usize,
    pub total_understock: usize,
    pub total_overstock: usize,
    pub top_under_products: Vec<ProductCount>,
    pub top_under_stores: Vec<LocationCount>,
    pub reorder_list: Vec<ReorderLine>,
}

/// `max(0, max forecast - stock)`, rounded to two decimals
pub fn reorder_quantity(record: &ForecastRecord) -> f64 {
    let peak = record.max_forecast().unwrap_or(0.0);
    round_to(peak - record.stock_hour6_22_cnt as f64, 2).max(0.0)
}

/// Counts sorted descending; equal counts keep ascending key order
fn ranked<K: Ord>(counts: BTreeMap<K, usize>, limit: usize) -> Vec<(K, usize)> {
    let mut ranked: Vec<(K, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(limit);
    ranked
}

/// Summarize understock and overstock risk within a scope
pub fn summarize(records: &[ForecastRecord], filter: &ScopeFilter) -> AlertSummary {
    let scoped = filter.apply(records);
    let under: Vec<&ForecastRecord> = scoped
        .iter()
        .copied()
        .filter(|r| r.has_alert(AlertLevel::Understock))
        .collect();
    let total_overstock = scoped
        .iter()
        .filter(|r| r.has_alert(AlertLevel::Overstock))
        .count();

    let mut by_product: BTreeMap<&str, usize> = BTreeMap::new();
    let mut by_location: BTreeMap<(&str, &str), usize> = BTreeMap::new();
    for r in &under {
        *by_product.entry(r.product_name.as_str()).or_default() += 1;
        *by_location
            .entry((r.city_name.as_str(), r.branch_name.as_str()))
            .or_default() += 1;
    }

    let top_under_products = ranked(by_product, TOP_UNDERSTOCK_LIMIT)
        .into_iter()
        .map(|(name, count)| ProductCount {
            product_name: name.to_string(),
            count,
        })
        .collect();
    let top_under_stores = ranked(by_location, TOP_UNDERSTOCK_LIMIT)
        .into_iter()
        .map(|((city, branch), count)| LocationCount {
            city_name: city.to_string(),
            branch_name: branch.to_string(),
            count,
        })
        .collect();

    let mut reorder_list: Vec<ReorderLine> = scoped
        .iter()
        .map(|r| ReorderLine {
            store_id: r.store_id,
            product_id: r.product_id,
            city_name: r.city_name.clone(),
            branch_name: r.branch_name.clone(),
            product_name: r.product_name.clone(),
            stock_hour6_22_cnt: r.stock_hour6_22_cnt,
            reorder_qty: reorder_quantity(r),
        })
        .filter(|line| line.reorder_qty > 0.0)
        .collect();
    reorder_list.sort_by(|a, b| b.reorder_qty.total_cmp(&a.reorder_qty));
    reorder_list.truncate(REORDER_LIMIT);

    AlertSummary {
        total_rows: scoped.len(),
        total_understock: under.len(),
        total_overstock,
        top_under_products,
        top_under_stores,
        reorder_list,
    }
}
