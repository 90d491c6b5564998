//! Data enrichment: name joins, calendar features and history features

use crate::dates::parse_date;
use crate::features::{derive_grouped_features, sort_chronologically, FeatureWindows};
use crate::loader::{self, CityRow, ProductRow, StoreRow};
use crate::{CalendarFeatures, EnrichedRecord, RawTransaction, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Entity name lookups keyed by numeric id.
///
/// Lookups never fail: an unknown id yields a placeholder such as `Company_17`.
#[derive(Debug, Clone, Default)]
pub struct NameTables {
    cities: HashMap<i64, String>,
    stores: HashMap<i64, (String, String)>,
    products: HashMap<i64, String>,
}

impl NameTables {
    /// Build lookups; on duplicate ids the first row wins
    pub fn new(cities: Vec<CityRow>, stores: Vec<StoreRow>, products: Vec<ProductRow>) -> Self {
        let mut tables = Self::default();
        for row in cities {
            tables.cities.entry(row.city_id).or_insert(row.city_name);
        }
        for row in stores {
            tables
                .stores
                .entry(row.store_id)
                .or_insert((row.company_name, row.branch_name));
        }
        for row in products {
            tables.products.entry(row.product_id).or_insert(row.product_name);
        }
        tables
    }

    /// Load the three name tables from CSV
    pub fn load(paths: &EnrichPaths) -> Result<Self> {
        Ok(Self::new(
            loader::read_csv(&paths.cities)?,
            loader::read_csv(&paths.stores)?,
            loader::read_csv(&paths.products)?,
        ))
    }

    /// City name, or `None` when the id is unknown
    pub fn city(&self, city_id: i64) -> Option<&str> {
        self.cities.get(&city_id).map(String::as_str)
    }

    /// (company, branch), or `None` when the id is unknown
    pub fn store(&self, store_id: i64) -> Option<(&str, &str)> {
        self.stores
            .get(&store_id)
            .map(|(company, branch)| (company.as_str(), branch.as_str()))
    }

    /// Product name, or `None` when the id is unknown
    pub fn product(&self, product_id: i64) -> Option<&str> {
        self.products.get(&product_id).map(String::as_str)
    }
}

/// Placeholder name for an unmatched id
pub fn placeholder_name(prefix: &str, id: i64) -> String {
    format!("{}_{}", prefix, id)
}

/// File locations read and written by one enrichment run
#[derive(Debug, Clone)]
pub struct EnrichPaths {
    pub transactions: PathBuf,
    pub cities: PathBuf,
    pub stores: PathBuf,
    pub products: PathBuf,
    pub output: PathBuf,
}

/// Row accounting for one enrichment run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichReport {
    pub rows_read: usize,
    pub dropped_invalid_date: usize,
    pub placeholder_cities: usize,
    pub placeholder_stores: usize,
    pub placeholder_products: usize,
    pub dropped_insufficient_history: usize,
    pub rows_written: usize,
}

/// Joins raw transactions with names and derives the enriched feature set
#[derive(Debug, Clone)]
pub struct Enricher {
    tables: NameTables,
    windows: FeatureWindows,
}

impl Enricher {
    pub fn new(tables: NameTables) -> Self {
        Self {
            tables,
            windows: FeatureWindows::ENRICHMENT,
        }
    }

    /// Enrich a batch of raw transactions.
    ///
    /// Rows with unparseable dates are dropped, as are rows without a full lag
    /// and 7-observation history in their series. Output is sorted by
    /// (store_id, product_id, dt).
    pub fn enrich(&self, raw: Vec<RawTransaction>) -> Result<(Vec<EnrichedRecord>, EnrichReport)> {
        let mut report = EnrichReport {
            rows_read: raw.len(),
            ..Default::default()
        };

        let mut rows = Vec::with_capacity(raw.len());
        for tx in raw {
            let Some(date) = parse_date(&tx.dt) else {
                report.dropped_invalid_date += 1;
                continue;
            };
            rows.push(self.join(tx, date, &mut report));
        }

        sort_chronologically(&mut rows);
        let features = derive_grouped_features(&rows, self.windows)?;

        let before = rows.len();
        let enriched: Vec<EnrichedRecord> = rows
            .into_iter()
            .zip(features)
            .filter_map(|(mut row, f)| {
                row.sales_lag_1 = f.sales_lag_1?;
                row.sales_ma_7 = f.sales_ma_short?;
                Some(row)
            })
            .collect();
        report.dropped_insufficient_history = before - enriched.len();
        report.rows_written = enriched.len();

        Ok((enriched, report))
    }

    fn join(
        &self,
        tx: RawTransaction,
        date: chrono::NaiveDate,
        report: &mut EnrichReport,
    ) -> EnrichedRecord {
        let city_name = match self.tables.city(tx.city_id) {
            Some(name) => name.to_string(),
            None => {
                report.placeholder_cities += 1;
                placeholder_name("City", tx.city_id)
            }
        };
        let (company_name, branch_name) = match self.tables.store(tx.store_id) {
            Some((company, branch)) => (company.to_string(), branch.to_string()),
            None => {
                report.placeholder_stores += 1;
                (
                    placeholder_name("Company", tx.store_id),
                    placeholder_name("Branch", tx.store_id),
                )
            }
        };
        let product_name = match self.tables.product(tx.product_id) {
            Some(name) => name.to_string(),
            None => {
                report.placeholder_products += 1;
                placeholder_name("Product", tx.product_id)
            }
        };
        let calendar = CalendarFeatures::from_date(date);

        EnrichedRecord {
            city_id: tx.city_id,
            city_name,
            store_id: tx.store_id,
            company_name,
            branch_name,
            product_id: tx.product_id,
            product_name,
            dt: date,
            sale_amount: tx.sale_amount,
            stock_hour6_22_cnt: tx.stock_hour6_22_cnt,
            discount: tx.discount,
            holiday_flag: tx.holiday_flag,
            activity_flag: tx.activity_flag,
            year: calendar.year,
            month: calendar.month,
            day: calendar.day,
            day_of_week: calendar.day_of_week,
            is_weekend: calendar.is_weekend,
            sales_lag_1: 0.0,
            sales_ma_7: 0.0,
        }
    }
}

/// Load raw inputs, enrich them and overwrite the enriched dataset
pub fn run_enrichment(paths: &EnrichPaths) -> Result<EnrichReport> {
    info!(path = %paths.transactions.display(), "Loading raw retail data");
    let raw = loader::load_transactions(&paths.transactions)?;
    let tables = NameTables::load(paths)?;

    let (enriched, report) = Enricher::new(tables).enrich(raw)?;

    if report.dropped_invalid_date > 0 {
        warn!(rows = report.dropped_invalid_date, "Dropped rows with unparseable dates");
    }
    info!(
        cities = report.placeholder_cities,
        stores = report.placeholder_stores,
        products = report.placeholder_products,
        "Synthesized placeholder names"
    );
    debug!(
        rows = report.dropped_insufficient_history,
        "Dropped rows without lag/rolling history"
    );

    loader::write_enriched(&paths.output, &enriched)?;
    info!(
        rows = report.rows_written,
        path = %paths.output.display(),
        "Enrichment complete"
    );

    Ok(report)
}
