//! CSV loading and writing for retail datasets

use crate::{DataError, EnrichedRecord, RawTransaction, Result, ENRICHED_COLUMNS};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs::{self, File};
use std::path::Path;

/// `city_id,city_name`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityRow {
    #[serde(deserialize_with = "de_integer")]
    pub city_id: i64,
    pub city_name: String,
}

/// `store_id,company_name,branch_name`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreRow {
    #[serde(deserialize_with = "de_integer")]
    pub store_id: i64,
    pub company_name: String,
    pub branch_name: String,
}

/// `product_id,product_name`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRow {
    #[serde(deserialize_with = "de_integer")]
    pub product_id: i64,
    pub product_name: String,
}

/// Parse an integer column, also accepting integral floats such as `"12.0"`.
///
/// Anything else is a hard error: the whole load fails.
pub(crate) fn de_integer<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_integer(&raw).ok_or_else(|| serde::de::Error::custom(format!("non-numeric id '{}'", raw)))
}

pub fn parse_integer(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    raw.parse::<i64>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && v.fract() == 0.0)
            .map(|v| v as i64)
    })
}

fn ensure_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(DataError::MissingFile(path.to_path_buf()));
    }
    Ok(())
}

/// Read every row of a headered CSV file into `T`
pub fn read_csv<T, P>(path: P) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    ensure_exists(path)?;

    let mut reader = csv::Reader::from_reader(File::open(path)?);
    let mut rows = Vec::new();
    for (i, row) in reader.deserialize().enumerate() {
        let row: T = row.map_err(|e| {
            DataError::InvalidData(format!("{} line {}: {}", path.display(), i + 2, e))
        })?;
        rows.push(row);
    }

    Ok(rows)
}

/// Write rows with a header, replacing any existing file.
///
/// `header` is written explicitly so that an empty dataset still produces a
/// well-formed file.
pub fn write_csv<T, P>(path: P, header: &[&str], rows: &[T]) -> Result<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(header)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

pub fn load_transactions<P: AsRef<Path>>(path: P) -> Result<Vec<RawTransaction>> {
    read_csv(path)
}

pub fn load_enriched<P: AsRef<Path>>(path: P) -> Result<Vec<EnrichedRecord>> {
    read_csv(path)
}

pub fn write_enriched<P: AsRef<Path>>(path: P, rows: &[EnrichedRecord]) -> Result<()> {
    write_csv(path, &ENRICHED_COLUMNS, rows)
}

pub const TRANSACTION_COLUMNS: [&str; 9] = [
    "city_id",
    "store_id",
    "product_id",
    "dt",
    "sale_amount",
    "stock_hour6_22_cnt",
    "discount",
    "holiday_flag",
    "activity_flag",
];

pub fn write_transactions<P: AsRef<Path>>(path: P, rows: &[RawTransaction]) -> Result<()> {
    write_csv(path, &TRANSACTION_COLUMNS, rows)
}
