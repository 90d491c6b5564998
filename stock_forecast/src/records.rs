//! The forecast dataset: one row per series with per-day forecast and alert

use crate::alerts::AlertLevel;
use crate::error::{ForecastError, Result};
use retail_data::loader::parse_integer;
use retail_data::{DataError, SeriesKey};
use serde::Serialize;
use std::fs::{self, File};
use std::path::Path;

/// Leading columns of every forecast row
pub const IDENTITY_COLUMNS: [&str; 7] = [
    "store_id",
    "product_id",
    "city_name",
    "company_name",
    "branch_name",
    "product_name",
    "stock_hour6_22_cnt",
];

/// Forecast and alert of one future day
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DayForecast {
    pub forecast: f64,
    pub alert: AlertLevel,
}

/// Rollout result of one series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastRecord {
    pub store_id: i64,
    pub product_id: i64,
    pub city_name: String,
    pub company_name: String,
    pub branch_name: String,
    pub product_name: String,
    /// Stock count at the anchor date
    pub stock_hour6_22_cnt: i64,
    pub days: Vec<DayForecast>,
}

impl ForecastRecord {
    pub fn series_key(&self) -> SeriesKey {
        SeriesKey::new(self.store_id, self.product_id)
    }

    /// Whether any day carries `level`
    pub fn has_alert(&self, level: AlertLevel) -> bool {
        self.days.iter().any(|d| d.alert == level)
    }

    /// Largest daily forecast over the horizon
    pub fn max_forecast(&self) -> Option<f64> {
        self.days.iter().map(|d| d.forecast).reduce(f64::max)
    }

    /// Scope match on exact city and branch names; `None` matches anything
    pub fn matches(&self, city: Option<&str>, branch: Option<&str>) -> bool {
        city.map_or(true, |c| self.city_name == c) && branch.map_or(true, |b| self.branch_name == b)
    }
}

/// `store_id, ..., stock_hour6_22_cnt, day_1_forecast, day_1_alert, ...`
pub fn forecast_header(horizon: usize) -> Vec<String> {
    let mut header: Vec<String> = IDENTITY_COLUMNS.iter().map(|c| c.to_string()).collect();
    for day in 1..=horizon {
        header.push(format!("day_{}_forecast", day));
        header.push(format!("day_{}_alert", day));
    }
    header
}

/// Overwrite the forecast dataset
pub fn write_forecasts<P: AsRef<Path>>(path: P, records: &[ForecastRecord], horizon: usize) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(forecast_header(horizon))?;
    for record in records {
        if record.days.len() != horizon {
            return Err(ForecastError::ValidationError(format!(
                "Series ({}, {}) has {} forecast days, expected {}",
                record.store_id,
                record.product_id,
                record.days.len(),
                horizon
            )));
        }

        let mut row = vec![
            record.store_id.to_string(),
            record.product_id.to_string(),
            record.city_name.clone(),
            record.company_name.clone(),
            record.branch_name.clone(),
            record.product_name.clone(),
            record.stock_hour6_22_cnt.to_string(),
        ];
        for day in &record.days {
            row.push(day.forecast.to_string());
            row.push(day.alert.to_string());
        }
        writer.write_record(&row)?;
    }
    writer.flush()?;

    Ok(())
}

fn column(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers.iter().position(|h| h == name).ok_or_else(|| {
        ForecastError::ValidationError(format!("Forecast file lacks column '{}'", name))
    })
}

/// Read a forecast dataset; the horizon is taken from its `day_N_*` columns
pub fn read_forecasts<P: AsRef<Path>>(path: P) -> Result<Vec<ForecastRecord>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(DataError::MissingFile(path.to_path_buf()).into());
    }

    let mut reader = csv::Reader::from_reader(File::open(path)?);
    let headers = reader.headers()?.clone();

    let identity = IDENTITY_COLUMNS
        .iter()
        .map(|name| column(&headers, name))
        .collect::<Result<Vec<_>>>()?;

    let mut day_columns = Vec::new();
    for day in 1.. {
        let forecast = headers
            .iter()
            .position(|h| h == format!("day_{}_forecast", day));
        let alert = headers.iter().position(|h| h == format!("day_{}_alert", day));
        match (forecast, alert) {
            (Some(f), Some(a)) => day_columns.push((f, a)),
            _ => break,
        }
    }

    let mut records = Vec::new();
    for (line, row) in reader.records().enumerate() {
        let row = row?;
        let field = |i: usize| row.get(i).unwrap_or_default();
        let integer = |i: usize| {
            parse_integer(field(i)).ok_or_else(|| {
                ForecastError::ValidationError(format!(
                    "line {}: '{}' is not an integer",
                    line + 2,
                    field(i)
                ))
            })
        };

        let mut days = Vec::with_capacity(day_columns.len());
        for &(f, a) in &day_columns {
            let forecast = field(f).trim().parse::<f64>().map_err(|e| {
                ForecastError::ValidationError(format!("line {}: bad forecast: {}", line + 2, e))
            })?;
            days.push(DayForecast {
                forecast,
                alert: field(a).parse()?,
            });
        }

        records.push(ForecastRecord {
            store_id: integer(identity[0])?,
            product_id: integer(identity[1])?,
            city_name: field(identity[2]).to_string(),
            company_name: field(identity[3]).to_string(),
            branch_name: field(identity[4]).to_string(),
            product_name: field(identity[5]).to_string(),
            stock_hour6_22_cnt: integer(identity[6])?,
            days,
        });
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_interleaves_days() {
        let header = forecast_header(2);
        assert_eq!(header.len(), 11);
        assert_eq!(
            &header[7..],
            ["day_1_forecast", "day_1_alert", "day_2_forecast", "day_2_alert"]
        );
    }

    #[test]
    fn test_scope_match() {
        let record = ForecastRecord {
            store_id: 1,
            product_id: 2,
            city_name: "Springfield".into(),
            company_name: "Acme".into(),
            branch_name: "Downtown".into(),
            product_name: "Milk".into(),
            stock_hour6_22_cnt: 3,
            days: vec![],
        };
        assert!(record.matches(None, None));
        assert!(record.matches(Some("Springfield"), Some("Downtown")));
        assert!(!record.matches(Some("Springfield"), Some("Uptown")));
        assert!(!record.matches(Some("springfield"), None));
        assert_eq!(record.max_forecast(), None);
    }
}
