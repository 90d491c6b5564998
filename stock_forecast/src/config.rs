//! Pipeline configuration

use crate::alerts::AlertThresholds;
use crate::error::{ForecastError, Result};
use crate::models::ModelParams;
use retail_data::enrich::EnrichPaths;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Locations of every file the pipeline reads or writes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataPaths {
    pub raw_transactions: PathBuf,
    pub cities: PathBuf,
    pub stores: PathBuf,
    pub products: PathBuf,
    pub enriched: PathBuf,
    pub forecast: PathBuf,
    pub model: PathBuf,
    pub encoders: PathBuf,
}

impl Default for DataPaths {
    fn default() -> Self {
        Self {
            raw_transactions: "data/cleaned_retail_data.csv".into(),
            cities: "data/cities.csv".into(),
            stores: "data/stores.csv".into(),
            products: "data/products.csv".into(),
            enriched: "data/cleaned_retail_data_with_names.csv".into(),
            forecast: "data/stock_forecast_next_7_days_with_alerts.csv".into(),
            model: "model/gbdt_stock_forecast_model.json".into(),
            encoders: "model/label_encoders.json".into(),
        }
    }
}

impl DataPaths {
    /// Every path placed under `root`
    pub fn rooted_at<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref();
        let defaults = Self::default();
        Self {
            raw_transactions: root.join(defaults.raw_transactions),
            cities: root.join(defaults.cities),
            stores: root.join(defaults.stores),
            products: root.join(defaults.products),
            enriched: root.join(defaults.enriched),
            forecast: root.join(defaults.forecast),
            model: root.join(defaults.model),
            encoders: root.join(defaults.encoders),
        }
    }

    pub fn enrich_paths(&self) -> EnrichPaths {
        EnrichPaths {
            transactions: self.raw_transactions.clone(),
            cities: self.cities.clone(),
            stores: self.stores.clone(),
            products: self.products.clone(),
            output: self.enriched.clone(),
        }
    }
}

/// Configuration for the whole pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub paths: DataPaths,
    pub model: ModelParams,
    pub alerts: AlertThresholds,
    /// Days rolled out per series
    pub horizon_days: usize,
    /// Trailing days held out for evaluation
    pub split_days: i64,
    /// Retrain before forecasting in the daily run
    pub retrain_daily: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            paths: DataPaths::default(),
            model: ModelParams::default(),
            alerts: AlertThresholds::default(),
            horizon_days: 7,
            split_days: 7,
            retrain_daily: false,
        }
    }
}

impl PipelineConfig {
    /// Parse from TOML text; omitted keys take their defaults
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file, or use the defaults when `path` is `None`
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ForecastError::InvalidParameter(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                debug!(path = %path.display(), "Loading config");
                Self::from_toml(&fs::read_to_string(path)?)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.horizon_days == 0 {
            return Err(ForecastError::InvalidParameter(
                "horizon_days must be positive".to_string(),
            ));
        }
        if self.split_days < 0 {
            return Err(ForecastError::InvalidParameter(
                "split_days must not be negative".to_string(),
            ));
        }
        self.model.validate()?;
        self.alerts.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_toml_gives_defaults() {
        assert_eq!(PipelineConfig::from_toml("").unwrap(), PipelineConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = PipelineConfig::from_toml(
            r#"
            retrain_daily = true

            [paths]
            forecast = "out/forecast.csv"

            [alerts]
            overstock_ratio = 0.25

            [model]
            n_trees = 100
            "#,
        )
        .unwrap();

        assert!(config.retrain_daily);
        assert_eq!(config.paths.forecast, PathBuf::from("out/forecast.csv"));
        assert_eq!(config.paths.model, DataPaths::default().model);
        assert_eq!(config.alerts.overstock_ratio, 0.25);
        assert_eq!(config.alerts.understock_ratio, 1.0);
        assert_eq!(config.model.n_trees, 100);
        assert_eq!(config.model.max_depth, 6);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(PipelineConfig::from_toml("horizon_days = 0").is_err());
        assert!(PipelineConfig::from_toml("[model]\nfeature_subsample = 0.0").is_err());
        assert!(PipelineConfig::from_toml("horizon_days = \"seven\"").is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(PipelineConfig::load(Some(Path::new("no/such/config.toml"))).is_err());
        assert!(PipelineConfig::load(None).is_ok());
    }
}
