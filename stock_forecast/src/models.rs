//! Regression models for next-window sales

use crate::error::{ForecastError, Result};
use gbdt::config::Config;
use gbdt::decision_tree::{Data, DataVec, ValueType};
use gbdt::gradient_boost::GBDT;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use std::fs;
use std::path::Path;

/// Number of model input features
pub const FEATURE_COUNT: usize = 17;

/// Common interface for a fitted sales regressor
pub trait SalesRegressor: Debug {
    /// Predict one value from a feature vector of length [`FEATURE_COUNT`]
    fn predict(&self, features: &[f64]) -> Result<f64>;

    /// Predict many rows at once
    fn predict_batch(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>> {
        rows.iter().map(|row| self.predict(row)).collect()
    }

    /// Name of the model
    fn name(&self) -> &str;
}

/// Gradient-boosting hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelParams {
    /// Number of boosting rounds
    pub n_trees: usize,
    pub max_depth: u32,
    pub learning_rate: f64,
    /// Fraction of rows sampled per tree
    pub row_subsample: f64,
    /// Fraction of features sampled per tree
    pub feature_subsample: f64,
    pub min_leaf_size: usize,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            n_trees: 500,
            max_depth: 6,
            learning_rate: 0.1,
            row_subsample: 0.8,
            feature_subsample: 0.8,
            min_leaf_size: 1,
        }
    }
}

impl ModelParams {
    pub fn validate(&self) -> Result<()> {
        if self.n_trees == 0 || self.max_depth == 0 {
            return Err(ForecastError::InvalidParameter(
                "Tree count and depth must be positive".to_string(),
            ));
        }
        if self.learning_rate <= 0.0 {
            return Err(ForecastError::InvalidParameter(
                "Learning rate must be positive".to_string(),
            ));
        }
        for (name, ratio) in [
            ("row_subsample", self.row_subsample),
            ("feature_subsample", self.feature_subsample),
        ] {
            if ratio <= 0.0 || ratio > 1.0 {
                return Err(ForecastError::InvalidParameter(format!(
                    "{} must be in (0, 1], got {}",
                    name, ratio
                )));
            }
        }
        Ok(())
    }

    fn to_config(&self) -> Config {
        let mut cfg = Config::new();
        cfg.set_feature_size(FEATURE_COUNT);
        cfg.set_max_depth(self.max_depth);
        cfg.set_iterations(self.n_trees);
        cfg.set_shrinkage(self.learning_rate as ValueType);
        cfg.set_loss("SquaredError");
        cfg.set_data_sample_ratio(self.row_subsample);
        cfg.set_feature_sample_ratio(self.feature_subsample);
        cfg.set_min_leaf_size(self.min_leaf_size);
        cfg.set_debug(false);
        cfg
    }
}

fn to_values(features: &[f64]) -> Result<Vec<ValueType>> {
    if features.len() != FEATURE_COUNT {
        return Err(ForecastError::ValidationError(format!(
            "Expected {} features, got {}",
            FEATURE_COUNT,
            features.len()
        )));
    }
    Ok(features.iter().map(|&v| v as ValueType).collect())
}

/// Gradient-boosted regression trees
pub struct GbdtRegressor {
    model: GBDT,
}

impl Debug for GbdtRegressor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GbdtRegressor").finish_non_exhaustive()
    }
}

impl GbdtRegressor {
    /// Fit on feature rows and labels
    pub fn fit(params: &ModelParams, features: &[Vec<f64>], labels: &[f64]) -> Result<Self> {
        params.validate()?;
        if features.is_empty() {
            return Err(ForecastError::ValidationError(
                "No training rows to fit".to_string(),
            ));
        }
        if features.len() != labels.len() {
            return Err(ForecastError::ValidationError(format!(
                "Features length ({}) doesn't match labels length ({})",
                features.len(),
                labels.len()
            )));
        }

        let mut data: DataVec = features
            .iter()
            .zip(labels)
            .map(|(row, &label)| {
                Ok(Data::new_training_data(
                    to_values(row)?,
                    1.0,
                    label as ValueType,
                    None,
                ))
            })
            .collect::<Result<_>>()?;

        let mut model = GBDT::new(&params.to_config());
        model.fit(&mut data);

        Ok(Self { model })
    }

    /// Persist to a JSON model file, overwriting
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let name = path_str(path)?;
        self.model
            .save_model(name)
            .map_err(|e| ForecastError::ModelError(format!("saving {}: {}", name, e)))
    }

    /// Load a model saved with [`GbdtRegressor::save`]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ForecastError::MissingArtifact(path.to_path_buf()));
        }
        let name = path_str(path)?;
        let model = GBDT::load_model(name)
            .map_err(|e| ForecastError::ModelError(format!("loading {}: {}", name, e)))?;
        Ok(Self { model })
    }
}

fn path_str(path: &Path) -> Result<&str> {
    path.to_str().ok_or_else(|| {
        ForecastError::InvalidParameter(format!("Non UTF-8 path: {}", path.display()))
    })
}

impl SalesRegressor for GbdtRegressor {
    fn predict(&self, features: &[f64]) -> Result<f64> {
        Ok(self.predict_batch(&[features.to_vec()])?[0])
    }

    fn predict_batch(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>> {
        let data: DataVec = rows
            .iter()
            .map(|row| Ok(Data::new_test_data(to_values(row)?, None)))
            .collect::<Result<_>>()?;

        let predictions = self.model.predict(&data);
        if predictions.len() != rows.len() {
            return Err(ForecastError::ModelError(format!(
                "Model returned {} predictions for {} rows",
                predictions.len(),
                rows.len()
            )));
        }
        Ok(predictions.into_iter().map(f64::from).collect())
    }

    fn name(&self) -> &str {
        "Gradient Boosted Trees"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = ModelParams::default();
        assert_eq!(params.n_trees, 500);
        assert_eq!(params.max_depth, 6);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_invalid_params() {
        let params = ModelParams {
            row_subsample: 1.5,
            ..Default::default()
        };
        assert!(params.validate().is_err());

        let params = ModelParams {
            n_trees: 0,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_fit_rejects_bad_shapes() {
        let params = ModelParams::default();
        assert!(GbdtRegressor::fit(&params, &[], &[]).is_err());
        assert!(GbdtRegressor::fit(&params, &[vec![0.0; 3]], &[1.0]).is_err());
        assert!(GbdtRegressor::fit(&params, &[vec![0.0; FEATURE_COUNT]], &[]).is_err());
    }

    #[test]
    fn test_fit_and_predict() {
        let params = ModelParams {
            n_trees: 50,
            row_subsample: 1.0,
            feature_subsample: 1.0,
            ..Default::default()
        };
        let features: Vec<Vec<f64>> = (0..40)
            .map(|i| {
                let mut row = vec![0.0; FEATURE_COUNT];
                row[14] = i as f64;
                row
            })
            .collect();
        let labels: Vec<f64> = (0..40).map(|i| 10.0 + 2.0 * i as f64).collect();

        let model = GbdtRegressor::fit(&params, &features, &labels).unwrap();
        let low = model.predict(&features[2]).unwrap();
        let high = model.predict(&features[37]).unwrap();
        assert!(high > low);
        assert!(model.predict(&[1.0]).is_err());
        assert_eq!(format!("{:?}", model), "GbdtRegressor { .. }");
    }
}
