//! Stock risk classification

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Risk label for one forecast day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertLevel {
    /// Predicted sales exceed the stock on hand
    Understock,
    /// Predicted sales are well below the stock on hand
    Overstock,
    /// Neither
    Ok,
}

impl AlertLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertLevel::Understock => "UNDERSTOCK",
            AlertLevel::Overstock => "OVERSTOCK",
            AlertLevel::Ok => "OK",
        }
    }
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertLevel {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "UNDERSTOCK" => Ok(AlertLevel::Understock),
            "OVERSTOCK" => Ok(AlertLevel::Overstock),
            "OK" => Ok(AlertLevel::Ok),
            other => Err(ForecastError::ValidationError(format!(
                "Unknown alert label '{}'",
                other
            ))),
        }
    }
}

/// Stock ratios that separate the alert levels.
///
/// `UNDERSTOCK` when `predicted > stock * understock_ratio`, `OVERSTOCK` when
/// `predicted < stock * overstock_ratio`. Both comparisons are strict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertThresholds {
    pub understock_ratio: f64,
    pub overstock_ratio: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            understock_ratio: 1.0,
            overstock_ratio: 0.5,
        }
    }
}

impl AlertThresholds {
    pub fn validate(&self) -> Result<()> {
        if !(self.overstock_ratio > 0.0 && self.understock_ratio > 0.0) {
            return Err(ForecastError::InvalidParameter(
                "Alert ratios must be positive".to_string(),
            ));
        }
        if self.overstock_ratio > self.understock_ratio {
            return Err(ForecastError::InvalidParameter(format!(
                "Overstock ratio ({}) must not exceed understock ratio ({})",
                self.overstock_ratio, self.understock_ratio
            )));
        }
        Ok(())
    }

    /// Classify one predicted value against the stock count
    pub fn classify(&self, predicted: f64, stock: f64) -> AlertLevel {
        if predicted > stock * self.understock_ratio {
            AlertLevel::Understock
        } else if predicted < stock * self.overstock_ratio {
            AlertLevel::Overstock
        } else {
            AlertLevel::Ok
        }
    }
}
