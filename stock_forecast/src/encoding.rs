//! Categorical label encoding
//!
//! Codes are assigned from the sorted unique values seen at fit time, so two
//! independent fits over different data disagree. The fitted [`EncoderSet`] is
//! therefore persisted next to the model and passed explicitly into both
//! training and inference.

use crate::error::{ForecastError, Result};
use retail_data::EnrichedRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Code assigned to a value never seen during fitting
pub const UNSEEN_CODE: i64 = -1;

/// Dense integer codes for one string column
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    /// Sorted unique values; a value's code is its index
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn fit<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let unique: BTreeSet<&str> = values.into_iter().collect();
        Self {
            classes: unique.into_iter().map(str::to_string).collect(),
        }
    }

    /// Code of a known value
    pub fn transform(&self, value: &str) -> Option<i64> {
        self.classes
            .binary_search_by(|class| class.as_str().cmp(value))
            .ok()
            .map(|i| i as i64)
    }

    /// Code of a value, [`UNSEEN_CODE`] when unknown
    pub fn encode(&self, value: &str) -> i64 {
        self.transform(value).unwrap_or(UNSEEN_CODE)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

/// Encoded categorical fields of one record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedNames {
    pub city_name: i64,
    pub company_name: i64,
    pub branch_name: i64,
    pub product_name: i64,
}

/// Versioned value-to-code tables for every categorical column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderSet {
    pub version: u32,
    pub city_name: LabelEncoder,
    pub company_name: LabelEncoder,
    pub branch_name: LabelEncoder,
    pub product_name: LabelEncoder,
}

impl EncoderSet {
    pub const FORMAT_VERSION: u32 = 1;

    /// Fit all four encoders over the given records
    pub fn fit<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a EnrichedRecord> + Clone,
    {
        Self {
            version: Self::FORMAT_VERSION,
            city_name: LabelEncoder::fit(records.clone().into_iter().map(|r| r.city_name.as_str())),
            company_name: LabelEncoder::fit(
                records.clone().into_iter().map(|r| r.company_name.as_str()),
            ),
            branch_name: LabelEncoder::fit(
                records.clone().into_iter().map(|r| r.branch_name.as_str()),
            ),
            product_name: LabelEncoder::fit(records.into_iter().map(|r| r.product_name.as_str())),
        }
    }

    pub fn encode(&self, record: &EnrichedRecord) -> EncodedNames {
        EncodedNames {
            city_name: self.city_name.encode(&record.city_name),
            company_name: self.company_name.encode(&record.company_name),
            branch_name: self.branch_name.encode(&record.branch_name),
            product_name: self.product_name.encode(&record.product_name),
        }
    }

    /// Write as JSON, overwriting
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_vec_pretty(self)?)?;
        Ok(())
    }

    /// Read encoders written by [`EncoderSet::save`]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ForecastError::MissingArtifact(path.to_path_buf()));
        }
        let encoders: Self = serde_json::from_slice(&fs::read(path)?)?;
        if encoders.version != Self::FORMAT_VERSION {
            return Err(ForecastError::ValidationError(format!(
                "Encoder format version {} is not supported (expected {})",
                encoders.version,
                Self::FORMAT_VERSION
            )));
        }
        Ok(encoders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_follow_sorted_order() {
        let encoder = LabelEncoder::fit(["pear", "apple", "fig", "apple"]);
        assert_eq!(encoder.classes(), ["apple", "fig", "pear"]);
        assert_eq!(encoder.transform("apple"), Some(0));
        assert_eq!(encoder.transform("pear"), Some(2));
    }

    #[test]
    fn test_unseen_value_gets_sentinel() {
        let encoder = LabelEncoder::fit(["a", "b"]);
        assert_eq!(encoder.transform("zzz"), None);
        assert_eq!(encoder.encode("zzz"), UNSEEN_CODE);
        assert_eq!(LabelEncoder::default().encode("a"), UNSEEN_CODE);
    }

    #[test]
    fn test_fit_depends_on_values_seen() {
        let first = LabelEncoder::fit(["b", "c"]);
        let second = LabelEncoder::fit(["a", "b", "c"]);
        assert_ne!(first.transform("b"), second.transform("b"));
    }
}
