//! Per-series history features
//!
//! Enrichment, training-set construction and forecast-input construction all
//! derive lag and rolling-mean features through [`derive_grouped_features`],
//! so the three stages cannot drift apart.

use crate::{EnrichedRecord, Result, SeriesKey};
use chrono::NaiveDate;
use retail_math::{lag, rolling_mean};
use std::ops::Range;

/// Rolling-mean widths to derive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureWindows {
    /// Width of `sales_ma_7`
    pub short: usize,
    /// Width of `sales_ma_14`, when wanted
    pub long: Option<usize>,
}

impl FeatureWindows {
    /// Lag and 7-observation mean, as written to the enriched dataset
    pub const ENRICHMENT: Self = Self {
        short: 7,
        long: None,
    };

    /// Lag, 7- and 14-observation means, as fed to the model
    pub const MODEL: Self = Self {
        short: 7,
        long: Some(14),
    };
}

/// History features of one row; `None` where the series is too short
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SeriesFeatures {
    pub sales_lag_1: Option<f64>,
    pub sales_ma_short: Option<f64>,
    pub sales_ma_long: Option<f64>,
}

impl SeriesFeatures {
    /// Every requested feature is present
    pub fn is_complete(&self, windows: FeatureWindows) -> bool {
        self.sales_lag_1.is_some()
            && self.sales_ma_short.is_some()
            && (windows.long.is_none() || self.sales_ma_long.is_some())
    }
}

/// A dated observation belonging to one series
pub trait SeriesRow {
    fn series_key(&self) -> SeriesKey;
    fn date(&self) -> NaiveDate;
    fn sale_amount(&self) -> f64;
}

impl SeriesRow for EnrichedRecord {
    fn series_key(&self) -> SeriesKey {
        EnrichedRecord::series_key(self)
    }

    fn date(&self) -> NaiveDate {
        self.dt
    }

    fn sale_amount(&self) -> f64 {
        self.sale_amount
    }
}

/// Stable sort by (store_id, product_id, date)
pub fn sort_chronologically<T: SeriesRow>(rows: &mut [T]) {
    rows.sort_by_key(|row| (row.series_key(), row.date()));
}

/// Contiguous index ranges sharing a series key.
///
/// Rows must already be sorted with [`sort_chronologically`].
pub fn series_spans<T: SeriesRow>(rows: &[T]) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut start = 0;
    for i in 1..=rows.len() {
        if i == rows.len() || rows[i].series_key() != rows[start].series_key() {
            if i > start {
                spans.push(start..i);
            }
            start = i;
        }
    }
    spans
}

/// Lag and rolling means for one chronologically ordered series
pub fn derive_series_features(sales: &[f64], windows: FeatureWindows) -> Result<Vec<SeriesFeatures>> {
    let lag_1 = lag(sales, 1);
    let ma_short = rolling_mean(sales, windows.short)?;
    let ma_long = match windows.long {
        Some(width) => rolling_mean(sales, width)?,
        None => vec![None; sales.len()],
    };

    Ok(lag_1
        .into_iter()
        .zip(ma_short)
        .zip(ma_long)
        .map(|((sales_lag_1, sales_ma_short), sales_ma_long)| SeriesFeatures {
            sales_lag_1,
            sales_ma_short,
            sales_ma_long,
        })
        .collect())
}

/// Features for every row of a sorted multi-series table, parallel to `rows`.
///
/// Windows restart at each series boundary.
pub fn derive_grouped_features<T: SeriesRow>(
    rows: &[T],
    windows: FeatureWindows,
) -> Result<Vec<SeriesFeatures>> {
    let mut features = Vec::with_capacity(rows.len());
    for span in series_spans(rows) {
        let sales: Vec<f64> = rows[span].iter().map(SeriesRow::sale_amount).collect();
        features.extend(derive_series_features(&sales, windows)?);
    }
    Ok(features)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[derive(Debug, Clone)]
    struct Obs {
        key: SeriesKey,
        date: NaiveDate,
        sale: f64,
    }

    impl SeriesRow for Obs {
        fn series_key(&self) -> SeriesKey {
            self.key
        }
        fn date(&self) -> NaiveDate {
            self.date
        }
        fn sale_amount(&self) -> f64 {
            self.sale
        }
    }

    fn obs(store: i64, day: u32, sale: f64) -> Obs {
        Obs {
            key: SeriesKey::new(store, 1),
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            sale,
        }
    }

    #[test]
    fn test_lag_follows_previous_row() {
        let sales = [3.0, 5.0, 8.0];
        let features = derive_series_features(&sales, FeatureWindows::ENRICHMENT).unwrap();

        assert_eq!(features[0].sales_lag_1, None);
        assert_eq!(features[1].sales_lag_1, Some(3.0));
        assert_eq!(features[2].sales_lag_1, Some(5.0));
    }

    #[test]
    fn test_short_mean_window() {
        let sales: Vec<f64> = (1..=10).map(f64::from).collect();
        let features = derive_series_features(&sales, FeatureWindows::MODEL).unwrap();

        for (i, f) in features.iter().enumerate() {
            if i < 6 {
                assert!(f.sales_ma_short.is_none());
            } else {
                let expected = sales[i - 6..=i].iter().sum::<f64>() / 7.0;
                assert_relative_eq!(f.sales_ma_short.unwrap(), expected);
            }
            assert!(f.sales_ma_long.is_none());
            assert!(!f.is_complete(FeatureWindows::MODEL));
        }
        assert!(features[9].is_complete(FeatureWindows::ENRICHMENT));
    }

    #[test]
    fn test_windows_do_not_cross_series() {
        let mut rows = vec![obs(2, 1, 100.0), obs(1, 2, 2.0), obs(1, 1, 1.0), obs(2, 2, 200.0)];
        sort_chronologically(&mut rows);
        assert_eq!(series_spans(&rows), vec![0..2, 2..4]);

        let features = derive_grouped_features(&rows, FeatureWindows::ENRICHMENT).unwrap();
        assert_eq!(features[0].sales_lag_1, None);
        assert_eq!(features[1].sales_lag_1, Some(1.0));
        // first row of store 2 must not see store 1's history
        assert_eq!(features[2].sales_lag_1, None);
        assert_eq!(features[3].sales_lag_1, Some(100.0));
    }

    #[test]
    fn test_empty_input() {
        let rows: Vec<Obs> = Vec::new();
        assert!(series_spans(&rows).is_empty());
        assert!(derive_grouped_features(&rows, FeatureWindows::MODEL)
            .unwrap()
            .is_empty());
    }
}
