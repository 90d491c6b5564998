//! Model input vectors

use crate::encoding::EncodedNames;
use crate::models::FEATURE_COUNT;
use retail_data::{CalendarFeatures, EnrichedRecord, SeriesFeatures};
use retail_math::blended_mean_update;

/// Column names of the model input, in order
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "city_name_enc",
    "store_id",
    "company_name_enc",
    "branch_name_enc",
    "product_name_enc",
    "stock_hour6_22_cnt",
    "discount",
    "holiday_flag",
    "activity_flag",
    "year",
    "month",
    "day",
    "day_of_week",
    "is_weekend",
    "sales_lag_1",
    "sales_ma_7",
    "sales_ma_14",
];

/// The history part of the input, advanced step by step during a rollout
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HistoryState {
    pub sales_lag_1: f64,
    pub sales_ma_7: f64,
    pub sales_ma_14: f64,
}

impl HistoryState {
    /// Complete features only; `None` if any is missing
    pub fn from_complete(features: &SeriesFeatures) -> Option<Self> {
        Some(Self {
            sales_lag_1: features.sales_lag_1?,
            sales_ma_7: features.sales_ma_short?,
            sales_ma_14: features.sales_ma_long?,
        })
    }

    /// Missing features imputed as zero
    pub fn imputed(features: &SeriesFeatures) -> Self {
        Self {
            sales_lag_1: features.sales_lag_1.unwrap_or(0.0),
            sales_ma_7: features.sales_ma_short.unwrap_or(0.0),
            sales_ma_14: features.sales_ma_long.unwrap_or(0.0),
        }
    }

    /// Feed a predicted day back in as the newest observation.
    ///
    /// The means are blended rather than recomputed over a window.
    pub fn advance(&mut self, predicted: f64) {
        self.sales_lag_1 = predicted;
        self.sales_ma_7 = blended_mean_update(self.sales_ma_7, predicted, 7);
        self.sales_ma_14 = blended_mean_update(self.sales_ma_14, predicted, 14);
    }
}

/// Everything the regressor sees for one series on one day
#[derive(Debug, Clone, PartialEq)]
pub struct ModelFeatures {
    pub names: EncodedNames,
    pub store_id: i64,
    pub stock_hour6_22_cnt: f64,
    pub discount: f64,
    pub holiday_flag: f64,
    pub activity_flag: f64,
    pub calendar: CalendarFeatures,
    pub history: HistoryState,
}

impl ModelFeatures {
    pub fn new(record: &EnrichedRecord, names: EncodedNames, history: HistoryState) -> Self {
        Self {
            names,
            store_id: record.store_id,
            stock_hour6_22_cnt: record.stock_hour6_22_cnt as f64,
            discount: record.discount,
            holiday_flag: record.holiday_flag as f64,
            activity_flag: record.activity_flag as f64,
            calendar: record.calendar(),
            history,
        }
    }

    /// Values in [`FEATURE_NAMES`] order
    pub fn to_vec(&self) -> Vec<f64> {
        vec![
            self.names.city_name as f64,
            self.store_id as f64,
            self.names.company_name as f64,
            self.names.branch_name as f64,
            self.names.product_name as f64,
            self.stock_hour6_22_cnt,
            self.discount,
            self.holiday_flag,
            self.activity_flag,
            f64::from(self.calendar.year),
            f64::from(self.calendar.month),
            f64::from(self.calendar.day),
            f64::from(self.calendar.day_of_week),
            f64::from(self.calendar.is_weekend),
            self.history.sales_lag_1,
            self.history.sales_ma_7,
            self.history.sales_ma_14,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_advance_recurrence() {
        let mut state = HistoryState {
            sales_lag_1: 1.0,
            sales_ma_7: 7.0,
            sales_ma_14: 14.0,
        };
        state.advance(21.0);

        assert_eq!(state.sales_lag_1, 21.0);
        assert_relative_eq!(state.sales_ma_7, (7.0 * 6.0 + 21.0) / 7.0);
        assert_relative_eq!(state.sales_ma_14, (14.0 * 13.0 + 21.0) / 14.0);
    }

    #[test]
    fn test_imputation() {
        let partial = SeriesFeatures {
            sales_lag_1: Some(3.0),
            sales_ma_short: None,
            sales_ma_long: None,
        };
        assert_eq!(HistoryState::from_complete(&partial), None);
        assert_eq!(
            HistoryState::imputed(&partial),
            HistoryState {
                sales_lag_1: 3.0,
                sales_ma_7: 0.0,
                sales_ma_14: 0.0
            }
        );
    }
}
