//! Supervised training set construction and model fitting

use crate::config::PipelineConfig;
use crate::encoding::EncoderSet;
use crate::error::{ForecastError, Result};
use crate::features::{HistoryState, ModelFeatures};
use crate::models::{GbdtRegressor, ModelParams, SalesRegressor};
use chrono::{Duration, NaiveDate};
use retail_data::features::{derive_grouped_features, series_spans, sort_chronologically};
use retail_data::{loader, EnrichedRecord, FeatureWindows, SeriesKey, SeriesRow};
use retail_math::{lead, rolling_sum, root_mean_squared_error};
use tracing::{info, warn};

/// Days of future sales summed into one label
pub const TARGET_HORIZON: usize = 7;

/// An enriched row with complete model history and its label
#[derive(Debug, Clone)]
pub struct LabeledRow {
    pub record: EnrichedRecord,
    pub history: HistoryState,
    /// Total sales over the next [`TARGET_HORIZON`] observations
    pub sales_next_7: f64,
}

/// Label for every position of one series.
///
/// Sales are shifted `horizon` positions back and summed over a trailing
/// window of `horizon`. A label exists when `horizon` later observations
/// exist and the trailing window of shifted values is complete.
pub fn next_window_totals(sales: &[f64], horizon: usize) -> Result<Vec<Option<f64>>> {
    let shifted = lead(sales, horizon);
    Ok(rolling_sum(&shifted, horizon)?)
}

/// Build labelled rows from the enriched dataset.
///
/// Rows lacking lag/7/14 history are dropped first; labels are then computed
/// over what remains of each series, and rows without a label are dropped.
pub fn build_training_rows(mut records: Vec<EnrichedRecord>) -> Result<Vec<LabeledRow>> {
    sort_chronologically(&mut records);
    let features = derive_grouped_features(&records, FeatureWindows::MODEL)?;

    let with_history: Vec<HistoryRow> = records
        .into_iter()
        .zip(features)
        .filter_map(|(record, f)| {
            HistoryState::from_complete(&f).map(|history| HistoryRow { record, history })
        })
        .collect();

    let mut rows = Vec::with_capacity(with_history.len());
    for span in series_spans(&with_history) {
        let series = &with_history[span];
        let sales: Vec<f64> = series.iter().map(|r| r.record.sale_amount).collect();
        let labels = next_window_totals(&sales, TARGET_HORIZON)?;

        rows.extend(series.iter().zip(labels).filter_map(|(row, label)| {
            label.map(|sales_next_7| LabeledRow {
                record: row.record.clone(),
                history: row.history,
                sales_next_7,
            })
        }));
    }

    Ok(rows)
}

struct HistoryRow {
    record: EnrichedRecord,
    history: HistoryState,
}

impl SeriesRow for HistoryRow {
    fn series_key(&self) -> SeriesKey {
        self.record.series_key()
    }

    fn date(&self) -> NaiveDate {
        self.record.dt
    }

    fn sale_amount(&self) -> f64 {
        self.record.sale_amount
    }
}

/// Feature rows and labels of one partition
#[derive(Debug, Clone, Default)]
pub struct Partition {
    pub features: Vec<Vec<f64>>,
    pub labels: Vec<f64>,
}

impl Partition {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Time-based split: rows dated after `max_date - split_days` form the test set
pub fn time_split(
    rows: &[LabeledRow],
    encoders: &EncoderSet,
    split_days: i64,
) -> Option<(NaiveDate, Partition, Partition)> {
    let max_date = rows.iter().map(|r| r.record.dt).max()?;
    let split_date = max_date - Duration::days(split_days);

    let mut train = Partition::default();
    let mut test = Partition::default();
    for row in rows {
        let features =
            ModelFeatures::new(&row.record, encoders.encode(&row.record), row.history).to_vec();
        let partition = if row.record.dt <= split_date {
            &mut train
        } else {
            &mut test
        };
        partition.features.push(features);
        partition.labels.push(row.sales_next_7);
    }

    Some((split_date, train, test))
}

/// Outcome of a training run
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    pub examples: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub split_date: NaiveDate,
    /// `None` when the test partition is empty
    pub rmse: Option<f64>,
}

/// Fitted model, its encoders and how it scored
#[derive(Debug)]
pub struct TrainedModel {
    pub regressor: GbdtRegressor,
    pub encoders: EncoderSet,
    pub report: TrainingReport,
}

/// Fit encoders and regressor on the enriched dataset, and score the holdout
pub fn train(
    records: Vec<EnrichedRecord>,
    params: &ModelParams,
    split_days: i64,
) -> Result<TrainedModel> {
    let rows = build_training_rows(records)?;
    let encoders = EncoderSet::fit(rows.iter().map(|r| &r.record));

    let (split_date, train_part, test_part) = time_split(&rows, &encoders, split_days)
        .ok_or_else(|| {
            ForecastError::ValidationError(
                "No rows with a complete history and 7-day label".to_string(),
            )
        })?;

    info!(
        examples = rows.len(),
        train = train_part.len(),
        test = test_part.len(),
        %split_date,
        "Built training set"
    );

    let regressor = GbdtRegressor::fit(params, &train_part.features, &train_part.labels)?;

    let rmse = if test_part.is_empty() {
        warn!("Test partition is empty, skipping evaluation");
        None
    } else {
        let predicted = regressor.predict_batch(&test_part.features)?;
        let rmse = root_mean_squared_error(&predicted, &test_part.labels)?;
        info!("Stock Forecasting RMSE (next 7 days): {:.2}", rmse);
        Some(rmse)
    };

    Ok(TrainedModel {
        regressor,
        encoders,
        report: TrainingReport {
            examples: rows.len(),
            train_rows: train_part.len(),
            test_rows: test_part.len(),
            split_date,
            rmse,
        },
    })
}

/// Train from the enriched CSV and overwrite the model and encoder artifacts
pub fn run_training(config: &PipelineConfig) -> Result<TrainingReport> {
    let records = loader::load_enriched(&config.paths.enriched)?;
    let trained = train(records, &config.model, config.split_days)?;

    trained.regressor.save(&config.paths.model)?;
    trained.encoders.save(&config.paths.encoders)?;
    info!(
        model = %config.paths.model.display(),
        encoders = %config.paths.encoders.display(),
        "Model and encoders saved"
    );

    Ok(trained.report)
}
