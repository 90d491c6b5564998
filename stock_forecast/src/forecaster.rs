//! Autoregressive multi-day forecasting

use crate::alerts::{AlertLevel, AlertThresholds};
use crate::config::PipelineConfig;
use crate::encoding::EncoderSet;
use crate::error::Result;
use crate::features::{HistoryState, ModelFeatures};
use crate::models::{GbdtRegressor, SalesRegressor};
use crate::records::{write_forecasts, DayForecast, ForecastRecord};
use retail_data::features::{derive_grouped_features, series_spans, sort_chronologically};
use retail_data::{loader, EnrichedRecord, FeatureWindows};
use retail_math::round_to;
use tracing::{debug, info};

/// Latest known state of one series
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorRow {
    pub record: EnrichedRecord,
    pub history: HistoryState,
}

/// Most recent row of every series, with history features imputed to zero
/// where the series is too short.
///
/// Features are derived over the full history before selecting the anchor.
pub fn anchor_rows(mut records: Vec<EnrichedRecord>) -> Result<Vec<AnchorRow>> {
    sort_chronologically(&mut records);
    let features = derive_grouped_features(&records, FeatureWindows::MODEL)?;

    Ok(series_spans(&records)
        .into_iter()
        .map(|span| {
            let last = span.end - 1;
            AnchorRow {
                record: records[last].clone(),
                history: HistoryState::imputed(&features[last]),
            }
        })
        .collect())
}

/// Roll a series forward `horizon` days, feeding each prediction back in.
///
/// Calendar fields and the stock count stay at their anchor values for the
/// whole rollout. Forecasts are recorded rounded to two decimals; alerts and
/// the history update use the unrounded prediction.
pub fn rollout<R>(
    model: &R,
    mut features: ModelFeatures,
    thresholds: &AlertThresholds,
    horizon: usize,
) -> Result<Vec<DayForecast>>
where
    R: SalesRegressor + ?Sized,
{
    let stock = features.stock_hour6_22_cnt;
    let mut days = Vec::with_capacity(horizon);

    for _ in 0..horizon {
        let predicted = model.predict(&features.to_vec())?;
        days.push(DayForecast {
            forecast: round_to(predicted, 2),
            alert: thresholds.classify(predicted, stock),
        });
        features.history.advance(predicted);
    }

    Ok(days)
}

/// Runs rollouts for every series of an enriched dataset
#[derive(Debug)]
pub struct Forecaster<'a, R: SalesRegressor + ?Sized> {
    model: &'a R,
    encoders: &'a EncoderSet,
    thresholds: AlertThresholds,
    horizon: usize,
}

impl<'a, R: SalesRegressor + ?Sized> Forecaster<'a, R> {
    pub fn new(
        model: &'a R,
        encoders: &'a EncoderSet,
        thresholds: AlertThresholds,
        horizon: usize,
    ) -> Self {
        Self {
            model,
            encoders,
            thresholds,
            horizon,
        }
    }

    /// One forecast record per series, ordered by (store_id, product_id)
    pub fn forecast(&self, records: Vec<EnrichedRecord>) -> Result<Vec<ForecastRecord>> {
        let anchors = anchor_rows(records)?;
        debug!(series = anchors.len(), "Selected anchor rows");

        anchors
            .into_iter()
            .map(|anchor| self.forecast_series(anchor))
            .collect()
    }

    fn forecast_series(&self, anchor: AnchorRow) -> Result<ForecastRecord> {
        let names = self.encoders.encode(&anchor.record);
        let features = ModelFeatures::new(&anchor.record, names, anchor.history);
        let days = rollout(self.model, features, &self.thresholds, self.horizon)?;

        let record = anchor.record;
        Ok(ForecastRecord {
            store_id: record.store_id,
            product_id: record.product_id,
            city_name: record.city_name,
            company_name: record.company_name,
            branch_name: record.branch_name,
            product_name: record.product_name,
            stock_hour6_22_cnt: record.stock_hour6_22_cnt,
            days,
        })
    }
}

/// Outcome of a forecast run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastReport {
    pub series: usize,
    pub understocked: usize,
    pub overstocked: usize,
}

/// Load artifacts and the enriched dataset, forecast, and overwrite the forecast CSV
pub fn run_forecast(config: &PipelineConfig) -> Result<ForecastReport> {
    let model = GbdtRegressor::load(&config.paths.model)?;
    let encoders = EncoderSet::load(&config.paths.encoders)?;
    let records = loader::load_enriched(&config.paths.enriched)?;

    let forecaster = Forecaster::new(&model, &encoders, config.alerts, config.horizon_days);
    let forecasts = forecaster.forecast(records)?;
    write_forecasts(&config.paths.forecast, &forecasts, config.horizon_days)?;

    let report = ForecastReport {
        series: forecasts.len(),
        understocked: forecasts
            .iter()
            .filter(|f| f.has_alert(AlertLevel::Understock))
            .count(),
        overstocked: forecasts
            .iter()
            .filter(|f| f.has_alert(AlertLevel::Overstock))
            .count(),
    };
    info!(
        series = report.series,
        understocked = report.understocked,
        overstocked = report.overstocked,
        path = %config.paths.forecast.display(),
        "Forecast saved"
    );

    Ok(report)
}
