mod common;

use approx::assert_relative_eq;
use chrono::Duration;
use common::{enriched_history, linear_series, quick_params, start_date};
use pretty_assertions::assert_eq;
use stock_forecast::encoding::{EncoderSet, UNSEEN_CODE};
use stock_forecast::training::{build_training_rows, time_split, train};
use stock_forecast::SalesRegressor;

#[test]
fn test_labels_sum_next_seven_days() {
    // sales(d) = 10 + d
    let records = enriched_history(&[linear_series(1, 1, 10.0, 1.0, 50)], 40);
    let rows = build_training_rows(records).unwrap();

    // 40 days: 6 lost to enrichment, 13 to the 14-day mean, 6 + 7 to the label
    assert_eq!(rows.len(), 8);
    for row in &rows {
        let d = (row.record.dt - start_date()).num_days() as f64;
        assert_relative_eq!(row.sales_next_7, 7.0 * d + 98.0);
        assert_relative_eq!(row.history.sales_lag_1, 9.0 + d);
        assert_relative_eq!(row.history.sales_ma_7, 7.0 + d);
        assert_relative_eq!(row.history.sales_ma_14, 3.5 + d);
    }

    let first = rows.iter().map(|r| r.record.dt).min().unwrap();
    let last = rows.iter().map(|r| r.record.dt).max().unwrap();
    assert_eq!(first, start_date() + Duration::days(25));
    assert_eq!(last, start_date() + Duration::days(32));
}

#[test]
fn test_short_history_has_no_examples() {
    let records = enriched_history(&[linear_series(1, 1, 10.0, 1.0, 50)], 20);
    assert!(build_training_rows(records).unwrap().is_empty());
}

#[test]
fn test_time_split_holds_out_trailing_week() {
    let records = enriched_history(
        &[
            linear_series(1, 1, 10.0, 1.0, 50),
            linear_series(2, 1, 20.0, 0.5, 50),
        ],
        60,
    );
    let rows = build_training_rows(records).unwrap();
    let encoders = EncoderSet::fit(rows.iter().map(|r| &r.record));

    let (split_date, train_part, test_part) = time_split(&rows, &encoders, 7).unwrap();

    assert_eq!(split_date, start_date() + Duration::days(45));
    assert_eq!(train_part.len(), 42);
    assert_eq!(test_part.len(), 14);
    assert!(train_part.features.iter().all(|f| f.len() == 17));
    assert!(time_split(&[], &encoders, 7).is_none());
}

#[test]
fn test_unseen_category_encodes_as_minus_one() {
    let records = enriched_history(&[linear_series(1, 1, 10.0, 1.0, 50)], 10);
    let encoders = EncoderSet::fit(records.iter());

    let mut unseen = records[0].clone();
    unseen.product_name = "Never Sold".into();
    let codes = encoders.encode(&unseen);
    assert_eq!(codes.product_name, UNSEEN_CODE);
    assert_eq!(codes.city_name, 0);
}

#[test]
fn test_train_reports_holdout_rmse() {
    let records = enriched_history(
        &[
            linear_series(1, 1, 10.0, 1.0, 50),
            linear_series(2, 1, 20.0, 0.5, 50),
        ],
        60,
    );

    let trained = train(records, &quick_params(), 7).unwrap();

    assert_eq!(trained.report.examples, 56);
    assert_eq!(trained.report.train_rows, 42);
    assert_eq!(trained.report.test_rows, 14);
    let rmse = trained.report.rmse.unwrap();
    assert!(rmse.is_finite() && rmse >= 0.0);
    assert_eq!(trained.regressor.name(), "Gradient Boosted Trees");
}

#[test]
fn test_train_without_examples_fails() {
    let records = enriched_history(&[linear_series(1, 1, 10.0, 1.0, 50)], 15);
    assert!(train(records, &quick_params(), 7).is_err());
}
