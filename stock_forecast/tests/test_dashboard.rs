mod common;

use common::{enriched, forecast};
use pretty_assertions::assert_eq;
use retail_data::loader::write_enriched;
use stock_forecast::dashboard::{AccessScope, BranchOption, Dashboard, PREVIEW_ROWS};
use stock_forecast::records::write_forecasts;
use stock_forecast::AlertLevel::{Overstock, Understock};
use stock_forecast::{DataPaths, PipelineConfig};
use tempfile::TempDir;

fn dashboard(dir: &TempDir) -> Dashboard {
    Dashboard::new(PipelineConfig {
        paths: DataPaths::rooted_at(dir.path()),
        ..Default::default()
    })
}

fn write_fixture(dashboard: &Dashboard) {
    let mut records = Vec::new();
    for (store, city_id, city, branch) in [
        (1, 2, "Springfield", "Uptown"),
        (2, 2, "Springfield", "Downtown"),
        (3, 1, "Shelbyville", "Harbor"),
    ] {
        for day in 0..3 {
            let mut row = enriched(store, 1, day, 5.0, 10);
            row.city_id = city_id;
            row.city_name = city.into();
            row.branch_name = branch.into();
            records.push(row);
        }
    }
    write_enriched(&dashboard.config().paths.enriched, &records).unwrap();

    let forecasts = vec![
        forecast(1, "Springfield", "Uptown", "Milk", 10, &[(12.0, Understock)]),
        forecast(3, "Shelbyville", "Harbor", "Milk", 10, &[(11.0, Understock)]),
        forecast(2, "Springfield", "Downtown", "Milk", 10, &[(1.0, Overstock)]),
        forecast(4, "Springfield", "Downtown", "Eggs", 10, &[(15.0, Understock)]),
    ];
    write_forecasts(&dashboard.config().paths.forecast, &forecasts, 1).unwrap();
}

#[test]
fn test_missing_files_read_as_empty() {
    let dir = TempDir::new().unwrap();
    let dashboard = dashboard(&dir);
    let admin = AccessScope::admin();

    assert!(dashboard.cities().unwrap().is_empty());
    assert!(dashboard.stores().unwrap().is_empty());
    assert!(dashboard.branches_for_city("Springfield").unwrap().is_empty());
    assert!(dashboard.predictions(&admin).unwrap().is_empty());
    assert!(dashboard.understock_alerts(&admin).unwrap().is_empty());
    assert_eq!(dashboard.summary(&admin).unwrap().total_rows, 0);
    assert!(dashboard.forecast_download().is_none());
}

#[test]
fn test_pickers_are_sorted_and_unique() {
    let dir = TempDir::new().unwrap();
    let dashboard = dashboard(&dir);
    write_fixture(&dashboard);

    let cities: Vec<(i64, String)> = dashboard
        .cities()
        .unwrap()
        .into_iter()
        .map(|c| (c.city_id, c.city_name))
        .collect();
    assert_eq!(
        cities,
        vec![(1, "Shelbyville".to_string()), (2, "Springfield".to_string())]
    );
    assert_eq!(dashboard.stores().unwrap().len(), 3);

    assert_eq!(
        dashboard.branches_for_city("Springfield").unwrap(),
        vec![
            BranchOption {
                branch_name: "Downtown".into(),
                store_id: 2,
                company_name: "Acme".into(),
            },
            BranchOption {
                branch_name: "Uptown".into(),
                store_id: 1,
                company_name: "Acme".into(),
            },
        ]
    );
}

#[test]
fn test_manager_sees_only_their_branch() {
    let dir = TempDir::new().unwrap();
    let dashboard = dashboard(&dir);
    write_fixture(&dashboard);

    let manager = AccessScope::manager("Springfield", "Downtown").unwrap();
    let stores: Vec<i64> = dashboard
        .predictions(&manager)
        .unwrap()
        .iter()
        .map(|r| r.store_id)
        .collect();
    assert_eq!(stores, vec![2, 4]);

    let summary = dashboard.summary(&manager).unwrap();
    assert_eq!(summary.total_rows, 2);
    assert_eq!(summary.total_understock, 1);
    assert_eq!(summary.total_overstock, 1);

    assert_eq!(dashboard.summary(&AccessScope::admin()).unwrap().total_rows, 4);
}

#[test]
fn test_understock_alerts_sorted_by_location() {
    let dir = TempDir::new().unwrap();
    let dashboard = dashboard(&dir);
    write_fixture(&dashboard);

    let alerts: Vec<(String, String)> = dashboard
        .understock_alerts(&AccessScope::admin())
        .unwrap()
        .into_iter()
        .map(|r| (r.city_name, r.branch_name))
        .collect();
    assert_eq!(
        alerts,
        vec![
            ("Shelbyville".to_string(), "Harbor".to_string()),
            ("Springfield".to_string(), "Downtown".to_string()),
            ("Springfield".to_string(), "Uptown".to_string()),
        ]
    );
    assert_eq!(
        dashboard.forecast_download(),
        Some(dashboard.config().paths.forecast.as_path())
    );
}

#[test]
fn test_preview_is_capped() {
    let dir = TempDir::new().unwrap();
    let dashboard = dashboard(&dir);
    let forecasts: Vec<_> = (0..60)
        .map(|i| forecast(i, "Springfield", "Uptown", "Milk", 10, &[(5.0, Overstock)]))
        .collect();
    write_forecasts(&dashboard.config().paths.forecast, &forecasts, 1).unwrap();

    let preview = dashboard.preview(&AccessScope::admin()).unwrap();
    assert_eq!(preview.len(), PREVIEW_ROWS);
    assert_eq!(preview[0].store_id, 0);
    assert_eq!(dashboard.predictions(&AccessScope::admin()).unwrap().len(), 60);
}

#[test]
fn test_rerun_without_model_fails() {
    let dir = TempDir::new().unwrap();
    let dashboard = dashboard(&dir);
    write_fixture(&dashboard);

    assert!(dashboard.rerun_forecast().is_err());
}
