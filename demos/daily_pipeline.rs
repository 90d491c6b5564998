// Runs the full daily pipeline on a synthetic dataset in a temporary directory
use chrono::NaiveDate;
use smart_stock_workspace::retail_data::utils::{generate_dataset, SyntheticSeries};
use smart_stock_workspace::stock_forecast::config::{DataPaths, PipelineConfig};
use smart_stock_workspace::stock_forecast::pipeline::run_daily;
use smart_stock_workspace::stock_forecast::records::read_forecasts;
use smart_stock_workspace::stock_forecast::{summarize, AlertSummary, ModelParams, ScopeFilter};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let workdir = tempfile::tempdir()?;
    let config = PipelineConfig {
        paths: DataPaths::rooted_at(workdir.path()),
        model: ModelParams {
            n_trees: 100,
            ..Default::default()
        },
        ..Default::default()
    };

    // Three stores selling two products, with rising demand and fixed stock
    let series: Vec<SyntheticSeries> = (1..=3)
        .flat_map(|store| {
            (1..=2).map(move |product| SyntheticSeries {
                city_id: store,
                store_id: store,
                product_id: product,
                base_sales: 8.0 * product as f64,
                trend: 0.2 * store as f64,
                stock: 40,
            })
        })
        .collect();
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("invalid start date")?;
    let paths = &config.paths;
    generate_dataset(&series, start, 90, 2.0, 42).write(
        &paths.raw_transactions,
        &paths.cities,
        &paths.stores,
        &paths.products,
    )?;

    let report = run_daily(&config, true)?;
    println!("Enriched rows: {}", report.enrich.rows_written);
    if let Some(training) = &report.training {
        println!(
            "Training examples: {} (train {}, test {})",
            training.examples, training.train_rows, training.test_rows
        );
        if let Some(rmse) = training.rmse {
            println!("Holdout RMSE: {:.2}", rmse);
        }
    }

    let forecasts = read_forecasts(&paths.forecast)?;
    for f in &forecasts {
        let days: Vec<String> = f
            .days
            .iter()
            .map(|d| format!("{:.1} {}", d.forecast, d.alert))
            .collect();
        println!(
            "{} / {} / {}: {}",
            f.city_name,
            f.branch_name,
            f.product_name,
            days.join(", ")
        );
    }

    let summary = summarize(&forecasts, &ScopeFilter::default());
    println!("\n{}", describe(&summary));
    Ok(())
}

fn describe(summary: &AlertSummary) -> String {
    format!(
        "rows={} understock={} overstock={} reorder_lines={}",
        summary.total_rows,
        summary.total_understock,
        summary.total_overstock,
        summary.reorder_list.len()
    )
}
