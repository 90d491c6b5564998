//! Read-side data access for a dashboard front end.
//!
//! Every call re-reads the enriched and forecast datasets from disk, so a
//! fresh forecast run is visible immediately. A file that does not exist yet
//! reads as an empty dataset. Callers pass an [`AccessScope`] to every
//! scoped call; there is no session state here.

use crate::alerts::AlertLevel;
use crate::config::PipelineConfig;
use crate::error::{ForecastError, Result};
use crate::forecaster::{run_forecast, ForecastReport};
use crate::records::{read_forecasts, ForecastRecord};
use crate::summary::{summarize, AlertSummary, ScopeFilter};
use retail_data::{loader, EnrichedRecord};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{info, warn};

/// Rows shown in the dashboard preview table
pub const PREVIEW_ROWS: usize = 50;

/// Who is looking at the data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessScope {
    /// Sees every city and branch
    Admin,
    /// Restricted to one branch of one city
    Manager { city: String, branch: String },
}

impl AccessScope {
    pub fn admin() -> Self {
        AccessScope::Admin
    }

    /// A manager scope; both fields must be non-blank
    pub fn manager(city: &str, branch: &str) -> Result<Self> {
        let (city, branch) = (city.trim(), branch.trim());
        if city.is_empty() || branch.is_empty() {
            return Err(ForecastError::InvalidParameter(
                "Manager scope needs a city and a branch".to_string(),
            ));
        }
        Ok(AccessScope::Manager {
            city: city.to_string(),
            branch: branch.to_string(),
        })
    }

    pub fn filter(&self) -> ScopeFilter {
        match self {
            AccessScope::Admin => ScopeFilter::default(),
            AccessScope::Manager { city, branch } => ScopeFilter {
                city: Some(city.clone()),
                branch: Some(branch.clone()),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct CityOption {
    pub city_id: i64,
    pub city_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct StoreOption {
    pub city_id: i64,
    pub city_name: String,
    pub store_id: i64,
    pub company_name: String,
    pub branch_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct BranchOption {
    pub branch_name: String,
    pub store_id: i64,
    pub company_name: String,
}

/// Data access over the pipeline's output files
#[derive(Debug, Clone)]
pub struct Dashboard {
    config: PipelineConfig,
}

impl Dashboard {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn enriched(&self) -> Result<Vec<EnrichedRecord>> {
        if !self.config.paths.enriched.exists() {
            return Ok(Vec::new());
        }
        Ok(loader::load_enriched(&self.config.paths.enriched)?)
    }

    fn forecasts(&self) -> Result<Vec<ForecastRecord>> {
        if !self.config.paths.forecast.exists() {
            return Ok(Vec::new());
        }
        read_forecasts(&self.config.paths.forecast)
    }

    /// Distinct cities, ordered by name
    pub fn cities(&self) -> Result<Vec<CityOption>> {
        let unique: BTreeSet<(String, i64)> = self
            .enriched()?
            .into_iter()
            .map(|r| (r.city_name, r.city_id))
            .collect();
        Ok(unique
            .into_iter()
            .map(|(city_name, city_id)| CityOption { city_id, city_name })
            .collect())
    }

    /// Distinct city/store/company/branch combinations
    pub fn stores(&self) -> Result<Vec<StoreOption>> {
        let unique: BTreeSet<StoreOption> = self
            .enriched()?
            .into_iter()
            .map(|r| StoreOption {
                city_id: r.city_id,
                city_name: r.city_name,
                store_id: r.store_id,
                company_name: r.company_name,
                branch_name: r.branch_name,
            })
            .collect();
        Ok(unique.into_iter().collect())
    }

    /// Branches located in `city`, ordered by branch name
    pub fn branches_for_city(&self, city: &str) -> Result<Vec<BranchOption>> {
        let unique: BTreeSet<BranchOption> = self
            .enriched()?
            .into_iter()
            .filter(|r| r.city_name == city)
            .map(|r| BranchOption {
                branch_name: r.branch_name,
                store_id: r.store_id,
                company_name: r.company_name,
            })
            .collect();
        Ok(unique.into_iter().collect())
    }

    pub fn summary(&self, scope: &AccessScope) -> Result<AlertSummary> {
        Ok(summarize(&self.forecasts()?, &scope.filter()))
    }

    /// Scoped forecast rows in file order
    pub fn predictions(&self, scope: &AccessScope) -> Result<Vec<ForecastRecord>> {
        let filter = scope.filter();
        Ok(self
            .forecasts()?
            .into_iter()
            .filter(|r| filter.matches(r))
            .collect())
    }

    /// First [`PREVIEW_ROWS`] scoped forecast rows
    pub fn preview(&self, scope: &AccessScope) -> Result<Vec<ForecastRecord>> {
        let mut rows = self.predictions(scope)?;
        rows.truncate(PREVIEW_ROWS);
        Ok(rows)
    }

    /// Scoped series with an understock day, ordered by city then branch
    pub fn understock_alerts(&self, scope: &AccessScope) -> Result<Vec<ForecastRecord>> {
        let mut rows: Vec<ForecastRecord> = self
            .predictions(scope)?
            .into_iter()
            .filter(|r| r.has_alert(AlertLevel::Understock))
            .collect();
        rows.sort_by(|a, b| {
            (&a.city_name, &a.branch_name).cmp(&(&b.city_name, &b.branch_name))
        });
        Ok(rows)
    }

    /// Re-run the forecast stage in place
    pub fn rerun_forecast(&self) -> Result<ForecastReport> {
        info!("Forecast re-run requested");
        run_forecast(&self.config).map_err(|e| {
            warn!(error = %e, "Forecast re-run failed");
            e
        })
    }

    /// Path of the forecast file, if one has been written
    pub fn forecast_download(&self) -> Option<&Path> {
        let path = self.config.paths.forecast.as_path();
        path.exists().then_some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manager_scope_requires_fields() {
        assert!(AccessScope::manager("", "Downtown").is_err());
        assert!(AccessScope::manager("Springfield", "  ").is_err());

        let scope = AccessScope::manager(" Springfield ", "Downtown").unwrap();
        assert_eq!(
            scope.filter(),
            ScopeFilter {
                city: Some("Springfield".into()),
                branch: Some("Downtown".into()),
            }
        );
        assert_eq!(AccessScope::admin().filter(), ScopeFilter::default());
    }
}
