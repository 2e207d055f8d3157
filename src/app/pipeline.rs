//! Shared forecast pipeline used by both CLI and TUI front-ends.
//!
//! load -> aggregate -> split -> fit -> predict -> assemble
//!
//! Every trigger recomputes everything after the load; only the loaded tables
//! are memoized (`DataCache`). The CLI and the TUI then focus on presentation.

use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use crate::domain::{
    DailySeries, DashboardConfig, ForecastRun, HolidayEvent, ModelKind, SalesRecord, StoreRecord,
};
use crate::error::PipelineError;
use crate::fit::run_forecaster;
use crate::io::{DatasetCache, load_holidays, load_sales, load_stores};
use crate::models::{AdditiveForecaster, Forecaster, SarimaForecaster};
use crate::report::{accuracy, assemble_comparison};
use crate::series::{aggregate_daily, split};

pub const TOOL_NAME: &str = "salesdash";

/// The three source tables. Optional tables are empty when not configured.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub sales: Arc<Vec<SalesRecord>>,
    pub stores: Arc<Vec<StoreRecord>>,
    pub holidays: Arc<Vec<HolidayEvent>>,
}

/// Session-wide memo of loaded tables, keyed by file identity.
#[derive(Debug, Default)]
pub struct DataCache {
    sales: DatasetCache<Vec<SalesRecord>>,
    stores: DatasetCache<Vec<StoreRecord>>,
    holidays: DatasetCache<Vec<HolidayEvent>>,
}

impl DataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load (or reuse) the tables named by `config`.
    pub fn load(&mut self, config: &DashboardConfig) -> Result<LoadedData, PipelineError> {
        let sales = self.sales.get_or_load(&config.sales_path, load_sales)?;
        let stores = load_optional(&mut self.stores, config.stores_path.as_deref(), load_stores)?;
        let holidays = load_optional(&mut self.holidays, config.holidays_path.as_deref(), load_holidays)?;
        Ok(LoadedData {
            sales,
            stores,
            holidays,
        })
    }

    /// Explicit invalidation hook: forget every loaded table.
    pub fn clear(&mut self) {
        self.sales.clear();
        self.stores.clear();
        self.holidays.clear();
        info!("cleared dataset cache");
    }

    /// `(hits, misses)` of the sales table cache.
    pub fn sales_stats(&self) -> (u64, u64) {
        self.sales.stats()
    }

    /// One full trigger: load (memoized) -> aggregate -> forecast.
    ///
    /// A sales file rewritten since the last call is reloaded here, so each
    /// trigger sees the current table.
    pub fn forecast(&mut self, config: &DashboardConfig) -> Result<ForecastPass, PipelineError> {
        let data = self.load(config)?;
        let series = aggregate_daily(&data.sales);
        let output = run_forecast(&series, config)?;
        Ok(ForecastPass { data, series, output })
    }
}

/// Everything one trigger produced, from the loaded tables onwards.
#[derive(Debug, Clone)]
pub struct ForecastPass {
    pub data: LoadedData,
    pub series: DailySeries,
    pub output: ForecastOutput,
}

fn load_optional<T>(
    cache: &mut DatasetCache<Vec<T>>,
    path: Option<&Path>,
    loader: fn(&Path) -> Result<Vec<T>, PipelineError>,
) -> Result<Arc<Vec<T>>, PipelineError> {
    match path {
        Some(path) => cache.get_or_load(path, loader),
        None => Ok(Arc::new(Vec::new())),
    }
}

/// Outputs of one forecast trigger.
#[derive(Debug, Clone)]
pub struct ForecastOutput {
    pub run: ForecastRun,
    pub train: DailySeries,
    pub test: DailySeries,
}

/// Run the configured capability on an aggregated daily series.
pub fn run_forecast(series: &DailySeries, config: &DashboardConfig) -> Result<ForecastOutput, PipelineError> {
    match config.model {
        ModelKind::Additive => run_with(
            &AdditiveForecaster::new(config.additive.clone()),
            ModelKind::Additive,
            series,
            config.cutoff,
        ),
        ModelKind::Sarima => run_with(
            &SarimaForecaster::new(config.sarima.clone()),
            ModelKind::Sarima,
            series,
            config.cutoff,
        ),
    }
}

/// Aggregate raw records, then run the configured capability.
pub fn run_forecast_on_records(
    records: &[SalesRecord],
    config: &DashboardConfig,
) -> Result<ForecastOutput, PipelineError> {
    run_forecast(&aggregate_daily(records), config)
}

/// split -> fit/predict -> assemble, for any capability.
pub fn run_with<F: Forecaster>(
    forecaster: &F,
    kind: ModelKind,
    series: &DailySeries,
    cutoff: NaiveDate,
) -> Result<ForecastOutput, PipelineError> {
    let (train, test) = split(series, cutoff);

    // Predict exactly the test partition's dates.
    let prediction = run_forecaster(forecaster, &train, &test.dates())?;
    let rows = assemble_comparison(&prediction.points, &test)?;

    let run = ForecastRun {
        tool: TOOL_NAME.to_string(),
        model: kind,
        cutoff,
        train_days: train.len(),
        test_days: test.len(),
        train_range: train.first_date().zip(train.last_date()),
        model_summary: prediction.summary,
        search_trace: prediction.search_trace,
        accuracy: accuracy(&rows),
        rows,
    };

    Ok(ForecastOutput { run, train, test })
}
