//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory by the forecast pipeline
//! - exported to JSON/CSV
//! - reloaded later for plotting (`salesdash plot --run <file>`)

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Default train/test cutoff (last day of the training history).
pub const DEFAULT_CUTOFF: &str = "2016-12-31";

/// One row of the sales table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    /// Optional row id (present in the Kaggle export, absent in most others).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub date: NaiveDate,
    pub store_nbr: u32,
    pub family: String,
    /// Unit sales. Negative values (returns/adjustments) are kept as-is.
    pub sales: f64,
    pub onpromotion: u32,
}

/// One row of the stores reference table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreRecord {
    pub store_nbr: u32,
    pub city: String,
    pub state: String,
    #[serde(rename = "type")]
    pub store_type: String,
    pub cluster: u32,
}

/// One row of the holidays/events calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayEvent {
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: String,
    pub locale: String,
    pub locale_name: String,
    pub description: String,
    pub transferred: bool,
}

/// Total sales for one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub total_sales: f64,
}

/// Daily totals, one row per distinct date, strictly ascending.
///
/// Missing calendar days stay missing: nothing is interpolated or zero-filled.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailySeries {
    points: Vec<DailyPoint>,
}

impl DailySeries {
    /// Build a series from points that must already be strictly ascending by date.
    ///
    /// Returns `None` when the ordering invariant does not hold.
    pub fn new(points: Vec<DailyPoint>) -> Option<Self> {
        if points.windows(2).all(|w| w[0].date < w[1].date) {
            Some(Self { points })
        } else {
            None
        }
    }

    /// Build a series from `(date, value)` pairs (test/demo convenience).
    pub fn from_pairs(pairs: &[(NaiveDate, f64)]) -> Option<Self> {
        Self::new(
            pairs
                .iter()
                .map(|&(date, total_sales)| DailyPoint { date, total_sales })
                .collect(),
        )
    }

    pub(crate) fn from_ordered(points: Vec<DailyPoint>) -> Self {
        debug_assert!(points.windows(2).all(|w| w[0].date < w[1].date));
        Self { points }
    }

    pub fn points(&self) -> &[DailyPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.total_sales).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }
}

/// Predicted vs actual total sales for one test-partition date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    pub date: NaiveDate,
    pub predicted_sales: f64,
    pub actual_sales: f64,
}

/// Which forecasting capability to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// Piecewise-linear trend plus Fourier seasonalities.
    Additive,
    /// Seasonal ARIMA with automatic stepwise order search.
    Sarima,
}

impl ModelKind {
    pub const ALL: [ModelKind; 2] = [ModelKind::Additive, ModelKind::Sarima];

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::Additive => "Additive (trend + seasonality)",
            ModelKind::Sarima => "SARIMA (auto order)",
        }
    }

    pub fn short_name(self) -> &'static str {
        match self {
            ModelKind::Additive => "additive",
            ModelKind::Sarima => "sarima",
        }
    }

    pub fn next(self) -> Self {
        match self {
            ModelKind::Additive => ModelKind::Sarima,
            ModelKind::Sarima => ModelKind::Additive,
        }
    }
}

/// Aggregation level of a comparison view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    /// ISO weeks (Monday start).
    Weekly,
    Monthly,
}

impl Frequency {
    pub fn next(self) -> Self {
        match self {
            Frequency::Daily => Frequency::Weekly,
            Frequency::Weekly => Frequency::Monthly,
            Frequency::Monthly => Frequency::Daily,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
        }
    }
}

/// Settings for the additive-component forecaster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdditiveConfig {
    /// Maximum number of trend changepoints.
    pub n_changepoints: usize,
    /// Fraction of the history in which changepoints may be placed.
    pub changepoint_range: f64,
    /// Prior scale of changepoint rate adjustments (smaller = stiffer trend).
    pub changepoint_prior_scale: f64,
    /// Prior scale of seasonal Fourier coefficients.
    pub seasonality_prior_scale: f64,
    pub weekly_order: usize,
    pub yearly_order: usize,
}

impl Default for AdditiveConfig {
    fn default() -> Self {
        Self {
            n_changepoints: 25,
            changepoint_range: 0.8,
            changepoint_prior_scale: 0.05,
            seasonality_prior_scale: 10.0,
            weekly_order: 3,
            yearly_order: 10,
        }
    }
}

/// Settings for the seasonal ARIMA order search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SarimaConfig {
    /// Seasonal period (observations per season).
    pub m: usize,
    /// Non-seasonal differencing order.
    pub d: usize,
    /// Seasonal differencing order.
    pub seasonal_d: usize,
    pub start_p: usize,
    pub start_q: usize,
    pub start_seasonal_p: usize,
    pub start_seasonal_q: usize,
    pub max_p: usize,
    pub max_q: usize,
    pub max_seasonal_p: usize,
    pub max_seasonal_q: usize,
    /// Upper bound on `p + q + P + Q`.
    pub max_order: usize,
    /// Upper bound on stepwise moves.
    pub max_steps: usize,
}

impl Default for SarimaConfig {
    fn default() -> Self {
        Self {
            m: 12,
            d: 1,
            seasonal_d: 1,
            start_p: 1,
            start_q: 1,
            start_seasonal_p: 0,
            start_seasonal_q: 1,
            max_p: 3,
            max_q: 3,
            max_seasonal_p: 2,
            max_seasonal_q: 2,
            max_order: 5,
            max_steps: 100,
        }
    }
}

/// A `(p, d, q)(P, D, Q)m` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SarimaOrder {
    pub p: usize,
    pub d: usize,
    pub q: usize,
    pub seasonal_p: usize,
    pub seasonal_d: usize,
    pub seasonal_q: usize,
    pub m: usize,
}

impl SarimaOrder {
    pub fn is_seasonal(&self) -> bool {
        self.m > 1 && (self.seasonal_p + self.seasonal_d + self.seasonal_q) > 0
    }

    /// Sum of the searched orders (`p + q + P + Q`).
    pub fn total_order(&self) -> usize {
        self.p + self.q + self.seasonal_p + self.seasonal_q
    }
}

impl std::fmt::Display for SarimaOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({},{},{})({},{},{})[{}]",
            self.p, self.d, self.q, self.seasonal_p, self.seasonal_d, self.seasonal_q, self.m
        )
    }
}

/// One evaluated candidate of the order search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchStep {
    pub order: SarimaOrder,
    /// `None` when the candidate could not be fitted.
    pub aic: Option<f64>,
}

/// Point-forecast accuracy over a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Accuracy {
    pub n: usize,
    pub mae: f64,
    pub rmse: f64,
    /// Mean absolute percentage error (percent); `None` when every actual is zero.
    pub mape: Option<f64>,
    /// Mean of `predicted - actual`.
    pub bias: f64,
}

/// All outputs of one forecast trigger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastRun {
    pub tool: String,
    pub model: ModelKind,
    pub cutoff: NaiveDate,
    pub train_days: usize,
    pub test_days: usize,
    pub train_range: Option<(NaiveDate, NaiveDate)>,
    /// Human-readable description of the fitted model.
    pub model_summary: String,
    /// Candidates visited by the order search (SARIMA only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub search_trace: Vec<SearchStep>,
    pub accuracy: Option<Accuracy>,
    pub rows: Vec<ForecastRow>,
}

/// A full dashboard configuration as understood by the pipeline.
///
/// This is derived from CLI flags / environment (plus defaults).
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub sales_path: PathBuf,
    pub stores_path: Option<PathBuf>,
    pub holidays_path: Option<PathBuf>,
    pub cutoff: NaiveDate,
    pub model: ModelKind,
    pub frequency: Frequency,
    pub additive: AdditiveConfig,
    pub sarima: SarimaConfig,
    pub export_dir: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn daily_series_rejects_unordered_points() {
        assert!(DailySeries::from_pairs(&[(d(2017, 1, 2), 1.0), (d(2017, 1, 1), 2.0)]).is_none());
        assert!(DailySeries::from_pairs(&[(d(2017, 1, 1), 1.0), (d(2017, 1, 1), 2.0)]).is_none());
        let s = DailySeries::from_pairs(&[(d(2017, 1, 1), 1.0), (d(2017, 1, 3), 2.0)]).unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s.last_date(), Some(d(2017, 1, 3)));
    }

    #[test]
    fn sarima_order_display() {
        let o = SarimaOrder {
            p: 1,
            d: 1,
            q: 2,
            seasonal_p: 0,
            seasonal_d: 1,
            seasonal_q: 1,
            m: 12,
        };
        assert_eq!(o.to_string(), "(1,1,2)(0,1,1)[12]");
        assert_eq!(o.total_order(), 4);
        assert!(o.is_seasonal());
    }
}
