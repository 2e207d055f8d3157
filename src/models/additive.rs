//! Additive-component forecaster.
//!
//! ```text
//! y(t) = trend(t) + weekly(t) + yearly(t)
//!
//! trend(t) = k + m·t + Σ_j δ_j · max(t - s_j, 0)
//! ```
//!
//! - `t` is the training time axis rescaled to `[0, 1]`
//! - `s_j` are changepoints spread over the first `changepoint_range` of history
//! - seasonalities are Fourier series over the absolute day index
//!
//! The MAP estimate under Gaussian priors is a ridge regression: changepoint
//! rate adjustments and Fourier coefficients get an L2 penalty of
//! `NOISE_VAR / prior_scale²`; intercept and base slope are unpenalized.
//! The target is divided by `max |y|` before fitting so the priors are
//! scale-free.

use std::time::Instant;

use chrono::NaiveDate;
use nalgebra::{DMatrix, DVector};
use tracing::{debug, info};

use super::Forecaster;
use crate::domain::{AdditiveConfig, DailySeries};
use crate::error::PipelineError;
use crate::math::{WEEK_DAYS, YEAR_DAYS, day_index, fourier_terms, solve_ridge};

const NAME: &str = "additive";

pub const MIN_TRAIN_POINTS: usize = 2;

const WEEKLY_MIN_SPAN_DAYS: f64 = 14.0;
const YEARLY_MIN_SPAN_DAYS: f64 = 730.0;

/// Assumed residual variance of the scaled target (noise sd ≈ 5 % of `max |y|`).
const NOISE_VAR: f64 = 0.0025;

/// One fitted Fourier seasonality.
#[derive(Debug, Clone, PartialEq)]
pub struct Seasonality {
    pub period: f64,
    pub order: usize,
    coefs: Vec<f64>,
}

impl Seasonality {
    fn eval(&self, day: f64) -> f64 {
        fourier_terms(day, self.period, self.order)
            .iter()
            .zip(&self.coefs)
            .map(|(x, b)| x * b)
            .sum()
    }
}

/// Fitted additive model (all coefficients in scaled units).
#[derive(Debug, Clone, PartialEq)]
pub struct AdditiveModel {
    t0: f64,
    span: f64,
    y_scale: f64,
    intercept: f64,
    slope: f64,
    changepoints: Vec<f64>,
    deltas: Vec<f64>,
    weekly: Option<Seasonality>,
    yearly: Option<Seasonality>,
    train_len: usize,
}

/// Per-date decomposition of a prediction, in sales units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Components {
    pub date: NaiveDate,
    pub trend: f64,
    pub weekly: f64,
    pub yearly: f64,
}

impl Components {
    pub fn total(&self) -> f64 {
        self.trend + self.weekly + self.yearly
    }
}

impl AdditiveModel {
    fn scaled_time(&self, day: f64) -> f64 {
        (day - self.t0) / self.span
    }

    fn trend_scaled(&self, t: f64) -> f64 {
        let hinges: f64 = self
            .changepoints
            .iter()
            .zip(&self.deltas)
            .map(|(s, d)| d * (t - s).max(0.0))
            .sum();
        self.intercept + self.slope * t + hinges
    }

    /// Trend / weekly / yearly contributions for each date.
    pub fn components(&self, dates: &[NaiveDate]) -> Vec<Components> {
        dates
            .iter()
            .map(|&date| {
                let day = day_index(date);
                let season = |s: &Option<Seasonality>| s.as_ref().map_or(0.0, |s| s.eval(day));
                Components {
                    date,
                    trend: self.trend_scaled(self.scaled_time(day)) * self.y_scale,
                    weekly: season(&self.weekly) * self.y_scale,
                    yearly: season(&self.yearly) * self.y_scale,
                }
            })
            .collect()
    }

    pub fn n_changepoints(&self) -> usize {
        self.changepoints.len()
    }

    pub fn has_weekly(&self) -> bool {
        self.weekly.is_some()
    }

    pub fn has_yearly(&self) -> bool {
        self.yearly.is_some()
    }
}

/// Changepoint locations (scaled time) following the usual placement:
/// `min(n, hist - 1)` evenly spaced training indices within the first
/// `range` of history, excluding the first.
fn place_changepoints(t: &[f64], n_changepoints: usize, range: f64) -> Vec<f64> {
    let hist_size = (range * t.len() as f64).floor() as usize;
    let n_cp = n_changepoints.min(hist_size.saturating_sub(1));
    if n_cp == 0 {
        return Vec::new();
    }

    let last = (hist_size - 1) as f64;
    (1..=n_cp)
        .map(|i| {
            let idx = (last * i as f64 / n_cp as f64).round() as usize;
            t[idx]
        })
        .collect()
}

fn design_row(
    t: f64,
    day: f64,
    changepoints: &[f64],
    weekly_order: usize,
    yearly_order: usize,
) -> Vec<f64> {
    let mut row = Vec::with_capacity(2 + changepoints.len() + 2 * (weekly_order + yearly_order));
    row.push(1.0);
    row.push(t);
    row.extend(changepoints.iter().map(|s| (t - s).max(0.0)));
    row.extend(fourier_terms(day, WEEK_DAYS, weekly_order));
    row.extend(fourier_terms(day, YEAR_DAYS, yearly_order));
    row
}

fn check_config(cfg: &AdditiveConfig) -> Result<(), PipelineError> {
    let positive = |v: f64| v.is_finite() && v > 0.0;
    if !positive(cfg.changepoint_prior_scale) || !positive(cfg.seasonality_prior_scale) {
        return Err(PipelineError::fit(NAME, "prior scales must be positive and finite"));
    }
    if !(cfg.changepoint_range > 0.0 && cfg.changepoint_range <= 1.0) {
        return Err(PipelineError::fit(
            NAME,
            format!("changepoint_range must be in (0, 1], got {}", cfg.changepoint_range),
        ));
    }
    Ok(())
}

/// Fit the additive model on a training series.
pub fn fit_additive(cfg: &AdditiveConfig, train: &DailySeries) -> Result<AdditiveModel, PipelineError> {
    check_config(cfg)?;

    let n = train.len();
    if n < MIN_TRAIN_POINTS {
        return Err(PipelineError::fit(
            NAME,
            format!("need at least {MIN_TRAIN_POINTS} training days, got {n}"),
        ));
    }

    let y = train.values();
    if y.iter().any(|v| !v.is_finite()) {
        return Err(PipelineError::fit(NAME, "training values must be finite"));
    }

    let days: Vec<f64> = train.points().iter().map(|p| day_index(p.date)).collect();
    let t0 = days[0];
    // Strictly ascending dates with n >= 2 give span >= 1.
    let span = days[n - 1] - t0;
    let t: Vec<f64> = days.iter().map(|d| (d - t0) / span).collect();

    let y_max = y.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    let y_scale = if y_max > 0.0 { y_max } else { 1.0 };

    let changepoints = place_changepoints(&t, cfg.n_changepoints, cfg.changepoint_range);
    let weekly_order = if span >= WEEKLY_MIN_SPAN_DAYS { cfg.weekly_order } else { 0 };
    let yearly_order = if span >= YEARLY_MIN_SPAN_DAYS { cfg.yearly_order } else { 0 };

    let n_cp = changepoints.len();
    let n_season = 2 * (weekly_order + yearly_order);
    let k = 2 + n_cp + n_season;

    let lambda_cp = NOISE_VAR / cfg.changepoint_prior_scale.powi(2);
    let lambda_season = NOISE_VAR / cfg.seasonality_prior_scale.powi(2);
    let mut penalties = vec![0.0; 2];
    penalties.extend(std::iter::repeat_n(lambda_cp, n_cp));
    penalties.extend(std::iter::repeat_n(lambda_season, n_season));

    let start = Instant::now();
    let mut x = DMatrix::<f64>::zeros(n, k);
    for i in 0..n {
        let row = design_row(t[i], days[i], &changepoints, weekly_order, yearly_order);
        for (j, v) in row.into_iter().enumerate() {
            x[(i, j)] = v;
        }
    }
    let yv = DVector::from_iterator(n, y.iter().map(|v| v / y_scale));

    let beta = solve_ridge(&x, &yv, &penalties)
        .ok_or_else(|| PipelineError::fit(NAME, "least squares solve failed (ill-conditioned design)"))?;

    let coefs = beta.as_slice();
    let deltas = coefs[2..2 + n_cp].to_vec();
    let mut offset = 2 + n_cp;
    let mut take = |order: usize, period: f64| {
        (order > 0).then(|| {
            let s = Seasonality {
                period,
                order,
                coefs: coefs[offset..offset + 2 * order].to_vec(),
            };
            offset += 2 * order;
            s
        })
    };
    let weekly = take(weekly_order, WEEK_DAYS);
    let yearly = take(yearly_order, YEAR_DAYS);

    debug!(
        changepoints = n_cp,
        weekly_order,
        yearly_order,
        columns = k,
        "additive design built"
    );
    info!(
        train_days = n,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "fitted additive model"
    );

    Ok(AdditiveModel {
        t0,
        span,
        y_scale,
        intercept: coefs[0],
        slope: coefs[1],
        changepoints,
        deltas,
        weekly,
        yearly,
        train_len: n,
    })
}

/// The additive-component capability.
#[derive(Debug, Clone, Default)]
pub struct AdditiveForecaster {
    pub config: AdditiveConfig,
}

impl AdditiveForecaster {
    pub fn new(config: AdditiveConfig) -> Self {
        Self { config }
    }
}

impl Forecaster for AdditiveForecaster {
    type Model = AdditiveModel;

    fn name(&self) -> &'static str {
        NAME
    }

    fn min_train_len(&self) -> usize {
        MIN_TRAIN_POINTS
    }

    fn fit(&self, train: &DailySeries) -> Result<AdditiveModel, PipelineError> {
        fit_additive(&self.config, train)
    }

    fn predict(&self, model: &AdditiveModel, dates: &[NaiveDate]) -> Result<Vec<f64>, PipelineError> {
        let out: Vec<f64> = model.components(dates).iter().map(Components::total).collect();
        if out.iter().any(|v| !v.is_finite()) {
            return Err(PipelineError::fit(NAME, "forecast diverged (non-finite values)"));
        }
        Ok(out)
    }

    fn describe(&self, model: &AdditiveModel) -> String {
        let season = |on: bool, order: usize| if on { format!("order {order}") } else { "off".to_string() };
        format!(
            "additive trend + seasonality: {} changepoints, weekly {}, yearly {}, {} training days",
            model.n_changepoints(),
            season(model.has_weekly(), self.config.weekly_order),
            season(model.has_yearly(), self.config.yearly_order),
            model.train_len
        )
    }
}
