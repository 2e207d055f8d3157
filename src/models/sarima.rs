//! Seasonal ARIMA estimation and forecasting.
//!
//! For an order `(p,d,q)(P,D,Q)[m]` the training series is differenced `D`
//! times at lag `m` and `d` times at lag 1, then an ARMA model is estimated on
//! the differenced series `w`:
//!
//! ```text
//! w_t = c + Σ_{i∈AR} φ_i w_{t-i} + ε_t + Σ_{j∈MA} θ_j ε_{t-j}
//! ```
//!
//! with AR lags `{1..p} ∪ {m, 2m, .., Pm}` and MA lags `{1..q} ∪ {m, .., Qm}`.
//! Seasonal terms enter as subset lags (no multiplicative cross terms).
//! The constant is only estimated when no differencing is applied.
//!
//! Estimation (Hannan–Rissanen):
//! 1. fit a long AR by least squares and keep its residuals as innovation proxies
//! 2. regress `w_t` on its AR lags and the lagged proxies
//! 3. recompute residuals recursively (conditional sum of squares) and score
//!    the candidate with AIC from the Gaussian log-likelihood
//!
//! Candidates that cannot be estimated return `None`; the order search skips them.

use std::collections::BTreeSet;
use std::time::Instant;

use chrono::NaiveDate;
use nalgebra::{DMatrix, DVector};
use tracing::info;

use super::Forecaster;
use crate::domain::{DailySeries, SarimaConfig, SarimaOrder, SearchStep};
use crate::error::PipelineError;
use crate::fit::stepwise_search;
use crate::math::solve_least_squares;

const NAME: &str = "sarima";

/// Observations that must remain after differencing.
pub const MIN_DIFFERENCED_POINTS: usize = 8;

/// Extra rows required beyond the parameter count of a regression.
const MIN_DOF: usize = 3;

/// Upper bound on the long-AR order of the first Hannan–Rissanen stage.
const LONG_AR_EXTRA: usize = 8;

/// Series before each differencing step, and the lag of that step.
#[derive(Debug, Clone, PartialEq)]
struct Differencing {
    levels: Vec<(usize, Vec<f64>)>,
    output: Vec<f64>,
}

fn difference(series: &[f64], lag: usize) -> Vec<f64> {
    if series.len() <= lag {
        return Vec::new();
    }
    series[lag..]
        .iter()
        .zip(series)
        .map(|(a, b)| a - b)
        .collect()
}

impl Differencing {
    /// Seasonal differences first, then regular ones.
    fn apply(y: &[f64], order: &SarimaOrder) -> Self {
        let lags = std::iter::repeat_n(order.m, if order.m > 1 { order.seasonal_d } else { 0 })
            .chain(std::iter::repeat_n(1, order.d));

        let mut levels = Vec::new();
        let mut current = y.to_vec();
        for lag in lags {
            let next = difference(&current, lag);
            levels.push((lag, current));
            current = next;
        }
        Self { levels, output: current }
    }

    /// Map forecasts of the differenced series back to the original scale.
    fn invert(&self, forecast: Vec<f64>) -> Vec<f64> {
        let mut current = forecast;
        for (lag, prev) in self.levels.iter().rev() {
            let mut ext = prev.clone();
            for f in &current {
                let base = ext[ext.len() - lag];
                ext.push(f + base);
            }
            current = ext.split_off(prev.len());
        }
        current
    }
}

fn lag_set(order: usize, seasonal_order: usize, m: usize) -> Vec<usize> {
    let mut lags: BTreeSet<usize> = (1..=order).collect();
    if m > 1 {
        lags.extend((1..=seasonal_order).map(|k| k * m));
    }
    lags.into_iter().collect()
}

/// One estimated `(p,d,q)(P,D,Q)[m]` model.
#[derive(Debug, Clone, PartialEq)]
pub struct SarimaFit {
    pub order: SarimaOrder,
    ar: Vec<(usize, f64)>,
    ma: Vec<(usize, f64)>,
    constant: f64,
    pub sigma2: f64,
    pub aic: f64,
    /// Observations contributing to the likelihood.
    pub n_eff: usize,
    diff: Differencing,
    residuals: Vec<f64>,
}

impl SarimaFit {
    pub fn ar_coefs(&self) -> &[(usize, f64)] {
        &self.ar
    }

    pub fn ma_coefs(&self) -> &[(usize, f64)] {
        &self.ma
    }

    /// Recursive point forecasts for the next `h` observations (future shocks = 0).
    pub fn forecast(&self, h: usize) -> Vec<f64> {
        let mut w = self.diff.output.clone();
        let mut e = self.residuals.clone();
        let lagged = |v: &[f64], lag: usize| v.len().checked_sub(lag).map_or(0.0, |i| v[i]);

        let mut out = Vec::with_capacity(h);
        for _ in 0..h {
            let ar: f64 = self.ar.iter().map(|&(lag, phi)| phi * lagged(&w, lag)).sum();
            let ma: f64 = self.ma.iter().map(|&(lag, theta)| theta * lagged(&e, lag)).sum();
            let f = self.constant + ar + ma;
            w.push(f);
            e.push(0.0);
            out.push(f);
        }
        self.diff.invert(out)
    }
}

/// Least squares residuals `y - Xβ`.
fn residuals_of(x: &DMatrix<f64>, y: &DVector<f64>, beta: &DVector<f64>) -> Vec<f64> {
    (y - x * beta).iter().copied().collect()
}

/// Stage 1: innovations proxy from a long autoregression. Entries before the
/// first usable row are zero.
fn long_ar_residuals(w: &[f64], order: usize, with_const: bool) -> Option<Vec<f64>> {
    let n = w.len();
    let cols = order + usize::from(with_const);
    if n < order + cols + MIN_DOF {
        return None;
    }

    let rows = n - order;
    let mut x = DMatrix::<f64>::zeros(rows, cols);
    for (r, t) in (order..n).enumerate() {
        let mut c = 0;
        if with_const {
            x[(r, 0)] = 1.0;
            c = 1;
        }
        for i in 1..=order {
            x[(r, c)] = w[t - i];
            c += 1;
        }
    }
    let y = DVector::from_column_slice(&w[order..]);
    let beta = solve_least_squares(&x, &y)?;

    let mut out = vec![0.0; order];
    out.extend(residuals_of(&x, &y, &beta));
    Some(out)
}

/// Estimate one candidate order on `y`. Returns `None` when the order cannot be
/// estimated on this data.
pub fn fit_order(y: &[f64], order: SarimaOrder) -> Option<SarimaFit> {
    let diff = Differencing::apply(y, &order);
    let w = &diff.output;
    let n = w.len();
    if n < MIN_DIFFERENCED_POINTS || w.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let ar_lags = lag_set(order.p, order.seasonal_p, order.m);
    let ma_lags = lag_set(order.q, order.seasonal_q, order.m);
    let with_const = order.d + order.seasonal_d == 0;

    let max_ar = ar_lags.last().copied().unwrap_or(0);
    let max_ma = ma_lags.last().copied().unwrap_or(0);
    let n_params = ar_lags.len() + ma_lags.len() + usize::from(with_const);

    // Stage 1 (only needed with MA terms).
    let (proxy, start) = if ma_lags.is_empty() {
        (vec![0.0; n], max_ar)
    } else {
        let long = (max_ar.max(max_ma) + LONG_AR_EXTRA).min(n / 2);
        if long == 0 {
            return None;
        }
        let e = long_ar_residuals(w, long, with_const)?;
        (e, max_ar.max(long + max_ma))
    };
    if n < start + n_params + MIN_DOF {
        return None;
    }

    // Stage 2.
    let rows = n - start;
    let mut x = DMatrix::<f64>::zeros(rows, n_params.max(1));
    for (r, t) in (start..n).enumerate() {
        let mut c = 0;
        if with_const {
            x[(r, c)] = 1.0;
            c += 1;
        }
        for &lag in &ar_lags {
            x[(r, c)] = w[t - lag];
            c += 1;
        }
        for &lag in &ma_lags {
            x[(r, c)] = proxy[t - lag];
            c += 1;
        }
    }

    let (constant, ar, ma) = if n_params == 0 {
        (0.0, Vec::new(), Vec::new())
    } else {
        let yv = DVector::from_column_slice(&w[start..]);
        let beta = solve_least_squares(&x, &yv)?;
        let b = beta.as_slice();
        let off = usize::from(with_const);
        let constant = if with_const { b[0] } else { 0.0 };
        let ar: Vec<(usize, f64)> = ar_lags.iter().copied().zip(b[off..].iter().copied()).collect();
        let ma: Vec<(usize, f64)> = ma_lags
            .iter()
            .copied()
            .zip(b[off + ar_lags.len()..].iter().copied())
            .collect();
        (constant, ar, ma)
    };

    // Stage 3: conditional residuals, zero before the first AR-complete index.
    let css_start = max_ar;
    let mut residuals = vec![0.0; n];
    let mut sse = 0.0;
    for t in css_start..n {
        let ar_part: f64 = ar.iter().map(|&(lag, phi)| phi * w[t - lag]).sum();
        let ma_part: f64 = ma
            .iter()
            .map(|&(lag, theta)| t.checked_sub(lag).map_or(0.0, |i| theta * residuals[i]))
            .sum();
        let e = w[t] - constant - ar_part - ma_part;
        residuals[t] = e;
        sse += e * e;
    }

    let n_eff = n - css_start;
    if !sse.is_finite() || n_eff <= n_params + MIN_DOF {
        return None;
    }

    let sigma2 = (sse / n_eff as f64).max(1e-12);
    let loglik = -0.5 * n_eff as f64 * ((2.0 * std::f64::consts::PI * sigma2).ln() + 1.0);
    // +1 for the innovation variance.
    let k = (n_params + 1) as f64;
    let aic = -2.0 * loglik + 2.0 * k;
    if !aic.is_finite() {
        return None;
    }

    Some(SarimaFit {
        order,
        ar,
        ma,
        constant,
        sigma2,
        aic,
        n_eff,
        diff,
        residuals,
    })
}

/// Chosen model plus the search that produced it.
#[derive(Debug, Clone)]
pub struct SarimaModel {
    pub fit: SarimaFit,
    pub trace: Vec<SearchStep>,
}

/// The seasonal ARIMA capability (order search + fit).
#[derive(Debug, Clone, Default)]
pub struct SarimaForecaster {
    pub config: SarimaConfig,
}

impl SarimaForecaster {
    pub fn new(config: SarimaConfig) -> Self {
        Self { config }
    }
}

impl Forecaster for SarimaForecaster {
    type Model = SarimaModel;

    fn name(&self) -> &'static str {
        NAME
    }

    fn min_train_len(&self) -> usize {
        let seasonal = if self.config.m > 1 {
            self.config.seasonal_d * self.config.m
        } else {
            0
        };
        self.config.d + seasonal + MIN_DIFFERENCED_POINTS
    }

    fn fit(&self, train: &DailySeries) -> Result<SarimaModel, PipelineError> {
        let n = train.len();
        if n < self.min_train_len() {
            return Err(PipelineError::fit(
                NAME,
                format!(
                    "need at least {} training days for d={}, D={}, m={}, got {n}",
                    self.min_train_len(),
                    self.config.d,
                    self.config.seasonal_d,
                    self.config.m
                ),
            ));
        }

        let start = Instant::now();
        let y = train.values();
        let (fit, trace) = stepwise_search(&y, &self.config)?;
        info!(
            order = %fit.order,
            aic = fit.aic,
            candidates = trace.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "fitted sarima model"
        );
        Ok(SarimaModel { fit, trace })
    }

    fn predict(&self, model: &SarimaModel, dates: &[NaiveDate]) -> Result<Vec<f64>, PipelineError> {
        // One step per requested date, regardless of calendar gaps.
        let out = model.fit.forecast(dates.len());
        if out.iter().any(|v| !v.is_finite()) {
            return Err(PipelineError::fit(NAME, "forecast diverged (non-finite values)"));
        }
        Ok(out)
    }

    fn describe(&self, model: &SarimaModel) -> String {
        format!(
            "SARIMA{} AIC={:.2} sigma²={:.4} ({} candidates searched)",
            model.fit.order,
            model.fit.aic,
            model.fit.sigma2,
            model.trace.len()
        )
    }

    fn search_trace(&self, model: &SarimaModel) -> Vec<SearchStep> {
        model.trace.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand_distr::{Distribution, Normal};

    fn order(p: usize, d: usize, q: usize, sp: usize, sd: usize, sq: usize, m: usize) -> SarimaOrder {
        SarimaOrder {
            p,
            d,
            q,
            seasonal_p: sp,
            seasonal_d: sd,
            seasonal_q: sq,
            m,
        }
    }

    fn weekly_series(n: usize, seed: u64) -> Vec<f64> {
        const PATTERN: [f64; 7] = [20.0, 5.0, 0.0, -5.0, 10.0, 40.0, -70.0];
        let mut rng = StdRng::seed_from_u64(seed);
        let noise = Normal::new(0.0, 3.0).unwrap();
        (0..n)
            .map(|i| 500.0 + 0.5 * i as f64 + PATTERN[i % 7] + noise.sample(&mut rng))
            .collect()
    }

    #[test]
    fn differencing_inverts_exactly() {
        let y: Vec<f64> = (0..30).map(|i| (i * i) as f64 + (i % 4) as f64).collect();
        let o = order(0, 1, 0, 0, 1, 0, 4);
        let diff = Differencing::apply(&y, &o);
        assert_eq!(diff.output.len(), 30 - 4 - 1);

        // Re-integrating the observed tail of the differences reproduces the series.
        let truncated = Differencing::apply(&y[..25], &o);
        let tail = diff.output[diff.output.len() - 5..].to_vec();
        let rebuilt = truncated.invert(tail);
        for (a, b) in rebuilt.iter().zip(&y[25..]) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn seasonal_lags_are_merged() {
        assert_eq!(lag_set(2, 1, 7), vec![1, 2, 7]);
        assert_eq!(lag_set(1, 2, 12), vec![1, 12, 24]);
        assert_eq!(lag_set(0, 1, 1), Vec::<usize>::new());
    }

    #[test]
    fn ar1_coefficient_is_recovered() {
        let mut rng = StdRng::seed_from_u64(7);
        let noise = Normal::new(0.0, 1.0).unwrap();
        let mut y = vec![0.0];
        for t in 1..600 {
            let prev: f64 = y[t - 1];
            y.push(0.6 * prev + noise.sample(&mut rng));
        }
        let fit = fit_order(&y, order(1, 0, 0, 0, 0, 0, 1)).unwrap();
        let phi = fit.ar_coefs()[0].1;
        assert!((phi - 0.6).abs() < 0.1, "phi = {phi}");
    }

    #[test]
    fn too_short_series_is_rejected() {
        assert!(fit_order(&[1.0, 2.0, 3.0], order(1, 1, 0, 0, 0, 0, 1)).is_none());
    }

    #[test]
    fn seasonal_forecast_tracks_weekly_pattern() {
        let all = weekly_series(182, 42);
        let (train_vals, test_vals) = all.split_at(168);

        let start = NaiveDate::from_ymd_opt(2016, 1, 4).unwrap();
        let pairs: Vec<_> = train_vals
            .iter()
            .enumerate()
            .map(|(i, &v)| (start + Duration::days(i as i64), v))
            .collect();
        let train = DailySeries::from_pairs(&pairs).unwrap();
        let dates: Vec<_> = (168..182).map(|i| start + Duration::days(i)).collect();

        let f = SarimaForecaster::new(SarimaConfig {
            m: 7,
            ..SarimaConfig::default()
        });
        let model = f.fit(&train).unwrap();
        let pred = f.predict(&model, &dates).unwrap();
        assert_eq!(pred.len(), 14);
        assert!(!model.trace.is_empty());

        let mape: f64 = pred
            .iter()
            .zip(test_vals)
            .map(|(p, a)| ((p - a) / a).abs())
            .sum::<f64>()
            / pred.len() as f64;
        assert!(mape < 0.10, "mape = {mape}");
    }

    #[test]
    fn short_training_is_a_fit_error() {
        let f = SarimaForecaster::default();
        let start = NaiveDate::from_ymd_opt(2017, 1, 1).unwrap();
        let pairs: Vec<_> = (0..10).map(|i| (start + Duration::days(i), i as f64)).collect();
        let train = DailySeries::from_pairs(&pairs).unwrap();
        assert!(matches!(f.fit(&train), Err(PipelineError::Fit { .. })));
    }
}
