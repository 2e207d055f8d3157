//! Stepwise SARIMA order search.
//!
//! Hill climbing over `(p, q, P, Q)` with the differencing orders held fixed:
//!
//! 1. fit a small set of starting orders
//! 2. fit every unvisited admissible neighbour of the current best order
//! 3. move to the lowest-AIC candidate if it improves on the current best,
//!    otherwise stop
//!
//! Neighbours of one step are independent and are evaluated in parallel.
//! Selection is deterministic: lowest AIC, ties broken by evaluation order
//! (starting orders first, then neighbours in generation order).

use std::collections::HashSet;

use rayon::prelude::*;
use tracing::debug;

use crate::domain::{SarimaConfig, SarimaOrder, SearchStep};
use crate::error::PipelineError;
use crate::models::sarima::{SarimaFit, fit_order};

/// Moves applied to `(p, q, P, Q)` to generate neighbours.
const MOVES: [(i32, i32, i32, i32); 12] = [
    (-1, 0, 0, 0),
    (1, 0, 0, 0),
    (0, -1, 0, 0),
    (0, 1, 0, 0),
    (-1, -1, 0, 0),
    (1, 1, 0, 0),
    (0, 0, -1, 0),
    (0, 0, 1, 0),
    (0, 0, 0, -1),
    (0, 0, 0, 1),
    (0, 0, -1, -1),
    (0, 0, 1, 1),
];

fn make_order(cfg: &SarimaConfig, p: usize, q: usize, sp: usize, sq: usize) -> SarimaOrder {
    let seasonal = cfg.m > 1;
    SarimaOrder {
        p,
        d: cfg.d,
        q,
        seasonal_p: if seasonal { sp } else { 0 },
        seasonal_d: if seasonal { cfg.seasonal_d } else { 0 },
        seasonal_q: if seasonal { sq } else { 0 },
        m: cfg.m,
    }
}

fn admissible(cfg: &SarimaConfig, o: &SarimaOrder) -> bool {
    o.p <= cfg.max_p
        && o.q <= cfg.max_q
        && o.seasonal_p <= cfg.max_seasonal_p
        && o.seasonal_q <= cfg.max_seasonal_q
        && o.total_order() <= cfg.max_order
}

/// Starting orders: the configured start plus the three classic anchors.
pub fn starting_orders(cfg: &SarimaConfig) -> Vec<SarimaOrder> {
    let seeds = [
        (cfg.start_p, cfg.start_q, cfg.start_seasonal_p, cfg.start_seasonal_q),
        (0, 0, 0, 0),
        (1, 0, 1, 0),
        (0, 1, 0, 1),
    ];
    let mut seen = HashSet::new();
    seeds
        .iter()
        .map(|&(p, q, sp, sq)| make_order(cfg, p, q, sp, sq))
        .filter(|o| admissible(cfg, o) && seen.insert(*o))
        .collect()
}

/// Admissible neighbours of `o`, in a fixed order.
pub fn neighbours(cfg: &SarimaConfig, o: &SarimaOrder) -> Vec<SarimaOrder> {
    let shift = |v: usize, by: i32| usize::try_from(v as i64 + by as i64).ok();
    let mut seen = HashSet::new();
    MOVES
        .iter()
        .filter_map(|&(dp, dq, dsp, dsq)| {
            Some(make_order(
                cfg,
                shift(o.p, dp)?,
                shift(o.q, dq)?,
                shift(o.seasonal_p, dsp)?,
                shift(o.seasonal_q, dsq)?,
            ))
        })
        .filter(|n| n != o && admissible(cfg, n) && seen.insert(*n))
        .collect()
}

/// Visited set, trace and incumbent of one search.
struct SearchState<'a> {
    y: &'a [f64],
    visited: HashSet<SarimaOrder>,
    trace: Vec<SearchStep>,
    best: Option<SarimaFit>,
}

impl SearchState<'_> {
    /// Fit a batch in parallel, then fold results in batch order.
    /// Returns whether the incumbent improved.
    fn evaluate(&mut self, batch: Vec<SarimaOrder>) -> bool {
        self.visited.extend(batch.iter().copied());
        let y = self.y;
        let results: Vec<(SarimaOrder, Option<SarimaFit>)> =
            batch.par_iter().map(|&o| (o, fit_order(y, o))).collect();

        let mut improved = false;
        for (order, fit) in results {
            let aic = fit.as_ref().map(|f| f.aic);
            debug!(%order, aic = ?aic, "order search candidate");
            self.trace.push(SearchStep { order, aic });

            if let Some(fit) = fit {
                if self.best.as_ref().is_none_or(|b| fit.aic < b.aic) {
                    self.best = Some(fit);
                    improved = true;
                }
            }
        }
        improved
    }
}

/// Run the search on `y` and return the best fit plus every candidate visited.
pub fn stepwise_search(
    y: &[f64],
    cfg: &SarimaConfig,
) -> Result<(SarimaFit, Vec<SearchStep>), PipelineError> {
    let mut state = SearchState {
        y,
        visited: HashSet::new(),
        trace: Vec::new(),
        best: None,
    };

    state.evaluate(starting_orders(cfg));

    let mut steps = 0;
    while steps < cfg.max_steps {
        let Some(current) = state.best.as_ref().map(|b| b.order) else {
            break;
        };
        let batch: Vec<SarimaOrder> = neighbours(cfg, &current)
            .into_iter()
            .filter(|o| !state.visited.contains(o))
            .collect();
        if batch.is_empty() || !state.evaluate(batch) {
            break;
        }
        steps += 1;
    }

    let SearchState { trace, best, .. } = state;
    let fit = best.ok_or_else(|| {
        PipelineError::fit(
            "sarima",
            format!("no candidate order could be fitted ({} tried)", trace.len()),
        )
    })?;
    debug!(order = %fit.order, aic = fit.aic, steps, "order search finished");
    Ok((fit, trace))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_orders_respect_bounds_and_dedupe() {
        let cfg = SarimaConfig::default();
        let starts = starting_orders(&cfg);
        assert_eq!(starts.len(), 4);
        assert_eq!(starts[0].to_string(), "(1,1,1)(0,1,1)[12]");

        // Non-seasonal: the seasonal anchors collapse onto the plain ones.
        let plain = SarimaConfig {
            m: 1,
            ..SarimaConfig::default()
        };
        let starts = starting_orders(&plain);
        assert!(starts.iter().all(|o| o.seasonal_p == 0 && o.seasonal_q == 0 && o.seasonal_d == 0));
        assert_eq!(starts.len(), 4); // (1,1) (0,0) (1,0) (0,1)
    }

    #[test]
    fn neighbours_stay_in_bounds() {
        let cfg = SarimaConfig::default();
        let origin = make_order(&cfg, 0, 0, 0, 0);
        let ns = neighbours(&cfg, &origin);
        assert!(ns.iter().all(|o| admissible(&cfg, o)));
        assert!(!ns.contains(&origin));
        assert_eq!(ns.len(), 6); // only the "+1" moves survive

        let edge = make_order(&cfg, 3, 2, 0, 0);
        assert!(neighbours(&cfg, &edge).iter().all(|o| o.total_order() <= cfg.max_order));
    }

    #[test]
    fn search_on_unfittable_series_is_a_fit_error() {
        let err = stepwise_search(&[1.0, 2.0, 3.0], &SarimaConfig::default()).unwrap_err();
        assert!(matches!(err, PipelineError::Fit { .. }));
    }

    #[test]
    fn search_is_deterministic() {
        let y: Vec<f64> = (0..120)
            .map(|i| 100.0 + i as f64 + [3.0, -1.0, 4.0, -1.0, 5.0, -9.0, 2.0][i % 7] + ((i * 37 % 11) as f64))
            .collect();
        let cfg = SarimaConfig {
            m: 7,
            ..SarimaConfig::default()
        };
        let (a, trace_a) = stepwise_search(&y, &cfg).unwrap();
        let (b, trace_b) = stepwise_search(&y, &cfg).unwrap();
        assert_eq!(a.order, b.order);
        assert_eq!(trace_a, trace_b);
        assert!(trace_a.iter().filter_map(|s| s.aic).all(|aic| aic >= a.aic));
    }
}
