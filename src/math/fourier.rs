//! Fourier seasonality features.

use std::f64::consts::PI;

use chrono::{Datelike, NaiveDate};

/// Days per year used for yearly seasonality.
pub const YEAR_DAYS: f64 = 365.25;
/// Days per week used for weekly seasonality.
pub const WEEK_DAYS: f64 = 7.0;

/// Absolute day index (days since 1970-01-01), the time axis of every seasonal term.
///
/// Using an absolute epoch keeps seasonal phase identical between training and
/// prediction dates.
pub fn day_index(date: NaiveDate) -> f64 {
    const EPOCH_DAYS_FROM_CE: i32 = 719_163;
    (date.num_days_from_ce() - EPOCH_DAYS_FROM_CE) as f64
}

/// `2 * order` features: `[sin(2π·1·t/P), cos(2π·1·t/P), …, sin(2π·K·t/P), cos(2π·K·t/P)]`.
pub fn fourier_terms(t: f64, period: f64, order: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(2 * order);
    for k in 1..=order {
        let x = 2.0 * PI * k as f64 * t / period;
        out.push(x.sin());
        out.push(x.cos());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_is_day_zero() {
        assert_eq!(day_index(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()), 0.0);
        assert_eq!(day_index(NaiveDate::from_ymd_opt(1970, 1, 8).unwrap()), 7.0);
    }

    #[test]
    fn terms_repeat_every_period() {
        let a = fourier_terms(3.0, WEEK_DAYS, 3);
        let b = fourier_terms(10.0, WEEK_DAYS, 3);
        assert_eq!(a.len(), 6);
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).abs() < 1e-9);
        }
    }
}
