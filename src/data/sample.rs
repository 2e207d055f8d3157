//! Synthetic store-sales dataset, so the dashboard runs without the real data.
//!
//! Each `(date, store, family)` sale is a product of:
//! - a family base level and a store scale
//! - a linear growth trend
//! - weekday and yearly multipliers
//! - a promotion lift and log-normal noise
//!
//! Stores are closed on Dec 25 and Jan 1 (zero sales).

use std::collections::hash_map::DefaultHasher;
use std::f64::consts::TAU;
use std::hash::{Hash, Hasher};

use chrono::{Datelike, Duration, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{HolidayEvent, SalesRecord, StoreRecord};
use crate::error::AppError;

/// `(family, base daily sales per store)`.
const FAMILIES: [(&str, f64); 8] = [
    ("GROCERY I", 3500.0),
    ("BEVERAGES", 2400.0),
    ("PRODUCE", 1500.0),
    ("CLEANING", 1000.0),
    ("DAIRY", 700.0),
    ("BREAD/BAKERY", 450.0),
    ("PERSONAL CARE", 250.0),
    ("AUTOMOTIVE", 6.0),
];

/// `(city, state)` assigned round-robin to stores.
const CITIES: [(&str, &str); 5] = [
    ("Quito", "Pichincha"),
    ("Guayaquil", "Guayas"),
    ("Cuenca", "Azuay"),
    ("Ambato", "Tungurahua"),
    ("Machala", "El Oro"),
];

const STORE_TYPES: [&str; 5] = ["A", "B", "C", "D", "E"];

/// Monday..Sunday multipliers.
const WEEKDAY_FACTORS: [f64; 7] = [0.92, 0.88, 0.90, 0.86, 0.98, 1.22, 1.24];

/// Yearly growth of the overall level.
const TREND_PER_YEAR: f64 = 0.08;

const YEARLY_AMPLITUDE: f64 = 0.12;

const PROMO_PROBABILITY: f64 = 0.25;
const PROMO_LIFT_PER_ITEM: f64 = 0.02;

const NOISE_SIGMA: f64 = 0.08;

#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub seed: u64,
    pub n_stores: u32,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct SampleData {
    pub sales: Vec<SalesRecord>,
    pub stores: Vec<StoreRecord>,
    pub holidays: Vec<HolidayEvent>,
}

pub fn generate_sample(config: &SampleConfig) -> Result<SampleData, AppError> {
    if config.n_stores == 0 {
        return Err(AppError::new(2, "Store count must be > 0."));
    }
    if config.end < config.start {
        return Err(AppError::new(
            2,
            format!("Invalid date range: {} .. {}", config.start, config.end),
        ));
    }

    let mut rng = StdRng::seed_from_u64(sample_seed(config));
    let noise = Normal::new(0.0, NOISE_SIGMA)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let stores = generate_stores(config.n_stores);
    let store_scales: Vec<f64> = stores.iter().map(|_| rng.gen_range(0.6..1.4)).collect();

    let n_days = (config.end - config.start).num_days() as usize + 1;
    let mut sales = Vec::with_capacity(n_days * stores.len() * FAMILIES.len());
    let mut id = 0u64;

    for offset in 0..n_days {
        let date = config.start + Duration::days(offset as i64);
        let closed = is_closed(date);
        let level = daily_level(date, config.start);

        for (store, scale) in stores.iter().zip(&store_scales) {
            for (family, base) in FAMILIES {
                let onpromotion = if !closed && rng.gen_bool(PROMO_PROBABILITY) {
                    rng.gen_range(1..=20)
                } else {
                    0
                };
                let eps: f64 = noise.sample(&mut rng);
                let value = if closed {
                    0.0
                } else {
                    let lift = 1.0 + PROMO_LIFT_PER_ITEM * onpromotion as f64;
                    base * scale * level * lift * eps.exp()
                };

                sales.push(SalesRecord {
                    id: Some(id),
                    date,
                    store_nbr: store.store_nbr,
                    family: family.to_string(),
                    sales: (value * 1000.0).round() / 1000.0,
                    onpromotion,
                });
                id += 1;
            }
        }
    }

    Ok(SampleData {
        sales,
        stores,
        holidays: generate_holidays(config.start, config.end),
    })
}

/// Trend times weekday and yearly multipliers.
fn daily_level(date: NaiveDate, start: NaiveDate) -> f64 {
    let years = (date - start).num_days() as f64 / 365.25;
    let weekday = WEEKDAY_FACTORS[date.weekday().num_days_from_monday() as usize];
    // Peak in December.
    let phase = TAU * (date.ordinal() as f64 - 350.0) / 365.25;
    (1.0 + TREND_PER_YEAR * years) * weekday * (1.0 + YEARLY_AMPLITUDE * phase.cos())
}

fn is_closed(date: NaiveDate) -> bool {
    matches!((date.month(), date.day()), (12, 25) | (1, 1))
}

fn generate_stores(n: u32) -> Vec<StoreRecord> {
    (1..=n)
        .map(|store_nbr| {
            let i = (store_nbr - 1) as usize;
            let (city, state) = CITIES[i % CITIES.len()];
            StoreRecord {
                store_nbr,
                city: city.to_string(),
                state: state.to_string(),
                store_type: STORE_TYPES[i % STORE_TYPES.len()].to_string(),
                cluster: (i % 17) as u32 + 1,
            }
        })
        .collect()
}

fn generate_holidays(start: NaiveDate, end: NaiveDate) -> Vec<HolidayEvent> {
    let fixed: [(u32, u32, &str, &str, &str, &str); 5] = [
        (1, 1, "Holiday", "National", "Ecuador", "Primer dia del ano"),
        (5, 1, "Holiday", "National", "Ecuador", "Dia del Trabajo"),
        (8, 10, "Holiday", "National", "Ecuador", "Primer Grito de Independencia"),
        (12, 6, "Holiday", "Local", "Quito", "Fundacion de Quito"),
        (12, 25, "Holiday", "National", "Ecuador", "Navidad"),
    ];

    let mut out = Vec::new();
    for year in start.year()..=end.year() {
        for &(month, day, kind, locale, locale_name, description) in &fixed {
            let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
                continue;
            };
            if date < start || date > end {
                continue;
            }
            out.push(HolidayEvent {
                date,
                kind: kind.to_string(),
                locale: locale.to_string(),
                locale_name: locale_name.to_string(),
                description: description.to_string(),
                transferred: false,
            });
        }
    }
    out
}

fn sample_seed(config: &SampleConfig) -> u64 {
    let mut hasher = DefaultHasher::new();
    config.seed.hash(&mut hasher);
    config.n_stores.hash(&mut hasher);
    config.start.hash(&mut hasher);
    config.end.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(seed: u64) -> SampleConfig {
        SampleConfig {
            seed,
            n_stores: 2,
            start: NaiveDate::from_ymd_opt(2016, 12, 20).unwrap(),
            end: NaiveDate::from_ymd_opt(2017, 1, 20).unwrap(),
        }
    }

    #[test]
    fn sample_is_deterministic_per_seed() {
        let a = generate_sample(&config(7)).unwrap();
        let b = generate_sample(&config(7)).unwrap();
        let c = generate_sample(&config(8)).unwrap();
        assert_eq!(a.sales, b.sales);
        assert_ne!(a.sales, c.sales);
    }

    #[test]
    fn one_record_per_day_store_family() {
        let data = generate_sample(&config(1)).unwrap();
        assert_eq!(data.sales.len(), 32 * 2 * FAMILIES.len());
        assert_eq!(data.stores.len(), 2);
        assert!(data.sales.iter().all(|r| r.sales >= 0.0));
        // Dec 25 and Jan 1 in range.
        assert_eq!(data.holidays.iter().filter(|h| h.locale == "National").count(), 2);
    }

    #[test]
    fn closed_days_have_zero_sales() {
        let data = generate_sample(&config(3)).unwrap();
        for r in &data.sales {
            if is_closed(r.date) {
                assert_eq!(r.sales, 0.0);
                assert_eq!(r.onpromotion, 0);
            }
        }
        let open_total: f64 = data.sales.iter().filter(|r| !is_closed(r.date)).map(|r| r.sales).sum();
        assert!(open_total > 0.0);
    }

    #[test]
    fn rejects_bad_config() {
        let mut cfg = config(1);
        cfg.n_stores = 0;
        assert!(generate_sample(&cfg).is_err());

        let mut cfg = config(1);
        cfg.end = cfg.start - Duration::days(1);
        assert_eq!(generate_sample(&cfg).unwrap_err().exit_code(), 2);
    }
}
