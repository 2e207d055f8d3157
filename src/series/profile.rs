//! Exploratory summaries of the raw tables.
//!
//! These back the "Data" views: totals per year, seasonal means, product mix,
//! promotion intensity and store footprint. All outputs are deterministic
//! (explicit ordering, ties broken by key).

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{Datelike, Weekday};

use crate::domain::{HolidayEvent, SalesRecord, StoreRecord};

pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Running sum + count for a mean.
#[derive(Debug, Clone, Copy, Default)]
struct MeanAcc {
    sum: f64,
    n: usize,
}

impl MeanAcc {
    fn push(&mut self, v: f64) {
        self.sum += v;
        self.n += 1;
    }

    fn mean(&self) -> Option<f64> {
        (self.n > 0).then(|| self.sum / self.n as f64)
    }
}

/// Total sales per calendar year, ascending by year.
pub fn yearly_totals(records: &[SalesRecord]) -> Vec<(i32, f64)> {
    let mut out: BTreeMap<i32, f64> = BTreeMap::new();
    for r in records {
        *out.entry(r.date.year()).or_insert(0.0) += r.sales;
    }
    out.into_iter().collect()
}

/// Mean record-level sales per calendar month (1 = January). Months without data are skipped.
pub fn monthly_means(records: &[SalesRecord]) -> Vec<(u32, f64)> {
    let mut acc = [MeanAcc::default(); 12];
    for r in records {
        acc[r.date.month0() as usize].push(r.sales);
    }
    acc.iter()
        .enumerate()
        .filter_map(|(i, a)| a.mean().map(|m| (i as u32 + 1, m)))
        .collect()
}

/// Mean record-level sales per weekday, Monday first. Weekdays without data are skipped.
pub fn weekday_means(records: &[SalesRecord]) -> Vec<(Weekday, f64)> {
    let mut acc = [MeanAcc::default(); 7];
    for r in records {
        acc[r.date.weekday().num_days_from_monday() as usize].push(r.sales);
    }

    const ORDER: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];
    ORDER
        .iter()
        .zip(acc.iter())
        .filter_map(|(&day, a)| a.mean().map(|m| (day, m)))
        .collect()
}

/// Product families by mean record-level sales, highest first (at most `n`).
pub fn top_families(records: &[SalesRecord], n: usize) -> Vec<(String, f64)> {
    let mut acc: HashMap<&str, MeanAcc> = HashMap::new();
    for r in records {
        acc.entry(r.family.as_str()).or_default().push(r.sales);
    }

    let mut out: Vec<(String, f64)> = acc
        .into_iter()
        .filter_map(|(family, a)| a.mean().map(|m| (family.to_string(), m)))
        .collect();
    out.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    out.truncate(n);
    out
}

/// Per-year promotion intensity next to sales.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PromotionYear {
    pub year: i32,
    pub mean_onpromotion: f64,
    pub mean_sales: f64,
}

/// Mean `onpromotion` and mean `sales` per year, ascending by year.
pub fn yearly_promotion_vs_sales(records: &[SalesRecord]) -> Vec<PromotionYear> {
    let mut acc: BTreeMap<i32, (MeanAcc, MeanAcc)> = BTreeMap::new();
    for r in records {
        let (promo, sales) = acc.entry(r.date.year()).or_default();
        promo.push(r.onpromotion as f64);
        sales.push(r.sales);
    }

    acc.into_iter()
        .filter_map(|(year, (promo, sales))| {
            Some(PromotionYear {
                year,
                mean_onpromotion: promo.mean()?,
                mean_sales: sales.mean()?,
            })
        })
        .collect()
}

/// Number of distinct stores per state, most stores first.
pub fn stores_per_state(stores: &[StoreRecord]) -> Vec<(String, usize)> {
    let mut acc: HashMap<&str, BTreeSet<u32>> = HashMap::new();
    for s in stores {
        acc.entry(s.state.as_str()).or_default().insert(s.store_nbr);
    }
    sort_counts(acc.into_iter().map(|(k, v)| (k.to_string(), v.len())).collect())
}

/// Number of distinct stores per `(city, state)`, most stores first.
pub fn stores_per_city(stores: &[StoreRecord]) -> Vec<((String, String), usize)> {
    let mut acc: HashMap<(&str, &str), BTreeSet<u32>> = HashMap::new();
    for s in stores {
        acc.entry((s.city.as_str(), s.state.as_str()))
            .or_default()
            .insert(s.store_nbr);
    }
    sort_counts(
        acc.into_iter()
            .map(|((city, state), v)| ((city.to_string(), state.to_string()), v.len()))
            .collect(),
    )
}

/// Number of calendar events per locale (National / Regional / Local), most first.
pub fn holiday_counts_by_locale(events: &[HolidayEvent]) -> Vec<(String, usize)> {
    let mut acc: HashMap<&str, usize> = HashMap::new();
    for e in events {
        *acc.entry(e.locale.as_str()).or_insert(0) += 1;
    }
    sort_counts(acc.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
}

fn sort_counts<K: Ord>(mut v: Vec<(K, usize)>) -> Vec<(K, usize)> {
    v.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn rec(y: i32, m: u32, day: u32, family: &str, sales: f64, promo: u32) -> SalesRecord {
        SalesRecord {
            id: None,
            date: NaiveDate::from_ymd_opt(y, m, day).unwrap(),
            store_nbr: 1,
            family: family.to_string(),
            sales,
            onpromotion: promo,
        }
    }

    fn store(nbr: u32, city: &str, state: &str) -> StoreRecord {
        StoreRecord {
            store_nbr: nbr,
            city: city.to_string(),
            state: state.to_string(),
            store_type: "A".to_string(),
            cluster: 1,
        }
    }

    #[test]
    fn calendar_summaries() {
        // 2017-01-02 is a Monday, 2017-01-08 a Sunday.
        let records = vec![
            rec(2016, 12, 31, "A", 4.0, 0),
            rec(2017, 1, 2, "A", 10.0, 2),
            rec(2017, 1, 2, "B", 20.0, 0),
            rec(2017, 1, 8, "B", 6.0, 1),
        ];

        assert_eq!(yearly_totals(&records), vec![(2016, 4.0), (2017, 36.0)]);
        assert_eq!(monthly_means(&records), vec![(1, 12.0), (12, 4.0)]);

        let wd = weekday_means(&records);
        assert_eq!(wd.first(), Some(&(Weekday::Mon, 15.0)));
        assert_eq!(wd.last(), Some(&(Weekday::Sun, 6.0)));
        assert_eq!(wd.len(), 3); // Mon, Sat, Sun

        let promo = yearly_promotion_vs_sales(&records);
        assert_eq!(promo.len(), 2);
        assert_eq!(promo[1].year, 2017);
        assert!((promo[1].mean_onpromotion - 1.0).abs() < 1e-12);
        assert!((promo[1].mean_sales - 12.0).abs() < 1e-12);
    }

    #[test]
    fn top_families_sorted_and_truncated() {
        let records = vec![
            rec(2017, 1, 1, "A", 1.0, 0),
            rec(2017, 1, 1, "B", 9.0, 0),
            rec(2017, 1, 2, "B", 11.0, 0),
            rec(2017, 1, 1, "C", 5.0, 0),
        ];
        let top = top_families(&records, 2);
        assert_eq!(top, vec![("B".to_string(), 10.0), ("C".to_string(), 5.0)]);
    }

    #[test]
    fn store_counts_are_distinct_and_descending() {
        let stores = vec![
            store(1, "Quito", "Pichincha"),
            store(2, "Quito", "Pichincha"),
            store(2, "Quito", "Pichincha"),
            store(3, "Guayaquil", "Guayas"),
            store(4, "Cayambe", "Pichincha"),
        ];
        assert_eq!(
            stores_per_state(&stores),
            vec![("Pichincha".to_string(), 3), ("Guayas".to_string(), 1)]
        );
        let cities = stores_per_city(&stores);
        assert_eq!(cities[0], (("Quito".to_string(), "Pichincha".to_string()), 2));
        assert_eq!(cities.len(), 3);
    }
}
