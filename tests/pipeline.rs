use chrono::NaiveDate;

use sales_dash::app::pipeline::{run_forecast_on_records, run_with};
use sales_dash::data::{SampleConfig, generate_sample};
use sales_dash::domain::{
    AdditiveConfig, DailySeries, DashboardConfig, Frequency, ModelKind, SarimaConfig,
};
use sales_dash::error::PipelineError;
use sales_dash::io::load_sales_from_reader;
use sales_dash::models::Forecaster;
use sales_dash::series::aggregate_daily;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// Predicts the training mean for every date.
struct MeanForecaster;

impl Forecaster for MeanForecaster {
    type Model = f64;

    fn name(&self) -> &'static str {
        "mean"
    }

    fn min_train_len(&self) -> usize {
        1
    }

    fn fit(&self, train: &DailySeries) -> Result<f64, PipelineError> {
        let values = train.values();
        Ok(values.iter().sum::<f64>() / values.len() as f64)
    }

    fn predict(&self, model: &f64, dates: &[NaiveDate]) -> Result<Vec<f64>, PipelineError> {
        Ok(vec![*model; dates.len()])
    }

    fn describe(&self, model: &f64) -> String {
        format!("mean={model}")
    }
}

const THREE_DAYS: &str = "\
id,date,store_nbr,family,sales,onpromotion
0,2017-01-01,1,GROCERY I,60,0
1,2017-01-01,2,GROCERY I,40,0
2,2017-01-02,1,GROCERY I,120,3
3,2017-01-03,1,GROCERY I,50,0
4,2017-01-03,2,BEVERAGES,40,1
";

#[test]
fn three_day_scenario_yields_two_rows() {
    let records = load_sales_from_reader(THREE_DAYS.as_bytes(), "train.csv").unwrap();
    let series = aggregate_daily(&records);
    assert_eq!(series.values(), vec![100.0, 120.0, 90.0]);

    let out = run_with(&MeanForecaster, ModelKind::Additive, &series, d(2017, 1, 1)).unwrap();
    assert_eq!(out.train.dates(), vec![d(2017, 1, 1)]);
    assert_eq!(out.test.dates(), vec![d(2017, 1, 2), d(2017, 1, 3)]);

    let rows = &out.run.rows;
    assert_eq!(rows.len(), 2);
    assert_eq!((rows[0].date, rows[0].actual_sales, rows[0].predicted_sales), (d(2017, 1, 2), 120.0, 100.0));
    assert_eq!((rows[1].date, rows[1].actual_sales, rows[1].predicted_sales), (d(2017, 1, 3), 90.0, 100.0));
    assert_eq!(out.run.model_summary, "mean=100");
}

#[test]
fn cutoff_before_all_data_is_a_fit_error() {
    let records = load_sales_from_reader(THREE_DAYS.as_bytes(), "train.csv").unwrap();
    let series = aggregate_daily(&records);
    let err = run_with(&MeanForecaster, ModelKind::Additive, &series, d(2016, 12, 31)).unwrap_err();
    assert!(matches!(err, PipelineError::Fit { .. }));
}

#[test]
fn cutoff_after_all_data_gives_empty_comparison() {
    let records = load_sales_from_reader(THREE_DAYS.as_bytes(), "train.csv").unwrap();
    let series = aggregate_daily(&records);
    let out = run_with(&MeanForecaster, ModelKind::Additive, &series, d(2017, 1, 3)).unwrap();
    assert_eq!(out.run.train_days, 3);
    assert!(out.run.rows.is_empty());
    assert!(out.run.accuracy.is_none());
}

#[test]
fn additive_forecast_on_sample_data_is_repeatable() {
    let sample = generate_sample(&SampleConfig {
        seed: 11,
        n_stores: 2,
        start: d(2016, 6, 1),
        end: d(2017, 2, 28),
    })
    .unwrap();

    let config = DashboardConfig {
        sales_path: "unused.csv".into(),
        stores_path: None,
        holidays_path: None,
        cutoff: d(2016, 12, 31),
        model: ModelKind::Additive,
        frequency: Frequency::Weekly,
        additive: AdditiveConfig::default(),
        sarima: SarimaConfig::default(),
        export_dir: std::env::temp_dir(),
    };

    let a = run_forecast_on_records(&sample.sales, &config).unwrap();
    let b = run_forecast_on_records(&sample.sales, &config).unwrap();
    assert_eq!(a.run.rows, b.run.rows);

    assert_eq!(a.run.test_days, 59);
    assert_eq!(a.run.rows.first().map(|r| r.date), Some(d(2017, 1, 1)));
    assert_eq!(a.run.rows.last().map(|r| r.date), Some(d(2017, 2, 28)));

    let mape = a.run.accuracy.and_then(|acc| acc.mape).unwrap();
    assert!(mape < 30.0, "mape={mape}");
}
