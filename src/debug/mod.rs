//! Debug bundle writer: a markdown snapshot of one dashboard state.

use std::fmt::Write as _;
use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::PathBuf;

use chrono::Local;
use tracing::info;

use crate::app::pipeline::ForecastOutput;
use crate::domain::{DailySeries, DashboardConfig};
use crate::error::AppError;
use crate::report::format::{format_comparison, format_run_summary, format_search_trace};

/// Write `debug/salesdash_debug_<cutoff>_<model>_<ts>.md` and return its path.
pub fn write_debug_bundle(
    config: &DashboardConfig,
    output: Option<&ForecastOutput>,
    series: &DailySeries,
) -> Result<PathBuf, AppError> {
    let dir = PathBuf::from("debug");
    create_dir_all(&dir).map_err(|e| AppError::new(4, format!("Failed to create debug dir: {e}")))?;

    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!(
        "salesdash_debug_{}_{}_{ts}.md",
        config.cutoff.format("%Y%m%d"),
        config.model.short_name()
    ));

    let body = render_debug_bundle(config, output, series);
    let mut file = File::create(&path)
        .map_err(|e| AppError::new(4, format!("Failed to create debug file: {e}")))?;
    file.write_all(body.as_bytes())
        .map_err(|e| AppError::new(4, format!("Failed to write debug file: {e}")))?;

    info!(path = %path.display(), "wrote debug bundle");
    Ok(path)
}

/// Markdown body of a debug bundle.
pub fn render_debug_bundle(config: &DashboardConfig, output: Option<&ForecastOutput>, series: &DailySeries) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(out, "# salesdash debug bundle");
    let _ = writeln!(out, "- generated: {}", Local::now().to_rfc3339());
    let _ = writeln!(out, "- sales: {}", config.sales_path.display());
    let opt = |p: &Option<PathBuf>| p.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| "-".into());
    let _ = writeln!(out, "- stores: {}", opt(&config.stores_path));
    let _ = writeln!(out, "- holidays: {}", opt(&config.holidays_path));
    let _ = writeln!(out, "- cutoff: {}", config.cutoff);
    let _ = writeln!(out, "- model: {}", config.model.display_name());
    let _ = writeln!(out, "- view: {}", config.frequency.label());
    let _ = writeln!(out, "- additive: {:?}", config.additive);
    let _ = writeln!(out, "- sarima: {:?}", config.sarima);

    let _ = writeln!(out, "\n## Series");
    match (series.first_date(), series.last_date()) {
        (Some(first), Some(last)) => {
            let _ = writeln!(out, "- days: {} [{first} .. {last}]", series.len());
            let expected = (last - first).num_days() + 1;
            let _ = writeln!(out, "- missing calendar days: {}", expected - series.len() as i64);
        }
        _ => {
            let _ = writeln!(out, "- days: 0");
        }
    }

    let Some(output) = output else {
        let _ = writeln!(out, "\n(no forecast run yet)");
        return out;
    };

    let _ = writeln!(out, "\n## Run\n```");
    out.push_str(&format_run_summary(&output.run));
    let _ = writeln!(out, "```");

    match (output.test.first_date(), output.test.last_date()) {
        (Some(first), Some(last)) => {
            let _ = writeln!(out, "- test range: {first} .. {last}");
        }
        _ => {
            let _ = writeln!(out, "- test range: (empty)");
        }
    }

    let trace = format_search_trace(&output.run.search_trace);
    if !trace.is_empty() {
        let _ = writeln!(out, "\n## Order search\n```");
        out.push_str(&trace);
        let _ = writeln!(out, "```");
    }

    let _ = writeln!(out, "\n## Rows\n```");
    out.push_str(&format_comparison(&output.run.rows, crate::domain::Frequency::Daily));
    let _ = writeln!(out, "```");

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    use crate::app::pipeline::run_forecast;
    use crate::domain::{AdditiveConfig, Frequency, ModelKind, SarimaConfig};

    #[test]
    fn bundle_lists_config_and_rows() {
        let start = NaiveDate::from_ymd_opt(2016, 12, 1).unwrap();
        let pairs: Vec<_> = (0..40)
            .filter(|i| *i != 5)
            .map(|i| (start + Duration::days(i), 500.0 + i as f64))
            .collect();
        let series = DailySeries::from_pairs(&pairs).unwrap();
        let config = DashboardConfig {
            sales_path: PathBuf::from("train.csv"),
            stores_path: None,
            holidays_path: None,
            cutoff: NaiveDate::from_ymd_opt(2016, 12, 31).unwrap(),
            model: ModelKind::Additive,
            frequency: Frequency::Daily,
            additive: AdditiveConfig::default(),
            sarima: SarimaConfig::default(),
            export_dir: std::env::temp_dir(),
        };

        let empty = render_debug_bundle(&config, None, &series);
        assert!(empty.contains("- missing calendar days: 1"));
        assert!(empty.contains("(no forecast run yet)"));

        let output = run_forecast(&series, &config).unwrap();
        let full = render_debug_bundle(&config, Some(&output), &series);
        assert!(full.contains("- test range: 2017-01-01 .. 2017-01-09"));
        assert!(full.contains("2017-01-09"));
        assert!(!full.contains("## Order search"));
    }
}
