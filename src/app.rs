//! Top-level application orchestration.
//!
//! `src/main.rs` only maps the result to an exit code; this module:
//! - loads `.env` and parses CLI arguments
//! - resolves them into a `DashboardConfig`
//! - dispatches to the TUI or to one of the scriptable subcommands

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::info;

use crate::cli::{Command, DataArgs, DemoArgs, ExploreArgs, ExportArgs, ForecastArgs, PlotArgs, TuiArgs};
use crate::domain::{AdditiveConfig, DashboardConfig, SarimaConfig};
use crate::error::AppError;
use crate::io::parse_date;

pub mod pipeline;

/// Sales table used when none is configured.
const DEFAULT_SALES_FILE: &str = "train.csv";

/// Entry point for the `salesdash` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env is fine.
    let _ = dotenvy::dotenv();

    // `salesdash` and `salesdash --cutoff ...` behave like `salesdash tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Tui(args) => handle_tui(args),
        Command::Forecast(args) => handle_forecast(args),
        Command::Explore(args) => handle_explore(args),
        Command::Export(args) => handle_export(args),
        Command::Plot(args) => handle_plot(args),
        Command::Demo(args) => handle_demo(args),
    }
}

fn handle_tui(args: TuiArgs) -> Result<(), AppError> {
    crate::logging::init_file(&args.log_file)?;
    let mut config = config_from_args(&args.data)?;
    config.sales_path = resolve_sales_path(args.data.sales.as_deref())?;
    info!(sales = %config.sales_path.display(), "starting tui");
    crate::tui::run(config)
}

fn handle_forecast(args: ForecastArgs) -> Result<(), AppError> {
    crate::logging::init_stderr();
    let config = cli_config(&args.data)?;

    let pass = pipeline::DataCache::new().forecast(&config)?;
    let run = &pass.output.run;

    println!("{}", crate::report::format::format_run_summary(run));
    println!("{}", crate::report::format::format_comparison(&run.rows, config.frequency));
    if args.trace {
        println!("{}", crate::report::format::format_search_trace(&run.search_trace));
    }

    if !args.no_plot {
        let rows = crate::report::resample(&run.rows, config.frequency);
        println!("{}", crate::plot::render_comparison_plot(&rows, args.width, args.height));
    }

    if let Some(path) = &args.export_csv {
        crate::io::write_comparison_csv(path, &run.rows)?;
    }
    if let Some(path) = &args.export_run {
        crate::io::write_run_json(path, run)?;
    }

    Ok(())
}

fn handle_explore(args: ExploreArgs) -> Result<(), AppError> {
    crate::logging::init_stderr();
    let config = cli_config(&args.data)?;
    let data = pipeline::DataCache::new().load(&config)?;

    println!(
        "{}",
        crate::report::format::format_data_overview(&data.sales, &data.stores, &data.holidays, args.top)
    );
    Ok(())
}

fn handle_export(args: ExportArgs) -> Result<(), AppError> {
    crate::logging::init_stderr();
    let config = cli_config(&args.data)?;
    let data = pipeline::DataCache::new().load(&config)?;

    let paths = crate::io::export_source_tables(&config.export_dir, &data.sales, &data.stores, &data.holidays)?;
    for path in paths {
        println!("{}", path.display());
    }
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let run = crate::io::read_run_json(&args.run)?;

    println!("{}", crate::report::format::format_run_summary(&run));
    println!("{}", crate::plot::render_comparison_plot(&run.rows, args.width, args.height));
    Ok(())
}

fn handle_demo(args: DemoArgs) -> Result<(), AppError> {
    crate::logging::init_stderr();
    let sample_config = crate::data::SampleConfig {
        seed: args.seed,
        n_stores: args.stores,
        start: parse_cli_date("--start", &args.start)?,
        end: parse_cli_date("--end", &args.end)?,
    };
    let sample = crate::data::generate_sample(&sample_config)?;
    info!(rows = sample.sales.len(), seed = args.seed, "generated sample dataset");

    let paths = crate::io::export_source_tables(&args.out, &sample.sales, &sample.stores, &sample.holidays)?;
    for path in &paths {
        println!("{}", path.display());
    }

    let dir = args.out.display();
    println!(
        "\nRun: salesdash tui --sales {dir}/{} --stores {dir}/{} --holidays {dir}/{}",
        crate::io::SALES_EXPORT_FILE,
        crate::io::STORES_EXPORT_FILE,
        crate::io::HOLIDAYS_EXPORT_FILE,
    );
    Ok(())
}

/// Config for non-interactive subcommands, with the picker as sales fallback.
fn cli_config(args: &DataArgs) -> Result<DashboardConfig, AppError> {
    let mut config = config_from_args(args)?;
    config.sales_path = resolve_sales_path(args.sales.as_deref())?;
    Ok(config)
}

/// Resolve arguments into a `DashboardConfig`.
///
/// The sales path defaults to `train.csv`; `resolve_sales_path` handles the
/// interactive fallback.
pub fn config_from_args(args: &DataArgs) -> Result<DashboardConfig, AppError> {
    let cutoff = parse_cli_date("--cutoff", &args.cutoff)?;
    if args.season == 0 {
        return Err(AppError::new(2, "--season must be >= 1."));
    }

    Ok(DashboardConfig {
        sales_path: args
            .sales
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SALES_FILE)),
        stores_path: args.stores.clone(),
        holidays_path: args.holidays.clone(),
        cutoff,
        model: args.model,
        frequency: args.frequency,
        additive: AdditiveConfig {
            n_changepoints: args.changepoints,
            ..AdditiveConfig::default()
        },
        sarima: SarimaConfig {
            m: args.season,
            ..SarimaConfig::default()
        },
        export_dir: args.export_dir.clone(),
    })
}

fn parse_cli_date(flag: &str, value: &str) -> Result<chrono::NaiveDate, AppError> {
    parse_date(value).map_err(|e| AppError::new(2, format!("Invalid {flag}: {e}")))
}

/// Explicit path as given; otherwise `train.csv` if present; otherwise ask.
fn resolve_sales_path(explicit: Option<&Path>) -> Result<PathBuf, AppError> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    let default = PathBuf::from(DEFAULT_SALES_FILE);
    if default.is_file() {
        return Ok(default);
    }
    if !std::io::stdin().is_terminal() {
        return Err(AppError::new(
            2,
            "No sales table: pass --sales <CSV> (or set SALES_CSV).",
        ));
    }
    crate::cli::picker::prompt_for_sales_csv()
}

/// Rewrite argv so `salesdash` defaults to `salesdash tui`.
///
/// - `salesdash`                   -> `salesdash tui`
/// - `salesdash --cutoff X ...`    -> `salesdash tui --cutoff X ...`
/// - `salesdash --help/--version`  -> unchanged
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(
        arg1.as_str(),
        "tui" | "forecast" | "explore" | "export" | "plot" | "demo"
    );
    if is_subcommand {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
    }
    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::domain::{Frequency, ModelKind};

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_binary_defaults_to_tui() {
        assert_eq!(rewrite_args(argv(&["salesdash"])), argv(&["salesdash", "tui"]));
        assert_eq!(
            rewrite_args(argv(&["salesdash", "--cutoff", "2017-01-01"])),
            argv(&["salesdash", "tui", "--cutoff", "2017-01-01"])
        );
        assert_eq!(rewrite_args(argv(&["salesdash", "--help"])), argv(&["salesdash", "--help"]));
        assert_eq!(
            rewrite_args(argv(&["salesdash", "forecast", "-m", "sarima"])),
            argv(&["salesdash", "forecast", "-m", "sarima"])
        );
    }

    fn data_args(extra: &[&str]) -> DataArgs {
        let mut args = vec!["salesdash", "export"];
        args.extend_from_slice(extra);
        match Cli::try_parse_from(args).unwrap().command {
            Command::Export(a) => a.data,
            _ => panic!("expected export"),
        }
    }

    #[test]
    fn config_resolves_flags() {
        let cfg = config_from_args(&data_args(&[
            "--sales",
            "s.csv",
            "--cutoff",
            "2017/01/01",
            "--model",
            "sarima",
            "--freq",
            "monthly",
            "--season",
            "7",
        ]))
        .unwrap();
        assert_eq!(cfg.sales_path, PathBuf::from("s.csv"));
        assert_eq!(cfg.cutoff, chrono::NaiveDate::from_ymd_opt(2017, 1, 1).unwrap());
        assert_eq!(cfg.model, ModelKind::Sarima);
        assert_eq!(cfg.frequency, Frequency::Monthly);
        assert_eq!(cfg.sarima.m, 7);
    }

    #[test]
    fn config_rejects_bad_cutoff_and_season() {
        let err = config_from_args(&data_args(&["--sales", "s.csv", "--cutoff", "soon"])).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(config_from_args(&data_args(&["--sales", "s.csv", "--season", "0"])).is_err());
    }
}
