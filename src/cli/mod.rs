//! Command-line parsing for the store-sales forecast dashboard.
//!
//! Parsing and dispatch stay separate from the pipeline code; `app` turns
//! these structs into a `DashboardConfig`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{DEFAULT_CUTOFF, Frequency, ModelKind};

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "salesdash", version, about = "Store sales forecast vs actual dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive TUI (default).
    Tui(TuiArgs),
    /// Fit the selected model, print the comparison and accuracy, optionally plot/export.
    Forecast(ForecastArgs),
    /// Print data-exploration tables for the source tables.
    Explore(ExploreArgs),
    /// Write the loaded source tables back to CSV.
    Export(ExportArgs),
    /// Plot a previously exported run JSON.
    Plot(PlotArgs),
    /// Generate a synthetic dataset (train/stores/holidays CSVs).
    Demo(DemoArgs),
}

/// Inputs and model settings shared by every data-consuming subcommand.
#[derive(Debug, Args, Clone)]
pub struct DataArgs {
    /// Sales table (`date,store_nbr,family,sales,onpromotion`).
    #[arg(short = 'f', long, env = "SALES_CSV", value_name = "CSV")]
    pub sales: Option<PathBuf>,

    /// Store metadata table.
    #[arg(long, env = "STORES_CSV", value_name = "CSV")]
    pub stores: Option<PathBuf>,

    /// Holidays/events table.
    #[arg(long, env = "HOLIDAYS_CSV", value_name = "CSV")]
    pub holidays: Option<PathBuf>,

    /// Train/test cutoff (train: date <= cutoff).
    #[arg(short = 'c', long, default_value = DEFAULT_CUTOFF, value_name = "YYYY-MM-DD")]
    pub cutoff: String,

    /// Forecasting model.
    #[arg(short = 'm', long, value_enum, default_value_t = ModelKind::Additive)]
    pub model: ModelKind,

    /// Comparison granularity.
    #[arg(long = "freq", value_enum, default_value_t = Frequency::Daily)]
    pub frequency: Frequency,

    /// SARIMA seasonal period, in observations.
    #[arg(long, default_value_t = 12)]
    pub season: usize,

    /// Number of trend changepoints for the additive model.
    #[arg(long, default_value_t = 25)]
    pub changepoints: usize,

    /// Directory for exported files.
    #[arg(long, env = "SALESDASH_EXPORT_DIR", default_value = "exports")]
    pub export_dir: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct TuiArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Log file (the terminal is owned by the UI).
    #[arg(long, env = "SALESDASH_LOG", default_value = "salesdash.log")]
    pub log_file: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct ForecastArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Print the order-search trace (SARIMA).
    #[arg(long)]
    pub trace: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Export comparison rows to CSV.
    #[arg(long, value_name = "CSV")]
    pub export_csv: Option<PathBuf>,

    /// Export the whole run (settings, accuracy, rows) to JSON.
    #[arg(long, value_name = "JSON")]
    pub export_run: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct ExploreArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Number of product families listed.
    #[arg(long, default_value_t = 20)]
    pub top: usize,
}

#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub data: DataArgs,
}

/// Options for plotting a saved run.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Run JSON produced by `salesdash forecast --export-run`.
    #[arg(long, value_name = "JSON")]
    pub run: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

#[derive(Debug, Args, Clone)]
pub struct DemoArgs {
    /// Output directory.
    #[arg(long, default_value = "demo-data")]
    pub out: PathBuf,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of stores.
    #[arg(long, default_value_t = 4)]
    pub stores: u32,

    /// First date of the generated range.
    #[arg(long, default_value = "2015-01-01", value_name = "YYYY-MM-DD")]
    pub start: String,

    /// Last date of the generated range.
    #[arg(long, default_value = "2017-08-15", value_name = "YYYY-MM-DD")]
    pub end: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forecast_flags_parse() {
        let cli = Cli::try_parse_from([
            "salesdash",
            "forecast",
            "--sales",
            "train.csv",
            "--model",
            "sarima",
            "--freq",
            "weekly",
            "--cutoff",
            "2017-01-01",
            "--trace",
        ])
        .unwrap();
        let Command::Forecast(args) = cli.command else {
            panic!("expected forecast");
        };
        assert_eq!(args.data.model, ModelKind::Sarima);
        assert_eq!(args.data.frequency, Frequency::Weekly);
        assert_eq!(args.data.cutoff, "2017-01-01");
        assert!(args.trace);
    }

    #[test]
    fn defaults_apply() {
        let cli = Cli::try_parse_from(["salesdash", "explore", "--sales", "x.csv"]).unwrap();
        let Command::Explore(args) = cli.command else {
            panic!("expected explore");
        };
        assert_eq!(args.data.cutoff, DEFAULT_CUTOFF);
        assert_eq!(args.data.model, ModelKind::Additive);
        assert_eq!(args.data.season, 12);
        assert_eq!(args.top, 20);
    }
}
