//! Command-line parsing for the unemployment explorer.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! normalization/forecasting code. Every command resolves into a `RunConfig`.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::{DEFAULT_HORIZON_MONTHS, GroupBy, RunConfig};
use crate::io::export::DEFAULT_EXPORT_NAME;

/// Default data file, as shipped with the upstream survey.
pub const DEFAULT_DATA_FILE: &str = "Unemployment in India.csv";

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "lt", version, about = "Regional unemployment explorer with a linear trend forecast")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print ingest diagnostics, summary metrics for the filtered view and the forecast.
    Summary(SummaryArgs),
    /// Print (and optionally export) the trend forecast over the full history.
    Forecast(ForecastArgs),
    /// Write the filtered view to CSV.
    Export(ExportArgs),
    /// Launch the interactive dashboard.
    Tui(TuiArgs),
}

/// The input file.
#[derive(Debug, Args, Clone)]
pub struct DataArgs {
    /// CSV file with at least a `Date` column.
    #[arg(env = "LT_DATA", default_value = DEFAULT_DATA_FILE)]
    pub data: PathBuf,
}

/// Row selection for the displayed/exported view.
#[derive(Debug, Args, Clone, Default)]
pub struct FilterArgs {
    /// First date to include (default: first date in the data).
    #[arg(long, value_parser = parse_cli_date)]
    pub start: Option<NaiveDate>,

    /// Last date to include (default: last date in the data).
    #[arg(long, value_parser = parse_cli_date)]
    pub end: Option<NaiveDate>,

    /// Keep only these regions (repeatable; default: all).
    #[arg(long = "region")]
    pub regions: Vec<String>,

    /// Keep only these areas, e.g. Rural/Urban (repeatable; default: all).
    #[arg(long = "area")]
    pub areas: Vec<String>,
}

#[derive(Debug, Args, Clone)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// Forecast horizon in calendar months.
    #[arg(long, default_value_t = DEFAULT_HORIZON_MONTHS)]
    pub horizon: u32,

    /// Render an ASCII chart of the filtered rates.
    #[arg(long)]
    pub plot: bool,

    /// Series grouping for the chart (default: area if present, else region).
    #[arg(long, value_enum)]
    pub group_by: Option<GroupBy>,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

#[derive(Debug, Args, Clone)]
pub struct ForecastArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Forecast horizon in calendar months.
    #[arg(long, default_value_t = DEFAULT_HORIZON_MONTHS)]
    pub horizon: u32,

    /// Write the model and forecast rows to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// Output CSV path.
    #[arg(long, short = 'o', default_value = DEFAULT_EXPORT_NAME)]
    pub out: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct TuiArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// Forecast horizon in calendar months.
    #[arg(long, default_value_t = DEFAULT_HORIZON_MONTHS)]
    pub horizon: u32,
}

impl FilterArgs {
    fn apply_to(&self, config: &mut RunConfig) {
        config.start_date = self.start;
        config.end_date = self.end;
        config.regions = self.regions.clone();
        config.areas = self.areas.clone();
    }
}

impl SummaryArgs {
    pub fn to_config(&self) -> RunConfig {
        let mut config = RunConfig::new(&self.data.data);
        self.filter.apply_to(&mut config);
        config.horizon_months = self.horizon;
        config.plot = self.plot;
        config.group_by = self.group_by;
        config.plot_width = self.width;
        config.plot_height = self.height;
        config
    }
}

impl ForecastArgs {
    pub fn to_config(&self) -> RunConfig {
        let mut config = RunConfig::new(&self.data.data);
        config.horizon_months = self.horizon;
        config.export_forecast = self.export_json.clone();
        config
    }
}

impl ExportArgs {
    pub fn to_config(&self) -> RunConfig {
        let mut config = RunConfig::new(&self.data.data);
        self.filter.apply_to(&mut config);
        config.export_csv = Some(self.out.clone());
        config
    }
}

impl TuiArgs {
    pub fn to_config(&self) -> RunConfig {
        let mut config = RunConfig::new(&self.data.data);
        self.filter.apply_to(&mut config);
        config.horizon_months = self.horizon;
        config
    }
}

fn parse_cli_date(s: &str) -> Result<NaiveDate, String> {
    crate::schema::parse_date(s).ok_or_else(|| format!("invalid date '{s}' (expected YYYY-MM-DD)"))
}
