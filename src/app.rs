//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - reads and normalizes the CSV
//! - filters, summarizes and forecasts
//! - prints reports/plots
//! - writes optional exports

use clap::Parser;

use crate::cli::{Command, ExportArgs, ForecastArgs, SummaryArgs};
use crate::dataset::Dataset;
use crate::domain::{Column, GroupBy, RunConfig};
use crate::error::AppError;

pub mod cache;
pub mod pipeline;

/// Entry point for the `lt` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    // `lt` and `lt data.csv` behave like `lt tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Summary(args) => handle_summary(&args),
        Command::Forecast(args) => handle_forecast(&args),
        Command::Export(args) => handle_export(&args),
        Command::Tui(args) => crate::tui::run(args.to_config()),
    }
}

fn handle_summary(args: &SummaryArgs) -> Result<(), AppError> {
    let config = args.to_config();
    let loaded = pipeline::load_dataset(&config.data_path)?;
    let out = pipeline::run_view(&loaded.dataset, &config)?;

    println!(
        "{}",
        crate::report::format_load_summary(&config.data_path, &loaded.report, &loaded.dataset)
    );
    print!("{}", crate::report::format_filter(&out.filter));
    println!("{}", crate::report::format_summary(&out.summary, &out.view));

    if config.plot {
        let by = chart_grouping(&out.view, &config);
        let series = out.view.grouped_rate_series(by);
        println!(
            "{}",
            crate::plot::render_rate_chart(
                &series,
                out.forecast.as_forecast(),
                config.plot_width,
                config.plot_height,
            )
        );
    }

    println!("Forecast (full history):");
    print!("{}", crate::report::format_forecast(&out.forecast));
    Ok(())
}

fn handle_forecast(args: &ForecastArgs) -> Result<(), AppError> {
    let config = args.to_config();
    let loaded = pipeline::load_dataset(&config.data_path)?;
    let outcome = crate::forecast::fit_and_forecast(&loaded.dataset, config.horizon_months)?;

    print!("{}", crate::report::format_forecast(&outcome));

    if let Some(path) = &config.export_forecast {
        let Some(result) = outcome.as_forecast() else {
            return Err(AppError::new(3, "No forecast to export: not enough data."));
        };
        crate::io::forecast::write_forecast_json(path, result)?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}

fn handle_export(args: &ExportArgs) -> Result<(), AppError> {
    let config = args.to_config();
    let loaded = pipeline::load_dataset(&config.data_path)?;
    let filter = pipeline::resolve_filter(&loaded.dataset, &config)?;
    let view = crate::filter::apply(&loaded.dataset, &filter);

    if let Some(path) = &config.export_csv {
        crate::io::export::write_dataset_csv(path, &view)?;
        println!("Wrote {} rows to {}", view.len(), path.display());
    }
    Ok(())
}

/// Explicit `--group-by`, else area when the data has it, else region.
pub fn chart_grouping(view: &Dataset, config: &RunConfig) -> GroupBy {
    config.group_by.unwrap_or(if view.has_column(&Column::Area) {
        GroupBy::Area
    } else {
        GroupBy::Region
    })
}

/// Rewrite argv so `lt` defaults to `lt tui`.
///
/// Rules:
/// - `lt`                      -> `lt tui`
/// - `lt data.csv ...`         -> `lt tui data.csv ...`
/// - `lt --start ...`          -> `lt tui --start ...`
/// - `lt --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "summary" | "forecast" | "export" | "tui");
    if is_subcommand {
        return argv;
    }

    argv.insert(1, "tui".to_string());
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_opens_tui() {
        assert_eq!(rewrite_args(args(&["lt"])), args(&["lt", "tui"]));
        assert_eq!(
            rewrite_args(args(&["lt", "data.csv"])),
            args(&["lt", "tui", "data.csv"])
        );
        assert_eq!(
            rewrite_args(args(&["lt", "--area", "Rural"])),
            args(&["lt", "tui", "--area", "Rural"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        for v in [&["lt", "summary", "x.csv"][..], &["lt", "--help"][..], &["lt", "help"][..]] {
            assert_eq!(rewrite_args(args(v)), args(v));
        }
    }
}
