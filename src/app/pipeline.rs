//! Shared pipeline logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! CSV read -> normalize -> (filter -> summarize, forecast on full history)
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use std::path::Path;

use tracing::info;

use crate::dataset::Dataset;
use crate::domain::{FilterSpec, ForecastOutcome, RunConfig, Summary};
use crate::error::AppError;
use crate::io::ingest::read_raw_table;
use crate::schema::{Normalized, normalize_with_report};

/// All computed outputs for one filter selection.
#[derive(Debug, Clone)]
pub struct ViewOutput {
    pub filter: FilterSpec,
    pub view: Dataset,
    pub summary: Summary,
    /// Fit on the unfiltered dataset, independent of `filter`.
    pub forecast: ForecastOutcome,
}

/// Read and normalize a CSV file.
pub fn load_dataset(path: &Path) -> Result<Normalized, AppError> {
    let raw = read_raw_table(path)?;
    info!(path = %path.display(), rows = raw.rows.len(), "read raw table");
    Ok(normalize_with_report(&raw)?)
}

/// Resolve the configured selection against the dataset.
///
/// Missing start/end default to the dataset's first/last date.
pub fn resolve_filter(dataset: &Dataset, config: &RunConfig) -> Result<FilterSpec, AppError> {
    let (first, last) = dataset
        .date_bounds()
        .ok_or_else(|| AppError::new(3, "No rows with a valid date remain after normalization."))?;

    let spec = FilterSpec::new(
        config.start_date.unwrap_or(first),
        config.end_date.unwrap_or(last),
    )
    .with_regions(config.regions.iter().cloned())
    .with_areas(config.areas.iter().cloned());

    Ok(spec)
}

/// Filter, summarize and forecast.
pub fn build_view(dataset: &Dataset, filter: FilterSpec, horizon_months: u32) -> Result<ViewOutput, AppError> {
    let view = crate::filter::apply(dataset, &filter);
    let summary = crate::report::summarize(&view);
    let forecast = crate::forecast::fit_and_forecast(dataset, horizon_months)?;

    info!(
        rows = view.len(),
        of = dataset.len(),
        "filtered view"
    );

    Ok(ViewOutput {
        filter,
        view,
        summary,
        forecast,
    })
}

/// `resolve_filter` + `build_view` for a run configuration.
pub fn run_view(dataset: &Dataset, config: &RunConfig) -> Result<ViewOutput, AppError> {
    let filter = resolve_filter(dataset, config)?;
    build_view(dataset, filter, config.horizon_months)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::io::ingest::RawTable;
    use crate::schema::normalize;

    fn monthly_dataset(n: usize) -> Dataset {
        let rows = (0..n)
            .map(|i| {
                let region = if i % 2 == 0 { "Assam" } else { "Bihar" };
                let date = NaiveDate::from_ymd_opt(2019, 1, 1)
                    .unwrap()
                    .checked_add_months(chrono::Months::new(i as u32))
                    .unwrap();
                vec![
                    region.to_string(),
                    date.format("%d-%m-%Y").to_string(),
                    format!("{}", 4.0 + i as f64 * 0.25),
                ]
            })
            .collect();
        normalize(&RawTable::new(
            vec!["Region".into(), "Date".into(), "Estimated Unemployment Rate (%)".into()],
            rows,
        ))
        .unwrap()
    }

    #[test]
    fn filter_defaults_to_full_span() {
        let ds = monthly_dataset(12);
        let spec = resolve_filter(&ds, &RunConfig::new("unused.csv")).unwrap();
        assert_eq!(spec.start_date, NaiveDate::from_ymd_opt(2019, 1, 1).unwrap());
        assert_eq!(spec.end_date, NaiveDate::from_ymd_opt(2019, 12, 1).unwrap());
        assert!(spec.regions.is_empty());
    }

    #[test]
    fn forecast_ignores_the_display_filter() {
        let ds = monthly_dataset(12);
        let mut config = RunConfig::new("unused.csv");
        config.regions = vec!["Assam".to_string()];
        config.end_date = NaiveDate::from_ymd_opt(2019, 3, 1);

        let narrow = run_view(&ds, &config).unwrap();
        let wide = run_view(&ds, &RunConfig::new("unused.csv")).unwrap();

        assert_eq!(narrow.view.len(), 2);
        assert_eq!(narrow.summary.count, 2);
        assert_eq!(narrow.forecast, wide.forecast);
        assert!(narrow.forecast.as_forecast().is_some());
    }

    #[test]
    fn empty_dataset_is_reported() {
        let ds = normalize(&RawTable::new(vec!["date".into()], vec![vec!["??".into()]])).unwrap();
        let err = run_view(&ds, &RunConfig::new("unused.csv")).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
