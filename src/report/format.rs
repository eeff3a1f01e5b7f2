//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the normalization/forecast code stays clean and testable
//! - output changes are localized

use std::path::Path;

use crate::dataset::Dataset;
use crate::domain::{Column, FilterSpec, ForecastOutcome, Summary};
use crate::schema::NormalizeReport;

/// Header block: source file, ingest counts and date span.
pub fn format_load_summary(path: &Path, report: &NormalizeReport, dataset: &Dataset) -> String {
    let mut out = String::new();

    out.push_str("=== lt - Unemployment Trends ===\n");
    out.push_str(&format!("Source: {}\n", path.display()));
    out.push_str(&format!(
        "Rows: read={} | kept={} | dropped (bad date)={} | nulled cells={}\n",
        report.rows_read,
        report.rows_kept,
        report.dropped_dates.len(),
        report.coercions.len(),
    ));
    if !report.csv_errors.is_empty() {
        out.push_str(&format!("Unreadable CSV records: {}\n", report.csv_errors.len()));
    }
    if !report.duplicate_headers.is_empty() {
        out.push_str(&format!(
            "Ignored duplicate columns: {}\n",
            report.duplicate_headers.join(", ")
        ));
    }
    match dataset.date_bounds() {
        Some((lo, hi)) => out.push_str(&format!("Dates: {lo} .. {hi}\n")),
        None => out.push_str("Dates: -\n"),
    }
    out.push_str(&format!("Columns: {}\n", dataset.column_names().join(", ")));

    out
}

pub fn format_filter(spec: &FilterSpec) -> String {
    let set = |s: &std::collections::BTreeSet<String>| {
        if s.is_empty() {
            "all".to_string()
        } else {
            s.iter().cloned().collect::<Vec<_>>().join(", ")
        }
    };
    format!(
        "Filter: {} .. {} | regions: {} | areas: {}\n",
        spec.start_date,
        spec.end_date,
        set(&spec.regions),
        set(&spec.areas),
    )
}

/// Metric lines. Average employed is only shown when the column exists.
pub fn format_summary(summary: &Summary, view: &Dataset) -> String {
    let mut out = String::new();
    out.push_str(&format!("Data points: {}\n", summary.count));
    out.push_str(&format!(
        "Avg Unemployment Rate (%): {}\n",
        summary.mean_rate.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".to_string())
    ));
    if view.has_column(&Column::Employed) {
        out.push_str(&format!(
            "Avg Employed (est.): {}\n",
            summary
                .mean_employed
                .map(|v| format!("{v:.0}"))
                .unwrap_or_else(|| "-".to_string())
        ));
    }
    out
}

pub fn format_forecast(outcome: &ForecastOutcome) -> String {
    let result = match outcome {
        ForecastOutcome::Forecast(result) => result,
        ForecastOutcome::InsufficientData { valid_points, required } => {
            return format!(
                "Not enough data for forecasting (need >{} rows, have {valid_points}).\n",
                required - 1
            );
        }
    };

    let mut out = String::new();
    out.push_str(&format!(
        "Trend: slope={:.6}/day ({:+.4}/30d) | intercept={:.4} @ {} | n={}\n",
        result.model.slope,
        result.model.slope * 30.0,
        result.model.intercept,
        result.model.time_origin,
        result.n_points,
    ));
    out.push_str(&format!("{:<12} {:>30}\n", "date", "predicted_unemployment_rate"));
    out.push_str(format!("{:-<12} {:-<30}", "", "").trim_end());
    out.push('\n');
    for p in &result.points {
        out.push_str(&format!("{:<12} {:>30.4}\n", p.date.to_string(), p.predicted_rate));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::domain::{ForecastPoint, ForecastResult, TrendModel};
    use crate::io::ingest::RawTable;
    use crate::schema::normalize;

    #[test]
    fn summary_hides_employed_without_column() {
        let ds = normalize(&RawTable::new(
            vec!["date".to_string(), "estimated_unemployment_rate".to_string()],
            vec![vec!["2020-01-01".to_string(), "5.126".to_string()]],
        ))
        .unwrap();
        let s = crate::report::summarize(&ds);
        let text = format_summary(&s, &ds);
        assert!(text.contains("Data points: 1"));
        assert!(text.contains("Avg Unemployment Rate (%): 5.13"));
        assert!(!text.contains("Employed"));
    }

    #[test]
    fn insufficient_data_message() {
        let text = format_forecast(&ForecastOutcome::InsufficientData {
            valid_points: 4,
            required: 11,
        });
        assert!(text.contains("need >10 rows"));
    }

    #[test]
    fn forecast_table_lists_every_point() {
        let origin = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let result = ForecastResult {
            model: TrendModel {
                slope: 0.01,
                intercept: 5.0,
                time_origin: origin,
            },
            n_points: 12,
            last_observed: origin,
            points: vec![
                ForecastPoint {
                    date: NaiveDate::from_ymd_opt(2020, 2, 1).unwrap(),
                    predicted_rate: 5.31,
                },
                ForecastPoint {
                    date: NaiveDate::from_ymd_opt(2020, 3, 1).unwrap(),
                    predicted_rate: 5.6,
                },
            ],
        };
        let text = format_forecast(&ForecastOutcome::Forecast(result));
        assert!(text.contains("2020-02-01"));
        assert!(text.contains("5.3100"));
        assert!(text.contains("2020-03-01"));
    }
}
