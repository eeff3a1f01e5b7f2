//! Raw table -> canonical `Dataset`.
//!
//! Per-field policy:
//!
//! | field                | on failure                           |
//! |----------------------|--------------------------------------|
//! | header               | canonical name; later duplicates dropped |
//! | `date`               | row dropped (`RowIssue`)             |
//! | numeric columns      | field set to null (`CoercionIssue`)  |
//! | region / area / other| kept as trimmed text; empty is null  |
//!
//! Only an empty table or a missing `date` column is fatal (`SchemaError`).

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::dataset::Dataset;
use crate::domain::{Column, Observation};
use crate::error::SchemaError;
use crate::io::ingest::RawTable;
use crate::schema::headers::normalize_header_name;
use crate::schema::values::{coerce_number, parse_date};

/// A row dropped because its date could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowIssue {
    pub line: usize,
    pub raw_date: String,
}

/// A numeric cell that could not be coerced and was nulled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoercionIssue {
    pub line: usize,
    pub column: String,
    pub raw: String,
}

/// What normalization did besides producing the dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    pub rows_read: usize,
    pub rows_kept: usize,
    pub dropped_dates: Vec<RowIssue>,
    pub coercions: Vec<CoercionIssue>,
    /// Raw headers whose canonical name was already taken.
    pub duplicate_headers: Vec<String>,
    /// Records the CSV reader itself rejected (never reached normalization).
    pub csv_errors: Vec<(usize, String)>,
}

#[derive(Debug, Clone)]
pub struct Normalized {
    pub dataset: Dataset,
    pub report: NormalizeReport,
}

/// Normalize a raw table into a dataset, discarding the report.
pub fn normalize(raw: &RawTable) -> Result<Dataset, SchemaError> {
    normalize_with_report(raw).map(|n| n.dataset)
}

pub fn normalize_with_report(raw: &RawTable) -> Result<Normalized, SchemaError> {
    if raw.headers.is_empty() || raw.rows.is_empty() {
        return Err(SchemaError::EmptyInput);
    }

    let (layout, duplicate_headers) = resolve_columns(&raw.headers);
    for dup in &duplicate_headers {
        warn!(header = %dup, "duplicate column after normalization; keeping the first");
    }

    let Some(date_idx) = layout
        .iter()
        .find(|(_, col)| *col == Column::Date)
        .map(|(idx, _)| *idx)
    else {
        return Err(SchemaError::MissingDateColumn {
            columns: layout.iter().map(|(_, c)| c.name().to_string()).collect(),
        });
    };

    let outcomes: Vec<RowOutcome> = raw
        .rows
        .par_iter()
        .enumerate()
        .map(|(idx, cells)| parse_row(raw.line(idx), cells, date_idx, &layout))
        .collect();

    let mut rows = Vec::with_capacity(outcomes.len());
    let mut dropped_dates = Vec::new();
    let mut coercions = Vec::new();
    for outcome in outcomes {
        match outcome {
            RowOutcome::Kept(obs, issues) => {
                rows.push(obs);
                coercions.extend(issues);
            }
            RowOutcome::Dropped(issue) => dropped_dates.push(issue),
        }
    }

    // Stable: equal dates keep input order.
    rows.sort_by_key(|r| r.date);

    for issue in &coercions {
        debug!(
            line = issue.line,
            column = %issue.column,
            raw = %issue.raw,
            "non-numeric value nulled"
        );
    }
    if !dropped_dates.is_empty() {
        warn!(
            dropped = dropped_dates.len(),
            "rows dropped because the date could not be parsed"
        );
    }

    let report = NormalizeReport {
        rows_read: raw.rows.len(),
        rows_kept: rows.len(),
        dropped_dates,
        coercions,
        duplicate_headers,
        csv_errors: raw.parse_errors.clone(),
    };
    info!(
        rows_read = report.rows_read,
        rows_kept = report.rows_kept,
        nulled = report.coercions.len(),
        "normalized dataset"
    );

    let columns = layout.into_iter().map(|(_, c)| c).collect();
    Ok(Normalized {
        dataset: Dataset::from_sorted(columns, rows),
        report,
    })
}

/// Canonical columns paired with their source index, first occurrence wins.
fn resolve_columns(headers: &[String]) -> (Vec<(usize, Column)>, Vec<String>) {
    let mut layout: Vec<(usize, Column)> = Vec::with_capacity(headers.len());
    let mut duplicates = Vec::new();
    for (idx, header) in headers.iter().enumerate() {
        let column = Column::from_canonical(&normalize_header_name(header));
        if layout.iter().any(|(_, c)| *c == column) {
            duplicates.push(header.clone());
        } else {
            layout.push((idx, column));
        }
    }
    (layout, duplicates)
}

enum RowOutcome {
    Kept(Observation, Vec<CoercionIssue>),
    Dropped(RowIssue),
}

fn parse_row(line: usize, cells: &[String], date_idx: usize, layout: &[(usize, Column)]) -> RowOutcome {
    let cell = |idx: usize| cells.get(idx).map(|s| s.trim()).unwrap_or("");

    let Some(date) = parse_date(cell(date_idx)) else {
        return RowOutcome::Dropped(RowIssue {
            line,
            raw_date: cell(date_idx).to_string(),
        });
    };

    let mut obs = Observation {
        region: None,
        area: None,
        date,
        unemployment_rate: None,
        employed_estimate: None,
        labour_participation_rate: None,
        extra: Vec::new(),
    };
    let mut issues = Vec::new();

    for (idx, column) in layout {
        let raw = cell(*idx);
        if column.is_numeric() {
            let value = coerce_number(raw);
            if value.is_none() && !raw.is_empty() {
                issues.push(CoercionIssue {
                    line,
                    column: column.name().to_string(),
                    raw: raw.to_string(),
                });
            }
            match column {
                Column::UnemploymentRate => obs.unemployment_rate = value,
                Column::Employed => obs.employed_estimate = value,
                Column::ParticipationRate => obs.labour_participation_rate = value,
                _ => {}
            }
            continue;
        }

        let text = (!raw.is_empty()).then(|| raw.to_string());
        match column {
            Column::Region => obs.region = text,
            Column::Area => obs.area = text,
            Column::Other(_) => obs.extra.push(raw.to_string()),
            _ => {}
        }
    }

    RowOutcome::Kept(obs, issues)
}
