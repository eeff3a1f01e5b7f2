//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during filtering and forecasting
//! - exported to JSON/CSV
//! - rendered by the terminal report, the ASCII plot and the TUI

use std::collections::BTreeSet;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Strictly more than ten valid `(date, rate)` pairs are needed to fit a trend.
pub const MIN_FORECAST_POINTS: usize = 11;

/// Number of monthly steps forecast when the caller does not say otherwise.
pub const DEFAULT_HORIZON_MONTHS: u32 = 6;

/// A column of the canonical dataset.
///
/// The six known columns get typed storage in [`Observation`]; everything else
/// is carried through as text (`Other`) so an export reproduces it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Column {
    Region,
    Area,
    Date,
    UnemploymentRate,
    Employed,
    ParticipationRate,
    Other(String),
}

impl Column {
    /// Map a canonical (already normalized) header name to a column.
    pub fn from_canonical(name: &str) -> Self {
        match name {
            "region" => Column::Region,
            "area" => Column::Area,
            "date" => Column::Date,
            "estimated_unemployment_rate" => Column::UnemploymentRate,
            "estimated_employed" => Column::Employed,
            "estimated_labour_participation_rate" => Column::ParticipationRate,
            other => Column::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Column::Region => "region",
            Column::Area => "area",
            Column::Date => "date",
            Column::UnemploymentRate => "estimated_unemployment_rate",
            Column::Employed => "estimated_employed",
            Column::ParticipationRate => "estimated_labour_participation_rate",
            Column::Other(name) => name,
        }
    }

    /// Columns coerced to floating point during normalization.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Column::UnemploymentRate | Column::Employed | Column::ParticipationRate
        )
    }
}

/// One normalized row.
///
/// `None` in a numeric field is the null marker: the raw value was missing or
/// could not be coerced. Nulls are skipped by every aggregate, never read as zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub region: Option<String>,
    pub area: Option<String>,
    pub date: NaiveDate,
    pub unemployment_rate: Option<f64>,
    pub employed_estimate: Option<f64>,
    pub labour_participation_rate: Option<f64>,
    /// Values of the pass-through columns, in dataset column order.
    #[serde(skip)]
    pub extra: Vec<String>,
}

/// Categorical column used for grouping chart series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    Region,
    Area,
}

impl GroupBy {
    pub fn column(self) -> Column {
        match self {
            GroupBy::Region => Column::Region,
            GroupBy::Area => Column::Area,
        }
    }
}

/// Row selection: inclusive date range plus optional categorical membership.
///
/// An empty `regions` (or `areas`) set selects every row, not none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub regions: BTreeSet<String>,
    pub areas: BTreeSet<String>,
}

impl FilterSpec {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
            regions: BTreeSet::new(),
            areas: BTreeSet::new(),
        }
    }

    pub fn with_regions<I, S>(mut self, regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.regions = regions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_areas<I, S>(mut self, areas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.areas = areas.into_iter().map(Into::into).collect();
        self
    }
}

/// Aggregate statistics over a (filtered) dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    /// Number of rows, including rows whose rate is null.
    pub count: usize,
    pub mean_rate: Option<f64>,
    pub mean_employed: Option<f64>,
}

/// Fitted line `rate = intercept + slope * days_since(time_origin)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendModel {
    /// Rate change per day.
    pub slope: f64,
    /// Rate at `time_origin`.
    pub intercept: f64,
    pub time_origin: NaiveDate,
}

impl TrendModel {
    pub fn day_offset(&self, date: NaiveDate) -> i64 {
        (date - self.time_origin).num_days()
    }

    /// Evaluate the line at `date`. Unclamped: may be negative or exceed 100.
    pub fn predict(&self, date: NaiveDate) -> f64 {
        self.intercept + self.slope * self.day_offset(date) as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub predicted_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub model: TrendModel,
    /// Number of `(date, rate)` pairs the model was fit on.
    pub n_points: usize,
    pub last_observed: NaiveDate,
    pub points: Vec<ForecastPoint>,
}

/// Outcome of a forecast request. Callers must check for `InsufficientData`
/// before reading forecast rows.
#[derive(Debug, Clone, PartialEq)]
pub enum ForecastOutcome {
    Forecast(ForecastResult),
    InsufficientData { valid_points: usize, required: usize },
}

impl ForecastOutcome {
    pub fn as_forecast(&self) -> Option<&ForecastResult> {
        match self {
            ForecastOutcome::Forecast(result) => Some(result),
            ForecastOutcome::InsufficientData { .. } => None,
        }
    }
}

/// Fully-resolved run configuration for the CLI and TUI front-ends.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub data_path: PathBuf,
    /// Defaults to the first date in the dataset.
    pub start_date: Option<NaiveDate>,
    /// Defaults to the last date in the dataset.
    pub end_date: Option<NaiveDate>,
    pub regions: Vec<String>,
    pub areas: Vec<String>,
    pub horizon_months: u32,
    pub group_by: Option<GroupBy>,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_csv: Option<PathBuf>,
    pub export_forecast: Option<PathBuf>,
}

impl RunConfig {
    pub fn new(data_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            start_date: None,
            end_date: None,
            regions: Vec::new(),
            areas: Vec::new(),
            horizon_months: DEFAULT_HORIZON_MONTHS,
            group_by: None,
            plot: false,
            plot_width: 100,
            plot_height: 25,
            export_csv: None,
            export_forecast: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_names_round_trip() {
        let cols = [
            Column::Region,
            Column::Area,
            Column::Date,
            Column::UnemploymentRate,
            Column::Employed,
            Column::ParticipationRate,
            Column::Other("frequency".to_string()),
        ];
        for col in cols {
            assert_eq!(Column::from_canonical(col.name()), col);
        }
    }

    #[test]
    fn trend_model_is_unclamped() {
        let origin = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let model = TrendModel {
            slope: -1.0,
            intercept: 5.0,
            time_origin: origin,
        };
        let later = NaiveDate::from_ymd_opt(2020, 1, 11).unwrap();
        assert_eq!(model.day_offset(later), 10);
        assert!((model.predict(later) + 5.0).abs() < 1e-12);
    }
}
