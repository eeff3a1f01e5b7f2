//! The canonical in-memory dataset.
//!
//! A `Dataset` is built once by `crate::schema::normalize` and never mutated
//! afterwards. Rows are sorted ascending by date (stable with respect to input
//! order), column names are unique and canonical. Filtering derives a new
//! `Dataset` with the same columns.

use chrono::NaiveDate;

use crate::domain::{Column, GroupBy, Observation};
use crate::io::ingest::RawTable;

/// Label used for the single series of a dataset that lacks the group column.
pub const ALL_GROUP: &str = "all";

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    rows: Vec<Observation>,
}

impl Dataset {
    /// Build from rows already sorted by date.
    ///
    /// `columns` must contain `Column::Date` and be free of duplicates; each
    /// row's `extra` must hold one value per `Column::Other` entry.
    pub(crate) fn from_sorted(columns: Vec<Column>, rows: Vec<Observation>) -> Self {
        debug_assert!(rows.windows(2).all(|w| w[0].date <= w[1].date));
        Self { columns, rows }
    }

    /// A new dataset with the same schema and a subset of rows (order kept).
    pub(crate) fn derive(&self, rows: Vec<Observation>) -> Self {
        Self::from_sorted(self.columns.clone(), rows)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    pub fn has_column(&self, column: &Column) -> bool {
        self.columns.contains(column)
    }

    pub fn rows(&self) -> &[Observation] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First and last date, if any rows exist.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.rows.first()?;
        let last = self.rows.last()?;
        Some((first.date, last.date))
    }

    /// Distinct non-null regions in first-appearance order.
    pub fn regions(&self) -> Vec<String> {
        distinct(self.rows.iter().filter_map(|r| r.region.as_deref()))
    }

    /// Distinct non-null areas in first-appearance order.
    pub fn areas(&self) -> Vec<String> {
        distinct(self.rows.iter().filter_map(|r| r.area.as_deref()))
    }

    /// `(date, rate)` pairs with a non-null rate, in dataset order.
    pub fn rate_series(&self) -> Vec<(NaiveDate, f64)> {
        self.rows
            .iter()
            .filter_map(|r| r.unemployment_rate.map(|v| (r.date, v)))
            .collect()
    }

    /// One rate series per distinct group value, groups in first-appearance order.
    ///
    /// Without the group column the whole dataset is a single series labelled
    /// [`ALL_GROUP`]. Rows with a null group value are left out.
    pub fn grouped_rate_series(&self, by: GroupBy) -> Vec<(String, Vec<(NaiveDate, f64)>)> {
        if !self.has_column(&by.column()) {
            return vec![(ALL_GROUP.to_string(), self.rate_series())];
        }

        let key = |r: &Observation| -> Option<String> {
            match by {
                GroupBy::Region => r.region.clone(),
                GroupBy::Area => r.area.clone(),
            }
        };

        let mut groups: Vec<(String, Vec<(NaiveDate, f64)>)> = Vec::new();
        for row in &self.rows {
            let Some(name) = key(row) else { continue };
            let idx = match groups.iter().position(|(g, _)| *g == name) {
                Some(idx) => idx,
                None => {
                    groups.push((name, Vec::new()));
                    groups.len() - 1
                }
            };
            if let Some(rate) = row.unemployment_rate {
                groups[idx].1.push((row.date, rate));
            }
        }
        groups
    }

    /// Render back to untyped cells using the export conventions:
    /// ISO dates, empty string for null, floats that re-parse exactly.
    pub fn to_raw_table(&self) -> RawTable {
        let headers = self.columns.iter().map(|c| c.name().to_string()).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut extra_idx = 0usize;
                self.columns
                    .iter()
                    .map(|col| match col {
                        Column::Region => row.region.clone().unwrap_or_default(),
                        Column::Area => row.area.clone().unwrap_or_default(),
                        Column::Date => row.date.format("%Y-%m-%d").to_string(),
                        Column::UnemploymentRate => format_float(row.unemployment_rate),
                        Column::Employed => format_float(row.employed_estimate),
                        Column::ParticipationRate => format_float(row.labour_participation_rate),
                        Column::Other(_) => {
                            let v = row.extra.get(extra_idx).cloned().unwrap_or_default();
                            extra_idx += 1;
                            v
                        }
                    })
                    .collect()
            })
            .collect();
        RawTable::new(headers, rows)
    }
}

/// Format a nullable float for text output.
///
/// Integral values keep one decimal (`11999139.0`); everything else uses the
/// shortest representation that parses back to the same bits.
pub fn format_float(value: Option<f64>) -> String {
    match value {
        None => String::new(),
        Some(v) if v.fract() == 0.0 && v.abs() < 1e16 => format!("{v:.1}"),
        Some(v) => format!("{v}"),
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for v in values {
        if !out.iter().any(|seen| seen == v) {
            out.push(v.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(region: &str, area: Option<&str>, ymd: (i32, u32, u32), rate: Option<f64>) -> Observation {
        Observation {
            region: Some(region.to_string()),
            area: area.map(str::to_string),
            date: NaiveDate::from_ymd_opt(ymd.0, ymd.1, ymd.2).unwrap(),
            unemployment_rate: rate,
            employed_estimate: None,
            labour_participation_rate: None,
            extra: vec!["Monthly".to_string()],
        }
    }

    fn sample() -> Dataset {
        Dataset::from_sorted(
            vec![
                Column::Region,
                Column::Date,
                Column::Other("frequency".to_string()),
                Column::UnemploymentRate,
                Column::Area,
            ],
            vec![
                obs("Bihar", Some("Rural"), (2020, 1, 31), Some(10.5)),
                obs("Assam", Some("Urban"), (2020, 1, 31), None),
                obs("Bihar", Some("Urban"), (2020, 2, 29), Some(11.0)),
                obs("Assam", None, (2020, 3, 31), Some(4.25)),
            ],
        )
    }

    #[test]
    fn bounds_and_distinct_values() {
        let ds = sample();
        let (lo, hi) = ds.date_bounds().unwrap();
        assert_eq!(lo, NaiveDate::from_ymd_opt(2020, 1, 31).unwrap());
        assert_eq!(hi, NaiveDate::from_ymd_opt(2020, 3, 31).unwrap());
        assert_eq!(ds.regions(), vec!["Bihar", "Assam"]);
        assert_eq!(ds.areas(), vec!["Rural", "Urban"]);
    }

    #[test]
    fn rate_series_skips_nulls() {
        let ds = sample();
        let series = ds.rate_series();
        assert_eq!(series.len(), 3);
        assert!((series[2].1 - 4.25).abs() < 1e-12);
    }

    #[test]
    fn grouped_series_follow_first_appearance() {
        let ds = sample();
        let groups = ds.grouped_rate_series(GroupBy::Region);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "Bihar");
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].0, "Assam");
        assert_eq!(groups[1].1.len(), 1);

        let by_area = ds.grouped_rate_series(GroupBy::Area);
        assert_eq!(by_area.len(), 2);
        assert_eq!(by_area[1].0, "Urban");
        assert_eq!(by_area[1].1.len(), 1);
    }

    #[test]
    fn grouped_series_without_column_is_single_series() {
        let ds = Dataset::from_sorted(
            vec![Column::Date, Column::UnemploymentRate],
            vec![obs("x", None, (2020, 1, 1), Some(1.0))],
        );
        let groups = ds.grouped_rate_series(GroupBy::Area);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].0, ALL_GROUP);
    }

    #[test]
    fn raw_table_uses_export_conventions() {
        let ds = sample();
        let raw = ds.to_raw_table();
        assert_eq!(
            raw.headers,
            vec!["region", "date", "frequency", "estimated_unemployment_rate", "area"]
        );
        assert_eq!(raw.rows[0], vec!["Bihar", "2020-01-31", "Monthly", "10.5", "Rural"]);
        assert_eq!(raw.rows[1][3], "");
        assert_eq!(raw.rows[2][3], "11.0");
        assert_eq!(raw.rows[3][4], "");
    }

    #[test]
    fn format_float_keeps_integral_marker() {
        assert_eq!(format_float(Some(11999139.0)), "11999139.0");
        assert_eq!(format_float(Some(3.65)), "3.65");
        assert_eq!(format_float(None), "");
    }
}
