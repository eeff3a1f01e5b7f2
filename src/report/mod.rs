//! Reporting utilities: summary metrics and formatted terminal output.

use crate::dataset::Dataset;
use crate::domain::Summary;

pub mod format;

pub use format::*;

/// Count rows and average the rate and employment columns, skipping nulls.
///
/// A mean is `None` when the column has no non-null value (or is absent).
pub fn summarize(dataset: &Dataset) -> Summary {
    let rows = dataset.rows();
    Summary {
        count: rows.len(),
        mean_rate: mean(rows.iter().filter_map(|r| r.unemployment_rate)),
        mean_employed: mean(rows.iter().filter_map(|r| r.employed_estimate)),
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0_f64, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ingest::RawTable;
    use crate::schema::normalize;

    fn dataset(headers: &[&str], rows: &[&[&str]]) -> Dataset {
        normalize(&RawTable::new(
            headers.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        ))
        .unwrap()
    }

    #[test]
    fn means_skip_nulls_but_count_includes_them() {
        let ds = dataset(
            &["date", "estimated_unemployment_rate", "estimated_employed"],
            &[
                &["2020-01-01", "4.0", "100"],
                &["2020-02-01", "oops", "300"],
                &["2020-03-01", "8.0", ""],
            ],
        );
        let s = summarize(&ds);
        assert_eq!(s.count, 3);
        assert!((s.mean_rate.unwrap() - 6.0).abs() < 1e-12);
        assert!((s.mean_employed.unwrap() - 200.0).abs() < 1e-12);
    }

    #[test]
    fn all_null_or_absent_column_has_no_mean() {
        let ds = dataset(
            &["date", "estimated_unemployment_rate"],
            &[&["2020-01-01", ""], &["2020-02-01", "-"]],
        );
        let s = summarize(&ds);
        assert_eq!(s.count, 2);
        assert_eq!(s.mean_rate, None);
        assert_eq!(s.mean_employed, None);
    }

    #[test]
    fn empty_view_has_zero_count() {
        let ds = dataset(&["date"], &[&["garbage"]]);
        let s = summarize(&ds);
        assert_eq!(s.count, 0);
        assert_eq!(s.mean_rate, None);
    }
}
