//! Date-range and categorical subsetting.
//!
//! `apply` never mutates its input: it returns a new dataset holding the
//! selected rows in their original order.

use std::collections::BTreeSet;

use crate::dataset::Dataset;
use crate::domain::{Column, FilterSpec, Observation};

/// Select rows with `start_date <= date <= end_date` whose region and area are
/// in the requested sets.
///
/// An empty set means "all", not "none". A set on a column the dataset does
/// not have is ignored. With a non-empty set, rows whose value is null fail
/// the membership check.
pub fn apply(dataset: &Dataset, spec: &FilterSpec) -> Dataset {
    let check_regions = !spec.regions.is_empty() && dataset.has_column(&Column::Region);
    let check_areas = !spec.areas.is_empty() && dataset.has_column(&Column::Area);

    let rows: Vec<Observation> = dataset
        .rows()
        .iter()
        .filter(|r| spec.start_date <= r.date && r.date <= spec.end_date)
        .filter(|r| !check_regions || member(r.region.as_deref(), &spec.regions))
        .filter(|r| !check_areas || member(r.area.as_deref(), &spec.areas))
        .cloned()
        .collect();

    dataset.derive(rows)
}

/// The widest spec for a dataset: its full date span, every region and area.
pub fn select_all(dataset: &Dataset) -> Option<FilterSpec> {
    let (start, end) = dataset.date_bounds()?;
    Some(FilterSpec::new(start, end))
}

fn member(value: Option<&str>, set: &BTreeSet<String>) -> bool {
    value.is_some_and(|v| set.contains(v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ingest::RawTable;
    use crate::schema::normalize;
    use chrono::NaiveDate;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dataset(with_region: bool) -> Dataset {
        let mut headers = vec!["date", "estimated_unemployment_rate", "area"];
        if with_region {
            headers.insert(0, "region");
        }
        let rows: Vec<Vec<&str>> = vec![
            vec!["Assam", "2020-01-31", "4.0", "Rural"],
            vec!["Bihar", "2020-01-31", "10.0", "Urban"],
            vec!["Assam", "2020-02-29", "4.5", "Urban"],
            vec!["Bihar", "2020-03-31", "11.0", "Rural"],
            vec!["Goa", "2020-03-31", "", "Rural"],
        ];
        let rows = rows
            .into_iter()
            .map(|r| {
                let r = if with_region { r } else { r[1..].to_vec() };
                r.into_iter().map(str::to_string).collect()
            })
            .collect();
        normalize(&RawTable::new(
            headers.into_iter().map(str::to_string).collect(),
            rows,
        ))
        .unwrap()
    }

    #[test]
    fn date_bounds_are_inclusive() {
        let ds = dataset(true);
        let d = ymd(2020, 1, 31);
        let view = apply(&ds, &FilterSpec::new(d, d));
        assert_eq!(view.len(), 2);
        assert!(view.rows().iter().all(|r| r.date == d));

        let view = apply(&ds, &FilterSpec::new(ymd(2020, 1, 31), ymd(2020, 3, 31)));
        assert_eq!(view.len(), ds.len());
    }

    #[test]
    fn empty_region_set_selects_everything_in_order() {
        let ds = dataset(true);
        let spec = select_all(&ds).unwrap();
        let view = apply(&ds, &spec);
        assert_eq!(view, ds);
    }

    #[test]
    fn region_and_area_membership() {
        let ds = dataset(true);
        let spec = select_all(&ds).unwrap().with_regions(["Assam", "Goa"]);
        let view = apply(&ds, &spec);
        assert_eq!(view.len(), 3);
        assert!(view.rows().iter().all(|r| r.region.as_deref() != Some("Bihar")));

        let spec = spec.with_areas(["Rural"]);
        let view = apply(&ds, &spec);
        let regions: Vec<_> = view.rows().iter().filter_map(|r| r.region.clone()).collect();
        assert_eq!(regions, vec!["Assam", "Goa"]);
    }

    #[test]
    fn region_filter_without_region_column_is_a_no_op() {
        let ds = dataset(false);
        let spec = select_all(&ds).unwrap().with_regions(["Assam"]);
        assert_eq!(apply(&ds, &spec).len(), ds.len());
    }

    #[test]
    fn inverted_range_is_empty_and_input_untouched() {
        let ds = dataset(true);
        let before = ds.clone();
        let view = apply(&ds, &FilterSpec::new(ymd(2020, 3, 1), ymd(2020, 2, 1)));
        assert!(view.is_empty());
        assert_eq!(view.columns(), ds.columns());
        assert_eq!(ds, before);
    }
}
