//! Export a dataset view to CSV.
//!
//! Layout: comma-separated, header row of canonical column names, UTF-8, no
//! index column. Cells follow `Dataset::to_raw_table`, so re-normalizing an
//! export yields the same dataset.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::dataset::Dataset;
use crate::error::AppError;

/// Default file name offered for filtered-view downloads.
pub const DEFAULT_EXPORT_NAME: &str = "unemployment_filtered.csv";

/// Serialize a dataset view to CSV bytes.
pub fn dataset_to_csv_bytes(dataset: &Dataset) -> Result<Vec<u8>, AppError> {
    let mut buf = Vec::new();
    write_dataset_csv_to(&mut buf, dataset)?;
    Ok(buf)
}

/// Write a dataset view to a CSV file.
pub fn write_dataset_csv(path: &Path, dataset: &Dataset) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_dataset_csv_to(file, dataset)
}

fn write_dataset_csv_to<W: Write>(writer: W, dataset: &Dataset) -> Result<(), AppError> {
    let table = dataset.to_raw_table();
    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    wtr.write_record(&table.headers)
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;
    for row in &table.rows {
        wtr.write_record(row)
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }
    wtr.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ingest::{RawTable, read_raw_table_from_bytes};
    use crate::schema::normalize;

    fn dataset() -> Dataset {
        normalize(&RawTable::new(
            vec![
                "Region".to_string(),
                " Date".to_string(),
                " Estimated Unemployment Rate (%)".to_string(),
                " Estimated Employed".to_string(),
            ],
            vec![
                vec!["Delhi, NCT".to_string(), "31-05-2019".to_string(), "11.5".to_string(), "4000000".to_string()],
                vec!["Goa".to_string(), "30-04-2019".to_string(), "bad".to_string(), "".to_string()],
            ],
        ))
        .unwrap()
    }

    #[test]
    fn export_bytes_are_exact() {
        let bytes = dataset_to_csv_bytes(&dataset()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(
            text,
            "region,date,estimated_unemployment_rate,estimated_employed\n\
             Goa,2019-04-30,,\n\
             \"Delhi, NCT\",2019-05-31,11.5,4000000.0\n"
        );
    }

    #[test]
    fn export_reimports_to_the_same_dataset() {
        let ds = dataset();
        let bytes = dataset_to_csv_bytes(&ds).unwrap();
        let again = normalize(&read_raw_table_from_bytes(&bytes).unwrap()).unwrap();
        assert_eq!(again, ds);
    }
}
