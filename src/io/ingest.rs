//! CSV ingest.
//!
//! This module only reads bytes into a [`RawTable`]: a header row plus string
//! cells, exactly as found. All interpretation (header spelling, dates,
//! numbers) belongs to `crate::schema`.

use std::fs;
use std::io::Read;
use std::path::Path;

use crate::error::AppError;

/// Untyped tabular input: the "raw rows" fed to the normalizer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// 1-based line on which each row starts, parallel to `rows`.
    pub lines: Vec<usize>,
    /// Records the CSV parser rejected outright (1-based line, message).
    pub parse_errors: Vec<(usize, String)>,
}

impl RawTable {
    /// Rows are numbered as if each sits on its own line after the header.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            lines: (2..rows.len() + 2).collect(),
            headers,
            rows,
            parse_errors: Vec::new(),
        }
    }

    /// Source line of row `row`.
    pub fn line(&self, row: usize) -> usize {
        self.lines.get(row).copied().unwrap_or(row + 2)
    }
}

/// Read a CSV file from disk.
pub fn read_raw_table(path: &Path) -> Result<RawTable, AppError> {
    let bytes = fs::read(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    read_raw_table_from_bytes(&bytes)
}

pub fn read_raw_table_from_bytes(bytes: &[u8]) -> Result<RawTable, AppError> {
    read_raw_table_from_reader(bytes)
}

/// Read CSV from any reader.
///
/// Rows may have fewer or more fields than the header (`flexible`); missing
/// cells read as empty. Rows the CSV parser rejects are recorded, not fatal.
pub fn read_raw_table_from_reader<R: Read>(reader: R) -> Result<RawTable, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .byte_headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .iter()
        .map(decode_field)
        .collect();

    let mut rows = Vec::new();
    let mut lines = Vec::new();
    let mut parse_errors = Vec::new();

    // Byte records so that a stray non-UTF-8 byte degrades to U+FFFD instead
    // of losing the whole row.
    for result in reader.byte_records() {
        match result {
            Ok(record) => {
                let line = record.position().map_or(0, |p| p.line() as usize);
                rows.push(record.iter().map(decode_field).collect());
                lines.push(line);
            }
            Err(e) => {
                let line = e.position().map_or(0, |p| p.line() as usize);
                parse_errors.push((line, format!("CSV parse error: {e}")));
            }
        }
    }

    // A header-only file with an empty first line parses as a single empty header.
    let headers = if headers.len() == 1 && headers[0].is_empty() {
        Vec::new()
    } else {
        headers
    };

    Ok(RawTable {
        headers,
        rows,
        lines,
        parse_errors,
    })
}

fn decode_field(field: &[u8]) -> String {
    String::from_utf8_lossy(field).into_owned()
}
