//! Tabular data loading
//!
//! This module parses delimited text with a required header row into ordered
//! rows of named string fields. It performs no numeric validation; field
//! interpretation belongs to the encoder.

use crate::error::HerdError;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// A single parsed row: column name to raw string value
pub type Row = HashMap<String, String>;

/// Parse delimited text from a reader into ordered rows.
///
/// The first record is taken as the header; each subsequent record becomes a
/// map from column name to string value. Row order matches input order.
/// Malformed input surfaces as [`HerdError::Parse`].
pub fn load_rows<R: Read>(reader: R) -> Result<Vec<Row>, HerdError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let row: Row = headers
            .iter()
            .zip(record.iter())
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        rows.push(row);
    }

    Ok(rows)
}

/// Parse a delimited file from disk.
pub fn load_rows_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Row>, HerdError> {
    let file = File::open(path)?;
    load_rows(file)
}
