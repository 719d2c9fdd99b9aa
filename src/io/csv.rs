use csv::ReaderBuilder;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::Result;
use crate::io::ensure_unique_headers;
use crate::table::{Row, Table};
use crate::value::Value;

/// Read a CSV file with a header row into a [`Table`]
///
/// Cells are trimmed and parsed with [`Value::from_cell`]. Rows shorter than
/// the header are padded with nulls; surplus cells are dropped.
///
/// ```no_run
/// use tabsight::io::read_csv;
///
/// let table = read_csv("equipment.csv").unwrap();
/// println!("{} rows", table.len());
/// ```
pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Table> {
    let file = File::open(path.as_ref())?;
    let table = read_csv_from_reader(file)?;
    log::debug!("read {} rows from {}", table.len(), path.as_ref().display());
    Ok(table)
}

/// Read CSV data with a header row from any reader
pub fn read_csv_from_reader<R: Read>(reader: R) -> Result<Table> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();
    ensure_unique_headers(&headers)?;

    let mut rows = Vec::new();
    for (line, result) in rdr.records().enumerate() {
        let record = result?;
        if record.len() != headers.len() {
            log::warn!(
                "record {} has {} fields, expected {}",
                line + 1,
                record.len(),
                headers.len()
            );
        }
        let row: Row = headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                let value = record.get(i).map_or(Value::Null, Value::from_cell);
                (header.clone(), value)
            })
            .collect();
        rows.push(row);
    }

    Ok(Table::with_columns(headers, rows))
}
