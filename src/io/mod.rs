//! Table ingestion and report output
//!
//! Readers turn CSV, JSON and (with the `excel` feature) XLSX files into a
//! [`Table`]; the analysis stages never touch the filesystem themselves.

pub mod csv;
#[cfg(feature = "excel")]
pub mod excel;
pub mod json;

pub use self::csv::{read_csv, read_csv_from_reader};
#[cfg(feature = "excel")]
pub use self::excel::{list_sheet_names, read_excel};
pub use self::json::{parse_json_rows, read_json};

use serde::Serialize;
use std::collections::HashSet;
use std::io::Write;
use std::path::Path;

use crate::error::{Error, Result};
use crate::table::Table;

/// Reject a header row naming the same column twice
pub(crate) fn ensure_unique_headers(headers: &[String]) -> Result<()> {
    let mut seen = HashSet::with_capacity(headers.len());
    match headers.iter().find(|h| !seen.insert(h.as_str())) {
        Some(duplicate) => Err(Error::DuplicateColumnName(duplicate.clone())),
        None => Ok(()),
    }
}

/// Read a table, choosing the reader from the file extension
pub fn read_table<P: AsRef<Path>>(path: P) -> Result<Table> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "csv" => read_csv(path),
        "json" => read_json(path),
        #[cfg(feature = "excel")]
        "xlsx" | "xlsm" => read_excel(path, None),
        #[cfg(not(feature = "excel"))]
        "xlsx" | "xlsm" => Err(Error::UnsupportedFormat(format!(
            "{} (built without the `excel` feature)",
            path.display()
        ))),
        _ => Err(Error::UnsupportedFormat(path.display().to_string())),
    }
}

/// Serialize a report (or any result structure) as compact JSON
pub fn write_report_json<T: Serialize, W: Write>(report: &T, writer: W) -> Result<()> {
    serde_json::to_writer(writer, report)?;
    Ok(())
}

/// Serialize a report as indented JSON
pub fn write_report_json_pretty<T: Serialize, W: Write>(report: &T, writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, report)?;
    Ok(())
}
