use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use calamine::{open_workbook, DataType, Reader, Xlsx};

use crate::error::{Error, Result};
use crate::io::ensure_unique_headers;
use crate::table::Table;
use crate::value::Value;

/// Read one worksheet of an Excel (.xlsx) file into a [`Table`]
///
/// The first row of the sheet is the header. `sheet_name` defaults to the
/// first sheet of the workbook.
///
/// ```no_run
/// use tabsight::io::read_excel;
///
/// let table = read_excel("equipment.xlsx", None).unwrap();
/// let second = read_excel("equipment.xlsx", Some("Sheet2")).unwrap();
/// ```
pub fn read_excel<P: AsRef<Path>>(path: P, sheet_name: Option<&str>) -> Result<Table> {
    let path = path.as_ref();
    let mut workbook: Xlsx<BufReader<File>> = open_workbook(path)
        .map_err(|e| Error::ExcelError(format!("could not open {}: {}", path.display(), e)))?;

    let sheet_name = match sheet_name {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| Error::ExcelError(format!("{} has no worksheets", path.display())))?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| Error::ExcelError(format!("could not read sheet '{}': {}", sheet_name, e)))?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(Table::new());
    };
    let headers: Vec<String> = header_row
        .iter()
        .enumerate()
        .map(|(i, cell)| match cell {
            DataType::Empty => format!("Column{}", i + 1),
            other => other.to_string().trim().to_string(),
        })
        .collect();
    ensure_unique_headers(&headers)?;

    let records: Vec<Vec<Value>> = rows
        .map(|row| row.iter().map(cell_value).collect())
        .collect();
    log::debug!(
        "read {} rows from sheet '{}' of {}",
        records.len(),
        sheet_name,
        path.display()
    );
    Ok(Table::from_records(&headers, records))
}

/// Names of the worksheets in a workbook
pub fn list_sheet_names<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let workbook: Xlsx<BufReader<File>> = open_workbook(path)
        .map_err(|e| Error::ExcelError(format!("could not open {}: {}", path.display(), e)))?;
    Ok(workbook.sheet_names().to_vec())
}

fn cell_value(cell: &DataType) -> Value {
    match cell {
        DataType::Empty | DataType::Error(_) => Value::Null,
        DataType::Int(i) => Value::Number(*i as f64),
        DataType::Float(f) if f.is_finite() => Value::Number(*f),
        DataType::Float(_) => Value::Null,
        DataType::Bool(b) => Value::Bool(*b),
        DataType::String(s) => Value::from_cell(s),
        other => Value::Text(other.to_string()),
    }
}
