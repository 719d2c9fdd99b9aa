use serde_json::{Map, Value as JsonValue};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::{Error, Result};
use crate::table::{Row, Table};
use crate::value::Value;

/// Read a JSON file into a [`Table`]
///
/// Accepts record-oriented data (an array of flat objects) or column-oriented
/// data (an object mapping column names to equally long arrays).
pub fn read_json<P: AsRef<Path>>(path: P) -> Result<Table> {
    let file = File::open(path.as_ref())?;
    let json: JsonValue = serde_json::from_reader(BufReader::new(file))?;
    let table = table_from_json(json)?;
    log::debug!("read {} rows from {}", table.len(), path.as_ref().display());
    Ok(table)
}

/// Parse JSON text, as returned by a rows endpoint, into a [`Table`]
pub fn parse_json_rows(text: &str) -> Result<Table> {
    table_from_json(serde_json::from_str(text)?)
}

fn table_from_json(json: JsonValue) -> Result<Table> {
    match json {
        JsonValue::Array(records) => read_records_array(records),
        JsonValue::Object(map) => read_column_oriented(map),
        _ => Err(Error::UnsupportedFormat(
            "JSON input must be an array of objects or an object of columns".to_string(),
        )),
    }
}

// record-oriented input; a nested value becomes text holding its JSON
fn read_records_array(records: Vec<JsonValue>) -> Result<Table> {
    let mut table = Table::new();
    for (i, record) in records.into_iter().enumerate() {
        let JsonValue::Object(map) = record else {
            return Err(Error::UnsupportedFormat(format!(
                "JSON record {} is not an object",
                i
            )));
        };
        let row: Row = map.iter().map(|(k, v)| (k.clone(), Value::from(v))).collect();
        table.push_row(row);
    }
    Ok(table)
}

// column-oriented input; short columns read as null
fn read_column_oriented(map: Map<String, JsonValue>) -> Result<Table> {
    let mut columns = Vec::with_capacity(map.len());
    let mut cells = Vec::with_capacity(map.len());
    for (name, values) in map {
        let JsonValue::Array(values) = values else {
            return Err(Error::UnsupportedFormat(format!(
                "JSON column '{}' is not an array",
                name
            )));
        };
        columns.push(name);
        cells.push(values);
    }

    let len = cells.iter().map(Vec::len).max().unwrap_or(0);
    let records = (0..len)
        .map(|i| {
            cells
                .iter()
                .map(|column| column.get(i).map_or(Value::Null, Value::from))
                .collect()
        })
        .collect();
    Ok(Table::from_records(&columns, records))
}
