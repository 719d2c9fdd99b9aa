//! In-memory table of tagged values
//!
//! A [`Table`] is an ordered sequence of rows sharing a nominal set of column
//! names. No schema is declared: any cell may be missing or hold a value of an
//! unexpected type, and the analysis stages cope with both.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::value::{Value, NULL};

/// One record: column name to value. A missing key reads as [`Value::Null`].
pub type Row = HashMap<String, Value>;

/// Ordered rows plus the column names in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    /// Create an empty table
    pub fn new() -> Self {
        Table::default()
    }

    /// Create a table with an explicit column order
    ///
    /// Repeated names in `columns` are kept once. Keys present in rows but
    /// missing from `columns` are appended in sorted order.
    pub fn with_columns(columns: Vec<String>, rows: Vec<Row>) -> Self {
        let mut seen = HashSet::with_capacity(columns.len());
        let columns = columns
            .into_iter()
            .filter(|c| seen.insert(c.clone()))
            .collect();
        let mut table = Table {
            columns,
            rows: Vec::with_capacity(rows.len()),
        };
        for row in rows {
            table.push_row(row);
        }
        table
    }

    /// Create a table from rows, deriving column order from the keys
    pub fn from_rows(rows: Vec<Row>) -> Self {
        Table::with_columns(Vec::new(), rows)
    }

    /// Create a table from positional records
    ///
    /// Records shorter than `columns` are padded with nulls, extra cells are dropped.
    pub fn from_records<S: AsRef<str>>(columns: &[S], records: Vec<Vec<Value>>) -> Self {
        let names: Vec<String> = columns.iter().map(|c| c.as_ref().to_string()).collect();
        let rows = records
            .into_iter()
            .map(|record| {
                let mut cells = record.into_iter();
                names
                    .iter()
                    .map(|name| (name.clone(), cells.next().unwrap_or(Value::Null)))
                    .collect::<Row>()
            })
            .collect();
        Table::with_columns(names, rows)
    }

    /// Append a row, registering any new column names
    pub fn push_row(&mut self, row: Row) {
        let mut new_keys: Vec<String> = row
            .keys()
            .filter(|k| !self.has_column(k))
            .cloned()
            .collect();
        if !new_keys.is_empty() {
            new_keys.sort();
            self.columns.extend(new_keys);
        }
        self.rows.push(row);
    }

    /// Column names in order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All rows in upload order
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether the column name is known
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Cell lookup; out-of-range rows and unknown columns read as null
    pub fn get(&self, row: usize, column: &str) -> &Value {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&NULL)
    }

    /// Iterate over one column's cells, nulls included
    pub fn column_values<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        self.rows.iter().map(move |r| r.get(column).unwrap_or(&NULL))
    }

    /// Finite numeric cells of a column, in row order
    pub fn numeric_values(&self, column: &str) -> Vec<f64> {
        self.column_values(column).filter_map(Value::as_f64).collect()
    }

    /// New table holding the rows at `indices`, in the given order
    pub fn select(&self, indices: &[usize]) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: indices
                .iter()
                .filter_map(|&i| self.rows.get(i).cloned())
                .collect(),
        }
    }

    /// First `n` rows, for previews
    pub fn head(&self, n: usize) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }
}
