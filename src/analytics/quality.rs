//! Data quality report
//!
//! Missing cells, exact duplicate rows, value ranges, coarse column types and
//! header drift against a previous upload of the same dataset.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::table::{Row, Table};

/// Maximum number of duplicate rows echoed back
pub const DUPLICATE_SAMPLES: usize = 3;

/// Exact duplicate rows
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DuplicateRows {
    /// Rows identical to an earlier row
    pub count: usize,
    /// First few duplicates, in row order
    pub samples: Vec<Row>,
}

/// Smallest and largest numeric reading of a column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

/// Coarse storage type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Numeric,
    String,
}

/// Header changes relative to a previous upload; every list is sorted
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SchemaDrift {
    pub added_columns: Vec<String>,
    pub removed_columns: Vec<String>,
    pub unchanged_columns: Vec<String>,
}

impl SchemaDrift {
    /// Compare the current header against a previous one
    pub fn between<S: AsRef<str>>(previous: &[S], current: &[String]) -> Self {
        let prev: BTreeSet<&str> = previous.iter().map(|c| c.as_ref()).collect();
        let cur: BTreeSet<&str> = current.iter().map(String::as_str).collect();
        SchemaDrift {
            added_columns: cur.difference(&prev).map(|c| c.to_string()).collect(),
            removed_columns: prev.difference(&cur).map(|c| c.to_string()).collect(),
            unchanged_columns: cur.intersection(&prev).map(|c| c.to_string()).collect(),
        }
    }

    pub fn has_changes(&self) -> bool {
        !self.added_columns.is_empty() || !self.removed_columns.is_empty()
    }
}

/// Quality metrics of a whole table
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QualityReport {
    pub missing_values: BTreeMap<String, usize>,
    pub duplicate_rows: DuplicateRows,
    pub ranges: BTreeMap<String, ValueRange>,
    pub column_types: BTreeMap<String, ColumnType>,
    /// Present only when previous headers were supplied
    pub schema_drift: Option<SchemaDrift>,
}

/// Build the quality report; `previous_headers` enables drift detection
pub fn quality_report(table: &Table, previous_headers: Option<&[String]>) -> QualityReport {
    let columns = table.columns();

    let missing_values = columns
        .iter()
        .map(|c| (c.clone(), table.column_values(c).filter(|v| v.is_null()).count()))
        .collect();

    let ranges = columns
        .iter()
        .filter_map(|c| {
            let (min, max) = table
                .column_values(c)
                .filter_map(|v| v.coerce_f64())
                .fold(None, |acc: Option<(f64, f64)>, x| match acc {
                    Some((lo, hi)) => Some((lo.min(x), hi.max(x))),
                    None => Some((x, x)),
                })?;
            Some((c.clone(), ValueRange { min, max }))
        })
        .collect();

    let column_types = columns
        .iter()
        .map(|c| {
            let numeric = table
                .column_values(c)
                .filter(|v| !v.is_null())
                .all(|v| v.coerce_f64().is_some());
            let kind = if numeric { ColumnType::Numeric } else { ColumnType::String };
            (c.clone(), kind)
        })
        .collect();

    let report = QualityReport {
        missing_values,
        duplicate_rows: duplicate_rows(table),
        ranges,
        column_types,
        schema_drift: previous_headers.map(|prev| SchemaDrift::between(prev, columns)),
    };
    log::debug!(
        "quality report over {} rows: {} duplicates",
        table.len(),
        report.duplicate_rows.count
    );
    report
}

fn duplicate_rows(table: &Table) -> DuplicateRows {
    let mut seen: HashSet<Vec<String>> = HashSet::with_capacity(table.len());
    let mut duplicates = DuplicateRows::default();
    for (i, row) in table.rows().iter().enumerate() {
        let key: Vec<String> = table.columns().iter().map(|c| table.get(i, c).to_key()).collect();
        if !seen.insert(key) {
            duplicates.count += 1;
            if duplicates.samples.len() < DUPLICATE_SAMPLES {
                duplicates.samples.push(row.clone());
            }
        }
    }
    duplicates
}
