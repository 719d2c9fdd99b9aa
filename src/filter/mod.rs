//! Row filtering by category selection and numeric range
//!
//! A row is kept only when it satisfies every entry of the [`FilterSet`].
//! Values that cannot be read as a number never satisfy a range filter, and
//! nulls never satisfy a non-empty category selection.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::table::{Row, Table};
use crate::value::{Value, NULL};

/// Predicate on a single column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Filter {
    /// Keep rows whose stringified value is selected; an empty selection keeps everything
    Category {
        #[serde(default)]
        selected: BTreeSet<String>,
    },
    /// Keep rows whose value coerces to a number within the inclusive bounds
    Range {
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },
}

impl Filter {
    /// Whether the filter restricts anything at all
    pub fn is_active(&self) -> bool {
        match self {
            Filter::Category { selected } => !selected.is_empty(),
            Filter::Range { .. } => true,
        }
    }

    /// Test a single value
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Filter::Category { selected } => {
                selected.is_empty() || (!value.is_null() && selected.contains(&value.to_key()))
            }
            Filter::Range { min, max } => match value.coerce_f64() {
                Some(x) => min.map_or(true, |lo| x >= lo) && max.map_or(true, |hi| x <= hi),
                None => false,
            },
        }
    }
}

/// Filters keyed by column name
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSet {
    filters: BTreeMap<String, Filter>,
}

impl FilterSet {
    pub fn new() -> Self {
        FilterSet::default()
    }

    /// Add or replace a category filter
    pub fn category<I, S>(mut self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filters.insert(
            column.to_string(),
            Filter::Category {
                selected: values.into_iter().map(Into::into).collect(),
            },
        );
        self
    }

    /// Add or replace a range filter
    pub fn range(mut self, column: &str, min: Option<f64>, max: Option<f64>) -> Self {
        self.filters
            .insert(column.to_string(), Filter::Range { min, max });
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, filter: Filter) {
        self.filters.insert(column.into(), filter);
    }

    pub fn remove(&mut self, column: &str) -> Option<Filter> {
        self.filters.remove(column)
    }

    pub fn get(&self, column: &str) -> Option<&Filter> {
        self.filters.get(column)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Filter)> {
        self.filters.iter()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Whether any entry restricts rows
    pub fn is_active(&self) -> bool {
        self.filters.values().any(Filter::is_active)
    }

    /// Whether a row satisfies every entry
    pub fn matches(&self, row: &Row) -> bool {
        self.filters.iter().all(|(column, filter)| {
            let value = row.get(column).unwrap_or(&NULL);
            filter.matches(value)
        })
    }
}

/// Indices of the rows that satisfy every filter, in table order
pub fn matching_indices(table: &Table, filters: &FilterSet) -> Vec<usize> {
    table
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| filters.matches(row))
        .map(|(i, _)| i)
        .collect()
}

/// Subsequence of the table satisfying every filter
pub fn apply_filters(table: &Table, filters: &FilterSet) -> Table {
    if !filters.is_active() {
        return table.clone();
    }
    let kept = matching_indices(table, filters);
    log::debug!("filters kept {} of {} rows", kept.len(), table.len());
    table.select(&kept)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_records(
            &["type", "pressure"],
            vec![
                vec!["Pump".into(), 5.0.into()],
                vec!["Valve".into(), "7.5".into()],
                vec!["Pump".into(), "high".into()],
                vec![Value::Null, 9.0.into()],
            ],
        )
    }

    #[test]
    fn test_empty_selection_keeps_all() {
        let table = sample();
        let filters = FilterSet::new().category("type", Vec::<String>::new());
        assert_eq!(apply_filters(&table, &filters), table);
    }

    #[test]
    fn test_category_filter() {
        let filters = FilterSet::new().category("type", ["Pump"]);
        assert_eq!(matching_indices(&sample(), &filters), vec![0, 2]);
    }

    #[test]
    fn test_null_never_selected() {
        let filters = FilterSet::new().category("type", ["null"]);
        assert!(matching_indices(&sample(), &filters).is_empty());
    }

    #[test]
    fn test_range_fails_closed() {
        let filters = FilterSet::new().range("pressure", Some(6.0), None);
        assert_eq!(matching_indices(&sample(), &filters), vec![1, 3]);

        let unbounded = FilterSet::new().range("pressure", None, None);
        assert_eq!(matching_indices(&sample(), &unbounded), vec![0, 1, 3]);
    }

    #[test]
    fn test_combined_and_idempotent() {
        let table = sample();
        let filters = FilterSet::new()
            .category("type", ["Pump", "Valve"])
            .range("pressure", Some(0.0), Some(8.0));
        let once = apply_filters(&table, &filters);
        assert_eq!(once.len(), 2);
        assert_eq!(apply_filters(&once, &filters), once);
    }

    #[test]
    fn test_serde_shape() {
        let filters: FilterSet = serde_json::from_str(
            r#"{"type": {"kind": "category", "selected": []}, "pressure": {"kind": "range", "min": 1, "max": 2}}"#,
        )
        .unwrap();
        assert_eq!(filters.len(), 2);
        assert!(!filters.get("type").unwrap().is_active());
        assert_eq!(
            filters.get("pressure"),
            Some(&Filter::Range {
                min: Some(1.0),
                max: Some(2.0)
            })
        );
    }
}
