//! Column role inference
//!
//! Decides, per analysis run, which columns hold measurements (numeric), which
//! hold a bounded set of labels (categorical), and which are left out. Roles
//! are derived from the values alone; nothing about them is persisted.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::config::{ClassifierConfig, DEFAULT_IDENTIFIER_PATTERN};
use crate::error::Result;
use crate::table::Table;
use crate::value::Value;

lazy_static! {
    static ref DEFAULT_IDENTIFIER_RE: Regex =
        Regex::new(DEFAULT_IDENTIFIER_PATTERN).expect("default identifier pattern is valid");
}

/// Role of a column in one analysis run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnRole {
    Numeric,
    Categorical,
    Ignored,
}

/// Column names grouped by role, each list in table column order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Classification {
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
    pub ignored: Vec<String>,
}

impl Classification {
    /// Role of a column, `None` if the column was not classified
    pub fn role_of(&self, column: &str) -> Option<ColumnRole> {
        if self.numeric.iter().any(|c| c == column) {
            Some(ColumnRole::Numeric)
        } else if self.categorical.iter().any(|c| c == column) {
            Some(ColumnRole::Categorical)
        } else if self.ignored.iter().any(|c| c == column) {
            Some(ColumnRole::Ignored)
        } else {
            None
        }
    }

    fn push(&mut self, column: &str, role: ColumnRole) {
        let bucket = match role {
            ColumnRole::Numeric => &mut self.numeric,
            ColumnRole::Categorical => &mut self.categorical,
            ColumnRole::Ignored => &mut self.ignored,
        };
        bucket.push(column.to_string());
    }
}

/// Value-type tally of one column's sampled cells
#[derive(Debug, Default)]
struct ColumnProfile {
    numbers: usize,
    integers: usize,
    labels: usize,
    distinct: HashSet<String>,
}

impl ColumnProfile {
    fn observe(mut self, value: &Value, relaxed: bool) -> Self {
        match value {
            Value::Null => return self,
            Value::Number(x) if !x.is_finite() => return self,
            Value::Number(x) => {
                self.numbers += 1;
                if x.fract() == 0.0 {
                    self.integers += 1;
                }
            }
            Value::Text(_) if relaxed && value.is_numeric_text() => return self,
            Value::Text(_) | Value::Bool(_) => self.labels += 1,
        }
        self.distinct.insert(value.to_key());
        self
    }

    fn present(&self) -> usize {
        self.numbers + self.labels
    }
}

/// Infers column roles from sampled values
#[derive(Debug, Clone)]
pub struct ColumnClassifier {
    config: ClassifierConfig,
    identifier: Regex,
}

impl Default for ColumnClassifier {
    fn default() -> Self {
        ColumnClassifier {
            config: ClassifierConfig::default(),
            identifier: DEFAULT_IDENTIFIER_RE.clone(),
        }
    }
}

impl ColumnClassifier {
    /// Build a classifier; fails only when the identifier pattern does not compile
    pub fn new(config: ClassifierConfig) -> Result<Self> {
        let identifier = if config.identifier_pattern == DEFAULT_IDENTIFIER_PATTERN {
            DEFAULT_IDENTIFIER_RE.clone()
        } else {
            Regex::new(&config.identifier_pattern)?
        };
        Ok(ColumnClassifier { config, identifier })
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Whether a column name looks like a row identifier
    pub fn is_identifier(&self, column: &str) -> bool {
        self.identifier.is_match(column.trim())
    }

    /// Classify every column of the table
    pub fn classify(&self, table: &Table) -> Classification {
        let classification = table
            .columns()
            .iter()
            .fold(Classification::default(), |mut acc, column| {
                acc.push(column, self.role(table, column));
                acc
            });
        log::debug!(
            "classified {} columns: numeric={:?} categorical={:?}",
            table.columns().len(),
            classification.numeric,
            classification.categorical
        );
        classification
    }

    /// Role of a single column
    pub fn role(&self, table: &Table, column: &str) -> ColumnRole {
        let relaxed = self.config.relaxed_numeric_strings;
        let profile = table
            .column_values(column)
            .take(self.config.sample_rows)
            .fold(ColumnProfile::default(), |p, v| p.observe(v, relaxed));
        self.decide(column, &profile)
    }

    fn decide(&self, column: &str, profile: &ColumnProfile) -> ColumnRole {
        if profile.present() == 0 {
            return ColumnRole::Ignored;
        }
        let distinct = profile.distinct.len();

        if profile.labels == 0 {
            if self.is_identifier(column) {
                return ColumnRole::Ignored;
            }
            let code_limit = self.config.integer_category_max.min(self.config.max_uniques);
            let coded = self.config.integer_categories
                && profile.integers == profile.numbers
                && distinct > 1
                && distinct <= code_limit
                && 2 * distinct <= profile.numbers;
            return if coded {
                ColumnRole::Categorical
            } else {
                ColumnRole::Numeric
            };
        }

        if profile.numbers == 0 && distinct > 1 && distinct <= self.config.max_uniques {
            return ColumnRole::Categorical;
        }
        ColumnRole::Ignored
    }
}

/// Classify with the default configuration
pub fn classify_columns(table: &Table) -> Classification {
    ColumnClassifier::default().classify(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str], records: Vec<Vec<Value>>) -> Table {
        Table::from_records(columns, records)
    }

    #[test]
    fn test_numeric_and_categorical() {
        let t = table(
            &["Type", "Flowrate", "Note"],
            vec![
                vec!["Pump".into(), 120.5.into(), "ok".into()],
                vec!["Valve".into(), 98.1.into(), 3.0.into()],
                vec!["Pump".into(), 101.0.into(), Value::Null],
            ],
        );
        let c = classify_columns(&t);
        assert_eq!(c.numeric, vec!["Flowrate"]);
        assert_eq!(c.categorical, vec!["Type"]);
        assert_eq!(c.ignored, vec!["Note"]);
    }

    #[test]
    fn test_identifier_excluded() {
        let t = table(
            &["id", "user_id", "Index", "score"],
            (0..6)
                .map(|i| vec![(i as f64).into(), (i as f64).into(), (i as f64).into(), (i as f64 * 1.5).into()])
                .collect(),
        );
        let c = classify_columns(&t);
        assert_eq!(c.numeric, vec!["score"]);
        assert_eq!(c.ignored, vec!["id", "user_id", "Index"]);
    }

    #[test]
    fn test_integer_codes_become_categorical() {
        let t = table(
            &["grade", "count"],
            (0..12)
                .map(|i| vec![((i % 3) as f64).into(), (i as f64).into()])
                .collect(),
        );
        let c = classify_columns(&t);
        assert_eq!(c.categorical, vec!["grade"]);
        assert_eq!(c.numeric, vec!["count"]);
    }

    #[test]
    fn test_cardinality_bounds() {
        let single = table(&["kind"], vec![vec!["a".into()], vec!["a".into()]]);
        assert_eq!(classify_columns(&single).ignored, vec!["kind"]);

        let wide = table(&["name"], (0..60).map(|i| vec![format!("n{}", i).into()]).collect());
        assert_eq!(classify_columns(&wide).ignored, vec!["name"]);

        let config = ClassifierConfig {
            max_uniques: 100,
            ..ClassifierConfig::default()
        };
        let classifier = ColumnClassifier::new(config).unwrap();
        assert_eq!(classifier.classify(&wide).categorical, vec!["name"]);
    }

    #[test]
    fn test_all_null_and_empty() {
        let t = table(&["empty"], vec![vec![Value::Null], vec![Value::Null]]);
        let c = classify_columns(&t);
        assert!(c.numeric.is_empty() && c.categorical.is_empty());
        assert_eq!(c.role_of("empty"), Some(ColumnRole::Ignored));

        let c = classify_columns(&Table::new());
        assert_eq!(c, Classification::default());
    }

    #[test]
    fn test_relaxed_numeric_strings() {
        let t = table(
            &["reading"],
            vec![vec![1.5.into()], vec!["2.5".into()], vec![3.5.into()]],
        );
        assert_eq!(classify_columns(&t).ignored, vec!["reading"]);

        let config = ClassifierConfig {
            relaxed_numeric_strings: true,
            ..ClassifierConfig::default()
        };
        let classifier = ColumnClassifier::new(config).unwrap();
        assert_eq!(classifier.classify(&t).numeric, vec!["reading"]);
    }

    #[test]
    fn test_invalid_pattern() {
        let config = ClassifierConfig {
            identifier_pattern: "(".to_string(),
            ..ClassifierConfig::default()
        };
        assert!(ColumnClassifier::new(config).is_err());
    }
}
