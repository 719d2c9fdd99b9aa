//! Outlier detection module
//!
//! Flags individual numeric cells that fall far from the bulk of their column.
//! One rule is applied to every column of a run: the interquartile-range fence
//! (the default) or the z-score threshold.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::config::clamp_non_negative;
use crate::stats::{self, DescriptiveStats};
use crate::table::Table;

/// Default fence multiplier for the IQR rule
pub const DEFAULT_IQR_MULTIPLIER: f64 = 1.5;
/// Default |z| threshold for the z-score rule
pub const DEFAULT_Z_THRESHOLD: f64 = 3.0;

/// Detection rule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum OutlierMethod {
    /// Flag values outside `[Q1 - k·IQR, Q3 + k·IQR]`
    Iqr { multiplier: f64 },
    /// Flag values with `|value - mean| / std >= threshold`
    ZScore { threshold: f64 },
}

impl Default for OutlierMethod {
    fn default() -> Self {
        OutlierMethod::Iqr {
            multiplier: DEFAULT_IQR_MULTIPLIER,
        }
    }
}

impl OutlierMethod {
    /// IQR rule with the standard 1.5 multiplier
    pub fn iqr() -> Self {
        OutlierMethod::default()
    }

    /// z-score rule with the given threshold
    pub fn zscore(threshold: f64) -> Self {
        OutlierMethod::ZScore { threshold }
    }

    /// Clamp the parameter: negative goes to 0, non-finite to the default
    pub fn normalized(self) -> Self {
        match self {
            OutlierMethod::Iqr { multiplier } => OutlierMethod::Iqr {
                multiplier: clamp_non_negative(multiplier, DEFAULT_IQR_MULTIPLIER, "iqr_multiplier"),
            },
            OutlierMethod::ZScore { threshold } => OutlierMethod::ZScore {
                threshold: clamp_non_negative(threshold, DEFAULT_Z_THRESHOLD, "z_threshold"),
            },
        }
    }
}

/// One flagged cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierRecord {
    /// Row position in the analyzed table
    pub row_index: usize,
    pub column: String,
    pub value: f64,
    /// Distance beyond the violated fence (IQR) or |z| (z-score)
    pub deviation: f64,
}

/// Fences and flag count for one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnOutliers {
    pub column: String,
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Result of a detection run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierReport {
    pub method: OutlierMethod,
    /// Ranked by deviation descending, ties by row order
    pub records: Vec<OutlierRecord>,
    /// One entry per column with at least one valid value, in column order
    pub columns: Vec<ColumnOutliers>,
}

impl Default for OutlierReport {
    fn default() -> Self {
        OutlierReport {
            method: OutlierMethod::default(),
            records: Vec::new(),
            columns: Vec::new(),
        }
    }
}

impl OutlierReport {
    /// Number of flagged cells in a column
    pub fn count_for(&self, column: &str) -> usize {
        self.columns
            .iter()
            .find(|c| c.column == column)
            .map_or(0, |c| c.count)
    }

    /// Column with the most flags, first in column order on ties; `None` when nothing was flagged
    pub fn most_affected(&self) -> Option<&ColumnOutliers> {
        self.columns
            .iter()
            .filter(|c| c.count > 0)
            .fold(None, |best: Option<&ColumnOutliers>, c| match best {
                Some(b) if b.count >= c.count => Some(b),
                _ => Some(c),
            })
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Applies one [`OutlierMethod`] to numeric columns
#[derive(Debug, Clone, Copy, Default)]
pub struct OutlierDetector {
    method: OutlierMethod,
}

impl OutlierDetector {
    pub fn new(method: OutlierMethod) -> Self {
        OutlierDetector {
            method: method.normalized(),
        }
    }

    pub fn method(&self) -> OutlierMethod {
        self.method
    }

    /// Run detection over the given columns
    pub fn detect<S: AsRef<str>>(&self, table: &Table, columns: &[S]) -> OutlierReport {
        let (mut records, summaries) = columns.iter().fold(
            (Vec::new(), Vec::new()),
            |(mut records, mut summaries), column| {
                if let Some((summary, flagged)) = self.detect_column(table, column.as_ref()) {
                    records.extend(flagged);
                    summaries.push(summary);
                }
                (records, summaries)
            },
        );

        records.sort_by(|a: &OutlierRecord, b: &OutlierRecord| {
            b.deviation
                .partial_cmp(&a.deviation)
                .unwrap_or(Ordering::Equal)
                .then(a.row_index.cmp(&b.row_index))
        });
        log::debug!(
            "{:?} flagged {} cells across {} columns",
            self.method,
            records.len(),
            summaries.len()
        );

        OutlierReport {
            method: self.method,
            records,
            columns: summaries,
        }
    }

    /// Fences and flagged cells of one column; `None` when the column has no valid values
    pub fn detect_column(
        &self,
        table: &Table,
        column: &str,
    ) -> Option<(ColumnOutliers, Vec<OutlierRecord>)> {
        let values: Vec<(usize, f64)> = table
            .column_values(column)
            .enumerate()
            .filter_map(|(i, v)| v.as_f64().map(|x| (i, x)))
            .collect();
        if values.is_empty() {
            return None;
        }
        let plain: Vec<f64> = values.iter().map(|&(_, x)| x).collect();
        let summary = stats::describe(&plain);

        let fence = Fence::for_method(self.method, &summary);
        let flagged: Vec<OutlierRecord> = match fence {
            Some(fence) => values
                .iter()
                .filter_map(|&(row_index, value)| {
                    fence.deviation(value).map(|deviation| OutlierRecord {
                        row_index,
                        column: column.to_string(),
                        value,
                        deviation,
                    })
                })
                .collect(),
            None => Vec::new(),
        };

        let (lower, upper) = fence.map_or((summary.q1, summary.q3), |f| (f.lower, f.upper));
        Some((
            ColumnOutliers {
                column: column.to_string(),
                lower,
                upper,
                count: flagged.len(),
            },
            flagged,
        ))
    }
}

/// Acceptance interval of a column
#[derive(Debug, Clone, Copy)]
struct Fence {
    lower: f64,
    upper: f64,
    kind: FenceKind,
}

#[derive(Debug, Clone, Copy)]
enum FenceKind {
    Iqr,
    ZScore { mean: f64, std: f64, threshold: f64 },
}

impl Fence {
    /// `None` when the column has no spread and nothing can be flagged
    fn for_method(method: OutlierMethod, summary: &DescriptiveStats) -> Option<Fence> {
        match method {
            OutlierMethod::Iqr { multiplier } => {
                let iqr = summary.q3 - summary.q1;
                if !(iqr > 0.0) {
                    return None;
                }
                Some(Fence {
                    lower: summary.q1 - multiplier * iqr,
                    upper: summary.q3 + multiplier * iqr,
                    kind: FenceKind::Iqr,
                })
            }
            OutlierMethod::ZScore { threshold } => {
                if !(summary.std > 0.0) {
                    return None;
                }
                Some(Fence {
                    lower: summary.mean - threshold * summary.std,
                    upper: summary.mean + threshold * summary.std,
                    kind: FenceKind::ZScore {
                        mean: summary.mean,
                        std: summary.std,
                        threshold,
                    },
                })
            }
        }
    }

    fn deviation(&self, value: f64) -> Option<f64> {
        match self.kind {
            FenceKind::Iqr => {
                if value < self.lower {
                    Some(self.lower - value)
                } else if value > self.upper {
                    Some(value - self.upper)
                } else {
                    None
                }
            }
            FenceKind::ZScore { mean, std, threshold } => {
                let z = (value - mean).abs() / std;
                (z >= threshold).then_some(z)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn column(values: &[f64]) -> Table {
        Table::from_records(&["v"], values.iter().map(|&x| vec![Value::from(x)]).collect())
    }

    #[test]
    fn test_iqr_flags_extremes() {
        let table = column(&[10.0, 12.0, 11.0, 13.0, 12.0, 11.0, 100.0, -50.0]);
        let report = OutlierDetector::default().detect(&table, &["v"]);
        assert_eq!(report.records.len(), 2);
        // fences are [8.5, 14.5]; 100 lies further outside than -50
        assert_eq!(report.records[0].value, 100.0);
        assert_eq!(report.records[0].row_index, 6);
        assert!((report.records[0].deviation - 85.5).abs() < 1e-9);
        assert_eq!(report.records[1].value, -50.0);
        assert_eq!(report.columns[0].lower, 8.5);
        assert_eq!(report.columns[0].upper, 14.5);
        assert_eq!(report.count_for("v"), 2);
        assert_eq!(report.most_affected().map(|c| c.column.as_str()), Some("v"));
    }

    #[test]
    fn test_constant_column_has_no_flags() {
        let table = column(&[5.0; 10]);
        let iqr = OutlierDetector::default().detect(&table, &["v"]);
        assert!(iqr.is_empty());
        assert_eq!(iqr.columns[0].count, 0);
        assert!(iqr.most_affected().is_none());

        let z = OutlierDetector::new(OutlierMethod::zscore(3.0)).detect(&table, &["v"]);
        assert!(z.is_empty());
    }

    #[test]
    fn test_zscore() {
        let mut values = vec![0.0; 20];
        values.push(50.0);
        let table = column(&values);
        let report = OutlierDetector::new(OutlierMethod::zscore(3.0)).detect(&table, &["v"]);
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].row_index, 20);
        assert!(report.records[0].deviation >= 3.0);
    }

    #[test]
    fn test_negative_threshold_clamped() {
        let detector = OutlierDetector::new(OutlierMethod::zscore(-2.0));
        assert_eq!(detector.method(), OutlierMethod::ZScore { threshold: 0.0 });
        let detector = OutlierDetector::new(OutlierMethod::Iqr { multiplier: f64::NAN });
        assert_eq!(detector.method(), OutlierMethod::iqr());
    }

    #[test]
    fn test_missing_column_skipped() {
        let report = OutlierDetector::default().detect(&column(&[1.0, 2.0]), &["absent"]);
        assert!(report.columns.is_empty());
    }
}
