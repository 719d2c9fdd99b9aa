// Statistics module
//
// Descriptive summaries, pairwise correlation and categorical distributions.
// Every function here degrades to zeroed or empty results on degenerate
// input rather than returning an error.

pub mod categorical;
pub mod correlation;
pub mod descriptive;

pub use categorical::{category_counts, dominant_share, CategoryCount, Distribution};
pub use correlation::{correlation_matrix, CorrelationMatrix, CorrelationPair};

use serde::{Deserialize, Serialize};

use crate::table::Table;

/// Summary statistics of a numeric slice
///
/// # Example
/// ```rust
/// use tabsight::stats;
///
/// let data = vec![10.0, 20.0, 30.0];
/// let stats = stats::describe(&data);
/// assert_eq!(stats.q1, 15.0);
/// assert_eq!(stats.std, 10.0);
/// ```
pub fn describe<T: AsRef<[f64]>>(data: T) -> DescriptiveStats {
    descriptive::describe_impl(data.as_ref())
}

/// Result of [`describe`]; all zero for an empty slice
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DescriptiveStats {
    /// Number of values
    pub count: usize,
    /// Arithmetic mean
    pub mean: f64,
    /// Sample standard deviation (n-1 divisor)
    pub std: f64,
    /// Minimum
    pub min: f64,
    /// 25th percentile
    pub q1: f64,
    /// Median (50th percentile)
    pub median: f64,
    /// 75th percentile
    pub q3: f64,
    /// Maximum
    pub max: f64,
}

/// Per-column summary over a (filtered) table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatSummary {
    pub column: String,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub mean: f64,
    pub std: f64,
    /// Sample variance, `std` squared
    pub variance: f64,
    /// Adjusted Fisher-Pearson skewness; 0 below three values
    pub skewness: f64,
    /// Finite numeric values used
    pub sample_count: usize,
    /// Rows without a usable numeric value
    pub missing_count: usize,
    /// Rows in the table
    pub total_count: usize,
}

impl StatSummary {
    /// Interquartile range
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    /// Coefficient of variation, `None` when the mean is too close to zero
    pub fn coefficient_of_variation(&self) -> Option<f64> {
        if self.mean.abs() < 1e-9 {
            None
        } else {
            Some((self.std / self.mean).abs())
        }
    }
}

/// Summarize one column; non-numeric and non-finite cells count as missing
pub fn describe_column(table: &Table, column: &str) -> StatSummary {
    let values = table.numeric_values(column);
    let stats = describe(&values);
    StatSummary {
        column: column.to_string(),
        min: stats.min,
        q1: stats.q1,
        median: stats.median,
        q3: stats.q3,
        max: stats.max,
        mean: stats.mean,
        std: stats.std,
        variance: stats.std * stats.std,
        skewness: skewness(&values),
        sample_count: stats.count,
        missing_count: table.len() - stats.count,
        total_count: table.len(),
    }
}

/// Summarize several columns, preserving their order
pub fn describe_columns<S: AsRef<str>>(table: &Table, columns: &[S]) -> Vec<StatSummary> {
    columns
        .iter()
        .map(|c| describe_column(table, c.as_ref()))
        .collect()
}

/// Pearson correlation of two equally long slices; 0 when undefined
pub fn correlation<T: AsRef<[f64]>, U: AsRef<[f64]>>(x: T, y: U) -> f64 {
    correlation::pearson(x.as_ref(), y.as_ref())
}

/// Adjusted Fisher-Pearson skewness; 0 for fewer than 3 values or zero spread
pub fn skewness<T: AsRef<[f64]>>(data: T) -> f64 {
    descriptive::skewness_impl(data.as_ref())
}
