// Pairwise correlation
//
// Pearson's r per column pair using pairwise-complete observations: a row that
// is missing one column still contributes to every pair it is complete for.

use serde::{Deserialize, Serialize};

use crate::stats::descriptive::is_constant;
use crate::table::Table;

/// Square correlation matrix indexed by `columns`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// Empty when fewer than two columns were given
    pub matrix: Vec<Vec<f64>>,
}

/// One off-diagonal entry of a [`CorrelationMatrix`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationPair {
    pub first: String,
    pub second: String,
    pub r: f64,
}

impl CorrelationMatrix {
    /// Coefficient for two named columns
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.matrix.get(i).and_then(|row| row.get(j)).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.matrix.is_empty()
    }

    /// All upper-triangle pairs, in matrix order
    pub fn pairs(&self) -> Vec<CorrelationPair> {
        let n = self.matrix.len();
        let mut pairs = Vec::with_capacity(n * n.saturating_sub(1) / 2);
        for i in 0..n {
            for j in (i + 1)..n {
                pairs.push(CorrelationPair {
                    first: self.columns[i].clone(),
                    second: self.columns[j].clone(),
                    r: self.matrix[i][j],
                });
            }
        }
        pairs
    }

    /// Pairs ordered by |r| descending, at most `limit`
    pub fn strongest_pairs(&self, limit: usize) -> Vec<CorrelationPair> {
        let mut pairs = self.pairs();
        pairs.sort_by(|a, b| {
            b.r.abs()
                .partial_cmp(&a.r.abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        pairs.truncate(limit);
        pairs
    }
}

/// Pearson's r over already paired observations; 0 when undefined
pub(crate) fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n < 2 {
        return 0.0;
    }
    let x = &x[..n];
    let y = &y[..n];
    if is_constant(x) || is_constant(y) {
        return 0.0;
    }

    let mean_x = x.iter().sum::<f64>() / n as f64;
    let mean_y = y.iter().sum::<f64>() / n as f64;

    let (numerator, sum_sq_x, sum_sq_y) = x.iter().zip(y.iter()).fold(
        (0.0, 0.0, 0.0),
        |(num, sx, sy), (&xi, &yi)| {
            let dx = xi - mean_x;
            let dy = yi - mean_y;
            (num + dx * dy, sx + dx * dx, sy + dy * dy)
        },
    );

    let denominator = (sum_sq_x * sum_sq_y).sqrt();
    if !denominator.is_finite() || denominator == 0.0 {
        return 0.0;
    }

    let r = numerator / denominator;
    if r.is_finite() {
        r.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// Jointly finite observations of two columns
fn paired_values(table: &Table, a: &str, b: &str) -> (Vec<f64>, Vec<f64>) {
    table
        .column_values(a)
        .zip(table.column_values(b))
        .filter_map(|(va, vb)| Some((va.as_f64()?, vb.as_f64()?)))
        .unzip()
}

/// Correlation matrix over the given numeric columns
pub fn correlation_matrix<S: AsRef<str>>(table: &Table, columns: &[S]) -> CorrelationMatrix {
    let names: Vec<String> = columns.iter().map(|c| c.as_ref().to_string()).collect();
    let n = names.len();
    if n < 2 {
        return CorrelationMatrix {
            columns: names,
            matrix: Vec::new(),
        };
    }

    let mut matrix = vec![vec![0.0; n]; n];
    for i in 0..n {
        matrix[i][i] = 1.0;
        for j in (i + 1)..n {
            let (x, y) = paired_values(table, &names[i], &names[j]);
            let r = pearson(&x, &y);
            matrix[i][j] = r;
            matrix[j][i] = r;
        }
    }
    log::debug!("computed {}x{} correlation matrix over {} rows", n, n, table.len());

    CorrelationMatrix {
        columns: names,
        matrix,
    }
}
