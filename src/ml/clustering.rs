//! Clustering module
//!
//! Lloyd's k-means over 2-D projections of a table. Initialization samples
//! distinct points, so results vary between runs unless a seed is fixed.

use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::table::Table;

/// Smallest accepted cluster count
pub const MIN_CLUSTERS: usize = 2;
/// Largest accepted cluster count
pub const MAX_CLUSTERS: usize = 6;

/// A 2-D observation
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    fn squared_distance(&self, other: &Point) -> f64 {
        (self.x - other.x).powi(2) + (self.y - other.y).powi(2)
    }
}

/// Project two columns into points, skipping rows where either coordinate is unusable
///
/// Returns the points together with the row index each one came from.
pub fn points_from_columns(table: &Table, x: &str, y: &str) -> (Vec<Point>, Vec<usize>) {
    table
        .column_values(x)
        .zip(table.column_values(y))
        .enumerate()
        .filter_map(|(row, (vx, vy))| Some((Point::new(vx.as_f64()?, vy.as_f64()?), row)))
        .unzip()
}

/// Result of a k-means run
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClusterAssignment {
    /// Cluster id per point, 0-indexed
    pub labels: Vec<usize>,
    /// Final centroid per cluster
    pub centers: Vec<Point>,
    /// Source row per point, filled in by callers that project a table
    pub row_indices: Vec<usize>,
    /// Lloyd iterations performed
    pub iterations: usize,
    /// Sum of squared distances to the assigned centroid
    pub inertia: f64,
    /// Whether a stopping criterion fired before `max_iter`
    pub converged: bool,
}

impl ClusterAssignment {
    /// Effective number of clusters
    pub fn k(&self) -> usize {
        self.centers.len()
    }

    /// Member count per cluster
    pub fn cluster_sizes(&self) -> Vec<usize> {
        self.labels.iter().fold(vec![0; self.k()], |mut sizes, &label| {
            sizes[label] += 1;
            sizes
        })
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// k-means clustering algorithm
#[derive(Debug, Clone)]
pub struct KMeans {
    /// Number of clusters
    k: usize,
    /// Maximum number of iterations
    max_iter: usize,
    /// Total centroid displacement below which the run stops
    tol: f64,
    /// Random seed
    random_seed: Option<u64>,
}

impl Default for KMeans {
    fn default() -> Self {
        KMeans::new(3)
    }
}

impl KMeans {
    /// New instance; `k` is clamped to the supported range
    pub fn new(k: usize) -> Self {
        let clamped = k.clamp(MIN_CLUSTERS, MAX_CLUSTERS);
        if clamped != k {
            log::warn!("k={} outside [{}, {}], using {}", k, MIN_CLUSTERS, MAX_CLUSTERS, clamped);
        }
        KMeans {
            k: clamped,
            max_iter: 100,
            tol: 1e-9,
            random_seed: None,
        }
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter.max(1);
        self
    }

    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = if tol.is_finite() && tol >= 0.0 { tol } else { 1e-9 };
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.random_seed = seed;
        self
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Cluster the points, seeding from `random_seed` when set
    pub fn fit(&self, points: &[Point]) -> ClusterAssignment {
        match self.random_seed {
            Some(seed) => self.fit_with_rng(points, &mut StdRng::seed_from_u64(seed)),
            None => self.fit_with_rng(points, &mut rand::rng()),
        }
    }

    /// Cluster the points with caller-supplied randomness
    pub fn fit_with_rng<R: Rng + ?Sized>(&self, points: &[Point], rng: &mut R) -> ClusterAssignment {
        if points.is_empty() {
            return ClusterAssignment::default();
        }

        let mut centers = self.initial_centers(points, rng);
        let mut labels: Vec<usize> = Vec::new();
        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.max_iter {
            iterations += 1;

            let assigned: Vec<usize> = points.iter().map(|p| nearest(p, &centers)).collect();
            if assigned == labels {
                converged = true;
                break;
            }
            labels = assigned;

            let updated = update_centers(points, &labels, &centers);
            let shift: f64 = centers
                .iter()
                .zip(updated.iter())
                .map(|(old, new)| old.squared_distance(new).sqrt())
                .sum();
            centers = updated;

            if shift < self.tol {
                converged = true;
                break;
            }
        }

        let inertia = points
            .iter()
            .zip(labels.iter())
            .map(|(p, &label)| p.squared_distance(&centers[label]))
            .sum();
        log::debug!(
            "k-means k={} over {} points: {} iterations, inertia {:.4}, converged={}",
            centers.len(),
            points.len(),
            iterations,
            inertia,
            converged
        );

        ClusterAssignment {
            labels,
            centers,
            row_indices: Vec::new(),
            iterations,
            inertia,
            converged,
        }
    }

    /// k distinct points chosen uniformly; all points when there are fewer than k
    fn initial_centers<R: Rng + ?Sized>(&self, points: &[Point], rng: &mut R) -> Vec<Point> {
        if points.len() <= self.k {
            return points.to_vec();
        }
        index::sample(rng, points.len(), self.k)
            .into_iter()
            .map(|i| points[i])
            .collect()
    }
}

/// Index of the closest center, lowest index on ties
fn nearest(point: &Point, centers: &[Point]) -> usize {
    centers
        .iter()
        .enumerate()
        .fold((0, f64::INFINITY), |(best, best_dist), (i, c)| {
            let dist = point.squared_distance(c);
            if dist < best_dist {
                (i, dist)
            } else {
                (best, best_dist)
            }
        })
        .0
}

/// Member means; a cluster without members keeps its previous center
fn update_centers(points: &[Point], labels: &[usize], previous: &[Point]) -> Vec<Point> {
    let mut sums = vec![(0.0, 0.0, 0usize); previous.len()];
    for (p, &label) in points.iter().zip(labels.iter()) {
        let entry = &mut sums[label];
        entry.0 += p.x;
        entry.1 += p.y;
        entry.2 += 1;
    }
    sums.iter()
        .zip(previous.iter())
        .map(|(&(sx, sy, count), prev)| {
            if count == 0 {
                *prev
            } else {
                Point::new(sx / count as f64, sy / count as f64)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn blobs() -> Vec<Point> {
        let mut points = Vec::new();
        for i in 0..10 {
            let jitter = i as f64 * 0.01;
            points.push(Point::new(0.0 + jitter, 0.0 - jitter));
            points.push(Point::new(100.0 - jitter, 100.0 + jitter));
        }
        points
    }

    #[test]
    fn test_k_clamped() {
        assert_eq!(KMeans::new(1).k(), 2);
        assert_eq!(KMeans::new(10).k(), 6);
        assert_eq!(KMeans::new(4).k(), 4);
    }

    #[test]
    fn test_separates_blobs() {
        let points = blobs();
        let result = KMeans::new(2).with_seed(Some(7)).fit(&points);
        assert_eq!(result.labels.len(), points.len());
        assert_eq!(result.k(), 2);
        assert!(result.converged);
        // even positions belong to the first blob, odd to the second
        let a = result.labels[0];
        let b = result.labels[1];
        assert_ne!(a, b);
        for (i, &label) in result.labels.iter().enumerate() {
            assert_eq!(label, if i % 2 == 0 { a } else { b });
        }
        assert_eq!(result.cluster_sizes(), vec![10, 10]);
    }

    #[test]
    fn test_centers_are_member_means() {
        let points: Vec<Point> = (0..30)
            .map(|i| Point::new((i * 7 % 13) as f64, (i * 5 % 11) as f64))
            .collect();
        let result = KMeans::new(3).with_seed(Some(11)).fit(&points);
        for (c, center) in result.centers.iter().enumerate() {
            let members: Vec<&Point> = points
                .iter()
                .zip(result.labels.iter())
                .filter(|&(_, &l)| l == c)
                .map(|(p, _)| p)
                .collect();
            if members.is_empty() {
                continue;
            }
            let mx = members.iter().map(|p| p.x).sum::<f64>() / members.len() as f64;
            let my = members.iter().map(|p| p.y).sum::<f64>() / members.len() as f64;
            assert!((center.x - mx).abs() < 1e-9);
            assert!((center.y - my).abs() < 1e-9);
        }
    }

    #[test]
    fn test_seed_reproducible() {
        let points = blobs();
        let first = KMeans::new(3).with_seed(Some(42)).fit(&points);
        let second = KMeans::new(3).with_seed(Some(42)).fit(&points);
        assert_eq!(first, second);
    }

    #[test]
    fn test_fewer_points_than_k() {
        let points = vec![Point::new(1.0, 1.0), Point::new(5.0, 5.0)];
        let result = KMeans::new(4).with_seed(Some(1)).fit(&points);
        assert_eq!(result.k(), 2);
        assert_eq!(result.labels, vec![0, 1]);
        assert_eq!(result.inertia, 0.0);
    }

    #[test]
    fn test_empty_input() {
        let result = KMeans::new(3).fit(&[]);
        assert!(result.is_empty());
        assert!(result.centers.is_empty());
    }

    #[test]
    fn test_points_from_columns() {
        let table = Table::from_records(
            &["x", "y"],
            vec![
                vec![1.0.into(), 2.0.into()],
                vec![Value::Null, 3.0.into()],
                vec![4.0.into(), "bad".into()],
                vec![5.0.into(), 6.0.into()],
            ],
        );
        let (points, rows) = points_from_columns(&table, "x", "y");
        assert_eq!(points, vec![Point::new(1.0, 2.0), Point::new(5.0, 6.0)]);
        assert_eq!(rows, vec![0, 3]);
    }
}
