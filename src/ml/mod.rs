//! Machine learning module
//!
//! Exploratory models over the rows that survive filtering: per-cell outlier
//! flags and k-means partitions of 2-D projections.

pub mod anomaly_detection;
pub mod clustering;

pub use anomaly_detection::{ColumnOutliers, OutlierDetector, OutlierMethod, OutlierRecord, OutlierReport};
pub use clustering::{points_from_columns, ClusterAssignment, KMeans, Point};
