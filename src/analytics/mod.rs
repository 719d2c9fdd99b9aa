//! Analysis pipeline
//!
//! [`Analyzer`] runs the engine stages in order over one table snapshot:
//!
//! - column classification over the full table
//! - filtering into the working row set
//! - descriptive statistics, correlation and outlier detection
//! - categorical distributions and insight synthesis
//!
//! Clustering is requested separately because the axes are chosen by the caller.
//!
//! # Example
//!
//! ```rust
//! use tabsight::analytics::Analyzer;
//! use tabsight::filter::FilterSet;
//! use tabsight::table::Table;
//! use tabsight::value::Value;
//!
//! let table = Table::from_records(
//!     &["T"],
//!     vec![vec![Value::from(10.0)], vec![Value::from(20.0)], vec![Value::from(30.0)]],
//! );
//! let report = Analyzer::default().analyze(&table, &FilterSet::new());
//! assert_eq!(report.summaries[0].median, 20.0);
//! ```

pub mod insights;
pub mod quality;
pub mod session;

pub use insights::{synthesize, Insight, InsightInput, InsightKind};
pub use quality::{quality_report, ColumnType, DuplicateRows, QualityReport, SchemaDrift, ValueRange};
pub use session::AnalysisSession;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::error::{Error, Result};
use crate::filter::{matching_indices, FilterSet};
use crate::ml::{points_from_columns, ClusterAssignment, ColumnOutliers, KMeans, OutlierDetector, OutlierRecord};
use crate::schema::{Classification, ColumnClassifier};
use crate::stats::{self, CorrelationMatrix, CorrelationPair, Distribution, StatSummary};
use crate::table::Table;

/// Everything the engine derives from one (table, filters) pair
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub total_rows: usize,
    pub filtered_rows: usize,
    pub classification: Classification,
    pub summaries: Vec<StatSummary>,
    pub correlation: CorrelationMatrix,
    pub strongest_pairs: Vec<CorrelationPair>,
    /// Flagged cells; `row_index` refers to the unfiltered table
    pub outliers: Vec<OutlierRecord>,
    pub column_outliers: Vec<ColumnOutliers>,
    pub distributions: Vec<Distribution>,
    pub insights: Vec<Insight>,
}

/// Stateless pipeline runner
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: AnalysisConfig,
    classifier: ColumnClassifier,
}

impl Analyzer {
    /// Build an analyzer; fails only on an invalid identifier pattern
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        let config = config.normalized();
        let classifier = ColumnClassifier::new(config.classifier.clone())?;
        Ok(Analyzer { config, classifier })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Column roles of the full table
    pub fn classify(&self, table: &Table) -> Classification {
        self.classifier.classify(table)
    }

    /// Run the whole pipeline
    pub fn analyze(&self, table: &Table, filters: &FilterSet) -> AnalysisReport {
        let classification = self.classify(table);
        let indices = matching_indices(table, filters);
        self.analyze_rows(table, &classification, &indices)
    }

    /// Run the pipeline on already classified and filtered rows
    ///
    /// Indices past the end of `table` are skipped.
    pub fn analyze_rows(
        &self,
        table: &Table,
        classification: &Classification,
        indices: &[usize],
    ) -> AnalysisReport {
        let indices: Vec<usize> = indices.iter().copied().filter(|&i| i < table.len()).collect();
        let working = table.select(&indices);
        let numeric = &classification.numeric;

        let summaries = stats::describe_columns(&working, numeric);
        let correlation = stats::correlation_matrix(&working, numeric);
        let strongest_pairs = correlation.strongest_pairs(self.config.insights.strongest_pairs);
        let outliers = OutlierDetector::new(self.config.outliers.to_method()).detect(&working, numeric);
        let distributions: Vec<Distribution> = classification
            .categorical
            .iter()
            .map(|c| stats::category_counts(&working, c))
            .collect();

        let insights = synthesize(
            &InsightInput {
                table: &working,
                classification,
                summaries: &summaries,
                correlation: &correlation,
                outliers: &outliers,
                distributions: &distributions,
            },
            &self.config.insights,
        );

        let records = outliers
            .records
            .into_iter()
            .map(|mut record| {
                record.row_index = indices[record.row_index];
                record
            })
            .collect();

        log::debug!(
            "analyzed {} of {} rows: {} numeric, {} categorical, {} insights",
            working.len(),
            table.len(),
            numeric.len(),
            classification.categorical.len(),
            insights.len()
        );

        AnalysisReport {
            total_rows: table.len(),
            filtered_rows: working.len(),
            classification: classification.clone(),
            summaries,
            correlation,
            strongest_pairs,
            outliers: records,
            column_outliers: outliers.columns,
            distributions,
            insights,
        }
    }

    /// k-means configured from [`AnalysisConfig::clustering`]
    pub fn kmeans(&self) -> KMeans {
        let c = &self.config.clustering;
        KMeans::new(c.k)
            .with_max_iter(c.max_iter)
            .with_tol(c.tol)
            .with_seed(c.seed)
    }

    /// Cluster the filtered rows projected onto columns `x` and `y`
    pub fn cluster(&self, table: &Table, filters: &FilterSet, x: &str, y: &str) -> Result<ClusterAssignment> {
        let indices = self.cluster_rows(table, filters, x, y)?;
        let (points, rows) = points_from_columns(&table.select(&indices), x, y);
        let mut assignment = self.kmeans().fit(&points);
        assignment.row_indices = rows.into_iter().map(|r| indices[r]).collect();
        Ok(assignment)
    }

    /// [`Analyzer::cluster`] with caller-supplied randomness
    pub fn cluster_with_rng<R: Rng + ?Sized>(
        &self,
        table: &Table,
        filters: &FilterSet,
        x: &str,
        y: &str,
        rng: &mut R,
    ) -> Result<ClusterAssignment> {
        let indices = self.cluster_rows(table, filters, x, y)?;
        let (points, rows) = points_from_columns(&table.select(&indices), x, y);
        let mut assignment = self.kmeans().fit_with_rng(&points, rng);
        assignment.row_indices = rows.into_iter().map(|r| indices[r]).collect();
        Ok(assignment)
    }

    fn cluster_rows(&self, table: &Table, filters: &FilterSet, x: &str, y: &str) -> Result<Vec<usize>> {
        for axis in [x, y] {
            if !table.has_column(axis) {
                return Err(Error::ColumnNotFound(axis.to_string()));
            }
        }
        Ok(matching_indices(table, filters))
    }
}
