//! Memoized analysis over a table that changes rarely and filters that change often

use rand::Rng;

use crate::analytics::{AnalysisReport, Analyzer};
use crate::error::Result;
use crate::filter::{matching_indices, FilterSet};
use crate::ml::ClusterAssignment;
use crate::schema::Classification;
use crate::table::Table;

/// Filter sets remembered per table version
const MAX_CACHED_FILTER_SETS: usize = 16;

/// Caller-owned cache of stage outputs keyed on table version and filters
///
/// Classification is computed once per table version. Filtered row indices and
/// reports are kept for the most recent filter sets. Clustering always reruns.
#[derive(Debug)]
pub struct AnalysisSession {
    analyzer: Analyzer,
    table: Table,
    version: u64,
    classification: Option<Classification>,
    filtered: Vec<(FilterSet, Vec<usize>)>,
    reports: Vec<(FilterSet, AnalysisReport)>,
}

impl AnalysisSession {
    pub fn new(analyzer: Analyzer, table: Table) -> Self {
        AnalysisSession {
            analyzer,
            table,
            version: 0,
            classification: None,
            filtered: Vec::new(),
            reports: Vec::new(),
        }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    /// Incremented on every [`AnalysisSession::replace_table`]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Swap in a new table snapshot and drop every cached result
    pub fn replace_table(&mut self, table: Table) {
        self.table = table;
        self.version += 1;
        self.invalidate();
        log::info!(
            "table replaced (version {}, {} rows), caches cleared",
            self.version,
            self.table.len()
        );
    }

    /// Drop cached results without changing the table
    pub fn invalidate(&mut self) {
        self.classification = None;
        self.filtered.clear();
        self.reports.clear();
    }

    pub fn classification(&mut self) -> &Classification {
        let (analyzer, table) = (&self.analyzer, &self.table);
        self.classification
            .get_or_insert_with(|| analyzer.classify(table))
    }

    /// Row indices passing `filters`
    pub fn filtered_rows(&mut self, filters: &FilterSet) -> &[usize] {
        let position = match self.filtered.iter().position(|(f, _)| f == filters) {
            Some(position) => position,
            None => {
                let indices = matching_indices(&self.table, filters);
                remember(&mut self.filtered, filters.clone(), indices)
            }
        };
        &self.filtered[position].1
    }

    /// Report for `filters`, recomputed only when the table or filters are new
    pub fn report(&mut self, filters: &FilterSet) -> &AnalysisReport {
        if let Some(position) = self.reports.iter().position(|(f, _)| f == filters) {
            log::debug!("report cache hit at version {}", self.version);
            return &self.reports[position].1;
        }

        let classification = self.classification().clone();
        let indices = self.filtered_rows(filters).to_vec();
        let report = self.analyzer.analyze_rows(&self.table, &classification, &indices);
        let position = remember(&mut self.reports, filters.clone(), report);
        &self.reports[position].1
    }

    /// Cluster the filtered rows; never cached
    pub fn cluster(&mut self, filters: &FilterSet, x: &str, y: &str) -> Result<ClusterAssignment> {
        self.analyzer.cluster(&self.table, filters, x, y)
    }

    pub fn cluster_with_rng<R: Rng + ?Sized>(
        &mut self,
        filters: &FilterSet,
        x: &str,
        y: &str,
        rng: &mut R,
    ) -> Result<ClusterAssignment> {
        self.analyzer.cluster_with_rng(&self.table, filters, x, y, rng)
    }
}

/// Append an entry, evicting the oldest past the limit; returns its position
fn remember<T>(cache: &mut Vec<(FilterSet, T)>, filters: FilterSet, value: T) -> usize {
    if cache.len() >= MAX_CACHED_FILTER_SETS {
        cache.remove(0);
    }
    cache.push((filters, value));
    cache.len() - 1
}
