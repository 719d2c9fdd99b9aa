//! Schema-adaptive analysis of tabular data
//!
//! Given rows with no declared schema, tabsight infers which columns are
//! measurements and which are categories, then derives descriptive
//! statistics, pairwise correlations, outliers, k-means clusters and a short
//! list of textual insights.
//!
//! ```rust
//! use tabsight::{Analyzer, FilterSet, Table, Value};
//!
//! let table = Table::from_records(
//!     &["Type", "Flowrate"],
//!     vec![
//!         vec![Value::from("Pump"), Value::from(10.5)],
//!         vec![Value::from("Valve"), Value::from(20.5)],
//!         vec![Value::from("Pump"), Value::from(30.5)],
//!     ],
//! );
//! let report = Analyzer::default().analyze(&table, &FilterSet::new());
//! assert_eq!(report.classification.numeric, vec!["Flowrate"]);
//! assert_eq!(report.classification.categorical, vec!["Type"]);
//! ```

pub mod analytics;
pub mod config;
pub mod error;
pub mod filter;
pub mod io;
pub mod ml;
pub mod schema;
pub mod stats;
pub mod table;
pub mod value;

// Re-export commonly used types
pub use analytics::{AnalysisReport, AnalysisSession, Analyzer, Insight, InsightKind};
pub use config::AnalysisConfig;
pub use error::{Error, Result, TabsightError};
pub use filter::{apply_filters, Filter, FilterSet};
pub use ml::{ClusterAssignment, KMeans, OutlierDetector, OutlierMethod};
pub use schema::{classify_columns, Classification, ColumnClassifier, ColumnRole};
pub use stats::{CorrelationMatrix, StatSummary};
pub use table::{Row, Table};
pub use value::Value;

// Export version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
