//! Analysis configuration
//!
//! Every field has a default, so a configuration file only needs to name the
//! settings it changes. Files are read as TOML, YAML or JSON depending on the
//! extension.
//!
//! ```toml
//! [classifier]
//! max_uniques = 20
//!
//! [outliers]
//! method = "zscore"
//! z_threshold = 2.5
//!
//! [clustering]
//! k = 4
//! seed = 42
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::ml::anomaly_detection::OutlierMethod;
use crate::ml::clustering::{MAX_CLUSTERS, MIN_CLUSTERS};

/// Default pattern for identifier-like column names
pub const DEFAULT_IDENTIFIER_PATTERN: &str =
    r"(?i)^(?:id|idx|index|row|row_?(?:id|no|num|number)|record|#|.*[_ ]id)$";

/// Top-level configuration for an analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AnalysisConfig {
    pub classifier: ClassifierConfig,
    pub outliers: OutlierConfig,
    pub clustering: ClusteringConfig,
    pub insights: InsightConfig,
}

/// Column role inference settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Upper bound on distinct labels for a text/boolean categorical column
    pub max_uniques: usize,
    /// Upper bound on distinct codes for an integer-coded categorical column
    pub integer_category_max: usize,
    /// Whether repeated low-cardinality integer columns count as categorical
    pub integer_categories: bool,
    /// Number of leading rows inspected
    pub sample_rows: usize,
    /// Skip numeric-looking text instead of treating it as disqualifying
    pub relaxed_numeric_strings: bool,
    /// Case-insensitive regex for identifier-like column names
    pub identifier_pattern: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        ClassifierConfig {
            max_uniques: 50,
            integer_category_max: 10,
            integer_categories: true,
            sample_rows: 500,
            relaxed_numeric_strings: false,
            identifier_pattern: DEFAULT_IDENTIFIER_PATTERN.to_string(),
        }
    }
}

/// Which outlier rule a run applies to every numeric column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutlierRule {
    #[default]
    Iqr,
    ZScore,
}

/// Outlier detection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlierConfig {
    pub method: OutlierRule,
    pub iqr_multiplier: f64,
    pub z_threshold: f64,
}

impl Default for OutlierConfig {
    fn default() -> Self {
        OutlierConfig {
            method: OutlierRule::Iqr,
            iqr_multiplier: 1.5,
            z_threshold: 3.0,
        }
    }
}

impl OutlierConfig {
    /// The detection method described by this configuration
    pub fn to_method(&self) -> OutlierMethod {
        match self.method {
            OutlierRule::Iqr => OutlierMethod::Iqr {
                multiplier: self.iqr_multiplier,
            },
            OutlierRule::ZScore => OutlierMethod::ZScore {
                threshold: self.z_threshold,
            },
        }
    }
}

/// k-means settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    pub k: usize,
    pub max_iter: usize,
    pub tol: f64,
    /// Fixed seed for reproducible initialization; `None` draws from the OS
    pub seed: Option<u64>,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        ClusteringConfig {
            k: 3,
            max_iter: 100,
            tol: 1e-9,
            seed: None,
        }
    }
}

/// Thresholds for the insight synthesizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightConfig {
    /// Minimum |skewness| reported
    pub skew_threshold: f64,
    /// Minimum share of the largest category reported
    pub dominant_share: f64,
    /// Number of strongest correlation pairs kept in the report
    pub strongest_pairs: usize,
}

impl Default for InsightConfig {
    fn default() -> Self {
        InsightConfig {
            skew_threshold: 0.5,
            dominant_share: 0.5,
            strongest_pairs: 3,
        }
    }
}

impl AnalysisConfig {
    /// Load a configuration file, choosing the format from its extension
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        let config = match extension.as_str() {
            "toml" => Self::from_toml_str(&text)?,
            "yaml" | "yml" => Self::from_yaml_str(&text)?,
            "json" => Self::from_json_str(&text)?,
            other => {
                return Err(Error::UnsupportedFormat(format!(
                    "configuration extension '{}' ({})",
                    other,
                    path.display()
                )))
            }
        };
        log::debug!("loaded analysis configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str::<AnalysisConfig>(text)?.normalized())
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str::<AnalysisConfig>(text)?.normalized())
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str::<AnalysisConfig>(text)?.normalized())
    }

    /// Clamp out-of-range settings to the nearest valid value
    pub fn normalized(mut self) -> Self {
        let k = self.clustering.k.clamp(MIN_CLUSTERS, MAX_CLUSTERS);
        if k != self.clustering.k {
            log::warn!("clustering k={} clamped to {}", self.clustering.k, k);
            self.clustering.k = k;
        }
        if self.clustering.max_iter == 0 {
            log::warn!("clustering max_iter=0 raised to 1");
            self.clustering.max_iter = 1;
        }
        if !(self.clustering.tol.is_finite() && self.clustering.tol >= 0.0) {
            log::warn!("clustering tol={} reset to 1e-9", self.clustering.tol);
            self.clustering.tol = 1e-9;
        }
        if self.classifier.max_uniques == 0 {
            log::warn!("classifier max_uniques=0 raised to 1");
            self.classifier.max_uniques = 1;
        }
        if self.classifier.sample_rows == 0 {
            log::warn!("classifier sample_rows=0 raised to 1");
            self.classifier.sample_rows = 1;
        }
        self.outliers.iqr_multiplier = clamp_non_negative(self.outliers.iqr_multiplier, 1.5, "iqr_multiplier");
        self.outliers.z_threshold = clamp_non_negative(self.outliers.z_threshold, 3.0, "z_threshold");
        self.insights.skew_threshold = clamp_non_negative(self.insights.skew_threshold, 0.5, "skew_threshold");
        if !(0.0..=1.0).contains(&self.insights.dominant_share) {
            let share = if self.insights.dominant_share.is_finite() {
                self.insights.dominant_share.clamp(0.0, 1.0)
            } else {
                0.5
            };
            log::warn!("insights dominant_share={} clamped to {}", self.insights.dominant_share, share);
            self.insights.dominant_share = share;
        }
        self
    }
}

/// Shared clamp for thresholds: negative goes to 0, non-finite to the default
pub(crate) fn clamp_non_negative(value: f64, default: f64, name: &str) -> f64 {
    if !value.is_finite() {
        log::warn!("{}={} is not finite, using {}", name, value, default);
        default
    } else if value < 0.0 {
        log::warn!("{}={} is negative, clamped to 0", name, value);
        0.0
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.classifier.max_uniques, 50);
        assert_eq!(config.outliers.method, OutlierRule::Iqr);
        assert_eq!(config.clustering.max_iter, 100);
        assert_eq!(config.insights.strongest_pairs, 3);
    }

    #[test]
    fn test_partial_toml() {
        let config = AnalysisConfig::from_toml_str(
            "[outliers]\nmethod = \"zscore\"\nz_threshold = 2.5\n[clustering]\nk = 9\n",
        )
        .unwrap();
        assert_eq!(config.outliers.method, OutlierRule::ZScore);
        assert_eq!(config.outliers.z_threshold, 2.5);
        assert_eq!(config.clustering.k, MAX_CLUSTERS);
        assert_eq!(config.classifier, ClassifierConfig::default());
    }

    #[test]
    fn test_yaml_and_json() {
        let yaml = AnalysisConfig::from_yaml_str("clustering:\n  k: 1\n  seed: 7\n").unwrap();
        assert_eq!(yaml.clustering.k, MIN_CLUSTERS);
        assert_eq!(yaml.clustering.seed, Some(7));

        let json = AnalysisConfig::from_json_str(r#"{"outliers": {"z_threshold": -4.0}}"#).unwrap();
        assert_eq!(json.outliers.z_threshold, 0.0);
    }

    #[test]
    fn test_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.ini");
        fs::write(&path, "k=3").unwrap();
        assert!(matches!(
            AnalysisConfig::from_file(&path),
            Err(Error::UnsupportedFormat(_))
        ));
    }
}
