//! Insight synthesis
//!
//! Turns the outputs of the statistics, correlation and outlier stages into a
//! short ranked list of findings. A kind of finding with no qualifying signal
//! is simply left out.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::config::InsightConfig;
use crate::ml::OutlierReport;
use crate::schema::Classification;
use crate::stats::{self, categorical, CorrelationMatrix, Distribution, StatSummary};
use crate::table::Table;

/// Kind of finding, in report order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    HighestVariability,
    LargestMean,
    MostVolatile,
    MostStable,
    MostSkewed,
    TopPositiveCorrelation,
    TopNegativeCorrelation,
    OutlierHeavy,
    DominantCategory,
    CategoryMeanGap,
}

/// One finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub message: String,
}

impl Insight {
    fn new(kind: InsightKind, message: String) -> Self {
        Insight { kind, message }
    }
}

/// Stage outputs the synthesizer reads; `table` is the filtered working set
#[derive(Debug, Clone, Copy)]
pub struct InsightInput<'a> {
    pub table: &'a Table,
    pub classification: &'a Classification,
    pub summaries: &'a [StatSummary],
    pub correlation: &'a CorrelationMatrix,
    pub outliers: &'a OutlierReport,
    pub distributions: &'a [Distribution],
}

/// Build the ranked findings list
pub fn synthesize(input: &InsightInput<'_>, config: &InsightConfig) -> Vec<Insight> {
    let mut insights = Vec::new();
    let summaries: Vec<&StatSummary> = input
        .summaries
        .iter()
        .filter(|s| s.sample_count > 0)
        .collect();

    if let Some(s) = first_max_by(&summaries, |s| s.std) {
        if s.std > 0.0 {
            insights.push(Insight::new(
                InsightKind::HighestVariability,
                format!("Highest variability: {} (std = {:.2})", s.column, s.std),
            ));
        }
    }
    if let Some(s) = first_max_by(&summaries, |s| s.mean) {
        if s.mean != 0.0 {
            insights.push(Insight::new(
                InsightKind::LargestMean,
                format!("Largest mean value: {} (mean = {:.2})", s.column, s.mean),
            ));
        }
    }

    insights.extend(variation_insights(&summaries));

    if let Some(insight) = skew_insight(input, config) {
        insights.push(insight);
    }
    insights.extend(correlation_insights(input.correlation));

    if let Some(column) = input.outliers.most_affected() {
        let pct = column.count as f64 / input.table.len().max(1) as f64 * 100.0;
        insights.push(Insight::new(
            InsightKind::OutlierHeavy,
            format!(
                "Outlier-heavy: {} ({} points, {:.1}% of rows)",
                column.column, column.count, pct
            ),
        ));
    }

    for dist in input.distributions {
        if let Some((value, share)) = dist.dominant() {
            if share >= config.dominant_share {
                insights.push(Insight::new(
                    InsightKind::DominantCategory,
                    format!(
                        "Dominant category: {} = {} ({:.1}% of rows)",
                        dist.column,
                        value,
                        share * 100.0
                    ),
                ));
            }
        }
    }

    if let Some(insight) = mean_gap_insight(input, &summaries) {
        insights.push(insight);
    }

    log::debug!("synthesized {} insights", insights.len());
    insights
}

/// First element with the largest key; NaN keys never win
fn first_max_by<'a, T, F>(items: &[&'a T], key: F) -> Option<&'a T>
where
    F: Fn(&T) -> f64,
{
    items
        .iter()
        .copied()
        .filter(|item| !key(item).is_nan())
        .fold(None, |best: Option<&'a T>, item| match best {
            Some(b) if key(b) >= key(item) => Some(b),
            _ => Some(item),
        })
}

fn variation_insights(summaries: &[&StatSummary]) -> Vec<Insight> {
    let cvs: Vec<(&str, f64)> = summaries
        .iter()
        .filter_map(|s| s.coefficient_of_variation().map(|cv| (s.column.as_str(), cv)))
        .collect();

    let volatile = cvs
        .iter()
        .fold(None, |best: Option<(&str, f64)>, &(c, cv)| match best {
            Some((_, b)) if b >= cv => best,
            _ => Some((c, cv)),
        });
    let Some((volatile_col, volatile_cv)) = volatile else {
        return Vec::new();
    };
    if !(volatile_cv > 0.0) {
        return Vec::new();
    }

    let mut insights = vec![Insight::new(
        InsightKind::MostVolatile,
        format!("Most volatile by CV: {} (CV = {:.2})", volatile_col, volatile_cv),
    )];

    if cvs.len() >= 2 {
        let stable = cvs
            .iter()
            .fold(None, |best: Option<(&str, f64)>, &(c, cv)| match best {
                Some((_, b)) if b <= cv => best,
                _ => Some((c, cv)),
            });
        if let Some((stable_col, stable_cv)) = stable {
            if stable_col != volatile_col {
                insights.push(Insight::new(
                    InsightKind::MostStable,
                    format!("Most stable by CV: {} (CV = {:.2})", stable_col, stable_cv),
                ));
            }
        }
    }
    insights
}

fn skew_insight(input: &InsightInput<'_>, config: &InsightConfig) -> Option<Insight> {
    let (column, skew) = input
        .summaries
        .iter()
        .filter(|s| s.sample_count >= 3)
        .fold(None, |best: Option<(&str, f64)>, s| match best {
            Some((_, b)) if b.abs() >= s.skewness.abs() => best,
            _ => Some((s.column.as_str(), s.skewness)),
        })?;

    (skew.abs() > config.skew_threshold).then(|| {
        Insight::new(
            InsightKind::MostSkewed,
            format!("Most skewed: {} (skew = {:.2})", column, skew),
        )
    })
}

fn correlation_insights(correlation: &CorrelationMatrix) -> Vec<Insight> {
    let pairs = correlation.pairs();
    let by_r = |a: &&stats::CorrelationPair, b: &&stats::CorrelationPair| {
        a.r.partial_cmp(&b.r).unwrap_or(Ordering::Equal)
    };

    let mut insights = Vec::new();
    // earliest pair wins ties in both directions
    let positive = pairs.iter().rev().max_by(by_r).filter(|p| p.r > 0.0);
    if let Some(p) = positive {
        insights.push(Insight::new(
            InsightKind::TopPositiveCorrelation,
            format!("Top positive correlation: {} vs {} (r={:.2})", p.first, p.second, p.r),
        ));
    }
    let negative = pairs.iter().min_by(by_r).filter(|p| p.r < 0.0);
    if let Some(p) = negative {
        insights.push(Insight::new(
            InsightKind::TopNegativeCorrelation,
            format!("Top negative correlation: {} vs {} (r={:.2})", p.first, p.second, p.r),
        ));
    }
    insights
}

fn mean_gap_insight(input: &InsightInput<'_>, summaries: &[&StatSummary]) -> Option<Insight> {
    let category = input.classification.categorical.first()?;

    let mut best: Option<(f64, String)> = None;
    for summary in summaries.iter().filter(|s| s.std > 0.0) {
        let groups = categorical::group_values(input.table, category, &summary.column);
        if groups.len() < 2 {
            continue;
        }
        let means: Vec<(String, f64)> = groups
            .into_iter()
            .map(|(key, values)| {
                let mean = stats::descriptive::mean(&values);
                (key, mean)
            })
            .collect();

        let (hi_key, hi) = means
            .iter()
            .fold(&means[0], |b, m| if m.1 > b.1 { m } else { b });
        let (lo_key, lo) = means
            .iter()
            .fold(&means[0], |b, m| if m.1 < b.1 { m } else { b });
        let gap = hi - lo;
        if !(gap > 0.0) {
            continue;
        }
        let score = gap / summary.std;
        if best.as_ref().map_or(true, |(s, _)| score > *s) {
            best = Some((
                score,
                format!(
                    "Category mean gap: {} by {} ({} {:.2} vs {} {:.2})",
                    summary.column, category, hi_key, hi, lo_key, lo
                ),
            ));
        }
    }

    best.map(|(_, message)| Insight::new(InsightKind::CategoryMeanGap, message))
}
