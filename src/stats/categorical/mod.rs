// Categorical distributions
//
// Value counts per categorical column, the data behind distribution charts and
// the dominant-category insight.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::table::Table;

/// Count of one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub value: String,
    pub count: usize,
}

/// Distribution of one categorical column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    pub column: String,
    /// Ordered by count descending, ties by first appearance
    pub counts: Vec<CategoryCount>,
    /// Non-null cells counted
    pub total: usize,
}

impl Distribution {
    /// Most frequent category and its share of non-null cells
    pub fn dominant(&self) -> Option<(&str, f64)> {
        let top = self.counts.first()?;
        if self.total == 0 {
            return None;
        }
        Some((top.value.as_str(), top.count as f64 / self.total as f64))
    }
}

/// Value counts of a column; nulls are not counted
pub fn category_counts(table: &Table, column: &str) -> Distribution {
    // (first index, count) per key
    let tally: HashMap<String, (usize, usize)> = table
        .column_values(column)
        .filter(|v| !v.is_null())
        .enumerate()
        .fold(HashMap::new(), |mut acc, (i, v)| {
            acc.entry(v.to_key()).or_insert((i, 0)).1 += 1;
            acc
        });

    let mut ordered: Vec<(String, usize, usize)> = tally
        .into_iter()
        .map(|(value, (first, count))| (value, first, count))
        .collect();
    ordered.sort_by(|a, b| b.2.cmp(&a.2).then(a.1.cmp(&b.1)));

    let total: usize = ordered.iter().map(|(_, _, count)| count).sum();
    Distribution {
        column: column.to_string(),
        counts: ordered
            .into_iter()
            .map(|(value, _, count)| CategoryCount { value, count })
            .collect(),
        total,
    }
}

/// Share of the most frequent category, 0 when the column has no values
pub fn dominant_share(table: &Table, column: &str) -> f64 {
    category_counts(table, column)
        .dominant()
        .map_or(0.0, |(_, share)| share)
}

/// Group finite values of `numeric` by the key of `category`, groups in first-seen order
pub fn group_values(table: &Table, category: &str, numeric: &str) -> Vec<(String, Vec<f64>)> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<f64>> = HashMap::new();
    for row in 0..table.len() {
        let key = table.get(row, category);
        if key.is_null() {
            continue;
        }
        let Some(x) = table.get(row, numeric).as_f64() else {
            continue;
        };
        let key = key.to_key();
        if !groups.contains_key(&key) {
            order.push(key.clone());
        }
        groups.entry(key).or_default().push(x);
    }
    order
        .into_iter()
        .map(|key| {
            let values = groups.remove(&key).unwrap_or_default();
            (key, values)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn equipment() -> Table {
        Table::from_records(
            &["Type", "Flowrate"],
            vec![
                vec!["Valve".into(), 10.0.into()],
                vec!["Pump".into(), 30.0.into()],
                vec!["Pump".into(), 50.0.into()],
                vec![Value::Null, 70.0.into()],
                vec!["Valve".into(), Value::Null],
                vec!["Pump".into(), 40.0.into()],
            ],
        )
    }

    #[test]
    fn test_counts_ordered() {
        let dist = category_counts(&equipment(), "Type");
        assert_eq!(dist.total, 5);
        assert_eq!(dist.counts[0], CategoryCount { value: "Pump".into(), count: 3 });
        assert_eq!(dist.counts[1], CategoryCount { value: "Valve".into(), count: 2 });
        assert!((dominant_share(&equipment(), "Type") - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_ties_keep_first_appearance() {
        let table = Table::from_records(
            &["k"],
            vec![vec!["b".into()], vec!["a".into()], vec!["a".into()], vec!["b".into()]],
        );
        let dist = category_counts(&table, "k");
        assert_eq!(dist.counts[0].value, "b");
    }

    #[test]
    fn test_empty_column() {
        assert_eq!(dominant_share(&equipment(), "missing"), 0.0);
    }

    #[test]
    fn test_group_values() {
        let groups = group_values(&equipment(), "Type", "Flowrate");
        assert_eq!(
            groups,
            vec![
                ("Valve".to_string(), vec![10.0]),
                ("Pump".to_string(), vec![30.0, 50.0, 40.0]),
            ]
        );
    }
}
