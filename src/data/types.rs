use std::borrow::Borrow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::model::{Dataset, Row};
use crate::config::EngineConfig;

/// Numeric / categorical classification of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Numeric,
    Categorical,
}

/// Column name → classification. Derived from the dataset, never stored apart from it.
pub type ColumnTypeMap = BTreeMap<String, ColumnType>;

/// Classify one column: numeric iff more than `threshold` of all sampled
/// values parse as a finite number. Missing cells count in the denominator.
pub fn classify_column<R: Borrow<Row>>(rows: &[R], column: &str, threshold: f64) -> ColumnType {
    if rows.is_empty() {
        return ColumnType::Categorical;
    }
    let numeric = rows
        .iter()
        .filter(|r| Borrow::<Row>::borrow(*r).get(column).as_number().is_some())
        .count();
    if numeric as f64 / rows.len() as f64 > threshold {
        ColumnType::Numeric
    } else {
        ColumnType::Categorical
    }
}

/// Infer the type of every column with the default threshold.
pub fn infer_column_types(dataset: &Dataset) -> ColumnTypeMap {
    infer_column_types_with(dataset.rows(), dataset.columns(), &EngineConfig::default())
}

/// Infer the type of every listed column. An empty row set yields an empty map.
pub fn infer_column_types_with<R: Borrow<Row>>(
    rows: &[R],
    columns: &[String],
    config: &EngineConfig,
) -> ColumnTypeMap {
    if rows.is_empty() {
        return ColumnTypeMap::new();
    }
    columns
        .iter()
        .map(|col| {
            (
                col.clone(),
                classify_column(rows, col, config.numeric_threshold),
            )
        })
        .collect()
}

/// Names of the columns of `kind`, in dataset column order.
pub fn columns_of_type(columns: &[String], types: &ColumnTypeMap, kind: ColumnType) -> Vec<String> {
    columns
        .iter()
        .filter(|c| types.get(c.as_str()) == Some(&kind))
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// Basic numeric statistics
// ---------------------------------------------------------------------------

/// Summary of the parseable numeric values of a column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColumnStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// Statistics over the numeric values of `column`; `None` if it has none.
/// Unparseable cells are excluded, not defaulted.
pub fn column_stats<R: Borrow<Row>>(rows: &[R], column: &str) -> Option<ColumnStats> {
    let mut count = 0usize;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    for v in rows.iter().filter_map(|r| r.borrow().get(column).as_number()) {
        count += 1;
        min = min.min(v);
        max = max.max(v);
        sum += v;
    }
    (count > 0).then(|| ColumnStats {
        count,
        min,
        max,
        mean: sum / count as f64,
    })
}

/// Statistics for every column holding at least one number, in column order.
pub fn numeric_summary<R: Borrow<Row>>(rows: &[R], columns: &[String]) -> Vec<(String, ColumnStats)> {
    columns
        .iter()
        .filter_map(|col| column_stats(rows, col).map(|stats| (col.clone(), stats)))
        .collect()
}
