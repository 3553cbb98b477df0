use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::model::{CellValue, Dataset, Row};
use super::types::{column_stats, ColumnType, ColumnTypeMap};

// ---------------------------------------------------------------------------
// Column filter predicates
// ---------------------------------------------------------------------------

/// An active filter on one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ColumnFilter {
    /// Keep numeric values within `[min, max]`; non-numeric cells fail.
    Range { min: f64, max: f64 },
    /// Keep cells whose text equals `value` exactly.
    Exact { value: String },
    /// Keep cells whose lower-cased text contains lower-cased `value`.
    Contains { value: String },
}

impl ColumnFilter {
    /// A filter still holding its placeholder matches every row.
    /// For ranges, a cleared (NaN) bound is the placeholder.
    pub fn is_noop(&self) -> bool {
        match self {
            ColumnFilter::Range { min, max } => min.is_nan() || max.is_nan(),
            ColumnFilter::Exact { value } | ColumnFilter::Contains { value } => value.is_empty(),
        }
    }

    pub fn matches(&self, cell: &CellValue) -> bool {
        if self.is_noop() {
            return true;
        }
        match self {
            ColumnFilter::Range { min, max } => cell
                .as_number()
                .is_some_and(|v| v >= *min && v <= *max),
            ColumnFilter::Exact { value } => cell.to_string() == *value,
            ColumnFilter::Contains { value } => cell
                .to_string()
                .to_lowercase()
                .contains(&value.to_lowercase()),
        }
    }
}

// ---------------------------------------------------------------------------
// FilterSpec: at most one filter per column
// ---------------------------------------------------------------------------

/// Per-column filters, combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSpec {
    filters: BTreeMap<String, ColumnFilter>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the default filter for `column`: a range spanning the observed
    /// min/max for numeric columns, an empty exact match otherwise.
    /// Replaces any filter already on the column.
    pub fn add_default(&mut self, dataset: &Dataset, types: &ColumnTypeMap, column: &str) {
        let numeric_stats = match types.get(column) {
            Some(ColumnType::Numeric) => column_stats(dataset.rows(), column),
            _ => None,
        };
        let filter = match numeric_stats {
            Some(stats) => ColumnFilter::Range {
                min: stats.min,
                max: stats.max,
            },
            None => ColumnFilter::Exact {
                value: String::new(),
            },
        };
        self.set(column, filter);
    }

    pub fn set(&mut self, column: &str, filter: ColumnFilter) {
        self.filters.insert(column.to_string(), filter);
    }

    pub fn remove(&mut self, column: &str) -> Option<ColumnFilter> {
        self.filters.remove(column)
    }

    pub fn clear(&mut self) {
        self.filters.clear();
    }

    pub fn get(&self, column: &str) -> Option<&ColumnFilter> {
        self.filters.get(column)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ColumnFilter)> {
        self.filters.iter()
    }

    /// Columns that currently carry a filter.
    pub fn active_columns(&self) -> Vec<String> {
        self.filters.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Whether `row` passes every filter.
    pub fn matches(&self, row: &Row) -> bool {
        self.filters
            .iter()
            .all(|(col, filter)| filter.matches(row.get(col)))
    }
}

// ---------------------------------------------------------------------------
// Applying filters and search
// ---------------------------------------------------------------------------

/// Indices of rows that survived filtering, plus counts for display.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOutcome {
    /// Ascending indices into the source dataset.
    pub indices: Vec<usize>,
    /// Row count of the source dataset.
    pub total: usize,
}

impl FilterOutcome {
    /// Every row of `dataset` passes.
    pub fn all(dataset: &Dataset) -> Self {
        FilterOutcome {
            indices: (0..dataset.len()).collect(),
            total: dataset.len(),
        }
    }

    pub fn matched(&self) -> usize {
        self.indices.len()
    }

    /// The surviving rows, in dataset order.
    pub fn rows<'a>(&self, dataset: &'a Dataset) -> Vec<&'a Row> {
        dataset.select(&self.indices)
    }
}

/// Whether any of `columns` in `row` contains `needle` (already lower-cased).
fn row_contains(row: &Row, columns: &[String], needle: &str) -> bool {
    columns
        .iter()
        .any(|col| row.get(col).to_string().to_lowercase().contains(needle))
}

/// Apply `filters` (AND across columns) then `search_text` (case-insensitive
/// substring, OR across `columns`). Order-preserving; the dataset is untouched.
pub fn apply(
    dataset: &Dataset,
    filters: &FilterSpec,
    search_text: &str,
    columns: &[String],
) -> FilterOutcome {
    let needle = search_text.trim().to_lowercase();

    let indices: Vec<usize> = dataset
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| filters.matches(row))
        .filter(|(_, row)| needle.is_empty() || row_contains(row, columns, &needle))
        .map(|(i, _)| i)
        .collect();

    log::debug!(
        "filtered {} of {} rows ({} filters, search {:?})",
        indices.len(),
        dataset.len(),
        filters.len(),
        needle
    );

    FilterOutcome {
        indices,
        total: dataset.len(),
    }
}
