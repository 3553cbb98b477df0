//! Chart data shaping.
//!
//! Turns the filtered rows plus a [`ChartSelection`] into a renderer-agnostic
//! [`ChartData`]: grouping and summing for pie and categorical bar charts,
//! index-stride thinning for line and numeric bar charts, and colour
//! assignment from the fixed palette.
//!
//! Where a value must be aggregated, text that is not a number counts as `0`
//! (and is tallied in [`ChartData::defaulted_values`]). This differs from the
//! insight statistics, which drop such cells.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::{self, ChartColor};
use crate::config::EngineConfig;
use crate::data::model::{CellValue, Row};
use crate::data::types::{columns_of_type, ColumnType, ColumnTypeMap};

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    Bar,
    Line,
    Pie,
    Scatter,
}

impl ChartType {
    pub const ALL: [ChartType; 4] = [
        ChartType::Bar,
        ChartType::Line,
        ChartType::Pie,
        ChartType::Scatter,
    ];
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChartType::Bar => "Bar",
            ChartType::Line => "Line",
            ChartType::Pie => "Pie",
            ChartType::Scatter => "Scatter",
        })
    }
}

/// The user's chart type and column choice.
///
/// Pie charts read `category_col` / `value_col`; the other types read
/// `x_axis` / `y_axis`. The two pairs are kept apart so moving through a pie
/// chart and back leaves the axes as they were.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSelection {
    pub chart_type: ChartType,
    pub x_axis: Option<String>,
    pub y_axis: Option<String>,
    pub category_col: Option<String>,
    pub value_col: Option<String>,
}

impl ChartSelection {
    /// A selection with the pair `chart_type` reads set to `first` / `second`.
    pub fn new(chart_type: ChartType, first: &str, second: &str) -> Self {
        let (first, second) = (Some(first.to_string()), Some(second.to_string()));
        match chart_type {
            ChartType::Pie => ChartSelection {
                chart_type,
                category_col: first,
                value_col: second,
                ..Default::default()
            },
            _ => ChartSelection {
                chart_type,
                x_axis: first,
                y_axis: second,
                ..Default::default()
            },
        }
    }

    /// Switch to `chart_type`. Pie re-seeds its pair with the first categorical
    /// and first numeric column, scatter re-seeds the axes with the first two
    /// numeric columns; bar and line keep the current axes.
    pub fn switch_to(&mut self, chart_type: ChartType, types: &ColumnTypeMap, columns: &[String]) {
        let numeric = columns_of_type(columns, types, ColumnType::Numeric);
        let categorical = columns_of_type(columns, types, ColumnType::Categorical);
        match chart_type {
            ChartType::Pie => {
                self.category_col = categorical.first().cloned();
                self.value_col = numeric.first().cloned();
            }
            ChartType::Scatter => {
                self.x_axis = numeric.first().cloned();
                self.y_axis = numeric.get(1).or(numeric.first()).cloned();
            }
            ChartType::Bar | ChartType::Line => {}
        }
        self.chart_type = chart_type;
    }

    /// The two columns the current chart type is built from.
    pub fn active_columns(&self) -> (Option<&str>, Option<&str>) {
        match self.chart_type {
            ChartType::Pie => (non_empty(&self.category_col), non_empty(&self.value_col)),
            _ => (non_empty(&self.x_axis), non_empty(&self.y_axis)),
        }
    }
}

fn non_empty(col: &Option<String>) -> Option<&str> {
    col.as_deref().filter(|c| !c.is_empty())
}

/// Chart types that suit the column types of the chosen axes.
pub fn suggest_chart_types(types: &ColumnTypeMap, x: Option<&str>, y: Option<&str>) -> Vec<ChartType> {
    let (Some(x), Some(y)) = (x.filter(|c| !c.is_empty()), y.filter(|c| !c.is_empty())) else {
        return vec![ChartType::Bar, ChartType::Line];
    };
    use ColumnType::{Categorical, Numeric};
    match (types.get(x), types.get(y)) {
        (Some(Numeric), Some(Numeric)) => vec![ChartType::Scatter, ChartType::Line, ChartType::Bar],
        (Some(Categorical), Some(Numeric)) | (Some(Numeric), Some(Categorical)) => {
            vec![ChartType::Bar, ChartType::Line, ChartType::Pie]
        }
        _ => vec![ChartType::Bar, ChartType::Line],
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChartLabel {
    Text(String),
    /// Row position; scatter charts use it as identity only.
    Index(usize),
}

impl fmt::Display for ChartLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartLabel::Text(s) => f.write_str(s),
            ChartLabel::Index(i) => write!(f, "{i}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChartValue {
    Number(f64),
    Point { x: f64, y: f64 },
}

impl ChartValue {
    /// The plotted magnitude: the number itself, or a point's `y`.
    pub fn y(&self) -> f64 {
        match *self {
            ChartValue::Number(v) => v,
            ChartValue::Point { y, .. } => y,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDataset {
    pub label: String,
    pub values: Vec<ChartValue>,
    pub colors: Vec<ChartColor>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub border_colors: Vec<ChartColor>,
}

/// Renderer-agnostic chart content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub chart_type: ChartType,
    pub labels: Vec<ChartLabel>,
    pub datasets: Vec<ChartDataset>,
    /// Cells that were not numbers and were counted as `0`.
    #[serde(skip)]
    pub defaulted_values: usize,
}

impl ChartData {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartErrorKind {
    /// A required axis, category or value column is not chosen.
    MissingSelection,
    /// A pie chart would show more slices than allowed.
    TooManyCategories,
}

/// A recoverable, user-facing reason the chart cannot be drawn.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ChartError {
    pub kind: ChartErrorKind,
    pub message: String,
}

impl ChartError {
    fn missing_axes() -> Self {
        ChartError {
            kind: ChartErrorKind::MissingSelection,
            message: "Please select both X-Axis and Y-Axis".to_string(),
        }
    }

    fn missing_pie_columns() -> Self {
        ChartError {
            kind: ChartErrorKind::MissingSelection,
            message: "Please select both Category and Values".to_string(),
        }
    }

    fn too_many_categories(max: usize) -> Self {
        ChartError {
            kind: ChartErrorKind::TooManyCategories,
            message: format!(
                "Pie chart works best with {max} or fewer categories. Consider using a Bar chart instead."
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Shaping helpers
// ---------------------------------------------------------------------------

/// Aggregation-context number: text that is not a number counts as `0`.
fn sum_safe(cell: &CellValue, defaulted: &mut usize) -> f64 {
    match cell.as_number() {
        Some(v) => v,
        None => {
            *defaulted += 1;
            0.0
        }
    }
}

fn category_label(cell: &CellValue) -> String {
    match cell.to_string() {
        s if s.is_empty() => "Unknown".to_string(),
        s => s,
    }
}

/// Stride that keeps at most `max_points` of `count` items.
pub fn stride(count: usize, max_points: usize) -> usize {
    count.div_ceil(max_points.max(1)).max(1)
}

/// Sum `value_col` per distinct `category_col`, groups in first-seen order.
fn group_sum<R: Borrow<Row>>(
    rows: &[R],
    category_col: &str,
    value_col: &str,
    defaulted: &mut usize,
) -> (Vec<String>, Vec<f64>) {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut labels = Vec::new();
    let mut sums = Vec::new();
    for row in rows {
        let row = row.borrow();
        let key = category_label(row.get(category_col));
        let value = sum_safe(row.get(value_col), defaulted);
        match positions.get(&key) {
            Some(&i) => sums[i] += value,
            None => {
                positions.insert(key.clone(), labels.len());
                labels.push(key);
                sums.push(value);
            }
        }
    }
    (labels, sums)
}

/// Every `step`-th row's x label and y value, by row position.
fn strided<R: Borrow<Row>>(
    rows: &[R],
    x_col: &str,
    y_col: &str,
    max_points: usize,
    defaulted: &mut usize,
) -> (Vec<String>, Vec<f64>) {
    let step = stride(rows.len(), max_points);
    rows.iter()
        .step_by(step)
        .map(|row| {
            let row = row.borrow();
            (category_label(row.get(x_col)), sum_safe(row.get(y_col), defaulted))
        })
        .unzip()
}

fn text_labels(labels: Vec<String>) -> Vec<ChartLabel> {
    labels.into_iter().map(ChartLabel::Text).collect()
}

fn numbers(values: Vec<f64>) -> Vec<ChartValue> {
    values.into_iter().map(ChartValue::Number).collect()
}

fn cyclic_colors(n: usize) -> Vec<ChartColor> {
    (0..n).map(color::cyclic).collect()
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Build chart data with the default limits.
pub fn build<R: Borrow<Row>>(
    rows: &[R],
    types: &ColumnTypeMap,
    selection: &ChartSelection,
) -> Result<ChartData, ChartError> {
    build_with(rows, types, selection, &EngineConfig::default())
}

/// Build chart data for `selection` from the filtered `rows`.
///
/// Fails without partial output when a required column is unset or a pie
/// chart has too many slices.
pub fn build_with<R: Borrow<Row>>(
    rows: &[R],
    types: &ColumnTypeMap,
    selection: &ChartSelection,
    config: &EngineConfig,
) -> Result<ChartData, ChartError> {
    let chart_type = selection.chart_type;
    let (Some(x), Some(y)) = selection.active_columns() else {
        return Err(match chart_type {
            ChartType::Pie => ChartError::missing_pie_columns(),
            _ => ChartError::missing_axes(),
        });
    };

    let mut defaulted = 0;
    let data = match chart_type {
        ChartType::Pie => pie(rows, x, y, config, &mut defaulted)?,
        ChartType::Scatter => scatter(rows, x, y, &mut defaulted),
        ChartType::Line => line(rows, x, y, config, &mut defaulted),
        ChartType::Bar => bar(rows, types, x, y, config, &mut defaulted),
    };

    if defaulted > 0 {
        log::debug!("{chart_type} chart: {defaulted} non-numeric values counted as 0");
    }
    Ok(ChartData {
        chart_type,
        defaulted_values: defaulted,
        ..data
    })
}

fn pie<R: Borrow<Row>>(
    rows: &[R],
    category_col: &str,
    value_col: &str,
    config: &EngineConfig,
    defaulted: &mut usize,
) -> Result<ChartData, ChartError> {
    let (labels, sums) = group_sum(rows, category_col, value_col, defaulted);
    if labels.len() > config.max_pie_slices {
        log::warn!(
            "pie chart on {category_col:?} has {} categories (max {})",
            labels.len(),
            config.max_pie_slices
        );
        return Err(ChartError::too_many_categories(config.max_pie_slices));
    }
    Ok(ChartData {
        chart_type: ChartType::Pie,
        datasets: vec![ChartDataset {
            label: value_col.to_string(),
            colors: cyclic_colors(labels.len()),
            values: numbers(sums),
            border_colors: Vec::new(),
        }],
        labels: text_labels(labels),
        defaulted_values: 0,
    })
}

fn scatter<R: Borrow<Row>>(rows: &[R], x_col: &str, y_col: &str, defaulted: &mut usize) -> ChartData {
    let points: Vec<(f64, f64)> = rows
        .iter()
        .map(|row| {
            let row = row.borrow();
            (sum_safe(row.get(x_col), defaulted), sum_safe(row.get(y_col), defaulted))
        })
        .collect();

    let (min_y, max_y) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, y)| (lo.min(y), hi.max(y)));
    let colors: Vec<ChartColor> = points
        .iter()
        .map(|&(_, y)| color::gradient(y, min_y, max_y))
        .collect();

    ChartData {
        chart_type: ChartType::Scatter,
        labels: (0..points.len()).map(ChartLabel::Index).collect(),
        datasets: vec![ChartDataset {
            label: format!("{x_col} vs {y_col}"),
            values: points
                .into_iter()
                .map(|(x, y)| ChartValue::Point { x, y })
                .collect(),
            border_colors: colors.iter().map(|c| c.without_alpha()).collect(),
            colors,
        }],
        defaulted_values: 0,
    }
}

fn line<R: Borrow<Row>>(
    rows: &[R],
    x_col: &str,
    y_col: &str,
    config: &EngineConfig,
    defaulted: &mut usize,
) -> ChartData {
    let (labels, values) = strided(rows, x_col, y_col, config.max_points, defaulted);
    ChartData {
        chart_type: ChartType::Line,
        labels: text_labels(labels),
        datasets: vec![ChartDataset {
            label: y_col.to_string(),
            values: numbers(values),
            colors: vec![color::cyclic(0)],
            border_colors: Vec::new(),
        }],
        defaulted_values: 0,
    }
}

fn bar<R: Borrow<Row>>(
    rows: &[R],
    types: &ColumnTypeMap,
    x_col: &str,
    y_col: &str,
    config: &EngineConfig,
    defaulted: &mut usize,
) -> ChartData {
    let (labels, values) = match types.get(x_col) {
        Some(ColumnType::Categorical) => group_sum(rows, x_col, y_col, defaulted),
        _ => strided(rows, x_col, y_col, config.max_points, defaulted),
    };
    ChartData {
        chart_type: ChartType::Bar,
        datasets: vec![ChartDataset {
            label: y_col.to_string(),
            colors: cyclic_colors(values.len()),
            values: numbers(values),
            border_colors: Vec::new(),
        }],
        labels: text_labels(labels),
        defaulted_values: 0,
    }
}
