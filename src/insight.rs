//! Data-quality insights: missing values, IQR outliers and recommendations.

use std::borrow::Borrow;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::EngineConfig;
use crate::data::model::{Dataset, Row};
use crate::data::types::{classify_column, ColumnType, ColumnTypeMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub severity: Severity,
    pub message: String,
}

impl Recommendation {
    fn warning(message: String) -> Self {
        Recommendation {
            severity: Severity::Warning,
            message,
        }
    }

    fn info(message: String) -> Self {
        Recommendation {
            severity: Severity::Info,
            message,
        }
    }
}

/// Row/column counts shown beside the insights.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DatasetSummary {
    pub total_rows: usize,
    pub total_columns: usize,
    pub numeric_columns: usize,
    pub categorical_columns: usize,
}

/// Immutable snapshot of the analysis; replaced wholesale on every change.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightReport {
    /// Missing percent (two decimals) for columns with any missing cell.
    pub missing_values: BTreeMap<String, f64>,
    /// Outlier count for numeric columns with at least one outlier.
    pub outliers: BTreeMap<String, usize>,
    pub data_types: ColumnTypeMap,
    pub recommendations: Vec<Recommendation>,
    pub summary: DatasetSummary,
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Count values outside the IQR fences `[q1 - k*iqr, q3 + k*iqr]`, where q1
/// and q3 are the sorted values at `floor(n/4)` and `floor(3n/4)`.
pub fn iqr_outlier_count(values: &[f64], factor: f64) -> usize {
    if values.is_empty() {
        return 0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    let q1 = sorted[(n as f64 * 0.25).floor() as usize];
    let q3 = sorted[(n as f64 * 0.75).floor() as usize];
    let iqr = q3 - q1;
    let lower = q1 - factor * iqr;
    let upper = q3 + factor * iqr;
    sorted.iter().filter(|&&v| v < lower || v > upper).count()
}

/// Analyze `rows` over `columns` with the default thresholds.
pub fn analyze<R: Borrow<Row>>(rows: &[R], columns: &[String]) -> InsightReport {
    analyze_with(rows, columns, &EngineConfig::default())
}

/// Analyze `rows` over `columns`. Never fails; an empty input gives an empty report.
pub fn analyze_with<R: Borrow<Row>>(
    rows: &[R],
    columns: &[String],
    config: &EngineConfig,
) -> InsightReport {
    let mut report = InsightReport::default();
    if rows.is_empty() || columns.is_empty() {
        return report;
    }
    let total = rows.len();

    let mut missing_order = Vec::new();
    let mut outlier_order = Vec::new();

    for col in columns {
        let present = rows
            .iter()
            .filter(|r| !Borrow::<Row>::borrow(*r).get(col).is_missing())
            .count();
        let missing_percent = round2((total - present) as f64 / total as f64 * 100.0);
        if missing_percent > 0.0 {
            report.missing_values.insert(col.clone(), missing_percent);
            missing_order.push((col, missing_percent));
        }

        let kind = classify_column(rows, col, config.numeric_threshold);
        report.data_types.insert(col.clone(), kind);
        if kind == ColumnType::Numeric {
            // statistical context: unparseable cells are excluded, not zeroed
            let values: Vec<f64> = rows
                .iter()
                .filter_map(|r| r.borrow().get(col).as_number())
                .collect();
            let count = iqr_outlier_count(&values, config.iqr_factor);
            if count > 0 {
                report.outliers.insert(col.clone(), count);
                outlier_order.push((col, count));
            }
        }
    }

    for (col, percent) in missing_order {
        if percent > config.missing_warning_percent {
            report.recommendations.push(Recommendation::warning(format!(
                "Column \"{col}\" has {percent:.2}% missing values. Consider data cleaning or imputation."
            )));
        }
    }
    for (col, count) in outlier_order {
        report.recommendations.push(Recommendation::info(format!(
            "Column \"{col}\" has {count} potential outliers detected."
        )));
    }
    if total < config.small_dataset_rows {
        report.recommendations.push(Recommendation::info(
            "Your dataset is relatively small. Consider uploading more data for better analysis."
                .to_string(),
        ));
    }

    let numeric = report
        .data_types
        .values()
        .filter(|t| **t == ColumnType::Numeric)
        .count();
    report.summary = DatasetSummary {
        total_rows: total,
        total_columns: columns.len(),
        numeric_columns: numeric,
        categorical_columns: report.data_types.len() - numeric,
    };

    log::debug!(
        "analyzed {} rows x {} columns: {} recommendations",
        total,
        columns.len(),
        report.recommendations.len()
    );
    report
}

// ---------------------------------------------------------------------------
// Memoization
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
struct CacheKey {
    dataset_id: u64,
    columns: Vec<String>,
    indices: Vec<usize>,
}

/// Reuses the last report while the dataset, column list and visible rows are unchanged.
#[derive(Debug, Default)]
pub struct InsightCache {
    key: Option<CacheKey>,
    report: InsightReport,
}

impl InsightCache {
    pub fn get_or_compute(
        &mut self,
        dataset: &Dataset,
        indices: &[usize],
        columns: &[String],
        config: &EngineConfig,
    ) -> &InsightReport {
        let fresh = self.key.as_ref().is_some_and(|key| {
            key.dataset_id == dataset.id() && key.columns == columns && key.indices == indices
        });
        if !fresh {
            self.report = analyze_with(&dataset.select(indices), columns, config);
            self.key = Some(CacheKey {
                dataset_id: dataset.id(),
                columns: columns.to_vec(),
                indices: indices.to_vec(),
            });
        }
        &self.report
    }

    pub fn invalidate(&mut self) {
        self.key = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;

    fn single_column(values: &[CellValue]) -> Vec<Row> {
        values
            .iter()
            .map(|v| [("c", v.clone())].into_iter().collect())
            .collect()
    }

    #[test]
    fn iqr_finds_the_single_outlier() {
        assert_eq!(iqr_outlier_count(&[1.0, 2.0, 3.0, 4.0, 5.0, 100.0], 1.5), 1);
        assert_eq!(iqr_outlier_count(&[100.0, 5.0, 1.0, 4.0, 3.0, 2.0], 1.5), 1);
        assert_eq!(iqr_outlier_count(&[], 1.5), 0);
        assert_eq!(iqr_outlier_count(&[7.0; 5], 1.5), 0);
    }

    #[test]
    fn missing_percent_rounds_to_two_decimals() {
        let mut values: Vec<CellValue> = (0..7).map(|i| CellValue::number(f64::from(i))).collect();
        values.extend([CellValue::Missing, CellValue::Missing, CellValue::Missing]);
        let report = analyze(&single_column(&values), &["c".to_string()]);
        assert_eq!(report.missing_values["c"], 30.0);

        let third = [CellValue::Missing, "a".into(), "b".into()];
        let report = analyze(&single_column(&third), &["c".to_string()]);
        assert_eq!(report.missing_values["c"], 33.33);
    }

    #[test]
    fn recommendations_are_ordered() {
        let mut rows = Vec::new();
        for i in 0..20 {
            let mut row = Row::new();
            row.insert("gaps", if i < 5 { "" } else { "x" });
            row.insert("spiky", CellValue::number(if i == 0 { 1000.0 } else { f64::from(i) }));
            row.insert("name", "n");
            rows.push(row);
        }
        let columns: Vec<String> = ["name", "gaps", "spiky"].map(String::from).to_vec();
        let report = analyze(&rows, &columns);

        assert_eq!(report.missing_values.len(), 1);
        assert_eq!(report.outliers["spiky"], 1);
        assert_eq!(report.data_types["gaps"], ColumnType::Categorical);
        assert_eq!(report.data_types["spiky"], ColumnType::Numeric);

        let severities: Vec<Severity> = report.recommendations.iter().map(|r| r.severity).collect();
        assert_eq!(severities, [Severity::Warning, Severity::Info, Severity::Info]);
        assert_eq!(
            report.recommendations[0].message,
            "Column \"gaps\" has 25.00% missing values. Consider data cleaning or imputation."
        );
        assert_eq!(
            report.recommendations[1].message,
            "Column \"spiky\" has 1 potential outliers detected."
        );
        assert!(report.recommendations[2].message.contains("relatively small"));

        assert_eq!(
            report.summary,
            DatasetSummary {
                total_rows: 20,
                total_columns: 3,
                numeric_columns: 1,
                categorical_columns: 2,
            }
        );
    }

    #[test]
    fn ten_percent_missing_is_not_a_warning() {
        let mut values: Vec<CellValue> = (0..9).map(|_| "v".into()).collect();
        values.push(CellValue::Missing);
        let report = analyze(&single_column(&values), &["c".to_string()]);
        assert_eq!(report.missing_values["c"], 10.0);
        assert!(report
            .recommendations
            .iter()
            .all(|r| r.severity == Severity::Info));
    }

    #[test]
    fn large_dataset_has_no_size_note() {
        let values: Vec<CellValue> = (0..150).map(|i| CellValue::number(f64::from(i))).collect();
        let report = analyze(&single_column(&values), &["c".to_string()]);
        assert!(report.recommendations.is_empty());
        assert!(report.missing_values.is_empty());
        assert!(report.outliers.is_empty());
    }

    #[test]
    fn outliers_ignore_unparseable_cells() {
        // "x" is excluded rather than counted as 0, so 0 is not a low outlier
        let mut values: Vec<CellValue> = (10..20).map(|i| CellValue::number(f64::from(i))).collect();
        values.push("x".into());
        let report = analyze(&single_column(&values), &["c".to_string()]);
        assert_eq!(report.data_types["c"], ColumnType::Numeric);
        assert!(report.outliers.is_empty());
    }

    #[test]
    fn empty_input_gives_empty_report() {
        let rows: Vec<Row> = Vec::new();
        assert_eq!(analyze(&rows, &["a".to_string()]), InsightReport::default());
    }

    #[test]
    fn cache_recomputes_only_on_change() {
        let ds = Dataset::new(vec!["c".into()], single_column(&["1".into(), "".into()]));
        let config = EngineConfig::default();
        let mut cache = InsightCache::default();

        let first = cache.get_or_compute(&ds, &[0, 1], ds.columns(), &config).clone();
        assert_eq!(first.missing_values["c"], 50.0);

        let narrowed = cache.get_or_compute(&ds, &[0], ds.columns(), &config).clone();
        assert!(narrowed.missing_values.is_empty());

        let again = cache.get_or_compute(&ds, &[0], ds.columns(), &config);
        assert_eq!(*again, narrowed);
    }
}
