use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Tunables shared by the type inferencer, filters, insights and chart builder.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Share of parseable values above which a column is numeric.
    pub numeric_threshold: f64,
    /// Maximum slices a pie chart may show.
    pub max_pie_slices: usize,
    /// Upper bound on points for line charts and numeric-axis bar charts.
    pub max_points: usize,
    /// Missing percent above which a cleaning warning is emitted.
    pub missing_warning_percent: f64,
    /// Row count below which the dataset is flagged as small.
    pub small_dataset_rows: usize,
    /// IQR multiplier for outlier fences.
    pub iqr_factor: f64,
    /// How many distinct values the exact-match picker offers.
    pub unique_value_limit: usize,
    /// Rows per page of the data preview.
    pub preview_page_size: usize,
    /// Columns shown in the preview before the user picks others.
    pub preview_columns: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            numeric_threshold: 0.8,
            max_pie_slices: 5,
            max_points: 20,
            missing_warning_percent: 10.0,
            small_dataset_rows: 100,
            iqr_factor: 1.5,
            unique_value_limit: 20,
            preview_page_size: 10,
            preview_columns: 5,
        }
    }
}

impl EngineConfig {
    /// Load a (possibly partial) JSON config; absent keys keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).context("parsing config JSON")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "max_pie_slices": 8, "iqr_factor": 3.0 }}"#).unwrap();

        let config = EngineConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.max_pie_slices, 8);
        assert_eq!(config.iqr_factor, 3.0);
        assert_eq!(config.max_points, 20);
        assert_eq!(config.numeric_threshold, 0.8);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = EngineConfig::from_json_file(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("parsing config JSON"));
    }
}
