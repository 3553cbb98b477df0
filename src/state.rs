use std::path::Path;

use anyhow::{Context, Result};

use crate::chart::{build_with, suggest_chart_types, ChartData, ChartError, ChartSelection, ChartType};
use crate::config::EngineConfig;
use crate::data::export;
use crate::data::filter::{apply, ColumnFilter, FilterOutcome, FilterSpec};
use crate::data::model::{Dataset, Row};
use crate::data::types::{infer_column_types_with, ColumnTypeMap};
use crate::insight::{InsightCache, InsightReport};

// ---------------------------------------------------------------------------
// Dirty tracking
// ---------------------------------------------------------------------------

/// Which derived values are stale. Each flag implies the ones after it.
#[derive(Debug, Clone, Copy, Default)]
struct Dirty {
    types: bool,
    filtered: bool,
    chart: bool,
}

impl Dirty {
    fn all() -> Self {
        Dirty {
            types: true,
            filtered: true,
            chart: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The explorer state, independent of rendering.
///
/// Inputs (dataset, filters, search text, chart selection) change only through
/// the setters below; every derived value (column types, filtered rows,
/// insights, chart) is recomputed from scratch and replaced wholesale.
#[derive(Debug, Default)]
pub struct AppState {
    pub config: EngineConfig,

    dataset: Option<Dataset>,
    filters: FilterSpec,
    search_text: String,
    selection: ChartSelection,

    column_types: ColumnTypeMap,
    filtered: FilterOutcome,
    insights: InsightCache,
    chart: Option<Result<ChartData, ChartError>>,
    dirty: Dirty,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn with_config(config: EngineConfig) -> Self {
        AppState {
            config,
            ..Default::default()
        }
    }

    // -- inputs -------------------------------------------------------------

    /// Ingest a newly loaded dataset. Filters, search and axes are reset.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        log::info!(
            "dataset loaded: {} rows, columns {:?}",
            dataset.len(),
            dataset.columns()
        );
        self.dataset = Some(dataset);
        self.filters.clear();
        self.search_text.clear();
        self.selection = ChartSelection {
            chart_type: self.selection.chart_type,
            ..Default::default()
        };
        self.insights.invalidate();
        self.status_message = None;
        self.dirty = Dirty::all();
        self.refresh();
    }

    /// Add the default filter for `column` (see [`FilterSpec::add_default`]).
    pub fn add_filter(&mut self, column: &str) {
        if let Some(ds) = &self.dataset {
            self.filters.add_default(ds, &self.column_types, column);
            self.mark_filtered();
        }
    }

    pub fn set_filter(&mut self, column: &str, filter: ColumnFilter) {
        if self.filters.get(column) != Some(&filter) {
            self.filters.set(column, filter);
            self.mark_filtered();
        }
    }

    pub fn remove_filter(&mut self, column: &str) {
        if self.filters.remove(column).is_some() {
            self.mark_filtered();
        }
    }

    pub fn set_search_text(&mut self, text: &str) {
        if self.search_text != text {
            self.search_text = text.to_string();
            self.mark_filtered();
        }
    }

    /// Switch chart type. Pie and scatter re-seed their columns; bar and
    /// line keep the axes already chosen.
    pub fn set_chart_type(&mut self, chart_type: ChartType) {
        let columns = self.columns().to_vec();
        self.selection.switch_to(chart_type, &self.column_types, &columns);
        self.mark_chart();
    }

    pub fn set_x_axis(&mut self, column: Option<String>) {
        self.selection.x_axis = column;
        self.mark_chart();
    }

    pub fn set_y_axis(&mut self, column: Option<String>) {
        self.selection.y_axis = column;
        self.mark_chart();
    }

    pub fn set_category_col(&mut self, column: Option<String>) {
        self.selection.category_col = column;
        self.mark_chart();
    }

    pub fn set_value_col(&mut self, column: Option<String>) {
        self.selection.value_col = column;
        self.mark_chart();
    }

    fn mark_filtered(&mut self) {
        self.dirty.filtered = true;
        self.mark_chart();
    }

    fn mark_chart(&mut self) {
        self.dirty.chart = true;
        self.refresh();
    }

    // -- recomputation --------------------------------------------------------

    /// Recompute stale derived values in dependency order.
    pub fn refresh(&mut self) {
        let Some(ds) = &self.dataset else {
            return;
        };
        if self.dirty.types {
            self.column_types = infer_column_types_with(ds.rows(), ds.columns(), &self.config);
            self.dirty.types = false;
        }
        if self.dirty.filtered {
            self.filtered = apply(ds, &self.filters, &self.search_text, ds.columns());
            self.dirty.filtered = false;
        }
        if self.dirty.chart {
            let rows = self.filtered.rows(ds);
            let result = build_with(&rows, &self.column_types, &self.selection, &self.config);
            if let Err(e) = &result {
                log::warn!("chart not built: {e}");
            }
            self.chart = Some(result);
            self.dirty.chart = false;
        }
    }

    // -- outputs ------------------------------------------------------------

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn columns(&self) -> &[String] {
        self.dataset.as_ref().map(Dataset::columns).unwrap_or_default()
    }

    pub fn column_types(&self) -> &ColumnTypeMap {
        &self.column_types
    }

    pub fn filters(&self) -> &FilterSpec {
        &self.filters
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn selection(&self) -> &ChartSelection {
        &self.selection
    }

    pub fn filtered(&self) -> &FilterOutcome {
        &self.filtered
    }

    /// Rows passing the current filters and search.
    pub fn filtered_rows(&self) -> Vec<&Row> {
        match &self.dataset {
            Some(ds) => self.filtered.rows(ds),
            None => Vec::new(),
        }
    }

    /// `None` until a dataset is loaded.
    pub fn chart(&self) -> Option<&Result<ChartData, ChartError>> {
        self.chart.as_ref()
    }

    /// Chart types suited to the columns currently charted.
    pub fn suggested_chart_types(&self) -> Vec<ChartType> {
        let (x, y) = self.selection.active_columns();
        suggest_chart_types(&self.column_types, x, y)
    }

    /// Insights over the filtered rows, memoized on the visible row set.
    pub fn insights(&mut self) -> Option<&InsightReport> {
        let ds = self.dataset.as_ref()?;
        Some(self.insights.get_or_compute(
            ds,
            &self.filtered.indices,
            ds.columns(),
            &self.config,
        ))
    }

    // -- export -------------------------------------------------------------

    pub fn export_csv(&self, path: &Path) -> Result<()> {
        let ds = self.dataset.as_ref().context("no dataset loaded")?;
        export::write_csv(path, &self.filtered_rows(), ds.columns())
    }

    pub fn export_json(&self, path: &Path) -> Result<()> {
        let ds = self.dataset.as_ref().context("no dataset loaded")?;
        export::write_json(path, &self.filtered_rows(), ds.columns())
    }
}
