use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use rusty_charts::chart::ChartType;
use rusty_charts::data::filter::ColumnFilter;
use rusty_charts::data::loader;
use rusty_charts::data::types::{column_stats, columns_of_type, ColumnType};
use rusty_charts::insight::Severity;
use rusty_charts::state::AppState;

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            ui.separator();
            let has_data = state.dataset().is_some();
            if ui.add_enabled(has_data, egui::Button::new("Export CSV…")).clicked() {
                export_dialog(state, ExportFormat::Csv);
                ui.close_menu();
            }
            if ui.add_enabled(has_data, egui::Button::new("Export JSON…")).clicked() {
                export_dialog(state, ExportFormat::Json);
                ui.close_menu();
            }
        });

        ui.separator();

        if state.dataset().is_some() {
            let filtered = state.filtered();
            ui.label(format!(
                "{} / {} rows, {} columns",
                filtered.matched(),
                filtered.total,
                state.columns().len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Left side panel – chart selection, search and filters
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    if state.dataset().is_none() {
        ui.heading("Chart");
        ui.separator();
        ui.label("No dataset loaded.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            chart_controls(ui, state);
            ui.add_space(8.0);
            filter_controls(ui, state);
        });
}

fn chart_controls(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Chart");
    ui.separator();

    let current = state.selection().chart_type;
    egui::ComboBox::from_id_salt("chart_type")
        .selected_text(current.to_string())
        .show_ui(ui, |ui: &mut Ui| {
            for chart_type in ChartType::ALL {
                if ui
                    .selectable_label(current == chart_type, chart_type.to_string())
                    .clicked()
                    && current != chart_type
                {
                    state.set_chart_type(chart_type);
                }
            }
        });
    let suggested: Vec<String> = state
        .suggested_chart_types()
        .iter()
        .map(ToString::to_string)
        .collect();
    ui.small(format!("Suggested: {}", suggested.join(", ")));
    ui.add_space(4.0);

    let columns = state.columns().to_vec();
    let types = state.column_types().clone();
    let numeric = columns_of_type(&columns, &types, ColumnType::Numeric);
    let categorical = columns_of_type(&columns, &types, ColumnType::Categorical);
    let tagged = |c: &String| -> String {
        match types.get(c) {
            Some(ColumnType::Numeric) => format!("{c} (Num)"),
            _ => format!("{c} (Cat)"),
        }
    };

    let selection = state.selection().clone();
    match selection.chart_type {
        ChartType::Pie => {
            let (cat, val) = selection.active_columns();
            if let Some(c) = axis_combo(ui, "category_col", "Category", cat, &categorical, &tagged) {
                state.set_category_col(c);
            }
            if let Some(v) = axis_combo(ui, "value_col", "Values", val, &numeric, &tagged) {
                state.set_value_col(v);
            }
        }
        ChartType::Scatter | ChartType::Bar | ChartType::Line => {
            let x_options = if selection.chart_type == ChartType::Scatter { &numeric } else { &columns };
            let (x, y) = selection.active_columns();
            if let Some(x) = axis_combo(ui, "x_axis", "X-Axis", x, x_options, &tagged) {
                state.set_x_axis(x);
            }
            if let Some(y) = axis_combo(ui, "y_axis", "Y-Axis", y, &numeric, &tagged) {
                state.set_y_axis(y);
            }
        }
    }
}

/// A column picker with an empty "none" entry. Returns the new choice when changed.
fn axis_combo(
    ui: &mut Ui,
    id: &str,
    label: &str,
    current: Option<&str>,
    options: &[String],
    display: &dyn Fn(&String) -> String,
) -> Option<Option<String>> {
    let mut changed = None;
    ui.strong(label);
    egui::ComboBox::from_id_salt(id)
        .selected_text(current.unwrap_or("Select column…"))
        .show_ui(ui, |ui: &mut Ui| {
            if ui.selectable_label(current.is_none(), "(none)").clicked() && current.is_some() {
                changed = Some(None);
            }
            for col in options {
                let selected = current == Some(col.as_str());
                if ui.selectable_label(selected, display(col)).clicked() && !selected {
                    changed = Some(Some(col.clone()));
                }
            }
        });
    changed
}

enum FilterEdit {
    Add(String),
    Set(String, ColumnFilter),
    Remove(String),
}

fn filter_controls(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters & Search");
    ui.separator();

    let mut search = state.search_text().to_string();
    if ui
        .add(egui::TextEdit::singleline(&mut search).hint_text("Search across all columns…"))
        .changed()
    {
        state.set_search_text(&search);
    }
    ui.label(format!(
        "{} / {} rows",
        state.filtered().matched(),
        state.filtered().total
    ));
    ui.add_space(4.0);

    let Some(dataset) = state.dataset() else {
        return;
    };
    let limit = state.config.unique_value_limit;
    let mut edits = Vec::new();

    for (col, filter) in state.filters().iter() {
        egui::CollapsingHeader::new(RichText::new(col).strong())
            .id_salt(col)
            .default_open(true)
            .show(ui, |ui: &mut Ui| {
                if ui.small_button("Remove").clicked() {
                    edits.push(FilterEdit::Remove(col.clone()));
                }
                match filter {
                    ColumnFilter::Range { min, max } => {
                        let (mut lo, mut hi) = (*min, *max);
                        ui.horizontal(|ui: &mut Ui| {
                            let a = ui.add(egui::DragValue::new(&mut lo).speed(0.1).prefix("min "));
                            let b = ui.add(egui::DragValue::new(&mut hi).speed(0.1).prefix("max "));
                            if a.changed() || b.changed() {
                                edits.push(FilterEdit::Set(
                                    col.clone(),
                                    ColumnFilter::Range { min: lo, max: hi },
                                ));
                            }
                        });
                        if let Some(stats) = column_stats(dataset.rows(), col) {
                            ui.small(format!("Range: {:.2} - {:.2}", stats.min, stats.max));
                        }
                    }
                    ColumnFilter::Exact { value } => {
                        ui.horizontal(|ui: &mut Ui| {
                            ui.label("equals");
                            if ui.small_button("contains…").clicked() {
                                edits.push(FilterEdit::Set(
                                    col.clone(),
                                    ColumnFilter::Contains { value: value.clone() },
                                ));
                            }
                        });
                        let shown = if value.is_empty() { "Select value…" } else { value.as_str() };
                        egui::ComboBox::from_id_salt(("exact", col))
                            .selected_text(shown)
                            .show_ui(ui, |ui: &mut Ui| {
                                if ui.selectable_label(value.is_empty(), "(any)").clicked() {
                                    edits.push(FilterEdit::Set(
                                        col.clone(),
                                        ColumnFilter::Exact { value: String::new() },
                                    ));
                                }
                                for candidate in dataset.unique_values(col, limit) {
                                    if ui.selectable_label(*value == candidate, &candidate).clicked() {
                                        edits.push(FilterEdit::Set(
                                            col.clone(),
                                            ColumnFilter::Exact { value: candidate },
                                        ));
                                    }
                                }
                            });
                    }
                    ColumnFilter::Contains { value } => {
                        ui.horizontal(|ui: &mut Ui| {
                            ui.label("contains");
                            if ui.small_button("equals…").clicked() {
                                edits.push(FilterEdit::Set(
                                    col.clone(),
                                    ColumnFilter::Exact { value: String::new() },
                                ));
                            }
                        });
                        let mut text = value.clone();
                        if ui.text_edit_singleline(&mut text).changed() {
                            edits.push(FilterEdit::Set(col.clone(), ColumnFilter::Contains { value: text }));
                        }
                    }
                }
            });
    }

    let unfiltered: Vec<&String> = dataset
        .columns()
        .iter()
        .filter(|c| state.filters().get(c).is_none())
        .collect();
    if !unfiltered.is_empty() {
        ui.add_space(4.0);
        egui::ComboBox::from_id_salt("add_filter")
            .selected_text("Add filter…")
            .show_ui(ui, |ui: &mut Ui| {
                for col in unfiltered {
                    if ui.selectable_label(false, col).clicked() {
                        edits.push(FilterEdit::Add(col.clone()));
                    }
                }
            });
    }

    for edit in edits {
        match edit {
            FilterEdit::Add(col) => state.add_filter(&col),
            FilterEdit::Set(col, filter) => state.set_filter(&col, filter),
            FilterEdit::Remove(col) => state.remove_filter(&col),
        }
    }
}

// ---------------------------------------------------------------------------
// Right side panel – insights
// ---------------------------------------------------------------------------

/// Render data-quality insights for the visible rows.
pub fn insight_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Insights");
    ui.separator();

    let Some(report) = state.insights() else {
        ui.label("No dataset loaded.");
        return;
    };
    if report.summary.total_rows == 0 {
        ui.label("No rows match the current filters.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            let summary = report.summary;
            egui::Grid::new("summary").striped(true).show(ui, |ui: &mut Ui| {
                ui.label("Total records");
                ui.strong(summary.total_rows.to_string());
                ui.end_row();
                ui.label("Total columns");
                ui.strong(summary.total_columns.to_string());
                ui.end_row();
                ui.label("Numeric columns");
                ui.strong(summary.numeric_columns.to_string());
                ui.end_row();
                ui.label("Categorical columns");
                ui.strong(summary.categorical_columns.to_string());
                ui.end_row();
            });

            if !report.missing_values.is_empty() {
                ui.add_space(6.0);
                ui.strong("Missing values");
                for (col, percent) in &report.missing_values {
                    ui.label(format!("{col}: {percent:.2}%"));
                }
            }

            if !report.outliers.is_empty() {
                ui.add_space(6.0);
                ui.strong("Outliers");
                for (col, count) in &report.outliers {
                    ui.label(format!("{col}: {count} outliers"));
                }
            }

            ui.add_space(6.0);
            ui.strong("Column types");
            for (col, kind) in &report.data_types {
                let kind = match kind {
                    ColumnType::Numeric => "Numeric",
                    ColumnType::Categorical => "Categorical",
                };
                ui.label(format!("{col}: {kind}"));
            }

            if !report.recommendations.is_empty() {
                ui.add_space(6.0);
                ui.strong("Recommendations");
                for rec in &report.recommendations {
                    let color = match rec.severity {
                        Severity::Warning => Color32::from_rgb(0xd9, 0x8c, 0x00),
                        Severity::Info => Color32::from_rgb(0x3b, 0x82, 0xc4),
                    };
                    ui.label(RichText::new(&rec.message).color(color));
                }
            }
        });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open tabular data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        match loader::load_file(&path) {
            Ok(dataset) => state.set_dataset(dataset),
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

#[derive(Clone, Copy)]
enum ExportFormat {
    Csv,
    Json,
}

fn export_dialog(state: &mut AppState, format: ExportFormat) {
    let (name, ext) = match format {
        ExportFormat::Csv => ("data.csv", "csv"),
        ExportFormat::Json => ("data.json", "json"),
    };
    let Some(path) = rfd::FileDialog::new()
        .set_title("Export filtered rows")
        .set_file_name(name)
        .add_filter(ext.to_uppercase(), &[ext])
        .save_file()
    else {
        return;
    };

    let result = match format {
        ExportFormat::Csv => state.export_csv(&path),
        ExportFormat::Json => state.export_json(&path),
    };
    state.status_message = match result {
        Ok(()) => None,
        Err(e) => {
            log::error!("Export failed: {e:#}");
            Some(format!("Export failed: {e:#}"))
        }
    };
}
