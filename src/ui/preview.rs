use eframe::egui::{self, RichText, ScrollArea, Ui};
use rusty_charts::data::types::numeric_summary;
use rusty_charts::state::AppState;

// ---------------------------------------------------------------------------
// Bottom panel – upload summary and paged preview
// ---------------------------------------------------------------------------

/// Preview paging and column choice; reset whenever a new dataset arrives.
#[derive(Default)]
pub struct PreviewState {
    dataset_id: Option<u64>,
    page: usize,
    columns: Vec<String>,
}

impl PreviewState {
    fn sync(&mut self, state: &AppState) {
        let Some(ds) = state.dataset() else {
            *self = PreviewState::default();
            return;
        };
        if self.dataset_id != Some(ds.id()) {
            self.dataset_id = Some(ds.id());
            self.page = 0;
            self.columns = ds
                .columns()
                .iter()
                .take(state.config.preview_columns)
                .cloned()
                .collect();
        }
    }
}

/// Render row/column counts, per-column numeric stats and the raw data pages.
pub fn data_panel(ui: &mut Ui, state: &AppState, preview: &mut PreviewState) {
    preview.sync(state);
    let Some(ds) = state.dataset() else {
        ui.label("No dataset loaded.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            egui::CollapsingHeader::new("Summary")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    ui.horizontal(|ui: &mut Ui| {
                        ui.strong(ds.len().to_string());
                        ui.label("rows");
                        ui.separator();
                        ui.strong(ds.columns().len().to_string());
                        ui.label("columns");
                    });

                    let stats = numeric_summary(ds.rows(), ds.columns());
                    if stats.is_empty() {
                        return;
                    }
                    egui::Grid::new("numeric_summary")
                        .striped(true)
                        .num_columns(4)
                        .show(ui, |ui: &mut Ui| {
                            ui.strong("Column");
                            ui.strong("Min");
                            ui.strong("Max");
                            ui.strong("Avg");
                            ui.end_row();
                            for (col, s) in &stats {
                                ui.label(col);
                                ui.label(format!("{:.2}", s.min));
                                ui.label(format!("{:.2}", s.max));
                                ui.label(RichText::new(format!("{:.2}", s.mean)).strong());
                                ui.end_row();
                            }
                        });
                });

            egui::CollapsingHeader::new("Preview")
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    column_picker(ui, ds.columns(), &mut preview.columns);

                    let size = state.config.preview_page_size;
                    let pages = ds.page_count(size).max(1);
                    preview.page = preview.page.min(pages - 1);

                    ui.horizontal(|ui: &mut Ui| {
                        if ui.add_enabled(preview.page > 0, egui::Button::new("◀ Prev")).clicked() {
                            preview.page -= 1;
                        }
                        ui.label(format!("Page {} of {}", preview.page + 1, pages));
                        if ui
                            .add_enabled(preview.page + 1 < pages, egui::Button::new("Next ▶"))
                            .clicked()
                        {
                            preview.page += 1;
                        }
                    });

                    // Keep dataset column order whatever order the boxes were ticked in.
                    let shown: Vec<&String> = ds
                        .columns()
                        .iter()
                        .filter(|c| preview.columns.contains(c))
                        .collect();
                    egui::Grid::new("preview_rows")
                        .striped(true)
                        .num_columns(shown.len())
                        .show(ui, |ui: &mut Ui| {
                            for col in &shown {
                                ui.strong(col.as_str());
                            }
                            ui.end_row();
                            for row in ds.page(preview.page, size) {
                                for col in &shown {
                                    ui.label(row.get(col).to_string());
                                }
                                ui.end_row();
                            }
                        });
                });
        });
}

fn column_picker(ui: &mut Ui, all: &[String], selected: &mut Vec<String>) {
    ui.horizontal_wrapped(|ui: &mut Ui| {
        let mut everything = selected.len() == all.len();
        if ui.checkbox(&mut everything, "All").changed() {
            *selected = if everything { all.to_vec() } else { Vec::new() };
        }
        for col in all {
            let mut on = selected.contains(col);
            if ui.checkbox(&mut on, col.as_str()).changed() {
                if on {
                    selected.push(col.clone());
                } else {
                    selected.retain(|c| c != col);
                }
            }
        }
    });
}
