use eframe::egui;
use rusty_charts::config::EngineConfig;
use rusty_charts::state::AppState;

use crate::ui::preview::PreviewState;
use crate::ui::{panels, plot, preview};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct RustyChartsApp {
    pub state: AppState,
    preview: PreviewState,
}

impl RustyChartsApp {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            state: AppState::with_config(config),
            preview: PreviewState::default(),
        }
    }
}

impl eframe::App for RustyChartsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: chart selection, search, filters ----
        egui::SidePanel::left("control_panel")
            .default_width(280.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Right side panel: insights ----
        egui::SidePanel::right("insight_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::insight_panel(ui, &mut self.state);
            });

        // ---- Bottom panel: summary and data preview ----
        egui::TopBottomPanel::bottom("data_panel")
            .resizable(true)
            .default_height(220.0)
            .show(ctx, |ui| {
                preview::data_panel(ui, &self.state, &mut self.preview);
            });

        // ---- Central panel: chart ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::chart_plot(ui, &self.state);
        });
    }
}
