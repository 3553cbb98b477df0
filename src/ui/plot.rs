use std::f64::consts::TAU;

use eframe::egui::{Color32, RichText, Stroke, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, PlotUi, Points, Polygon};
use rusty_charts::chart::{ChartData, ChartType, ChartValue};
use rusty_charts::color::ChartColor;
use rusty_charts::state::AppState;

// ---------------------------------------------------------------------------
// Chart plot (central panel)
// ---------------------------------------------------------------------------

fn to_color32(c: ChartColor) -> Color32 {
    Color32::from_rgba_unmultiplied(c.red, c.green, c.blue, c.alpha)
}

fn centered_message(ui: &mut Ui, text: RichText) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.label(text);
    });
}

/// Render the current chart, or the reason it cannot be drawn.
pub fn chart_plot(ui: &mut Ui, state: &AppState) {
    let data = match state.chart() {
        None => {
            centered_message(ui, RichText::new("Open a file to explore data  (File → Open…)").heading());
            return;
        }
        Some(Err(e)) => {
            centered_message(ui, RichText::new(format!("⚠ {e}")).color(Color32::RED).strong());
            return;
        }
        Some(Ok(data)) if data.is_empty() => {
            centered_message(ui, RichText::new("Select fields to render a chart."));
            return;
        }
        Some(Ok(data)) => data,
    };

    match data.chart_type {
        ChartType::Pie => pie_plot(ui, data),
        ChartType::Scatter => scatter_plot(ui, data),
        ChartType::Bar | ChartType::Line => category_plot(ui, data),
    }
}

/// Bar and line charts: x positions are label indices, ticks show the labels.
fn category_plot(ui: &mut Ui, data: &ChartData) {
    let labels: Vec<String> = data.labels.iter().map(ToString::to_string).collect();
    let kind = data.chart_type;

    Plot::new("category_plot")
        .legend(Legend::default())
        .x_axis_formatter(move |mark, _range| {
            let i = mark.value;
            if i < 0.0 || i.fract() != 0.0 {
                return String::new();
            }
            labels.get(i as usize).cloned().unwrap_or_default()
        })
        .allow_drag(true)
        .allow_zoom(true)
        .show(ui, |plot_ui: &mut PlotUi| {
            for dataset in &data.datasets {
                match kind {
                    ChartType::Line => {
                        let color = dataset.colors.first().copied().map(to_color32).unwrap_or(Color32::LIGHT_BLUE);
                        let points: Vec<[f64; 2]> = dataset
                            .values
                            .iter()
                            .enumerate()
                            .map(|(i, v)| [i as f64, v.y()])
                            .collect();
                        plot_ui.line(
                            Line::new(PlotPoints::from(points.clone()))
                                .name(&dataset.label)
                                .color(color)
                                .fill(0.0_f32)
                                .width(2.0),
                        );
                        plot_ui.points(Points::new(points).color(color).radius(4.0));
                    }
                    _ => {
                        let bars: Vec<Bar> = dataset
                            .values
                            .iter()
                            .enumerate()
                            .map(|(i, v)| {
                                let color = dataset.colors.get(i).copied().map(to_color32).unwrap_or(Color32::GRAY);
                                Bar::new(i as f64, v.y()).fill(color).width(0.7)
                            })
                            .collect();
                        plot_ui.bar_chart(BarChart::new(bars).name(&dataset.label));
                    }
                }
            }
        });
}

/// Scatter: one point layer per colour so each keeps its gradient shade.
fn scatter_plot(ui: &mut Ui, data: &ChartData) {
    Plot::new("scatter_plot")
        .legend(Legend::default())
        .allow_drag(true)
        .allow_zoom(true)
        .allow_boxed_zoom(true)
        .show(ui, |plot_ui: &mut PlotUi| {
            for dataset in &data.datasets {
                let mut layers: Vec<(ChartColor, Vec<[f64; 2]>)> = Vec::new();
                for (i, value) in dataset.values.iter().enumerate() {
                    let ChartValue::Point { x, y } = *value else {
                        continue;
                    };
                    let Some(&color) = dataset.colors.get(i) else {
                        continue;
                    };
                    match layers.iter_mut().find(|(c, _)| *c == color) {
                        Some((_, pts)) => pts.push([x, y]),
                        None => layers.push((color, vec![[x, y]])),
                    }
                }
                for (color, pts) in layers {
                    plot_ui.points(
                        Points::new(pts)
                            .name(&dataset.label)
                            .color(to_color32(color))
                            .filled(true)
                            .radius(4.0),
                    );
                }
            }
        });
}

/// Pie: each slice drawn as filled wedges of at most a quarter turn, since
/// polygons are only filled correctly when convex.
fn pie_plot(ui: &mut Ui, data: &ChartData) {
    let Some(dataset) = data.datasets.first() else {
        return;
    };
    let total: f64 = dataset.values.iter().map(ChartValue::y).filter(|v| *v > 0.0).sum();
    if total <= 0.0 {
        centered_message(ui, RichText::new("Nothing to show: all slice values are zero or negative."));
        return;
    }

    Plot::new("pie_plot")
        .legend(Legend::default())
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show(ui, |plot_ui: &mut PlotUi| {
            let mut start = TAU / 4.0;
            for (i, value) in dataset.values.iter().enumerate() {
                let v = value.y();
                if v <= 0.0 {
                    continue;
                }
                let sweep = v / total * TAU;
                let color = dataset.colors.get(i).copied().map(to_color32).unwrap_or(Color32::GRAY);
                let name = format!(
                    "{} ({:.1}%)",
                    data.labels.get(i).map(ToString::to_string).unwrap_or_default(),
                    v / total * 100.0
                );

                let pieces = (sweep / (TAU / 4.0)).ceil().max(1.0) as usize;
                for p in 0..pieces {
                    let a0 = start - sweep * p as f64 / pieces as f64;
                    let a1 = start - sweep * (p + 1) as f64 / pieces as f64;
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::from(wedge(a0, a1)))
                            .name(&name)
                            .fill_color(color)
                            .stroke(Stroke::new(1.0, color)),
                    );
                }
                start -= sweep;
            }
        });
}

/// Unit-circle wedge from angle `a0` to `a1`, centre first.
fn wedge(a0: f64, a1: f64) -> Vec<[f64; 2]> {
    const SEGMENTS: usize = 24;
    let mut pts = vec![[0.0, 0.0]];
    pts.extend((0..=SEGMENTS).map(|s| {
        let a = a0 + (a1 - a0) * s as f64 / SEGMENTS as f64;
        [a.cos(), a.sin()]
    }));
    pts
}
