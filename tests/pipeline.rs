use rusty_charts::chart::{ChartErrorKind, ChartLabel, ChartType, ChartValue};
use rusty_charts::config::EngineConfig;
use rusty_charts::data::filter::ColumnFilter;
use rusty_charts::data::loader::{load_file, parse_csv};
use rusty_charts::data::types::ColumnType;
use rusty_charts::insight::Severity;
use rusty_charts::state::AppState;

const SALES: &str = "\
region,units,price
North,10,2.5
South,20,3
North,5,
East,x,4
West,15,1
South,25,2
North,30,3.5
East,40,4
";

fn loaded(config: EngineConfig) -> AppState {
    let mut state = AppState::with_config(config);
    state.set_dataset(parse_csv(SALES).unwrap());
    state
}

fn labels(state: &AppState) -> Vec<String> {
    match state.chart() {
        Some(Ok(data)) => data.labels.iter().map(ChartLabel::to_string).collect(),
        other => panic!("expected a chart, got {other:?}"),
    }
}

fn first_values(state: &AppState) -> Vec<f64> {
    match state.chart() {
        Some(Ok(data)) => data.datasets[0].values.iter().map(ChartValue::y).collect(),
        other => panic!("expected a chart, got {other:?}"),
    }
}

fn error_kind(state: &AppState) -> ChartErrorKind {
    match state.chart() {
        Some(Err(e)) => e.kind,
        other => panic!("expected a chart error, got {other:?}"),
    }
}

#[test]
fn empty_state_has_nothing_to_show() {
    let mut state = AppState::default();
    assert!(state.chart().is_none());
    assert!(state.insights().is_none());
    assert!(state.columns().is_empty());
    assert!(state.filtered_rows().is_empty());
    let dir = tempfile::tempdir().unwrap();
    assert!(state.export_csv(&dir.path().join("x.csv")).is_err());
}

#[test]
fn loading_infers_types_and_asks_for_axes() {
    let state = loaded(EngineConfig::default());
    let types = state.column_types();
    assert_eq!(types["region"], ColumnType::Categorical);
    assert_eq!(types["units"], ColumnType::Numeric);
    assert_eq!(types["price"], ColumnType::Numeric);
    assert_eq!(state.filtered().matched(), 8);
    assert_eq!(error_kind(&state), ChartErrorKind::MissingSelection);
}

#[test]
fn pie_defaults_group_and_sum() {
    let mut state = loaded(EngineConfig::default());
    state.set_chart_type(ChartType::Pie);
    assert_eq!(state.selection().category_col.as_deref(), Some("region"));
    assert_eq!(state.selection().value_col.as_deref(), Some("units"));
    assert_eq!(labels(&state), ["North", "South", "East", "West"]);
    assert_eq!(first_values(&state), [45.0, 45.0, 40.0, 15.0]);
    match state.chart() {
        Some(Ok(data)) => assert_eq!(data.defaulted_values, 1),
        other => panic!("expected a chart, got {other:?}"),
    }
}

#[test]
fn pie_over_the_slice_limit_is_rejected() {
    let mut state = loaded(EngineConfig {
        max_pie_slices: 3,
        ..Default::default()
    });
    state.set_chart_type(ChartType::Pie);
    assert_eq!(error_kind(&state), ChartErrorKind::TooManyCategories);

    state.set_filter(
        "region",
        ColumnFilter::Contains {
            value: "th".into(),
        },
    );
    assert_eq!(labels(&state), ["North", "South"]);
}

#[test]
fn filters_and_search_drive_the_chart() {
    let mut state = loaded(EngineConfig::default());
    state.set_chart_type(ChartType::Line);
    assert_eq!(error_kind(&state), ChartErrorKind::MissingSelection);

    state.set_x_axis(Some("region".into()));
    state.set_y_axis(Some("units".into()));
    assert_eq!(labels(&state).len(), 8);

    state.set_filter(
        "region",
        ColumnFilter::Exact {
            value: "North".into(),
        },
    );
    assert_eq!(state.filtered().indices, [0, 2, 6]);
    assert_eq!(first_values(&state), [10.0, 5.0, 30.0]);

    state.set_search_text("  SOUTH ");
    assert_eq!(state.filtered().matched(), 0);

    state.remove_filter("region");
    assert_eq!(state.filtered().indices, [1, 5]);
    assert_eq!(first_values(&state), [20.0, 25.0]);

    state.set_search_text("");
    assert_eq!(state.filtered().matched(), 8);
}

#[test]
fn line_keeps_the_scatter_axes() {
    let mut state = loaded(EngineConfig::default());
    state.set_chart_type(ChartType::Scatter);
    assert_eq!(state.selection().x_axis.as_deref(), Some("units"));
    assert_eq!(state.selection().y_axis.as_deref(), Some("price"));

    state.set_chart_type(ChartType::Line);
    assert_eq!(state.selection().x_axis.as_deref(), Some("units"));
    assert_eq!(state.selection().y_axis.as_deref(), Some("price"));
    assert_eq!(labels(&state).len(), 8);
}

#[test]
fn bar_axes_survive_a_pie_detour() {
    let mut state = loaded(EngineConfig::default());
    state.set_x_axis(Some("region".into()));
    state.set_y_axis(Some("price".into()));
    assert_eq!(labels(&state), ["North", "South", "East", "West"]);

    state.set_chart_type(ChartType::Pie);
    assert_eq!(first_values(&state), [45.0, 45.0, 40.0, 15.0]);

    state.set_chart_type(ChartType::Bar);
    assert_eq!(state.selection().x_axis.as_deref(), Some("region"));
    assert_eq!(state.selection().y_axis.as_deref(), Some("price"));
    assert_eq!(first_values(&state), [6.0, 5.0, 8.0, 1.0]);
}

#[test]
fn default_range_filter_drops_unparseable_cells() {
    let mut state = loaded(EngineConfig::default());
    state.add_filter("units");
    assert_eq!(
        state.filters().get("units"),
        Some(&ColumnFilter::Range { min: 5.0, max: 40.0 })
    );
    assert_eq!(state.filtered().matched(), 7);
    assert!(!state.filtered().indices.contains(&3));
}

#[test]
fn new_dataset_resets_inputs_but_keeps_chart_type() {
    let mut state = loaded(EngineConfig::default());
    state.set_chart_type(ChartType::Scatter);
    state.set_search_text("north");
    state.add_filter("region");

    state.set_dataset(parse_csv("a,b\n1,2\n3,4\n").unwrap());
    assert!(state.filters().is_empty());
    assert_eq!(state.search_text(), "");
    assert_eq!(state.selection().chart_type, ChartType::Scatter);
    assert_eq!(state.selection().x_axis, None);
    assert_eq!(state.filtered().matched(), 2);
}

#[test]
fn insights_follow_the_filtered_view() {
    let mut state = loaded(EngineConfig::default());
    {
        let report = state.insights().unwrap();
        assert_eq!(report.summary.total_rows, 8);
        assert_eq!(report.missing_values["price"], 12.5);
        assert_eq!(report.recommendations[0].severity, Severity::Warning);
        assert_eq!(
            report.recommendations[0].message,
            "Column \"price\" has 12.50% missing values. Consider data cleaning or imputation."
        );
        assert_eq!(
            report.recommendations.last().unwrap().message,
            "Your dataset is relatively small. Consider uploading more data for better analysis."
        );
    }

    state.set_filter(
        "region",
        ColumnFilter::Exact {
            value: "North".into(),
        },
    );
    let report = state.insights().unwrap();
    assert_eq!(report.summary.total_rows, 3);
    assert_eq!(report.missing_values["price"], 33.33);
}

#[test]
fn export_writes_the_filtered_rows() {
    let mut state = loaded(EngineConfig::default());
    state.set_filter(
        "region",
        ColumnFilter::Exact {
            value: "East".into(),
        },
    );

    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("east.csv");
    state.export_csv(&csv_path).unwrap();
    let csv = std::fs::read_to_string(&csv_path).unwrap();
    assert_eq!(csv, "region,units,price\nEast,x,4\nEast,40,4\n");

    let json_path = dir.path().join("east.json");
    state.export_json(&json_path).unwrap();
    let reloaded = load_file(&json_path).unwrap();
    assert_eq!(reloaded.columns(), ["region", "units", "price"]);
    assert_eq!(reloaded.len(), 2);
    assert_eq!(reloaded.rows()[1].get("units").to_string(), "40");
}
