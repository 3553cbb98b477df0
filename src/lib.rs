//! In-memory tabular analytics and chart-data engine.
//!
//! A [`data::model::Dataset`] flows through column type inference, filtering
//! and search, then feeds the [`insight`] report and the [`chart`] builder.
//! [`state::AppState`] wires these together and recomputes derived values
//! whenever an input changes.

pub mod chart;
pub mod color;
pub mod config;
pub mod data;
pub mod insight;
pub mod state;
