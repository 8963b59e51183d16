//! Line Charts
//!
//! One chart per indicator, keyed by its canvas id. The registry is owned by
//! whoever drives the updates; a chart is created on the first update and
//! its data replaced in place afterwards.

use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::series::Series;

/// Line smoothing applied to every chart
pub const LINE_TENSION: f64 = 0.2;

/// Alpha suffix appended to the line colour for the area fill
const FILL_ALPHA: &str = "33";

/// Fixed visual styling of a chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartStyle {
    pub border_color: String,
    pub background_color: String,
    pub tension: f64,
    pub show_legend: bool,
}

impl ChartStyle {
    /// Line style for a `#rrggbb` colour
    pub fn line(color: &str) -> Self {
        Self {
            border_color: color.to_string(),
            background_color: format!("{}{}", color, FILL_ALPHA),
            tension: LINE_TENSION,
            show_legend: true,
        }
    }
}

/// A line chart bound to a canvas element
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub id: String,
    pub label: String,
    pub style: ChartStyle,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    /// How many times the data was replaced after creation
    pub redraws: u64,
}

impl Chart {
    pub fn new(id: &str, label: &str, color: &str, series: &Series) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            style: ChartStyle::line(color),
            labels: series.labels.clone(),
            values: series.values.clone(),
            redraws: 0,
        }
    }

    /// Replace labels and values, keeping styling, and mark a redraw
    pub fn replace_data(&mut self, series: &Series) {
        self.labels = series.labels.clone();
        self.values = series.values.clone();
        self.redraws += 1;
    }

    /// Chart.js configuration for this chart.
    ///
    /// Non-finite values serialize as `null`, which Chart.js draws as a gap.
    pub fn config(&self) -> Value {
        json!({
            "type": "line",
            "data": {
                "labels": self.labels,
                "datasets": [{
                    "label": self.label,
                    "data": self.values,
                    "borderColor": self.style.border_color,
                    "backgroundColor": self.style.background_color,
                    "tension": self.style.tension,
                }],
            },
            "options": {
                "plugins": { "legend": { "display": self.style.show_legend } },
                "scales": { "x": { "display": true }, "y": { "display": true } },
            },
        })
    }
}

/// Mapping of canvas id to its chart
#[derive(Debug, Clone, Default)]
pub struct ChartRegistry {
    charts: BTreeMap<String, Chart>,
}

impl ChartRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the chart for `id` or replace its data if it already exists
    pub fn make_or_update(&mut self, id: &str, label: &str, color: &str, series: &Series) -> &Chart {
        self.charts
            .entry(id.to_string())
            .and_modify(|chart| chart.replace_data(series))
            .or_insert_with(|| {
                tracing::debug!(chart = %id, points = series.len(), "Creating chart");
                Chart::new(id, label, color, series)
            })
    }

    pub fn get(&self, id: &str) -> Option<&Chart> {
        self.charts.get(id)
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }

    pub fn ids(&self) -> Vec<String> {
        self.charts.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Chart> {
        self.charts.values()
    }
}
