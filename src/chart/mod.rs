//! Chart adapter: derived tables -> renderer-agnostic chart descriptions.
//!
//! A `ChartSpec` is plain data. The ASCII renderer (`plot`), the Plotters
//! widget in the TUI, and any external consumer of the JSON form all draw
//! from the same description.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

use crate::aggregate::{Aggregate, PivotTable, ScatterSet};
use crate::report::{ExtremalReport, Highlight, format_row_label};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartKind {
    Bar,
    StackedBar,
    Line,
    Scatter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LegendPosition {
    Hidden,
    TopRight,
}

/// Display options supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartOptions {
    pub x_label: String,
    pub y_label: String,
    /// Color bars by their role in the extremal report (max/min/other).
    pub color_by_extremal: bool,
    /// Stack pivot columns instead of placing them side by side.
    pub stacked: bool,
    pub legend: LegendPosition,
}

impl ChartOptions {
    pub fn new(x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        Self {
            x_label: x_label.into(),
            y_label: y_label.into(),
            color_by_extremal: false,
            stacked: false,
            legend: LegendPosition::TopRight,
        }
    }
}

/// Values aligned with `ChartBody::Categorical::categories`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointSeries {
    pub name: String,
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "layout", rename_all = "kebab-case")]
pub enum ChartBody {
    Categorical {
        categories: Vec<String>,
        series: Vec<Series>,
        /// Per-category roles; empty unless `color_by_extremal` was requested.
        highlights: Vec<Highlight>,
    },
    Scatter {
        series: Vec<PointSeries>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub options: ChartOptions,
    pub body: ChartBody,
}

impl ChartSpec {
    pub fn series_names(&self) -> Vec<&str> {
        match &self.body {
            ChartBody::Categorical { series, .. } => series.iter().map(|s| s.name.as_str()).collect(),
            ChartBody::Scatter { series } => series.iter().map(|s| s.name.as_str()).collect(),
        }
    }

    /// Value-axis range, always including zero for bar kinds.
    ///
    /// Stacked bars use per-category positive/negative stack heights.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let (lo, hi) = match &self.body {
            ChartBody::Categorical { categories, series, .. } => {
                if self.kind == ChartKind::StackedBar {
                    stacked_extents(categories.len(), series)
                } else {
                    min_max(series.iter().flat_map(|s| s.values.iter().copied()))?
                }
            }
            ChartBody::Scatter { series } => {
                min_max(series.iter().flat_map(|s| s.points.iter().map(|p| p.1)))?
            }
        };

        match self.kind {
            ChartKind::Bar | ChartKind::StackedBar => Some((lo.min(0.0), hi.max(0.0))),
            ChartKind::Line | ChartKind::Scatter => Some((lo, hi)),
        }
    }

    /// Horizontal range for scatter charts.
    pub fn x_range(&self) -> Option<(f64, f64)> {
        match &self.body {
            ChartBody::Scatter { series } => min_max(series.iter().flat_map(|s| s.points.iter().map(|p| p.0))),
            ChartBody::Categorical { categories, .. } => {
                if categories.is_empty() {
                    None
                } else {
                    Some((0.0, categories.len() as f64 - 1.0))
                }
            }
        }
    }
}

/// Single bar series over the aggregate's categories.
pub fn bar_chart(agg: &Aggregate, report: Option<&ExtremalReport>, options: ChartOptions) -> ChartSpec {
    let categories = agg.iter().map(|(k, _)| format_row_label(k)).collect();
    let values = agg.iter().map(|(_, v)| to_f64(*v)).collect();

    let highlights = match report {
        Some(report) if options.color_by_extremal => agg.iter().map(|(_, v)| report.highlight(*v)).collect(),
        _ => Vec::new(),
    };

    ChartSpec {
        kind: ChartKind::Bar,
        title: crate::report::chart_title(agg.key, agg.value),
        body: ChartBody::Categorical {
            categories,
            series: vec![Series {
                name: agg.value.header().to_string(),
                values,
            }],
            highlights,
        },
        options,
    }
}

/// One series per pivot column, stacked when `options.stacked` is set.
pub fn pivot_bar_chart(pivot: &PivotTable, options: ChartOptions) -> ChartSpec {
    let kind = if options.stacked {
        ChartKind::StackedBar
    } else {
        ChartKind::Bar
    };
    ChartSpec {
        kind,
        title: format!("{} per {} by {}", pivot.value, pivot.row_key, pivot.column_key),
        body: pivot_body(pivot),
        options,
    }
}

/// Time series ("bump" chart): one line per pivot column over the row keys.
pub fn line_chart(pivot: &PivotTable, options: ChartOptions) -> ChartSpec {
    ChartSpec {
        kind: ChartKind::Line,
        title: format!("{} over {} by {}", pivot.value, pivot.row_key, pivot.column_key),
        body: pivot_body(pivot),
        options,
    }
}

pub fn scatter_chart(set: &ScatterSet, options: ChartOptions) -> ChartSpec {
    let series = set
        .groups
        .iter()
        .map(|g| PointSeries {
            name: g.key.to_string(),
            points: g.points.iter().map(|(x, y)| (to_f64(*x), to_f64(*y))).collect(),
        })
        .collect();

    ChartSpec {
        kind: ChartKind::Scatter,
        title: format!("{} vs {} by {}", set.y, set.x, set.category),
        body: ChartBody::Scatter { series },
        options,
    }
}

fn pivot_body(pivot: &PivotTable) -> ChartBody {
    let categories = pivot.rows.iter().map(format_row_label).collect();
    let series = pivot
        .columns
        .iter()
        .enumerate()
        .map(|(idx, column)| Series {
            name: column.to_string(),
            values: pivot.column(idx).into_iter().map(to_f64).collect(),
        })
        .collect();
    ChartBody::Categorical {
        categories,
        series,
        highlights: Vec::new(),
    }
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

fn min_max(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for v in values {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if lo.is_finite() && hi.is_finite() {
        Some((lo, hi))
    } else {
        None
    }
}

fn stacked_extents(n: usize, series: &[Series]) -> (f64, f64) {
    let mut lo = 0.0_f64;
    let mut hi = 0.0_f64;
    for idx in 0..n {
        let (mut neg, mut pos) = (0.0, 0.0);
        for s in series {
            let v = s.values.get(idx).copied().unwrap_or(0.0);
            if v < 0.0 {
                neg += v;
            } else {
                pos += v;
            }
        }
        lo = lo.min(neg);
        hi = hi.max(pos);
    }
    (lo, hi)
}
