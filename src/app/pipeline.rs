//! Shared request handling used by both CLI and TUI front-ends.
//!
//! A request is a plain value describing one view; `render` turns it into a
//! chart description plus the derived table behind it:
//! table -> aggregate/pivot/scatter -> extremal report -> chart spec
//!
//! Nothing is cached between calls. The CLI and the TUI can then focus on
//! presentation (printing vs widgets).

use std::collections::BTreeSet;

use tracing::debug;

use crate::aggregate::{
    Aggregate, EmptySelection, PivotSpec, PivotTable, ScatterSet, ScatterSpec, Selection, aggregate, pivot, scatter,
};
use crate::chart::{ChartOptions, ChartSpec, bar_chart, line_chart, pivot_bar_chart, scatter_chart};
use crate::domain::{CategoryKey, Dimension, FinanceTable, Measure};
use crate::report::{extremes, format_aggregate_table, format_extremal_narrative, format_pivot_table};

/// Total of one measure per category, with the extremes called out.
#[derive(Debug, Clone, PartialEq)]
pub struct BarRequest {
    pub by: Dimension,
    pub total: Measure,
    pub color_by_extremal: bool,
}

/// The bar view subdivided by a second column (products by default).
#[derive(Debug, Clone, PartialEq)]
pub struct StackedRequest {
    pub by: Dimension,
    pub total: Measure,
    pub stack_by: Dimension,
    pub included: Vec<CategoryKey>,
}

/// Daily totals per category, restricted to the chosen years.
#[derive(Debug, Clone, PartialEq)]
pub struct BumpRequest {
    pub by: Dimension,
    pub total: Measure,
    pub included: Vec<CategoryKey>,
    pub years: BTreeSet<i32>,
}

/// Row-level relationship between two measures.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterRequest {
    pub x: Measure,
    pub y: Measure,
    pub category: Dimension,
    pub included: Vec<CategoryKey>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartRequest {
    Bar(BarRequest),
    Stacked(StackedRequest),
    Bump(BumpRequest),
    Scatter(ScatterRequest),
}

/// The derived table a view was drawn from (also what `--export` writes).
#[derive(Debug, Clone, PartialEq)]
pub enum DerivedTable {
    Aggregate(Aggregate),
    Pivot(PivotTable),
    Scatter(ScatterSet),
}

impl DerivedTable {
    pub fn to_text(&self) -> String {
        match self {
            DerivedTable::Aggregate(agg) => format_aggregate_table(agg),
            DerivedTable::Pivot(p) => format_pivot_table(p),
            DerivedTable::Scatter(set) => {
                let mut out = format!("{} vs {} by {}\n", set.y, set.x, set.category);
                for group in &set.groups {
                    out.push_str(&format!("{:<24} {:>8} rows\n", group.key.to_string(), group.points.len()));
                }
                out
            }
        }
    }
}

/// Everything a front-end needs to show one view.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartView {
    pub chart: ChartSpec,
    /// Highest/lowest sentence; only the bar view has one.
    pub narrative: Option<String>,
    pub table: DerivedTable,
}

/// Compute the view for `request` over `table`.
pub fn render(table: &FinanceTable, request: &ChartRequest) -> Selection<ChartView> {
    debug!(?request, rows = table.len(), "rendering view");
    match request {
        ChartRequest::Bar(req) => Selection::Ready(render_bar(table, req)),
        ChartRequest::Stacked(req) => {
            let spec = PivotSpec {
                row_key: req.by,
                column_key: req.stack_by,
                value: req.total,
                included: req.included.clone(),
                years: None,
            };
            pivot(table, &spec).map(|p| {
                let mut options = ChartOptions::new(req.by.header(), req.total.header());
                options.stacked = true;
                ChartView {
                    chart: pivot_bar_chart(&p, options),
                    narrative: None,
                    table: DerivedTable::Pivot(p),
                }
            })
        }
        ChartRequest::Bump(req) => {
            let spec = PivotSpec {
                row_key: Dimension::Date,
                column_key: req.by,
                value: req.total,
                included: req.included.clone(),
                years: Some(req.years.clone()),
            };
            pivot(table, &spec).map(|p| ChartView {
                chart: line_chart(&p, ChartOptions::new(Dimension::Date.header(), req.total.header())),
                narrative: None,
                table: DerivedTable::Pivot(p),
            })
        }
        ChartRequest::Scatter(req) => {
            let spec = ScatterSpec {
                x: req.x,
                y: req.y,
                category: req.category,
                included: req.included.clone(),
            };
            scatter(table, &spec).map(|set| ChartView {
                chart: scatter_chart(&set, ChartOptions::new(req.x.header(), req.y.header())),
                narrative: None,
                table: DerivedTable::Scatter(set),
            })
        }
    }
}

fn render_bar(table: &FinanceTable, req: &BarRequest) -> ChartView {
    let agg = aggregate(table, req.by, req.total);
    let report = extremes(&agg);

    let mut options = ChartOptions::new(req.by.header(), req.total.header());
    options.color_by_extremal = req.color_by_extremal;

    ChartView {
        chart: bar_chart(&agg, report.as_ref(), options),
        narrative: report.as_ref().map(|r| format_extremal_narrative(&agg, r)),
        table: DerivedTable::Aggregate(agg),
    }
}

/// What to tell the user when `selection` is a sentinel; `None` when ready.
pub fn prompt_message<T>(request: &ChartRequest, selection: &Selection<T>) -> Option<String> {
    let message = match (request, selection) {
        (_, Selection::Ready(_)) => return None,

        (ChartRequest::Stacked(req), Selection::SameAxes) => format!(
            "{} infograph for {} already available. Please select another column in the For Each menu.",
            req.stack_by, req.total
        ),
        (ChartRequest::Stacked(req), Selection::NothingSelected(_)) => {
            let what = if req.stack_by == Dimension::Product {
                "products".to_string()
            } else {
                format!("{} values", req.stack_by)
            };
            format!("Please select {what} to view how the {} is subdivided.", req.by)
        }

        (ChartRequest::Bump(_), Selection::SameAxes) => {
            "Please select a column other than Date for the X axis.".to_string()
        }
        (ChartRequest::Bump(_), Selection::NothingSelected(EmptySelection::Years)) => {
            "Please select the year to view.".to_string()
        }
        (ChartRequest::Bump(_), Selection::NothingSelected(EmptySelection::Categories(_))) => {
            "Please select at least one category.".to_string()
        }

        (ChartRequest::Scatter(_), Selection::SameAxes) => {
            "Please select different X and Y axes to view the relationship.".to_string()
        }
        (ChartRequest::Scatter(req), Selection::NothingSelected(_)) => {
            format!("Please select the subcategory of {} to view.", req.category)
        }

        // Bar views are always ready; keep a generic fallback for completeness.
        (ChartRequest::Bar(_), Selection::SameAxes) => "Please select different axes.".to_string(),
        (ChartRequest::Bar(_), Selection::NothingSelected(_)) => "Please make a selection.".to_string(),
    };
    Some(message)
}
