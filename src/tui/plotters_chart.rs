//! Plotters-powered chart widget for Ratatui.
//!
//! Why Plotters instead of Ratatui's built-in `Chart` widget?
//! - filled rectangles for (stacked) bars
//! - nicer axis + mesh rendering
//! - less manual work for ticks/labels
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{buffer::Buffer, layout::Rect, style::Style, widgets::Widget};

use crate::chart::{ChartBody, ChartKind, ChartSpec};
use crate::report::Highlight;
use crate::report::format::truncate;

/// High-contrast palette for terminal readability, one entry per series.
const SERIES_COLORS: [(u8, u8, u8); 8] = [
    (0, 255, 255),
    (255, 165, 0),
    (255, 0, 255),
    (255, 255, 0),
    (0, 128, 255),
    (160, 255, 160),
    (255, 128, 128),
    (200, 200, 200),
];

const MAX_COLOR: RGBColor = RGBColor(0, 255, 0);
const MIN_COLOR: RGBColor = RGBColor(255, 0, 0);

/// RGB of the `idx`-th series (shared with the legend line).
pub fn series_rgb(idx: usize) -> (u8, u8, u8) {
    SERIES_COLORS[idx % SERIES_COLORS.len()]
}

fn series_color(idx: usize) -> RGBColor {
    let (r, g, b) = series_rgb(idx);
    RGBColor(r, g, b)
}

/// A render-only view over a `ChartSpec`.
///
/// Bounds are computed outside the render call (see `chart_bounds`) so the
/// tick labels drawn around the widget agree with the plot.
pub struct DashboardChart<'a> {
    pub chart: &'a ChartSpec,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

/// Plot bounds for `chart`: categories sit at integer x positions.
pub fn chart_bounds(chart: &ChartSpec) -> Option<([f64; 2], [f64; 2])> {
    let (y_min, y_max) = chart.value_range()?;
    let (x_min, x_max) = chart.x_range()?;

    let x_bounds = match &chart.body {
        ChartBody::Categorical { .. } => [x_min - 0.5, x_max + 0.5],
        ChartBody::Scatter { .. } => padded(x_min, x_max),
    };
    Some((x_bounds, padded(y_min, y_max)))
}

fn padded(min: f64, max: f64) -> [f64; 2] {
    let (min, max) = if max > min { (min, max) } else { (min - 0.5, max + 0.5) };
    let pad = ((max - min).abs() * 0.05).max(1e-12);
    [min - pad, max + pad]
}

impl<'a> Widget for DashboardChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(ratatui::style::Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let spec = self.chart;
        let categories: &[String] = match &spec.body {
            ChartBody::Categorical { categories, .. } => categories,
            ChartBody::Scatter { .. } => &[],
        };

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            let category_label = |v: &f64| {
                let idx = v.round();
                if (v - idx).abs() > 0.01 || idx < 0.0 {
                    return String::new();
                }
                categories
                    .get(idx as usize)
                    .map(|c| truncate(c, 10))
                    .unwrap_or_default()
            };
            let value_label = |v: &f64| format!("{v:.0}");
            let x_labels = if categories.is_empty() { 5 } else { categories.len().min(12) };

            let mut mesh = chart.configure_mesh();
            mesh.disable_x_mesh()
                .disable_y_mesh()
                .x_desc(spec.options.x_label.as_str())
                .y_desc(spec.options.y_label.as_str())
                .x_labels(x_labels)
                .y_labels(5)
                .y_label_formatter(&value_label)
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE);
            if !categories.is_empty() {
                mesh.x_label_formatter(&category_label);
            }
            mesh.draw()?;

            match &spec.body {
                ChartBody::Categorical { series, highlights, .. } => match spec.kind {
                    ChartKind::Line => {
                        for (s_idx, s) in series.iter().enumerate() {
                            let color = series_color(s_idx);
                            let points = s.values.iter().enumerate().map(|(i, &v)| (i as f64, v));
                            chart.draw_series(LineSeries::new(points.clone(), color))?;
                            chart.draw_series(points.map(|p| Pixel::new(p, color)))?;
                        }
                    }
                    ChartKind::StackedBar => {
                        let n = categories.len();
                        let mut pos = vec![0.0_f64; n];
                        let mut neg = vec![0.0_f64; n];
                        for (s_idx, s) in series.iter().enumerate() {
                            let color = series_color(s_idx);
                            let mut bars = Vec::with_capacity(n);
                            for (i, &v) in s.values.iter().enumerate().take(n) {
                                let x = i as f64;
                                let (from, to) = if v >= 0.0 {
                                    pos[i] += v;
                                    (pos[i] - v, pos[i])
                                } else {
                                    neg[i] += v;
                                    (neg[i], neg[i] - v)
                                };
                                bars.push(Rectangle::new([(x - 0.4, from), (x + 0.4, to)], color.filled()));
                            }
                            chart.draw_series(bars)?;
                        }
                    }
                    ChartKind::Bar | ChartKind::Scatter => {
                        let width = 0.8 / series.len().max(1) as f64;
                        for (s_idx, s) in series.iter().enumerate() {
                            let bars = s.values.iter().enumerate().map(|(i, &v)| {
                                let left = i as f64 - 0.4 + width * s_idx as f64;
                                let color = match highlights.get(i) {
                                    Some(Highlight::Max) => MAX_COLOR,
                                    Some(Highlight::Min) => MIN_COLOR,
                                    _ => series_color(s_idx),
                                };
                                Rectangle::new([(left, 0.0), (left + width, v)], color.filled())
                            });
                            chart.draw_series(bars)?;
                        }
                    }
                },
                ChartBody::Scatter { series } => {
                    // `Pixel` rather than `Circle`: the backend maps circle radii
                    // in the wrong units and draws huge circles.
                    for (s_idx, s) in series.iter().enumerate() {
                        let color = series_color(s_idx);
                        chart.draw_series(s.points.iter().map(|&p| Pixel::new(p, color)))?;
                    }
                }
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{ChartOptions, PointSeries, Series};

    fn bar_spec(values: Vec<f64>) -> ChartSpec {
        ChartSpec {
            kind: ChartKind::Bar,
            title: "t".to_string(),
            options: ChartOptions::new("x", "y"),
            body: ChartBody::Categorical {
                categories: (0..values.len()).map(|i| format!("c{i}")).collect(),
                series: vec![Series {
                    name: "y".to_string(),
                    values,
                }],
                highlights: Vec::new(),
            },
        }
    }

    #[test]
    fn categorical_bounds_center_categories() {
        let (x, y) = chart_bounds(&bar_spec(vec![10.0, 20.0, 30.0])).unwrap();
        assert_eq!(x, [-0.5, 2.5]);
        // Bars always include zero.
        assert_eq!(y, [-1.5, 31.5]);
    }

    #[test]
    fn flat_series_still_get_a_span() {
        let spec = ChartSpec {
            kind: ChartKind::Scatter,
            title: "t".to_string(),
            options: ChartOptions::new("x", "y"),
            body: ChartBody::Scatter {
                series: vec![PointSeries {
                    name: "a".to_string(),
                    points: vec![(2.0, 5.0)],
                }],
            },
        };
        let (x, y) = chart_bounds(&spec).unwrap();
        assert!(x[1] > x[0] && y[1] > y[0]);
        assert!(x[0] < 2.0 && x[1] > 2.0);
    }

    #[test]
    fn empty_chart_has_no_bounds() {
        assert_eq!(chart_bounds(&bar_spec(vec![])), None);
    }

    #[test]
    fn palette_wraps() {
        assert_eq!(series_rgb(0), series_rgb(SERIES_COLORS.len()));
    }
}
