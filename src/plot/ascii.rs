//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual checks from the one-shot CLI
//! - deterministic output (helpful for golden tests)
//!
//! Bars are drawn horizontally, one line per category. Lines and scatter
//! points go on a character grid; each series gets its own glyph.

use crate::chart::{ChartBody, ChartKind, ChartSpec, LegendPosition};
use crate::report::Highlight;
use crate::report::format::truncate;

const SERIES_GLYPHS: [char; 8] = ['#', '=', '*', '+', '%', '@', 'o', 'x'];
const LABEL_MAX: usize = 12;

/// Render any chart description as plain text.
pub fn render_ascii_chart(chart: &ChartSpec, width: usize, height: usize) -> String {
    let mut out = String::new();
    out.push_str(&chart.title);
    out.push('\n');

    match chart.kind {
        ChartKind::Bar | ChartKind::StackedBar => out.push_str(&render_bars(chart, width)),
        ChartKind::Line | ChartKind::Scatter => out.push_str(&render_grid(chart, width, height)),
    }

    if let Some(legend) = legend_line(chart) {
        out.push_str(&legend);
        out.push('\n');
    }
    out
}

fn render_bars(chart: &ChartSpec, width: usize) -> String {
    let ChartBody::Categorical {
        categories,
        series,
        highlights,
    } = &chart.body
    else {
        return String::new();
    };
    let Some((lo, hi)) = chart.value_range() else {
        return "(no data)\n".to_string();
    };
    let hi = if hi > lo { hi } else { lo + 1.0 };

    let width = width.max(10);
    let label_width = categories
        .iter()
        .map(|c| c.chars().count())
        .max()
        .unwrap_or(0)
        .min(LABEL_MAX);
    let single = series.len() == 1;
    let stacked = chart.kind == ChartKind::StackedBar;

    let mut out = String::new();
    for (idx, category) in categories.iter().enumerate() {
        let label = truncate(category, label_width);

        if single || stacked {
            let mut row = vec![' '; width];
            let (mut pos, mut neg, mut total) = (0.0_f64, 0.0_f64, 0.0_f64);
            for (s_idx, s) in series.iter().enumerate() {
                let v = s.values.get(idx).copied().unwrap_or(0.0);
                total += v;
                let glyph = if single {
                    highlight_glyph(highlights.get(idx).copied())
                } else {
                    SERIES_GLYPHS[s_idx % SERIES_GLYPHS.len()]
                };
                let (from, to) = if v >= 0.0 {
                    pos += v;
                    (pos - v, pos)
                } else {
                    neg += v;
                    (neg, neg - v)
                };
                fill_span(&mut row, bar_col(from, lo, hi, width), bar_col(to, lo, hi, width), glyph);
            }
            out.push_str(&format!(
                "{label:<label_width$} |{}| {}\n",
                row.into_iter().collect::<String>(),
                fmt_value(total)
            ));
            continue;
        }

        // Grouped bars: one line per series under the category label.
        for (s_idx, s) in series.iter().enumerate() {
            let v = s.values.get(idx).copied().unwrap_or(0.0);
            let mut row = vec![' '; width];
            let (from, to) = if v >= 0.0 { (0.0, v) } else { (v, 0.0) };
            fill_span(
                &mut row,
                bar_col(from, lo, hi, width),
                bar_col(to, lo, hi, width),
                SERIES_GLYPHS[s_idx % SERIES_GLYPHS.len()],
            );
            let shown = if s_idx == 0 { label.as_str() } else { "" };
            out.push_str(&format!(
                "{shown:<label_width$} |{}| {}\n",
                row.into_iter().collect::<String>(),
                fmt_value(v)
            ));
        }
    }
    out
}

fn render_grid(chart: &ChartSpec, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (Some((x_min, x_max)), Some((y_min, y_max))) = (chart.x_range(), chart.value_range()) else {
        return "(no data)\n".to_string();
    };
    let (x_min, x_max) = widen(x_min, x_max);
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    match &chart.body {
        ChartBody::Categorical { series, .. } => {
            // Connecting segments first so the point glyphs overlay them.
            for s in series {
                let mut prev = None;
                for (i, &v) in s.values.iter().enumerate() {
                    let x = map_x(i as f64, x_min, x_max, width);
                    let y = map_y(v, y_min, y_max, height);
                    if let Some((x0, y0)) = prev {
                        draw_line(&mut grid, x0, y0, x, y, '.');
                    }
                    prev = Some((x, y));
                }
            }
            for (s_idx, s) in series.iter().enumerate() {
                let glyph = SERIES_GLYPHS[s_idx % SERIES_GLYPHS.len()];
                for (i, &v) in s.values.iter().enumerate() {
                    let x = map_x(i as f64, x_min, x_max, width);
                    let y = map_y(v, y_min, y_max, height);
                    grid[y][x] = glyph;
                }
            }
        }
        ChartBody::Scatter { series } => {
            for (s_idx, s) in series.iter().enumerate() {
                let glyph = SERIES_GLYPHS[s_idx % SERIES_GLYPHS.len()];
                for &(px, py) in &s.points {
                    let x = map_x(px, x_min, x_max, width);
                    let y = map_y(py, y_min, y_max, height);
                    grid[y][x] = glyph;
                }
            }
        }
    }

    let mut out = String::new();
    out.push_str(&format!(
        "{}: [{y_min:.2}, {y_max:.2}]\n",
        chart.options.y_label
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    match &chart.body {
        ChartBody::Categorical { categories, .. } => {
            if let (Some(first), Some(last)) = (categories.first(), categories.last()) {
                out.push_str(&axis_ends(first, last, width));
                out.push('\n');
            }
        }
        ChartBody::Scatter { .. } => {
            out.push_str(&format!(
                "{}: [{x_min:.2}, {x_max:.2}]\n",
                chart.options.x_label
            ));
        }
    }

    out
}

fn legend_line(chart: &ChartSpec) -> Option<String> {
    if chart.options.legend == LegendPosition::Hidden {
        return None;
    }

    if let ChartBody::Categorical { highlights, series, .. } = &chart.body {
        if series.len() == 1 && !highlights.is_empty() {
            return Some(format!(
                "{} highest  {} lowest",
                highlight_glyph(Some(Highlight::Max)),
                highlight_glyph(Some(Highlight::Min))
            ));
        }
    }

    let names = chart.series_names();
    if names.len() < 2 && chart.kind != ChartKind::Scatter {
        return None;
    }
    let entries: Vec<String> = names
        .iter()
        .enumerate()
        .map(|(i, name)| format!("{} {name}", SERIES_GLYPHS[i % SERIES_GLYPHS.len()]))
        .collect();
    Some(format!("Legend: {}", entries.join("  ")))
}

fn highlight_glyph(highlight: Option<Highlight>) -> char {
    match highlight {
        Some(Highlight::Max) => '#',
        Some(Highlight::Min) => '.',
        Some(Highlight::Neutral) | None => '=',
    }
}

fn fmt_value(v: f64) -> String {
    if (v.fract()).abs() < 1e-9 {
        format!("{v:.0}")
    } else {
        format!("{v:.2}")
    }
}

fn axis_ends(first: &str, last: &str, width: usize) -> String {
    if first == last {
        return first.to_string();
    }
    let used = first.chars().count() + last.chars().count();
    let gap = width.saturating_sub(used).max(1);
    format!("{first}{}{last}", " ".repeat(gap))
}

fn widen(min: f64, max: f64) -> (f64, f64) {
    if max > min { (min, max) } else { (min - 0.5, max + 0.5) }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let (min, max) = widen(min, max);
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

/// Column boundary for a bar value; spans are half-open `[from, to)`.
fn bar_col(v: f64, lo: f64, hi: f64, width: usize) -> usize {
    let u = ((v - lo) / (hi - lo)).clamp(0.0, 1.0);
    (u * width as f64).round() as usize
}

fn fill_span(row: &mut [char], a: usize, b: usize, glyph: char) {
    let (start, end) = if a <= b { (a, b) } else { (b, a) };
    for cell in row.iter_mut().take(end).skip(start) {
        *cell = glyph;
    }
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
