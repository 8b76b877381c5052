//! Ratatui-based terminal UI.
//!
//! The TUI mirrors the dashboard layout: one tab per chart family, a settings
//! panel with single-select fields (cycled with ←/→) and multi-select lists
//! (space toggles, `a` selects all, `n` clears), and the chart itself drawn
//! with Plotters. Every change re-runs the request pipeline from scratch.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap},
};
use tracing::{debug, info, warn};

use crate::aggregate::Selection;
use crate::app::pipeline::{
    BarRequest, BumpRequest, ChartRequest, ChartView, ScatterRequest, StackedRequest, prompt_message, render,
};
use crate::chart::{ChartBody, ChartSpec, LegendPosition};
use crate::domain::{CategoryKey, Dimension, FinanceTable, Measure};
use crate::error::AppError;

mod plotters_chart;

use plotters_chart::{DashboardChart, chart_bounds, series_rgb};

/// Start the TUI over an already loaded table.
pub fn run(table: FinanceTable) -> Result<(), AppError> {
    let mut app = App::new(table);
    info!(records = app.table.len(), "starting dashboard");

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Bar,
    Stacked,
    Bump,
    Scatter,
}

impl Tab {
    const ALL: [Tab; 4] = [Tab::Bar, Tab::Stacked, Tab::Bump, Tab::Scatter];

    fn title(self) -> &'static str {
        match self {
            Tab::Bar => "Totals",
            Tab::Stacked => "Subdivided",
            Tab::Bump => "Over time",
            Tab::Scatter => "Relationship",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    fn shifted(self, delta: i32) -> Tab {
        Self::ALL[cycle_index(self.index(), Self::ALL.len(), delta)]
    }

    fn fields(self) -> &'static [Field] {
        match self {
            Tab::Bar => &[Field::BarBy, Field::BarTotal],
            Tab::Stacked => &[Field::BarBy, Field::BarTotal, Field::Products],
            Tab::Bump => &[Field::BumpBy, Field::BumpTotal, Field::BumpCategories, Field::BumpYears],
            Tab::Scatter => &[
                Field::ScatterX,
                Field::ScatterY,
                Field::ScatterCategory,
                Field::ScatterCategories,
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    BarBy,
    BarTotal,
    Products,
    BumpBy,
    BumpTotal,
    BumpCategories,
    BumpYears,
    ScatterX,
    ScatterY,
    ScatterCategory,
    ScatterCategories,
}

impl Field {
    fn is_multi(self) -> bool {
        matches!(
            self,
            Field::Products | Field::BumpCategories | Field::BumpYears | Field::ScatterCategories
        )
    }
}

/// A checkbox list with a cursor.
#[derive(Debug, Clone)]
struct MultiSelect<T> {
    options: Vec<T>,
    chosen: Vec<bool>,
    cursor: usize,
}

impl<T: Clone + ToString> MultiSelect<T> {
    fn all(options: Vec<T>) -> Self {
        Self::only(options, |_| true)
    }

    fn only(options: Vec<T>, pick: impl Fn(&T) -> bool) -> Self {
        let chosen = options.iter().map(pick).collect();
        Self {
            options,
            chosen,
            cursor: 0,
        }
    }

    fn toggle(&mut self) {
        if let Some(c) = self.chosen.get_mut(self.cursor) {
            *c = !*c;
        }
    }

    fn set_all(&mut self, on: bool) {
        self.chosen.iter_mut().for_each(|c| *c = on);
    }

    fn move_cursor(&mut self, delta: i32) {
        if !self.options.is_empty() {
            self.cursor = cycle_index(self.cursor, self.options.len(), delta);
        }
    }

    fn selected(&self) -> Vec<T> {
        self.options
            .iter()
            .zip(&self.chosen)
            .filter(|(_, on)| **on)
            .map(|(v, _)| v.clone())
            .collect()
    }

    fn summary(&self) -> String {
        let n = self.chosen.iter().filter(|c| **c).count();
        format!("{n}/{} selected", self.options.len())
    }

    fn items(&self) -> Vec<ListItem<'static>> {
        self.options
            .iter()
            .zip(&self.chosen)
            .map(|(v, on)| ListItem::new(format!("[{}] {}", if *on { 'x' } else { ' ' }, v.to_string())))
            .collect()
    }
}

struct App {
    table: FinanceTable,
    tab: Tab,
    selected_field: usize,

    bar_by: Dimension,
    bar_total: Measure,
    products: MultiSelect<CategoryKey>,

    bump_by: Dimension,
    bump_total: Measure,
    bump_categories: MultiSelect<CategoryKey>,
    bump_years: MultiSelect<i32>,

    scatter_x: Measure,
    scatter_y: Measure,
    scatter_category: Dimension,
    scatter_categories: MultiSelect<CategoryKey>,

    view: Selection<ChartView>,
    prompt: Option<String>,
    status: String,
}

impl App {
    fn new(table: FinanceTable) -> Self {
        let years = table.years();
        let earliest = years.first().copied();

        let mut app = Self {
            tab: Tab::Bar,
            selected_field: 0,
            bar_by: Dimension::Segment,
            bar_total: Measure::Sales,
            products: MultiSelect::all(table.domain(Dimension::Product)),
            bump_by: Dimension::Segment,
            bump_total: Measure::Sales,
            bump_categories: MultiSelect::all(table.domain(Dimension::Segment)),
            bump_years: MultiSelect::only(years, |y| Some(*y) == earliest),
            scatter_x: Measure::VARYING[0],
            scatter_y: Measure::VARYING[1],
            scatter_category: Dimension::Segment,
            scatter_categories: MultiSelect::all(table.domain(Dimension::Segment)),
            view: Selection::SameAxes,
            prompt: None,
            status: "Ready.".to_string(),
            table,
        };
        app.refresh();
        app
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn current_field(&self) -> Field {
        let fields = self.tab.fields();
        fields[self.selected_field.min(fields.len() - 1)]
    }

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab => self.switch_tab(self.tab.shifted(1)),
            KeyCode::BackTab => self.switch_tab(self.tab.shifted(-1)),
            KeyCode::Char(c @ '1'..='4') => {
                let idx = c as usize - '1' as usize;
                self.switch_tab(Tab::ALL[idx]);
            }
            KeyCode::Up => {
                self.selected_field = self.selected_field.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected_field + 1 < self.tab.fields().len() {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.adjust_field(-1),
            KeyCode::Right => self.adjust_field(1),
            KeyCode::Char(' ') => self.edit_multi(|m| m.toggle(), |m| m.toggle()),
            KeyCode::Char('a') => self.edit_multi(|m| m.set_all(true), |m| m.set_all(true)),
            KeyCode::Char('n') => self.edit_multi(|m| m.set_all(false), |m| m.set_all(false)),
            KeyCode::Char('e') => self.export_current(),
            _ => {}
        }
        false
    }

    fn switch_tab(&mut self, tab: Tab) {
        self.tab = tab;
        self.selected_field = 0;
        self.refresh();
    }

    fn adjust_field(&mut self, delta: i32) {
        let field = self.current_field();
        match field {
            Field::BarBy => self.bar_by = cycle(&Dimension::FACTS, self.bar_by, delta),
            Field::BarTotal => self.bar_total = cycle(&Measure::ALL, self.bar_total, delta),
            Field::BumpBy => {
                self.bump_by = cycle(&Dimension::FACTS, self.bump_by, delta);
                self.bump_categories = MultiSelect::all(self.table.domain(self.bump_by));
            }
            Field::BumpTotal => self.bump_total = cycle(&Measure::ALL, self.bump_total, delta),
            Field::ScatterX => self.scatter_x = cycle(&Measure::VARYING, self.scatter_x, delta),
            Field::ScatterY => self.scatter_y = cycle(&Measure::VARYING, self.scatter_y, delta),
            Field::ScatterCategory => {
                self.scatter_category = cycle(&Dimension::FACTS, self.scatter_category, delta);
                self.scatter_categories = MultiSelect::all(self.table.domain(self.scatter_category));
            }
            Field::Products => self.products.move_cursor(delta),
            Field::BumpCategories => self.bump_categories.move_cursor(delta),
            Field::BumpYears => self.bump_years.move_cursor(delta),
            Field::ScatterCategories => self.scatter_categories.move_cursor(delta),
        }
        if !field.is_multi() {
            self.refresh();
        }
    }

    /// Apply an edit to the multi-select under the cursor, if any.
    fn edit_multi(
        &mut self,
        on_keys: impl FnOnce(&mut MultiSelect<CategoryKey>),
        on_years: impl FnOnce(&mut MultiSelect<i32>),
    ) {
        match self.current_field() {
            Field::Products => on_keys(&mut self.products),
            Field::BumpCategories => on_keys(&mut self.bump_categories),
            Field::ScatterCategories => on_keys(&mut self.scatter_categories),
            Field::BumpYears => on_years(&mut self.bump_years),
            _ => return,
        }
        self.refresh();
    }

    fn request(&self) -> ChartRequest {
        match self.tab {
            Tab::Bar => ChartRequest::Bar(BarRequest {
                by: self.bar_by,
                total: self.bar_total,
                color_by_extremal: true,
            }),
            Tab::Stacked => ChartRequest::Stacked(StackedRequest {
                by: self.bar_by,
                total: self.bar_total,
                stack_by: Dimension::Product,
                included: self.products.selected(),
            }),
            Tab::Bump => ChartRequest::Bump(BumpRequest {
                by: self.bump_by,
                total: self.bump_total,
                included: self.bump_categories.selected(),
                years: self.bump_years.selected().into_iter().collect(),
            }),
            Tab::Scatter => ChartRequest::Scatter(ScatterRequest {
                x: self.scatter_x,
                y: self.scatter_y,
                category: self.scatter_category,
                included: self.scatter_categories.selected(),
            }),
        }
    }

    fn refresh(&mut self) {
        let request = self.request();
        self.view = render(&self.table, &request);
        self.prompt = prompt_message(&request, &self.view);
        debug!(tab = self.tab.title(), prompt = ?self.prompt, "view refreshed");
    }

    fn export_current(&mut self) {
        let Selection::Ready(view) = &self.view else {
            self.status = "Nothing to export.".to_string();
            return;
        };
        let path = PathBuf::from(format!("findash-{}.csv", self.tab.title().to_lowercase().replace(' ', "-")));
        match crate::app::export_table(&path, &view.table) {
            Ok(()) => self.status = format!("Exported {}", path.display()),
            Err(err) => {
                warn!(%err, "export failed");
                self.status = format!("Export failed: {err}");
            }
        }
    }

    fn field_label(&self, field: Field) -> String {
        match field {
            Field::BarBy => format!("For each: {}", self.bar_by),
            Field::BarTotal => format!("Total amount of: {}", self.bar_total),
            Field::Products => format!("Products: {}", self.products.summary()),
            Field::BumpBy => format!("X axis: {}", self.bump_by),
            Field::BumpTotal => format!("Y axis: {}", self.bump_total),
            Field::BumpCategories => format!("Subcategories: {}", self.bump_categories.summary()),
            Field::BumpYears => format!("Years: {}", self.bump_years.summary()),
            Field::ScatterX => format!("X axis: {}", self.scatter_x),
            Field::ScatterY => format!("Y axis: {}", self.scatter_y),
            Field::ScatterCategory => format!("Category: {}", self.scatter_category),
            Field::ScatterCategories => format!("Subcategories: {}", self.scatter_categories.summary()),
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title(Span::styled(
            " findash: company finances ",
            Style::default().fg(Color::Cyan),
        ));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1)])
            .split(inner);

        let tabs = Tabs::new(
            Tab::ALL
                .iter()
                .enumerate()
                .map(|(i, t)| format!("{} {}", i + 1, t.title())),
        )
        .select(self.tab.index())
        .highlight_style(Style::default().fg(Color::Black).bg(Color::White));
        frame.render_widget(tabs, rows[0]);

        let years = self.table.years();
        let span = match (years.first(), years.last()) {
            (Some(a), Some(b)) if a != b => format!("{a}-{b}"),
            (Some(a), _) => a.to_string(),
            _ => "-".to_string(),
        };
        let info = Paragraph::new(Line::from(Span::styled(
            format!("records: {} | years: {span}", self.table.len()),
            Style::default().fg(Color::Gray),
        )));
        frame.render_widget(info, rows[1]);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(10)])
            .split(area);

        self.draw_chart(frame, chunks[0]);
        self.draw_settings(frame, chunks[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let title = match &self.view {
            Selection::Ready(view) => format!(" {} ", view.chart.title),
            _ => format!(" {} ", self.tab.title()),
        };
        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Selection::Ready(view) = &self.view else {
            let msg = self.prompt.clone().unwrap_or_default();
            let p = Paragraph::new(msg)
                .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
                .wrap(Wrap { trim: true });
            frame.render_widget(p, inner);
            return;
        };

        let narrative_height = view.narrative.as_ref().map_or(0, |n| n.lines().count() as u16 + 1);
        let legend = legend_line(&view.chart);
        let legend_height = u16::from(legend.is_some());

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(narrative_height),
                Constraint::Length(legend_height),
                Constraint::Min(0),
            ])
            .split(inner);

        if let Some(narrative) = &view.narrative {
            let text = Text::from(narrative.lines().map(|l| Line::from(l.to_string())).collect::<Vec<_>>());
            frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }), chunks[0]);
        }
        if let Some(legend) = legend {
            frame.render_widget(Paragraph::new(legend).alignment(Alignment::Right), chunks[1]);
        }

        let plot_area = chunks[2];
        let Some((x_bounds, y_bounds)) = chart_bounds(&view.chart) else {
            frame.render_widget(
                Paragraph::new("No rows match the current selection.").style(Style::default().fg(Color::Yellow)),
                plot_area,
            );
            return;
        };

        let (chart_rect, insets) = chart_layout(plot_area);
        frame.render_widget(
            DashboardChart {
                chart: &view.chart,
                x_bounds,
                y_bounds,
            },
            chart_rect,
        );
        if insets.is_some() {
            draw_axis_titles(frame, plot_area, chart_rect, &view.chart);
        }
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);

        let items: Vec<ListItem> = self
            .tab
            .fields()
            .iter()
            .map(|f| ListItem::new(self.field_label(*f)))
            .collect();
        let list = List::new(items)
            .block(Block::default().title("Settings").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");
        let mut state = ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, chunks[0], &mut state);

        let (items, cursor) = match self.current_field() {
            Field::Products => (self.products.items(), self.products.cursor),
            Field::BumpCategories => (self.bump_categories.items(), self.bump_categories.cursor),
            Field::BumpYears => (self.bump_years.items(), self.bump_years.cursor),
            Field::ScatterCategories => (self.scatter_categories.items(), self.scatter_categories.cursor),
            _ => {
                let hint = Paragraph::new("←/→ to change")
                    .style(Style::default().fg(Color::Gray))
                    .block(Block::default().title("Options").borders(Borders::ALL));
                frame.render_widget(hint, chunks[1]);
                return;
            }
        };
        let list = List::new(items)
            .block(Block::default().title("Options").borders(Borders::ALL))
            .highlight_style(Style::default().add_modifier(Modifier::BOLD))
            .highlight_symbol("» ");
        let mut state = ListState::default();
        state.select(Some(cursor));
        frame.render_stateful_widget(list, chunks[1], &mut state);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "Tab/1-4 view  ↑/↓ field  ←/→ change  space toggle  a all  n none  e export  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn legend_line(chart: &ChartSpec) -> Option<Line<'static>> {
    if chart.options.legend == LegendPosition::Hidden {
        return None;
    }

    if let ChartBody::Categorical { highlights, series, .. } = &chart.body {
        if series.len() == 1 && !highlights.is_empty() {
            return Some(Line::from(vec![
                Span::styled("■ highest  ", Style::default().fg(Color::Green)),
                Span::styled("■ lowest", Style::default().fg(Color::Red)),
            ]));
        }
    }

    let names = chart.series_names();
    if names.len() < 2 && !matches!(chart.body, ChartBody::Scatter { .. }) {
        return None;
    }
    let spans = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let (r, g, b) = series_rgb(i);
            Span::styled(format!("■ {name}  "), Style::default().fg(Color::Rgb(r, g, b)))
        })
        .collect::<Vec<_>>();
    Some(Line::from(spans))
}

fn cycle_index(current: usize, len: usize, delta: i32) -> usize {
    (current as i64 + i64::from(delta)).rem_euclid(len as i64) as usize
}

fn cycle<T: Copy + PartialEq>(options: &[T], current: T, delta: i32) -> T {
    let idx = options.iter().position(|o| *o == current).unwrap_or(0);
    options[cycle_index(idx, options.len(), delta)]
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets { left: 1, bottom: 1 };

    if inner.width <= insets.left + 20 || inner.height <= insets.bottom + 8 {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + 1,
        width: inner.width - insets.left,
        height: inner.height - 1 - insets.bottom,
    };

    (rect, Some(insets))
}

fn draw_axis_titles(frame: &mut ratatui::Frame<'_>, inner: Rect, chart: Rect, spec: &ChartSpec) {
    let x_label = Paragraph::new(spec.options.x_label.as_str())
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        frame.render_widget(x_label, x_rect);
    }

    let y_label = Paragraph::new(spec.options.y_label.as_str())
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: inner.width.min(30),
        height: 1,
    };
    frame.render_widget(y_label, y_rect);
}
