//! Ratatui-based terminal UI.
//!
//! Two tabs:
//! - **Forecast**: cutoff editor, model/frequency selectors, forecast trigger,
//!   actual-vs-predicted chart and comparison table
//! - **Data**: exploration tables of the loaded source tables
//!
//! Pipeline errors never end the session; they are shown in the status bar.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
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
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};
use tracing::{info, warn};

use crate::app::pipeline::{DataCache, ForecastOutput, ForecastPass, LoadedData};
use crate::domain::{DailySeries, DashboardConfig, ForecastRow};
use crate::error::{AppError, PipelineError};
use crate::io::{export_source_tables, parse_date, write_comparison_csv, write_run_json};
use crate::report::format::{format_comparison, format_data_overview, format_search_trace};
use crate::report::resample;
use crate::series::aggregate_daily;

mod plotters_chart;

use plotters_chart::SalesChart;

/// Number of training days drawn before the test window.
const HISTORY_DAYS: usize = 60;

/// Families listed on the Data tab.
const TOP_FAMILIES: usize = 20;

const SETTINGS_FIELDS: usize = 3;

/// Start the TUI.
pub fn run(config: DashboardConfig) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(config);
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
    Forecast,
    Data,
}

struct App {
    config: DashboardConfig,
    cache: DataCache,
    data: Option<LoadedData>,
    series: DailySeries,
    overview: String,
    output: Option<ForecastOutput>,
    tab: Tab,
    selected_field: usize,
    editing_date: bool,
    date_input: String,
    data_scroll: u16,
    status: String,
}

impl App {
    fn new(config: DashboardConfig) -> Self {
        let mut app = Self {
            config,
            cache: DataCache::new(),
            data: None,
            series: DailySeries::default(),
            overview: String::new(),
            output: None,
            tab: Tab::Forecast,
            selected_field: 0,
            editing_date: false,
            date_input: String::new(),
            data_scroll: 0,
            status: String::new(),
        };
        app.reload_data();
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

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.editing_date {
            self.handle_date_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Tab => {
                self.tab = match self.tab {
                    Tab::Forecast => Tab::Data,
                    Tab::Data => Tab::Forecast,
                };
            }
            KeyCode::Up => match self.tab {
                Tab::Forecast => self.selected_field = self.selected_field.saturating_sub(1),
                Tab::Data => self.data_scroll = self.data_scroll.saturating_sub(1),
            },
            KeyCode::Down => match self.tab {
                Tab::Forecast => {
                    self.selected_field = (self.selected_field + 1).min(SETTINGS_FIELDS - 1);
                }
                Tab::Data => self.data_scroll = self.data_scroll.saturating_add(1),
            },
            KeyCode::PageUp => self.data_scroll = self.data_scroll.saturating_sub(10),
            KeyCode::PageDown => self.data_scroll = self.data_scroll.saturating_add(10),
            KeyCode::Left => self.adjust_field(-1),
            KeyCode::Right => self.adjust_field(1),
            KeyCode::Enter if self.selected_field == 0 && self.tab == Tab::Forecast => {
                self.editing_date = true;
                self.date_input = self.config.cutoff.to_string();
                self.status = "Editing cutoff (YYYY-MM-DD). Enter to apply, Esc to cancel.".to_string();
            }
            KeyCode::Enter | KeyCode::Char('f') => self.trigger_forecast(),
            KeyCode::Char('m') => self.set_model(self.config.model.next()),
            KeyCode::Char('w') => self.cycle_frequency(),
            KeyCode::Char('e') => self.export_tables(),
            KeyCode::Char('x') => self.export_comparison(),
            KeyCode::Char('d') => self.write_debug(),
            KeyCode::Char('c') => {
                self.cache.clear();
                self.reload_data();
            }
            _ => {}
        }

        false
    }

    fn handle_date_edit(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.editing_date = false;
                self.status = "Cutoff edit canceled.".to_string();
            }
            KeyCode::Enter => {
                self.editing_date = false;
                self.apply_date_input();
            }
            KeyCode::Backspace => {
                self.date_input.pop();
            }
            KeyCode::Char(c) => {
                if c.is_ascii_digit() || c == '-' || c == '/' {
                    self.date_input.push(c);
                }
            }
            _ => {}
        }
    }

    fn adjust_field(&mut self, delta: i64) {
        if self.tab != Tab::Forecast {
            return;
        }
        match self.selected_field {
            0 => {
                // Left/Right move the cutoff by a week.
                if let Some(cutoff) = self.config.cutoff.checked_add_signed(chrono::Duration::days(7 * delta)) {
                    self.set_cutoff(cutoff);
                }
            }
            1 => self.set_model(self.config.model.next()),
            2 => self.cycle_frequency(),
            _ => {}
        }
    }

    fn apply_date_input(&mut self) {
        match parse_date(&self.date_input) {
            Ok(cutoff) => self.set_cutoff(cutoff),
            Err(e) => self.status = format!("Invalid cutoff: {e}"),
        }
    }

    fn set_cutoff(&mut self, cutoff: NaiveDate) {
        self.config.cutoff = cutoff;
        self.output = None;
        self.status = format!("cutoff: {cutoff} (f to forecast)");
    }

    fn set_model(&mut self, model: crate::domain::ModelKind) {
        self.config.model = model;
        self.output = None;
        self.status = format!("model: {} (f to forecast)", model.display_name());
    }

    fn cycle_frequency(&mut self) {
        self.config.frequency = self.config.frequency.next();
        self.status = format!("view: {}", self.config.frequency.label());
    }

    fn reload_data(&mut self) {
        self.output = None;
        match self.cache.load(&self.config) {
            Ok(data) => {
                self.series = aggregate_daily(&data.sales);
                self.overview = format_data_overview(&data.sales, &data.stores, &data.holidays, TOP_FAMILIES);
                self.status = format!(
                    "Loaded {} sales rows, {} days. Press f to forecast.",
                    data.sales.len(),
                    self.series.len()
                );
                self.data = Some(data);
            }
            Err(err) => self.report_error("load", &err),
        }
    }

    fn trigger_forecast(&mut self) {
        // Cheap cache hit unless the sales file changed since the last pass.
        match self.cache.forecast(&self.config) {
            Ok(ForecastPass { data, series, output }) => {
                let reloaded = self
                    .data
                    .as_ref()
                    .is_none_or(|prev| {
                        !Arc::ptr_eq(&prev.sales, &data.sales)
                            || !Arc::ptr_eq(&prev.stores, &data.stores)
                            || !Arc::ptr_eq(&prev.holidays, &data.holidays)
                    });
                if reloaded {
                    self.overview = format_data_overview(&data.sales, &data.stores, &data.holidays, TOP_FAMILIES);
                }
                self.series = series;
                self.data = Some(data);

                let acc = output
                    .run
                    .accuracy
                    .and_then(|a| a.mape)
                    .map(|m| format!("MAPE {m:.2}%"))
                    .unwrap_or_else(|| "no test days".to_string());
                self.status = format!("{} | {acc}", output.run.model_summary);
                self.output = Some(output);
            }
            Err(err) => {
                self.output = None;
                self.report_error("forecast", &err);
            }
        }
    }

    fn report_error(&mut self, stage: &str, err: &PipelineError) {
        warn!(stage, error = %err, "pipeline error");
        self.status = format!("{stage} failed: {err}");
    }

    fn export_tables(&mut self) {
        let Some(data) = &self.data else {
            self.status = "No data loaded.".to_string();
            return;
        };
        match export_source_tables(&self.config.export_dir, &data.sales, &data.stores, &data.holidays) {
            Ok(paths) => self.status = format!("Exported {} table(s) to {}", paths.len(), self.config.export_dir.display()),
            Err(err) => self.report_error("export", &err),
        }
    }

    fn run_file_stem(&self) -> Option<String> {
        self.output
            .as_ref()
            .map(|o| format!("comparison_{}_{}", o.run.model.short_name(), o.run.cutoff))
    }

    fn export_comparison(&mut self) {
        let (Some(output), Some(stem)) = (&self.output, self.run_file_stem()) else {
            self.status = "Nothing to export yet (f to forecast).".to_string();
            return;
        };
        let csv_path: PathBuf = self.config.export_dir.join(format!("{stem}.csv"));
        let json_path: PathBuf = self.config.export_dir.join(format!("{stem}.json"));

        let result = std::fs::create_dir_all(&self.config.export_dir)
            .map_err(|e| PipelineError::io(&self.config.export_dir, e))
            .and_then(|_| write_comparison_csv(&csv_path, &output.run.rows))
            .and_then(|_| write_run_json(&json_path, &output.run));
        match result {
            Ok(()) => {
                info!(csv = %csv_path.display(), json = %json_path.display(), "exported comparison");
                self.status = format!("Wrote {} and {}", csv_path.display(), json_path.display());
            }
            Err(err) => self.report_error("export", &err),
        }
    }

    fn write_debug(&mut self) {
        match crate::debug::write_debug_bundle(&self.config, self.output.as_ref(), &self.series) {
            Ok(path) => self.status = format!("Wrote debug bundle: {}", path.display()),
            Err(err) => self.status = format!("Debug write failed: {err}"),
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        match self.tab {
            Tab::Forecast => self.draw_forecast_tab(frame, chunks[1]),
            Tab::Data => self.draw_data_tab(frame, chunks[1]),
        }
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let tab_style = |t: Tab| {
            if t == self.tab {
                Style::default().fg(Color::Black).bg(Color::Cyan)
            } else {
                Style::default().fg(Color::Gray)
            }
        };

        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("salesdash", Style::default().fg(Color::Cyan)),
            Span::raw(" - store sales forecast vs actual   "),
            Span::styled(" Forecast ", tab_style(Tab::Forecast)),
            Span::raw(" "),
            Span::styled(" Data ", tab_style(Tab::Data)),
        ]));

        let range = match (self.series.first_date(), self.series.last_date()) {
            (Some(a), Some(b)) => format!("{a} .. {b}"),
            _ => "-".to_string(),
        };
        let rows = self.data.as_ref().map(|d| d.sales.len()).unwrap_or(0);
        let (hits, misses) = self.cache.sales_stats();
        lines.push(Line::from(Span::styled(
            format!(
                "file: {} | rows: {rows} | days: {} | range: {range} | cache: {hits} hit / {misses} miss",
                self.config.sales_path.display(),
                self.series.len(),
            ),
            Style::default().fg(Color::Gray),
        )));

        if let Some(output) = &self.output {
            let run = &output.run;
            let acc = run
                .accuracy
                .map(|a| {
                    format!(
                        "MAE={:.1} RMSE={:.1} MAPE={}",
                        a.mae,
                        a.rmse,
                        a.mape.map(|m| format!("{m:.2}%")).unwrap_or_else(|| "n/a".to_string())
                    )
                })
                .unwrap_or_else(|| "no test days".to_string());
            lines.push(Line::from(Span::styled(
                format!("train: {} days | test: {} days | {acc}", run.train_days, run.test_days),
                Style::default().fg(Color::Gray),
            )));
        }

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_forecast_tab(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(7)])
            .split(area);
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(64), Constraint::Percentage(36)])
            .split(rows[0]);

        self.draw_chart(frame, cols[0]);
        self.draw_table(frame, cols[1]);
        self.draw_settings(frame, rows[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let title = format!("Actual vs predicted ({})", self.config.frequency.label());
        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(output) = &self.output else {
            let msg = Paragraph::new("Press f to run the forecast.")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default());
            frame.render_widget(msg, inner);
            return;
        };

        let rows = resample(&output.run.rows, self.config.frequency);
        let history = if self.config.frequency == crate::domain::Frequency::Daily {
            history_tail(&output.train, HISTORY_DAYS)
        } else {
            Vec::new()
        };
        let Some((actual, predicted, x_bounds, y_bounds)) = chart_series(&rows, &history) else {
            let msg = Paragraph::new("Test partition is empty (cutoff after the last date).")
                .style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };

        let (chart_rect, insets) = chart_layout(inner);
        let widget = SalesChart {
            history: &history,
            actual: &actual,
            predicted: &predicted,
            x_bounds,
            y_bounds,
            x_label: "date",
            y_label: "sales".to_string(),
            fmt_x: fmt_axis_date,
            fmt_y: fmt_axis_sales,
        };

        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(frame, inner, chart_rect, insets, x_bounds, y_bounds);
        }
    }

    fn draw_table(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let text = match &self.output {
            Some(output) => {
                let mut s = format_comparison(&output.run.rows, self.config.frequency);
                let trace = format_search_trace(&output.run.search_trace);
                if !trace.is_empty() {
                    s.push('\n');
                    s.push_str(&trace);
                }
                s
            }
            None => String::new(),
        };
        let p = Paragraph::new(text).block(Block::default().title("Comparison").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let cutoff_label = if self.editing_date {
            format!("{}_", self.date_input)
        } else {
            self.config.cutoff.to_string()
        };

        let items = vec![
            ListItem::new(format!("Cutoff: {cutoff_label}")),
            ListItem::new(format!("Model: {}", self.config.model.display_name())),
            ListItem::new(format!("View: {}", self.config.frequency.label())),
        ];

        let list = List::new(items)
            .block(Block::default().title("Settings").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);

        if self.editing_date {
            let hint = Paragraph::new("Editing cutoff…")
                .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
            let rect = Rect {
                x: area.x + 2,
                y: area.y + area.height.saturating_sub(2),
                width: area.width.saturating_sub(4),
                height: 1,
            };
            frame.render_widget(hint, rect);
        }
    }

    fn draw_data_tab(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let body = if self.overview.is_empty() {
            "No data loaded.".to_string()
        } else {
            self.overview.clone()
        };
        let p = Paragraph::new(body)
            .scroll((self.data_scroll, 0))
            .block(Block::default().title("Data overview").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "Tab view  ↑/↓ select  ←/→ adjust  Enter edit/run  f forecast  m model  w view  e/x export  d debug  c reload  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn x_of(date: NaiveDate) -> f64 {
    use chrono::Datelike;
    date.num_days_from_ce() as f64
}

fn history_tail(train: &DailySeries, n: usize) -> Vec<(f64, f64)> {
    let points = train.points();
    points[points.len().saturating_sub(n)..]
        .iter()
        .map(|p| (x_of(p.date), p.total_sales))
        .collect()
}

type Series = Vec<(f64, f64)>;

/// Chart series and bounds; `None` when there is nothing to plot.
fn chart_series(rows: &[ForecastRow], history: &[(f64, f64)]) -> Option<(Series, Series, [f64; 2], [f64; 2])> {
    if rows.is_empty() {
        return None;
    }
    let actual: Series = rows.iter().map(|r| (x_of(r.date), r.actual_sales)).collect();
    let predicted: Series = rows.iter().map(|r| (x_of(r.date), r.predicted_sales)).collect();

    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in history.iter().chain(&actual).chain(&predicted) {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        if y.is_finite() {
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
    }

    if x_max <= x_min {
        x_min -= 1.0;
        x_max += 1.0;
    }
    if !y_min.is_finite() || !y_max.is_finite() || y_max <= y_min {
        y_min = if y_min.is_finite() { y_min - 1.0 } else { 0.0 };
        y_max = if y_max.is_finite() { y_max + 1.0 } else { 1.0 };
    }
    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);

    Some((actual, predicted, [x_min, x_max], [y_min - pad, y_max + pad]))
}

fn fmt_axis_date(v: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(v.round() as i32)
        .map(|d| d.format("%y-%m-%d").to_string())
        .unwrap_or_default()
}

fn fmt_axis_sales(v: f64) -> String {
    let a = v.abs();
    if a >= 1e6 {
        format!("{:.1}M", v / 1e6)
    } else if a >= 1e3 {
        format!("{:.0}k", v / 1e3)
    } else {
        format!("{v:.0}")
    }
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 8,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10 || inner.height <= insets.top + insets.bottom + 5 {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
) {
    let ticks = 4usize;
    let style = Style::default().fg(Color::Gray);

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let x_val = x_bounds[0] + u * (x_bounds[1] - x_bounds[0]);
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label = fmt_axis_date(x_val);
        let label_len = label.len() as u16;
        let start = x
            .saturating_sub(label_len / 2)
            .min((inner.x + inner.width).saturating_sub(label_len));
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = y_bounds[0] + u * (y_bounds[1] - y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = fmt_axis_sales(y_val);
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label_len);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let x_label = Paragraph::new("date  (white: actual, cyan: predicted)")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        frame.render_widget(x_label, x_rect);
    }

    let y_label = Paragraph::new("sales").style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: insets.left.saturating_sub(1),
        height: 1,
    };
    frame.render_widget(y_label, y_rect);
}
