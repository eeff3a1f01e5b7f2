//! Ratatui-based dashboard.
//!
//! Left column: date range and region/area selections. Right column: the
//! rate chart for the filtered view and the forecast table (always computed
//! from the full history). Header shows the summary metrics.

use std::collections::BTreeSet;
use std::io;
use std::path::Path;
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
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

use crate::app::cache::{CacheStatus, DatasetCache};
use crate::app::pipeline::{ViewOutput, build_view, resolve_filter};
use crate::domain::{FilterSpec, ForecastOutcome, RunConfig};
use crate::error::AppError;
use crate::io::export::DEFAULT_EXPORT_NAME;
use crate::schema::Normalized;

mod plotters_chart;

use plotters_chart::RatesChart;

/// Start the TUI.
pub fn run(config: RunConfig) -> Result<(), AppError> {
    // Load before touching the terminal so errors print normally.
    let mut app = App::new(config)?;

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
enum Panel {
    Dates,
    Regions,
    Areas,
}

impl Panel {
    fn next(self) -> Self {
        match self {
            Panel::Dates => Panel::Regions,
            Panel::Regions => Panel::Areas,
            Panel::Areas => Panel::Dates,
        }
    }
}

struct App {
    config: RunConfig,
    cache: DatasetCache,
    data: Arc<Normalized>,
    filter: FilterSpec,
    regions: Vec<String>,
    areas: Vec<String>,
    focus: Panel,
    /// Cursor within the focused panel (0 = start, 1 = end for dates).
    cursor: [usize; 3],
    editing: Option<String>,
    status: String,
    view: Option<ViewOutput>,
}

impl App {
    fn new(config: RunConfig) -> Result<Self, AppError> {
        let mut cache = DatasetCache::new();
        let (data, _) = cache.load(&config.data_path)?;
        let filter = resolve_filter(&data.dataset, &config)?;

        let mut app = Self {
            regions: data.dataset.regions(),
            areas: data.dataset.areas(),
            config,
            cache,
            data,
            filter,
            focus: Panel::Dates,
            cursor: [0; 3],
            editing: None,
            status: String::new(),
            view: None,
        };
        app.rebuild();
        app.status = format!(
            "Loaded {} rows ({} dropped: bad date).",
            app.data.report.rows_kept,
            app.data.report.dropped_dates.len()
        );
        Ok(app)
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
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))? {
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
        if self.editing.is_some() {
            self.handle_date_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::Up => self.move_cursor(-1),
            KeyCode::Down => self.move_cursor(1),
            KeyCode::Enter if self.focus == Panel::Dates => {
                let current = self.selected_date();
                self.editing = Some(current.format("%Y-%m-%d").to_string());
                self.status = "Editing date (YYYY-MM-DD). Enter to apply, Esc to cancel.".to_string();
            }
            KeyCode::Char(' ') | KeyCode::Enter => self.toggle_selected(),
            KeyCode::Char('a') => self.select_all(),
            KeyCode::Char('e') => self.export(),
            KeyCode::Char('r') => self.reload(),
            _ => {}
        }
        false
    }

    fn handle_date_edit(&mut self, code: KeyCode) {
        let Some(buf) = self.editing.as_mut() else {
            return;
        };
        match code {
            KeyCode::Esc => {
                self.editing = None;
                self.status = "Date edit canceled.".to_string();
            }
            KeyCode::Enter => {
                let input = buf.trim().to_string();
                self.editing = None;
                self.apply_date_input(&input);
            }
            KeyCode::Backspace => {
                buf.pop();
            }
            KeyCode::Char(c) if c.is_ascii_digit() || c == '-' || c == '/' => buf.push(c),
            _ => {}
        }
    }

    fn apply_date_input(&mut self, input: &str) {
        let Some(date) = crate::schema::parse_date(input) else {
            self.status = format!("Invalid date '{input}'.");
            return;
        };
        if self.cursor[0] == 0 {
            self.filter.start_date = date;
        } else {
            self.filter.end_date = date;
        }
        if self.filter.start_date > self.filter.end_date {
            self.status = "Start is after end: the view is empty.".to_string();
        } else {
            self.status = format!("Range: {} .. {}", self.filter.start_date, self.filter.end_date);
        }
        self.rebuild();
    }

    fn selected_date(&self) -> NaiveDate {
        if self.cursor[0] == 0 {
            self.filter.start_date
        } else {
            self.filter.end_date
        }
    }

    fn panel_len(&self, panel: Panel) -> usize {
        match panel {
            Panel::Dates => 2,
            Panel::Regions => self.regions.len(),
            Panel::Areas => self.areas.len(),
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.panel_len(self.focus);
        if len == 0 {
            return;
        }
        let idx = self.focus as usize;
        let cur = self.cursor[idx] as isize;
        self.cursor[idx] = (cur + delta).clamp(0, len as isize - 1) as usize;
    }

    fn toggle_selected(&mut self) {
        let idx = self.focus as usize;
        let (values, set) = match self.focus {
            Panel::Dates => return,
            Panel::Regions => (&self.regions, &mut self.filter.regions),
            Panel::Areas => (&self.areas, &mut self.filter.areas),
        };
        let Some(value) = values.get(self.cursor[idx]) else {
            return;
        };
        if !set.remove(value) {
            set.insert(value.clone());
        }
        self.rebuild();
    }

    fn select_all(&mut self) {
        match self.focus {
            Panel::Dates => {
                if let Some(all) = crate::filter::select_all(&self.data.dataset) {
                    self.filter.start_date = all.start_date;
                    self.filter.end_date = all.end_date;
                }
            }
            Panel::Regions => self.filter.regions.clear(),
            Panel::Areas => self.filter.areas.clear(),
        }
        self.status = "Selection reset.".to_string();
        self.rebuild();
    }

    fn export(&mut self) {
        let Some(view) = &self.view else {
            self.status = "Nothing to export.".to_string();
            return;
        };
        let path = Path::new(DEFAULT_EXPORT_NAME);
        self.status = match crate::io::export::write_dataset_csv(path, &view.view) {
            Ok(()) => format!("Wrote {} rows to {}", view.view.len(), path.display()),
            Err(err) => format!("Export failed: {err}"),
        };
    }

    fn reload(&mut self) {
        match self.cache.load(&self.config.data_path) {
            Ok((_, CacheStatus::Hit)) => self.status = "File unchanged.".to_string(),
            Ok((data, CacheStatus::Miss)) => {
                self.regions = data.dataset.regions();
                self.areas = data.dataset.areas();
                self.cursor = [self.cursor[0], 0, 0];
                self.filter.regions.retain(|r| self.regions.contains(r));
                self.filter.areas.retain(|a| self.areas.contains(a));
                self.data = data;
                self.status = format!("Reloaded {} rows.", self.data.report.rows_kept);
                self.rebuild();
            }
            Err(err) => self.status = format!("Reload failed: {err}"),
        }
    }

    fn rebuild(&mut self) {
        match build_view(&self.data.dataset, self.filter.clone(), self.config.horizon_months) {
            Ok(view) => self.view = Some(view),
            Err(err) => {
                self.view = None;
                self.status = format!("{err}");
            }
        }
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
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
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("lt", Style::default().fg(Color::Cyan)),
            Span::raw(format!(" - {}", self.config.data_path.display())),
        ]));

        let metrics = match &self.view {
            Some(v) => {
                let mut parts = vec![
                    format!("data points: {}", v.summary.count),
                    format!(
                        "avg rate: {}",
                        v.summary.mean_rate.map(|m| format!("{m:.2}%")).unwrap_or_else(|| "-".to_string())
                    ),
                ];
                if v.view.has_column(&crate::domain::Column::Employed) {
                    parts.push(format!(
                        "avg employed: {}",
                        v.summary.mean_employed.map(|m| format!("{m:.0}")).unwrap_or_else(|| "-".to_string())
                    ));
                }
                parts.join(" | ")
            }
            None => "-".to_string(),
        };
        lines.push(Line::from(Span::styled(metrics, Style::default().fg(Color::Gray))));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(32), Constraint::Min(0)])
            .split(area);

        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(3), Constraint::Length(6)])
            .split(cols[0]);
        self.draw_dates(frame, left[0]);
        self.draw_choices(frame, left[1], Panel::Regions, "Regions", &self.regions, &self.filter.regions);
        self.draw_choices(frame, left[2], Panel::Areas, "Areas", &self.areas, &self.filter.areas);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(10)])
            .split(cols[1]);
        self.draw_chart(frame, right[0]);
        self.draw_forecast(frame, right[1]);
    }

    fn panel_block(&self, panel: Panel, title: &str) -> Block<'static> {
        let style = if self.focus == panel {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        Block::default()
            .title(title.to_string())
            .borders(Borders::ALL)
            .border_style(style)
    }

    fn draw_dates(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let fmt = |label: &str, idx: usize, date: NaiveDate| match (&self.editing, self.cursor[0] == idx) {
            (Some(buf), true) => format!("{label}: {buf}_"),
            _ => format!("{label}: {date}"),
        };
        let items = vec![
            ListItem::new(fmt("Start", 0, self.filter.start_date)),
            ListItem::new(fmt("End  ", 1, self.filter.end_date)),
        ];
        let list = List::new(items)
            .block(self.panel_block(Panel::Dates, "Date range"))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        if self.focus == Panel::Dates {
            state.select(Some(self.cursor[0]));
        }
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_choices(
        &self,
        frame: &mut ratatui::Frame<'_>,
        area: Rect,
        panel: Panel,
        title: &str,
        values: &[String],
        selected: &BTreeSet<String>,
    ) {
        let title = if selected.is_empty() {
            format!("{title} (all)")
        } else {
            format!("{title} ({} selected)", selected.len())
        };
        let block = self.panel_block(panel, &title);

        if values.is_empty() {
            let p = Paragraph::new("(column not present)")
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(p, area);
            return;
        }

        let items: Vec<ListItem> = values
            .iter()
            .map(|v| {
                let mark = if selected.contains(v) { "[x]" } else { "[ ]" };
                ListItem::new(format!("{mark} {v}"))
            })
            .collect();
        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

        let mut state = ListState::default();
        if self.focus == panel {
            state.select(Some(self.cursor[panel as usize]));
        }
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Unemployment rate").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(view) = &self.view else {
            frame.render_widget(
                Paragraph::new("No data.").style(Style::default().fg(Color::Yellow)),
                inner,
            );
            return;
        };

        let Some(chart) = chart_series(view, &self.config) else {
            frame.render_widget(
                Paragraph::new("No rates in the selected view.").style(Style::default().fg(Color::Yellow)),
                inner,
            );
            return;
        };

        let widget = RatesChart {
            series: &chart.series,
            forecast: &chart.forecast,
            x_origin: chart.origin,
            x_bounds: chart.x_bounds,
            y_bounds: chart.y_bounds,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_forecast(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Trend forecast (full history)").borders(Borders::ALL);
        let lines: Vec<Line> = match self.view.as_ref().map(|v| &v.forecast) {
            Some(ForecastOutcome::Forecast(result)) => {
                let mut lines = vec![Line::from(Span::styled(
                    format!(
                        "slope {:+.4}/30d, n={}",
                        result.model.slope * 30.0,
                        result.n_points
                    ),
                    Style::default().fg(Color::Gray),
                ))];
                lines.extend(
                    result
                        .points
                        .iter()
                        .map(|p| Line::from(format!("{}  {:>8.2}", p.date, p.predicted_rate))),
                );
                lines
            }
            Some(ForecastOutcome::InsufficientData { required, .. }) => vec![Line::from(format!(
                "Not enough data for forecasting (need >{} rows).",
                required - 1
            ))],
            None => vec![Line::from("-")],
        };
        frame.render_widget(Paragraph::new(Text::from(lines)).block(block), area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "Tab panel  ↑/↓ move  Space toggle  Enter edit date  a all  e export  r reload  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Chart-ready series: x is days since `origin`.
struct ChartData {
    origin: NaiveDate,
    series: Vec<Vec<(f64, f64)>>,
    forecast: Vec<(f64, f64)>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

fn chart_series(view: &ViewOutput, config: &RunConfig) -> Option<ChartData> {
    let by = crate::app::chart_grouping(&view.view, config);
    let groups = view.view.grouped_rate_series(by);

    let forecast_pts: Vec<(NaiveDate, f64)> = view
        .forecast
        .as_forecast()
        .map(|f| f.points.iter().map(|p| (p.date, p.predicted_rate)).collect())
        .unwrap_or_default();

    let origin = groups.iter().flat_map(|(_, s)| s.iter().map(|(d, _)| *d)).min()?;
    let day = |d: NaiveDate| (d - origin).num_days() as f64;

    let series: Vec<Vec<(f64, f64)>> = groups
        .iter()
        .map(|(_, s)| s.iter().map(|&(d, y)| (day(d), y)).collect())
        .collect();
    let forecast: Vec<(f64, f64)> = forecast_pts.iter().map(|&(d, y)| (day(d), y)).collect();

    let (mut x_max, mut y_min, mut y_max) = (1.0_f64, f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in series.iter().flatten().chain(forecast.iter()) {
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if !y_min.is_finite() || !y_max.is_finite() || y_max <= y_min {
        y_min -= 1.0;
        y_max += 1.0;
    }
    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);

    Some(ChartData {
        origin,
        series,
        forecast,
        x_bounds: [0.0, x_max],
        y_bounds: [y_min - pad, y_max + pad],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ForecastPoint, ForecastResult, Summary, TrendModel};
    use crate::io::ingest::RawTable;
    use crate::schema::normalize;

    #[test]
    fn chart_series_aligns_forecast_to_view_origin() {
        let ds = normalize(&RawTable::new(
            vec!["date".into(), "estimated_unemployment_rate".into(), "area".into()],
            vec![
                vec!["2020-01-01".into(), "5.0".into(), "Rural".into()],
                vec!["2020-01-11".into(), "6.0".into(), "Urban".into()],
            ],
        ))
        .unwrap();
        let origin = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let view = ViewOutput {
            filter: FilterSpec::new(origin, origin),
            view: ds,
            summary: Summary {
                count: 2,
                mean_rate: Some(5.5),
                mean_employed: None,
            },
            forecast: ForecastOutcome::Forecast(ForecastResult {
                model: TrendModel {
                    slope: 0.1,
                    intercept: 5.0,
                    time_origin: origin,
                },
                n_points: 11,
                last_observed: NaiveDate::from_ymd_opt(2020, 1, 11).unwrap(),
                points: vec![ForecastPoint {
                    date: NaiveDate::from_ymd_opt(2020, 2, 11).unwrap(),
                    predicted_rate: 9.1,
                }],
            }),
        };

        let chart = chart_series(&view, &RunConfig::new("x.csv")).unwrap();
        assert_eq!(chart.origin, origin);
        assert_eq!(chart.series.len(), 2);
        assert_eq!(chart.forecast, vec![(41.0, 9.1)]);
        assert_eq!(chart.x_bounds, [0.0, 41.0]);
        assert!(chart.y_bounds[0] < 5.0 && chart.y_bounds[1] > 9.1);
    }
}
