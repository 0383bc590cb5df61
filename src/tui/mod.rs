//! Ratatui-based terminal dashboard.
//!
//! Layout: KPI header, tab bar, a filter panel beside the active view, the
//! view's insight line, and a footer with key help and status. Every filter
//! change goes through `Session`, which recomputes the whole dashboard.

use std::io;
use std::path::Path;
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
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs},
};

use crate::app::session::Session;
use crate::domain::ViewKind;
use crate::drilldown::daily_totals;
use crate::error::AppError;
use crate::io::export::{DEFAULT_EXPORT_NAME, write_view_csv};
use crate::io::ingest::parse_date;
use crate::io::snapshot::{DEFAULT_SNAPSHOT_NAME, write_snapshot_json};
use crate::metrics::chart_labels;
use crate::query::{QueryResult, SqliteEvaluator};
use crate::report::{fmt_count, fmt_money};

mod plotters_chart;

use plotters_chart::TrendChart;

/// Tab bar entries, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    View(ViewKind),
    DataTable,
    Outliers,
    Drilldown,
}

const TABS: [Tab; 11] = [
    Tab::View(ViewKind::Monthly),
    Tab::View(ViewKind::Locations),
    Tab::View(ViewKind::Products),
    Tab::View(ViewKind::CategoryAov),
    Tab::View(ViewKind::Popularity),
    Tab::View(ViewKind::Hours),
    Tab::View(ViewKind::Weekdays),
    Tab::View(ViewKind::Coffee),
    Tab::DataTable,
    Tab::Outliers,
    Tab::Drilldown,
];

impl Tab {
    fn title(self) -> &'static str {
        match self {
            Tab::View(kind) => kind.title(),
            Tab::DataTable => "Data Table",
            Tab::Outliers => "Outliers",
            Tab::Drilldown => "Drilldown",
        }
    }
}

/// Filter panel fields, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    From,
    To,
    Locations,
    Categories,
}

const FIELDS: [Field; 4] = [Field::From, Field::To, Field::Locations, Field::Categories];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Mode {
    Normal,
    EditDate(Field, String),
    Query(String),
}

/// Rows moved per PageUp/PageDown in the data table.
const PAGE: usize = 10;

/// Start the dashboard on an already-loaded session.
pub fn run(session: Session) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::terminal(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(session);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::terminal(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::terminal(format!("Failed to enter alternate screen: {e}")));
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

struct App {
    session: Session,
    /// Every location/category in the dataset, in first-seen order.
    locations: Vec<String>,
    categories: Vec<String>,
    tab: usize,
    field: usize,
    location_cursor: usize,
    category_cursor: usize,
    product: usize,
    table_offset: usize,
    mode: Mode,
    query_result: Option<(String, QueryResult)>,
    status: String,
}

impl App {
    fn new(session: Session) -> Self {
        let locations = session.dataset().locations();
        let categories = session.dataset().categories();
        let status = format!(
            "Loaded {} rows from {}",
            fmt_count(session.dataset().len()),
            session.dataset().source
        );
        Self {
            session,
            locations,
            categories,
            tab: 0,
            field: 0,
            location_cursor: 0,
            category_cursor: 0,
            product: 0,
            table_offset: 0,
            mode: Mode::Normal,
            query_result: None,
            status,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::terminal(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::terminal(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::terminal(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => needs_redraw = true,
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the app should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match std::mem::replace(&mut self.mode, Mode::Normal) {
            Mode::EditDate(field, buf) => {
                self.handle_date_edit(field, buf, code);
                false
            }
            Mode::Query(buf) => {
                self.handle_query_input(buf, code);
                false
            }
            Mode::Normal => self.handle_normal_key(code),
        }
    }

    fn handle_normal_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Tab => self.switch_tab(1),
            KeyCode::BackTab => self.switch_tab(TABS.len() - 1),
            KeyCode::Up => self.field = self.field.saturating_sub(1),
            KeyCode::Down => self.field = (self.field + 1).min(FIELDS.len() - 1),
            KeyCode::Left => self.move_within_field(-1),
            KeyCode::Right => self.move_within_field(1),
            KeyCode::Char(' ') => self.toggle_at_cursor(),
            KeyCode::Enter => match FIELDS[self.field] {
                Field::From | Field::To => {
                    let field = FIELDS[self.field];
                    let current = self.current_date(field).map(|d| d.to_string()).unwrap_or_default();
                    self.mode = Mode::EditDate(field, current);
                    self.status = "Editing date (YYYY-MM-DD). Enter to apply, Esc to cancel.".to_string();
                }
                Field::Locations | Field::Categories => self.toggle_at_cursor(),
            },
            KeyCode::Char('a') => self.select_all_focused(true),
            KeyCode::Char('n') => self.select_all_focused(false),
            KeyCode::Char(']') => self.cycle_product(1),
            KeyCode::Char('[') => self.cycle_product(-1),
            KeyCode::PageDown => self.table_offset = self.table_offset.saturating_add(PAGE),
            KeyCode::PageUp => self.table_offset = self.table_offset.saturating_sub(PAGE),
            KeyCode::Home => self.table_offset = 0,
            KeyCode::Char('/') => {
                self.mode = Mode::Query(String::new());
                self.status = "Query df_filtered. Enter to run, Esc to cancel.".to_string();
            }
            KeyCode::Esc => {
                if self.query_result.take().is_some() {
                    self.status = "Query result closed.".to_string();
                }
            }
            KeyCode::Char('e') => self.export_csv(),
            KeyCode::Char('j') => self.export_json(),
            _ => {}
        }
        false
    }

    fn handle_date_edit(&mut self, field: Field, mut buf: String, code: KeyCode) {
        match code {
            KeyCode::Esc => self.status = "Date edit canceled.".to_string(),
            KeyCode::Enter => match parse_date(buf.trim()) {
                Some(date) => {
                    self.set_date(field, date);
                    self.status = format!("{} set to {date}", field_name(field));
                }
                None => self.status = format!("Invalid date '{}'", buf.trim()),
            },
            KeyCode::Backspace => {
                buf.pop();
                self.mode = Mode::EditDate(field, buf);
            }
            KeyCode::Char(c) if c.is_ascii_digit() || c == '-' || c == '/' => {
                buf.push(c);
                self.mode = Mode::EditDate(field, buf);
            }
            _ => self.mode = Mode::EditDate(field, buf),
        }
    }

    fn handle_query_input(&mut self, mut buf: String, code: KeyCode) {
        match code {
            KeyCode::Esc => self.status = "Query canceled.".to_string(),
            KeyCode::Enter => {
                let sql = buf.trim().to_string();
                match self.session.query(&SqliteEvaluator, &sql) {
                    Ok(result) => {
                        self.status = format!("Query returned {} row(s). Esc closes.", result.rows.len());
                        self.query_result = Some((sql, result));
                    }
                    Err(err) => {
                        self.status = format!("Query error: {err}");
                        self.mode = Mode::Query(buf);
                    }
                }
            }
            KeyCode::Backspace => {
                buf.pop();
                self.mode = Mode::Query(buf);
            }
            KeyCode::Char(c) => {
                buf.push(c);
                self.mode = Mode::Query(buf);
            }
            _ => self.mode = Mode::Query(buf),
        }
    }

    fn switch_tab(&mut self, step: usize) {
        self.tab = (self.tab + step) % TABS.len();
        self.query_result = None;
    }

    fn current_date(&self, field: Field) -> Option<NaiveDate> {
        let range = self.session.params().date_range;
        let date = match field {
            Field::From => range.start,
            Field::To => range.end,
            _ => return None,
        };
        // Degenerate placeholders for a dataset without dates.
        (date != NaiveDate::MIN && date != NaiveDate::MAX).then_some(date)
    }

    fn set_date(&mut self, field: Field, date: NaiveDate) {
        match field {
            Field::From => self.session.set_start(date),
            Field::To => self.session.set_end(date),
            _ => return,
        }
        self.after_filter_change();
    }

    fn move_within_field(&mut self, delta: i32) {
        match FIELDS[self.field] {
            field @ (Field::From | Field::To) => {
                let Some(date) = self.current_date(field) else {
                    return;
                };
                let next = if delta >= 0 { date.succ_opt() } else { date.pred_opt() };
                if let Some(next) = next {
                    self.set_date(field, next);
                }
            }
            Field::Locations => {
                self.location_cursor = step_cursor(self.location_cursor, delta, self.locations.len());
            }
            Field::Categories => {
                self.category_cursor = step_cursor(self.category_cursor, delta, self.categories.len());
            }
        }
    }

    fn toggle_at_cursor(&mut self) {
        match FIELDS[self.field] {
            Field::Locations => {
                let Some(name) = self.locations.get(self.location_cursor).cloned() else {
                    return;
                };
                let on = self.session.toggle_location(&name);
                self.status = format!("{name}: {}", if on { "on" } else { "off" });
            }
            Field::Categories => {
                let Some(name) = self.categories.get(self.category_cursor).cloned() else {
                    return;
                };
                let on = self.session.toggle_category(&name);
                self.status = format!("{name}: {}", if on { "on" } else { "off" });
            }
            Field::From | Field::To => return,
        }
        self.after_filter_change();
    }

    fn select_all_focused(&mut self, selected: bool) {
        let what = match FIELDS[self.field] {
            Field::Locations => {
                self.session.select_all_locations(selected);
                "locations"
            }
            Field::Categories => {
                self.session.select_all_categories(selected);
                "categories"
            }
            Field::From | Field::To => return,
        };
        self.status = format!("{} {what} selected", if selected { "All" } else { "No" });
        self.after_filter_change();
    }

    fn after_filter_change(&mut self) {
        self.table_offset = 0;
        self.query_result = None;
        let n = self.session.products().len();
        if self.product >= n {
            self.product = 0;
        }
    }

    fn cycle_product(&mut self, delta: i32) {
        let products = self.session.products();
        if products.is_empty() {
            self.status = "No products in the current selection.".to_string();
            return;
        }
        self.product = step_cursor(self.product.min(products.len() - 1), delta, products.len());
        self.status = format!("Drilldown: {}", products[self.product]);
    }

    fn export_csv(&mut self) {
        let path = Path::new(DEFAULT_EXPORT_NAME);
        self.status = match write_view_csv(path, &self.session.dashboard().view) {
            Ok(n) => format!("Exported {n} rows to {}", path.display()),
            Err(err) => format!("Export failed: {err}"),
        };
    }

    fn export_json(&mut self) {
        let path = Path::new(DEFAULT_SNAPSHOT_NAME);
        self.status = match write_snapshot_json(path, self.session.dashboard()) {
            Ok(()) => format!("Wrote snapshot to {}", path.display()),
            Err(err) => format!("Snapshot failed: {err}"),
        };
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
                Constraint::Length(3),
            ])
            .split(frame.area());

        self.draw_header(frame, chunks[0]);
        self.draw_tabs(frame, chunks[1]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(34), Constraint::Min(0)])
            .split(chunks[2]);
        self.draw_filters(frame, body[0]);
        self.draw_content(frame, body[1]);

        self.draw_insight(frame, chunks[3]);
        self.draw_footer(frame, chunks[4]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let dash = self.session.dashboard();
        let k = &dash.kpis;
        let peak = match &k.peak_location {
            Some(e) => format!("{} ({})", e.label, fmt_money(e.value)),
            None => format!("N/A ({})", fmt_money(0.0)),
        };
        let label = Style::default().fg(Color::Gray);
        let value = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);

        let kpis = Line::from(vec![
            Span::styled("Total Revenue ", label),
            Span::styled(fmt_money(k.total_revenue), value),
            Span::styled("  Total Orders ", label),
            Span::styled(fmt_count(k.total_orders), value),
            Span::styled("  Avg Order Value ", label),
            Span::styled(fmt_money(k.aov), value),
            Span::styled("  Peak Location ", label),
            Span::styled(peak, value),
        ]);
        let ds = self.session.dataset();
        let source = Line::from(Span::styled(
            format!(
                "{} | rows {} of {} | rejected {}",
                ds.source,
                fmt_count(dash.rows),
                fmt_count(ds.len()),
                ds.row_errors.len()
            ),
            label,
        ));

        let p = Paragraph::new(Text::from(vec![kpis, source]))
            .block(Block::default().title("Coffee Shop Sales").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_tabs(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let tabs = Tabs::new(TABS.iter().map(|t| t.title()))
            .select(self.tab)
            .block(Block::default().borders(Borders::ALL))
            .style(Style::default().fg(Color::Gray))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White));
        frame.render_widget(tabs, area);
    }

    fn draw_filters(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let params = self.session.params();
        let focused = FIELDS[self.field];
        let heading = |field: Field| {
            let style = if field == focused {
                Style::default().fg(Color::Black).bg(Color::White)
            } else {
                Style::default().fg(Color::Gray)
            };
            Span::styled(field_name(field), style)
        };
        let date_text = |field: Field| match &self.mode {
            Mode::EditDate(f, buf) if *f == field => format!("{buf}_"),
            _ => self
                .current_date(field)
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string()),
        };

        let mut lines = vec![
            Line::from(vec![heading(Field::From), Span::raw(format!(" {}", date_text(Field::From)))]),
            Line::from(vec![heading(Field::To), Span::raw(format!(" {}", date_text(Field::To)))]),
            Line::from(""),
            Line::from(heading(Field::Locations)),
        ];
        for (i, name) in self.locations.iter().enumerate() {
            let cursor = focused == Field::Locations && i == self.location_cursor;
            lines.push(toggle_line(name, params.locations.contains(name), cursor));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(heading(Field::Categories)));
        for (i, name) in self.categories.iter().enumerate() {
            let cursor = focused == Field::Categories && i == self.category_cursor;
            lines.push(toggle_line(name, params.categories.contains(name), cursor));
        }

        let p = Paragraph::new(Text::from(lines))
            .block(Block::default().title("Filters").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_content(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        if let Some((sql, result)) = &self.query_result {
            draw_query_result(frame, area, sql, result);
            return;
        }
        let dash = self.session.dashboard();
        match TABS[self.tab] {
            Tab::View(kind) => {
                let title = chart_labels(kind).title;
                let money = |rows: &[crate::metrics::Entry<f64>]| -> Vec<(String, u64, String)> {
                    rows.iter()
                        .map(|e| (e.label.clone(), cents(e.value), fmt_money(e.value)))
                        .collect()
                };
                let counts = |rows: &[crate::metrics::Entry<usize>]| -> Vec<(String, u64, String)> {
                    rows.iter()
                        .map(|e| (e.label.clone(), e.value as u64, fmt_count(e.value)))
                        .collect()
                };
                match kind {
                    ViewKind::Monthly => draw_bars(frame, area, title, &money(&dash.monthly), false),
                    ViewKind::Locations => draw_bars(frame, area, title, &money(&dash.locations), true),
                    ViewKind::Products => draw_bars(frame, area, title, &money(&dash.top_products), true),
                    ViewKind::CategoryAov => draw_bars(frame, area, title, &money(&dash.category_aov), true),
                    ViewKind::Popularity => draw_bars(frame, area, title, &counts(&dash.popularity), true),
                    ViewKind::Coffee => draw_bars(frame, area, title, &counts(&dash.coffee), true),
                    ViewKind::Hours => {
                        let rows: Vec<(String, u64, String)> = dash
                            .hours
                            .iter()
                            .map(|h| (h.hour.to_string(), h.count as u64, fmt_count(h.count)))
                            .collect();
                        draw_bars(frame, area, title, &rows, false)
                    }
                    ViewKind::Weekdays => {
                        let rows: Vec<(String, u64, String)> = dash
                            .weekdays
                            .iter()
                            .filter_map(|e| {
                                let n = e.value?;
                                Some((e.label.chars().take(3).collect(), n as u64, fmt_count(n)))
                            })
                            .collect();
                        draw_bars(frame, area, title, &rows, false)
                    }
                    ViewKind::Outliers => self.draw_outliers(frame, area),
                }
            }
            Tab::DataTable => self.draw_data_table(frame, area),
            Tab::Outliers => self.draw_outliers(frame, area),
            Tab::Drilldown => self.draw_drilldown(frame, area),
        }
    }

    fn draw_data_table(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let view = &self.session.dashboard().view;
        let visible = area.height.saturating_sub(3) as usize;
        let offset = self.table_offset.min(view.len().saturating_sub(1));

        let rows: Vec<Row> = view
            .rows()
            .skip(offset)
            .take(visible)
            .map(|(r, hour)| {
                Row::new(vec![
                    Cell::from(r.id.clone()),
                    Cell::from(r.date.map(|d| d.to_string()).unwrap_or_default()),
                    Cell::from(r.time.map(|t| t.format("%H:%M:%S").to_string()).unwrap_or_default()),
                    Cell::from(r.location.clone()),
                    Cell::from(r.category.clone()),
                    Cell::from(r.product.clone()),
                    Cell::from(format!("{:.2}", r.sales)),
                    Cell::from(r.quantity.to_string()),
                    Cell::from(hour.map(|h| h.to_string()).unwrap_or_default()),
                ])
            })
            .collect();

        let header = Row::new(["id", "date", "time", "location", "category", "product", "sales", "qty", "hour"])
            .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
        let widths = [
            Constraint::Length(8),
            Constraint::Length(10),
            Constraint::Length(8),
            Constraint::Length(16),
            Constraint::Length(18),
            Constraint::Min(12),
            Constraint::Length(8),
            Constraint::Length(4),
            Constraint::Length(4),
        ];
        let title = format!(
            "Data Table (rows {}-{} of {}, PgUp/PgDn)",
            if view.is_empty() { 0 } else { offset + 1 },
            (offset + visible).min(view.len()),
            view.len()
        );
        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(table, area);
    }

    fn draw_outliers(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let report = &self.session.dashboard().outliers;
        let std = report.std.map(|s| format!("{s:.2}")).unwrap_or_else(|| "n/a".to_string());
        let title = format!(
            "Sales Outliers (|z| > {:.0}) | mean {} | std {std} | {} flagged",
            report.threshold,
            fmt_money(report.mean),
            report.count()
        );
        let block = Block::default().title(title).borders(Borders::ALL);
        if report.outliers.is_empty() {
            let p = Paragraph::new("No significant outliers detected.")
                .style(Style::default().fg(Color::Green))
                .block(block);
            frame.render_widget(p, area);
            return;
        }

        let rows: Vec<Row> = report
            .outliers
            .iter()
            .map(|o| {
                Row::new(vec![
                    o.id.clone(),
                    o.date.map(|d| d.to_string()).unwrap_or_default(),
                    o.location.clone(),
                    fmt_money(o.sales),
                    format!("{:.2}", o.z),
                ])
            })
            .collect();
        let header = Row::new(["id", "date", "location", "sales", "z"])
            .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
        let widths = [
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(18),
            Constraint::Length(12),
            Constraint::Length(8),
        ];
        frame.render_widget(Table::new(rows, widths).header(header).block(block), area);
    }

    fn draw_drilldown(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let products = self.session.products();
        let Some(product) = products.get(self.product.min(products.len().saturating_sub(1))) else {
            let p = Paragraph::new("No products in the current selection.")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default().title("Drilldown").borders(Borders::ALL));
            frame.render_widget(p, area);
            return;
        };

        let points = self.session.drilldown(product);
        let total: f64 = points.iter().map(|p| p.sales).sum();
        let block = Block::default()
            .title(format!(
                "Sales Trend for {product} ([/] to change) | {} line items | {}",
                points.len(),
                fmt_money(total)
            ))
            .borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(&first) = points.first().map(|p| &p.date) else {
            return;
        };
        let day = |d: NaiveDate| (d - first).num_days() as f64;
        let line: Vec<(f64, f64)> = daily_totals(&points).into_iter().map(|(d, s)| (day(d), s)).collect();
        let items: Vec<(f64, f64)> = points.iter().map(|p| (day(p.date), p.sales)).collect();
        let Some((x_bounds, y_bounds)) = TrendChart::bounds(&line, &items) else {
            return;
        };

        let (chart_rect, labels) = chart_layout(inner);
        frame.render_widget(
            TrendChart {
                line: &line,
                points: &items,
                x_bounds,
                y_bounds,
            },
            chart_rect,
        );
        if labels {
            draw_axis_ticks(frame, inner, chart_rect, first, x_bounds, y_bounds);
        }
    }

    fn draw_insight(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let dash = self.session.dashboard();
        let text = match TABS[self.tab] {
            _ if self.query_result.is_some() => "Query results are computed on the filtered view.".to_string(),
            Tab::View(kind) => dash.insight(kind).to_string(),
            Tab::Outliers => dash.insight(ViewKind::Outliers).to_string(),
            Tab::DataTable => format!("{} rows match the current filters.", fmt_count(dash.rows)),
            Tab::Drilldown => format!(
                "{} products available for drilldown.",
                fmt_count(self.session.products().len())
            ),
        };
        let p = Paragraph::new(text)
            .style(Style::default().fg(Color::White))
            .block(Block::default().title("Insight").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let line = match &self.mode {
            Mode::Query(buf) => Line::from(vec![
                Span::styled("SQL> ", Style::default().fg(Color::Cyan)),
                Span::raw(format!("{buf}_")),
                Span::raw(" | "),
                Span::styled(&self.status, Style::default().fg(Color::Yellow)),
            ]),
            _ => {
                let help = "Tab views  ↑/↓ field  ←/→ move  Space toggle  Enter edit  a/n all/none  [/] product  / query  e csv  j json  q quit";
                Line::from(vec![
                    Span::styled(help, Style::default().fg(Color::Gray)),
                    Span::raw(" | "),
                    Span::styled(&self.status, Style::default().fg(Color::Yellow)),
                ])
            }
        };
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn field_name(field: Field) -> &'static str {
    match field {
        Field::From => "From:",
        Field::To => "To:",
        Field::Locations => "Locations",
        Field::Categories => "Categories",
    }
}

fn toggle_line(name: &str, selected: bool, cursor: bool) -> Line<'static> {
    let mark = if selected { "[x]" } else { "[ ]" };
    let style = if cursor {
        Style::default().fg(Color::Black).bg(Color::Cyan)
    } else if selected {
        Style::default().fg(Color::White)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Line::from(Span::styled(format!(" {mark} {name}"), style))
}

fn step_cursor(cur: usize, delta: i32, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    if delta >= 0 { (cur + 1) % len } else { (cur + len - 1) % len }
}

fn cents(v: f64) -> u64 {
    (v.max(0.0) * 100.0).round() as u64
}

/// Draw a keyed table as a bar chart; long labels read better horizontally.
fn draw_bars(frame: &mut ratatui::Frame<'_>, area: Rect, title: &str, rows: &[(String, u64, String)], horizontal: bool) {
    let block = Block::default().title(title.to_string()).borders(Borders::ALL);
    if rows.is_empty() {
        let p = Paragraph::new("No data available for the current selection.")
            .style(Style::default().fg(Color::Yellow))
            .block(block);
        frame.render_widget(p, area);
        return;
    }

    let bars: Vec<Bar> = rows
        .iter()
        .map(|(label, value, text)| {
            Bar::default()
                .label(Line::from(label.clone()))
                .value(*value)
                .text_value(text.clone())
        })
        .collect();

    let chart = BarChart::default()
        .block(block)
        .data(BarGroup::default().bars(&bars))
        .bar_style(Style::default().fg(Color::Cyan))
        .value_style(Style::default().fg(Color::Black).bg(Color::Cyan));

    let chart = if horizontal {
        chart.direction(Direction::Horizontal).bar_width(1).bar_gap(0)
    } else {
        let inner_w = area.width.saturating_sub(2) as usize;
        let width = (inner_w / rows.len()).saturating_sub(1).clamp(1, 12) as u16;
        chart.bar_width(width).bar_gap(1)
    };
    frame.render_widget(chart, area);
}

fn draw_query_result(frame: &mut ratatui::Frame<'_>, area: Rect, sql: &str, result: &QueryResult) {
    let header = Row::new(result.columns.clone())
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
    let rows: Vec<Row> = result
        .rows
        .iter()
        .map(|r| Row::new(r.iter().map(|v| v.to_string()).collect::<Vec<_>>()))
        .collect();
    let n = result.columns.len().max(1) as u32;
    let widths: Vec<Constraint> = (0..n).map(|_| Constraint::Ratio(1, n)).collect();
    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(format!("{sql} ({} rows, Esc closes)", result.rows.len()))
            .borders(Borders::ALL),
    );
    frame.render_widget(table, area);
}

/// Reserve room for tick labels around the chart; `false` when too small.
fn chart_layout(inner: Rect) -> (Rect, bool) {
    let (left, right, top, bottom) = (10u16, 2u16, 1u16, 2u16);
    if inner.width <= left + right + 10 || inner.height <= top + bottom + 5 {
        return (inner, false);
    }
    let rect = Rect {
        x: inner.x + left,
        y: inner.y + top,
        width: inner.width - left - right,
        height: inner.height - top - bottom,
    };
    (rect, true)
}

fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    first: NaiveDate,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
) {
    let ticks = 4usize;
    let style = Style::default().fg(Color::Gray);

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let days = (x_bounds[0] + u * (x_bounds[1] - x_bounds[0])).round() as i64;
        let label = (first + chrono::Duration::days(days)).format("%m-%d").to_string();
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let start = x.saturating_sub((label.len() / 2) as u16).max(inner.x);
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height {
            continue;
        }
        let width = (label.len() as u16).min(inner.x + inner.width - start);
        frame.render_widget(Paragraph::new(label).style(style), Rect { x: start, y, width, height: 1 });
    }

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let value = y_bounds[0] + u * (y_bounds[1] - y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = format!("{value:.0}");
        let start = (chart.x - 1).saturating_sub(label.len() as u16);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label.clone()).style(style),
            Rect {
                x: start,
                y,
                width: label.len() as u16,
                height: 1,
            },
        );
    }
}
