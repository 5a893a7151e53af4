//! Ratatui-based terminal dashboard.
//!
//! A settings panel picks tickers, metrics, timeframe, interval and chart
//! type; the chart is drawn with plotters. Fetches run on a worker thread and
//! are committed through the controller, which drops superseded results.
//! Terminal resizes go through the debouncer and only re-lay out cached data.

use std::cell::Cell;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseEvent,
        MouseEventKind,
    },
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

use crate::app::pipeline::SharedSource;
use crate::cli::{ChartArgs, normalize_tickers};
use crate::controller::{Begin, ChartController, FetchOutcome, Phase, ResizeController};
use crate::data::{Metric, date_range, resolve, resolve_secondary};
use crate::domain::{ChartRequest, ChartType, DateRange, Interval, MetricSlot, Timeframe};
use crate::error::{AppError, ChartError};
use crate::render::{MarkId, Size};

mod plotters_chart;

use plotters_chart::{SceneChart, cell_to_scene};

const FIELDS: usize = 6;
const IDLE_POLL: Duration = Duration::from_millis(100);

/// Start the TUI.
pub fn run(source: SharedSource, args: &ChartArgs) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(source, args);
    app.start(args);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen, mouse) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
    }
}

/// Editable chart parameters.
///
/// Seeded from the command line. Values the command line got wrong fall back
/// to defaults here; the first request is still built from the raw arguments
/// so the error is shown before anything is edited.
#[derive(Debug, Clone)]
struct Selection {
    tickers: Vec<String>,
    metric: Metric,
    secondary: Option<Metric>,
    timeframe: Timeframe,
    /// Explicit `--start`/`--end` window; cleared once the timeframe is edited.
    range: Option<DateRange>,
    interval: Interval,
    chart_type: ChartType,
}

impl Selection {
    fn from_args(args: &ChartArgs) -> Self {
        let explicit = args.start.is_some() || args.end.is_some();
        let metric = resolve(&args.metric).map(|m| m.metric).unwrap_or(Metric::Revenues);
        let secondary = resolve_secondary(args.secondary.as_deref())
            .ok()
            .flatten()
            .map(|m| m.metric);
        Self {
            tickers: normalize_tickers(&args.tickers),
            metric,
            secondary,
            timeframe: args.timeframe,
            range: if explicit { args.range().ok() } else { None },
            interval: args.interval,
            chart_type: ChartType::parse(&args.chart_type).unwrap_or(ChartType::Bar),
        }
    }

    fn request(&self) -> ChartRequest {
        let range = self.range.unwrap_or_else(|| date_range(self.timeframe));
        ChartRequest {
            tickers: self.tickers.clone(),
            metric: self.metric.display_name().to_string(),
            secondary_metric: self.secondary.map(|m| m.display_name().to_string()),
            start_date: range.start_str(),
            end_date: range.end_str(),
            interval: self.interval,
            chart_type: self.chart_type,
        }
    }

    fn window_label(&self) -> String {
        match self.range {
            Some(range) => format!("{}..{}", range.start_str(), range.end_str()),
            None => self.timeframe.label().to_string(),
        }
    }
}

/// Secondary metric cycle: None, then every metric.
fn cycle_secondary(current: Option<Metric>, forward: bool) -> Option<Metric> {
    let first = Metric::ALL[0];
    let last = Metric::ALL[Metric::ALL.len() - 1];
    match (current, forward) {
        (None, true) => Some(first),
        (None, false) => Some(last),
        (Some(m), true) if m == last => None,
        (Some(m), false) if m == first => None,
        (Some(m), true) => Some(m.next()),
        (Some(m), false) => Some(m.prev()),
    }
}

struct App {
    selection: Selection,
    selected_field: usize,
    editing_tickers: bool,
    ticker_input: String,
    status: String,

    controller: ChartController,
    loading: Arc<AtomicBool>,
    source: SharedSource,
    results_tx: Sender<FetchOutcome>,
    results_rx: Receiver<FetchOutcome>,

    resize: ResizeController,
    chart_area: Rect,
    observed: Cell<Option<Size>>,
    hover: Option<MarkId>,
}

impl App {
    fn new(source: SharedSource, args: &ChartArgs) -> Self {
        let loading = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&loading);
        let controller = ChartController::new(Size::new(800, 400)).on_loading(move |on| {
            flag.store(on, Ordering::Relaxed);
        });
        let (results_tx, results_rx) = mpsc::channel();
        let selection = Selection::from_args(args);
        Self {
            ticker_input: selection.tickers.join(","),
            selection,
            selected_field: 0,
            editing_tickers: false,
            status: String::new(),
            controller,
            loading,
            source,
            results_tx,
            results_rx,
            resize: ResizeController::default(),
            chart_area: Rect::default(),
            observed: Cell::new(None),
            hover: None,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if self.drain_results() {
                needs_redraw = true;
            }
            if let Some(size) = self.resize.poll(Instant::now()) {
                if self.controller.resize(size) {
                    log::debug!("relayout at {}x{}", size.width, size.height);
                    self.hover = None;
                    needs_redraw = true;
                }
            }

            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
                if let Some(size) = self.observed.take() {
                    self.resize.observe(size, Instant::now());
                }
            }

            let timeout = self
                .resize
                .time_left(Instant::now())
                .map_or(IDLE_POLL, |left| left.min(IDLE_POLL));
            if !event::poll(timeout).map_err(|e| AppError::new(4, format!("Event poll error: {e}")))? {
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
                Event::Mouse(mouse) => {
                    if self.handle_mouse(mouse) {
                        needs_redraw = true;
                    }
                }
                Event::Resize(_, _) => {
                    // The new chart pixel size is only known after a draw.
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Commit finished fetches. Returns whether the chart changed.
    fn drain_results(&mut self) -> bool {
        let mut changed = false;
        while let Ok(outcome) = self.results_rx.try_recv() {
            match self.controller.commit(outcome) {
                Ok(()) => {
                    changed = true;
                    self.hover = None;
                    self.status = match self.controller.data() {
                        Some(data) if data.frame.keys.is_empty() => "No data returned.".to_string(),
                        Some(data) => format!("{} periods loaded.", data.frame.keys.len()),
                        None => String::new(),
                    };
                }
                Err(ChartError::StaleResult(generation)) => {
                    log::debug!("ignored superseded fetch #{generation}");
                }
                Err(err) => self.status = err.to_string(),
            }
        }
        changed
    }

    /// Submit the command-line request as given.
    ///
    /// Argument errors (unknown metric, unsupported chart type, bad dates)
    /// replace the chart with a placeholder instead of being defaulted away.
    fn start(&mut self, args: &ChartArgs) {
        match args.to_request() {
            Ok(request) => self.submit_request(&request),
            Err(err) => {
                log::warn!("invalid chart arguments: {err}");
                self.controller.show_error(&err);
                self.status = err.to_string();
            }
        }
    }

    /// Hand the current selection to the controller.
    fn submit(&mut self) {
        let request = self.selection.request();
        self.submit_request(&request);
    }

    /// Start a fetch off-thread if the controller asks for one.
    fn submit_request(&mut self, request: &ChartRequest) {
        match self.controller.begin(request) {
            Ok(Begin::Fetch(job)) => {
                self.status = "Loading...".to_string();
                self.hover = None;
                let source = Arc::clone(&self.source);
                let tx = self.results_tx.clone();
                thread::spawn(move || {
                    let outcome = job.run(source.as_ref());
                    // The receiver is gone once the UI has quit.
                    let _ = tx.send(outcome);
                });
            }
            Ok(Begin::Unchanged) => {}
            Err(err) => {
                self.hover = None;
                self.status = err.to_string();
            }
        }
    }

    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.editing_tickers {
            self.handle_ticker_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Up => self.selected_field = self.selected_field.saturating_sub(1),
            KeyCode::Down => self.selected_field = (self.selected_field + 1).min(FIELDS - 1),
            KeyCode::Left => self.adjust_field(false),
            KeyCode::Right => self.adjust_field(true),
            KeyCode::Enter if self.selected_field == 0 => {
                self.editing_tickers = true;
                self.ticker_input = self.selection.tickers.join(",");
                self.status = "Editing tickers (comma separated). Enter to apply, Esc to cancel.".to_string();
            }
            KeyCode::Char('c') => {
                self.selection.chart_type = self.selection.chart_type.toggle();
                self.controller.set_chart_type(self.selection.chart_type);
            }
            KeyCode::Char(']') => self.step_hover(true),
            KeyCode::Char('[') => self.step_hover(false),
            KeyCode::Esc => self.hover = None,
            _ => {}
        }
        false
    }

    fn handle_ticker_edit(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.editing_tickers = false;
                self.status = "Ticker edit canceled.".to_string();
            }
            KeyCode::Enter => {
                self.editing_tickers = false;
                let raw: Vec<String> = self.ticker_input.split(',').map(str::to_string).collect();
                self.selection.tickers = normalize_tickers(&raw);
                self.submit();
            }
            KeyCode::Backspace => {
                self.ticker_input.pop();
            }
            KeyCode::Char(c) if c.is_ascii_alphanumeric() || matches!(c, ',' | '.' | '-') => {
                self.ticker_input.push(c);
            }
            _ => {}
        }
    }

    fn adjust_field(&mut self, forward: bool) {
        let s = &mut self.selection;
        match self.selected_field {
            1 => s.metric = if forward { s.metric.next() } else { s.metric.prev() },
            2 => s.secondary = cycle_secondary(s.secondary, forward),
            3 => {
                s.timeframe = if forward { s.timeframe.next() } else { s.timeframe.prev() };
                s.range = None;
            }
            4 => s.interval = s.interval.toggle(),
            5 => {
                s.chart_type = s.chart_type.toggle();
                self.controller.set_chart_type(s.chart_type);
                return;
            }
            _ => return,
        }
        self.submit();
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> bool {
        if !matches!(mouse.kind, MouseEventKind::Moved | MouseEventKind::Down(_)) {
            return false;
        }
        let hit = cell_to_scene(self.chart_area, self.controller.size(), mouse.column, mouse.row)
            .and_then(|(x, y)| self.controller.scene().hit_test(x, y));
        let changed = hit != self.hover;
        self.hover = hit;
        changed
    }

    /// Keyboard hover: walk marks period by period.
    fn step_hover(&mut self, forward: bool) {
        let mut ids: Vec<MarkId> = self.controller.scene().marks.iter().map(|m| m.id).collect();
        if ids.is_empty() {
            self.hover = None;
            return;
        }
        ids.sort_by_key(|id| (id.key_index, id.series, id.slot == MetricSlot::Secondary));
        let next = match self.hover.and_then(|h| ids.iter().position(|id| *id == h)) {
            Some(i) if forward => (i + 1) % ids.len(),
            Some(i) => (i + ids.len() - 1) % ids.len(),
            None if forward => 0,
            None => ids.len() - 1,
        };
        self.hover = Some(ids[next]);
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let loading = self.loading.load(Ordering::Relaxed) || self.controller.phase() == Phase::Fetching;
        let s = &self.selection;
        let mut spans = vec![
            Span::styled("mchart", Style::default().fg(Color::Cyan)),
            Span::raw(format!(
                " | {} | {}{} | {} | {}",
                s.tickers.join(", "),
                s.metric.display_name(),
                s.secondary.map(|m| format!(" + {}", m.display_name())).unwrap_or_default(),
                s.window_label(),
                s.interval.display_name(),
            )),
        ];
        if loading {
            spans.push(Span::styled(" | loading...", Style::default().fg(Color::Yellow)));
        }
        let p = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&mut self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(36)])
            .split(area);
        let side = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(FIELDS as u16 + 2), Constraint::Min(0)])
            .split(chunks[1]);

        self.draw_chart(frame, chunks[0]);
        self.draw_settings(frame, side[0]);
        self.draw_tooltip(frame, side[1]);
    }

    fn draw_chart(&mut self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default()
            .title(self.selection.chart_type.display_name())
            .borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);
        self.chart_area = inner;

        let widget = SceneChart {
            scene: self.controller.scene(),
            hover: self.hover,
            observed: &self.observed,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let s = &self.selection;
        let tickers = if self.editing_tickers {
            format!("{}_", self.ticker_input)
        } else {
            s.tickers.join(",")
        };
        let items = vec![
            ListItem::new(format!("Tickers: {tickers}")),
            ListItem::new(format!("Metric: {}", s.metric.short_name())),
            ListItem::new(format!(
                "Secondary: {}",
                s.secondary.map_or("None", |m| m.short_name())
            )),
            ListItem::new(format!("Timeframe: {}", s.window_label())),
            ListItem::new(format!("Interval: {}", s.interval.display_name())),
            ListItem::new(format!("Chart: {}", s.chart_type.display_name())),
        ];

        let highlight = if self.editing_tickers {
            Style::default().fg(Color::Black).bg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Black).bg(Color::White)
        };
        let list = List::new(items)
            .block(Block::default().title("Settings").borders(Borders::ALL))
            .highlight_style(highlight)
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_tooltip(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let tip = self.hover.and_then(|id| self.controller.scene().tooltip(id));
        let text = match tip {
            Some(tip) => Text::from(vec![
                Line::from(Span::styled(tip.ticker, Style::default().add_modifier(Modifier::BOLD))),
                Line::from(tip.period),
                Line::from(Span::styled(tip.metric, Style::default().fg(Color::Gray))),
                Line::from(Span::styled(tip.value, Style::default().fg(Color::Cyan))),
            ]),
            None => Text::from(Span::styled(
                "Hover a bar or point ([ ] to step).",
                Style::default().fg(Color::DarkGray),
            )),
        };
        let p = Paragraph::new(text).block(Block::default().title("Details").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ adjust  Enter edit tickers  c chart type  [ ] hover  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}
