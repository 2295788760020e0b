use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Gauge, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use save_alarm::{
    format_timestamp, format_usd, Entry, SavingsTracker, Source,
    SourceDisplayTable, StoreChange, Summary, TrackerError,
};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info};

/// Pre-filled amount in the add form
const DEFAULT_FORM_SUM: &str = "100";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Savings,
    Entries,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Savings => Page::Entries,
            Page::Entries => Page::Savings,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Savings => "Savings",
            Page::Entries => "Entries",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Sum,
    Source,
}

/// State of the "Add new" popup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddForm {
    pub sum: String,
    pub source: Source,
    pub focus: FormField,
}

impl Default for AddForm {
    fn default() -> Self {
        AddForm {
            sum: DEFAULT_FORM_SUM.to_string(),
            source: Source::default(),
            focus: FormField::Sum,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

pub struct App {
    tracker: SavingsTracker,
    styles: SourceDisplayTable,
    dirty: Arc<AtomicBool>,
    pub entries: Vec<Entry>,
    pub summary: Summary,
    pub state: TableState,
    pub current_page: Page,
    pub show_detail: bool,
    pub form: Option<AddForm>,
    pub status: Option<StatusMessage>,
}

impl App {
    pub fn new(mut tracker: SavingsTracker, styles: SourceDisplayTable) -> Result<Self> {
        let dirty = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&dirty);
        tracker.subscribe(move |_: &StoreChange| flag.store(true, Ordering::SeqCst));

        let summary = Summary::from_entries(&[], tracker.ceiling());
        let mut app = Self {
            tracker,
            styles,
            dirty,
            entries: Vec::new(),
            summary,
            state: TableState::default(),
            current_page: Page::Savings,
            show_detail: false,
            form: None,
            status: None,
        };
        app.refresh()?;
        Ok(app)
    }

    /// Reload entries and totals if the store changed since the last load
    pub fn refresh(&mut self) -> Result<()> {
        if !self.dirty.swap(false, Ordering::SeqCst) {
            return Ok(());
        }

        self.entries = self.tracker.list()?;
        self.summary = self.tracker.summary()?;

        let selected = match self.state.selected() {
            _ if self.entries.is_empty() => None,
            Some(i) => Some(i.min(self.entries.len() - 1)),
            None => Some(0),
        };
        self.state.select(selected);
        Ok(())
    }

    pub fn selected_entry(&self) -> Option<&Entry> {
        self.state.selected().and_then(|i| self.entries.get(i))
    }

    /// Returns true when the app should quit
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if self.form.is_some() {
            self.handle_form_key(key);
            return false;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab | KeyCode::BackTab => self.current_page = self.current_page.next(),
            KeyCode::Char('a') => {
                self.status = None;
                self.form = Some(AddForm::default());
            }
            _ if self.current_page == Page::Entries => self.handle_entries_key(key),
            _ => {}
        }
        false
    }

    fn handle_entries_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.show_detail = !self.show_detail,
            KeyCode::Down | KeyCode::Char('j') => self.next(),
            KeyCode::Up | KeyCode::Char('k') => self.previous(),
            KeyCode::Home => {
                if !self.entries.is_empty() {
                    self.state.select(Some(0));
                }
            }
            KeyCode::End => {
                if !self.entries.is_empty() {
                    self.state.select(Some(self.entries.len() - 1));
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => self.delete_selected(),
            _ => {}
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        let Some(form) = self.form.as_mut() else {
            return;
        };

        match key.code {
            KeyCode::Esc => self.form = None,
            KeyCode::Enter => self.submit_form(),
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                form.focus = match form.focus {
                    FormField::Sum => FormField::Source,
                    FormField::Source => FormField::Sum,
                };
            }
            KeyCode::Left if form.focus == FormField::Source => form.source = form.source.previous(),
            KeyCode::Right if form.focus == FormField::Source => form.source = form.source.next(),
            KeyCode::Backspace if form.focus == FormField::Sum => {
                form.sum.pop();
            }
            KeyCode::Char(c)
                if form.focus == FormField::Sum && !key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                form.sum.push(c);
            }
            _ => {}
        }
    }

    fn submit_form(&mut self) {
        let Some(form) = self.form.clone() else {
            return;
        };

        match self.tracker.add_input(form.source, &form.sum) {
            Ok(entry) => {
                self.form = None;
                self.status = Some(StatusMessage {
                    text: format!(
                        "Saved {} to {}",
                        format_usd(entry.sum()),
                        self.styles.label(entry.source())
                    ),
                    is_error: false,
                });
            }
            // Form stays open so the user can fix the input or retry
            Err(err) => self.report(&err),
        }
    }

    fn delete_selected(&mut self) {
        let Some(entry) = self.selected_entry().cloned() else {
            return;
        };

        match self.tracker.remove(&entry) {
            Ok(_) => {
                info!(id = %entry.id(), "entry deleted from UI");
                self.status = Some(StatusMessage {
                    text: format!("Deleted {} entry", format_usd(entry.sum())),
                    is_error: false,
                });
            }
            Err(err) => self.report(&err),
        }
    }

    fn report(&mut self, err: &TrackerError) {
        let text = if err.is_persistence() {
            error!(error = %err, "storage operation failed");
            format!("{err} (try again)")
        } else {
            err.to_string()
        };
        self.status = Some(StatusMessage { text, is_error: true });
    }

    pub fn next(&mut self) {
        let len = self.entries.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.entries.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    fn source_color(&self, source: Source) -> Color {
        self.styles.color(source).parse().unwrap_or(Color::White)
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        if let Err(err) = app.refresh() {
            error!(error = %err, "failed to reload entries");
            app.status = Some(StatusMessage {
                text: format!("Could not load entries: {err}"),
                is_error: true,
            });
        }

        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if app.handle_key(key) {
                return Ok(());
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match app.current_page {
        Page::Savings => render_savings(f, chunks[1], app),
        Page::Entries if app.show_detail => {
            let content_chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                .split(chunks[1]);

            render_entries(f, content_chunks[0], app);
            render_detail_panel(f, content_chunks[1], app);
        }
        Page::Entries => render_entries(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2], app);

    if app.form.is_some() {
        let screen = f.size();
        render_form(f, screen, app);
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut tab_spans = vec![];
    for (i, page) in [Page::Savings, Page::Entries].iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title().to_string(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Saved: {}", format_usd(app.summary.total)),
        Style::default().fg(Color::Green),
    ));
    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Entries: {}", app.summary.entry_count),
        Style::default().fg(Color::White),
    ));

    let header = Paragraph::new(vec![Line::from(tab_spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_savings(f: &mut Frame, area: Rect, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Greeting
            Constraint::Length(3), // Progress towards the ceiling
            Constraint::Min(0),    // Per-source breakdown
        ])
        .split(area);

    let greeting = Paragraph::new(vec![
        Line::from(Span::styled(
            "Nice to see you back!",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled("Already saved:", Style::default().add_modifier(Modifier::BOLD))),
    ])
    .block(Block::default().borders(Borders::LEFT | Borders::RIGHT | Borders::TOP));
    f.render_widget(greeting, rows[0]);

    let progress = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Goal {} ", format_usd(app.tracker.ceiling()))),
        )
        .gauge_style(Style::default().fg(Color::Green).bg(Color::DarkGray))
        .ratio(app.summary.progress)
        .label(Span::styled(
            format_usd(app.summary.total),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ));
    f.render_widget(progress, rows[1]);

    let breakdown_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(" By source ");
    let inner = breakdown_block.inner(rows[2]);
    f.render_widget(breakdown_block, rows[2]);

    let source_rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            Source::ALL
                .iter()
                .map(|_| Constraint::Length(2))
                .chain(std::iter::once(Constraint::Min(0)))
                .collect::<Vec<_>>(),
        )
        .split(inner);

    for (i, source) in Source::ALL.iter().enumerate() {
        let amount = app.summary.per_source.get(source).copied().unwrap_or(0);
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(app.source_color(*source)).bg(Color::Black))
            .ratio(app.summary.share_of(*source))
            .label(format!("{}  {}", app.styles.label(*source), format_usd(amount)));
        f.render_widget(gauge, source_rows[i]);
    }
}

fn render_entries(f: &mut Frame, area: Rect, app: &mut App) {
    let header_cells = ["Added at", "Source", "Sum"].iter().map(|h| {
        Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows: Vec<Row> = app
        .entries
        .iter()
        .map(|entry| {
            let color = app.source_color(entry.source());
            Row::new(vec![
                Cell::from(format_timestamp(entry.timestamp())),
                Cell::from(app.styles.label(entry.source()).to_string())
                    .style(Style::default().fg(color)),
                Cell::from(format_usd(entry.sum())).style(Style::default().fg(Color::Green)),
            ])
            .height(1)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(26),
            Constraint::Length(18),
            Constraint::Length(16),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Entries "),
    )
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_detail_panel(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Entry Details ");

    let Some(entry) = app.selected_entry() else {
        f.render_widget(Paragraph::new("Select an item").block(block), area);
        return;
    };

    let label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let content = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  Entry from ", label),
            Span::styled(
                app.styles.label(entry.source()).to_string(),
                Style::default().fg(app.source_color(entry.source())),
            ),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Added at ", label),
            Span::raw(format_timestamp(entry.timestamp())),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Sum: ", label),
            Span::styled(format_usd(entry.sum()), Style::default().fg(Color::Green)),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "  Press Enter to close",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )),
    ];

    f.render_widget(Paragraph::new(content).block(block), area);
}

fn render_form(f: &mut Frame, screen: Rect, app: &App) {
    let Some(form) = app.form.as_ref() else {
        return;
    };

    let area = centered_rect(50, 40, screen);
    f.render_widget(Clear, area);

    let focused = |field: FormField| {
        if form.focus == field {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        }
    };
    let cursor = if form.focus == FormField::Sum { "▏" } else { "" };

    let content = vec![
        Line::from(""),
        Line::from(Span::styled("  Input Amount", focused(FormField::Sum))),
        Line::from(vec![
            Span::raw("    Sum in USD: "),
            Span::styled(format!("{}{}", form.sum, cursor), Style::default().fg(Color::White)),
        ]),
        Line::from(""),
        Line::from(Span::styled("  Where it's stored", focused(FormField::Source))),
        Line::from(vec![
            Span::raw("    ◀ "),
            Span::styled(
                app.styles.label(form.source).to_string(),
                Style::default().fg(app.source_color(form.source)),
            ),
            Span::raw(" ▶"),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Enter", Style::default().fg(Color::Yellow)),
            Span::raw(" Done | "),
            Span::styled("Tab", Style::default().fg(Color::Yellow)),
            Span::raw(" Field | "),
            Span::styled("←/→", Style::default().fg(Color::Yellow)),
            Span::raw(" Source | "),
            Span::styled("Esc", Style::default().fg(Color::Red)),
            Span::raw(" Cancel"),
        ]),
    ];

    let popup = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Add new "),
    );

    f.render_widget(popup, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut status_spans = vec![];

    if let Some(status) = &app.status {
        let color = if status.is_error { Color::Red } else { Color::Green };
        status_spans.push(Span::styled(format!(" {} ", status.text), Style::default().fg(color)));
        status_spans.push(Span::raw(" | "));
    }

    if app.current_page == Page::Entries {
        let selected = app.state.selected().map(|i| i + 1).unwrap_or(0);
        status_spans.push(Span::styled(
            format!(" Row: {}/{} ", selected, app.entries.len()),
            Style::default().fg(Color::Cyan),
        ));
        status_spans.push(Span::raw(" | "));
        status_spans.push(Span::styled("Enter", Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(" Details | "));
        status_spans.push(Span::styled("d", Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(" Delete | "));
    }

    status_spans.push(Span::styled("a", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Add | "));
    status_spans.push(Span::styled("Tab", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Page | "));
    status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
