use anyhow::Result;
use chrono::Utc;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use liftkey::{
    shortcut_url, union_floors, AcquisitionSession, AcquisitionState, BridgeInbox, Capability,
    Card, CardType, Clipboard, Config, EmulationSession, EmulationState, MemoryClipboard,
    MergeEngine, PendingBridge, ShareChannel, ShareOutcome, SqliteStorage, TransferPath,
    VaultStore, WriteOutcome,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;

/// Bridge inbox for the TUI: the launch URL/flag first, then anything the
/// server's `/bridge` endpoint stored in the database
pub struct LaunchBridge {
    launch: PendingBridge,
    stored: SqliteStorage,
}

impl LaunchBridge {
    pub fn new(launch: PendingBridge, stored: SqliteStorage) -> Self {
        Self { launch, stored }
    }

    fn has_launch_uid(&self) -> bool {
        self.launch.is_pending()
    }
}

impl BridgeInbox for LaunchBridge {
    fn deliver(&mut self, uid: &str) {
        self.launch.deliver(uid);
    }

    fn take(&mut self) -> Option<String> {
        self.launch.take().or_else(|| self.stored.take())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Vault,
    Merge,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Vault => Page::Merge,
            Page::Merge => Page::Vault,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Vault => "Vault",
            Page::Merge => "Merge",
        }
    }
}

/// Form field receiving keystrokes in the acquisition modal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Serial,
    Name,
    Floors,
}

/// Modal currently on top of the page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modal {
    None,
    Acquisition,
    Emulation,
}

pub struct App {
    pub vault: VaultStore<SqliteStorage>,
    pub state: TableState,
    pub current_page: Page,
    pub modal: Modal,
    pub acquisition: AcquisitionSession,
    pub emulation: EmulationSession,
    pub bridge: LaunchBridge,
    pub field: FormField,
    pub merge_name: String,
    pub status: Option<String>,
    clipboard: MemoryClipboard,
    bridge_base_url: String,
    engine: MergeEngine,
}

impl App {
    pub fn new(config: &Config, vault: VaultStore<SqliteStorage>, bridge: LaunchBridge) -> Self {
        let mut state = TableState::default();
        if !vault.is_empty() {
            state.select(Some(0));
        }

        let engine = MergeEngine::new();
        let launch_uid = bridge.has_launch_uid();

        // A terminal has no reader, no tag writer and no share sheet.
        // Copied text is shown on screen and printed on exit.
        let clipboard = MemoryClipboard::new();
        let acquisition = AcquisitionSession::new(config.platform, Capability::Unavailable);
        let emulation = EmulationSession::new(
            Capability::Unavailable,
            Capability::Unavailable,
            Box::new(clipboard.clone()),
            config.error_display(),
        );

        let mut app = Self {
            vault,
            state,
            current_page: Page::Vault,
            modal: Modal::None,
            acquisition,
            emulation,
            bridge,
            field: FormField::Name,
            merge_name: engine.default_name.clone(),
            status: None,
            clipboard,
            bridge_base_url: config.bridge_base_url.clone(),
            engine,
        };

        // Launched by the platform automation: go straight to the form
        if launch_uid {
            app.open_acquisition();
        }

        app
    }

    /// Last text copied by the share fallback or the shortcut link
    pub fn clipboard_text(&self) -> Option<String> {
        self.clipboard.contents()
    }

    pub fn selected_card(&self) -> Option<&Card> {
        self.state.selected().and_then(|i| self.vault.cards().get(i))
    }

    pub fn next(&mut self) {
        let len = self.vault.len();
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
        let len = self.vault.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    fn clamp_selection(&mut self) {
        let len = self.vault.len();
        match self.state.selected() {
            _ if len == 0 => self.state.select(None),
            Some(i) if i >= len => self.state.select(Some(len - 1)),
            None => self.state.select(Some(0)),
            _ => {}
        }
    }

    // ========================================================================
    // VAULT ACTIONS
    // ========================================================================

    pub fn open_acquisition(&mut self) {
        self.acquisition.open(&mut self.bridge);
        self.field = if self.acquisition.state().detected_serial().is_some() {
            FormField::Name
        } else {
            FormField::Serial
        };
        self.modal = Modal::Acquisition;
    }

    pub fn delete_selected(&mut self) {
        if let Some(id) = self.selected_card().map(|c| c.id().to_string()) {
            if let Some(card) = self.vault.remove(&id) {
                self.status = Some(format!("Deleted {}", card.name()));
            }
            self.clamp_selection();
        }
    }

    pub fn toggle_selected(&mut self) {
        if let Some(id) = self.selected_card().map(|c| c.id().to_string()) {
            self.vault.toggle_selection(&id);
        }
    }

    pub fn open_emulation(&mut self) {
        if let Some(card) = self.selected_card().cloned() {
            self.emulation.open(&card);
            self.modal = Modal::Emulation;
        }
    }

    pub fn merge(&mut self) {
        if self.vault.selected_ids().len() < 2 {
            self.status = Some("Select at least two cards to merge".to_string());
            return;
        }

        let name = self.merge_name.clone();
        match self.vault.merge_selected(&self.engine, Some(&name)) {
            Ok(card) => {
                self.status = Some(format!("Created {} (floors {})", card.name(), card.floor_label()));
                self.merge_name = self.engine.default_name.clone();
                self.current_page = Page::Vault;
                self.state.select(Some(self.vault.len() - 1));
            }
            Err(e) => self.status = Some(format!("Merge failed: {}", e)),
        }
    }

    // ========================================================================
    // ACQUISITION MODAL
    // ========================================================================

    fn field_value(&self, field: FormField) -> String {
        let form = self.acquisition.form();
        match field {
            FormField::Serial => form.manual_serial.clone(),
            FormField::Name => form.name.clone(),
            FormField::Floors => form.floors.clone(),
        }
    }

    fn set_field_value(&mut self, field: FormField, value: &str) {
        match field {
            FormField::Serial => self.acquisition.set_manual_serial(value),
            FormField::Name => self.acquisition.set_name(value),
            FormField::Floors => self.acquisition.set_floors(value),
        }
    }

    fn next_field(&mut self) {
        let manual = *self.acquisition.state() == AcquisitionState::Manual;
        self.field = match self.field {
            FormField::Serial => FormField::Name,
            FormField::Name => FormField::Floors,
            FormField::Floors if manual => FormField::Serial,
            FormField::Floors => FormField::Name,
        };
    }

    fn close_acquisition(&mut self) {
        self.acquisition.cancel();
        self.modal = Modal::None;
    }

    fn save_acquisition(&mut self) {
        match self.acquisition.save(&mut self.vault) {
            Some(card) => {
                self.status = Some(format!("Saved {} ({})", card.name(), card.serial_number()));
                self.modal = Modal::None;
                self.state.select(Some(self.vault.len() - 1));
            }
            None => self.status = Some("Enter a card identifier first".to_string()),
        }
    }

    fn copy_shortcut_url(&mut self) {
        let url = shortcut_url(&self.bridge_base_url);
        match self.clipboard.copy(&url) {
            Ok(()) => self.status = Some("Link copied - paste it into the automation's Open URL action".to_string()),
            Err(e) => self.status = Some(format!("Copy failed: {}", e)),
        }
    }

    fn handle_acquisition_key(&mut self, key: KeyEvent) {
        match self.acquisition.state().clone() {
            AcquisitionState::IosHelp => match key.code {
                KeyCode::Char('c') => self.copy_shortcut_url(),
                KeyCode::Char('m') => {
                    self.acquisition.enter_manually();
                    self.field = FormField::Serial;
                }
                KeyCode::Esc => self.close_acquisition(),
                _ => {}
            },
            AcquisitionState::Error { .. } => match key.code {
                KeyCode::Char('m') => {
                    self.acquisition.enter_manually();
                    self.field = FormField::Serial;
                }
                KeyCode::Esc => self.close_acquisition(),
                _ => {}
            },
            AcquisitionState::Manual | AcquisitionState::Detected { .. } => match key.code {
                KeyCode::Esc => self.close_acquisition(),
                KeyCode::Enter => self.save_acquisition(),
                KeyCode::Tab => self.next_field(),
                KeyCode::Backspace => {
                    let mut value = self.field_value(self.field);
                    value.pop();
                    self.set_field_value(self.field, &value);
                }
                KeyCode::Char(c) => {
                    // The serial is fixed once detected
                    if self.field == FormField::Serial && self.acquisition.state().detected_serial().is_some() {
                        return;
                    }
                    let mut value = self.field_value(self.field);
                    value.push(c);
                    self.set_field_value(self.field, &value);
                }
                _ => {}
            },
            AcquisitionState::Scanning => {
                if key.code == KeyCode::Esc {
                    self.close_acquisition();
                }
            }
            AcquisitionState::Idle => self.modal = Modal::None,
        }
    }

    // ========================================================================
    // EMULATION MODAL
    // ========================================================================

    fn handle_emulation_key(&mut self, key: KeyEvent) {
        let now = Utc::now();
        match key.code {
            KeyCode::Char('w') => match self.emulation.write_tag(now) {
                WriteOutcome::Written => self.status = Some("Written to tag".to_string()),
                WriteOutcome::Unavailable => {
                    self.status = Some("Tag writing is not available here - press 's' to share instead".to_string())
                }
                WriteOutcome::Failed(e) => self.status = Some(format!("Write failed: {}", e)),
                WriteOutcome::NotPresenting => {}
            },
            KeyCode::Char('s') => match self.emulation.share(now) {
                ShareOutcome::Shared(ShareChannel::Clipboard) => {
                    self.status = Some("Card data copied below".to_string())
                }
                ShareOutcome::Shared(ShareChannel::ShareSheet) => self.status = Some("Card data shared".to_string()),
                ShareOutcome::Failed(e) => self.status = Some(format!("Share failed: {}", e)),
                ShareOutcome::NotPresenting => {}
            },
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => {
                self.emulation.close();
                self.modal = Modal::None;
            }
            _ => {}
        }
    }

    // ========================================================================
    // KEY DISPATCH
    // ========================================================================

    /// Returns false when the app should exit
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match self.modal {
            Modal::Acquisition => {
                self.handle_acquisition_key(key);
                return true;
            }
            Modal::Emulation => {
                self.handle_emulation_key(key);
                return true;
            }
            Modal::None => {}
        }

        match (self.current_page, key.code) {
            (_, KeyCode::Char('q')) if self.current_page == Page::Vault => return false,
            (_, KeyCode::Tab) => self.current_page = self.current_page.next(),
            (Page::Vault, KeyCode::Down | KeyCode::Char('j')) => self.next(),
            (Page::Vault, KeyCode::Up | KeyCode::Char('k')) => self.previous(),
            (Page::Vault, KeyCode::Char('a')) => self.open_acquisition(),
            (Page::Vault, KeyCode::Char('d')) => self.delete_selected(),
            (Page::Vault, KeyCode::Char(' ')) => self.toggle_selected(),
            (Page::Vault, KeyCode::Enter) => self.open_emulation(),
            (Page::Vault, KeyCode::Esc) => return false,
            (Page::Merge, KeyCode::Esc) => self.current_page = Page::Vault,
            (Page::Merge, KeyCode::Enter) => self.merge(),
            (Page::Merge, KeyCode::Backspace) => {
                self.merge_name.pop();
            }
            (Page::Merge, KeyCode::Char(c)) => self.merge_name.push(c),
            _ => {}
        }
        true
    }

    pub fn tick(&mut self) {
        self.emulation.tick(Utc::now());
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

    if let Err(err) = res {
        tracing::error!(error = %err, "terminal UI stopped");
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        // Poll so expired emulation errors clear without a keypress
        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && !app.handle_key(key) {
                    return Ok(());
                }
            }
        }
        app.tick();
    }
}

// ============================================================================
// RENDERING
// ============================================================================

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5), Constraint::Length(3)])
        .split(f.size());

    render_header(f, app, chunks[0]);
    match app.current_page {
        Page::Vault => render_vault(f, app, chunks[1]),
        Page::Merge => render_merge(f, app, chunks[1]),
    }
    render_footer(f, app, chunks[2]);

    match app.modal {
        Modal::Acquisition => render_acquisition(f, app),
        Modal::Emulation => render_emulation(f, app),
        Modal::None => {}
    }
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let tabs: Vec<Span> = [Page::Vault, Page::Merge]
        .iter()
        .flat_map(|page| {
            let style = if *page == app.current_page {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            vec![Span::styled(format!(" {} ", page.title()), style), Span::raw(" ")]
        })
        .collect();

    let mut line = vec![Span::styled(
        "LiftKey ",
        Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
    )];
    line.extend(tabs);
    line.push(Span::styled(
        format!("  {} cards, {} selected", app.vault.len(), app.vault.selected_ids().len()),
        Style::default().fg(Color::Gray),
    ));

    let header = Paragraph::new(Line::from(line)).block(Block::default().borders(Borders::ALL));
    f.render_widget(header, area);
}

fn type_color(card_type: CardType) -> Color {
    match card_type {
        CardType::Old => Color::Gray,
        CardType::New => Color::Blue,
        CardType::Merged => Color::Magenta,
    }
}

fn render_vault(f: &mut Frame, app: &mut App, area: Rect) {
    if app.vault.is_empty() {
        let empty = Paragraph::new("No cards yet. Press 'a' to add one.")
            .block(Block::default().borders(Borders::ALL).title(" Vault "));
        f.render_widget(empty, area);
        return;
    }

    let rows: Vec<Row> = app
        .vault
        .cards()
        .iter()
        .map(|card| {
            let mark = if app.vault.is_selected(card.id()) { "[x]" } else { "[ ]" };
            Row::new(vec![
                Cell::from(mark),
                Cell::from(card.name().to_string()),
                Cell::from(card.serial_number().to_string()),
                Cell::from(card.card_type().as_str()).style(Style::default().fg(type_color(card.card_type()))),
                Cell::from(card.floor_label()),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(4),
        Constraint::Percentage(30),
        Constraint::Percentage(30),
        Constraint::Length(8),
        Constraint::Min(10),
    ];

    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["", "Name", "UID", "Type", "Floors"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().borders(Borders::ALL).title(" Vault "))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_merge(f: &mut Frame, app: &App, area: Rect) {
    let selected = app.vault.selected_cards();
    let floors = union_floors(selected.iter().copied());

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(format!(
        "{} card(s) selected - their floors are combined into one card.",
        selected.len()
    )));
    lines.push(Line::from(""));
    for card in &selected {
        lines.push(Line::from(vec![
            Span::styled(format!("  {} ", card.name()), Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(format!("floors {}", card.floor_label()), Style::default().fg(Color::Gray)),
        ]));
    }
    lines.push(Line::from(""));
    let combined = floors.iter().map(|f| f.to_string()).collect::<Vec<_>>().join(", ");
    lines.push(Line::from(vec![
        Span::styled("Combined: ", Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)),
        Span::raw(format!("{} ({} floors)", combined, floors.len())),
    ]));
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::raw("New card name: "),
        Span::styled(format!("{}_", app.merge_name), Style::default().fg(Color::Cyan)),
    ]));

    let body = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(" Merge "));
    f.render_widget(body, area);
}

fn render_footer(f: &mut Frame, app: &App, area: Rect) {
    let help = match (app.modal, app.current_page) {
        (Modal::Acquisition, _) => "Tab: next field | Enter: save | Esc: cancel",
        (Modal::Emulation, _) => "w: write tag | s: share | Esc: close",
        (Modal::None, Page::Vault) => "a: add | Space: select | Enter: use | d: delete | Tab: merge | q: quit",
        (Modal::None, Page::Merge) => "type: name | Enter: merge | Esc/Tab: back",
    };

    let text = match &app.status {
        Some(status) => format!("{}  |  {}", status, help),
        None => help.to_string(),
    };

    let footer = Paragraph::new(text).block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, area);
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

fn form_line<'a>(label: &'a str, value: String, active: bool) -> Line<'a> {
    let style = if active {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let cursor = if active { "_" } else { "" };
    Line::from(vec![
        Span::styled(format!("{:<8}", label), Style::default().fg(Color::DarkGray)),
        Span::styled(format!("{}{}", value, cursor), style),
    ])
}

fn render_acquisition(f: &mut Frame, app: &App) {
    let area = centered_rect(60, 50, f.size());
    let state = app.acquisition.state();

    let (title, lines): (&str, Vec<Line>) = match state {
        AcquisitionState::IosHelp => (
            " iPhone bridge ",
            vec![
                Line::from("This device cannot scan from the app."),
                Line::from("1. Open the Shortcuts app."),
                Line::from("2. When a tag is read, run 'Open URL' with the link below."),
                Line::from(""),
                Line::from(Span::styled(
                    shortcut_url(&app.bridge_base_url),
                    Style::default().fg(Color::Blue),
                )),
                Line::from(""),
                match app.clipboard_text() {
                    Some(text) if text == shortcut_url(&app.bridge_base_url) => Line::from(Span::styled(
                        "Link copied (printed again when LiftKey closes)",
                        Style::default().fg(Color::Green),
                    )),
                    _ => Line::from(""),
                },
                Line::from("c: copy link | m: enter manually | Esc: close"),
            ],
        ),
        AcquisitionState::Scanning => (
            " Scanning ",
            vec![Line::from("Hold the card against the back of the phone...")],
        ),
        AcquisitionState::Error { message } => (
            " Scan failed ",
            vec![
                Line::from(Span::styled(message.clone(), Style::default().fg(Color::Red))),
                Line::from(""),
                Line::from("m: enter manually | Esc: close"),
            ],
        ),
        AcquisitionState::Manual | AcquisitionState::Detected { .. } => {
            let form = app.acquisition.form();
            let serial_line = match state.detected_serial() {
                Some(serial) => Line::from(vec![
                    Span::styled(format!("{:<8}", "UID"), Style::default().fg(Color::DarkGray)),
                    Span::styled(serial.to_string(), Style::default().fg(Color::Green)),
                ]),
                None => form_line("UID", form.manual_serial.clone(), app.field == FormField::Serial),
            };
            let title = if state.detected_serial().is_some() { " Card ready " } else { " Enter card " };
            (
                title,
                vec![
                    serial_line,
                    form_line("Label", form.name.clone(), app.field == FormField::Name),
                    form_line("Floors", form.floors.clone(), app.field == FormField::Floors),
                    Line::from(""),
                    Line::from(Span::styled("Floors: e.g. 1, 3, 5", Style::default().fg(Color::DarkGray))),
                ],
            )
        }
        AcquisitionState::Idle => (" ", Vec::new()),
    };

    let modal = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(Clear, area);
    f.render_widget(modal, area);
}

/// Copied text rendered verbatim, one line per line
fn copied_lines(text: &str) -> Vec<Line<'static>> {
    text.lines()
        .map(|line| Line::from(Span::styled(line.to_string(), Style::default().fg(Color::Yellow))))
        .collect()
}

fn render_emulation(f: &mut Frame, app: &App) {
    let area = centered_rect(60, 50, f.size());
    let Some(card) = app.emulation.card() else {
        return;
    };

    let (status, color) = match app.emulation.state() {
        EmulationState::Presenting => ("Hold near the reader".to_string(), Color::Blue),
        EmulationState::Written => ("Written to tag".to_string(), Color::Green),
        EmulationState::Shared { channel: ShareChannel::Clipboard } => ("Copied - select the text below".to_string(), Color::Green),
        EmulationState::Shared { channel: ShareChannel::ShareSheet } => ("Shared".to_string(), Color::Green),
        EmulationState::Error { message, .. } => (message.clone(), Color::Red),
        EmulationState::Idle => (String::new(), Color::Gray),
    };

    let mut lines = vec![
        Line::from(Span::styled(status, Style::default().fg(color).add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(vec![
            Span::styled("UID     ", Style::default().fg(Color::DarkGray)),
            Span::styled(card.serial_number().to_string(), Style::default().fg(Color::Blue)),
        ]),
        Line::from(vec![
            Span::styled("Floors  ", Style::default().fg(Color::DarkGray)),
            Span::raw(card.floor_label()),
        ]),
        Line::from(""),
    ];
    let copied = matches!(app.emulation.state(), EmulationState::Shared { channel: ShareChannel::Clipboard });
    match app.clipboard_text() {
        Some(text) if copied => lines.extend(copied_lines(&text)),
        _ if app.emulation.transfer_path() == TransferPath::ShareOnly => {
            lines.push(Line::from("No tag writer here: press 's' to share the card data."))
        }
        _ => {}
    }

    let modal = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(format!(" {} ", card.name())));
    f.render_widget(Clear, area);
    f.render_widget(modal, area);
}
