use crate::notifier::{HeadlessNotifier, Notifier, BUTTON_OK};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};
use std::{io, time::Duration};
use tracing::{debug, warn};

/// Shows notifications as a modal dialog in the terminal.
#[derive(Debug, Default)]
pub struct TuiNotifier;

impl Notifier for TuiNotifier {
    fn notify(&mut self, title: &str, message: &str, buttons: &[&str]) -> Option<String> {
        let mut dialog = Dialog::new(title, message, buttons);
        match show_dialog(&mut dialog) {
            Ok(choice) => {
                debug!("Dialog '{}' closed with {:?}", title, choice);
                choice.map(|i| buttons[i].to_string())
            }
            Err(e) => {
                warn!("Terminal dialog failed ({}), logging instead", e);
                HeadlessNotifier.notify(title, message, buttons)
            }
        }
    }

    fn notify_info(&mut self, title: &str, message: &str) {
        self.notify(title, message, &[BUTTON_OK]);
    }
}

/// What a key press did to the dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogAction {
    /// The button at this index was chosen
    Choose(usize),
    Dismiss,
}

/// State of an open dialog
pub struct Dialog<'a> {
    pub title: &'a str,
    pub message: &'a str,
    pub buttons: &'a [&'a str],
    pub selected: usize,
}

impl<'a> Dialog<'a> {
    pub fn new(title: &'a str, message: &'a str, buttons: &'a [&'a str]) -> Self {
        Self {
            title,
            message,
            buttons,
            selected: 0,
        }
    }

    pub fn next(&mut self) {
        if self.buttons.is_empty() {
            return;
        }
        self.selected = (self.selected + 1) % self.buttons.len();
    }

    pub fn previous(&mut self) {
        if self.buttons.is_empty() {
            return;
        }
        self.selected = if self.selected == 0 {
            self.buttons.len() - 1
        } else {
            self.selected - 1
        };
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Option<DialogAction> {
        match code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => Some(DialogAction::Dismiss),
            KeyCode::Enter | KeyCode::Char(' ') => {
                if self.buttons.is_empty() {
                    Some(DialogAction::Dismiss)
                } else {
                    Some(DialogAction::Choose(self.selected))
                }
            }
            KeyCode::Right | KeyCode::Tab | KeyCode::Char('l') => {
                self.next();
                None
            }
            KeyCode::Left | KeyCode::BackTab | KeyCode::Char('h') => {
                self.previous();
                None
            }
            _ => None,
        }
    }
}

/// Take over the terminal until the dialog is answered.
fn show_dialog(dialog: &mut Dialog<'_>) -> io::Result<Option<usize>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_dialog(&mut terminal, dialog);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_dialog<B: Backend>(
    terminal: &mut Terminal<B>,
    dialog: &mut Dialog<'_>,
) -> io::Result<Option<usize>> {
    loop {
        terminal.draw(|f| ui(f, dialog))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match dialog.handle_key(key.code) {
                    Some(DialogAction::Choose(index)) => return Ok(Some(index)),
                    Some(DialogAction::Dismiss) => return Ok(None),
                    None => {}
                }
            }
        }
    }
}

/// Centre a box of the given size inside `area`
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn ui(f: &mut Frame<'_>, dialog: &Dialog<'_>) {
    let header_color = Color::Rgb(0, 120, 215);
    let accent_color = Color::Rgb(99, 102, 241);
    let bg_color = Color::Rgb(30, 41, 59);

    f.render_widget(Block::default().style(Style::default().bg(bg_color)), f.size());

    let area = centered(f.size(), 64, 12);
    f.render_widget(Clear, area);

    let frame = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(header_color))
        .title(format!(" {} ", dialog.title))
        .title_style(Style::default().fg(header_color).add_modifier(Modifier::BOLD))
        .style(Style::default().bg(bg_color));
    let inner = frame.inner(area);
    f.render_widget(frame, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(inner);

    let message = Paragraph::new(dialog.message)
        .style(Style::default().fg(Color::White))
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center);
    f.render_widget(message, chunks[0]);

    let mut spans = Vec::new();
    for (i, label) in dialog.buttons.iter().enumerate() {
        let style = if i == dialog.selected {
            Style::default()
                .fg(Color::White)
                .bg(accent_color)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Rgb(148, 163, 184))
        };
        if i > 0 {
            spans.push(Span::raw("   "));
        }
        spans.push(Span::styled(format!("[ {} ]", label), style));
    }
    let buttons = Paragraph::new(Line::from(spans)).alignment(Alignment::Center);
    f.render_widget(buttons, chunks[1]);
}
