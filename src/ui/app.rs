use std::fs::File;
use std::mem;

use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use tracing::{debug, warn};

use crate::models::Book;
use crate::store::{Backing, BookStore, StoreError};

use super::forms::{BookField, BookForm};
use super::helpers::{clamp_selection, key_hints, step_selection};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Share of the width given to the title list; the form takes the rest.
const LIST_WIDTH_PERCENT: u16 = 40;

/// What the keyboard currently drives.
enum Mode {
    Browsing,
    Editing(BookForm),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Application state for the list/form UI. The store is handed in by the
/// caller and owned here for as long as the UI runs.
pub struct App<B: Backing = File> {
    store: BookStore<B>,
    selected: usize,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl<B: Backing> App<B> {
    pub fn new(store: BookStore<B>) -> Self {
        Self {
            store,
            selected: 0,
            mode: Mode::Browsing,
            status: None,
        }
    }

    pub fn store(&self) -> &BookStore<B> {
        &self.store
    }

    /// Give the store back, e.g. to close it explicitly after the UI exits.
    pub fn into_store(self) -> BookStore<B> {
        self.store
    }

    /// The book under the list cursor, if the list is not empty.
    pub fn selected_book(&self) -> Option<&Book> {
        self.store.get(self.selected)
    }

    pub fn selected_index(&self) -> Option<usize> {
        (!self.store.is_empty()).then_some(self.selected)
    }

    /// Feed one key press through the current mode. Returns `true` when the
    /// user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Browsing);

        self.mode = match mode {
            Mode::Browsing => self.handle_browse_key(code, &mut exit),
            Mode::Editing(form) => self.handle_form_key(code, form),
        };

        exit
    }

    fn handle_browse_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                *exit = true;
            }
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::PageUp => self.move_selection(-10),
            KeyCode::PageDown => self.move_selection(10),
            KeyCode::Home => self.selected = 0,
            KeyCode::End => self.selected = self.store.len().saturating_sub(1),
            KeyCode::Char('a') => {
                self.clear_status();
                return Mode::Editing(BookForm::default());
            }
            KeyCode::Char('e') => {
                if let Some(book) = self.selected_book() {
                    let form = BookForm::from_book(book);
                    self.clear_status();
                    return Mode::Editing(form);
                }
                self.set_status("No book selected to edit.", StatusKind::Error);
            }
            // TODO: confirmation dialog before deleting.
            KeyCode::Char('d') => self.delete_selected(),
            _ => {}
        }
        Mode::Browsing
    }

    fn handle_form_key(&mut self, code: KeyCode, mut form: BookForm) -> Mode {
        match code {
            KeyCode::Esc => {
                let message = if form.is_edit() {
                    "Edit cancelled."
                } else {
                    "Add cancelled."
                };
                self.set_status(message, StatusKind::Info);
                return Mode::Browsing;
            }
            KeyCode::Tab | KeyCode::Down => form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => form.focus_previous(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.submit(&form) {
                Ok(()) => return Mode::Browsing,
                Err(err) => {
                    let message = err.to_string();
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Mode::Editing(form)
    }

    /// Add when the form has no edit context, otherwise edit the record it
    /// was opened from. The list cursor follows the saved record.
    fn submit(&mut self, form: &BookForm) -> Result<(), StoreError> {
        let book = form.to_book();
        let summary = book.display_title();

        let (index, verb) = match &form.old_title {
            None => (self.store.add(book)?, "added"),
            Some(old_title) => (self.store.edit(old_title, book)?, "edited"),
        };

        self.selected = index;
        self.set_status(format!("Book {verb}: {summary}"), StatusKind::Info);
        Ok(())
    }

    fn delete_selected(&mut self) {
        let Some(title) = self.selected_book().map(|book| book.title.clone()) else {
            self.set_status("No book selected to delete.", StatusKind::Error);
            return;
        };

        match self.store.remove(&title) {
            Ok(removed) => {
                self.selected = clamp_selection(self.selected, self.store.len());
                self.set_status(
                    format!("Book removed: {}", removed.display_title()),
                    StatusKind::Info,
                );
            }
            Err(err) => {
                warn!(error = %err, title = %title, "delete failed");
                self.set_status(err.to_string(), StatusKind::Error);
            }
        }
    }

    fn move_selection(&mut self, offset: isize) {
        self.selected = step_selection(self.selected, offset, self.store.len());
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        let text = text.into();
        debug!(status = %text, "status updated");
        self.status = Some(StatusMessage { text, kind });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(LIST_WIDTH_PERCENT),
                Constraint::Percentage(100 - LIST_WIDTH_PERCENT),
            ])
            .split(content_area);

        self.draw_book_list(frame, panes[0]);
        match &self.mode {
            Mode::Browsing => self.draw_details(frame, panes[1]),
            Mode::Editing(form) => self.draw_form(frame, panes[1], form),
        }

        if area.height > footer_height {
            self.draw_footer(frame, footer_area);
        }
    }

    fn draw_book_list(&self, frame: &mut Frame, area: Rect) {
        let title = format!("Books ({})", self.store.len());
        let block = Block::default().title(title).borders(Borders::ALL);

        if self.store.is_empty() {
            let message = Paragraph::new("No books yet. Press 'a' to add one.")
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let items: Vec<ListItem> = self
            .store
            .list()
            .iter()
            .map(|book| ListItem::new(book.title.clone()))
            .collect();

        let highlight = if matches!(self.mode, Mode::Browsing) {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };

        let list = List::new(items)
            .block(block)
            .highlight_style(highlight)
            .highlight_symbol("> ");

        let mut state = ListState::default().with_selected(self.selected_index());
        frame.render_stateful_widget(list, area, &mut state);
    }

    /// Read-only view of the selected book while browsing.
    fn draw_details(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().title("Details").borders(Borders::ALL);

        let lines: Vec<Line> = match self.selected_book() {
            Some(book) => {
                let label_style = Style::default().add_modifier(Modifier::BOLD);
                BookField::ALL
                    .iter()
                    .zip(book.fields())
                    .map(|(field, (_, value))| {
                        Line::from(vec![
                            Span::styled(format!("{}: ", field.label()), label_style),
                            Span::raw(value.to_string()),
                        ])
                    })
                    .collect()
            }
            None => vec![Line::from(Span::styled(
                "Nothing selected.",
                Style::default().fg(Color::DarkGray),
            ))],
        };

        let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn draw_form(&self, frame: &mut Frame, area: Rect, form: &BookForm) {
        let title = if form.is_edit() { "Edit Book" } else { "Add Book" };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow));
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let mut lines: Vec<Line> = BookField::ALL
            .iter()
            .map(|field| form.build_line(*field))
            .collect();
        lines.push(Line::from(""));

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save • Tab to switch field • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
        frame.render_widget(paragraph, inner);

        if inner.width == 0 || inner.height == 0 {
            return;
        }
        let row = BookField::ALL
            .iter()
            .position(|field| *field == form.active)
            .unwrap_or(0) as u16;
        let prefix = format!("{}: ", form.active.label()).chars().count();
        let column = (prefix + form.value_len(form.active)) as u16;
        let cursor_x = (inner.x + column).min(inner.right().saturating_sub(1));
        let cursor_y = (inner.y + row).min(inner.bottom().saturating_sub(1));
        frame.set_cursor_position((cursor_x, cursor_y));
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = match self.mode {
            Mode::Browsing => key_hints(&[
                ("↑↓", "Navigate"),
                ("a", "Add"),
                ("e", "Edit"),
                ("d", "Delete"),
                ("q", "Quit"),
            ]),
            Mode::Editing(_) => key_hints(&[
                ("Tab", "Next Field"),
                ("Enter", "Save"),
                ("Esc", "Cancel"),
            ]),
        };

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }
}
