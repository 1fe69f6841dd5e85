use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::Book;

/// Fields of the book form, in the order Tab walks through them.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum BookField {
    #[default]
    Title,
    Author,
    ReleaseYear,
    Pages,
}

impl BookField {
    pub(crate) const ALL: [BookField; 4] = [
        BookField::Title,
        BookField::Author,
        BookField::ReleaseYear,
        BookField::Pages,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            BookField::Title => "Title",
            BookField::Author => "Author",
            BookField::ReleaseYear => "Release Year",
            BookField::Pages => "Pages",
        }
    }

    fn next(self) -> Self {
        match self {
            BookField::Title => BookField::Author,
            BookField::Author => BookField::ReleaseYear,
            BookField::ReleaseYear => BookField::Pages,
            BookField::Pages => BookField::Title,
        }
    }

    fn previous(self) -> Self {
        match self {
            BookField::Title => BookField::Pages,
            BookField::Author => BookField::Title,
            BookField::ReleaseYear => BookField::Author,
            BookField::Pages => BookField::ReleaseYear,
        }
    }
}

/// Form state for adding or editing a book. `old_title` is the edit context:
/// empty means the form adds a new record, otherwise it edits the record that
/// carried that title when the form was opened.
#[derive(Default, Clone, Debug)]
pub(crate) struct BookForm {
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) release_year: String,
    pub(crate) pages: String,
    pub(crate) active: BookField,
    pub(crate) error: Option<String>,
    pub(crate) old_title: Option<String>,
}

impl BookForm {
    /// Populate the form from an existing book when entering edit mode.
    pub(crate) fn from_book(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            release_year: book.release_year.clone(),
            pages: book.pages.clone(),
            active: BookField::Title,
            error: None,
            old_title: Some(book.title.clone()),
        }
    }

    pub(crate) fn is_edit(&self) -> bool {
        self.old_title.is_some()
    }

    pub(crate) fn focus_next(&mut self) {
        self.active = self.active.next();
    }

    pub(crate) fn focus_previous(&mut self) {
        self.active = self.active.previous();
    }

    /// Append a character to the active field. Control characters are
    /// ignored.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.value_mut(self.active).push(ch);
        true
    }

    /// Remove the last character from the active field.
    pub(crate) fn backspace(&mut self) {
        self.value_mut(self.active).pop();
    }

    /// The record the form currently describes. Fields are passed through
    /// as typed; the store decides what it can persist.
    pub(crate) fn to_book(&self) -> Book {
        Book::new(
            self.title.clone(),
            self.author.clone(),
            self.release_year.clone(),
            self.pages.clone(),
        )
    }

    pub(crate) fn value(&self, field: BookField) -> &str {
        match field {
            BookField::Title => &self.title,
            BookField::Author => &self.author,
            BookField::ReleaseYear => &self.release_year,
            BookField::Pages => &self.pages,
        }
    }

    fn value_mut(&mut self, field: BookField) -> &mut String {
        match field {
            BookField::Title => &mut self.title,
            BookField::Author => &mut self.author,
            BookField::ReleaseYear => &mut self.release_year,
            BookField::Pages => &mut self.pages,
        }
    }

    /// Character count of a field, for cursor placement.
    pub(crate) fn value_len(&self, field: BookField) -> usize {
        self.value(field).chars().count()
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, field: BookField) -> Line<'static> {
        let value = self.value(field);
        let is_active = self.active == field;

        let display = if value.is_empty() && !is_active {
            "<empty>".to_string()
        } else {
            value.to_string()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{}: ", field.label())),
            Span::styled(display, style),
        ])
    }
}
