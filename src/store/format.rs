//! The catalog line format: `title,author,release_year,pages\n`. There is no
//! quoting, so a field may never contain the delimiter or a line break.

use std::path::Path;

use crate::models::Book;

use super::error::{StoreError, StoreResult};

const DELIMITER: char = ',';
const FIELD_COUNT: usize = 4;

/// Render one record as a newline-terminated line.
pub(crate) fn serialize_line(book: &Book) -> String {
    format!(
        "{}{DELIMITER}{}{DELIMITER}{}{DELIMITER}{}\n",
        book.title, book.author, book.release_year, book.pages
    )
}

/// Render every record, in order, as the full file body.
pub(crate) fn serialize_all(books: &[Book]) -> String {
    books.iter().map(serialize_line).collect()
}

/// Reject records whose fields would not survive a write/read cycle.
pub(crate) fn check_encodable(book: &Book) -> StoreResult<()> {
    for (field, value) in book.fields() {
        if value.contains([DELIMITER, '\n', '\r']) {
            return Err(StoreError::InvalidField {
                field,
                value: value.to_string(),
            });
        }
    }
    Ok(())
}

/// Parse the full file body. Blank lines are skipped and reported back as
/// 1-based line numbers so the caller can log them.
pub(crate) fn parse_all(path: &Path, contents: &str) -> StoreResult<(Vec<Book>, Vec<usize>)> {
    let mut books = Vec::new();
    let mut skipped = Vec::new();

    for (idx, raw) in contents.lines().enumerate() {
        let line_number = idx + 1;
        // `lines` already strips a trailing "\r\n"; a lone "\r" can remain.
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        if line.is_empty() {
            skipped.push(line_number);
            continue;
        }
        books.push(parse_line(path, line_number, line)?);
    }

    Ok((books, skipped))
}

fn parse_line(path: &Path, line_number: usize, line: &str) -> StoreResult<Book> {
    let fields: Vec<&str> = line.split(DELIMITER).collect();
    match fields.as_slice() {
        [title, author, release_year, pages] => {
            Ok(Book::new(*title, *author, *release_year, *pages))
        }
        _ => Err(StoreError::Parse {
            path: path.to_path_buf(),
            line_number,
            line: line.to_string(),
        }),
    }
}
