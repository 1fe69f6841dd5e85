//! Domain model shared by the store and both front ends. A book is four
//! free-form text fields; nothing here parses years or page counts because the
//! catalog file never did either.

use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// One catalog entry. The title doubles as the lookup key for edit and remove,
/// but nothing stops two books from sharing a title.
pub struct Book {
    /// Title shown in the list pane and used to find the record again.
    pub title: String,
    pub author: String,
    /// Kept as raw text so entries like "c. 1600" survive untouched.
    pub release_year: String,
    pub pages: String,
}

impl Book {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        release_year: impl Into<String>,
        pages: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            release_year: release_year.into(),
            pages: pages.into(),
        }
    }

    /// Field names paired with their values, in on-disk column order.
    pub fn fields(&self) -> [(&'static str, &str); 4] {
        [
            ("title", &self.title),
            ("author", &self.author),
            ("release_year", &self.release_year),
            ("pages", &self.pages),
        ]
    }

    /// `Title - Author`, dropping the hyphen when the author is blank.
    pub fn display_title(&self) -> String {
        if self.author.trim().is_empty() {
            self.title.clone()
        } else {
            format!("{} - {}", self.title, self.author)
        }
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}
