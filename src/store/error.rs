use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while loading or mutating the catalog file.
/// None of these are fatal: front ends report them and keep running.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The catalog file could not be opened or read at startup.
    #[error("Failed to open catalog '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A stored line does not split into exactly four fields.
    #[error("Malformed record on line {line_number} of '{path}': {line:?}")]
    Parse {
        path: PathBuf,
        line_number: usize,
        line: String,
    },

    /// No record carries the requested title.
    #[error("No book titled \"{title}\" in the catalog.")]
    NotFound { title: String },

    /// Writing or flushing the catalog failed. The in-memory list has been put
    /// back to its last persisted state.
    #[error("Failed to write catalog '{path}': {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The value contains a delimiter the line format cannot represent.
    #[error("The {field} field cannot contain commas or line breaks: {value:?}")]
    InvalidField { field: &'static str, value: String },
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_names_line() {
        let err = StoreError::Parse {
            path: PathBuf::from("books.txt"),
            line_number: 3,
            line: "Dune,Herbert".to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("line 3"));
        assert!(msg.contains("books.txt"));
        assert!(msg.contains("Dune,Herbert"));
    }

    #[test]
    fn persistence_error_keeps_source() {
        let err = StoreError::Persistence {
            path: PathBuf::from("/full/disk/books.txt"),
            source: io::Error::new(io::ErrorKind::Other, "No space left on device"),
        };

        assert!(err.to_string().contains("No space left"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
