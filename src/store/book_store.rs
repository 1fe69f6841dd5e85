use std::fs::File;
use std::io;
use std::mem;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::models::Book;

use super::backing::{open_append, Backing};
use super::error::{StoreError, StoreResult};
use super::format;

/// Ordered list of books mirrored write-through into a delimited text file.
///
/// The in-memory list is the query cache and the file is the durable copy.
/// Every mutation hits the file before returning; when a write fails the list
/// is restored so both sides still agree on the last persisted state. The
/// handle is held for the lifetime of the store and released on drop.
pub struct BookStore<B: Backing = File> {
    path: PathBuf,
    backing: B,
    books: Vec<Book>,
    /// Set when the file ends mid-line, so the next append starts a new one.
    needs_newline: bool,
}

impl BookStore<File> {
    /// Open (or create) the catalog at `path` and load every record.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = open_append(&path).map_err(|source| StoreError::Open {
            path: path.clone(),
            source,
        })?;
        Self::from_backing(path, file)
    }
}

impl<B: Backing> BookStore<B> {
    /// Load records from an already opened backing. `path` is only used for
    /// error messages and logging.
    pub fn from_backing(path: PathBuf, mut backing: B) -> StoreResult<Self> {
        let contents = backing.read_all().map_err(|source| StoreError::Open {
            path: path.clone(),
            source,
        })?;

        let (books, skipped) = format::parse_all(&path, &contents)?;
        for line_number in skipped {
            warn!(path = %path.display(), line_number, "skipping blank catalog line");
        }

        let needs_newline = !contents.is_empty() && !contents.ends_with('\n');
        info!(path = %path.display(), count = books.len(), "catalog loaded");

        Ok(Self {
            path,
            backing,
            books,
            needs_newline,
        })
    }

    /// Every record in insertion order.
    pub fn list(&self) -> &[Book] {
        &self.books
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Book> {
        self.books.get(index)
    }

    /// Position of the first record titled `title`.
    pub fn find(&self, title: &str) -> Option<usize> {
        self.books.iter().position(|book| book.title == title)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a record and return its index. Titles are not deduplicated.
    pub fn add(&mut self, book: Book) -> StoreResult<usize> {
        format::check_encodable(&book)?;

        let mut line = String::new();
        if self.needs_newline {
            line.push('\n');
        }
        line.push_str(&format::serialize_line(&book));

        let previous_len = self
            .backing
            .len()
            .map_err(|source| self.persistence_error(source))?;

        if let Err(source) = self.append_line(&line) {
            error!(path = %self.path.display(), error = %source, "failed to append book");
            if let Err(err) = self.backing.truncate(previous_len) {
                warn!(path = %self.path.display(), error = %err, "could not trim torn append");
            }
            return Err(self.persistence_error(source));
        }

        self.needs_newline = false;
        self.books.push(book);
        let index = self.books.len() - 1;
        info!(index, title = %self.books[index].title, "book added");
        Ok(index)
    }

    /// Replace every field of the first record titled `old_title` and return
    /// its index.
    pub fn edit(&mut self, old_title: &str, book: Book) -> StoreResult<usize> {
        format::check_encodable(&book)?;
        let index = self.require(old_title)?;

        let previous = mem::replace(&mut self.books[index], book);
        if let Err(err) = self.rewrite() {
            self.books[index] = previous;
            self.recover_file();
            return Err(err);
        }

        info!(index, old_title, title = %self.books[index].title, "book edited");
        Ok(index)
    }

    /// Remove the first record titled `title` and hand it back.
    pub fn remove(&mut self, title: &str) -> StoreResult<Book> {
        let index = self.require(title)?;

        let removed = self.books.remove(index);
        if let Err(err) = self.rewrite() {
            self.books.insert(index, removed);
            self.recover_file();
            return Err(err);
        }

        info!(index, title, "book removed");
        Ok(removed)
    }

    /// Flush and release the handle, reporting any final I/O error. Dropping
    /// the store releases the handle as well, just silently.
    pub fn close(mut self) -> StoreResult<()> {
        self.backing
            .flush()
            .map_err(|source| self.persistence_error(source))?;
        debug!(path = %self.path.display(), "catalog closed");
        Ok(())
    }

    fn require(&self, title: &str) -> StoreResult<usize> {
        self.find(title).ok_or_else(|| StoreError::NotFound {
            title: title.to_string(),
        })
    }

    fn append_line(&mut self, line: &str) -> io::Result<()> {
        self.backing.append(line.as_bytes())?;
        self.backing.flush()
    }

    /// Truncate the file and write the whole list back out.
    fn rewrite(&mut self) -> StoreResult<()> {
        let body = format::serialize_all(&self.books);
        if let Err(source) = self.write_body(&body) {
            error!(path = %self.path.display(), error = %source, "failed to rewrite catalog");
            return Err(self.persistence_error(source));
        }
        self.needs_newline = false;
        Ok(())
    }

    fn write_body(&mut self, body: &str) -> io::Result<()> {
        self.backing.truncate(0)?;
        self.backing.append(body.as_bytes())?;
        self.backing.flush()
    }

    /// After a failed rewrite the file may be truncated or half written; try
    /// once to put the restored list back on disk.
    fn recover_file(&mut self) {
        if self.rewrite().is_err() {
            warn!(path = %self.path.display(), "catalog file may not match memory until the next successful write");
        }
    }

    fn persistence_error(&self, source: io::Error) -> StoreError {
        StoreError::Persistence {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::super::backing::testing::FlakyBacking;
    use super::*;

    fn catalog_path(dir: &TempDir) -> PathBuf {
        dir.path().join("books.txt")
    }

    fn dune() -> Book {
        Book::new("Dune", "Herbert", "1965", "412")
    }

    fn orwell() -> Book {
        Book::new("1984", "Orwell", "1949", "328")
    }

    /// The file parses back to exactly what the store holds in memory.
    fn assert_mirrored(store: &BookStore) {
        let contents = fs::read_to_string(store.path()).unwrap();
        let (books, _) = format::parse_all(store.path(), &contents).unwrap();
        assert_eq!(books, store.list());
    }

    fn flaky_store(contents: &str) -> (BookStore<FlakyBacking>, FlakyBacking) {
        let backing = FlakyBacking::with_contents(contents);
        let store = BookStore::from_backing(PathBuf::from("books.txt"), backing.clone()).unwrap();
        (store, backing)
    }

    #[test]
    fn open_creates_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = catalog_path(&dir);

        let store = BookStore::open(&path).unwrap();

        assert!(path.exists());
        assert!(store.is_empty());
    }

    #[test]
    fn open_reports_missing_parent_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("books.txt");

        assert!(matches!(
            BookStore::open(&path),
            Err(StoreError::Open { .. })
        ));
    }

    #[test]
    fn open_fails_on_malformed_line() {
        let dir = TempDir::new().unwrap();
        let path = catalog_path(&dir);
        fs::write(&path, "Dune,Herbert,1965,412\nbroken line\n").unwrap();

        match BookStore::open(&path) {
            Err(StoreError::Parse { line_number, .. }) => assert_eq!(line_number, 2),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("malformed catalog should not open"),
        }
    }

    #[test]
    fn reopen_reproduces_records() {
        let dir = TempDir::new().unwrap();
        let path = catalog_path(&dir);

        {
            let mut store = BookStore::open(&path).unwrap();
            store.add(dune()).unwrap();
            store.close().unwrap();
        }

        let store = BookStore::open(&path).unwrap();
        assert_eq!(store.list(), [dune()]);
    }

    #[test]
    fn add_returns_index_and_writes_line() {
        let dir = TempDir::new().unwrap();
        let mut store = BookStore::open(catalog_path(&dir)).unwrap();

        assert_eq!(store.add(orwell()).unwrap(), 0);
        let index = store.add(dune()).unwrap();

        assert_eq!(index, 1);
        assert_eq!(store.get(index), Some(&dune()));
        assert_eq!(store.list().iter().filter(|b| **b == dune()).count(), 1);
        assert_eq!(
            fs::read_to_string(store.path()).unwrap(),
            "1984,Orwell,1949,328\nDune,Herbert,1965,412\n"
        );
    }

    #[test]
    fn edit_rewrites_the_file() {
        let dir = TempDir::new().unwrap();
        let mut store = BookStore::open(catalog_path(&dir)).unwrap();
        store.add(orwell()).unwrap();

        let renamed = Book::new("Nineteen Eighty-Four", "Orwell", "1949", "328");
        let index = store.edit("1984", renamed.clone()).unwrap();

        assert_eq!(index, 0);
        assert_eq!(store.list(), [renamed]);
        assert_eq!(
            fs::read_to_string(store.path()).unwrap(),
            "Nineteen Eighty-Four,Orwell,1949,328\n"
        );
    }

    #[test]
    fn edit_missing_title_leaves_store_alone() {
        let dir = TempDir::new().unwrap();
        let mut store = BookStore::open(catalog_path(&dir)).unwrap();
        store.add(orwell()).unwrap();

        let err = store.edit("Dune", dune()).unwrap_err();

        assert!(matches!(err, StoreError::NotFound { ref title } if title == "Dune"));
        assert_eq!(store.list(), [orwell()]);
        assert_mirrored(&store);
    }

    #[test]
    fn remove_missing_title_leaves_store_alone() {
        let dir = TempDir::new().unwrap();
        let mut store = BookStore::open(catalog_path(&dir)).unwrap();
        store.add(orwell()).unwrap();

        assert!(matches!(
            store.remove("Dune"),
            Err(StoreError::NotFound { .. })
        ));
        assert_eq!(store.list(), [orwell()]);
        assert_mirrored(&store);
    }

    #[test]
    fn duplicate_titles_are_kept_and_removed_one_at_a_time() {
        let dir = TempDir::new().unwrap();
        let mut store = BookStore::open(catalog_path(&dir)).unwrap();
        let first = Book::new("Dune", "Herbert", "1965", "412");
        let second = Book::new("Dune", "Herbert", "1984", "896");

        store.add(first.clone()).unwrap();
        store.add(second.clone()).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.find("Dune"), Some(0));

        let removed = store.remove("Dune").unwrap();

        assert_eq!(removed, first);
        assert_eq!(store.list(), [second]);
        assert_mirrored(&store);
    }

    #[test]
    fn mixed_operations_keep_file_and_memory_in_step() {
        let dir = TempDir::new().unwrap();
        let mut store = BookStore::open(catalog_path(&dir)).unwrap();

        store.add(dune()).unwrap();
        assert_mirrored(&store);
        store.add(orwell()).unwrap();
        assert_mirrored(&store);
        store
            .edit("Dune", Book::new("Dune Messiah", "Herbert", "1969", "256"))
            .unwrap();
        assert_mirrored(&store);
        store.add(Book::new("Emma", "Austen", "1815", "474")).unwrap();
        assert_mirrored(&store);
        store.remove("1984").unwrap();
        assert_mirrored(&store);
        store.remove("Emma").unwrap();
        assert_mirrored(&store);

        assert_eq!(store.list().len(), 1);
        assert_eq!(store.list()[0].title, "Dune Messiah");
    }

    #[test]
    fn add_after_unterminated_last_line_starts_a_new_line() {
        let dir = TempDir::new().unwrap();
        let path = catalog_path(&dir);
        fs::write(&path, "1984,Orwell,1949,328").unwrap();

        let mut store = BookStore::open(&path).unwrap();
        store.add(dune()).unwrap();
        store.add(Book::new("Emma", "Austen", "1815", "474")).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "1984,Orwell,1949,328\nDune,Herbert,1965,412\nEmma,Austen,1815,474\n"
        );
        assert_mirrored(&store);
    }

    #[test]
    fn rewrite_drops_blank_lines() {
        let dir = TempDir::new().unwrap();
        let path = catalog_path(&dir);
        fs::write(&path, "1984,Orwell,1949,328\n\nDune,Herbert,1965,412\n").unwrap();

        let mut store = BookStore::open(&path).unwrap();
        assert_eq!(store.len(), 2);
        store.remove("1984").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "Dune,Herbert,1965,412\n");
    }

    #[test]
    fn unencodable_fields_are_rejected_before_writing() {
        let dir = TempDir::new().unwrap();
        let mut store = BookStore::open(catalog_path(&dir)).unwrap();
        store.add(orwell()).unwrap();

        let err = store
            .add(Book::new("Dune", "Herbert, Frank", "1965", "412"))
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidField { field: "author", .. }));

        let err = store
            .edit("1984", Book::new("1984", "Orwell", "1949", "3\n28"))
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidField { field: "pages", .. }));

        assert_eq!(store.list(), [orwell()]);
        assert_mirrored(&store);
    }

    #[test]
    fn failed_add_leaves_memory_and_file_untouched() {
        let (mut store, backing) = flaky_store("1984,Orwell,1949,328\n");
        backing.fail_writes(true);

        let err = store.add(dune()).unwrap_err();

        assert!(matches!(err, StoreError::Persistence { .. }));
        assert_eq!(store.list(), [orwell()]);
        assert_eq!(backing.contents(), "1984,Orwell,1949,328\n");
    }

    #[test]
    fn torn_add_is_trimmed_back() {
        let (mut store, backing) = flaky_store("1984,Orwell,1949,328\n");
        backing.tear_next_write(4);

        assert!(store.add(dune()).is_err());
        assert_eq!(backing.contents(), "1984,Orwell,1949,328\n");

        store.add(dune()).unwrap();
        assert_eq!(
            backing.contents(),
            "1984,Orwell,1949,328\nDune,Herbert,1965,412\n"
        );
    }

    #[test]
    fn failed_edit_restores_previous_record() {
        let (mut store, backing) = flaky_store("1984,Orwell,1949,328\n");
        backing.fail_writes(true);

        let err = store.edit("1984", dune()).unwrap_err();

        assert!(matches!(err, StoreError::Persistence { .. }));
        assert_eq!(store.list(), [orwell()]);
    }

    #[test]
    fn failed_remove_reinserts_record_and_recovers_file() {
        let (mut store, backing) =
            flaky_store("1984,Orwell,1949,328\nDune,Herbert,1965,412\n");
        backing.tear_next_write(3);

        assert!(matches!(
            store.remove("1984"),
            Err(StoreError::Persistence { .. })
        ));

        assert_eq!(store.list(), [orwell(), dune()]);
        assert_eq!(
            backing.contents(),
            "1984,Orwell,1949,328\nDune,Herbert,1965,412\n"
        );
    }
}
