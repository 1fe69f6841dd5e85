use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::Path;

/// The handle a [`BookStore`](super::BookStore) mirrors its records into.
///
/// Writes always land at the end of the data (append semantics), which is what
/// both the add path and the truncate-then-rewrite path rely on.
pub trait Backing {
    /// Read everything from the start of the data.
    fn read_all(&mut self) -> io::Result<String>;

    /// Append bytes at the end of the data.
    fn append(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Current length in bytes.
    fn len(&self) -> io::Result<u64>;

    /// Cut the data down to `len` bytes.
    fn truncate(&mut self, len: u64) -> io::Result<()>;

    /// Push buffered bytes down to the operating system.
    fn flush(&mut self) -> io::Result<()>;
}

/// Open `path` for reading and appending, creating it when absent.
pub(crate) fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .read(true)
        .append(true)
        .create(true)
        .open(path)
}

impl Backing for File {
    fn read_all(&mut self) -> io::Result<String> {
        use std::io::{Seek, SeekFrom};

        self.seek(SeekFrom::Start(0))?;
        let mut contents = String::new();
        self.read_to_string(&mut contents)?;
        Ok(contents)
    }

    fn append(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.write_all(bytes)
    }

    fn len(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }

    fn flush(&mut self) -> io::Result<()> {
        Write::flush(self)
    }
}
