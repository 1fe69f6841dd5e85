//! Line-prompt front end. Reads menu choices from any `BufRead` and prints to
//! any `Write`, so the same loop drives stdin/stdout and the tests.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::models::Book;
use crate::store::{Backing, BookStore};

/// The four menu entries, numbered as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuChoice {
    List,
    Add,
    Remove,
    Exit,
}

impl MenuChoice {
    fn parse(input: &str) -> Option<Self> {
        match input.trim().parse::<u32>().ok()? {
            1 => Some(MenuChoice::List),
            2 => Some(MenuChoice::Add),
            3 => Some(MenuChoice::Remove),
            4 => Some(MenuChoice::Exit),
            _ => None,
        }
    }
}

const MENU: &str = "1. List all books\n2. Add a book\n3. Remove a book\n4. Exit";

/// Run the menu until the user picks Exit or input runs out. Store errors are
/// printed and the loop carries on; only I/O on `input`/`output` is fatal.
pub fn run_console<B, R, W>(store: &mut BookStore<B>, mut input: R, mut output: W) -> Result<()>
where
    B: Backing,
    R: BufRead,
    W: Write,
{
    writeln!(output, "Welcome to the Library!").context("failed to write to console")?;

    loop {
        writeln!(output, "{MENU}").context("failed to write menu")?;
        let Some(answer) = prompt(&mut input, &mut output, "Enter your choice: ")? else {
            break;
        };

        match MenuChoice::parse(&answer) {
            Some(MenuChoice::List) => list_books(store, &mut output)?,
            Some(MenuChoice::Add) => {
                if !add_book(store, &mut input, &mut output)? {
                    break;
                }
            }
            Some(MenuChoice::Remove) => {
                if !remove_book(store, &mut input, &mut output)? {
                    break;
                }
            }
            Some(MenuChoice::Exit) => break,
            None => {
                debug!(input = %answer, "invalid menu choice");
                writeln!(output, "Invalid choice!").context("failed to write to console")?;
            }
        }
    }

    Ok(())
}

fn list_books<B: Backing, W: Write>(store: &BookStore<B>, output: &mut W) -> Result<()> {
    if store.is_empty() {
        writeln!(output, "The catalog is empty.").context("failed to write to console")?;
        return Ok(());
    }

    for book in store.list() {
        writeln!(
            output,
            "---{}---\nAuthor: {}\nRelease Year: {}\nPages: {}",
            book.title, book.author, book.release_year, book.pages
        )
        .context("failed to write book listing")?;
    }
    Ok(())
}

/// Returns `false` when input ended before every field was entered.
fn add_book<B, R, W>(store: &mut BookStore<B>, input: &mut R, output: &mut W) -> Result<bool>
where
    B: Backing,
    R: BufRead,
    W: Write,
{
    let Some(title) = prompt(input, output, "Enter the title: ")? else {
        return Ok(false);
    };
    let Some(author) = prompt(input, output, "Enter the author: ")? else {
        return Ok(false);
    };
    let Some(release_year) = prompt(input, output, "Enter the release year: ")? else {
        return Ok(false);
    };
    let Some(pages) = prompt(input, output, "Enter the number of pages: ")? else {
        return Ok(false);
    };

    let written = match store.add(Book::new(title, author, release_year, pages)) {
        Ok(_) => writeln!(output, "Book added successfully!"),
        Err(err) => {
            warn!(error = %err, "console add failed");
            writeln!(output, "Error: {err}")
        }
    };
    written.context("failed to write to console")?;
    Ok(true)
}

/// Returns `false` when input ended before a title was entered.
fn remove_book<B, R, W>(store: &mut BookStore<B>, input: &mut R, output: &mut W) -> Result<bool>
where
    B: Backing,
    R: BufRead,
    W: Write,
{
    let Some(title) = prompt(input, output, "Enter the title: ")? else {
        return Ok(false);
    };

    let written = match store.remove(&title) {
        Ok(_) => writeln!(output, "Book removed successfully!"),
        Err(err) => {
            warn!(error = %err, "console remove failed");
            writeln!(output, "Error: {err}")
        }
    };
    written.context("failed to write to console")?;
    Ok(true)
}

/// Print `label`, then read one line without its terminator. `None` on EOF.
fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, label: &str) -> Result<Option<String>> {
    write!(output, "{label}").context("failed to write prompt")?;
    output.flush().context("failed to flush prompt")?;

    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .context("failed to read from input")?;
    if read == 0 {
        return Ok(None);
    }

    let trimmed = line.trim_end_matches(['\n', '\r']).len();
    line.truncate(trimmed);
    Ok(Some(line))
}
