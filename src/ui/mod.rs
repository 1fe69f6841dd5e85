//! Ratatui front end: a title list on the left, a book form on the right.

mod app;
mod forms;
mod helpers;
mod terminal;

pub use app::App;
pub use terminal::run_app;
