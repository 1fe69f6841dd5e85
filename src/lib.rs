//! Core library surface for the book catalog.
//!
//! `store` owns the catalog file and is the only thing that touches it. The
//! console menu and the terminal UI are thin callers that receive a store from
//! `main.rs`.
pub mod config;
pub mod console;
pub mod logging;
pub mod models;
pub mod store;
pub mod ui;

pub use config::Config;
pub use console::run_console;
pub use models::Book;
pub use store::{Backing, BookStore, StoreError, StoreResult};
pub use ui::{run_app, App};
