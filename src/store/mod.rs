//! Persistence module split across logical submodules.

mod backing;
mod book_store;
mod error;
mod format;

pub use backing::Backing;
pub use book_store::BookStore;
pub use error::{StoreError, StoreResult};
