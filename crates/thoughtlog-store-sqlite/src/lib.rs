//! SQLite backend for the thoughtlog store.
//!
//! Each store call opens its own [`tokio_rusqlite`] connection to the
//! database file and closes it before returning, so no connection outlives
//! the operation that needed it.

mod cache;
mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
