//! SQLite backend for the Cadence study tracker.
//!
//! Wraps a single [`rusqlite::Connection`] owned for the lifetime of the
//! store. Every call runs synchronously on the caller's thread; multi-row
//! writes run inside one transaction.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
