//! SQLite execution for relq
//!
//! Provides [`SqliteExecutor`], an [`relq_core::Executor`] over a rusqlite
//! connection, and the value conversions it relies on.

#[cfg(feature = "rusqlite")]
pub mod connection;
#[cfg(feature = "rusqlite")]
pub mod values;

#[cfg(feature = "rusqlite")]
pub use connection::SqliteExecutor;
#[cfg(feature = "rusqlite")]
pub use rusqlite;
