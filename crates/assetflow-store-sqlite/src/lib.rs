//! SQLite backend for the AssetFlow asset store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Every call is a closure executed on
//! that one connection, and every multi-row state change runs inside a
//! single transaction, so concurrent approvals and bookings cannot lose
//! updates.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
