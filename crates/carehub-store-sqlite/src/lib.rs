//! SQLite backend for the Carehub shift scheduler.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Besides storing assignments, the store
//! plays the part of the hosted generation procedure: [`SqliteStore`]
//! implements every trait in [`carehub_core::store`].

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
