//! Persistence layer for notistack
//!
//! Provides:
//! - A key-value store trait with SQLite and in-memory backends
//! - The stack persistence adapter, which keeps the whole notification
//!   stack as one serialized blob under a single key

mod memory;
mod sqlite;
mod stack;
mod traits;

pub use memory::*;
pub use sqlite::*;
pub use stack::*;
pub use traits::*;

use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Store lock poisoned")]
    Poisoned,
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
