//! Error types for driver operations.

use thiserror::Error;

/// Result type for driver operations.
pub type DriverResult<T> = Result<T, DriverError>;

/// Errors that can occur while talking to the database.
#[derive(Debug, Error)]
pub enum DriverError {
    /// The SQLite engine rejected a statement or connection.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A column value could not be converted to the requested type.
    #[error("cannot convert {found} to {expected}")]
    Conversion {
        /// The requested Rust-side type.
        expected: &'static str,
        /// Description of the value that was found.
        found: String,
    },

    /// A result row has no column with the requested name.
    #[error("column not found: {0}")]
    ColumnNotFound(String),

    /// The cursor was already released.
    #[error("cursor is closed")]
    CursorClosed,
}

impl DriverError {
    /// Creates a conversion error.
    pub fn conversion(expected: &'static str, found: impl Into<String>) -> Self {
        Self::Conversion {
            expected,
            found: found.into(),
        }
    }
}
