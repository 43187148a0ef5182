//! Database error types.

use thiserror::Error;

/// Errors that can occur when using the database.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DbError {
    /// The referenced table has not been created.
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// A table with this name already exists.
    #[error("Table already exists: {0}")]
    TableExists(String),

    /// A write would create a second row with the same unique key.
    #[error("Unique constraint {index} violated on table {table}")]
    UniqueViolation { table: String, index: String },

    /// Failed to serialize a value into a row.
    #[error("Serialization error: {0}")]
    SerializeError(String),

    /// Failed to deserialize a row.
    #[error("Deserialization error: {0}")]
    DeserializeError(String),

    /// The transaction body gave up without an underlying database error.
    #[error("Transaction aborted: {0}")]
    Aborted(String),

    /// No rows returned when one was expected.
    #[error("No rows returned")]
    NotFound,
}

impl DbError {
    /// Whether this is a unique violation on the given index.
    pub fn is_unique_violation_on(&self, index_name: &str) -> bool {
        matches!(self, DbError::UniqueViolation { index, .. } if index == index_name)
    }
}

impl From<serde_json::Error> for DbError {
    fn from(e: serde_json::Error) -> Self {
        DbError::DeserializeError(e.to_string())
    }
}
