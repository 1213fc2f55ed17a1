//! Error types for the kist persistence layer.

use std::path::PathBuf;

use thiserror::Error;

use crate::codec::{ColumnType, FieldType};

/// Comprehensive error type for all kist operations.
#[derive(Error, Debug)]
pub enum KistError {
    /// Registry used before `mark_initialized` was called
    #[error("Kist is not initialized. Ensure the registry is marked initialized before looking anything up")]
    NotInitialized,
    /// Declared entities or DAOs do not match what was registered
    #[error("Configuration error: {message}")]
    Configuration { message: String },
    /// The codec has no rule for binding this value into this field type
    #[error("Unsupported field type: cannot bind a {found} value into a {field_type} field")]
    UnsupportedFieldType {
        field_type: FieldType,
        found: ColumnType,
    },
    /// A stored value could not be narrowed to the declared field type
    #[error("Invalid value for column '{column}': {source}")]
    ValueConversion {
        column: String,
        #[source]
        source: ConversionError,
    },
    /// A query result lacks columns required by the target entity
    #[error(
        "The query must return all non-null fields of the target entity. \
         Present: {present:?}, missing: {missing:?}"
    )]
    MissingColumns {
        missing: Vec<String>,
        present: Vec<String>,
    },
    /// Update attempted on an entity that has no key yet
    #[error("Cannot update {table} because the entity has no id")]
    IdentityRequired { table: String },
    /// A single-row query produced several rows
    #[error("Query mapping expected a single element but {count} were retrieved")]
    Cardinality { count: usize },
    /// The engine did not report a generated key after an insert
    #[error("Insert into {table} did not produce a generated key")]
    GeneratedKeyUnavailable { table: String },
    /// Cursor read past the last column of the row
    #[error("Column index {index} out of range for a row of {count} columns")]
    ColumnIndexOutOfRange { index: usize, count: usize },
    /// Database connection or query errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: rusqlite::Error,
    },
    /// A panic while holding the connection left it unusable
    #[error("SQLite connection lock was poisoned")]
    ConnectionPoisoned,
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Failure to move a value between its Rust type and its storage class.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("expected {target}, found {found} ({reason})")]
pub struct ConversionError {
    /// Name of the Rust-side type being produced.
    pub target: &'static str,
    /// Storage class of the value that was offered.
    pub found: ColumnType,
    /// Human readable cause.
    pub reason: String,
}

impl ConversionError {
    pub fn new(target: &'static str, found: ColumnType, reason: impl Into<String>) -> Self {
        Self {
            target,
            found,
            reason: reason.into(),
        }
    }

    /// Attach the column this conversion was performed for.
    pub fn for_column(self, column: impl Into<String>) -> KistError {
        KistError::ValueConversion {
            column: column.into(),
            source: self,
        }
    }
}

/// Builder for creating database errors with optional context.
pub struct DatabaseErrorBuilder {
    message: String,
}

impl DatabaseErrorBuilder {
    /// Create a new database error builder with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Build the error with the given source.
    pub fn with_source(self, source: rusqlite::Error) -> KistError {
        KistError::Database {
            message: self.message,
            source,
        }
    }
}

impl KistError {
    /// Creates a builder for database errors.
    pub fn database(message: impl Into<String>) -> DatabaseErrorBuilder {
        DatabaseErrorBuilder::new(message)
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

/// Specialized extension trait for database-related Results.
pub trait DatabaseResultExt<T> {
    /// Map database errors with a message.
    fn db_context(self, message: &str) -> Result<T>;
}

impl<T> DatabaseResultExt<T> for std::result::Result<T, rusqlite::Error> {
    fn db_context(self, message: &str) -> Result<T> {
        self.map_err(|e| KistError::database(message).with_source(e))
    }
}

/// Result type alias for kist operations
pub type Result<T> = std::result::Result<T, KistError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_error_names_the_column() {
        let error = ConversionError::new("i32", ColumnType::Text, "not an integer").for_column("age");

        let message = error.to_string();
        assert!(message.contains("'age'"));
        assert!(matches!(error, KistError::ValueConversion { ref column, .. } if column == "age"));
    }

    #[test]
    fn db_context_wraps_engine_errors() {
        let result: std::result::Result<(), rusqlite::Error> =
            Err(rusqlite::Error::InvalidQuery);

        let error = result.db_context("Failed to prepare").unwrap_err();
        assert!(matches!(error, KistError::Database { ref message, .. } if message == "Failed to prepare"));
    }

    #[test]
    fn missing_columns_lists_names() {
        let error = KistError::MissingColumns {
            missing: vec!["name".to_string()],
            present: vec!["age".to_string(), "id".to_string()],
        };

        assert!(error.to_string().contains("missing: [\"name\"]"));
    }
}
