//! Connection abstraction consumed by the operations engine.
//!
//! The engine never touches the SQL driver directly. It prepares one
//! statement per call through [`SqlConnection::with_statement`], binds by
//! position, executes, and reads results through a forward-only
//! [`SqlCursor`]. The statement is released when the closure returns,
//! whether it succeeded or not.

use std::collections::HashMap;

use crate::{codec::ColumnType, error::Result};

/// Something that can prepare SQL statements.
pub trait SqlConnection {
    /// Prepare `sql` and run `block` against the statement. The statement
    /// does not outlive this call.
    fn with_statement<T, F>(&self, sql: &str, block: F) -> Result<T>
    where
        F: FnOnce(&mut dyn SqlStatement) -> Result<T>;
}

/// A prepared statement. Bind positions are 1-based.
pub trait SqlStatement {
    fn bind_long(&mut self, index: usize, value: i64) -> Result<()>;
    fn bind_double(&mut self, index: usize, value: f64) -> Result<()>;
    fn bind_text(&mut self, index: usize, value: &str) -> Result<()>;
    fn bind_blob(&mut self, index: usize, value: &[u8]) -> Result<()>;
    fn bind_null(&mut self, index: usize) -> Result<()>;

    /// Execute an insert, returning the key the engine generated for the new
    /// row, or `None` when no row was inserted.
    fn execute_insert(&mut self) -> Result<Option<i64>>;

    /// Execute an update or delete, returning the affected row count.
    fn execute_update_delete(&mut self) -> Result<usize>;

    /// Execute a query. The cursor starts before the first row.
    fn query(&mut self) -> Result<Box<dyn SqlCursor + '_>>;
}

/// Forward-only result cursor. Column indices are 0-based.
pub trait SqlCursor {
    /// Move to the next row, returning `false` once the rows are exhausted.
    fn advance(&mut self) -> Result<bool>;

    fn column_count(&self) -> usize;
    fn column_name(&self, index: usize) -> Result<&str>;
    fn column_type(&self, index: usize) -> Result<ColumnType>;

    fn get_long(&self, index: usize) -> Result<i64>;
    fn get_double(&self, index: usize) -> Result<f64>;
    fn get_text(&self, index: usize) -> Result<String>;
    fn get_blob(&self, index: usize) -> Result<Vec<u8>>;

    fn is_null(&self, index: usize) -> Result<bool> {
        Ok(self.column_type(index)? == ColumnType::Null)
    }

    /// Column name to index of the current result set.
    fn column_names(&self) -> Result<HashMap<String, usize>> {
        (0..self.column_count())
            .map(|index| Ok((self.column_name(index)?.to_string(), index)))
            .collect()
    }
}
