//! SQLite implementation of the connection abstraction.
//!
//! A single [`rusqlite::Connection`] is shared behind a mutex, so one
//! statement lifecycle (prepare, bind, execute, read, finalize) runs at a
//! time. Statements are finalized when [`SqlConnection::with_statement`]
//! returns.

use std::{
    fmt, fs,
    sync::{Mutex, MutexGuard},
};

use log::info;
use rusqlite::{types::Value as SqlValue, Connection, Rows};

use crate::{
    codec::ColumnType,
    config::{PersistenceConfig, Storage},
    connection::{SqlConnection, SqlCursor, SqlStatement},
    error::{ConversionError, DatabaseResultExt, KistError, Result},
};

pub mod migrations;

/// Thread-safe handle to a SQLite database.
pub struct SqliteConnection {
    connection: Mutex<Connection>,
}

impl SqliteConnection {
    /// Opens the database described by `config` and brings its schema up to
    /// the configured version.
    pub fn open(config: &PersistenceConfig) -> Result<Self> {
        let connection = match &config.storage {
            Storage::InMemory => {
                Connection::open_in_memory().db_context("Failed to open in-memory database")?
            }
            Storage::File { directory } => {
                if !directory.as_os_str().is_empty() {
                    fs::create_dir_all(directory).map_err(|e| KistError::FileSystem {
                        path: directory.clone(),
                        source: e,
                    })?;
                }
                let path = directory.join(&config.db_name);
                info!("Opening database {}", path.display());
                Connection::open(&path).db_context("Failed to open database connection")?
            }
        };

        let db = Self::from_connection(connection);
        db.initialize_schema(config)?;
        Ok(db)
    }

    /// Wraps an already opened connection without touching its schema.
    pub fn from_connection(connection: Connection) -> Self {
        Self {
            connection: Mutex::new(connection),
        }
    }

    /// Runs one or more `;`-separated statements, e.g. a setup script.
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.lock()?
            .execute_batch(sql)
            .db_context("Failed to execute batch")
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|_| KistError::ConnectionPoisoned)
    }
}

impl fmt::Debug for SqliteConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteConnection").finish_non_exhaustive()
    }
}

impl SqlConnection for SqliteConnection {
    fn with_statement<T, F>(&self, sql: &str, block: F) -> Result<T>
    where
        F: FnOnce(&mut dyn SqlStatement) -> Result<T>,
    {
        let guard = self.lock()?;
        let connection: &Connection = &guard;
        let statement = connection
            .prepare(sql)
            .db_context("Failed to prepare statement")?;

        let mut statement = SqliteStatement {
            connection,
            statement,
        };
        block(&mut statement)
    }
}

/// Prepared statement bound to the connection that created it.
pub struct SqliteStatement<'c> {
    connection: &'c Connection,
    statement: rusqlite::Statement<'c>,
}

impl SqlStatement for SqliteStatement<'_> {
    fn bind_long(&mut self, index: usize, value: i64) -> Result<()> {
        self.statement
            .raw_bind_parameter(index, value)
            .db_context("Failed to bind integer parameter")
    }

    fn bind_double(&mut self, index: usize, value: f64) -> Result<()> {
        self.statement
            .raw_bind_parameter(index, value)
            .db_context("Failed to bind real parameter")
    }

    fn bind_text(&mut self, index: usize, value: &str) -> Result<()> {
        self.statement
            .raw_bind_parameter(index, value)
            .db_context("Failed to bind text parameter")
    }

    fn bind_blob(&mut self, index: usize, value: &[u8]) -> Result<()> {
        self.statement
            .raw_bind_parameter(index, value)
            .db_context("Failed to bind blob parameter")
    }

    fn bind_null(&mut self, index: usize) -> Result<()> {
        self.statement
            .raw_bind_parameter(index, rusqlite::types::Null)
            .db_context("Failed to bind null parameter")
    }

    fn execute_insert(&mut self) -> Result<Option<i64>> {
        let changes = self
            .statement
            .raw_execute()
            .db_context("Failed to execute insert")?;

        if changes == 0 {
            return Ok(None);
        }
        Ok(Some(self.connection.last_insert_rowid()))
    }

    fn execute_update_delete(&mut self) -> Result<usize> {
        self.statement
            .raw_execute()
            .db_context("Failed to execute statement")
    }

    fn query(&mut self) -> Result<Box<dyn SqlCursor + '_>> {
        let columns = self
            .statement
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();

        Ok(Box::new(SqliteCursor {
            columns,
            rows: self.statement.raw_query(),
            current: Vec::new(),
        }))
    }
}

/// Cursor over the rows of a query. The current row is buffered so that
/// columns can be read in any order.
pub struct SqliteCursor<'s> {
    columns: Vec<String>,
    rows: Rows<'s>,
    current: Vec<SqlValue>,
}

impl SqliteCursor<'_> {
    fn value(&self, index: usize) -> Result<&SqlValue> {
        self.current
            .get(index)
            .ok_or(KistError::ColumnIndexOutOfRange {
                index,
                count: self.current.len(),
            })
    }

    fn wrong_type(&self, index: usize, target: &'static str, found: &SqlValue) -> KistError {
        let column = self
            .columns
            .get(index)
            .cloned()
            .unwrap_or_else(|| format!("#{index}"));
        ConversionError::new(target, storage_class(found), "wrong storage class").for_column(column)
    }
}

fn storage_class(value: &SqlValue) -> ColumnType {
    match value {
        SqlValue::Null => ColumnType::Null,
        SqlValue::Integer(_) => ColumnType::Integer,
        SqlValue::Real(_) => ColumnType::Real,
        SqlValue::Text(_) => ColumnType::Text,
        SqlValue::Blob(_) => ColumnType::Blob,
    }
}

impl SqlCursor for SqliteCursor<'_> {
    fn advance(&mut self) -> Result<bool> {
        let count = self.columns.len();
        match self.rows.next().db_context("Failed to advance cursor")? {
            Some(row) => {
                self.current = (0..count)
                    .map(|index| row.get::<_, SqlValue>(index))
                    .collect::<rusqlite::Result<_>>()
                    .db_context("Failed to read row")?;
                Ok(true)
            }
            None => {
                self.current.clear();
                Ok(false)
            }
        }
    }

    fn column_count(&self) -> usize {
        self.columns.len()
    }

    fn column_name(&self, index: usize) -> Result<&str> {
        self.columns
            .get(index)
            .map(String::as_str)
            .ok_or(KistError::ColumnIndexOutOfRange {
                index,
                count: self.columns.len(),
            })
    }

    fn column_type(&self, index: usize) -> Result<ColumnType> {
        self.value(index).map(storage_class)
    }

    fn get_long(&self, index: usize) -> Result<i64> {
        match self.value(index)? {
            SqlValue::Integer(value) => Ok(*value),
            other => Err(self.wrong_type(index, "i64", other)),
        }
    }

    fn get_double(&self, index: usize) -> Result<f64> {
        match self.value(index)? {
            SqlValue::Real(value) => Ok(*value),
            other => Err(self.wrong_type(index, "f64", other)),
        }
    }

    fn get_text(&self, index: usize) -> Result<String> {
        match self.value(index)? {
            SqlValue::Text(value) => Ok(value.clone()),
            other => Err(self.wrong_type(index, "String", other)),
        }
    }

    fn get_blob(&self, index: usize) -> Result<Vec<u8>> {
        match self.value(index)? {
            SqlValue::Blob(value) => Ok(value.clone()),
            other => Err(self.wrong_type(index, "Vec<u8>", other)),
        }
    }
}
