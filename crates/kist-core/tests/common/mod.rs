#![allow(dead_code)]

use std::{cell::RefCell, sync::Arc};

use jiff::civil::DateTime;
use kist_core::{
    EntityDao, KistError, PersistenceConfig, Result, SqlConnection, SqlStatement, SqliteConnection,
};
use tempfile::TempDir;

kist_core::sql_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Level {
        Basic,
        Manager,
    }
}

kist_core::entity! {
    table = "sample",
    key = id,
    metadata = SampleMetadata,
    #[derive(Debug, Clone, PartialEq)]
    pub struct Sample {
        pub id: Option<i64> => "id",
        pub name: String => "name",
        pub small: Option<i32> => "small",
        pub ratio: f32 => "ratio",
        pub precise: Option<f64> => "precise",
        pub active: bool => "active",
        pub level: Level => "level",
        pub payload: Option<Vec<u8>> => "payload",
        pub created: Option<DateTime> => "created_at",
    }
}

pub const SAMPLE_TABLE: &str = "CREATE TABLE sample (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    small INTEGER,
    ratio REAL NOT NULL,
    precise REAL,
    active INTEGER NOT NULL,
    level TEXT NOT NULL,
    payload BLOB,
    created_at INTEGER
)";

pub type SampleDao = EntityDao<Sample, i64, SqliteConnection>;

/// A sample with every nullable field left empty.
pub fn sample(name: &str) -> Sample {
    Sample {
        id: None,
        name: name.to_string(),
        small: None,
        ratio: 0.5,
        precise: None,
        active: true,
        level: Level::Basic,
        payload: None,
        created: None,
    }
}

/// Helper function to open an in-memory database with the sample table
pub fn open_in_memory() -> Arc<SqliteConnection> {
    let config = PersistenceConfig::in_memory("test.db", vec![SAMPLE_TABLE]);
    Arc::new(SqliteConnection::open(&config).expect("Failed to open in-memory database"))
}

/// Helper function to open a database file in a temporary directory
pub fn open_temp_file() -> (TempDir, Arc<SqliteConnection>) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = PersistenceConfig::file("test.db", temp_dir.path(), vec![SAMPLE_TABLE]);
    let connection = SqliteConnection::open(&config).expect("Failed to open database file");
    (temp_dir, Arc::new(connection))
}

pub fn sample_dao(connection: Arc<SqliteConnection>) -> SampleDao {
    SampleDao::new(connection, Arc::new(SampleMetadata))
}

/// Connection that records every statement it is asked to prepare and
/// refuses to run any of them.
#[derive(Default)]
pub struct RecordingConnection {
    pub prepared: RefCell<Vec<String>>,
}

impl SqlConnection for RecordingConnection {
    fn with_statement<T, F>(&self, sql: &str, _block: F) -> Result<T>
    where
        F: FnOnce(&mut dyn SqlStatement) -> Result<T>,
    {
        self.prepared.borrow_mut().push(sql.to_string());
        Err(KistError::configuration("recording connection runs nothing"))
    }
}
