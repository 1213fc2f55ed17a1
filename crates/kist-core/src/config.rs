//! Database bootstrap configuration.

use std::path::{Path, PathBuf};

/// Where the SQLite database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Storage {
    /// Private in-memory database, discarded with the connection.
    InMemory,
    /// Database file named after the config's `db_name` inside `directory`.
    File { directory: PathBuf },
}

/// Describes the database to open and the scripts that shape its schema.
///
/// `create_statements` run on a database that has never been initialized;
/// `alter_statements` run when the stored schema version is below `version`.
#[derive(Debug, Clone)]
pub struct PersistenceConfig {
    pub db_name: String,
    pub version: u32,
    pub create_statements: Vec<String>,
    pub alter_statements: Vec<String>,
    pub storage: Storage,
}

impl PersistenceConfig {
    /// Configuration for an in-memory database at schema version 1.
    pub fn in_memory<S: Into<String>>(db_name: impl Into<String>, create_statements: Vec<S>) -> Self {
        Self {
            db_name: db_name.into(),
            version: 1,
            create_statements: create_statements.into_iter().map(Into::into).collect(),
            alter_statements: Vec::new(),
            storage: Storage::InMemory,
        }
    }

    /// Configuration for a database file `db_name` inside `directory`.
    pub fn file<S: Into<String>>(
        db_name: impl Into<String>,
        directory: impl AsRef<Path>,
        create_statements: Vec<S>,
    ) -> Self {
        Self {
            storage: Storage::File {
                directory: directory.as_ref().to_path_buf(),
            },
            ..Self::in_memory(db_name, create_statements)
        }
    }

    /// Configuration for the database file at `path`.
    ///
    /// The file name becomes `db_name` and the parent its directory.
    pub fn at_path<S: Into<String>>(path: impl AsRef<Path>, create_statements: Vec<S>) -> Self {
        let path = path.as_ref();
        let db_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let directory = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self::file(db_name, directory, create_statements)
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn with_alter_statements<S: Into<String>>(mut self, alter_statements: Vec<S>) -> Self {
        self.alter_statements = alter_statements.into_iter().map(Into::into).collect();
        self
    }

    /// Full path of the database file, `None` for in-memory storage.
    pub fn database_path(&self) -> Option<PathBuf> {
        match &self.storage {
            Storage::InMemory => None,
            Storage::File { directory } => Some(directory.join(&self.db_name)),
        }
    }
}
