//! Core library of the Kist object-relational mapper for SQLite.
//!
//! Entities are plain structs described by an [`EntityMetadata`]: the table
//! they live in, their key field, and the column and storage type of every
//! field. The operations engine turns a descriptor into SQL, binds entity
//! values through the column codec and rebuilds entities from result rows.
//!
//! # Layers
//!
//! - [`codec`]: conversion between Rust field values and SQLite storage
//!   classes
//! - [`connection`]: the statement lifecycle the engine relies on, with the
//!   SQLite implementation in [`db`]
//! - [`metadata`], [`validation`]: entity descriptors and the column check
//!   run before a row becomes an entity
//! - [`operations`], [`dao`]: CRUD and hand-written queries
//! - [`registry`], [`context`]: lookup of descriptors and DAOs by type
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use kist_core::{EntityDao, KistDao, PersistenceConfig, PersistenceContext, SqliteConnection};
//!
//! kist_core::entity! {
//!     table = "note",
//!     key = id,
//!     metadata = NoteMetadata,
//!     #[derive(Debug, Clone, PartialEq)]
//!     pub struct Note {
//!         pub id: Option<i64> => "id",
//!         pub body: String => "body",
//!     }
//! }
//!
//! type NoteDao = EntityDao<Note, i64, SqliteConnection>;
//!
//! # fn main() -> kist_core::Result<()> {
//! let config = PersistenceConfig::in_memory(
//!     "notes.db",
//!     vec!["CREATE TABLE note (id INTEGER PRIMARY KEY AUTOINCREMENT, body TEXT NOT NULL)"],
//! );
//!
//! let context = PersistenceContext::builder(config)
//!     .with_entity::<Note>()
//!     .with_dao(|connection, registry| {
//!         Ok(NoteDao::new(Arc::clone(connection), registry.get_metadata::<Note>()?))
//!     })
//!     .build()?;
//!
//! let notes = context.inject_dao::<NoteDao>()?;
//! let id = notes.insert(&Note { id: None, body: "first".to_string() })?;
//!
//! let stored = notes.find_by_id(&id)?;
//! assert_eq!(stored.map(|note| note.body), Some("first".to_string()));
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod config;
pub mod connection;
pub mod context;
pub mod dao;
pub mod db;
pub mod error;
pub mod macros;
pub mod metadata;
pub mod operations;
pub mod registry;
pub mod validation;

// Re-export commonly used types
pub use codec::{ColumnType, FieldType, SqlField, ToParam, Value};
pub use config::{PersistenceConfig, Storage};
pub use connection::{SqlConnection, SqlCursor, SqlStatement};
pub use context::{ContextBuilder, PersistenceContext};
pub use dao::{EntityDao, KistDao};
pub use db::SqliteConnection;
pub use error::{ConversionError, KistError, Result};
pub use macros::Entity;
pub use metadata::{EntityMetadata, FieldIndexMap, FieldMetadata, RowValues};
pub use registry::Registry;
