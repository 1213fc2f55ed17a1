//! Database layout and persistence wiring of the sample.

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use kist_core::{ContextBuilder, PersistenceConfig};

use crate::{model::Person, person_dao::PersonDao};

pub const DB_NAME: &str = "kist.db";

const CREATE_PERSON_TABLE: &str = "CREATE TABLE IF NOT EXISTS person_table (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    birthday_timestamp INTEGER NOT NULL,
    street TEXT NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    st_number INTEGER NOT NULL,
    utype TEXT NOT NULL,
    dt_creation INTEGER,
    phone_number INTEGER,
    complement TEXT
)";

const CREATE_STREET_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_person_street ON person_table(street)";

pub fn create_statements() -> Vec<&'static str> {
    vec![CREATE_PERSON_TABLE, CREATE_STREET_INDEX]
}

/// Selects the storage from the command line flags.
///
/// Without an explicit file the database lives under the XDG data
/// directory: `$XDG_DATA_HOME/kist/kist.db`.
pub fn persistence_config(database_file: Option<PathBuf>, in_memory: bool) -> Result<PersistenceConfig> {
    if in_memory {
        return Ok(PersistenceConfig::in_memory(DB_NAME, create_statements()));
    }

    let path = match database_file {
        Some(path) => path,
        None => xdg::BaseDirectories::with_prefix("kist")
            .place_data_file(DB_NAME)
            .context("Failed to resolve the default database location")?,
    };
    Ok(PersistenceConfig::at_path(path, create_statements()))
}

/// Registers the sample's entities and DAOs.
pub fn register(builder: ContextBuilder) -> ContextBuilder {
    builder
        .with_entity::<Person>()
        .with_dao(|connection, registry| {
            Ok(PersonDao::new(
                Arc::clone(connection),
                registry.get_metadata::<Person>()?,
            ))
        })
}
