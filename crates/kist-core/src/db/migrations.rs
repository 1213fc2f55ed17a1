//! Schema creation and upgrades driven by [`PersistenceConfig`].

use log::info;

use crate::{
    config::PersistenceConfig,
    error::{DatabaseResultExt, Result},
};

impl super::SqliteConnection {
    /// Creates the schema of a fresh database, or upgrades one whose stored
    /// version is below the configured one.
    pub(super) fn initialize_schema(&self, config: &PersistenceConfig) -> Result<()> {
        let connection = self.lock()?;
        let target = config.version.max(1);

        let current: i64 = connection
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .db_context("Failed to read schema version")?;

        let (statements, context) = if current == 0 {
            info!(
                "Creating schema for {} at version {target}",
                config.db_name
            );
            (&config.create_statements, "Failed to execute create statement")
        } else if current < i64::from(target) {
            info!(
                "Upgrading schema for {} from version {current} to {target}",
                config.db_name
            );
            (&config.alter_statements, "Failed to execute alter statement")
        } else {
            return Ok(());
        };

        // Statements and the version bump commit together or not at all.
        let transaction = connection
            .unchecked_transaction()
            .db_context("Failed to begin schema transaction")?;
        for statement in statements {
            transaction.execute_batch(statement).db_context(context)?;
        }
        transaction
            .pragma_update(None, "user_version", target)
            .db_context("Failed to store schema version")?;
        transaction
            .commit()
            .db_context("Failed to commit schema changes")
    }
}
