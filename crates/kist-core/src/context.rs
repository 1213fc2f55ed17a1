//! Wiring of a connection, entity descriptors and DAOs.

use std::sync::Arc;

use log::info;

use crate::{
    config::PersistenceConfig,
    db::SqliteConnection,
    error::Result,
    macros::Entity,
    metadata::EntityMetadata,
    registry::Registry,
};

type EntityRegistration = Box<dyn FnOnce(&mut Registry)>;
type DaoRegistration = Box<dyn FnOnce(&Arc<SqliteConnection>, &mut Registry) -> Result<()>>;

/// An open database together with the registry serving its DAOs.
#[derive(Debug)]
pub struct PersistenceContext {
    connection: Arc<SqliteConnection>,
    registry: Registry,
}

impl PersistenceContext {
    pub fn builder(config: PersistenceConfig) -> ContextBuilder {
        ContextBuilder::new(config)
    }

    pub fn connection(&self) -> &Arc<SqliteConnection> {
        &self.connection
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The DAO registered as `D`.
    ///
    /// # Errors
    ///
    /// Returns `KistError::Configuration` if no DAO of that type was added
    /// to the builder.
    pub fn inject_dao<D: Send + Sync + 'static>(&self) -> Result<Arc<D>> {
        self.registry.get_dao_implementation::<D>()
    }

    /// The descriptor registered for entity type `E`.
    pub fn metadata<E: 'static>(&self) -> Result<Arc<dyn EntityMetadata<E>>> {
        self.registry.get_metadata::<E>()
    }
}

/// Builder for [`PersistenceContext`] instances.
///
/// Entities are registered first and the registry is opened before the DAO
/// factories run, so factories can look up descriptors.
pub struct ContextBuilder {
    config: PersistenceConfig,
    entities: Vec<EntityRegistration>,
    daos: Vec<DaoRegistration>,
}

impl ContextBuilder {
    pub fn new(config: PersistenceConfig) -> Self {
        Self {
            config,
            entities: Vec::new(),
            daos: Vec::new(),
        }
    }

    /// Registers the generated descriptor of `E`.
    pub fn with_entity<E: Entity>(self) -> Self {
        self.with_metadata::<E>(Arc::new(E::Metadata::default()))
    }

    /// Registers a hand-written descriptor for `E`.
    pub fn with_metadata<E: 'static>(mut self, metadata: Arc<dyn EntityMetadata<E>>) -> Self {
        self.entities
            .push(Box::new(move |registry: &mut Registry| {
                registry.add_entity_metadata(metadata);
            }));
        self
    }

    /// Registers the DAO produced by `factory` under its own type.
    pub fn with_dao<D, F>(mut self, factory: F) -> Self
    where
        D: Send + Sync + 'static,
        F: FnOnce(&Arc<SqliteConnection>, &Registry) -> Result<D> + 'static,
    {
        self.daos.push(Box::new(
            move |connection: &Arc<SqliteConnection>, registry: &mut Registry| {
                let dao = factory(connection, registry)?;
                registry.add_dao_implementation(Arc::new(dao));
                Ok(())
            },
        ));
        self
    }

    /// Opens the database and runs every registration.
    ///
    /// # Errors
    ///
    /// Returns `KistError::FileSystem` if the database directory cannot be
    /// created, `KistError::Database` if opening or the schema statements
    /// fail, or whatever a DAO factory returns.
    pub fn build(self) -> Result<PersistenceContext> {
        let connection = Arc::new(SqliteConnection::open(&self.config)?);
        let mut registry = Registry::new();

        for register in self.entities {
            register(&mut registry);
        }
        registry.mark_initialized();

        for register in self.daos {
            register(&connection, &mut registry)?;
        }

        info!("Persistence context ready for {}", self.config.db_name);
        Ok(PersistenceContext {
            connection,
            registry,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KistError;

    struct Marker(&'static str);

    fn config() -> PersistenceConfig {
        PersistenceConfig::in_memory("test.db", Vec::<String>::new())
    }

    #[test]
    fn injects_the_registered_dao() {
        let context = PersistenceContext::builder(config())
            .with_dao(|_, _| Ok(Marker("marker")))
            .build()
            .unwrap();

        let first = context.inject_dao::<Marker>().unwrap();
        let second = context.inject_dao::<Marker>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.0, "marker");
    }

    #[test]
    fn missing_dao_is_a_configuration_error() {
        let context = PersistenceContext::builder(config())
            .build()
            .unwrap();

        assert!(matches!(
            context.inject_dao::<Marker>(),
            Err(KistError::Configuration { .. })
        ));
    }

    #[test]
    fn factory_errors_abort_the_build() {
        let result = PersistenceContext::builder(config())
            .with_dao::<Marker, _>(|_, _| Err(KistError::configuration("no dao")))
            .build();

        assert!(matches!(result, Err(KistError::Configuration { .. })));
    }
}
