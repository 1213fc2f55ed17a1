//! Lookup of entity descriptors and DAO implementations by type.
//!
//! A [`Registry`] starts uninitialized. Registrations may happen at any
//! time, but every lookup fails with [`KistError::NotInitialized`] until
//! [`Registry::mark_initialized`] has been called. A lookup for a type that
//! was never registered fails with [`KistError::Configuration`].
//!
//! Lookups hand back the registered `Arc`, never a copy.

use std::{
    any::{type_name, Any, TypeId},
    collections::HashMap,
    fmt,
    sync::Arc,
};

use crate::{
    error::{KistError, Result},
    metadata::EntityMetadata,
};

#[derive(Default)]
pub struct Registry {
    entity_to_metadata: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
    dao_implementations: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
    initialized: bool,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the descriptor of entity type `E`, replacing any previous one.
    pub fn add_entity_metadata<E: 'static>(&mut self, metadata: Arc<dyn EntityMetadata<E>>) {
        self.entity_to_metadata
            .insert(TypeId::of::<E>(), Box::new(metadata));
    }

    /// The descriptor registered for `E`.
    pub fn get_metadata<E: 'static>(&self) -> Result<Arc<dyn EntityMetadata<E>>> {
        self.assert_is_initialized()?;
        self.entity_to_metadata
            .get(&TypeId::of::<E>())
            .and_then(|entry| entry.downcast_ref::<Arc<dyn EntityMetadata<E>>>())
            .map(Arc::clone)
            .ok_or_else(|| {
                KistError::configuration(format!(
                    "No metadata found for [{}]. Check the configuration and whether this is really an entity",
                    type_name::<E>()
                ))
            })
    }

    /// Registers the implementation serving DAO type `D`.
    pub fn add_dao_implementation<D: Send + Sync + 'static>(&mut self, implementation: Arc<D>) {
        self.dao_implementations
            .insert(TypeId::of::<D>(), implementation);
    }

    /// The implementation registered for `D`.
    pub fn get_dao_implementation<D: Send + Sync + 'static>(&self) -> Result<Arc<D>> {
        self.assert_is_initialized()?;
        self.dao_implementations
            .get(&TypeId::of::<D>())
            .cloned()
            .and_then(|implementation| implementation.downcast::<D>().ok())
            .ok_or_else(|| {
                KistError::configuration(format!(
                    "No DAO implementation found for [{}]. Check the configuration and whether it was registered",
                    type_name::<D>()
                ))
            })
    }

    /// Opens the lookup gate. There is no way back.
    pub fn mark_initialized(&mut self) {
        self.initialized = true;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn assert_is_initialized(&self) -> Result<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(KistError::NotInitialized)
        }
    }

    /// Drops every registration and closes the gate again.
    pub fn reset(&mut self) {
        self.entity_to_metadata.clear();
        self.dao_implementations.clear();
        self.initialized = false;
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("entities", &self.entity_to_metadata.len())
            .field("daos", &self.dao_implementations.len())
            .field("initialized", &self.initialized)
            .finish()
    }
}
