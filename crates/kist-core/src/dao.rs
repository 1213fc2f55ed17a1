//! Data access objects.
//!
//! [`KistDao`] is the standard CRUD surface every entity gets. [`EntityDao`]
//! implements it for any entity with a registered descriptor and carries the
//! helpers custom DAOs use for their hand-written queries.

use std::{marker::PhantomData, sync::Arc};

use crate::{
    codec::{SqlField, ToParam, Value},
    connection::SqlConnection,
    error::Result,
    metadata::EntityMetadata,
    operations,
};

/// Standard operations over entities of type `E` keyed by `K`.
pub trait KistDao<E, K> {
    /// Inserts `data` and returns the generated key.
    fn insert(&self, data: &E) -> Result<i64>;
    fn update(&self, data: &E) -> Result<usize>;
    fn delete_by_id(&self, id: &K) -> Result<usize>;
    fn find_all(&self) -> Result<Vec<E>>;
    fn find_by_id(&self, id: &K) -> Result<Option<E>>;
    fn exists(&self, id: &K) -> Result<bool>;
}

/// Generic DAO bound to one connection and one entity descriptor.
pub struct EntityDao<E: 'static, K, C> {
    connection: Arc<C>,
    metadata: Arc<dyn EntityMetadata<E>>,
    key: PhantomData<fn(&K)>,
}

impl<E: 'static, K, C> EntityDao<E, K, C>
where
    C: SqlConnection,
{
    pub fn new(connection: Arc<C>, metadata: Arc<dyn EntityMetadata<E>>) -> Self {
        Self {
            connection,
            metadata,
            key: PhantomData,
        }
    }

    pub fn metadata(&self) -> &dyn EntityMetadata<E> {
        self.metadata.as_ref()
    }

    pub fn connection(&self) -> &C {
        &self.connection
    }

    /// Hand-written query returning rows of this DAO's entity.
    pub fn query_entities(&self, query: &str, params: &[&dyn ToParam]) -> Result<Vec<E>> {
        operations::query_entities(self.connection(), self.metadata(), query, params)
    }

    /// Hand-written query mapped row by row through `row_constructor`.
    ///
    /// `row_constructor` runs while the connection is held and must not call
    /// back into this DAO.
    pub fn query_list<R, F>(&self, query: &str, params: &[&dyn ToParam], row_constructor: F) -> Result<Vec<R>>
    where
        F: FnMut(Vec<Value>) -> Result<R>,
    {
        operations::list_for_generic_type(self.connection(), row_constructor, query, params)
    }

    /// Hand-written query expected to return at most one row.
    pub fn query_single<R, F>(&self, query: &str, params: &[&dyn ToParam], row_constructor: F) -> Result<Option<R>>
    where
        F: FnMut(Vec<Value>) -> Result<R>,
    {
        operations::find_single_for_generic_type(self.connection(), row_constructor, query, params)
    }

    /// Hand-written INSERT, UPDATE or DELETE.
    pub fn execute(&self, query: &str, params: &[&dyn ToParam]) -> Result<usize> {
        operations::execute_modifying(self.connection(), query, params)
    }
}

impl<E: 'static, K, C> KistDao<E, K> for EntityDao<E, K, C>
where
    K: SqlField,
    C: SqlConnection,
{
    fn insert(&self, data: &E) -> Result<i64> {
        operations::insert(self.connection(), self.metadata(), data)
    }

    fn update(&self, data: &E) -> Result<usize> {
        operations::update(self.connection(), self.metadata(), data)
    }

    fn delete_by_id(&self, id: &K) -> Result<usize> {
        operations::delete_by_id(self.connection(), self.metadata(), id)
    }

    fn find_all(&self) -> Result<Vec<E>> {
        operations::find_all(self.connection(), self.metadata())
    }

    fn find_by_id(&self, id: &K) -> Result<Option<E>> {
        operations::find_by_id(self.connection(), self.metadata(), id)
    }

    fn exists(&self, id: &K) -> Result<bool> {
        operations::exists(self.connection(), self.metadata(), id)
    }
}
