//! Statement construction and execution driven by entity metadata.
//!
//! Every operation is a free function of its inputs: it builds the SQL text,
//! prepares exactly one statement on the given connection, binds, executes,
//! and releases the statement before returning. Nothing is cached between
//! calls.
//!
//! # Generic rows
//!
//! [`list_for_generic_type`] serves hand-written queries whose result type
//! the engine knows nothing about. Each row is handed to the caller as a
//! `Vec<Value>` whose positions follow the cursor's column order. Which Rust
//! type sits at which position is a convention between the query and the
//! row constructor; use [`codec::take`] to narrow the values.

use log::debug;

use crate::{
    codec::{self, SqlField, ToParam, Value},
    connection::{SqlConnection, SqlStatement},
    error::{KistError, Result},
    metadata::{field_index_map, EntityMetadata},
};

fn column_list<E>(metadata: &dyn EntityMetadata<E>) -> String {
    metadata
        .field_metadata()
        .iter()
        .map(|field| field.column_name)
        .collect::<Vec<_>>()
        .join(",")
}

/// `INSERT INTO <table> (<cols>) VALUES (?,...)`
pub fn insert_sql<E>(metadata: &dyn EntityMetadata<E>) -> String {
    let placeholders = vec!["?"; metadata.field_metadata().len()].join(",");
    format!(
        "INSERT INTO {} ({}) VALUES ({placeholders})",
        metadata.table_name(),
        column_list(metadata)
    )
}

/// `UPDATE <table> SET <col> = ?,... WHERE <key> = ?`
pub fn update_sql<E>(metadata: &dyn EntityMetadata<E>) -> Result<String> {
    let key = metadata.key_metadata()?;
    let assignments = metadata
        .field_metadata()
        .iter()
        .map(|field| format!("{} = ?", field.column_name))
        .collect::<Vec<_>>()
        .join(",");
    Ok(format!(
        "UPDATE {} SET {assignments} WHERE {} = ?",
        metadata.table_name(),
        key.column_name
    ))
}

/// `DELETE FROM <table> WHERE <key> = ?`
pub fn delete_sql<E>(metadata: &dyn EntityMetadata<E>) -> Result<String> {
    let key = metadata.key_metadata()?;
    Ok(format!(
        "DELETE FROM {} WHERE {} = ?",
        metadata.table_name(),
        key.column_name
    ))
}

/// `SELECT <cols> FROM <table>`
pub fn select_all_sql<E>(metadata: &dyn EntityMetadata<E>) -> String {
    format!(
        "SELECT {} FROM {}",
        column_list(metadata),
        metadata.table_name()
    )
}

/// `SELECT <cols> FROM <table> WHERE <key> = ?`
pub fn select_by_id_sql<E>(metadata: &dyn EntityMetadata<E>) -> Result<String> {
    let key = metadata.key_metadata()?;
    Ok(format!(
        "{} WHERE {} = ?",
        select_all_sql(metadata),
        key.column_name
    ))
}

/// `SELECT 1 FROM <table> WHERE <key> = ?`
pub fn exists_sql<E>(metadata: &dyn EntityMetadata<E>) -> Result<String> {
    let key = metadata.key_metadata()?;
    Ok(format!(
        "SELECT 1 FROM {} WHERE {} = ?",
        metadata.table_name(),
        key.column_name
    ))
}

/// Binds a key value with the key field's declared type.
fn bind_key<E>(
    metadata: &dyn EntityMetadata<E>,
    statement: &mut dyn SqlStatement,
    position: usize,
    id: &Value,
) -> Result<()> {
    let key = metadata.key_metadata()?;
    codec::bind(statement, &key.field_type, position, id)
}

fn key_value<K: SqlField>(key_field: &str, id: &K) -> Result<Value> {
    SqlField::to_value(id).map_err(|e| e.for_column(key_field))
}

fn bind_params(statement: &mut dyn SqlStatement, params: &[&dyn ToParam]) -> Result<()> {
    params
        .iter()
        .enumerate()
        .try_for_each(|(index, param)| param.bind_param(statement, index + 1))
}

/// Inserts `entity` with every field bound in declaration order and returns
/// the key generated by the engine.
pub fn insert<C, E>(connection: &C, metadata: &dyn EntityMetadata<E>, entity: &E) -> Result<i64>
where
    C: SqlConnection,
{
    let command = insert_sql(metadata);
    debug!("[SQL] {command}");

    let generated = connection.with_statement(&command, |statement| {
        let field_to_index = field_index_map(metadata.field_metadata());
        metadata.bind_fields(entity, statement, &field_to_index)?;
        statement.execute_insert()
    })?;

    generated.ok_or_else(|| KistError::GeneratedKeyUnavailable {
        table: metadata.table_name().to_string(),
    })
}

/// Updates the row identified by the entity's key, rewriting every field.
///
/// Fails with [`KistError::IdentityRequired`] before any statement is
/// prepared when the entity has no key.
pub fn update<C, E>(connection: &C, metadata: &dyn EntityMetadata<E>, entity: &E) -> Result<usize>
where
    C: SqlConnection,
{
    let id = metadata
        .get_id(entity)?
        .ok_or_else(|| KistError::IdentityRequired {
            table: metadata.table_name().to_string(),
        })?;
    let command = update_sql(metadata)?;
    debug!("[SQL] {command}");

    connection.with_statement(&command, |statement| {
        let fields = metadata.field_metadata();
        let field_to_index = field_index_map(fields);
        metadata.bind_fields(entity, statement, &field_to_index)?;
        bind_key(metadata, statement, fields.len() + 1, &id)?;
        statement.execute_update_delete()
    })
}

/// Deletes the row whose key equals `id`, returning the affected row count.
pub fn delete_by_id<C, E, K>(connection: &C, metadata: &dyn EntityMetadata<E>, id: &K) -> Result<usize>
where
    C: SqlConnection,
    K: SqlField,
{
    let command = delete_sql(metadata)?;
    let id = key_value(metadata.key_field(), id)?;
    debug!("[SQL] {command}");

    connection.with_statement(&command, |statement| {
        bind_key(metadata, statement, 1, &id)?;
        statement.execute_update_delete()
    })
}

/// Every row of the table, in the order the engine returns them.
pub fn find_all<C, E>(connection: &C, metadata: &dyn EntityMetadata<E>) -> Result<Vec<E>>
where
    C: SqlConnection,
{
    let command = select_all_sql(metadata);
    debug!("[SQL] {command}");

    connection.with_statement(&command, |statement| {
        let mut cursor = statement.query()?;
        let mut entities = Vec::new();
        while cursor.advance()? {
            entities.push(metadata.create(cursor.as_ref())?);
        }
        Ok(entities)
    })
}

/// The row whose key equals `id`, if any.
pub fn find_by_id<C, E, K>(connection: &C, metadata: &dyn EntityMetadata<E>, id: &K) -> Result<Option<E>>
where
    C: SqlConnection,
    K: SqlField,
{
    let command = select_by_id_sql(metadata)?;
    let id = key_value(metadata.key_field(), id)?;
    debug!("[SQL] {command}");

    connection.with_statement(&command, |statement| {
        bind_key(metadata, statement, 1, &id)?;
        let mut cursor = statement.query()?;
        if !cursor.advance()? {
            return Ok(None);
        }
        metadata.create(cursor.as_ref()).map(Some)
    })
}

/// Whether a row with key `id` exists. No entity is constructed.
pub fn exists<C, E, K>(connection: &C, metadata: &dyn EntityMetadata<E>, id: &K) -> Result<bool>
where
    C: SqlConnection,
    K: SqlField,
{
    let command = exists_sql(metadata)?;
    let id = key_value(metadata.key_field(), id)?;
    debug!("[SQL] {command}");

    connection.with_statement(&command, |statement| {
        bind_key(metadata, statement, 1, &id)?;
        let mut cursor = statement.query()?;
        cursor.advance()
    })
}

/// Runs a hand-written query whose rows are entities of the descriptor's
/// type. Each row must carry the entity's non-nullable columns.
pub fn query_entities<C, E>(
    connection: &C,
    metadata: &dyn EntityMetadata<E>,
    query: &str,
    params: &[&dyn ToParam],
) -> Result<Vec<E>>
where
    C: SqlConnection,
{
    debug!("[SQL] {query}");

    connection.with_statement(query, |statement| {
        bind_params(statement, params)?;
        let mut cursor = statement.query()?;
        let mut entities = Vec::new();
        while cursor.advance()? {
            entities.push(metadata.create(cursor.as_ref())?);
        }
        Ok(entities)
    })
}

/// Runs a hand-written INSERT, UPDATE or DELETE and returns the affected row
/// count.
pub fn execute_modifying<C>(connection: &C, query: &str, params: &[&dyn ToParam]) -> Result<usize>
where
    C: SqlConnection,
{
    debug!("[SQL] {query}");

    connection.with_statement(query, |statement| {
        bind_params(statement, params)?;
        statement.execute_update_delete()
    })
}

/// Runs `query` and maps every row through `row_constructor`.
///
/// Parameters bind positionally in the order given. Every column of a row is
/// read into a positional vector following the cursor's column order. A row
/// made of a single NULL column (an aggregate over no rows, say) is dropped.
///
/// The connection stays locked while rows are mapped, so `row_constructor`
/// must not run queries of its own on the same connection.
pub fn list_for_generic_type<C, R, F>(
    connection: &C,
    mut row_constructor: F,
    query: &str,
    params: &[&dyn ToParam],
) -> Result<Vec<R>>
where
    C: SqlConnection,
    F: FnMut(Vec<Value>) -> Result<R>,
{
    debug!("[SQL] {query}");

    connection.with_statement(query, |statement| {
        bind_params(statement, params)?;

        let mut cursor = statement.query()?;
        let column_count = cursor.column_count();
        debug!(
            "Columns retrieved: {:?}",
            (0..column_count)
                .filter_map(|index| cursor.column_name(index).ok())
                .collect::<Vec<_>>()
        );

        let mut results = Vec::new();
        while cursor.advance()? {
            let row_data = (0..column_count)
                .map(|index| codec::read(cursor.as_ref(), index))
                .collect::<Result<Vec<_>>>()?;

            let keep = column_count > 1 || row_data.first().is_some_and(|value| !value.is_null());
            if keep {
                results.push(row_constructor(row_data)?);
            }
        }
        Ok(results)
    })
}

/// Like [`list_for_generic_type`] for queries expected to yield at most one
/// row. More than one row is a [`KistError::Cardinality`] error.
pub fn find_single_for_generic_type<C, R, F>(
    connection: &C,
    row_constructor: F,
    query: &str,
    params: &[&dyn ToParam],
) -> Result<Option<R>>
where
    C: SqlConnection,
    F: FnMut(Vec<Value>) -> Result<R>,
{
    let mut results = list_for_generic_type(connection, row_constructor, query, params)?;
    match results.len() {
        0 => Ok(None),
        1 => Ok(results.pop()),
        count => Err(KistError::Cardinality { count }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        codec::FieldType,
        connection::SqlCursor,
        metadata::{FieldIndexMap, FieldMetadata},
    };

    struct Descriptor {
        fields: Vec<FieldMetadata>,
        key: &'static str,
    }

    impl EntityMetadata<()> for Descriptor {
        fn table_name(&self) -> &str {
            "person"
        }

        fn key_field(&self) -> &str {
            self.key
        }

        fn field_metadata(&self) -> &[FieldMetadata] {
            &self.fields
        }

        fn create(&self, _cursor: &dyn SqlCursor) -> Result<()> {
            Ok(())
        }

        fn bind_fields(&self, _: &(), _: &mut dyn SqlStatement, _: &FieldIndexMap) -> Result<()> {
            Ok(())
        }

        fn get_id(&self, _: &()) -> Result<Option<Value>> {
            Ok(None)
        }
    }

    fn descriptor(key: &'static str) -> Descriptor {
        Descriptor {
            fields: vec![
                FieldMetadata::new("id", "person_id", FieldType::Int64, true),
                FieldMetadata::new("name", "name", FieldType::Text, false),
                FieldMetadata::new("age", "age", FieldType::Int32, true),
            ],
            key,
        }
    }

    #[test]
    fn builds_crud_sql_in_declaration_order() {
        let metadata = descriptor("id");

        assert_eq!(
            insert_sql(&metadata),
            "INSERT INTO person (person_id,name,age) VALUES (?,?,?)"
        );
        assert_eq!(
            update_sql(&metadata).unwrap(),
            "UPDATE person SET person_id = ?,name = ?,age = ? WHERE person_id = ?"
        );
        assert_eq!(
            delete_sql(&metadata).unwrap(),
            "DELETE FROM person WHERE person_id = ?"
        );
        assert_eq!(
            select_all_sql(&metadata),
            "SELECT person_id,name,age FROM person"
        );
        assert_eq!(
            select_by_id_sql(&metadata).unwrap(),
            "SELECT person_id,name,age FROM person WHERE person_id = ?"
        );
        assert_eq!(
            exists_sql(&metadata).unwrap(),
            "SELECT 1 FROM person WHERE person_id = ?"
        );
    }

    #[test]
    fn unknown_key_field_is_a_configuration_error() {
        let metadata = descriptor("uuid");

        assert!(matches!(
            delete_sql(&metadata),
            Err(KistError::Configuration { .. })
        ));
    }
}
