//! Per-entity descriptors.
//!
//! An [`EntityMetadata`] tells the operations engine which table an entity
//! lives in, which field is its key, how its fields map to columns, and how
//! to move an entity in and out of statements and cursors. Implementations
//! are normally produced by the [`entity!`](crate::entity) macro.

use std::collections::HashMap;

use crate::{
    codec::{self, FieldType, SqlField, Value},
    connection::{SqlCursor, SqlStatement},
    error::{KistError, Result},
    validation,
};

/// One persisted attribute of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMetadata {
    pub field_name: &'static str,
    pub column_name: &'static str,
    pub field_type: FieldType,
    pub nullable: bool,
}

impl FieldMetadata {
    pub const fn new(
        field_name: &'static str,
        column_name: &'static str,
        field_type: FieldType,
        nullable: bool,
    ) -> Self {
        Self {
            field_name,
            column_name,
            field_type,
            nullable,
        }
    }
}

/// Field name to 1-based bind position, built fresh for every statement.
pub type FieldIndexMap = HashMap<&'static str, usize>;

/// Positions `1..=N` following the declared field order.
pub fn field_index_map(fields: &[FieldMetadata]) -> FieldIndexMap {
    fields
        .iter()
        .enumerate()
        .map(|(index, field)| (field.field_name, index + 1))
        .collect()
}

/// Static descriptor of an entity type `E`.
pub trait EntityMetadata<E>: Send + Sync {
    fn table_name(&self) -> &str;

    /// Name of the field holding the entity's identity.
    fn key_field(&self) -> &str;

    /// Persisted fields in declaration order.
    fn field_metadata(&self) -> &[FieldMetadata];

    /// Build an entity from the row the cursor is positioned on.
    fn create(&self, cursor: &dyn SqlCursor) -> Result<E>;

    /// Bind every field of `source` that appears in `field_index_map`.
    /// Fields absent from the map are skipped.
    fn bind_fields(
        &self,
        source: &E,
        statement: &mut dyn SqlStatement,
        field_index_map: &FieldIndexMap,
    ) -> Result<()>;

    /// Current key value, `None` when the entity has no identity yet.
    fn get_id(&self, source: &E) -> Result<Option<Value>>;

    /// Descriptor of the key field.
    fn key_metadata(&self) -> Result<&FieldMetadata> {
        let key = self.key_field();
        self.field_metadata()
            .iter()
            .find(|field| field.field_name == key)
            .ok_or_else(|| {
                KistError::configuration(format!(
                    "Key field '{key}' is not among the fields of table {}",
                    self.table_name()
                ))
            })
    }
}

/// Column values of one row, keyed by column name.
///
/// Construction checks the row against the entity's non-nullable fields, so
/// a missing required column is reported before any field is narrowed.
#[derive(Debug, Default)]
pub struct RowValues {
    values: HashMap<String, Value>,
}

impl RowValues {
    /// Reads every column of the current row.
    pub fn read(cursor: &dyn SqlCursor, fields: &[FieldMetadata]) -> Result<Self> {
        let columns = cursor.column_names()?;
        validation::assert_columns_satisfy(columns.keys().map(String::as_str), fields)?;

        let values = columns
            .into_iter()
            .map(|(name, index)| Ok((name, codec::read(cursor, index)?)))
            .collect::<Result<_>>()?;
        Ok(Self { values })
    }

    /// Narrows the value of `column` into `T`. An absent column reads as
    /// NULL, which only nullable types accept.
    pub fn take<T: SqlField>(&mut self, column: &str) -> Result<T> {
        let value = self.values.remove(column).unwrap_or_default();
        T::from_value(value).map_err(|e| e.for_column(column))
    }

    pub fn contains(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }
}

/// Binds `value` for `field` when the field takes part in the statement.
///
/// Shared by descriptor implementations; the [`entity!`](crate::entity)
/// macro expands to one call per field.
pub fn bind_field<T: SqlField>(
    statement: &mut dyn SqlStatement,
    field_index_map: &FieldIndexMap,
    field_name: &'static str,
    value: &T,
) -> Result<()> {
    let Some(&position) = field_index_map.get(field_name) else {
        return Ok(());
    };
    let value = value.to_value().map_err(|e| e.for_column(field_name))?;
    codec::bind(statement, &T::FIELD_TYPE, position, &value)
}

/// Turns a key value into "absent" when it is NULL.
pub fn present_id<T: SqlField>(key_field: &str, value: &T) -> Result<Option<Value>> {
    let value = value.to_value().map_err(|e| e.for_column(key_field))?;
    Ok((!value.is_null()).then_some(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIELDS: &[FieldMetadata] = &[
        FieldMetadata::new("id", "id", FieldType::Int64, true),
        FieldMetadata::new("name", "full_name", FieldType::Text, false),
        FieldMetadata::new("age", "age", FieldType::Int32, true),
    ];

    #[test]
    fn index_map_follows_declaration_order() {
        let map = field_index_map(FIELDS);

        assert_eq!(map.len(), 3);
        assert_eq!(map["id"], 1);
        assert_eq!(map["name"], 2);
        assert_eq!(map["age"], 3);
    }

    #[test]
    fn present_id_treats_null_as_absent() {
        assert_eq!(present_id("id", &None::<i64>).unwrap(), None);
        assert_eq!(
            present_id("id", &Some(5i64)).unwrap(),
            Some(Value::Integer(5))
        );
    }

    #[test]
    fn take_reads_missing_columns_as_null() {
        let mut row = RowValues::default();

        assert_eq!(row.take::<Option<i32>>("age").unwrap(), None);
        assert!(matches!(
            row.take::<String>("full_name"),
            Err(KistError::ValueConversion { ref column, .. }) if column == "full_name"
        ));
    }
}
