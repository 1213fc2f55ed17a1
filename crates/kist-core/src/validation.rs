//! Result set validation ahead of entity construction.

use std::collections::BTreeSet;

use crate::{
    error::{KistError, Result},
    metadata::FieldMetadata,
};

/// Fails unless every non-nullable field's column is among `query_columns`.
///
/// Nullable fields may be missing and extra columns are ignored.
pub fn assert_columns_satisfy<'a, I>(query_columns: I, fields: &[FieldMetadata]) -> Result<()>
where
    I: IntoIterator<Item = &'a str>,
{
    let present: BTreeSet<&str> = query_columns.into_iter().collect();

    let missing: Vec<String> = fields
        .iter()
        .filter(|field| !field.nullable)
        .map(|field| field.column_name)
        .filter(|column| !present.contains(column))
        .map(String::from)
        .collect();

    if missing.is_empty() {
        return Ok(());
    }

    Err(KistError::MissingColumns {
        missing,
        present: present.into_iter().map(String::from).collect(),
    })
}
