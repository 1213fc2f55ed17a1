//! Entities persisted by the sample application.

use std::fmt;

use jiff::civil::DateTime;
use kist_core::{codec, Value};
use serde::Serialize;

kist_core::sql_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
    pub enum UserType {
        Basic,
        Manager,
    }
}

kist_core::entity! {
    table = "person_table",
    key = id,
    metadata = PersonMetadata,
    #[derive(Debug, Clone, PartialEq, Serialize)]
    pub struct Person {
        pub id: Option<i32> => "id",
        pub name: String => "name",
        pub birthday: i64 => "birthday_timestamp",
        pub street: String => "street",
        pub active: bool => "is_active",
        pub number: i32 => "st_number",
        pub user_type: UserType => "utype",
        pub creation_date: Option<DateTime> => "dt_creation",
        pub phone_number: Option<i32> => "phone_number",
        pub complement: Option<String> => "complement",
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(f, "#{id} ")?,
            None => write!(f, "#? ")?,
        }
        write!(
            f,
            "{} ({} {}) {}",
            self.name,
            self.street,
            self.number,
            self.user_type.name()
        )?;
        if !self.active {
            write!(f, " [inactive]")?;
        }
        if let Some(complement) = &self.complement {
            write!(f, " - {complement}")?;
        }
        Ok(())
    }
}

/// Reference to a person without the rest of the row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonMinDto {
    pub id: i32,
    pub name: String,
}

impl PersonMinDto {
    /// Builds a reference from an `id, name` row.
    pub fn from_row(mut row: Vec<Value>) -> kist_core::Result<Self> {
        Ok(Self {
            id: codec::take(&mut row, 0)?,
            name: codec::take(&mut row, 1)?,
        })
    }
}

impl fmt::Display for PersonMinDto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.name)
    }
}

#[cfg(test)]
mod tests {
    use kist_core::{EntityMetadata, FieldType};

    use super::*;

    #[test]
    fn person_metadata_maps_every_column() {
        let columns: Vec<&str> = PersonMetadata
            .field_metadata()
            .iter()
            .map(|field| field.column_name)
            .collect();

        assert_eq!(
            columns,
            vec![
                "id",
                "name",
                "birthday_timestamp",
                "street",
                "is_active",
                "st_number",
                "utype",
                "dt_creation",
                "phone_number",
                "complement",
            ]
        );
        assert_eq!(PersonMetadata.key_metadata().unwrap().column_name, "id");
    }

    #[test]
    fn user_type_is_stored_by_name() {
        let field = PersonMetadata
            .field_metadata()
            .iter()
            .find(|field| field.field_name == "user_type")
            .unwrap();

        assert_eq!(field.field_type, FieldType::Enum(&["Basic", "Manager"]));
        assert!(!field.nullable);
    }

    #[test]
    fn min_dto_reads_id_and_name() {
        let dto = PersonMinDto::from_row(vec![Value::Integer(4), Value::Text("Ada".into())]).unwrap();

        assert_eq!(
            dto,
            PersonMinDto {
                id: 4,
                name: "Ada".to_string()
            }
        );
        assert_eq!(dto.to_string(), "4: Ada");
    }
}
