//! Declarative descriptor generation.

/// Entity types that carry a generated descriptor.
pub trait Entity: Sized + 'static {
    type Metadata: crate::EntityMetadata<Self> + Default + 'static;
}

/// Declares an entity struct together with its descriptor type.
///
/// Each field names the column it maps to. The field named by `key` is the
/// entity's identity; make it an `Option` when the database generates it.
///
/// # Examples
///
/// ```
/// kist_core::entity! {
///     table = "person_table",
///     key = id,
///     metadata = PersonMetadata,
///     #[derive(Debug, Clone, PartialEq)]
///     pub struct Person {
///         pub id: Option<i64> => "id",
///         pub name: String => "name",
///         pub phone_number: Option<i32> => "phone_number",
///     }
/// }
///
/// use kist_core::EntityMetadata;
///
/// let fields = PersonMetadata.field_metadata();
/// assert_eq!(fields.len(), 3);
/// assert_eq!(fields[1].column_name, "name");
/// assert!(!fields[1].nullable);
/// ```
#[macro_export]
macro_rules! entity {
    (
        table = $table:literal,
        key = $key:ident,
        metadata = $metadata:ident,
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $ty:ty => $column:literal
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$field_meta])*
                $field_vis $field : $ty
            ),*
        }

        #[doc = concat!("Descriptor of [`", stringify!($name), "`] rows in `", $table, "`.")]
        #[derive(Debug, Clone, Copy, Default)]
        $vis struct $metadata;

        impl $crate::Entity for $name {
            type Metadata = $metadata;
        }

        impl $crate::EntityMetadata<$name> for $metadata {
            fn table_name(&self) -> &str {
                $table
            }

            fn key_field(&self) -> &str {
                stringify!($key)
            }

            fn field_metadata(&self) -> &[$crate::FieldMetadata] {
                const FIELDS: &[$crate::FieldMetadata] = &[
                    $(
                        $crate::FieldMetadata::new(
                            stringify!($field),
                            $column,
                            <$ty as $crate::SqlField>::FIELD_TYPE,
                            <$ty as $crate::SqlField>::NULLABLE,
                        ),
                    )*
                ];
                FIELDS
            }

            fn create(&self, cursor: &dyn $crate::SqlCursor) -> $crate::Result<$name> {
                let mut row = $crate::RowValues::read(cursor, self.field_metadata())?;
                Ok($name {
                    $( $field: row.take::<$ty>($column)?, )*
                })
            }

            fn bind_fields(
                &self,
                source: &$name,
                statement: &mut dyn $crate::SqlStatement,
                field_index_map: &$crate::FieldIndexMap,
            ) -> $crate::Result<()> {
                $(
                    $crate::metadata::bind_field(
                        statement,
                        field_index_map,
                        stringify!($field),
                        &source.$field,
                    )?;
                )*
                Ok(())
            }

            fn get_id(&self, source: &$name) -> $crate::Result<Option<$crate::Value>> {
                $crate::metadata::present_id(stringify!($key), &source.$key)
            }
        }
    };
}

/// Declares a fieldless enum persisted as the name of its variant.
///
/// # Examples
///
/// ```
/// kist_core::sql_enum! {
///     #[derive(Debug, Clone, Copy, PartialEq, Eq)]
///     pub enum UserType {
///         Basic,
///         Manager,
///     }
/// }
///
/// use kist_core::{SqlField, Value};
///
/// assert_eq!(UserType::Manager.to_value().unwrap(), Value::Text("Manager".into()));
/// assert_eq!(UserType::from_value(Value::Text("Basic".into())).unwrap(), UserType::Basic);
/// assert!(UserType::from_value(Value::Text("Admin".into())).is_err());
/// ```
#[macro_export]
macro_rules! sql_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $name {
            /// Stored names of the variants, in declaration order.
            pub const NAMES: &'static [&'static str] = &[$( stringify!($variant) ),*];

            pub fn name(&self) -> &'static str {
                match self {
                    $( $name::$variant => stringify!($variant), )*
                }
            }
        }

        impl $crate::SqlField for $name {
            const FIELD_TYPE: $crate::FieldType = $crate::FieldType::Enum($name::NAMES);

            fn to_value(&self) -> ::std::result::Result<$crate::Value, $crate::ConversionError> {
                Ok($crate::Value::Text(self.name().to_string()))
            }

            fn from_value(
                value: $crate::Value,
            ) -> ::std::result::Result<Self, $crate::ConversionError> {
                match value {
                    $crate::Value::Text(name) => match name.as_str() {
                        $( stringify!($variant) => Ok($name::$variant), )*
                        other => Err($crate::ConversionError::new(
                            stringify!($name),
                            $crate::ColumnType::Text,
                            format!("unknown variant {other}"),
                        )),
                    },
                    other => Err($crate::ConversionError::new(
                        stringify!($name),
                        other.column_type(),
                        "expected a variant name",
                    )),
                }
            }
        }
    };
}
