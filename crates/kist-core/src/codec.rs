//! Column value codec.
//!
//! Everything that crosses the boundary between typed entity fields and the
//! SQL engine travels as a [`Value`]. Writing goes through [`bind`], which
//! dispatches on the declared [`FieldType`] of the target field; reading goes
//! through [`read`], which only reports the storage class the engine used.
//! The final narrowing to a Rust type is done by [`SqlField::from_value`].

use std::fmt;

use jiff::{civil::DateTime, tz::TimeZone, Timestamp};
use log::debug;

use crate::{
    connection::{SqlCursor, SqlStatement},
    error::{ConversionError, KistError, Result},
};

/// Storage class reported by the engine for a column value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
    Blob,
    Null,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
            ColumnType::Blob => "BLOB",
            ColumnType::Null => "NULL",
        };
        f.write_str(name)
    }
}

/// A column value in transit between an entity and the engine.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
    #[default]
    Null,
}

impl Value {
    /// Storage class this value binds as.
    pub fn column_type(&self) -> ColumnType {
        match self {
            Value::Integer(_) => ColumnType::Integer,
            Value::Real(_) => ColumnType::Real,
            Value::Text(_) => ColumnType::Text,
            Value::Blob(_) => ColumnType::Blob,
            Value::Null => ColumnType::Null,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(value) => write!(f, "{value}"),
            Value::Real(value) => write!(f, "{value}"),
            Value::Text(value) => write!(f, "{value}"),
            Value::Blob(value) => write!(f, "<{} bytes>", value.len()),
            Value::Null => f.write_str("null"),
        }
    }
}

/// Declared type of an entity field.
///
/// Enumerations carry the table of their variant names, which is what gets
/// stored in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Int32,
    Int64,
    Float32,
    Float64,
    Text,
    Blob,
    Bool,
    Enum(&'static [&'static str]),
    DateTime,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Int32 => f.write_str("Int32"),
            FieldType::Int64 => f.write_str("Int64"),
            FieldType::Float32 => f.write_str("Float32"),
            FieldType::Float64 => f.write_str("Float64"),
            FieldType::Text => f.write_str("Text"),
            FieldType::Blob => f.write_str("Blob"),
            FieldType::Bool => f.write_str("Bool"),
            FieldType::Enum(names) => write!(f, "Enum[{}]", names.join("|")),
            FieldType::DateTime => f.write_str("DateTime"),
        }
    }
}

/// A Rust type that can be stored in a single column.
pub trait SqlField: Sized {
    /// Declared type used to pick the bind rule.
    const FIELD_TYPE: FieldType;

    /// Whether SQL NULL is a legal value for this type.
    const NULLABLE: bool = false;

    /// Widen the value to its storage representation.
    fn to_value(&self) -> std::result::Result<Value, ConversionError>;

    /// Narrow a stored value back to this type.
    fn from_value(value: Value) -> std::result::Result<Self, ConversionError>;
}

fn mismatch(target: &'static str, value: &Value) -> ConversionError {
    let reason = if value.is_null() {
        "null is not allowed here".to_string()
    } else {
        format!("unexpected value {value}")
    };
    ConversionError::new(target, value.column_type(), reason)
}

impl SqlField for i64 {
    const FIELD_TYPE: FieldType = FieldType::Int64;

    fn to_value(&self) -> std::result::Result<Value, ConversionError> {
        Ok(Value::Integer(*self))
    }

    fn from_value(value: Value) -> std::result::Result<Self, ConversionError> {
        match value {
            Value::Integer(v) => Ok(v),
            other => Err(mismatch("i64", &other)),
        }
    }
}

impl SqlField for i32 {
    const FIELD_TYPE: FieldType = FieldType::Int32;

    fn to_value(&self) -> std::result::Result<Value, ConversionError> {
        Ok(Value::Integer(i64::from(*self)))
    }

    fn from_value(value: Value) -> std::result::Result<Self, ConversionError> {
        match value {
            Value::Integer(v) => i32::try_from(v).map_err(|_| {
                ConversionError::new("i32", ColumnType::Integer, format!("{v} overflows i32"))
            }),
            other => Err(mismatch("i32", &other)),
        }
    }
}

/// SQLite stores NaN as NULL, which would come back as a missing value.
fn not_nan(target: &'static str, value: f64) -> std::result::Result<f64, ConversionError> {
    if value.is_nan() {
        return Err(ConversionError::new(
            target,
            ColumnType::Real,
            "NaN cannot be stored, SQLite turns it into NULL",
        ));
    }
    Ok(value)
}

impl SqlField for f64 {
    const FIELD_TYPE: FieldType = FieldType::Float64;

    fn to_value(&self) -> std::result::Result<Value, ConversionError> {
        not_nan("f64", *self).map(Value::Real)
    }

    fn from_value(value: Value) -> std::result::Result<Self, ConversionError> {
        match value {
            Value::Real(v) => Ok(v),
            other => Err(mismatch("f64", &other)),
        }
    }
}

impl SqlField for f32 {
    const FIELD_TYPE: FieldType = FieldType::Float32;

    fn to_value(&self) -> std::result::Result<Value, ConversionError> {
        not_nan("f32", f64::from(*self)).map(Value::Real)
    }

    fn from_value(value: Value) -> std::result::Result<Self, ConversionError> {
        match value {
            Value::Real(v) => Ok(v as f32),
            other => Err(mismatch("f32", &other)),
        }
    }
}

impl SqlField for bool {
    const FIELD_TYPE: FieldType = FieldType::Bool;

    fn to_value(&self) -> std::result::Result<Value, ConversionError> {
        Ok(Value::Integer(i64::from(*self)))
    }

    fn from_value(value: Value) -> std::result::Result<Self, ConversionError> {
        match value {
            Value::Integer(v) => Ok(v != 0),
            other => Err(mismatch("bool", &other)),
        }
    }
}

impl SqlField for String {
    const FIELD_TYPE: FieldType = FieldType::Text;

    fn to_value(&self) -> std::result::Result<Value, ConversionError> {
        Ok(Value::Text(self.clone()))
    }

    fn from_value(value: Value) -> std::result::Result<Self, ConversionError> {
        match value {
            Value::Text(v) => Ok(v),
            other => Err(mismatch("String", &other)),
        }
    }
}

impl SqlField for Vec<u8> {
    const FIELD_TYPE: FieldType = FieldType::Blob;

    fn to_value(&self) -> std::result::Result<Value, ConversionError> {
        Ok(Value::Blob(self.clone()))
    }

    fn from_value(value: Value) -> std::result::Result<Self, ConversionError> {
        match value {
            Value::Blob(v) => Ok(v),
            other => Err(mismatch("Vec<u8>", &other)),
        }
    }
}

/// Date/times are stored as epoch seconds, interpreted in the system time
/// zone. Sub-second precision is dropped.
impl SqlField for DateTime {
    const FIELD_TYPE: FieldType = FieldType::DateTime;

    fn to_value(&self) -> std::result::Result<Value, ConversionError> {
        let timestamp = TimeZone::system().to_timestamp(*self).map_err(|e| {
            ConversionError::new("DateTime", ColumnType::Integer, e.to_string())
        })?;
        Ok(Value::Integer(timestamp.as_second()))
    }

    fn from_value(value: Value) -> std::result::Result<Self, ConversionError> {
        match value {
            Value::Integer(seconds) => Timestamp::from_second(seconds)
                .map(|timestamp| timestamp.to_zoned(TimeZone::system()).datetime())
                .map_err(|e| ConversionError::new("DateTime", ColumnType::Integer, e.to_string())),
            other => Err(mismatch("DateTime", &other)),
        }
    }
}

impl<T: SqlField> SqlField for Option<T> {
    const FIELD_TYPE: FieldType = T::FIELD_TYPE;
    const NULLABLE: bool = true;

    fn to_value(&self) -> std::result::Result<Value, ConversionError> {
        match self {
            Some(inner) => inner.to_value(),
            None => Ok(Value::Null),
        }
    }

    fn from_value(value: Value) -> std::result::Result<Self, ConversionError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

/// A positional parameter of a custom query.
///
/// Every [`SqlField`] is a parameter, typed by its own declared field type.
pub trait ToParam {
    fn bind_param(&self, statement: &mut dyn SqlStatement, position: usize) -> Result<()>;
}

impl<T: SqlField> ToParam for T {
    fn bind_param(&self, statement: &mut dyn SqlStatement, position: usize) -> Result<()> {
        let value = self
            .to_value()
            .map_err(|e| e.for_column(format!("?{position}")))?;
        bind(statement, &T::FIELD_TYPE, position, &value)
    }
}

impl ToParam for &str {
    fn bind_param(&self, statement: &mut dyn SqlStatement, position: usize) -> Result<()> {
        bind(statement, &FieldType::Text, position, &Value::Text((*self).to_string()))
    }
}

/// Write `value` at the 1-based `position`, using the bind rule of
/// `field_type`.
///
/// Null binds SQL NULL whatever the declared type is.
pub fn bind(
    statement: &mut dyn SqlStatement,
    field_type: &FieldType,
    position: usize,
    value: &Value,
) -> Result<()> {
    debug!("binding value [{value}] on idx {position}");

    match (field_type, value) {
        (_, Value::Null) => statement.bind_null(position),
        (
            FieldType::Int32 | FieldType::Int64 | FieldType::Bool | FieldType::DateTime,
            Value::Integer(v),
        ) => statement.bind_long(position, *v),
        (FieldType::Float32 | FieldType::Float64, Value::Real(v)) => {
            statement.bind_double(position, *v)
        }
        (FieldType::Text | FieldType::Enum(_), Value::Text(v)) => statement.bind_text(position, v),
        (FieldType::Blob, Value::Blob(v)) => statement.bind_blob(position, v),
        (field_type, value) => Err(KistError::UnsupportedFieldType {
            field_type: *field_type,
            found: value.column_type(),
        }),
    }
}

/// Read the value at `index` of the current row, tagged with the storage
/// class the engine reports. No type inference happens here.
pub fn read(cursor: &dyn SqlCursor, index: usize) -> Result<Value> {
    let value = match cursor.column_type(index)? {
        ColumnType::Integer => Value::Integer(cursor.get_long(index)?),
        ColumnType::Real => Value::Real(cursor.get_double(index)?),
        ColumnType::Text => Value::Text(cursor.get_text(index)?),
        ColumnType::Blob => Value::Blob(cursor.get_blob(index)?),
        ColumnType::Null => {
            debug!("Column of type null at index: {index}");
            Value::Null
        }
    };
    Ok(value)
}

/// Narrow the positional value at `index` of a generic row.
///
/// The slot is left as [`Value::Null`] afterwards.
pub fn take<T: SqlField>(row: &mut [Value], index: usize) -> Result<T> {
    let count = row.len();
    let slot = row
        .get_mut(index)
        .ok_or(KistError::ColumnIndexOutOfRange { index, count })?;
    T::from_value(std::mem::take(slot)).map_err(|e| e.for_column(format!("#{index}")))
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use super::*;

    #[test]
    fn bool_widens_to_one_and_zero() {
        assert_eq!(true.to_value().unwrap(), Value::Integer(1));
        assert_eq!(false.to_value().unwrap(), Value::Integer(0));
        assert!(bool::from_value(Value::Integer(1)).unwrap());
        assert!(!bool::from_value(Value::Integer(0)).unwrap());
    }

    #[test]
    fn int32_narrowing_rejects_overflow() {
        assert_eq!(i32::from_value(Value::Integer(42)).unwrap(), 42);

        let error = i32::from_value(Value::Integer(i64::from(i32::MAX) + 1)).unwrap_err();
        assert_eq!(error.target, "i32");
    }

    #[test]
    fn text_is_not_narrowed_into_integers() {
        let error = i64::from_value(Value::Text("12".to_string())).unwrap_err();
        assert_eq!(error.found, ColumnType::Text);
    }

    #[test]
    fn null_only_narrows_into_option() {
        assert_eq!(Option::<String>::from_value(Value::Null).unwrap(), None);
        assert!(String::from_value(Value::Null).is_err());
        assert!(Option::<i32>::NULLABLE);
        assert_eq!(Option::<i32>::FIELD_TYPE, FieldType::Int32);
    }

    #[test]
    fn nan_is_rejected_before_binding() {
        let error = f64::NAN.to_value().unwrap_err();
        assert!(error.reason.contains("NaN"));
        assert!(f32::NAN.to_value().is_err());
        assert!(Some(f64::NAN).to_value().is_err());
        assert_eq!(f64::INFINITY.to_value().unwrap(), Value::Real(f64::INFINITY));
    }

    #[test]
    fn float32_round_trips_through_double() {
        let value = 1.5f32.to_value().unwrap();
        assert_eq!(value, Value::Real(1.5));
        assert_eq!(f32::from_value(value).unwrap(), 1.5);
    }

    #[test]
    fn date_time_is_stored_as_epoch_seconds() {
        let moment = date(2024, 3, 15).at(10, 30, 45, 0);

        let value = moment.to_value().unwrap();
        let expected = TimeZone::system().to_timestamp(moment).unwrap().as_second();
        assert_eq!(value, Value::Integer(expected));
        assert_eq!(DateTime::from_value(value).unwrap(), moment);
    }

    #[test]
    fn date_time_drops_sub_second_precision() {
        let moment = date(2024, 3, 15).at(10, 30, 45, 999_000_000);

        let restored = DateTime::from_value(moment.to_value().unwrap()).unwrap();
        assert_eq!(restored, date(2024, 3, 15).at(10, 30, 45, 0));
    }

    #[test]
    fn take_moves_values_out_of_the_row() {
        let mut row = vec![Value::Integer(7), Value::Text("Ana".to_string())];

        assert_eq!(take::<i64>(&mut row, 0).unwrap(), 7);
        assert_eq!(take::<String>(&mut row, 1).unwrap(), "Ana");
        assert_eq!(row[1], Value::Null);
        assert!(matches!(
            take::<i64>(&mut row, 2),
            Err(KistError::ColumnIndexOutOfRange { index: 2, count: 2 })
        ));
    }

    #[test]
    fn field_type_display_lists_enum_names() {
        const NAMES: &[&str] = &["BASIC", "MANAGER"];
        assert_eq!(FieldType::Enum(NAMES).to_string(), "Enum[BASIC|MANAGER]");
    }
}
