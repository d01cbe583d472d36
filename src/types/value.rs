//! Typed, possibly-null scalar values.

use crate::error::{FilterError, Result};
use crate::types::coercion;
use crate::types::datetime::format_datetime;
use crate::types::DataType;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt;
use uuid::Uuid;

/// A value used as literal, column content or evaluation result
///
/// `Null` carries the type the NULL belongs to; `Null(DataType::Undefined)` is the
/// NULL literal before any context has given it a type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null(DataType),
    Boolean(bool),
    Int32(i32),
    Int64(i64),
    Decimal(Decimal),
    Double(f64),
    String(String),
    Guid(Uuid),
    DateTime(DateTime<Utc>),
}

macro_rules! typed_accessor {
    ($name:ident, $variant:ident, $ty:ty) => {
        #[doc = concat!("Get the ", stringify!($variant), " payload, `None` for a typed NULL")]
        pub fn $name(&self) -> Result<Option<$ty>> {
            match self {
                Value::$variant(v) => Ok(Some(*v)),
                Value::Null(DataType::$variant) => Ok(None),
                _ => Err(self.type_mismatch(DataType::$variant)),
            }
        }
    };
}

impl Value {
    pub const TRUE: Value = Value::Boolean(true);
    pub const FALSE: Value = Value::Boolean(false);
    pub const NULL: Value = Value::Null(DataType::Undefined);

    pub fn empty_string() -> Self {
        Value::String(String::new())
    }

    pub fn string(value: impl Into<String>) -> Self {
        Value::String(value.into())
    }

    /// Get the data type of this value
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Null(data_type) => *data_type,
            Value::Boolean(_) => DataType::Boolean,
            Value::Int32(_) => DataType::Int32,
            Value::Int64(_) => DataType::Int64,
            Value::Decimal(_) => DataType::Decimal,
            Value::Double(_) => DataType::Double,
            Value::String(_) => DataType::String,
            Value::Guid(_) => DataType::Guid,
            Value::DateTime(_) => DataType::DateTime,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null(_))
    }

    /// Check if this value can be stored in a column of the given data type
    pub fn is_compatible_with(&self, data_type: DataType) -> bool {
        match self {
            Value::Null(_) => true,
            _ => self.data_type() == data_type,
        }
    }

    typed_accessor!(as_boolean, Boolean, bool);
    typed_accessor!(as_int32, Int32, i32);
    typed_accessor!(as_int64, Int64, i64);
    typed_accessor!(as_decimal, Decimal, Decimal);
    typed_accessor!(as_double, Double, f64);
    typed_accessor!(as_guid, Guid, Uuid);
    typed_accessor!(as_datetime, DateTime, DateTime<Utc>);

    /// Get the String payload, `None` for a typed NULL
    pub fn as_str(&self) -> Result<Option<&str>> {
        match self {
            Value::String(s) => Ok(Some(s.as_str())),
            Value::Null(DataType::String) => Ok(None),
            _ => Err(self.type_mismatch(DataType::String)),
        }
    }

    /// True only for a non-null `Boolean(true)`
    pub fn is_true(&self) -> bool {
        matches!(self, Value::Boolean(true))
    }

    /// Parse text as the given type, yielding a typed NULL when the text does not parse
    pub fn parse_as(text: &str, data_type: DataType) -> Value {
        coercion::convert(&Value::String(text.to_string()), data_type)
            .unwrap_or(Value::Null(data_type))
    }

    /// Render this value as filter expression literal text that parses back to it
    pub fn literal_text(&self) -> String {
        match self {
            Value::Null(_) => "NULL".to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Int32(i) => i.to_string(),
            Value::Int64(i) => i.to_string(),
            Value::Decimal(d) => {
                let text = d.to_string();
                if text.contains('.') {
                    text
                } else {
                    format!("{}.0", text)
                }
            }
            Value::Double(d) => {
                if d.is_finite() {
                    format!("{:e}", d)
                } else {
                    format!("Convert('{}', 'Double')", d)
                }
            }
            Value::String(s) => format!("'{}'", s.replace('\'', "''")),
            Value::Guid(g) => g.braced().to_string(),
            Value::DateTime(dt) => format!("#{}#", format_datetime(dt)),
        }
    }

    fn type_mismatch(&self, expected: DataType) -> FilterError {
        FilterError::type_error(format!(
            "cannot read \"{}\" value as \"{}\"",
            self.data_type(),
            expected
        ))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null(_) => f.write_str("NULL"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Int32(i) => write!(f, "{}", i),
            Value::Int64(i) => write!(f, "{}", i),
            Value::Decimal(d) => write!(f, "{:.6}", d),
            Value::Double(d) => write!(f, "{:.6}", d),
            Value::String(s) => f.write_str(s),
            Value::Guid(g) => write!(f, "{}", g.braced()),
            Value::DateTime(dt) => f.write_str(&format_datetime(dt)),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int32(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int64(value)
    }
}

impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        Value::Decimal(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Uuid> for Value {
    fn from(value: Uuid) -> Self {
        Value::Guid(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::DateTime(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_data_type() {
        assert_eq!(Value::Boolean(true).data_type(), DataType::Boolean);
        assert_eq!(Value::Int64(1).data_type(), DataType::Int64);
        assert_eq!(Value::Null(DataType::Guid).data_type(), DataType::Guid);
        assert_eq!(Value::NULL.data_type(), DataType::Undefined);
    }

    #[test]
    fn test_value_compatibility() {
        assert!(Value::Null(DataType::Undefined).is_compatible_with(DataType::Int32));
        assert!(Value::Int32(42).is_compatible_with(DataType::Int32));
        assert!(!Value::Int32(42).is_compatible_with(DataType::Int64));
        assert!(!Value::string("x").is_compatible_with(DataType::Guid));
    }

    #[test]
    fn test_typed_accessors() {
        assert_eq!(Value::Int32(7).as_int32().unwrap(), Some(7));
        assert_eq!(Value::Null(DataType::Int32).as_int32().unwrap(), None);
        assert!(Value::Int64(7).as_int32().is_err());
        assert!(Value::Null(DataType::String).as_int32().is_err());
        assert_eq!(Value::string("abc").as_str().unwrap(), Some("abc"));
        assert!(Value::Boolean(true).as_str().is_err());
    }

    #[test]
    fn test_display_is_canonical() {
        assert_eq!(Value::Double(3.5).to_string(), "3.500000");
        assert_eq!(
            Value::Decimal(Decimal::from_str("1.25").unwrap()).to_string(),
            "1.250000"
        );
        assert_eq!(Value::Boolean(false).to_string(), "false");
        let guid = Uuid::from_str("8d7ba6d5-0c5e-4b8f-9a0b-0b8a1d2e3f40").unwrap();
        assert_eq!(
            Value::Guid(guid).to_string(),
            "{8d7ba6d5-0c5e-4b8f-9a0b-0b8a1d2e3f40}"
        );
    }

    #[test]
    fn test_literal_text() {
        assert_eq!(Value::string("it's").literal_text(), "'it''s'");
        assert_eq!(Value::Double(0.1).literal_text(), "1e-1");
        assert_eq!(Value::Decimal(Decimal::from(5)).literal_text(), "5.0");
        assert_eq!(Value::NULL.literal_text(), "NULL");
    }

    #[test]
    fn test_parse_as_is_tolerant() {
        assert_eq!(Value::parse_as("42", DataType::Int32), Value::Int32(42));
        assert_eq!(
            Value::parse_as("not a number", DataType::Int32),
            Value::Null(DataType::Int32)
        );
        assert_eq!(
            Value::parse_as("TRUE", DataType::Boolean),
            Value::Boolean(true)
        );
    }
}
