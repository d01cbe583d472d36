//! Value type kinds.

use serde::Deserialize;
use std::fmt;

/// Data types a filter expression value can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum DataType {
    Boolean,
    Int32,
    Int64,
    Decimal,
    Double,
    String,
    Guid,
    DateTime,
    /// Type of a NULL literal before context coerces it
    Undefined,
}

impl DataType {
    /// All concrete (non-undefined) types
    pub const CONCRETE: [DataType; 8] = [
        DataType::Boolean,
        DataType::Int32,
        DataType::Int64,
        DataType::Decimal,
        DataType::Double,
        DataType::String,
        DataType::Guid,
        DataType::DateTime,
    ];

    /// All types including `Undefined`
    pub const ALL: [DataType; 9] = [
        DataType::Boolean,
        DataType::Int32,
        DataType::Int64,
        DataType::Decimal,
        DataType::Double,
        DataType::String,
        DataType::Guid,
        DataType::DateTime,
        DataType::Undefined,
    ];

    /// Rank in the numeric promotion order `Boolean < Int32 < Int64 < Decimal < Double`
    pub fn numeric_rank(&self) -> Option<u8> {
        match self {
            DataType::Boolean => Some(0),
            DataType::Int32 => Some(1),
            DataType::Int64 => Some(2),
            DataType::Decimal => Some(3),
            DataType::Double => Some(4),
            DataType::String | DataType::Guid | DataType::DateTime | DataType::Undefined => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.numeric_rank().is_some()
    }

    /// Boolean, Int32 or Int64
    pub fn is_integer(&self) -> bool {
        matches!(self, DataType::Boolean | DataType::Int32 | DataType::Int64)
    }

    /// Resolve a type name as accepted by `Convert`, e.g. `Int32` or `System.Int32`
    pub fn from_type_name(name: &str) -> Option<DataType> {
        let name = name.trim().to_ascii_lowercase();
        let name = name.strip_prefix("system.").unwrap_or(&name);

        match name {
            "boolean" | "bool" => Some(DataType::Boolean),
            "byte" | "sbyte" | "int16" | "uint16" | "int32" => Some(DataType::Int32),
            "uint32" | "int64" | "uint64" => Some(DataType::Int64),
            "decimal" => Some(DataType::Decimal),
            "single" | "double" => Some(DataType::Double),
            "string" => Some(DataType::String),
            "guid" => Some(DataType::Guid),
            "datetime" => Some(DataType::DateTime),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Boolean => "Boolean",
            DataType::Int32 => "Int32",
            DataType::Int64 => "Int64",
            DataType::Decimal => "Decimal",
            DataType::Double => "Double",
            DataType::String => "String",
            DataType::Guid => "Guid",
            DataType::DateTime => "DateTime",
            DataType::Undefined => "Undefined",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
