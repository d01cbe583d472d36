//! Column metadata.

use crate::types::DataType;

/// A table column: name, declared type and, for computed columns, the
/// expression text producing its value
#[derive(Debug, Clone, PartialEq)]
pub struct DataColumn {
    pub name: String,
    pub data_type: DataType,
    pub expression: Option<String>,
}

impl DataColumn {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            expression: None,
        }
    }

    /// Create a column whose value is computed from an expression over the row
    pub fn computed(name: impl Into<String>, data_type: DataType, expression: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type,
            expression: Some(expression.into()),
        }
    }

    pub fn is_computed(&self) -> bool {
        self.expression.is_some()
    }

    /// Case-insensitive name comparison
    pub fn has_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}
