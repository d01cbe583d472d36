//! Data rows and cross-table row addressing.

use crate::error::{FilterError, Result};
use crate::types::Value;

/// Values of one table row, in column order
#[derive(Debug, Clone, PartialEq)]
pub struct DataRow {
    values: Vec<Value>,
}

impl DataRow {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn value(&self, index: usize) -> Result<&Value> {
        self.values.get(index).ok_or_else(|| {
            FilterError::resolution(format!(
                "column index {} is out of range for a row of {} values",
                index,
                self.values.len()
            ))
        })
    }

    pub fn set_value(&mut self, index: usize, value: Value) -> Result<()> {
        let len = self.values.len();
        let slot = self.values.get_mut(index).ok_or_else(|| {
            FilterError::resolution(format!(
                "column index {} is out of range for a row of {} values",
                index, len
            ))
        })?;
        *slot = value;
        Ok(())
    }

    pub(crate) fn push(&mut self, value: Value) {
        self.values.push(value);
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Address of a row within a data set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowRef {
    /// Table index in the data set
    pub table: usize,
    /// Row index in the table
    pub row: usize,
}

impl RowRef {
    pub fn new(table: usize, row: usize) -> Self {
        Self { table, row }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DataType;

    #[test]
    fn test_row_access() {
        let mut row = DataRow::new(vec![Value::Int32(1), Value::Null(DataType::String)]);
        assert_eq!(row.value(0).unwrap(), &Value::Int32(1));
        assert!(row.value(2).is_err());

        row.set_value(1, Value::string("x")).unwrap();
        assert_eq!(row.value(1).unwrap(), &Value::string("x"));
        assert!(row.set_value(3, Value::NULL).is_err());
        assert_eq!(row.len(), 2);
    }
}
