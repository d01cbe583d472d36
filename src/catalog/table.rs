//! In-memory data tables.

use crate::catalog::{DataColumn, DataRow};
use crate::error::{FilterError, Result};
use crate::executor;
use crate::expression::Expression;
use crate::types::Value;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// A named table of typed columns and rows
///
/// Bound computed-column expressions are cached on the table by column index,
/// so every tree referencing a computed column shares one expression.
#[derive(Debug)]
pub struct DataTable {
    name: String,
    columns: Vec<DataColumn>,
    rows: Vec<DataRow>,
    computed_expressions: RwLock<HashMap<usize, Arc<Expression>>>,
}

impl DataTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            rows: Vec::new(),
            computed_expressions: RwLock::new(HashMap::new()),
        }
    }

    /// Create a table with the given columns
    pub fn with_columns(name: impl Into<String>, columns: Vec<DataColumn>) -> Result<Self> {
        let mut table = Self::new(name);
        for column in columns {
            table.add_column(column)?;
        }
        Ok(table)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a column, returning its index
    pub fn add_column(&mut self, column: DataColumn) -> Result<usize> {
        if self.column_index(&column.name).is_some() {
            return Err(FilterError::resolution(format!(
                "column \"{}\" already exists in table \"{}\"",
                column.name, self.name
            )));
        }

        let null = Value::Null(column.data_type);
        for row in &mut self.rows {
            row.push(null.clone());
        }

        self.columns.push(column);
        self.computed_expressions.write().clear();
        Ok(self.columns.len() - 1)
    }

    pub fn columns(&self) -> &[DataColumn] {
        &self.columns
    }

    pub fn column(&self, index: usize) -> Option<&DataColumn> {
        self.columns.get(index)
    }

    /// Find a column index by name, case-insensitive
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.has_name(name))
    }

    /// Append a row, returning its index
    ///
    /// Every value must be NULL or of its column's type. NULLs are stored typed.
    pub fn add_row(&mut self, values: Vec<Value>) -> Result<usize> {
        if values.len() != self.columns.len() {
            return Err(FilterError::evaluation(format!(
                "table \"{}\" has {} columns, row has {} values",
                self.name,
                self.columns.len(),
                values.len()
            )));
        }

        let values = values
            .into_iter()
            .zip(&self.columns)
            .map(|(value, column)| self.checked_value(column, value))
            .collect::<Result<Vec<_>>>()?;

        self.rows.push(DataRow::new(values));
        Ok(self.rows.len() - 1)
    }

    /// Set one value of a stored row with the same type check as `add_row`
    pub fn set_value(&mut self, row: usize, column: usize, value: Value) -> Result<()> {
        let data_column = self.columns.get(column).ok_or_else(|| {
            FilterError::resolution(format!(
                "column index {} is out of range for table \"{}\"",
                column, self.name
            ))
        })?;
        let value = self.checked_value(data_column, value)?;

        let name = &self.name;
        self.rows
            .get_mut(row)
            .ok_or_else(|| {
                FilterError::resolution(format!(
                    "row index {} is out of range for table \"{}\"",
                    row, name
                ))
            })?
            .set_value(column, value)
    }

    fn checked_value(&self, column: &DataColumn, value: Value) -> Result<Value> {
        if value.is_null() {
            return Ok(Value::Null(column.data_type));
        }

        if value.is_compatible_with(column.data_type) {
            Ok(value)
        } else {
            Err(FilterError::type_error(format!(
                "column \"{}\" of table \"{}\" holds \"{}\", got \"{}\"",
                column.name,
                self.name,
                column.data_type,
                value.data_type()
            )))
        }
    }

    pub fn rows(&self) -> &[DataRow] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&DataRow> {
        self.rows.get(index)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Bound expression of a computed column, if already cached
    pub fn cached_computed_expression(&self, index: usize) -> Option<Arc<Expression>> {
        self.computed_expressions.read().get(&index).cloned()
    }

    /// Cache a bound computed-column expression
    ///
    /// When another caller cached the column first, that expression is kept
    /// and returned.
    pub fn cache_computed_expression(&self, index: usize, expression: Expression) -> Arc<Expression> {
        self.computed_expressions
            .write()
            .entry(index)
            .or_insert_with(|| Arc::new(expression))
            .clone()
    }

    /// Rows matching a filter predicate, optionally sorted and limited
    ///
    /// `order_by` is a comma separated list of `[BINARY] column [ASC|DESC]`
    /// terms; a negative `limit` keeps every matching row.
    pub fn select(&self, filter: &str, order_by: Option<&str>, limit: i32) -> Result<Vec<&DataRow>> {
        let indexes = executor::select_table_rows(self, filter, order_by, limit)?;
        Ok(indexes.into_iter().filter_map(|index| self.rows.get(index)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DataType;

    fn measurements() -> DataTable {
        let mut table = DataTable::with_columns(
            "ActiveMeasurements",
            vec![
                DataColumn::new("ID", DataType::String),
                DataColumn::new("Value", DataType::Int32),
            ],
        )
        .unwrap();
        table
            .add_row(vec![Value::string("PPA:1"), Value::Int32(3)])
            .unwrap();
        table
            .add_row(vec![Value::string("PPA:2"), Value::Int32(1)])
            .unwrap();
        table
            .add_row(vec![Value::string("PPA:3"), Value::NULL])
            .unwrap();
        table
    }

    #[test]
    fn test_column_lookup_is_case_insensitive() {
        let table = measurements();
        assert_eq!(table.column_index("value"), Some(1));
        assert_eq!(table.column_index("id").and_then(|i| table.column(i)).unwrap().name, "ID");
        assert_eq!(table.column_index("Missing"), None);
    }

    #[test]
    fn test_add_row_validates() {
        let mut table = measurements();
        assert!(table.add_row(vec![Value::string("PPA:4")]).is_err());
        assert!(table
            .add_row(vec![Value::string("PPA:4"), Value::string("5")])
            .is_err());

        // Untyped NULLs are stored as NULLs of the column type
        assert_eq!(
            table.row(2).unwrap().value(1).unwrap(),
            &Value::Null(DataType::Int32)
        );
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let mut table = measurements();
        assert!(table.add_column(DataColumn::new("value", DataType::Double)).is_err());

        let index = table
            .add_column(DataColumn::new("Adder", DataType::Double))
            .unwrap();
        assert_eq!(index, 2);
        assert_eq!(
            table.row(0).unwrap().value(2).unwrap(),
            &Value::Null(DataType::Double)
        );
    }

    #[test]
    fn test_set_value() {
        let mut table = measurements();
        table.set_value(2, 1, Value::Int32(9)).unwrap();
        assert_eq!(table.row(2).unwrap().value(1).unwrap(), &Value::Int32(9));
        assert!(table.set_value(2, 1, Value::Double(1.0)).is_err());
        assert!(table.set_value(7, 1, Value::Int32(1)).is_err());
    }

    #[test]
    fn test_computed_cache_keeps_first() {
        let table = measurements();
        assert!(table.cached_computed_expression(0).is_none());

        let first = table.cache_computed_expression(0, Expression::value(1));
        let second = table.cache_computed_expression(0, Expression::value(2));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*second, Expression::value(1));
    }

    #[test]
    fn test_select() {
        let table = measurements();

        let rows = table.select("Value > 0", Some("Value"), -1).unwrap();
        let ids: Vec<_> = rows.iter().map(|row| row.value(0).unwrap().clone()).collect();
        assert_eq!(ids, vec![Value::string("PPA:2"), Value::string("PPA:1")]);

        let rows = table.select("True", Some("Value DESC"), 2).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].value(1).unwrap(), &Value::Int32(3));
        // NULL sorts last regardless of direction
        let rows = table.select("True", Some("Value DESC"), -1).unwrap();
        assert_eq!(rows[2].value(1).unwrap(), &Value::Null(DataType::Int32));

        assert!(table.select("Missing = 1", None, -1).is_err());
    }
}
