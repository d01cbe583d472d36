//! In-memory data sets read by filter expressions.

pub mod column;
pub mod id_fields;
pub mod loader;
pub mod row;
pub mod table;

pub use column::DataColumn;
pub use id_fields::TableIdFields;
pub use loader::{load_data_set, parse_data_set};
pub use row::{DataRow, RowRef};
pub use table::DataTable;

use crate::error::{FilterError, Result};

/// An ordered collection of tables, looked up by name case-insensitively
#[derive(Debug, Default)]
pub struct DataSet {
    tables: Vec<DataTable>,
}

impl DataSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table, returning its index
    pub fn add_table(&mut self, table: DataTable) -> Result<usize> {
        if self.table_index(table.name()).is_some() {
            return Err(FilterError::resolution(format!(
                "table \"{}\" already exists",
                table.name()
            )));
        }

        self.tables.push(table);
        Ok(self.tables.len() - 1)
    }

    pub fn tables(&self) -> &[DataTable] {
        &self.tables
    }

    pub fn table_index(&self, name: &str) -> Option<usize> {
        self.tables
            .iter()
            .position(|table| table.name().eq_ignore_ascii_case(name))
    }

    pub fn table(&self, name: &str) -> Option<&DataTable> {
        self.table_index(name).map(|index| &self.tables[index])
    }

    pub fn table_mut(&mut self, name: &str) -> Option<&mut DataTable> {
        let index = self.table_index(name)?;
        self.tables.get_mut(index)
    }

    pub fn table_at(&self, index: usize) -> Option<&DataTable> {
        self.tables.get(index)
    }

    /// Resolve a row reference
    pub fn row(&self, row_ref: RowRef) -> Option<&DataRow> {
        self.tables.get(row_ref.table)?.row(row_ref.row)
    }
}
