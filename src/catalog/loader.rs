//! JSON data set documents.
//!
//! ```json
//! {
//!   "tables": [{
//!     "name": "ActiveMeasurements",
//!     "columns": [
//!       { "name": "SignalID", "type": "Guid" },
//!       { "name": "Adder", "type": "Double", "expression": "Multiplier * 2" }
//!     ],
//!     "rows": [["{…}", 1.0], { "SignalID": "{…}" }]
//!   }]
//! }
//! ```
//!
//! Rows are either value arrays in column order or objects keyed by column
//! name; missing values are NULL. Scalars are converted to the column type.

use crate::catalog::{DataColumn, DataSet, DataTable};
use crate::types::{convert, DataType, Value};
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct DataSetDocument {
    pub tables: Vec<TableDocument>,
}

#[derive(Debug, Deserialize)]
pub struct TableDocument {
    pub name: String,
    pub columns: Vec<ColumnDocument>,
    #[serde(default)]
    pub rows: Vec<RowDocument>,
}

#[derive(Debug, Deserialize)]
pub struct ColumnDocument {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: DataType,
    #[serde(default)]
    pub expression: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RowDocument {
    Values(Vec<serde_json::Value>),
    Named(serde_json::Map<String, serde_json::Value>),
}

/// Load a data set from a JSON file
pub fn load_data_set(path: impl AsRef<Path>) -> Result<DataSet> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read data set file {}", path.display()))?;
    parse_data_set(&text).with_context(|| format!("Invalid data set file {}", path.display()))
}

/// Build a data set from JSON text
pub fn parse_data_set(text: &str) -> Result<DataSet> {
    let document: DataSetDocument =
        serde_json::from_str(text).context("Failed to parse data set JSON")?;
    build_data_set(document)
}

pub fn build_data_set(document: DataSetDocument) -> Result<DataSet> {
    let mut data_set = DataSet::new();

    for table_document in document.tables {
        let table = build_table(table_document)?;
        log::debug!(
            "Loaded table \"{}\" with {} columns and {} rows",
            table.name(),
            table.columns().len(),
            table.row_count()
        );
        data_set.add_table(table)?;
    }

    Ok(data_set)
}

fn build_table(document: TableDocument) -> Result<DataTable> {
    let columns = document
        .columns
        .into_iter()
        .map(|column| match column.expression {
            Some(expression) => DataColumn::computed(column.name, column.data_type, expression),
            None => DataColumn::new(column.name, column.data_type),
        })
        .collect();

    let mut table = DataTable::with_columns(&document.name, columns)?;

    for (row_number, row) in document.rows.into_iter().enumerate() {
        let values = row_values(&table, row)
            .with_context(|| format!("Table \"{}\" row {}", document.name, row_number))?;
        table.add_row(values)?;
    }

    Ok(table)
}

fn row_values(table: &DataTable, row: RowDocument) -> Result<Vec<Value>> {
    let columns = table.columns();

    let scalars: Vec<serde_json::Value> = match row {
        RowDocument::Values(values) => {
            if values.len() > columns.len() {
                bail!(
                    "row has {} values but the table has {} columns",
                    values.len(),
                    columns.len()
                );
            }
            values
        }
        RowDocument::Named(mut values) => {
            let mut ordered = Vec::with_capacity(columns.len());
            for column in columns {
                let key = values
                    .keys()
                    .find(|key| column.has_name(key))
                    .cloned();
                ordered.push(key.and_then(|key| values.remove(&key)).unwrap_or_default());
            }
            if let Some(unknown) = values.keys().next() {
                bail!("unknown column \"{}\"", unknown);
            }
            ordered
        }
    };

    columns
        .iter()
        .enumerate()
        .map(|(index, column)| {
            let scalar = scalars.get(index).unwrap_or(&serde_json::Value::Null);
            scalar_value(scalar, column.data_type)
                .with_context(|| format!("column \"{}\"", column.name))
        })
        .collect()
}

/// Convert a JSON scalar to a value of the given type
pub fn scalar_value(scalar: &serde_json::Value, data_type: DataType) -> Result<Value> {
    let value = match scalar {
        serde_json::Value::Null => return Ok(Value::Null(data_type)),
        serde_json::Value::Bool(b) => Value::Boolean(*b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int64(i),
            None => match n.as_f64() {
                Some(f) => Value::Double(f),
                None => bail!("number {} is out of range", n),
            },
        },
        serde_json::Value::String(s) => Value::String(s.clone()),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            bail!("expected a scalar, got {}", scalar)
        }
    };

    Ok(convert(&value, data_type)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const DOCUMENT: &str = r#"{
        "tables": [{
            "name": "ActiveMeasurements",
            "columns": [
                { "name": "SignalID", "type": "Guid" },
                { "name": "ID", "type": "String" },
                { "name": "Multiplier", "type": "Double" },
                { "name": "Adder", "type": "Double", "expression": "Multiplier * 2" }
            ],
            "rows": [
                ["{0f9c3a4b-1111-2222-3333-444455556666}", "PPA:1", 1.5],
                { "id": "PPA:2", "Multiplier": 3 }
            ]
        }]
    }"#;

    #[test]
    fn test_parse_data_set() {
        let data_set = parse_data_set(DOCUMENT).unwrap();
        let table = data_set.table("activemeasurements").unwrap();

        assert_eq!(table.columns().len(), 4);
        assert!(table.columns()[3].is_computed());
        assert_eq!(table.row_count(), 2);

        let first = table.row(0).unwrap();
        assert_eq!(first.value(0).unwrap().data_type(), DataType::Guid);
        assert_eq!(first.value(2).unwrap(), &Value::Double(1.5));
        assert_eq!(first.value(3).unwrap(), &Value::Null(DataType::Double));

        let second = table.row(1).unwrap();
        assert_eq!(second.value(0).unwrap(), &Value::Null(DataType::Guid));
        assert_eq!(second.value(1).unwrap(), &Value::string("PPA:2"));
        assert_eq!(second.value(2).unwrap(), &Value::Double(3.0));
    }

    #[test]
    fn test_bad_rows_are_rejected() {
        let text = r#"{"tables": [{"name": "T", "columns": [{"name": "A", "type": "Int32"}],
            "rows": [["not a number"]]}]}"#;
        assert!(parse_data_set(text).is_err());

        let text = r#"{"tables": [{"name": "T", "columns": [{"name": "A", "type": "Int32"}],
            "rows": [{"B": 1}]}]}"#;
        assert!(parse_data_set(text).is_err());

        let text = r#"{"tables": [{"name": "T", "columns": [{"name": "A", "type": "Int32"}],
            "rows": [[1, 2]]}]}"#;
        assert!(parse_data_set(text).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(DOCUMENT.as_bytes()).unwrap();

        let data_set = load_data_set(file.path()).unwrap();
        assert_eq!(data_set.tables().len(), 1);

        assert!(load_data_set("/nonexistent/dataset.json").is_err());
    }
}
