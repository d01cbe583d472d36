pub mod catalog;
pub mod error;
pub mod executor;
pub mod expression;
pub mod planner;
pub mod sql;
pub mod types;

pub use catalog::{DataColumn, DataRow, DataSet, DataTable, RowRef, TableIdFields};
pub use error::{FilterError, Result};
pub use executor::{FilterExpressionParser, StatementResults};
pub use expression::{Expression, ExpressionTree};
pub use planner::generate_expression_tree;
pub use types::{DataType, Value};

use std::collections::HashSet;
use uuid::Uuid;

/// Evaluate an expression that reads no columns, e.g. `Abs(-2) + 1`
pub fn evaluate_expression(text: &str) -> Result<Value> {
    let root = planner::bind_context_free(text)?;
    expression::evaluate(&root, None)
}

/// Evaluate an expression against one row of a table
pub fn evaluate_row_expression(table: &DataTable, row: &DataRow, text: &str) -> Result<Value> {
    generate_expression_tree(table, text)?.evaluate(Some(row))
}

fn parser<'a>(
    data_set: &'a DataSet,
    filter: &str,
    primary_table: &str,
    id_fields: Option<&TableIdFields>,
) -> FilterExpressionParser<'a> {
    FilterExpressionParser::new(data_set, filter)
        .with_primary_table(primary_table)
        .with_id_fields(id_fields.cloned().unwrap_or_default())
}

/// Rows selected by a filter expression; deduplicated when it has more than one statement
pub fn select_data_rows(
    data_set: &DataSet,
    filter: &str,
    primary_table: &str,
    id_fields: Option<&TableIdFields>,
) -> Result<Vec<RowRef>> {
    Ok(parser(data_set, filter, primary_table, id_fields)
        .track_filtered_signal_ids(false)
        .evaluate()?
        .into_filtered_rows())
}

/// Signal IDs selected by a filter expression, in first-seen order
pub fn select_signal_ids(
    data_set: &DataSet,
    filter: &str,
    primary_table: &str,
    id_fields: Option<&TableIdFields>,
) -> Result<Vec<Uuid>> {
    Ok(parser(data_set, filter, primary_table, id_fields)
        .track_filtered_rows(false)
        .evaluate()?
        .into_filtered_signal_ids())
}

pub fn select_signal_id_set(
    data_set: &DataSet,
    filter: &str,
    primary_table: &str,
    id_fields: Option<&TableIdFields>,
) -> Result<HashSet<Uuid>> {
    Ok(select_signal_ids(data_set, filter, primary_table, id_fields)?
        .into_iter()
        .collect())
}

/// One bound expression tree per statement of a filter expression
pub fn generate_expression_trees(
    data_set: &DataSet,
    primary_table: &str,
    filter: &str,
) -> Result<Vec<ExpressionTree>> {
    FilterExpressionParser::new(data_set, filter)
        .with_primary_table(primary_table)
        .expression_trees()
}
