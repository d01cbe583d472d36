//! Executor layer for filter statements.
//!
//! A bound [`ExpressionTree`] runs as a pipeline over row indexes of its
//! table: filter (storage-order scan), sort (`ORDER BY`), limit (`TOP`).
//! The [`selector`] module runs whole multi-statement filter expressions.

pub mod filter;
pub mod limit;
pub mod selector;
pub mod sort;

pub use filter::FilterExecutor;
pub use limit::LimitExecutor;
pub use selector::{FilterExpressionParser, ParseErrorCallback, StatementResults};
pub use sort::SortExecutor;

use crate::catalog::DataTable;
use crate::error::Result;
use crate::expression::ExpressionTree;
use crate::planner::Binder;
use crate::sql;

/// Run one tree against its table, returning the selected row indexes
pub fn execute_tree(table: &DataTable, tree: &ExpressionTree) -> Vec<usize> {
    let mut rows = FilterExecutor::new(table, tree).execute();
    SortExecutor::new(table, &tree.order_by).execute(&mut rows);
    LimitExecutor::new(tree.top_limit).execute(&mut rows);
    rows
}

/// Select row indexes of one table with a predicate, optional `ORDER BY`
/// term list and row limit (negative for all rows)
pub fn select_table_rows(
    table: &DataTable,
    filter: &str,
    order_by: Option<&str>,
    limit: i32,
) -> Result<Vec<usize>> {
    let mut binder = Binder::new(table);

    let mut tree = ExpressionTree::new(
        table.name(),
        binder.bind_expression(sql::parse_expression(filter)?)?,
    );
    if let Some(order_by) = order_by.filter(|text| !text.trim().is_empty()) {
        tree.order_by = binder.bind_order_by(sql::parse_order_by(order_by)?)?;
    }
    tree.top_limit = limit;

    Ok(execute_tree(table, &tree))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DataColumn;
    use crate::planner::generate_expression_tree;
    use crate::types::{DataType, Value};

    fn table() -> DataTable {
        let mut table =
            DataTable::with_columns("T", vec![DataColumn::new("Col", DataType::Int32)]).unwrap();
        for value in [3, 1, 2] {
            table.add_row(vec![Value::Int32(value)]).unwrap();
        }
        table
    }

    #[test]
    fn test_execute_tree_sorts_then_limits() {
        let table = table();
        let mut tree = generate_expression_tree(&table, "True").unwrap();
        tree.order_by = Binder::new(&table)
            .bind_order_by(sql::parse_order_by("Col").unwrap())
            .unwrap();

        tree.top_limit = 0;
        assert!(execute_tree(&table, &tree).is_empty());
        tree.top_limit = -1;
        assert_eq!(execute_tree(&table, &tree), vec![1, 2, 0]);
        tree.top_limit = 1;
        assert_eq!(execute_tree(&table, &tree), vec![1]);
    }

    #[test]
    fn test_select_table_rows() {
        let table = table();
        assert_eq!(select_table_rows(&table, "Col > 1", None, -1).unwrap(), vec![0, 2]);
        assert_eq!(
            select_table_rows(&table, "Col > 1", Some("  "), 1).unwrap(),
            vec![0]
        );
        assert!(select_table_rows(&table, "Col >", None, -1).is_err());
        assert!(select_table_rows(&table, "True", Some("Other"), -1).is_err());
    }
}
