//! Filter executor implementation.
//!
//! Scans a table in storage order and keeps the rows whose predicate
//! evaluates to `Boolean(true)`. Rows whose predicate fails to evaluate are
//! treated as non-matching so one bad row cannot abort the scan.

use crate::catalog::DataTable;
use crate::expression::ExpressionTree;
use log::debug;

/// Executor that filters table rows based on an expression tree
pub struct FilterExecutor<'a> {
    table: &'a DataTable,
    tree: &'a ExpressionTree,
}

impl<'a> FilterExecutor<'a> {
    pub fn new(table: &'a DataTable, tree: &'a ExpressionTree) -> Self {
        Self { table, tree }
    }

    /// Indexes of the matching rows, in storage order
    pub fn execute(&self) -> Vec<usize> {
        self.table
            .rows()
            .iter()
            .enumerate()
            .filter_map(|(index, row)| match self.tree.matches(row) {
                Ok(true) => Some(index),
                Ok(false) => None,
                Err(err) => {
                    debug!(
                        "Row {} of table \"{}\" treated as non-matching: {}",
                        index,
                        self.table.name(),
                        err
                    );
                    None
                }
            })
            .collect()
    }
}
