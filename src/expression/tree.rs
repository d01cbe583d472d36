//! Bound expression trees: one per filter statement.

use crate::catalog::DataRow;
use crate::error::Result;
use crate::expression::eval::ExpressionEvaluator;
use crate::expression::{ColumnRef, Expression};
use crate::types::Value;
use std::fmt;

/// One `ORDER BY` term
#[derive(Debug, Clone, PartialEq)]
pub struct OrderByTerm {
    pub column: ColumnRef,
    pub ascending: bool,
    /// Compare strings ordinally (`BINARY`)
    pub exact_match: bool,
}

impl fmt::Display for OrderByTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.exact_match {
            f.write_str("BINARY ")?;
        }
        write!(
            f,
            "{} {}",
            self.column.name,
            if self.ascending { "ASC" } else { "DESC" }
        )
    }
}

/// A bound filter statement
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionTree {
    /// Table the tree's columns refer to, empty for context-free expressions
    pub table_name: String,
    pub root: Expression,
    /// Maximum number of rows to keep, `-1` for no limit
    pub top_limit: i32,
    pub order_by: Vec<OrderByTerm>,
}

impl ExpressionTree {
    pub fn new(table_name: impl Into<String>, root: Expression) -> Self {
        Self {
            table_name: table_name.into(),
            root,
            top_limit: -1,
            order_by: Vec::new(),
        }
    }

    /// Evaluate the root against a row, or with no row context
    pub fn evaluate(&self, row: Option<&DataRow>) -> Result<Value> {
        let evaluator = match row {
            Some(row) => ExpressionEvaluator::with_row(row),
            None => ExpressionEvaluator::new(),
        };
        evaluator.evaluate(&self.root)
    }

    /// Evaluate the root as a row predicate; only `Boolean(true)` matches
    pub fn matches(&self, row: &DataRow) -> Result<bool> {
        Ok(self.evaluate(Some(row))?.is_true())
    }
}

/// Renders the tree as a `FILTER` statement
impl fmt::Display for ExpressionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.table_name.is_empty() {
            return write!(f, "{}", self.root);
        }

        f.write_str("FILTER ")?;
        if self.top_limit >= 0 {
            write!(f, "TOP {} ", self.top_limit)?;
        }
        write!(f, "{} WHERE {}", self.table_name, self.root)?;

        for (i, term) in self.order_by.iter().enumerate() {
            f.write_str(if i == 0 { " ORDER BY " } else { ", " })?;
            write!(f, "{}", term)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::Operator;
    use crate::types::DataType;

    fn signal_type() -> ColumnRef {
        ColumnRef::new(0, "SignalType", DataType::String)
    }

    #[test]
    fn test_matches_only_true() {
        let tree = ExpressionTree::new(
            "ActiveMeasurements",
            Expression::binary(
                Operator::Equal,
                Expression::column(signal_type()),
                Expression::value("FREQ"),
            ),
        );

        assert!(tree.matches(&DataRow::new(vec![Value::string("freq")])).unwrap());
        assert!(!tree.matches(&DataRow::new(vec![Value::string("STAT")])).unwrap());
        assert!(!tree
            .matches(&DataRow::new(vec![Value::Null(DataType::String)]))
            .unwrap());
    }

    #[test]
    fn test_display_as_filter_statement() {
        let mut tree = ExpressionTree::new("ActiveMeasurements", Expression::value(true));
        assert_eq!(tree.to_string(), "FILTER ActiveMeasurements WHERE true");

        tree.top_limit = 5;
        tree.order_by.push(OrderByTerm {
            column: signal_type(),
            ascending: false,
            exact_match: true,
        });
        assert_eq!(
            tree.to_string(),
            "FILTER TOP 5 ActiveMeasurements WHERE true ORDER BY BINARY SignalType DESC"
        );

        let tree = ExpressionTree::new("", Expression::value(1));
        assert_eq!(tree.to_string(), "1");
    }
}
