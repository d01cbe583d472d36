//! Name resolution: unbound syntax trees to evaluatable expressions.

use crate::catalog::DataTable;
use crate::error::{FilterError, Result};
use crate::expression::{ColumnRef, Expression, OrderByTerm};
use crate::sql::{self, ast, OrderDirection};
use log::debug;

/// Resolves column names against one table
///
/// Computed columns are bound on first reference and cached on the table;
/// the chain of computed columns currently being bound is tracked so that a
/// column referring back to itself is rejected instead of recursing forever.
pub struct Binder<'a> {
    /// Table the columns belong to, `None` for context-free expressions
    table: Option<&'a DataTable>,
    resolving: Vec<usize>,
}

impl<'a> Binder<'a> {
    pub fn new(table: &'a DataTable) -> Self {
        Self {
            table: Some(table),
            resolving: Vec::new(),
        }
    }

    /// Binder for expressions evaluated without a table; any column reference fails
    pub fn context_free() -> Self {
        Self {
            table: None,
            resolving: Vec::new(),
        }
    }

    pub fn bind_expression(&mut self, expr: ast::Expression) -> Result<Expression> {
        match expr {
            ast::Expression::Literal(value) => Ok(Expression::Value(value)),
            ast::Expression::Column(name) => Ok(Expression::Column(self.bind_column(&name)?)),
            ast::Expression::UnaryOp { op, expr } => {
                Ok(Expression::unary(op, self.bind_expression(*expr)?))
            }
            ast::Expression::BinaryOp { left, op, right } => {
                let left = self.bind_expression(*left)?;
                let right = self.bind_expression(*right)?;
                Ok(Expression::binary(op, left, right))
            }
            ast::Expression::IsNull { expr, negated } => {
                let operand = self.bind_expression(*expr)?;
                Ok(if negated {
                    Expression::is_not_null(operand)
                } else {
                    Expression::is_null(operand)
                })
            }
            ast::Expression::InList {
                expr,
                list,
                negated,
                exact_match,
            } => {
                let value = self.bind_expression(*expr)?;
                let list = self.bind_expression_list(list)?;
                Ok(Expression::in_list(value, list, negated, exact_match))
            }
            ast::Expression::Function { function, args } => {
                function.check_arity(args.len())?;
                let args = self.bind_expression_list(args)?;
                Ok(Expression::function(function, args))
            }
        }
    }

    fn bind_expression_list(&mut self, list: Vec<ast::Expression>) -> Result<Vec<Expression>> {
        list.into_iter()
            .map(|expr| self.bind_expression(expr))
            .collect()
    }

    /// Resolve a column by name, case-insensitively
    pub fn bind_column(&mut self, name: &str) -> Result<ColumnRef> {
        let table = self.table.ok_or_else(|| {
            FilterError::resolution(format!(
                "column \"{}\" cannot be resolved without a table",
                name
            ))
        })?;

        let index = table.column_index(name).ok_or_else(|| {
            FilterError::resolution(format!(
                "column \"{}\" not found in table \"{}\"",
                name,
                table.name()
            ))
        })?;
        let column = &table.columns()[index];

        let Some(text) = &column.expression else {
            return Ok(ColumnRef::new(index, column.name.clone(), column.data_type));
        };

        let expression = match table.cached_computed_expression(index) {
            Some(expression) => expression,
            None => {
                if self.resolving.contains(&index) {
                    return Err(FilterError::resolution(format!(
                        "computed column \"{}\" in table \"{}\" refers to itself",
                        column.name,
                        table.name()
                    )));
                }

                self.resolving.push(index);
                let bound = sql::parse_expression(text).and_then(|ast| self.bind_expression(ast));
                self.resolving.pop();

                let bound = bound?;
                debug!(
                    "Bound computed column \"{}.{}\" as {}",
                    table.name(),
                    column.name,
                    bound
                );
                table.cache_computed_expression(index, bound)
            }
        };

        Ok(ColumnRef::computed(
            index,
            column.name.clone(),
            column.data_type,
            expression,
        ))
    }

    pub fn bind_order_by(&mut self, items: Vec<ast::OrderByItem>) -> Result<Vec<OrderByTerm>> {
        items
            .into_iter()
            .map(|item| {
                Ok(OrderByTerm {
                    column: self.bind_column(&item.column)?,
                    ascending: item.direction == OrderDirection::Asc,
                    exact_match: item.exact_match,
                })
            })
            .collect()
    }
}
