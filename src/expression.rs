//! Filter expression model and evaluation.
//!
//! This module provides:
//! - Expression AST representation
//! - Operator and function definitions
//! - The built-in function library
//! - Expression evaluation against data rows

pub mod eval;
pub mod expr;
pub mod function;
pub mod functions;
pub mod operator;
pub mod tree;

pub use eval::{evaluate, ExpressionEvaluator};
pub use expr::{ColumnRef, Expression};
pub use function::{Arity, FunctionType};
pub use operator::{Operator, OperatorFamily, UnaryOperator};
pub use tree::{ExpressionTree, OrderByTerm};
