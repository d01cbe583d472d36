// Filter expression syntax tree, before names are resolved against a table

use crate::expression::{FunctionType, Operator, UnaryOperator};
use crate::types::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// A lone GUID, measurement key or point tag
    Identifier(IdentifierLiteral),
    Filter(FilterStatement),
    /// A bare expression, filtered against the primary table
    Expression(Expression),
}

#[derive(Debug, Clone, PartialEq)]
pub enum IdentifierLiteral {
    /// Signal ID; the value is already parsed
    Guid(Value),
    /// `SOURCE:123`
    MeasurementKey(String),
    /// Point tag text without quotes
    PointTag(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterStatement {
    pub table_name: String,
    pub top: Option<i32>,
    pub where_clause: Expression,
    pub order_by: Vec<OrderByItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderByItem {
    pub column: String,
    pub direction: OrderDirection,
    pub exact_match: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Value),
    Column(String),
    UnaryOp {
        op: UnaryOperator,
        expr: Box<Expression>,
    },
    BinaryOp {
        left: Box<Expression>,
        op: Operator,
        right: Box<Expression>,
    },
    IsNull {
        expr: Box<Expression>,
        negated: bool,
    },
    InList {
        expr: Box<Expression>,
        list: Vec<Expression>,
        negated: bool,
        exact_match: bool,
    },
    Function {
        function: FunctionType,
        args: Vec<Expression>,
    },
}

impl Expression {
    pub fn binary(left: Expression, op: Operator, right: Expression) -> Self {
        Expression::BinaryOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn unary(op: UnaryOperator, expr: Expression) -> Self {
        Expression::UnaryOp {
            op,
            expr: Box::new(expr),
        }
    }
}
