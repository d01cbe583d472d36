//! Expression AST definitions.

use crate::expression::function::FunctionType;
use crate::expression::operator::{Operator, UnaryOperator};
use crate::types::{DataType, Value};
use std::fmt;
use std::sync::Arc;

/// Column reference in an expression
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRef {
    /// Column index in the owning table (0-based)
    pub index: usize,
    /// Column name as declared on the table
    pub name: String,
    /// Declared column type
    pub data_type: DataType,
    /// Bound expression of a computed column, shared with the table's cache
    pub computed: Option<Arc<Expression>>,
}

impl ColumnRef {
    pub fn new(index: usize, name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            index,
            name: name.into(),
            data_type,
            computed: None,
        }
    }

    pub fn computed(
        index: usize,
        name: impl Into<String>,
        data_type: DataType,
        expression: Arc<Expression>,
    ) -> Self {
        Self {
            index,
            name: name.into(),
            data_type,
            computed: Some(expression),
        }
    }

    pub fn is_computed(&self) -> bool {
        self.computed.is_some()
    }
}

/// Expression tree node
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Literal constant value
    Value(Value),

    /// Column of the tree's table
    Column(ColumnRef),

    /// Unary operation
    Unary {
        op: UnaryOperator,
        operand: Box<Expression>,
    },

    /// Binary operation; `right` is absent only for IS [NOT] NULL
    Operator {
        op: Operator,
        left: Box<Expression>,
        right: Option<Box<Expression>>,
    },

    /// Built-in function call
    Function {
        function: FunctionType,
        args: Vec<Expression>,
    },

    /// `value [NOT] IN (list)`
    InList {
        value: Box<Expression>,
        list: Vec<Expression>,
        negated: bool,
        exact_match: bool,
    },
}

impl Expression {
    /// Create a literal expression
    pub fn value(value: impl Into<Value>) -> Self {
        Expression::Value(value.into())
    }

    pub fn null() -> Self {
        Expression::Value(Value::NULL)
    }

    /// Create a column reference expression
    pub fn column(column: ColumnRef) -> Self {
        Expression::Column(column)
    }

    /// Create a unary operation expression
    pub fn unary(op: UnaryOperator, operand: Expression) -> Self {
        Expression::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    /// Create a binary operation expression
    pub fn binary(op: Operator, left: Expression, right: Expression) -> Self {
        Expression::Operator {
            op,
            left: Box::new(left),
            right: Some(Box::new(right)),
        }
    }

    pub fn is_null(operand: Expression) -> Self {
        Expression::Operator {
            op: Operator::IsNull,
            left: Box::new(operand),
            right: None,
        }
    }

    pub fn is_not_null(operand: Expression) -> Self {
        Expression::Operator {
            op: Operator::IsNotNull,
            left: Box::new(operand),
            right: None,
        }
    }

    pub fn and(left: Expression, right: Expression) -> Self {
        Self::binary(Operator::And, left, right)
    }

    pub fn or(left: Expression, right: Expression) -> Self {
        Self::binary(Operator::Or, left, right)
    }

    pub fn eq(left: Expression, right: Expression) -> Self {
        Self::binary(Operator::Equal, left, right)
    }

    pub fn function(function: FunctionType, args: Vec<Expression>) -> Self {
        Expression::Function { function, args }
    }

    pub fn in_list(value: Expression, list: Vec<Expression>, negated: bool, exact_match: bool) -> Self {
        Expression::InList {
            value: Box::new(value),
            list,
            negated,
            exact_match,
        }
    }
}

impl From<Value> for Expression {
    fn from(value: Value) -> Self {
        Expression::Value(value)
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Expression]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

/// Renders filter expression text that parses back to an equivalent tree
impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Value(value) => f.write_str(&value.literal_text()),
            Expression::Column(column) => f.write_str(&column.name),
            Expression::Unary { op, operand } => write!(f, "{}({})", op, operand),
            Expression::Operator { op, left, right } => match right {
                Some(right) => write!(f, "({} {} {})", left, op, right),
                None => write!(f, "({} {})", left, op),
            },
            Expression::Function { function, args } => {
                write!(f, "{}(", function)?;
                write_list(f, args)?;
                f.write_str(")")
            }
            Expression::InList {
                value,
                list,
                negated,
                exact_match,
            } => {
                write!(f, "({} ", value)?;
                if *negated {
                    f.write_str("NOT ")?;
                }
                f.write_str("IN ")?;
                if *exact_match {
                    f.write_str("BINARY ")?;
                }
                f.write_str("(")?;
                write_list(f, list)?;
                f.write_str("))")
            }
        }
    }
}
