//! Expression evaluation implementation.

use crate::catalog::DataRow;
use crate::error::{FilterError, Result};
use crate::expression::functions::{self, inspect};
use crate::expression::operator::{Operator, OperatorFamily, UnaryOperator};
use crate::expression::{ColumnRef, Expression, FunctionType};
use crate::types::coercion::{cannot_perform, compare_same_type};
use crate::types::{compare_values, convert, derive_operation_type, DataType, Value};
use log::trace;
use rust_decimal::Decimal;
use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Evaluator for expressions against an optional data row
///
/// Computed column values are cached per evaluator, so one evaluator should
/// be used per row.
pub struct ExpressionEvaluator<'a> {
    /// The row whose columns are read, `None` for context-free evaluation
    row: Option<&'a DataRow>,
    /// Computed column values already produced for this row, by column index
    computed_values: RefCell<HashMap<usize, Value>>,
}

impl<'a> ExpressionEvaluator<'a> {
    /// Create an evaluator with no row context
    pub fn new() -> Self {
        Self {
            row: None,
            computed_values: RefCell::new(HashMap::new()),
        }
    }

    /// Create an evaluator reading columns from the given row
    pub fn with_row(row: &'a DataRow) -> Self {
        Self {
            row: Some(row),
            computed_values: RefCell::new(HashMap::new()),
        }
    }

    /// Cached value of a computed column, if it was already evaluated
    pub fn computed_value(&self, index: usize) -> Option<Value> {
        self.computed_values.borrow().get(&index).cloned()
    }

    /// Evaluate an expression and return the result
    pub fn evaluate(&self, expr: &Expression) -> Result<Value> {
        match expr {
            Expression::Value(value) => Ok(value.clone()),

            Expression::Column(column) => self.evaluate_column(column),

            Expression::Unary { op, operand } => {
                let operand = self.evaluate(operand)?;
                apply_unary(*op, operand)
            }

            Expression::Operator { op, left, right } => {
                let left = self.evaluate(left)?;

                if op.is_unary() {
                    return Ok(null_test(*op, &left));
                }

                let right = right.as_deref().ok_or_else(|| {
                    FilterError::evaluation(format!("\"{}\" operator requires a right operand", op))
                })?;
                let right = self.evaluate(right)?;
                apply_binary(*op, &left, &right)
            }

            Expression::Function { function, args } => self.evaluate_function(*function, args),

            Expression::InList {
                value,
                list,
                negated,
                exact_match,
            } => self.evaluate_in_list(value, list, *negated, *exact_match),
        }
    }

    /// Read a column from the row, evaluating computed columns at most once
    pub fn evaluate_column(&self, column: &ColumnRef) -> Result<Value> {
        if let Some(expression) = &column.computed {
            if let Some(value) = self.computed_values.borrow().get(&column.index) {
                return Ok(value.clone());
            }

            let value = convert(&self.evaluate(expression)?, column.data_type)?;
            trace!("computed column \"{}\" evaluated to {}", column.name, value);
            self.computed_values
                .borrow_mut()
                .insert(column.index, value.clone());
            return Ok(value);
        }

        let row = self.row.ok_or_else(|| {
            FilterError::evaluation(format!(
                "column \"{}\" cannot be read without a data row",
                column.name
            ))
        })?;

        row.value(column.index).cloned()
    }

    fn evaluate_function(&self, function: FunctionType, args: &[Expression]) -> Result<Value> {
        function.check_arity(args.len())?;

        match function {
            FunctionType::IIf => {
                let test = self.evaluate(&args[0])?;
                let branch = if inspect::iif_test(&test)? { &args[1] } else { &args[2] };
                self.evaluate(branch)
            }
            FunctionType::Coalesce => {
                let mut last = Value::NULL;
                for arg in args {
                    last = self.evaluate(arg)?;
                    if !last.is_null() {
                        break;
                    }
                }
                Ok(last)
            }
            _ => {
                let values = args
                    .iter()
                    .map(|arg| self.evaluate(arg))
                    .collect::<Result<Vec<_>>>()?;
                functions::call(function, &values)
            }
        }
    }

    fn evaluate_in_list(
        &self,
        value: &Expression,
        list: &[Expression],
        negated: bool,
        exact_match: bool,
    ) -> Result<Value> {
        let probe = self.evaluate(value)?;
        if probe.is_null() {
            return Ok(Value::Null(DataType::Boolean));
        }

        let mut found = false;
        for item in list {
            let candidate = self.evaluate(item)?;
            if compare_values(&probe, &candidate, exact_match)? == Some(Ordering::Equal) {
                found = true;
                break;
            }
        }

        Ok(Value::Boolean(found != negated))
    }
}

impl Default for ExpressionEvaluator<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Evaluate an expression against an optional row
pub fn evaluate(expr: &Expression, row: Option<&DataRow>) -> Result<Value> {
    match row {
        Some(row) => ExpressionEvaluator::with_row(row).evaluate(expr),
        None => ExpressionEvaluator::new().evaluate(expr),
    }
}

fn null_test(op: Operator, value: &Value) -> Value {
    let is_null = value.is_null();
    Value::Boolean(if op == Operator::IsNull { is_null } else { !is_null })
}

/// Apply a unary operator to an evaluated operand
pub fn apply_unary(op: UnaryOperator, operand: Value) -> Result<Value> {
    let data_type = operand.data_type();
    let unsupported = || {
        FilterError::type_error(format!(
            "cannot apply unary \"{}\" to \"{}\"",
            op.as_str().trim(),
            data_type
        ))
    };

    match (op, operand) {
        (_, Value::Null(DataType::Undefined)) => Ok(Value::NULL),
        (UnaryOperator::Plus | UnaryOperator::Minus, Value::Null(t)) if t.is_numeric() => {
            Ok(Value::Null(t))
        }
        (UnaryOperator::Not, Value::Null(t)) if t.is_integer() => Ok(Value::Null(t)),
        (UnaryOperator::Plus, value) if data_type.is_numeric() && !value.is_null() => Ok(value),
        (UnaryOperator::Minus, Value::Boolean(b)) => Ok(Value::Boolean(!b)),
        (UnaryOperator::Minus, Value::Int32(i)) => Ok(Value::Int32(i.wrapping_neg())),
        (UnaryOperator::Minus, Value::Int64(i)) => Ok(Value::Int64(i.wrapping_neg())),
        (UnaryOperator::Minus, Value::Decimal(d)) => Ok(Value::Decimal(-d)),
        (UnaryOperator::Minus, Value::Double(d)) => Ok(Value::Double(-d)),
        (UnaryOperator::Not, Value::Boolean(b)) => Ok(Value::Boolean(!b)),
        (UnaryOperator::Not, Value::Int32(i)) => Ok(Value::Int32(!i)),
        (UnaryOperator::Not, Value::Int64(i)) => Ok(Value::Int64(!i)),
        _ => Err(unsupported()),
    }
}

/// Apply a binary operator to evaluated operands
pub fn apply_binary(op: Operator, left: &Value, right: &Value) -> Result<Value> {
    let family = op.family();

    match family {
        OperatorFamily::NullTest => return Ok(null_test(op, left)),
        OperatorFamily::Boolean => return logical(op, left, right),
        _ => {}
    }

    let operation_type = derive_operation_type(op, left.data_type(), right.data_type())?;
    let result_type = match family {
        OperatorFamily::Comparison | OperatorFamily::Like => DataType::Boolean,
        _ => operation_type,
    };

    if operation_type == DataType::Undefined || left.is_null() || right.is_null() {
        return Ok(Value::Null(result_type));
    }

    let left = convert(left, operation_type)?;

    match family {
        OperatorFamily::Comparison => {
            let right = convert(right, operation_type)?;
            Ok(comparison(op, &left, &right))
        }
        OperatorFamily::Like => like(op, &left, right),
        OperatorFamily::Shift => {
            let amount = convert(right, DataType::Int64)?.as_int64()?.unwrap_or(0);
            shift(op, left, amount)
        }
        _ => {
            let right = convert(right, operation_type)?;
            arithmetic(op, left, right)
        }
    }
}

fn truth_value(value: &Value) -> Option<Option<bool>> {
    match value {
        Value::Boolean(b) => Some(Some(*b)),
        Value::Null(DataType::Boolean) | Value::Null(DataType::Undefined) => Some(None),
        _ => None,
    }
}

/// Three-valued AND / OR
fn logical(op: Operator, left: &Value, right: &Value) -> Result<Value> {
    let (Some(l), Some(r)) = (truth_value(left), truth_value(right)) else {
        return Err(cannot_perform(op, left.data_type(), right.data_type()));
    };

    let result = match op {
        Operator::And => match (l, r) {
            (Some(false), _) | (_, Some(false)) => Some(false),
            (Some(true), Some(true)) => Some(true),
            _ => None,
        },
        _ => match (l, r) {
            (Some(true), _) | (_, Some(true)) => Some(true),
            (Some(false), Some(false)) => Some(false),
            _ => None,
        },
    };

    Ok(result.map_or(Value::Null(DataType::Boolean), Value::Boolean))
}

fn comparison(op: Operator, left: &Value, right: &Value) -> Value {
    let ordering = compare_same_type(left, right, op.is_exact_match());

    Value::Boolean(match op {
        Operator::LessThan => ordering == Some(Ordering::Less),
        Operator::LessThanOrEqual => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
        Operator::GreaterThan => ordering == Some(Ordering::Greater),
        Operator::GreaterThanOrEqual => {
            matches!(ordering, Some(Ordering::Greater | Ordering::Equal))
        }
        Operator::NotEqual | Operator::NotEqualExactMatch => ordering != Some(Ordering::Equal),
        _ => ordering == Some(Ordering::Equal),
    })
}

fn like(op: Operator, text: &Value, pattern: &Value) -> Result<Value> {
    let (Some(text), Some(pattern)) = (text.as_str()?, pattern.as_str()?) else {
        return Ok(Value::Null(DataType::Boolean));
    };

    let matched = like_match(text, pattern, op.is_exact_match());
    let negated = matches!(op, Operator::NotLike | Operator::NotLikeExactMatch);
    Ok(Value::Boolean(matched != negated))
}

/// Match text against a LIKE pattern
///
/// `%` and `*` are wildcards at the start and/or end of the pattern only.
pub fn like_match(text: &str, pattern: &str, exact_match: bool) -> bool {
    let is_wildcard = |c: char| c == '%' || c == '*';

    let (text, pattern) = if exact_match {
        (text.to_string(), pattern.to_string())
    } else {
        (text.to_uppercase(), pattern.to_uppercase())
    };

    let leading = pattern.starts_with(is_wildcard);
    let inner = if leading { &pattern[1..] } else { &pattern[..] };
    let trailing = inner.ends_with(is_wildcard);
    let inner = if trailing {
        &inner[..inner.len() - 1]
    } else {
        inner
    };

    match (leading, trailing) {
        (true, true) => text.contains(inner),
        (true, false) => text.ends_with(inner),
        (false, true) => text.starts_with(inner),
        (false, false) => text == inner,
    }
}

macro_rules! integer_arithmetic {
    ($op:expr, $a:expr, $b:expr) => {
        match $op {
            Operator::Add => Ok($a.wrapping_add($b)),
            Operator::Subtract => Ok($a.wrapping_sub($b)),
            Operator::Multiply => Ok($a.wrapping_mul($b)),
            Operator::Divide if $b == 0 => Err(FilterError::DivisionByZero),
            Operator::Divide => Ok($a.wrapping_div($b)),
            Operator::Modulus if $b == 0 => Err(FilterError::DivisionByZero),
            Operator::Modulus => Ok($a.wrapping_rem($b)),
            Operator::BitwiseAnd => Ok($a & $b),
            Operator::BitwiseOr => Ok($a | $b),
            Operator::BitwiseXor => Ok($a ^ $b),
            _ => Err(FilterError::evaluation(format!(
                "\"{}\" is not an arithmetic operator",
                $op
            ))),
        }
    };
}

fn decimal_arithmetic(op: Operator, a: Decimal, b: Decimal) -> Result<Decimal> {
    let result = match op {
        Operator::Add => a.checked_add(b),
        Operator::Subtract => a.checked_sub(b),
        Operator::Multiply => a.checked_mul(b),
        Operator::Divide | Operator::Modulus if b.is_zero() => {
            return Err(FilterError::DivisionByZero)
        }
        Operator::Divide => a.checked_div(b),
        Operator::Modulus => a.checked_rem(b),
        _ => return Err(cannot_perform(op, DataType::Decimal, DataType::Decimal)),
    };

    result.ok_or_else(|| FilterError::evaluation(format!("Decimal overflow in \"{}\" operation", op)))
}

fn double_arithmetic(op: Operator, a: f64, b: f64) -> Result<f64> {
    match op {
        Operator::Add => Ok(a + b),
        Operator::Subtract => Ok(a - b),
        Operator::Multiply => Ok(a * b),
        Operator::Divide => Ok(a / b),
        Operator::Modulus => Ok(a % b),
        _ => Err(cannot_perform(op, DataType::Double, DataType::Double)),
    }
}

/// Arithmetic and bitwise operators on two values of the operation type
fn arithmetic(op: Operator, left: Value, right: Value) -> Result<Value> {
    match (left, right) {
        (Value::Boolean(a), Value::Boolean(b)) => {
            let result: i32 = integer_arithmetic!(op, i32::from(a), i32::from(b))?;
            Ok(Value::Boolean(result != 0))
        }
        (Value::Int32(a), Value::Int32(b)) => integer_arithmetic!(op, a, b).map(Value::Int32),
        (Value::Int64(a), Value::Int64(b)) => integer_arithmetic!(op, a, b).map(Value::Int64),
        (Value::Decimal(a), Value::Decimal(b)) => decimal_arithmetic(op, a, b).map(Value::Decimal),
        (Value::Double(a), Value::Double(b)) => double_arithmetic(op, a, b).map(Value::Double),
        (Value::String(a), Value::String(b)) if op == Operator::Add => {
            Ok(Value::String(a + &b))
        }
        (left, right) => Err(cannot_perform(op, left.data_type(), right.data_type())),
    }
}

/// `<<` and `>>`; the amount is masked to the width of the left operand
fn shift(op: Operator, left: Value, amount: i64) -> Result<Value> {
    let amount = amount as u32;
    let left_shift = op == Operator::BitShiftLeft;

    match left {
        Value::Boolean(b) => {
            let value = i32::from(b);
            let shifted = if left_shift {
                value.wrapping_shl(amount)
            } else {
                value.wrapping_shr(amount)
            };
            Ok(Value::Boolean(shifted != 0))
        }
        Value::Int32(i) => Ok(Value::Int32(if left_shift {
            i.wrapping_shl(amount)
        } else {
            i.wrapping_shr(amount)
        })),
        Value::Int64(i) => Ok(Value::Int64(if left_shift {
            i.wrapping_shl(amount)
        } else {
            i.wrapping_shr(amount)
        })),
        other => Err(cannot_perform(op, other.data_type(), DataType::Int64)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::ColumnRef;
    use std::str::FromStr;
    use std::sync::Arc;

    fn binary(op: Operator, left: impl Into<Value>, right: impl Into<Value>) -> Result<Value> {
        apply_binary(op, &left.into(), &right.into())
    }

    #[test]
    fn test_literal_evaluation() {
        let evaluator = ExpressionEvaluator::new();
        assert_eq!(
            evaluator.evaluate(&Expression::value(42)).unwrap(),
            Value::Int32(42)
        );
        assert_eq!(evaluator.evaluate(&Expression::null()).unwrap(), Value::NULL);
    }

    #[test]
    fn test_column_evaluation() {
        let row = DataRow::new(vec![Value::Int32(7), Value::string("PPA:1")]);
        let evaluator = ExpressionEvaluator::with_row(&row);
        let column = Expression::column(ColumnRef::new(1, "ID", DataType::String));
        assert_eq!(evaluator.evaluate(&column).unwrap(), Value::string("PPA:1"));

        let missing = Expression::column(ColumnRef::new(5, "Missing", DataType::String));
        assert!(evaluator.evaluate(&missing).is_err());

        let no_row = ExpressionEvaluator::new();
        assert!(no_row.evaluate(&column).is_err());
    }

    #[test]
    fn test_arithmetic_promotion() {
        assert_eq!(binary(Operator::Add, 1, 2i64).unwrap(), Value::Int64(3));
        assert_eq!(binary(Operator::Multiply, 2, 1.5).unwrap(), Value::Double(3.0));
        assert_eq!(
            binary(Operator::Add, 1, Decimal::from_str("0.5").unwrap()).unwrap(),
            Value::Decimal(Decimal::from_str("1.5").unwrap())
        );
        assert_eq!(binary(Operator::Add, "a", 1).unwrap(), Value::string("a1"));
        assert_eq!(binary(Operator::Add, 1.5, "x").unwrap(), Value::string("1.500000x"));
        assert_eq!(binary(Operator::Add, true, true).unwrap(), Value::TRUE);
        assert_eq!(binary(Operator::Subtract, true, true).unwrap(), Value::FALSE);
        assert_eq!(
            binary(Operator::Add, i32::MAX, 1).unwrap(),
            Value::Int32(i32::MIN)
        );
    }

    #[test]
    fn test_division() {
        assert_eq!(binary(Operator::Divide, 7, 2).unwrap(), Value::Int32(3));
        assert_eq!(binary(Operator::Modulus, 7, 2).unwrap(), Value::Int32(1));
        assert_eq!(
            binary(Operator::Divide, 7, 0).unwrap_err(),
            FilterError::DivisionByZero
        );
        assert_eq!(
            binary(Operator::Divide, Decimal::ONE, Decimal::ZERO).unwrap_err(),
            FilterError::DivisionByZero
        );
        assert_eq!(
            binary(Operator::Divide, 1.0, 0.0).unwrap(),
            Value::Double(f64::INFINITY)
        );
    }

    #[test]
    fn test_bitwise_and_shift() {
        assert_eq!(binary(Operator::BitwiseAnd, 6, 3).unwrap(), Value::Int32(2));
        assert_eq!(binary(Operator::BitwiseOr, 6, 3).unwrap(), Value::Int32(7));
        assert_eq!(binary(Operator::BitwiseXor, 6, 3).unwrap(), Value::Int32(5));
        assert_eq!(binary(Operator::BitShiftLeft, 1, 4i64).unwrap(), Value::Int32(16));
        assert_eq!(binary(Operator::BitShiftRight, -16i64, 2).unwrap(), Value::Int64(-4));
        assert!(binary(Operator::BitwiseAnd, 1.5, 1).is_err());
    }

    #[test]
    fn test_null_propagation() {
        assert_eq!(
            binary(Operator::Add, Value::Null(DataType::Int32), 1i64).unwrap(),
            Value::Null(DataType::Int64)
        );
        assert_eq!(binary(Operator::Add, Value::NULL, 1).unwrap(), Value::NULL);
        assert_eq!(
            binary(Operator::Equal, Value::NULL, 1).unwrap(),
            Value::Null(DataType::Boolean)
        );
        assert_eq!(
            binary(Operator::LessThan, Value::Null(DataType::Int32), 1).unwrap(),
            Value::Null(DataType::Boolean)
        );
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(binary(Operator::Equal, "abc", "ABC").unwrap(), Value::TRUE);
        assert_eq!(
            binary(Operator::EqualExactMatch, "abc", "ABC").unwrap(),
            Value::FALSE
        );
        assert_eq!(binary(Operator::NotEqual, 1, 2).unwrap(), Value::TRUE);
        assert_eq!(binary(Operator::LessThan, 1, 1.5).unwrap(), Value::TRUE);
        assert_eq!(binary(Operator::GreaterThanOrEqual, "10", 9).unwrap(), Value::TRUE);
        assert_eq!(
            binary(Operator::NotEqual, f64::NAN, f64::NAN).unwrap(),
            Value::TRUE
        );
        assert!(binary(Operator::Equal, uuid::Uuid::nil(), 1).is_err());
    }

    #[test]
    fn test_three_valued_logic() {
        let null = Value::Null(DataType::Boolean);
        assert_eq!(binary(Operator::And, null.clone(), false).unwrap(), Value::FALSE);
        assert_eq!(binary(Operator::And, null.clone(), true).unwrap(), null);
        assert_eq!(binary(Operator::Or, null.clone(), true).unwrap(), Value::TRUE);
        assert_eq!(binary(Operator::Or, Value::NULL, false).unwrap(), null);
        assert!(binary(Operator::And, 1, true).is_err());
    }

    #[test]
    fn test_like_patterns() {
        assert!(like_match("STAT", "ST%", false));
        assert!(like_match("FREQ", "*EQ", false));
        assert!(like_match("STATUS", "*TA%", false));
        assert!(like_match("stat", "ST%", false));
        assert!(!like_match("stat", "ST%", true));
        assert!(like_match("FREQ", "freq", false));
        assert!(like_match("anything", "%", false));
        assert_eq!(binary(Operator::NotLike, "FREQ", "ST%").unwrap(), Value::TRUE);
        assert!(binary(Operator::Like, 1, "1%").is_err());
    }

    #[test]
    fn test_unary() {
        assert_eq!(apply_unary(UnaryOperator::Minus, Value::Int32(5)).unwrap(), Value::Int32(-5));
        assert_eq!(apply_unary(UnaryOperator::Minus, Value::TRUE).unwrap(), Value::FALSE);
        assert_eq!(apply_unary(UnaryOperator::Not, Value::Int32(0)).unwrap(), Value::Int32(-1));
        assert_eq!(apply_unary(UnaryOperator::Not, Value::TRUE).unwrap(), Value::FALSE);
        assert_eq!(
            apply_unary(UnaryOperator::Plus, Value::Null(DataType::Double)).unwrap(),
            Value::Null(DataType::Double)
        );
        assert!(apply_unary(UnaryOperator::Minus, Value::string("x")).is_err());
        assert!(apply_unary(UnaryOperator::Not, Value::Double(1.0)).is_err());
    }

    #[test]
    fn test_in_list() {
        let list = vec![Expression::value("A"), Expression::value("B")];
        let expr = Expression::in_list(Expression::value("a"), list.clone(), false, false);
        assert_eq!(evaluate(&expr, None).unwrap(), Value::TRUE);

        let expr = Expression::in_list(Expression::value("a"), list.clone(), false, true);
        assert_eq!(evaluate(&expr, None).unwrap(), Value::FALSE);

        let expr = Expression::in_list(Expression::value("C"), list.clone(), true, false);
        assert_eq!(evaluate(&expr, None).unwrap(), Value::TRUE);

        let expr = Expression::in_list(Expression::null(), list, false, false);
        assert_eq!(
            evaluate(&expr, None).unwrap(),
            Value::Null(DataType::Boolean)
        );
    }

    #[test]
    fn test_lazy_functions() {
        // The untaken branch would fail with a division by zero
        let failing = Expression::binary(Operator::Divide, Expression::value(1), Expression::value(0));
        let expr = Expression::function(
            FunctionType::IIf,
            vec![Expression::value(true), Expression::value(1), failing.clone()],
        );
        assert_eq!(evaluate(&expr, None).unwrap(), Value::Int32(1));

        let expr = Expression::function(
            FunctionType::Coalesce,
            vec![Expression::null(), Expression::value("x"), failing],
        );
        assert_eq!(evaluate(&expr, None).unwrap(), Value::string("x"));
    }

    #[test]
    fn test_computed_column_is_cached_per_row() {
        let row = DataRow::new(vec![Value::Int32(20), Value::Null(DataType::Double)]);
        let computed = Arc::new(Expression::binary(
            Operator::Divide,
            Expression::column(ColumnRef::new(0, "Raw", DataType::Int32)),
            Expression::value(8),
        ));
        let column = Expression::column(ColumnRef::computed(
            1,
            "Scaled",
            DataType::Double,
            computed,
        ));

        let evaluator = ExpressionEvaluator::with_row(&row);
        assert_eq!(evaluator.computed_value(1), None);
        assert_eq!(evaluator.evaluate(&column).unwrap(), Value::Double(2.0));
        assert_eq!(evaluator.computed_value(1), Some(Value::Double(2.0)));
        assert_eq!(evaluator.evaluate(&column).unwrap(), Value::Double(2.0));
    }
}
