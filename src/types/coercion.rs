//! Type coercion: result type derivation for operators and value conversion.
//!
//! Every operator family has a derivation rule over the full kind matrix, and
//! `convert` moves a value between any two kinds (or reports why it cannot).

use crate::error::{FilterError, Result};
use crate::expression::operator::{Operator, OperatorFamily};
use crate::types::datetime::parse_datetime;
use crate::types::{DataType, Value};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::str::FromStr;
use uuid::Uuid;

/// Derive the type an operation is performed in for the given operand types
///
/// Comparison, LIKE, NULL-test and boolean operators produce a Boolean result;
/// the returned type is the type both operands are converted to before the
/// operation is applied.
pub fn derive_operation_type(op: Operator, left: DataType, right: DataType) -> Result<DataType> {
    let family = op.family();

    if family == OperatorFamily::NullTest {
        return Ok(left);
    }

    if left == DataType::Undefined || right == DataType::Undefined {
        return Ok(DataType::Undefined);
    }

    match family {
        OperatorFamily::Arithmetic => derive_arithmetic_type(op, left, right),
        OperatorFamily::Integer => derive_integer_type(op, left, right),
        OperatorFamily::Shift => derive_shift_type(op, left, right),
        OperatorFamily::Comparison => derive_comparison_type(op, left, right),
        OperatorFamily::Like => derive_like_type(op, left, right),
        OperatorFamily::Boolean => derive_boolean_type(op, left, right),
        OperatorFamily::NullTest => Ok(left),
    }
}

/// `* / + -`: numeric promotion, `+` with a String operand concatenates
pub fn derive_arithmetic_type(op: Operator, left: DataType, right: DataType) -> Result<DataType> {
    if op == Operator::Add && (left == DataType::String || right == DataType::String) {
        return Ok(DataType::String);
    }

    wider_numeric(left, right).ok_or_else(|| cannot_perform(op, left, right))
}

/// `% & | ^`: Boolean, Int32 and Int64 only
pub fn derive_integer_type(op: Operator, left: DataType, right: DataType) -> Result<DataType> {
    if left.is_integer() && right.is_integer() {
        wider_numeric(left, right).ok_or_else(|| cannot_perform(op, left, right))
    } else {
        Err(cannot_perform(op, left, right))
    }
}

/// `<< >>`: result keeps the left operand type
pub fn derive_shift_type(op: Operator, left: DataType, right: DataType) -> Result<DataType> {
    if left.is_integer() && right.is_integer() {
        Ok(left)
    } else {
        Err(cannot_perform(op, left, right))
    }
}

/// Comparisons: numeric promotion, String compares through the other operand's type
pub fn derive_comparison_type(op: Operator, left: DataType, right: DataType) -> Result<DataType> {
    match (left, right) {
        (DataType::Undefined, _) | (_, DataType::Undefined) => Ok(DataType::Undefined),
        (DataType::String, DataType::String) => Ok(DataType::String),
        (DataType::String, other) | (other, DataType::String) => Ok(other),
        (DataType::Guid, DataType::Guid) => Ok(DataType::Guid),
        (DataType::DateTime, DataType::DateTime) => Ok(DataType::DateTime),
        _ => wider_numeric(left, right).ok_or_else(|| cannot_perform(op, left, right)),
    }
}

/// `LIKE`: both operands must be strings
pub fn derive_like_type(op: Operator, left: DataType, right: DataType) -> Result<DataType> {
    match (left, right) {
        (DataType::String, DataType::String) => Ok(left),
        _ => Err(cannot_perform(op, left, right)),
    }
}

/// `AND OR`: both operands must be Boolean
pub fn derive_boolean_type(op: Operator, left: DataType, right: DataType) -> Result<DataType> {
    match (left, right) {
        (DataType::Boolean, DataType::Boolean) => Ok(DataType::Boolean),
        _ => Err(cannot_perform(op, left, right)),
    }
}

/// The wider of two numeric types, `None` if either is not numeric
pub fn wider_numeric(left: DataType, right: DataType) -> Option<DataType> {
    let l = left.numeric_rank()?;
    let r = right.numeric_rank()?;
    Some(if l >= r { left } else { right })
}

pub(crate) fn cannot_perform(op: Operator, left: DataType, right: DataType) -> FilterError {
    FilterError::type_error(format!(
        "cannot perform \"{}\" operation on \"{}\" and \"{}\"",
        op.as_str(),
        left,
        right
    ))
}

fn cannot_convert(value: &Value, target: DataType) -> FilterError {
    FilterError::type_error(format!(
        "cannot convert \"{}\" to \"{}\"",
        value.data_type(),
        target
    ))
}

fn out_of_range(value: &Value, target: DataType) -> FilterError {
    FilterError::conversion(format!(
        "\"{}\" value {} is out of range for \"{}\"",
        value.data_type(),
        value,
        target
    ))
}

/// Convert a value to the target type
pub fn convert(value: &Value, target: DataType) -> Result<Value> {
    if value.is_null() {
        return Ok(Value::Null(target));
    }

    if value.data_type() == target {
        return Ok(value.clone());
    }

    match (value, target) {
        (_, DataType::Undefined) => Err(cannot_convert(value, target)),
        (_, DataType::String) => Ok(Value::String(value.to_string())),
        (Value::String(text), _) => parse_string(text, target),
        (Value::Boolean(b), _) => convert_integer(value, i64::from(*b), target),
        (Value::Int32(i), _) => convert_integer(value, i64::from(*i), target),
        (Value::Int64(i), _) => convert_integer(value, *i, target),
        (Value::Decimal(d), _) => convert_decimal(value, *d, target),
        (Value::Double(f), _) => convert_double(value, *f, target),
        (Value::Guid(_), _) | (Value::DateTime(_), _) => Err(cannot_convert(value, target)),
        (Value::Null(_), _) => Ok(Value::Null(target)),
    }
}

fn convert_integer(source: &Value, value: i64, target: DataType) -> Result<Value> {
    match target {
        DataType::Boolean => Ok(Value::Boolean(value != 0)),
        DataType::Int32 => i32::try_from(value)
            .map(Value::Int32)
            .map_err(|_| out_of_range(source, target)),
        DataType::Int64 => Ok(Value::Int64(value)),
        DataType::Decimal => Ok(Value::Decimal(Decimal::from(value))),
        DataType::Double => Ok(Value::Double(value as f64)),
        DataType::String | DataType::Guid | DataType::DateTime | DataType::Undefined => {
            Err(cannot_convert(source, target))
        }
    }
}

fn convert_decimal(source: &Value, value: Decimal, target: DataType) -> Result<Value> {
    match target {
        DataType::Boolean => Ok(Value::Boolean(!value.is_zero())),
        DataType::Int32 => value
            .trunc()
            .to_i32()
            .map(Value::Int32)
            .ok_or_else(|| out_of_range(source, target)),
        DataType::Int64 => value
            .trunc()
            .to_i64()
            .map(Value::Int64)
            .ok_or_else(|| out_of_range(source, target)),
        DataType::Decimal => Ok(Value::Decimal(value)),
        DataType::Double => value
            .to_f64()
            .map(Value::Double)
            .ok_or_else(|| out_of_range(source, target)),
        DataType::String | DataType::Guid | DataType::DateTime | DataType::Undefined => {
            Err(cannot_convert(source, target))
        }
    }
}

fn convert_double(source: &Value, value: f64, target: DataType) -> Result<Value> {
    let truncated = value.trunc();

    match target {
        DataType::Boolean => Ok(Value::Boolean(value != 0.0)),
        DataType::Int32 => {
            if value.is_finite() && truncated >= i32::MIN as f64 && truncated <= i32::MAX as f64 {
                Ok(Value::Int32(truncated as i32))
            } else {
                Err(out_of_range(source, target))
            }
        }
        DataType::Int64 => {
            // i64::MAX is not representable as f64, the bound is exclusive
            if value.is_finite() && truncated >= i64::MIN as f64 && truncated < i64::MAX as f64 {
                Ok(Value::Int64(truncated as i64))
            } else {
                Err(out_of_range(source, target))
            }
        }
        DataType::Decimal => Decimal::from_f64(value)
            .map(Value::Decimal)
            .ok_or_else(|| out_of_range(source, target)),
        DataType::Double => Ok(Value::Double(value)),
        DataType::String | DataType::Guid | DataType::DateTime | DataType::Undefined => {
            Err(cannot_convert(source, target))
        }
    }
}

fn parse_failure(text: &str, target: DataType) -> FilterError {
    FilterError::conversion(format!("cannot parse \"{}\" as \"{}\"", text, target))
}

fn parse_string(text: &str, target: DataType) -> Result<Value> {
    let trimmed = text.trim();

    match target {
        DataType::Boolean => parse_boolean(trimmed)
            .map(Value::Boolean)
            .ok_or_else(|| parse_failure(text, target)),
        DataType::Int32 | DataType::Int64 => {
            if let Ok(i) = trimmed.parse::<i64>() {
                let source = Value::String(text.to_string());
                return convert_integer(&source, i, target);
            }
            match parse_decimal(trimmed) {
                Some(d) => convert_decimal(&Value::String(text.to_string()), d, target),
                None => Err(parse_failure(text, target)),
            }
        }
        DataType::Decimal => parse_decimal(trimmed)
            .map(Value::Decimal)
            .ok_or_else(|| parse_failure(text, target)),
        DataType::Double => trimmed
            .parse::<f64>()
            .map(Value::Double)
            .map_err(|_| parse_failure(text, target)),
        DataType::Guid => parse_guid(trimmed)
            .map(Value::Guid)
            .ok_or_else(|| parse_failure(text, target)),
        DataType::DateTime => parse_datetime(trimmed)
            .map(Value::DateTime)
            .ok_or_else(|| parse_failure(text, target)),
        DataType::String => Ok(Value::String(text.to_string())),
        DataType::Undefined => Err(cannot_convert(&Value::String(text.to_string()), target)),
    }
}

/// Parse `true`/`false`/`1`/`0`, case-insensitive
pub fn parse_boolean(text: &str) -> Option<bool> {
    if text.eq_ignore_ascii_case("true") || text == "1" {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") || text == "0" {
        Some(false)
    } else {
        None
    }
}

/// Parse decimal text, including scientific notation
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    Decimal::from_str(text)
        .ok()
        .or_else(|| Decimal::from_scientific(text).ok())
}

/// Parse GUID text with optional surrounding quotes and braces
pub fn parse_guid(text: &str) -> Option<Uuid> {
    let text = text.trim();
    let text = text
        .strip_prefix('\'')
        .and_then(|t| t.strip_suffix('\''))
        .unwrap_or(text);
    let text = text
        .strip_prefix('{')
        .and_then(|t| t.strip_suffix('}'))
        .unwrap_or(text);

    if text.len() != 36 {
        return None;
    }

    Uuid::parse_str(text).ok()
}

/// Compare two strings, ignoring case unless `exact_match` is set
pub fn compare_strings(left: &str, right: &str, exact_match: bool) -> Ordering {
    if exact_match {
        left.cmp(right)
    } else {
        left.to_uppercase().cmp(&right.to_uppercase())
    }
}

/// Compare two values after converting both to their common comparison type
///
/// Returns `Ok(None)` when either side is NULL (or a NaN is involved).
pub fn compare_values(left: &Value, right: &Value, exact_match: bool) -> Result<Option<Ordering>> {
    let op = if exact_match {
        Operator::EqualExactMatch
    } else {
        Operator::Equal
    };
    let comparison_type = derive_comparison_type(op, left.data_type(), right.data_type())?;

    if comparison_type == DataType::Undefined || left.is_null() || right.is_null() {
        return Ok(None);
    }

    let left = convert(left, comparison_type)?;
    let right = convert(right, comparison_type)?;

    Ok(compare_same_type(&left, &right, exact_match))
}

/// Compare two non-null values that already share a type
pub fn compare_same_type(left: &Value, right: &Value, exact_match: bool) -> Option<Ordering> {
    match (left, right) {
        (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
        (Value::Int32(a), Value::Int32(b)) => Some(a.cmp(b)),
        (Value::Int64(a), Value::Int64(b)) => Some(a.cmp(b)),
        (Value::Decimal(a), Value::Decimal(b)) => Some(a.cmp(b)),
        (Value::Double(a), Value::Double(b)) => a.partial_cmp(b),
        (Value::String(a), Value::String(b)) => Some(compare_strings(a, b, exact_match)),
        (Value::Guid(a), Value::Guid(b)) => Some(a.cmp(b)),
        (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
        (Value::Null(_), _) | (_, Value::Null(_)) => None,
        _ => unreachable!(
            "compare_same_type called with \"{}\" and \"{}\"",
            left.data_type(),
            right.data_type()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    const ALL_OPERATORS: [Operator; 26] = [
        Operator::Multiply,
        Operator::Divide,
        Operator::Modulus,
        Operator::Add,
        Operator::Subtract,
        Operator::BitShiftLeft,
        Operator::BitShiftRight,
        Operator::BitwiseAnd,
        Operator::BitwiseOr,
        Operator::BitwiseXor,
        Operator::LessThan,
        Operator::LessThanOrEqual,
        Operator::GreaterThan,
        Operator::GreaterThanOrEqual,
        Operator::Equal,
        Operator::EqualExactMatch,
        Operator::NotEqual,
        Operator::NotEqualExactMatch,
        Operator::IsNull,
        Operator::IsNotNull,
        Operator::Like,
        Operator::LikeExactMatch,
        Operator::NotLike,
        Operator::NotLikeExactMatch,
        Operator::And,
        Operator::Or,
    ];

    fn sample(data_type: DataType) -> Value {
        match data_type {
            DataType::Boolean => Value::Boolean(true),
            DataType::Int32 => Value::Int32(12),
            DataType::Int64 => Value::Int64(12),
            DataType::Decimal => Value::Decimal(Decimal::new(125, 1)),
            DataType::Double => Value::Double(12.5),
            DataType::String => Value::string("12"),
            DataType::Guid => Value::Guid(Uuid::nil()),
            DataType::DateTime => Value::DateTime(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()),
            DataType::Undefined => Value::NULL,
        }
    }

    #[test]
    fn test_arithmetic_promotion() {
        let add = Operator::Add;
        assert_eq!(
            derive_operation_type(add, DataType::Int32, DataType::Int64).unwrap(),
            DataType::Int64
        );
        assert_eq!(
            derive_operation_type(add, DataType::Boolean, DataType::Int32).unwrap(),
            DataType::Int32
        );
        assert_eq!(
            derive_operation_type(Operator::Multiply, DataType::Decimal, DataType::Double).unwrap(),
            DataType::Double
        );
        assert_eq!(
            derive_operation_type(add, DataType::Guid, DataType::String).unwrap(),
            DataType::String
        );
        assert!(derive_operation_type(Operator::Subtract, DataType::String, DataType::Int32).is_err());
        assert!(derive_operation_type(add, DataType::Guid, DataType::Int32).is_err());
        assert!(derive_operation_type(add, DataType::DateTime, DataType::DateTime).is_err());
    }

    #[test]
    fn test_integer_and_shift_rules() {
        assert_eq!(
            derive_operation_type(Operator::Modulus, DataType::Int32, DataType::Int64).unwrap(),
            DataType::Int64
        );
        assert!(derive_operation_type(Operator::BitwiseAnd, DataType::Double, DataType::Int32).is_err());
        assert!(derive_operation_type(Operator::BitwiseXor, DataType::Decimal, DataType::Int32).is_err());
        assert_eq!(
            derive_operation_type(Operator::BitShiftLeft, DataType::Int32, DataType::Int64).unwrap(),
            DataType::Int32
        );
        assert!(derive_operation_type(Operator::BitShiftRight, DataType::String, DataType::Int32).is_err());
    }

    #[test]
    fn test_comparison_rules() {
        let eq = Operator::Equal;
        assert_eq!(
            derive_operation_type(eq, DataType::Guid, DataType::String).unwrap(),
            DataType::Guid
        );
        assert_eq!(
            derive_operation_type(eq, DataType::String, DataType::DateTime).unwrap(),
            DataType::DateTime
        );
        assert_eq!(
            derive_operation_type(eq, DataType::String, DataType::Int32).unwrap(),
            DataType::Int32
        );
        assert_eq!(
            derive_operation_type(eq, DataType::Int32, DataType::Double).unwrap(),
            DataType::Double
        );
        assert!(derive_operation_type(eq, DataType::Guid, DataType::DateTime).is_err());
        assert!(derive_operation_type(eq, DataType::Guid, DataType::Int32).is_err());
    }

    #[test]
    fn test_undefined_propagates() {
        for op in ALL_OPERATORS {
            if op.family() == OperatorFamily::NullTest {
                continue;
            }
            assert_eq!(
                derive_operation_type(op, DataType::Undefined, DataType::Int32).unwrap(),
                DataType::Undefined
            );
            assert_eq!(
                derive_operation_type(op, DataType::Guid, DataType::Undefined).unwrap(),
                DataType::Undefined
            );
        }
    }

    #[test]
    fn test_derivation_matrix_is_total() {
        // Every cell either yields a type or a type error; none panics
        for op in ALL_OPERATORS {
            for left in DataType::ALL {
                for right in DataType::ALL {
                    match derive_operation_type(op, left, right) {
                        Ok(_) => {}
                        Err(FilterError::Type(message)) => {
                            assert!(message.starts_with("cannot perform"))
                        }
                        Err(other) => panic!("unexpected error {:?}", other),
                    }
                }
            }
        }
    }

    #[test]
    fn test_convert_null_to_every_type() {
        for from in DataType::ALL {
            for to in DataType::ALL {
                assert_eq!(convert(&Value::Null(from), to).unwrap(), Value::Null(to));
            }
        }
    }

    #[test]
    fn test_convert_matrix_never_panics() {
        for from in DataType::CONCRETE {
            for to in DataType::ALL {
                if let Ok(converted) = convert(&sample(from), to) {
                    assert_eq!(converted.data_type(), to);
                }
            }
        }
    }

    #[test]
    fn test_convert_numeric() {
        assert_eq!(
            convert(&Value::Double(3.9), DataType::Int32).unwrap(),
            Value::Int32(3)
        );
        assert_eq!(
            convert(&Value::Double(-3.9), DataType::Int64).unwrap(),
            Value::Int64(-3)
        );
        assert_eq!(
            convert(&Value::Int64(i64::from(i32::MAX) + 1), DataType::Int32),
            Err(FilterError::conversion(
                "\"Int64\" value 2147483648 is out of range for \"Int32\""
            ))
        );
        assert_eq!(
            convert(&Value::Int32(0), DataType::Boolean).unwrap(),
            Value::Boolean(false)
        );
        assert_eq!(
            convert(&Value::Boolean(true), DataType::Decimal).unwrap(),
            Value::Decimal(Decimal::ONE)
        );
        assert!(convert(&Value::Double(f64::NAN), DataType::Int32).is_err());
    }

    #[test]
    fn test_convert_strings() {
        assert_eq!(
            convert(&Value::string(" 42 "), DataType::Int32).unwrap(),
            Value::Int32(42)
        );
        assert_eq!(
            convert(&Value::string("42.7"), DataType::Int32).unwrap(),
            Value::Int32(42)
        );
        assert_eq!(
            convert(&Value::string("1e3"), DataType::Double).unwrap(),
            Value::Double(1000.0)
        );
        assert_eq!(
            convert(&Value::string("False"), DataType::Boolean).unwrap(),
            Value::Boolean(false)
        );
        assert!(convert(&Value::string("maybe"), DataType::Boolean).is_err());

        let guid = convert(
            &Value::string("{0F9C3A4B-1111-2222-3333-444455556666}"),
            DataType::Guid,
        )
        .unwrap();
        assert_eq!(
            guid.to_string(),
            "{0f9c3a4b-1111-2222-3333-444455556666}"
        );

        assert_eq!(
            convert(&Value::Int32(5), DataType::String).unwrap(),
            Value::string("5")
        );
        assert_eq!(
            convert(&Value::Double(2.0), DataType::String).unwrap(),
            Value::string("2.000000")
        );
    }

    #[test]
    fn test_guid_and_datetime_are_isolated() {
        assert!(matches!(
            convert(&sample(DataType::Guid), DataType::Int32),
            Err(FilterError::Type(_))
        ));
        assert!(matches!(
            convert(&sample(DataType::DateTime), DataType::Guid),
            Err(FilterError::Type(_))
        ));
        assert!(matches!(
            convert(&Value::Int64(5), DataType::DateTime),
            Err(FilterError::Type(_))
        ));
    }

    #[test]
    fn test_compare_values() {
        assert_eq!(
            compare_values(&Value::Int32(5), &Value::Double(5.0), false).unwrap(),
            Some(Ordering::Equal)
        );
        assert_eq!(
            compare_values(&Value::string("abc"), &Value::string("ABC"), false).unwrap(),
            Some(Ordering::Equal)
        );
        assert_ne!(
            compare_values(&Value::string("abc"), &Value::string("ABC"), true).unwrap(),
            Some(Ordering::Equal)
        );
        assert_eq!(
            compare_values(&Value::Int32(5), &Value::Null(DataType::Int32), false).unwrap(),
            None
        );
        assert_eq!(
            compare_values(&Value::string("10"), &Value::Int32(9), false).unwrap(),
            Some(Ordering::Greater)
        );
    }

    #[test]
    fn test_parse_guid_forms() {
        let text = "0f9c3a4b-1111-2222-3333-444455556666";
        let expected = Uuid::parse_str(text).unwrap();
        assert_eq!(parse_guid(text), Some(expected));
        assert_eq!(parse_guid(&format!("{{{}}}", text)), Some(expected));
        assert_eq!(parse_guid(&format!("'{{{}}}'", text)), Some(expected));
        assert_eq!(parse_guid("0f9c3a4b"), None);
    }
}
