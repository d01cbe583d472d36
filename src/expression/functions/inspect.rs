//! Predicate, selection and conversion functions.

use super::{arg, string_arg};
use crate::error::{FilterError, Result};
use crate::expression::function::FunctionType;
use crate::types::coercion::{parse_guid, parse_decimal};
use crate::types::datetime::parse_datetime;
use crate::types::{compare_values, convert, DataType, Value};
use std::cmp::Ordering;

/// `IsNull(test, default)`
pub fn is_null(args: &[Value]) -> Result<Value> {
    let test = arg(args, 0);
    Ok(if test.is_null() {
        arg(args, 1).clone()
    } else {
        test.clone()
    })
}

pub fn is_date(args: &[Value]) -> Result<Value> {
    Ok(Value::Boolean(match arg(args, 0) {
        Value::DateTime(_) => true,
        Value::String(s) => parse_datetime(s).is_some(),
        _ => false,
    }))
}

pub fn is_integer(args: &[Value]) -> Result<Value> {
    Ok(Value::Boolean(match arg(args, 0) {
        Value::Int32(_) | Value::Int64(_) => true,
        Value::String(s) => s.trim().parse::<i64>().is_ok(),
        _ => false,
    }))
}

pub fn is_guid(args: &[Value]) -> Result<Value> {
    Ok(Value::Boolean(match arg(args, 0) {
        Value::Guid(_) => true,
        Value::String(s) => parse_guid(s).is_some(),
        _ => false,
    }))
}

pub fn is_numeric(args: &[Value]) -> Result<Value> {
    Ok(Value::Boolean(match arg(args, 0) {
        Value::Int32(_) | Value::Int64(_) | Value::Decimal(_) | Value::Double(_) => true,
        Value::String(s) => {
            let s = s.trim();
            parse_decimal(s).is_some() || s.parse::<f64>().map_or(false, f64::is_finite)
        }
        _ => false,
    }))
}

/// First non-null argument, or the last argument when all are NULL
pub fn coalesce(args: &[Value]) -> Result<Value> {
    Ok(args
        .iter()
        .find(|value| !value.is_null())
        .or_else(|| args.last())
        .cloned()
        .unwrap_or(Value::NULL))
}

/// Validate an `IIf` test value: `Some(true)` takes the first branch
pub fn iif_test(test: &Value) -> Result<bool> {
    match test {
        Value::Boolean(b) => Ok(*b),
        Value::Null(DataType::Boolean) | Value::Null(DataType::Undefined) => Ok(false),
        other => Err(FilterError::type_error(format!(
            "IIf function test must be \"Boolean\", got \"{}\"",
            other.data_type()
        ))),
    }
}

/// `IIf(test, whenTrue, whenFalse)`, a NULL test takes the false branch
pub fn iif(args: &[Value]) -> Result<Value> {
    Ok(if iif_test(arg(args, 0))? {
        arg(args, 1).clone()
    } else {
        arg(args, 2).clone()
    })
}

/// `Convert(value, typeName)`
pub fn convert_to(args: &[Value]) -> Result<Value> {
    let type_name = string_arg(FunctionType::Convert, args, 1)?.ok_or_else(|| {
        FilterError::type_error(format!(
            "Convert function cannot convert \"{}\" to a NULL type name",
            arg(args, 0).data_type()
        ))
    })?;

    let target = DataType::from_type_name(&type_name).ok_or_else(|| {
        FilterError::type_error(format!(
            "Convert function cannot convert \"{}\" to unrecognized type \"{}\"",
            arg(args, 0).data_type(),
            type_name
        ))
    })?;

    convert(arg(args, 0), target)
}

fn extreme_of(function: FunctionType, args: &[Value], keep: Ordering) -> Result<Value> {
    let mut best: Option<&Value> = None;

    for value in args.iter().filter(|value| !value.is_null()) {
        best = match best {
            None => Some(value),
            Some(current) => match compare_values(value, current, false)? {
                Some(ordering) if ordering == keep => Some(value),
                Some(_) => Some(current),
                None => {
                    return Err(FilterError::evaluation(format!(
                        "{} function cannot order \"{}\" and \"{}\"",
                        function,
                        value.data_type(),
                        current.data_type()
                    )))
                }
            },
        };
    }

    Ok(best.or_else(|| args.first()).cloned().unwrap_or(Value::NULL))
}

/// Largest non-null argument
pub fn max_of(args: &[Value]) -> Result<Value> {
    extreme_of(FunctionType::MaxOf, args, Ordering::Greater)
}

/// Smallest non-null argument
pub fn min_of(args: &[Value]) -> Result<Value> {
    extreme_of(FunctionType::MinOf, args, Ordering::Less)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_null_picks_default() {
        assert_eq!(
            is_null(&[Value::Null(DataType::Int32), Value::Int32(5)]).unwrap(),
            Value::Int32(5)
        );
        assert_eq!(
            is_null(&[Value::Int32(1), Value::Int32(5)]).unwrap(),
            Value::Int32(1)
        );
    }

    #[test]
    fn test_inspection_never_returns_null() {
        for function in [is_date, is_integer, is_guid, is_numeric] {
            assert_eq!(function(&[Value::NULL]).unwrap(), Value::FALSE);
        }
        assert_eq!(is_date(&[Value::string("2024-01-02")]).unwrap(), Value::TRUE);
        assert_eq!(is_integer(&[Value::Int64(1)]).unwrap(), Value::TRUE);
        assert_eq!(is_integer(&[Value::Double(1.0)]).unwrap(), Value::FALSE);
        assert_eq!(is_integer(&[Value::string(" 42 ")]).unwrap(), Value::TRUE);
        assert_eq!(
            is_guid(&[Value::string("{0f9c3a4b-1111-2222-3333-444455556666}")]).unwrap(),
            Value::TRUE
        );
        assert_eq!(is_numeric(&[Value::string("1.5e3")]).unwrap(), Value::TRUE);
        assert_eq!(is_numeric(&[Value::Boolean(true)]).unwrap(), Value::FALSE);
        assert_eq!(is_numeric(&[Value::string("abc")]).unwrap(), Value::FALSE);
    }

    #[test]
    fn test_coalesce() {
        assert_eq!(
            coalesce(&[Value::NULL, Value::Null(DataType::String), Value::string("x")]).unwrap(),
            Value::string("x")
        );
        assert_eq!(
            coalesce(&[Value::NULL, Value::Null(DataType::Int32)]).unwrap(),
            Value::Null(DataType::Int32)
        );
    }

    #[test]
    fn test_iif() {
        assert_eq!(
            iif(&[Value::TRUE, Value::Int32(1), Value::Int32(2)]).unwrap(),
            Value::Int32(1)
        );
        assert_eq!(
            iif(&[Value::Null(DataType::Boolean), Value::Int32(1), Value::Int32(2)]).unwrap(),
            Value::Int32(2)
        );
        assert!(iif(&[Value::Int32(1), Value::Int32(1), Value::Int32(2)]).is_err());
    }

    #[test]
    fn test_convert_to() {
        assert_eq!(
            convert_to(&[Value::string("12.7"), Value::string("System.Int32")]).unwrap(),
            Value::Int32(12)
        );
        assert_eq!(
            convert_to(&[Value::Int32(5), Value::string("double")]).unwrap(),
            Value::Double(5.0)
        );
        assert_eq!(
            convert_to(&[Value::Int32(5), Value::string("Blob")]).unwrap_err(),
            FilterError::type_error(
                "Convert function cannot convert \"Int32\" to unrecognized type \"Blob\""
            )
        );
        assert!(matches!(
            convert_to(&[Value::Int32(5), Value::Null(DataType::String)]),
            Err(FilterError::Type(_))
        ));
        assert!(matches!(
            convert_to(&[Value::string("abc"), Value::string("Int32")]),
            Err(FilterError::Conversion(_))
        ));
    }

    #[test]
    fn test_max_min_skip_nulls() {
        let args = [
            Value::Int32(3),
            Value::NULL,
            Value::Double(7.5),
            Value::Int64(-2),
        ];
        assert_eq!(max_of(&args).unwrap(), Value::Double(7.5));
        assert_eq!(min_of(&args).unwrap(), Value::Int64(-2));
        assert_eq!(max_of(&[Value::NULL]).unwrap(), Value::NULL);
        assert!(max_of(&[Value::Int32(1), Value::TRUE, Value::string("x")]).is_err());
    }
}
