//! Built-in function implementations.
//!
//! Every function takes its already-evaluated arguments and returns a value.
//! `IIf` and `Coalesce` are also short-circuited by the evaluator; the eager
//! versions here give the same results when every argument is available.

pub mod datetime;
pub mod inspect;
pub mod math;
pub mod string;

use crate::error::{FilterError, Result};
use crate::expression::function::FunctionType;
use crate::types::{convert, DataType, Value};
use chrono::{DateTime, Utc};

/// Invoke a function with evaluated arguments
pub fn call(function: FunctionType, args: &[Value]) -> Result<Value> {
    function.check_arity(args.len())?;

    match function {
        FunctionType::Abs => math::abs(args),
        FunctionType::Ceiling => math::ceiling(args),
        FunctionType::Floor => math::floor(args),
        FunctionType::Power => math::power(args),
        FunctionType::Round => math::round(args),
        FunctionType::Sqrt => math::sqrt(args),

        FunctionType::Len => string::len(args),
        FunctionType::Lower => string::lower(args),
        FunctionType::Upper => string::upper(args),
        FunctionType::Trim => string::trim(args),
        FunctionType::TrimLeft => string::trim_left(args),
        FunctionType::TrimRight => string::trim_right(args),
        FunctionType::SubStr => string::substr(args),
        FunctionType::Replace => string::replace(args),
        FunctionType::Reverse => string::reverse(args),
        FunctionType::Split => string::split(args),
        FunctionType::StartsWith => string::starts_with(args),
        FunctionType::EndsWith => string::ends_with(args),
        FunctionType::Contains => string::contains(args),
        FunctionType::IndexOf => string::index_of(args),
        FunctionType::LastIndexOf => string::last_index_of(args),
        FunctionType::NthIndexOf => string::nth_index_of(args),
        FunctionType::StrCount => string::str_count(args),
        FunctionType::StrCmp => string::str_cmp(args),
        FunctionType::RegExMatch => string::regex_match(args),
        FunctionType::RegExVal => string::regex_val(args),

        FunctionType::IsNull => inspect::is_null(args),
        FunctionType::IsDate => inspect::is_date(args),
        FunctionType::IsInteger => inspect::is_integer(args),
        FunctionType::IsGuid => inspect::is_guid(args),
        FunctionType::IsNumeric => inspect::is_numeric(args),
        FunctionType::Coalesce => inspect::coalesce(args),
        FunctionType::IIf => inspect::iif(args),
        FunctionType::Convert => inspect::convert_to(args),
        FunctionType::MaxOf => inspect::max_of(args),
        FunctionType::MinOf => inspect::min_of(args),

        FunctionType::Now => datetime::now(),
        FunctionType::UtcNow => datetime::utc_now(),
        FunctionType::DateAdd => datetime::date_add(args),
        FunctionType::DateDiff => datetime::date_diff(args),
        FunctionType::DatePart => datetime::date_part(args),
    }
}

/// Argument at `index`, NULL when an optional argument was omitted
pub(crate) fn arg(args: &[Value], index: usize) -> &Value {
    args.get(index).unwrap_or(&Value::NULL)
}

fn argument_error(function: FunctionType, index: usize, err: FilterError) -> FilterError {
    match err {
        FilterError::Type(message) => FilterError::type_error(format!(
            "{} function argument {}: {}",
            function,
            index + 1,
            message
        )),
        FilterError::Conversion(message) => FilterError::conversion(format!(
            "{} function argument {}: {}",
            function,
            index + 1,
            message
        )),
        other => other,
    }
}

fn typed_arg(function: FunctionType, args: &[Value], index: usize, target: DataType) -> Result<Value> {
    convert(arg(args, index), target).map_err(|err| argument_error(function, index, err))
}

pub(crate) fn string_arg(function: FunctionType, args: &[Value], index: usize) -> Result<Option<String>> {
    match typed_arg(function, args, index, DataType::String)? {
        Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

pub(crate) fn int32_arg(function: FunctionType, args: &[Value], index: usize) -> Result<Option<i32>> {
    typed_arg(function, args, index, DataType::Int32)?.as_int32()
}

pub(crate) fn boolean_arg(function: FunctionType, args: &[Value], index: usize) -> Result<Option<bool>> {
    typed_arg(function, args, index, DataType::Boolean)?.as_boolean()
}

pub(crate) fn datetime_arg(
    function: FunctionType,
    args: &[Value],
    index: usize,
) -> Result<Option<DateTime<Utc>>> {
    typed_arg(function, args, index, DataType::DateTime)?.as_datetime()
}

/// Optional trailing `ignoreCase` flag, false when omitted or NULL
pub(crate) fn ignore_case_arg(function: FunctionType, args: &[Value], index: usize) -> Result<bool> {
    Ok(boolean_arg(function, args, index)?.unwrap_or(false))
}

/// Require a numeric (or NULL) argument
pub(crate) fn numeric_arg(function: FunctionType, args: &[Value], index: usize) -> Result<Value> {
    let value = arg(args, index);
    let data_type = value.data_type();

    if data_type.is_numeric() || data_type == DataType::Undefined {
        Ok(value.clone())
    } else {
        Err(FilterError::type_error(format!(
            "{} function argument {} must be numeric, got \"{}\"",
            function,
            index + 1,
            data_type
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_checks_arity() {
        let err = call(FunctionType::Len, &[]).unwrap_err();
        assert!(matches!(err, FilterError::FunctionArgumentCount { .. }));
    }

    #[test]
    fn test_string_arguments_are_converted() {
        assert_eq!(
            call(FunctionType::Len, &[Value::Int32(12345)]).unwrap(),
            Value::Int32(5)
        );
        assert_eq!(
            call(
                FunctionType::DatePart,
                &[Value::string("2024-03-15 10:20:30"), Value::string("Month")]
            )
            .unwrap(),
            Value::Int32(3)
        );
    }

    #[test]
    fn test_argument_errors_name_the_function() {
        let err = call(FunctionType::Abs, &[Value::string("x")]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Type error: Abs function argument 1 must be numeric, got \"String\""
        );
    }
}
