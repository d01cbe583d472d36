//! Math functions: `Abs`, `Ceiling`, `Floor`, `Power`, `Round`, `Sqrt`.

use super::numeric_arg;
use crate::error::{FilterError, Result};
use crate::expression::function::FunctionType;
use crate::types::coercion::wider_numeric;
use crate::types::{convert, DataType, Value};
use rust_decimal::RoundingStrategy;

pub fn abs(args: &[Value]) -> Result<Value> {
    let value = numeric_arg(FunctionType::Abs, args, 0)?;

    Ok(match value {
        Value::Int32(i) => Value::Int32(i.wrapping_abs()),
        Value::Int64(i) => Value::Int64(i.wrapping_abs()),
        Value::Decimal(d) => Value::Decimal(d.abs()),
        Value::Double(d) => Value::Double(d.abs()),
        other => other,
    })
}

pub fn ceiling(args: &[Value]) -> Result<Value> {
    let value = numeric_arg(FunctionType::Ceiling, args, 0)?;

    Ok(match value {
        Value::Decimal(d) => Value::Decimal(d.ceil()),
        Value::Double(d) => Value::Double(d.ceil()),
        other => other,
    })
}

pub fn floor(args: &[Value]) -> Result<Value> {
    let value = numeric_arg(FunctionType::Floor, args, 0)?;

    Ok(match value {
        Value::Decimal(d) => Value::Decimal(d.floor()),
        Value::Double(d) => Value::Double(d.floor()),
        other => other,
    })
}

/// Round to the nearest integral value, midpoints away from zero
pub fn round(args: &[Value]) -> Result<Value> {
    let value = numeric_arg(FunctionType::Round, args, 0)?;

    Ok(match value {
        Value::Decimal(d) => {
            Value::Decimal(d.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        }
        Value::Double(d) => Value::Double(d.round()),
        other => other,
    })
}

pub fn sqrt(args: &[Value]) -> Result<Value> {
    let value = numeric_arg(FunctionType::Sqrt, args, 0)?;
    let data_type = value.data_type();

    match convert(&value, DataType::Double)? {
        Value::Double(d) => convert(&Value::Double(d.sqrt()), data_type),
        _ => Ok(Value::Null(data_type)),
    }
}

/// `Power(value, exponent)` in the promoted type of both arguments
pub fn power(args: &[Value]) -> Result<Value> {
    let value = numeric_arg(FunctionType::Power, args, 0)?;
    let exponent = numeric_arg(FunctionType::Power, args, 1)?;

    if value.data_type() == DataType::Undefined || exponent.data_type() == DataType::Undefined {
        return Ok(Value::NULL);
    }

    let data_type = wider_numeric(value.data_type(), exponent.data_type()).ok_or_else(|| {
        FilterError::type_error(format!(
            "Power function cannot combine \"{}\" and \"{}\"",
            value.data_type(),
            exponent.data_type()
        ))
    })?;

    match (
        convert(&value, DataType::Double)?,
        convert(&exponent, DataType::Double)?,
    ) {
        (Value::Double(base), Value::Double(exp)) => {
            convert(&Value::Double(base.powf(exp)), data_type)
        }
        _ => Ok(Value::Null(data_type)),
    }
}
