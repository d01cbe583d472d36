//! Literal token text to values.

use crate::error::{FilterError, Result};
use crate::types::coercion::parse_guid;
use crate::types::datetime::parse_datetime;
use crate::types::Value;
use rust_decimal::Decimal;
use std::str::FromStr;

fn sign(text: &str, negative: bool) -> String {
    if negative {
        format!("-{}", text)
    } else {
        text.to_string()
    }
}

/// Integer literal: Int32 if in range, else Int64, else Decimal, else Double
pub fn parse_integer(text: &str, negative: bool) -> Result<Value> {
    let text = sign(text, negative);

    if let Ok(i) = text.parse::<i32>() {
        return Ok(Value::Int32(i));
    }
    if let Ok(i) = text.parse::<i64>() {
        return Ok(Value::Int64(i));
    }
    if let Ok(d) = Decimal::from_str(&text) {
        return Ok(Value::Decimal(d));
    }

    text.parse::<f64>()
        .map(Value::Double)
        .map_err(|_| FilterError::syntax(format!("invalid integer literal \"{}\"", text)))
}

/// `0x` hex literal: Int32 if the magnitude fits, else Int64
pub fn parse_hex(digits: &str, negative: bool) -> Result<Value> {
    let magnitude = u64::from_str_radix(digits, 16)
        .map_err(|_| FilterError::syntax(format!("invalid hex literal \"0x{}\"", digits)))?;

    let value = i64::try_from(magnitude)
        .map_err(|_| FilterError::syntax(format!("hex literal \"0x{}\" is out of range", digits)))?;
    let value = if negative { -value } else { value };

    Ok(match i32::try_from(value) {
        Ok(i) => Value::Int32(i),
        Err(_) => Value::Int64(value),
    })
}

/// Real literal: Double with an exponent, otherwise Decimal, then Double, then String
pub fn parse_real(text: &str, negative: bool) -> Value {
    let text = sign(text, negative);

    if text.contains(['e', 'E']) {
        if let Ok(d) = text.parse::<f64>() {
            return Value::Double(d);
        }
    }
    if let Ok(d) = Decimal::from_str(&text) {
        return Value::Decimal(d);
    }
    if let Ok(d) = text.parse::<f64>() {
        return Value::Double(d);
    }

    Value::String(text)
}

pub fn parse_datetime_literal(text: &str) -> Result<Value> {
    parse_datetime(text)
        .map(Value::DateTime)
        .ok_or_else(|| FilterError::syntax(format!("invalid date/time literal \"#{}#\"", text)))
}

pub fn parse_guid_literal(text: &str) -> Result<Value> {
    parse_guid(text)
        .map(Value::Guid)
        .ok_or_else(|| FilterError::syntax(format!("invalid GUID literal \"{}\"", text)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DataType;

    #[test]
    fn test_integer_widening() {
        assert_eq!(parse_integer("42", false).unwrap(), Value::Int32(42));
        assert_eq!(
            parse_integer("2147483648", true).unwrap(),
            Value::Int32(i32::MIN)
        );
        assert_eq!(
            parse_integer("2147483648", false).unwrap(),
            Value::Int64(2147483648)
        );
        assert_eq!(
            parse_integer("9223372036854775808", false).unwrap().data_type(),
            DataType::Decimal
        );
        assert_eq!(
            parse_integer("99999999999999999999999999999999", false)
                .unwrap()
                .data_type(),
            DataType::Double
        );
    }

    #[test]
    fn test_hex() {
        assert_eq!(parse_hex("1F", false).unwrap(), Value::Int32(31));
        assert_eq!(parse_hex("FFFFFFFF", false).unwrap(), Value::Int64(0xFFFF_FFFF));
        assert_eq!(parse_hex("10", true).unwrap(), Value::Int32(-16));
        assert!(parse_hex("FFFFFFFFFFFFFFFF", false).is_err());
    }

    #[test]
    fn test_real() {
        assert_eq!(parse_real("1e3", false), Value::Double(1000.0));
        assert_eq!(
            parse_real("1.25", true),
            Value::Decimal(Decimal::from_str("-1.25").unwrap())
        );
    }

    #[test]
    fn test_datetime_and_guid() {
        assert_eq!(
            parse_datetime_literal("2024-01-02").unwrap().data_type(),
            DataType::DateTime
        );
        assert!(parse_datetime_literal("not a date").is_err());
        assert!(parse_guid_literal("{0f9c3a4b-1111-2222-3333-444455556666}").is_ok());
        assert!(parse_guid_literal("0f9c3a4b").is_err());
    }
}
