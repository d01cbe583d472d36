//! Date/time functions: `Now`, `UtcNow`, `DateAdd`, `DateDiff`, `DatePart`.

use super::{datetime_arg, int32_arg, string_arg};
use crate::error::{FilterError, Result};
use crate::expression::function::FunctionType;
use crate::types::{DataType, Value};
use chrono::{DateTime, Datelike, Duration, Local, Months, Timelike, Utc};

/// Date/time component named by an interval argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interval {
    Year,
    Month,
    DayOfYear,
    Day,
    Week,
    WeekDay,
    Hour,
    Minute,
    Second,
    Millisecond,
}

impl Interval {
    pub fn parse(name: &str) -> Option<Interval> {
        let interval = match name.trim().to_ascii_lowercase().as_str() {
            "year" => Interval::Year,
            "month" => Interval::Month,
            "dayofyear" => Interval::DayOfYear,
            "day" => Interval::Day,
            "week" => Interval::Week,
            "weekday" => Interval::WeekDay,
            "hour" => Interval::Hour,
            "minute" => Interval::Minute,
            "second" => Interval::Second,
            "millisecond" => Interval::Millisecond,
            _ => return None,
        };
        Some(interval)
    }
}

fn interval_arg(function: FunctionType, args: &[Value], index: usize) -> Result<Option<Interval>> {
    let Some(name) = string_arg(function, args, index)? else {
        return Ok(None);
    };

    Interval::parse(&name).map(Some).ok_or_else(|| {
        FilterError::evaluation(format!(
            "{} function interval \"{}\" is not recognized",
            function, name
        ))
    })
}

fn overflow(function: FunctionType) -> FilterError {
    FilterError::evaluation(format!("{} function result is out of range", function))
}

/// Local wall-clock time, stored without offset
pub fn now() -> Result<Value> {
    Ok(Value::DateTime(Local::now().naive_local().and_utc()))
}

pub fn utc_now() -> Result<Value> {
    Ok(Value::DateTime(Utc::now()))
}

fn add_months(value: DateTime<Utc>, months: i64) -> Option<DateTime<Utc>> {
    let magnitude = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        value.checked_add_months(magnitude)
    } else {
        value.checked_sub_months(magnitude)
    }
}

/// `DateAdd(dt, amount, interval)`
pub fn date_add(args: &[Value]) -> Result<Value> {
    let function = FunctionType::DateAdd;
    let (Some(value), Some(amount), Some(interval)) = (
        datetime_arg(function, args, 0)?,
        int32_arg(function, args, 1)?,
        interval_arg(function, args, 2)?,
    ) else {
        return Ok(Value::Null(DataType::DateTime));
    };

    let amount = i64::from(amount);
    let result = match interval {
        Interval::Year => add_months(value, amount * 12),
        Interval::Month => add_months(value, amount),
        Interval::DayOfYear | Interval::Day | Interval::WeekDay => {
            value.checked_add_signed(Duration::days(amount))
        }
        Interval::Week => value.checked_add_signed(Duration::weeks(amount)),
        Interval::Hour => value.checked_add_signed(Duration::hours(amount)),
        Interval::Minute => value.checked_add_signed(Duration::minutes(amount)),
        Interval::Second => value.checked_add_signed(Duration::seconds(amount)),
        Interval::Millisecond => value.checked_add_signed(Duration::milliseconds(amount)),
    };

    result
        .map(Value::DateTime)
        .ok_or_else(|| overflow(function))
}

/// `DateDiff(dt1, dt2, interval)`, the count of intervals from `dt1` to `dt2`
///
/// `WeekDay` counts days, same as `Day`.
pub fn date_diff(args: &[Value]) -> Result<Value> {
    let function = FunctionType::DateDiff;
    let (Some(start), Some(end), Some(interval)) = (
        datetime_arg(function, args, 0)?,
        datetime_arg(function, args, 1)?,
        interval_arg(function, args, 2)?,
    ) else {
        return Ok(Value::Null(DataType::Int32));
    };

    let elapsed = end.signed_duration_since(start);
    let difference = match interval {
        Interval::Year => i64::from(end.year() - start.year()),
        Interval::Month => {
            i64::from(end.year() - start.year()) * 12 + i64::from(end.month()) - i64::from(start.month())
        }
        Interval::DayOfYear | Interval::Day | Interval::WeekDay => elapsed.num_days(),
        Interval::Week => elapsed.num_weeks(),
        Interval::Hour => elapsed.num_hours(),
        Interval::Minute => elapsed.num_minutes(),
        Interval::Second => elapsed.num_seconds(),
        Interval::Millisecond => elapsed.num_milliseconds(),
    };

    i32::try_from(difference)
        .map(Value::Int32)
        .map_err(|_| overflow(function))
}

/// `DatePart(dt, interval)`
pub fn date_part(args: &[Value]) -> Result<Value> {
    let function = FunctionType::DatePart;
    let (Some(value), Some(interval)) = (
        datetime_arg(function, args, 0)?,
        interval_arg(function, args, 1)?,
    ) else {
        return Ok(Value::Null(DataType::Int32));
    };

    let part = match interval {
        Interval::Year => value.year(),
        Interval::Month => value.month() as i32,
        Interval::DayOfYear => value.ordinal() as i32,
        Interval::Day => value.day() as i32,
        Interval::Week => value.iso_week().week() as i32,
        Interval::WeekDay => value.weekday().num_days_from_sunday() as i32,
        Interval::Hour => value.hour() as i32,
        Interval::Minute => value.minute() as i32,
        Interval::Second => value.second() as i32,
        Interval::Millisecond => value.timestamp_subsec_millis() as i32,
    };

    Ok(Value::Int32(part))
}
