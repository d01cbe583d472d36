//! String functions.
//!
//! Positions are character offsets, 0-based. Functions taking a trailing
//! `ignoreCase` flag compare ordinally unless it is true.

use super::{ignore_case_arg, int32_arg, string_arg};
use crate::error::{FilterError, Result};
use crate::expression::function::FunctionType;
use crate::types::coercion::compare_strings;
use crate::types::{DataType, Value};
use regex::{NoExpand, Regex, RegexBuilder};
use std::cmp::Ordering;

fn null_string() -> Value {
    Value::Null(DataType::String)
}

fn fold(text: &str, ignore_case: bool) -> String {
    if ignore_case {
        text.to_uppercase()
    } else {
        text.to_string()
    }
}

fn char_offset(text: &str, byte_index: usize) -> i32 {
    text[..byte_index].chars().count() as i32
}

fn literal_regex(test: &str, ignore_case: bool) -> Result<Regex> {
    RegexBuilder::new(&regex::escape(test))
        .case_insensitive(ignore_case)
        .build()
        .map_err(|err| FilterError::evaluation(err.to_string()))
}

fn compile(function: FunctionType, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|err| {
        FilterError::evaluation(format!("{} function pattern is invalid: {}", function, err))
    })
}

fn map_string(function: FunctionType, args: &[Value], f: impl FnOnce(&str) -> String) -> Result<Value> {
    Ok(match string_arg(function, args, 0)? {
        Some(s) => Value::String(f(&s)),
        None => null_string(),
    })
}

pub fn len(args: &[Value]) -> Result<Value> {
    Ok(match string_arg(FunctionType::Len, args, 0)? {
        Some(s) => Value::Int32(s.chars().count() as i32),
        None => Value::Null(DataType::Int32),
    })
}

pub fn lower(args: &[Value]) -> Result<Value> {
    map_string(FunctionType::Lower, args, str::to_lowercase)
}

pub fn upper(args: &[Value]) -> Result<Value> {
    map_string(FunctionType::Upper, args, str::to_uppercase)
}

pub fn trim(args: &[Value]) -> Result<Value> {
    map_string(FunctionType::Trim, args, |s| s.trim().to_string())
}

pub fn trim_left(args: &[Value]) -> Result<Value> {
    map_string(FunctionType::TrimLeft, args, |s| s.trim_start().to_string())
}

pub fn trim_right(args: &[Value]) -> Result<Value> {
    map_string(FunctionType::TrimRight, args, |s| s.trim_end().to_string())
}

pub fn reverse(args: &[Value]) -> Result<Value> {
    map_string(FunctionType::Reverse, args, |s| s.chars().rev().collect())
}

/// `SubStr(s, index, [length])`, index and length clamped to the string
pub fn substr(args: &[Value]) -> Result<Value> {
    let function = FunctionType::SubStr;
    let (Some(s), Some(index)) = (string_arg(function, args, 0)?, int32_arg(function, args, 1)?) else {
        return Ok(null_string());
    };

    let chars: Vec<char> = s.chars().collect();
    let start = (index.max(0) as usize).min(chars.len());
    let end = match int32_arg(function, args, 2)? {
        Some(length) => start + (length.max(0) as usize).min(chars.len() - start),
        None => chars.len(),
    };

    Ok(Value::String(chars[start..end].iter().collect()))
}

/// `Replace(s, test, replacement, [ignoreCase])`
pub fn replace(args: &[Value]) -> Result<Value> {
    let function = FunctionType::Replace;
    let (Some(s), Some(test), Some(replacement)) = (
        string_arg(function, args, 0)?,
        string_arg(function, args, 1)?,
        string_arg(function, args, 2)?,
    ) else {
        return Ok(null_string());
    };

    if test.is_empty() {
        return Ok(Value::String(s));
    }

    let ignore_case = ignore_case_arg(function, args, 3)?;
    if !ignore_case {
        return Ok(Value::String(s.replace(&test, &replacement)));
    }

    let regex = literal_regex(&test, true)?;
    Ok(Value::String(
        regex.replace_all(&s, NoExpand(&replacement)).into_owned(),
    ))
}

/// `Split(s, delimiter, index, [ignoreCase])`, NULL when index is out of range
pub fn split(args: &[Value]) -> Result<Value> {
    let function = FunctionType::Split;
    let (Some(s), Some(delimiter), Some(index)) = (
        string_arg(function, args, 0)?,
        string_arg(function, args, 1)?,
        int32_arg(function, args, 2)?,
    ) else {
        return Ok(null_string());
    };

    if index < 0 {
        return Ok(null_string());
    }

    let parts: Vec<&str> = if delimiter.is_empty() {
        vec![s.as_str()]
    } else if ignore_case_arg(function, args, 3)? {
        literal_regex(&delimiter, true)?.split(&s).collect()
    } else {
        s.split(delimiter.as_str()).collect()
    };

    Ok(parts
        .get(index as usize)
        .map(|part| Value::string(*part))
        .unwrap_or_else(null_string))
}

fn string_test(
    function: FunctionType,
    args: &[Value],
    test: impl FnOnce(&str, &str) -> bool,
) -> Result<Value> {
    let (Some(s), Some(t)) = (string_arg(function, args, 0)?, string_arg(function, args, 1)?) else {
        return Ok(Value::Null(DataType::Boolean));
    };

    let ignore_case = ignore_case_arg(function, args, 2)?;
    Ok(Value::Boolean(test(
        &fold(&s, ignore_case),
        &fold(&t, ignore_case),
    )))
}

pub fn starts_with(args: &[Value]) -> Result<Value> {
    string_test(FunctionType::StartsWith, args, |s, t| s.starts_with(t))
}

pub fn ends_with(args: &[Value]) -> Result<Value> {
    string_test(FunctionType::EndsWith, args, |s, t| s.ends_with(t))
}

pub fn contains(args: &[Value]) -> Result<Value> {
    string_test(FunctionType::Contains, args, |s, t| s.contains(t))
}

/// Byte offsets where `test` matches in `s`, non-overlapping
fn match_starts(s: &str, test: &str, ignore_case: bool) -> Result<Vec<usize>> {
    if !ignore_case {
        return Ok(s.match_indices(test).map(|(index, _)| index).collect());
    }

    let regex = literal_regex(test, true)?;
    Ok(regex.find_iter(s).map(|m| m.start()).collect())
}

/// Byte offset of the last match of `test` in `s`, overlapping matches included
fn last_match_start(s: &str, test: &str, ignore_case: bool) -> Result<Option<usize>> {
    if !ignore_case {
        return Ok(s.rfind(test));
    }

    let regex = literal_regex(test, true)?;
    let mut last = None;
    let mut at = 0;
    while let Some(m) = regex.find_at(s, at) {
        last = Some(m.start());
        match s[m.start()..].chars().next() {
            Some(c) => at = m.start() + c.len_utf8(),
            None => break,
        }
    }
    Ok(last)
}

/// Character offset of a match, searched in the original text so that case
/// folding cannot shift it
fn string_position(
    function: FunctionType,
    args: &[Value],
    ignore_case_index: usize,
    position: impl FnOnce(&str, &str, bool) -> Result<Option<usize>>,
) -> Result<Value> {
    let (Some(s), Some(t)) = (string_arg(function, args, 0)?, string_arg(function, args, 1)?) else {
        return Ok(Value::Null(DataType::Int32));
    };

    let ignore_case = ignore_case_arg(function, args, ignore_case_index)?;
    Ok(Value::Int32(
        position(&s, &t, ignore_case)?.map_or(-1, |byte_index| char_offset(&s, byte_index)),
    ))
}

pub fn index_of(args: &[Value]) -> Result<Value> {
    string_position(FunctionType::IndexOf, args, 2, |s, t, ignore_case| {
        Ok(match_starts(s, t, ignore_case)?.first().copied())
    })
}

pub fn last_index_of(args: &[Value]) -> Result<Value> {
    string_position(FunctionType::LastIndexOf, args, 2, last_match_start)
}

/// `NthIndexOf(s, test, n, [ignoreCase])`, `n` counts occurrences from 1
pub fn nth_index_of(args: &[Value]) -> Result<Value> {
    let Some(n) = int32_arg(FunctionType::NthIndexOf, args, 2)? else {
        return Ok(Value::Null(DataType::Int32));
    };

    string_position(FunctionType::NthIndexOf, args, 3, |s, t, ignore_case| {
        if n < 1 || t.is_empty() {
            return Ok(None);
        }
        Ok(match_starts(s, t, ignore_case)?.get((n - 1) as usize).copied())
    })
}

/// `StrCount(s, test, [ignoreCase])`, non-overlapping occurrences
pub fn str_count(args: &[Value]) -> Result<Value> {
    let function = FunctionType::StrCount;
    let (Some(s), Some(t)) = (string_arg(function, args, 0)?, string_arg(function, args, 1)?) else {
        return Ok(Value::Null(DataType::Int32));
    };

    if t.is_empty() {
        return Ok(Value::Int32(0));
    }

    let ignore_case = ignore_case_arg(function, args, 2)?;
    let count = fold(&s, ignore_case).matches(&fold(&t, ignore_case)).count();
    Ok(Value::Int32(count as i32))
}

/// `StrCmp(a, b, [ignoreCase])` yielding -1, 0 or 1
pub fn str_cmp(args: &[Value]) -> Result<Value> {
    let function = FunctionType::StrCmp;
    let (Some(a), Some(b)) = (string_arg(function, args, 0)?, string_arg(function, args, 1)?) else {
        return Ok(Value::Null(DataType::Int32));
    };

    let ignore_case = ignore_case_arg(function, args, 2)?;
    Ok(Value::Int32(match compare_strings(&a, &b, !ignore_case) {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    }))
}

/// `RegExMatch(pattern, s)`
pub fn regex_match(args: &[Value]) -> Result<Value> {
    let function = FunctionType::RegExMatch;
    let (Some(pattern), Some(s)) = (string_arg(function, args, 0)?, string_arg(function, args, 1)?) else {
        return Ok(Value::Null(DataType::Boolean));
    };

    Ok(Value::Boolean(compile(function, &pattern)?.is_match(&s)))
}

/// `RegExVal(pattern, s)`, first match or NULL
pub fn regex_val(args: &[Value]) -> Result<Value> {
    let function = FunctionType::RegExVal;
    let (Some(pattern), Some(s)) = (string_arg(function, args, 0)?, string_arg(function, args, 1)?) else {
        return Ok(null_string());
    };

    Ok(compile(function, &pattern)?
        .find(&s)
        .map(|m| Value::string(m.as_str()))
        .unwrap_or_else(null_string))
}
