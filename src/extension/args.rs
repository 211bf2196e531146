//! Argument coercion shared by filters, functions and tests.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tera::{Error, Result, Value};

use crate::host::format::value_to_string;

/// Template truthiness: null, false, zero, `""`, `"0"` and empty
/// collections are false.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !(s.is_empty() || s == "0"),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Whether a value is a number or a string holding one.
pub fn is_numeric(value: &Value) -> bool {
    match value {
        Value::Number(_) => true,
        Value::String(s) => {
            let trimmed = s.trim_start();
            !trimmed.is_empty() && trimmed.parse::<f64>().is_ok()
        }
        _ => false,
    }
}

/// Equality that treats scalars with the same printed form as equal.
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    if a == b {
        return true;
    }
    match (a, b) {
        (Value::Bool(x), other) | (other, Value::Bool(x)) => is_truthy(other) == *x,
        (Value::Number(_) | Value::String(_), Value::Number(_) | Value::String(_)) => {
            match (as_f64(a), as_f64(b)) {
                (Some(x), Some(y)) => x == y,
                _ => value_to_string(a) == value_to_string(b),
            }
        }
        _ => false,
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Optional string argument.
pub fn opt_str(args: &HashMap<String, Value>, name: &str) -> Option<String> {
    match args.get(name) {
        None | Some(Value::Null) => None,
        Some(value) => Some(value_to_string(value)),
    }
}

/// Required string argument.
pub fn req_str(args: &HashMap<String, Value>, name: &str, callee: &str) -> Result<String> {
    opt_str(args, name)
        .ok_or_else(|| Error::msg(format!("`{}` requires a `{}` argument", callee, name)))
}

/// Boolean argument; accepts booleans, numbers and `"true"`/`"false"`.
pub fn bool_arg(args: &HashMap<String, Value>, name: &str, default: bool) -> bool {
    match args.get(name) {
        None | Some(Value::Null) => default,
        Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => true,
        Some(Value::String(s)) if s.eq_ignore_ascii_case("false") => false,
        Some(value) => is_truthy(value),
    }
}

/// Non-negative integer argument.
pub fn usize_arg(
    args: &HashMap<String, Value>,
    name: &str,
    default: usize,
    callee: &str,
) -> Result<usize> {
    match args.get(name) {
        None | Some(Value::Null) => Ok(default),
        Some(value) => as_f64(value)
            .filter(|f| *f >= 0.0)
            .map(|f| f as usize)
            .ok_or_else(|| {
                Error::msg(format!(
                    "`{}` expects `{}` to be a non-negative number, got {}",
                    callee, name, value
                ))
            }),
    }
}

/// Convert a unix timestamp or a date string to seconds since the epoch.
///
/// Accepted strings: digits only, RFC 3339, RFC 2822, `YYYY-MM-DD HH:MM:SS`,
/// `YYYY-MM-DDTHH:MM:SS` and `YYYY-MM-DD` (all UTC when no offset is given).
pub fn to_timestamp(value: &Value) -> Result<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .ok_or_else(|| Error::msg(format!("Invalid timestamp {}", n))),
        Value::String(s) => parse_date(s.trim())
            .ok_or_else(|| Error::msg(format!("Could not parse date \"{}\"", s))),
        other => Err(Error::msg(format!("Expected a date, got {}", other))),
    }
}

fn parse_date(text: &str) -> Option<i64> {
    if !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()) {
        return text.parse().ok();
    }
    if let Ok(date) = DateTime::parse_from_rfc3339(text) {
        return Some(date.timestamp());
    }
    if let Ok(date) = DateTime::parse_from_rfc2822(text) {
        return Some(date.timestamp());
    }
    for pattern in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(date) = NaiveDateTime::parse_from_str(text, pattern) {
            return Some(date.and_utc().timestamp());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|d| d.and_utc().timestamp())
}
