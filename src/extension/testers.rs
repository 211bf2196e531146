//! Built-in tests, used as `{% if value is number %}`.

use tera::{Error, Result, Value};

use super::args::{is_numeric, loose_eq};
use crate::host::format::value_to_string;

/// `property(name, value=true)`: the render array has `#name` equal to
/// `value`.
pub fn property(value: Option<&Value>, args: &[Value]) -> Result<bool> {
    let name = args
        .first()
        .map(value_to_string)
        .ok_or_else(|| Error::msg("`property` requires a property name"))?;
    let expected = args.get(1).cloned().unwrap_or(Value::Bool(true));

    Ok(match value {
        Some(Value::Object(element)) => element
            .get(&format!("#{}", name))
            .is_some_and(|actual| loose_eq(actual, &expected)),
        _ => false,
    })
}

/// `array`: a list or a map.
pub fn array(value: Option<&Value>, _args: &[Value]) -> Result<bool> {
    Ok(matches!(value, Some(Value::Array(_) | Value::Object(_))))
}

/// `scalar`: a boolean, number or string.
pub fn scalar(value: Option<&Value>, _args: &[Value]) -> Result<bool> {
    Ok(matches!(
        value,
        Some(Value::Bool(_) | Value::Number(_) | Value::String(_))
    ))
}

/// `number`: a number or a numeric string.
pub fn number(value: Option<&Value>, _args: &[Value]) -> Result<bool> {
    Ok(value.is_some_and(is_numeric))
}

/// `string`
pub fn string(value: Option<&Value>, _args: &[Value]) -> Result<bool> {
    Ok(matches!(value, Some(Value::String(_))))
}
