//! JSON <-> formula Value conversion utilities

use crate::Value;

use super::CliError;

/// Convert serde_json::Value to a formula Value
///
/// `name` is only used to report which binding held an object.
pub fn json_to_value(name: &str, v: serde_json::Value) -> Result<Value, CliError> {
    Ok(match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            // u64 beyond i64 range still has an f64 form
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(arr) => Value::Array(
            arr.into_iter()
                .map(|item| json_to_value(name, item))
                .collect::<Result<_, _>>()?,
        ),
        serde_json::Value::Object(_) => return Err(CliError::UnsupportedValue(name.to_string())),
    })
}

/// Convert a formula Value to serde_json::Value
pub fn value_to_json(v: Value) -> serde_json::Value {
    match v {
        Value::Null => serde_json::Value::Null,
        Value::Boolean(b) => serde_json::Value::Bool(b),
        Value::Integer(i) => serde_json::Value::Number(i.into()),
        Value::Float(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s),
        Value::DateTime(dt) => serde_json::Value::String(dt.to_string()),
        Value::Array(arr) => serde_json::Value::Array(arr.into_iter().map(value_to_json).collect()),
        Value::Expression(expr) => serde_json::Value::String(expr.to_string()),
    }
}
