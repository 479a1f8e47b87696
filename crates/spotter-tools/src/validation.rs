//! Argument extraction helpers shared by all handlers.
//!
//! Every message here is user-safe guidance; no internal detail.

use serde_json::Value;

use crate::errors::ToolError;

/// A required string argument.
pub fn require_str<'a>(args: &'a Value, key: &str) -> Result<&'a str, ToolError> {
    match args.get(key).and_then(Value::as_str) {
        Some(s) if !s.trim().is_empty() => Ok(s.trim()),
        Some(_) => Err(ToolError::invalid_args(format!(
            "Parameter '{key}' must not be empty"
        ))),
        None => Err(ToolError::invalid_args(format!(
            "Missing required parameter: {key}"
        ))),
    }
}

/// A required non-negative integer argument.
pub fn require_u64(args: &Value, key: &str) -> Result<u64, ToolError> {
    args.get(key).and_then(Value::as_u64).ok_or_else(|| {
        ToolError::invalid_args(format!("Missing or invalid parameter: {key}"))
    })
}

/// A required finite number argument.
pub fn require_f64(args: &Value, key: &str) -> Result<f64, ToolError> {
    match args.get(key).and_then(Value::as_f64) {
        Some(n) if n.is_finite() => Ok(n),
        _ => Err(ToolError::invalid_args(format!(
            "Missing or invalid parameter: {key}"
        ))),
    }
}

/// An optional non-negative integer argument.
#[must_use]
pub fn optional_u64(args: &Value, key: &str) -> Option<u64> {
    args.get(key).and_then(Value::as_u64)
}

/// An optional finite number argument.
#[must_use]
pub fn optional_f64(args: &Value, key: &str) -> Option<f64> {
    args.get(key).and_then(Value::as_f64).filter(|n| n.is_finite())
}
