//! Keyword arguments supplied by callers to tool constructors and `apply`.

use super::{CapabilityError, CapabilityResult};
use serde_json::Value;
use std::collections::BTreeMap;

/// Named arguments passed to a tool factory and to `apply`.
pub type ToolArguments = BTreeMap<String, Value>;

fn lookup<'a>(arguments: &'a ToolArguments, name: &str) -> CapabilityResult<&'a Value> {
    arguments
        .get(name)
        .ok_or_else(|| CapabilityError::MissingArgument(name.to_owned()))
}

fn invalid(name: &str, expected: &str, value: &Value) -> CapabilityError {
    CapabilityError::InvalidArgument {
        name: name.to_owned(),
        reason: format!("expected {expected}, got {value}"),
    }
}

/// Reads a string argument.
///
/// # Errors
///
/// Returns [`CapabilityError::MissingArgument`] when absent and
/// [`CapabilityError::InvalidArgument`] when the value is not a string.
pub fn text_argument<'a>(arguments: &'a ToolArguments, name: &str) -> CapabilityResult<&'a str> {
    let value = lookup(arguments, name)?;
    value.as_str().ok_or_else(|| invalid(name, "a string", value))
}

/// Reads a numeric argument as `f64`.
///
/// # Errors
///
/// Returns [`CapabilityError::MissingArgument`] when absent and
/// [`CapabilityError::InvalidArgument`] when the value is not a number.
pub fn number_argument(arguments: &ToolArguments, name: &str) -> CapabilityResult<f64> {
    let value = lookup(arguments, name)?;
    value.as_f64().ok_or_else(|| invalid(name, "a number", value))
}

/// Reads a boolean argument.
///
/// # Errors
///
/// Returns [`CapabilityError::MissingArgument`] when absent and
/// [`CapabilityError::InvalidArgument`] when the value is not a boolean.
pub fn bool_argument(arguments: &ToolArguments, name: &str) -> CapabilityResult<bool> {
    let value = lookup(arguments, name)?;
    value.as_bool().ok_or_else(|| invalid(name, "a boolean", value))
}
