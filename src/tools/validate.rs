//! Argument validation against a tool descriptor.

use serde_json::{Map, Value};

use super::catalog::{ParamKind, ParamSpec, RangePolicy, ToolDescriptor};
use crate::error::ValidationError;

/// Check `args` against `tool` and return the normalized argument map.
///
/// The result holds only declared parameters, with defaults and fallbacks
/// applied and empty optional strings dropped. Extra arguments are ignored.
pub fn validate(
    tool: &ToolDescriptor,
    args: &Map<String, Value>,
) -> Result<Map<String, Value>, ValidationError> {
    let mut normalized = Map::new();
    for spec in tool.params {
        let raw = args.get(spec.name).filter(|v| !v.is_null());
        if let Some(value) = check_param(spec, raw)? {
            normalized.insert(spec.name.to_string(), value);
        }
    }
    Ok(normalized)
}

fn check_param(spec: &ParamSpec, raw: Option<&Value>) -> Result<Option<Value>, ValidationError> {
    match spec.kind {
        ParamKind::String => check_string(spec, raw),
        ParamKind::Integer { min, max, policy } => {
            check_integer(spec.name, raw, min, max, policy, spec.required).map(|n| n.map(Value::from))
        }
        ParamKind::Boolean { default } => match raw {
            None if spec.required => Err(missing(spec.name)),
            None => Ok(Some(Value::Bool(default))),
            Some(Value::Bool(b)) => Ok(Some(Value::Bool(*b))),
            Some(_) => Err(ValidationError::new(spec.name, "must be a boolean")),
        },
        ParamKind::Enum { values, default } => match raw {
            None if spec.required => Err(missing(spec.name)),
            None => Ok(Some(Value::from(default))),
            Some(Value::String(s)) if values.contains(&s.as_str()) => Ok(Some(Value::from(s.as_str()))),
            Some(_) => Err(ValidationError::new(
                spec.name,
                format!("must be one of: {}", values.join(", ")),
            )),
        },
    }
}

fn check_string(spec: &ParamSpec, raw: Option<&Value>) -> Result<Option<Value>, ValidationError> {
    match raw {
        None if spec.required => Err(missing(spec.name)),
        None => Ok(None),
        Some(Value::String(s)) => {
            if !s.trim().is_empty() {
                Ok(Some(Value::from(s.as_str())))
            } else if spec.required {
                Err(ValidationError::new(spec.name, "must be a non-empty string"))
            } else {
                Ok(None)
            }
        }
        Some(_) => Err(ValidationError::new(spec.name, "must be a string")),
    }
}

/// Validate an integer argument.
///
/// With `RangePolicy::Fallback`, absent, mistyped and out-of-range values all
/// resolve to the fallback instead of failing.
pub fn check_integer(
    field: &str,
    raw: Option<&Value>,
    min: i64,
    max: i64,
    policy: RangePolicy,
    required: bool,
) -> Result<Option<i64>, ValidationError> {
    let parsed = raw.map(|v| v.as_i64().ok_or(()));
    match (parsed, policy) {
        (Some(Ok(n)), _) if (min..=max).contains(&n) => Ok(Some(n)),
        (_, RangePolicy::Fallback(fallback)) => Ok(Some(fallback)),
        (None, RangePolicy::Reject) if required => Err(missing(field)),
        (None, RangePolicy::Reject) => Ok(None),
        (Some(Err(())), RangePolicy::Reject) => Err(ValidationError::new(
            field,
            format!("must be an integer between {} and {}", min, max),
        )),
        (Some(Ok(_)), RangePolicy::Reject) => Err(ValidationError::new(
            field,
            format!("must be between {} and {}", min, max),
        )),
    }
}

fn missing(field: &str) -> ValidationError {
    ValidationError::new(field, "is required")
}
