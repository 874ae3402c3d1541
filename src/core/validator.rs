//! IG-003: Parameter validation and typed coercion.
//!
//! The validator is the mandatory gate between the model and the renderer:
//! a `ParameterSet` exists only once every required key is present and
//! non-empty and every declared value has its declared primitive type.
//!
//! "Empty" means JSON `null`, `""`, `false`, numeric zero, `[]` or `{}`.
//!
//! Values land inside quoted HCL strings unescaped, so a coerced value may
//! not contain a quote, a backslash, a line break or a `${`/`%{` sequence.

use super::types::{json_scalar_to_string, ParamType, ParameterSet, RawParameters, ResourceKind};
use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

/// Validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing or empty key: {0}")]
    MissingKey(String),

    #[error("key '{key}' expected {expected}, found {found}")]
    TypeMismatch {
        key: String,
        expected: ParamType,
        found: String,
    },

    #[error("key '{key}' contains {reason}, which is not allowed inside a Terraform string")]
    UnsafeValue { key: String, reason: &'static str },
}

/// True when the value counts as empty.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().map(|f| f == 0.0).unwrap_or(false),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Check that every required key is present with a non-empty value.
/// Returns the first offending key.
pub fn check_required<S: AsRef<str>>(
    params: &RawParameters,
    required: &[S],
) -> Result<(), ValidationError> {
    for key in required {
        let key = key.as_ref();
        match params.get(key) {
            Some(v) if !is_empty_value(v) => {}
            _ => return Err(ValidationError::MissingKey(key.to_string())),
        }
    }
    Ok(())
}

/// Boolean gate: logs the first missing or empty key.
pub fn validate_variables<S: AsRef<str>>(params: &RawParameters, required: &[S]) -> bool {
    match check_required(params, required) {
        Ok(()) => true,
        Err(e) => {
            warn!("{}", e);
            false
        }
    }
}

/// Validate raw parameters against a kind and coerce them to strings.
///
/// Undeclared scalar keys pass through (templates may reference them);
/// undeclared arrays and objects are dropped.
pub fn coerce(params: &RawParameters, kind: &ResourceKind) -> Result<ParameterSet, ValidationError> {
    let required = kind.required_keys();
    if let Err(e) = check_required(params, &required) {
        warn!(kind = %kind.name, "{}", e);
        return Err(e);
    }

    let mut values = IndexMap::new();
    for (key, value) in params {
        match kind.param_type(key) {
            Some(expected) => {
                let coerced = coerce_value(key, value, expected)?;
                check_hcl_safe(key, &coerced)?;
                values.insert(key.clone(), coerced);
            }
            None => match json_scalar_to_string(value) {
                Some(s) => {
                    check_hcl_safe(key, &s)?;
                    values.insert(key.clone(), s);
                }
                None => warn!(key = %key, "dropping undeclared non-scalar parameter"),
            },
        }
    }

    Ok(ParameterSet::from_validated(values))
}

fn coerce_value(key: &str, value: &Value, expected: ParamType) -> Result<String, ValidationError> {
    let mismatch = || ValidationError::TypeMismatch {
        key: key.to_string(),
        expected,
        found: json_type_name(value).to_string(),
    };

    match (expected, value) {
        (ParamType::String, Value::String(s)) => Ok(s.clone()),
        (ParamType::String, Value::Number(n)) => Ok(n.to_string()),
        (ParamType::String, Value::Bool(b)) => Ok(b.to_string()),

        (ParamType::Integer, Value::Number(n)) => n
            .as_i64()
            .map(|i| i.to_string())
            .ok_or_else(mismatch),
        (ParamType::Integer, Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(|i| i.to_string())
            .map_err(|_| mismatch()),

        (ParamType::Number, Value::Number(n)) => Ok(n.to_string()),
        (ParamType::Number, Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(|_| s.trim().to_string())
            .map_err(|_| mismatch()),

        (ParamType::Boolean, Value::Bool(b)) => Ok(b.to_string()),
        (ParamType::Boolean, Value::String(s)) => match s.trim().to_lowercase().as_str() {
            "true" => Ok("true".to_string()),
            "false" => Ok("false".to_string()),
            _ => Err(mismatch()),
        },

        _ => Err(mismatch()),
    }
}

/// Reject text that would end or interpolate inside a quoted HCL string.
fn check_hcl_safe(key: &str, value: &str) -> Result<(), ValidationError> {
    let reason = if value.contains('"') {
        "a double quote"
    } else if value.contains('\\') {
        "a backslash"
    } else if value.contains(['\n', '\r']) {
        "a line break"
    } else if value.contains("${") || value.contains("%{") {
        "a template sequence"
    } else {
        return Ok(());
    };
    Err(ValidationError::UnsafeValue {
        key: key.to_string(),
        reason,
    })
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
