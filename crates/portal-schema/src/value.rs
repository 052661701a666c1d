//! # Value Kinds and Coercion
//!
//! The kind enumeration for schema fields and the explicit, fallible
//! conversion from raw JSON values to kind-conformant normalized values.
//!
//! Coercion is deliberately narrow. Request bodies arrive as untyped
//! JSON, so a few lenient conversions are accepted where the intent is
//! unambiguous (numeric strings, integral floats, `"true"`/`"false"`);
//! everything else is a type error to be aggregated with the field's
//! other errors, not a fault to raise.

use portal_core::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The type a schema field expects its value to carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    /// Whole number.
    Integer,
    /// Floating-point number.
    Float,
    /// UTF-8 string.
    String,
    /// Boolean flag.
    Boolean,
    /// Ordered sequence.
    List,
    /// String-keyed mapping.
    Mapping,
    /// Timestamp string, normalized to naive-UTC `YYYY-MM-DDTHH:MM:SS`.
    Datetime,
}

impl Kind {
    /// Lowercase label used in error messages.
    pub fn label(&self) -> &'static str {
        match self {
            Kind::Integer => "integer",
            Kind::Float => "float",
            Kind::String => "string",
            Kind::Boolean => "boolean",
            Kind::List => "list",
            Kind::Mapping => "mapping",
            Kind::Datetime => "datetime",
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Interpret a raw value as `kind`, returning the normalized value.
///
/// Returns `None` when the raw value cannot be interpreted; the caller
/// turns that into a field-level type error.
///
/// Accepted conversions beyond exact JSON type matches:
/// - integer: floats with zero fraction, strings parsing as integers.
/// - float: any number, strings parsing as floats.
/// - boolean: the strings `"true"` and `"false"`.
/// - datetime: strings in any form [`Timestamp::parse`] accepts,
///   normalized to the canonical rendering.
pub(crate) fn coerce(raw: &Value, kind: Kind) -> Option<Value> {
    match kind {
        Kind::Integer => coerce_integer(raw),
        Kind::Float => coerce_float(raw),
        Kind::String => raw.as_str().map(|s| Value::String(s.to_string())),
        Kind::Boolean => coerce_boolean(raw),
        Kind::List => raw.is_array().then(|| raw.clone()),
        Kind::Mapping => raw.is_object().then(|| raw.clone()),
        Kind::Datetime => coerce_datetime(raw),
    }
}

fn coerce_integer(raw: &Value) -> Option<Value> {
    match raw {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(Value::from(i));
            }
            // Accept floats that carry an exact integral value.
            let f = n.as_f64()?;
            if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
                return Some(Value::from(f as i64));
            }
            None
        }
        Value::String(s) => s.trim().parse::<i64>().ok().map(Value::from),
        _ => None,
    }
}

fn coerce_float(raw: &Value) -> Option<Value> {
    match raw {
        Value::Number(n) => n.as_f64().and_then(|f| serde_json::Number::from_f64(f)).map(Value::Number),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number),
        _ => None,
    }
}

fn coerce_boolean(raw: &Value) -> Option<Value> {
    match raw {
        Value::Bool(b) => Some(Value::Bool(*b)),
        Value::String(s) => match s.as_str() {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        _ => None,
    }
}

fn coerce_datetime(raw: &Value) -> Option<Value> {
    let s = raw.as_str()?;
    Timestamp::parse(s).ok().map(|ts| Value::String(ts.to_iso8601()))
}

/// Numeric view of a coerced value, for bound and ordering checks.
pub(crate) fn as_f64(value: &Value) -> Option<f64> {
    value.as_f64()
}
