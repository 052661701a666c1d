//! # Validation Results
//!
//! The structured outcome of evaluating one input mapping against one
//! schema. Invalid input is data, not an error condition: the result
//! always comes back `Ok`-shaped, with violations enumerated in
//! [`ValidationResult::errors`].
//!
//! ## Invariants
//!
//! - `valid` is true iff `errors` is empty.
//! - `normalized` is `Some` iff `valid`.
//! - `score` is `Some` only on valid results of schemas that declare a
//!   score specification.

use serde::Serialize;
use serde_json::Value;

/// Raw request record: string-keyed mapping to untyped values.
pub type InputMap = serde_json::Map<String, Value>;

/// One field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// The field (or synthetic cross-field key, or dotted nested path)
    /// the failure is reported against.
    pub field: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl FieldError {
    /// Create a field error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Outcome of validating one input mapping against one schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    /// True iff no errors were recorded.
    pub valid: bool,
    /// Violations in schema declaration order (cross-field and
    /// unknown-field errors follow the per-field errors).
    pub errors: Vec<FieldError>,
    /// The coerced, defaulted record; present only when valid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalized: Option<InputMap>,
    /// Completeness score; present only on valid results of scoring
    /// schemas.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl ValidationResult {
    /// A successful result carrying the normalized record.
    pub(crate) fn success(normalized: InputMap, score: Option<f64>) -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            normalized: Some(normalized),
            score,
        }
    }

    /// A failed result carrying the recorded violations.
    pub(crate) fn failure(errors: Vec<FieldError>) -> Self {
        debug_assert!(!errors.is_empty());
        Self {
            valid: false,
            errors,
            normalized: None,
            score: None,
        }
    }

    /// True iff no errors were recorded.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Errors recorded against one field or synthetic key.
    pub fn errors_for(&self, field: &str) -> Vec<&FieldError> {
        self.errors.iter().filter(|e| e.field == field).collect()
    }
}
