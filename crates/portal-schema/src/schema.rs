//! # Schema Definition, Compilation, and Evaluation
//!
//! [`SchemaDef`] is the declarative form: ordered field specifications,
//! cross-field rules, and an optional score specification — plain data,
//! loadable from configuration. [`Schema::compile`] turns a definition
//! into an evaluator, rejecting internally inconsistent definitions
//! (contradictory bounds, bad regexes, rules over unknown fields) with
//! [`SchemaError`] before the first request is ever validated.
//!
//! Field declaration order is significant: violations are reported in
//! declaration order, not input order, so error output is deterministic
//! for a given schema and input.

use std::collections::HashSet;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use portal_core::Timestamp;

use crate::field::{Constraint, FieldSpec};
use crate::result::{FieldError, InputMap, ValidationResult};
use crate::rule::CrossFieldRule;
use crate::score::ScoreSpec;
use crate::value::{self, Kind};

/// Error in a schema definition, detected at compilation time.
///
/// These are service defects, not client errors: a hosting service
/// should compile its schemas at startup and abort on failure.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// Two fields share a name.
    #[error("schema '{schema}': duplicate field name '{field}'")]
    DuplicateField {
        /// Schema name.
        schema: String,
        /// The repeated field name.
        field: String,
    },

    /// A constraint cannot apply to the field's declared kind.
    #[error("schema '{schema}': constraint '{constraint}' does not apply to {kind} field '{field}'")]
    InapplicableConstraint {
        /// Schema name.
        schema: String,
        /// Field carrying the constraint.
        field: String,
        /// Constraint name.
        constraint: &'static str,
        /// The field's declared kind.
        kind: Kind,
    },

    /// Lower and upper bounds on one field contradict each other.
    #[error("schema '{schema}': contradictory bounds on field '{field}': {detail}")]
    ContradictoryBounds {
        /// Schema name.
        schema: String,
        /// Field carrying the bounds.
        field: String,
        /// Which bounds conflict.
        detail: String,
    },

    /// A pattern constraint is not a valid regular expression.
    #[error("schema '{schema}': invalid pattern on field '{field}': {reason}")]
    InvalidPattern {
        /// Schema name.
        schema: String,
        /// Field carrying the pattern.
        field: String,
        /// Regex compilation failure.
        reason: String,
    },

    /// A field's default value violates the field's own kind or
    /// constraints.
    #[error("schema '{schema}': default for field '{field}' is invalid: {detail}")]
    InvalidDefault {
        /// Schema name.
        schema: String,
        /// Field carrying the default.
        field: String,
        /// Why the default was rejected.
        detail: String,
    },

    /// A cross-field rule names a field the schema does not declare.
    #[error("schema '{schema}': rule '{key}' references unknown field '{field}'")]
    UnknownRuleField {
        /// Schema name.
        schema: String,
        /// Rule key.
        key: String,
        /// The missing field.
        field: String,
    },

    /// A cross-field rule involves a field whose kind it cannot compare.
    #[error("schema '{schema}': rule '{key}' cannot evaluate {kind} field '{field}'")]
    IncomparableRuleField {
        /// Schema name.
        schema: String,
        /// Rule key.
        key: String,
        /// The offending field.
        field: String,
        /// The field's declared kind.
        kind: Kind,
    },

    /// A cross-field rule's synthetic key shadows a declared field.
    #[error("schema '{schema}': rule key '{key}' collides with a field name")]
    RuleKeyConflict {
        /// Schema name.
        schema: String,
        /// The colliding key.
        key: String,
    },

    /// The score specification is inconsistent.
    #[error("schema '{schema}': invalid score specification: {detail}")]
    InvalidScore {
        /// Schema name.
        schema: String,
        /// Why the specification was rejected.
        detail: String,
    },

    /// A nested sub-schema failed to compile.
    #[error("schema '{schema}': nested schema on field '{field}': {source}")]
    Nested {
        /// Schema name.
        schema: String,
        /// Field carrying the sub-schema.
        field: String,
        /// The underlying compilation failure.
        #[source]
        source: Box<SchemaError>,
    },
}

/// Declarative schema definition: ordered fields, cross-field rules,
/// unknown-field policy, and optional completeness scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDef {
    /// Schema name, used in configuration errors and log events.
    pub name: String,
    /// Reject unknown input fields instead of silently dropping them.
    #[serde(default)]
    pub strict: bool,
    /// Ordered field specifications.
    pub fields: Vec<FieldSpec>,
    /// Cross-field rules.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<CrossFieldRule>,
    /// Completeness score specification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<ScoreSpec>,
}

impl SchemaDef {
    /// An empty permissive schema definition.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            strict: false,
            fields: Vec::new(),
            rules: Vec::new(),
            score: None,
        }
    }

    /// Append a field specification.
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Append a cross-field rule.
    pub fn rule(mut self, rule: CrossFieldRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Set the unknown-field policy.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Attach a completeness score specification.
    pub fn score(mut self, score: ScoreSpec) -> Self {
        self.score = Some(score);
        self
    }

    /// Compile into an evaluator. Shorthand for [`Schema::compile`].
    pub fn compile(self) -> Result<Schema, SchemaError> {
        Schema::compile(self)
    }
}

/// A compiled constraint, patterns and sub-schemas ready to evaluate.
#[derive(Debug, Clone)]
enum Check {
    Min(f64),
    Max(f64),
    MinLength(usize),
    MaxLength(usize),
    MaxItems(usize),
    Pattern(Regex),
    AllowedValues(Vec<Value>),
    NotOneOf(Vec<Value>),
    ItemKind(Kind),
    RequiredKeys(Vec<String>),
    Nested(Box<Schema>),
}

/// One field with its compiled checks.
#[derive(Debug, Clone)]
struct CompiledField {
    name: String,
    kind: Kind,
    required: bool,
    default: Option<Value>,
    checks: Vec<Check>,
}

/// A compiled, immutable schema evaluator.
///
/// Compile once at startup and share freely: `Schema` is `Send + Sync`
/// and [`Schema::validate`] is a pure function.
#[derive(Debug, Clone)]
pub struct Schema {
    name: String,
    strict: bool,
    fields: Vec<CompiledField>,
    field_names: HashSet<String>,
    rules: Vec<CrossFieldRule>,
    /// Synthetic keys of this schema's rules and, transitively, of all
    /// nested sub-schemas — used to report nested rule errors verbatim.
    rule_keys: HashSet<String>,
    score: Option<ScoreSpec>,
}

impl Schema {
    /// Compile a definition, rejecting inconsistent configuration.
    ///
    /// # Errors
    ///
    /// Returns the first [`SchemaError`] encountered, in field
    /// declaration order.
    pub fn compile(def: SchemaDef) -> Result<Self, SchemaError> {
        let SchemaDef { name, strict, fields, rules, score } = def;

        let mut field_names = HashSet::new();
        for field in &fields {
            if !field_names.insert(field.name.clone()) {
                return Err(SchemaError::DuplicateField {
                    schema: name.clone(),
                    field: field.name.clone(),
                });
            }
        }

        let mut compiled_fields = Vec::with_capacity(fields.len());
        let mut rule_keys = HashSet::new();
        for field in fields {
            let compiled = compile_field(&name, field)?;
            for check in &compiled.checks {
                if let Check::Nested(sub) = check {
                    rule_keys.extend(sub.rule_keys.iter().cloned());
                }
            }
            compiled_fields.push(compiled);
        }

        let kind_of = |field: &str| -> Option<Kind> {
            compiled_fields.iter().find(|f| f.name == field).map(|f| f.kind)
        };

        for rule in &rules {
            let key = rule.key().to_string();
            if field_names.contains(&key) {
                return Err(SchemaError::RuleKeyConflict { schema: name.clone(), key });
            }
            for involved in rule.fields() {
                let Some(kind) = kind_of(involved) else {
                    return Err(SchemaError::UnknownRuleField {
                        schema: name.clone(),
                        key,
                        field: involved.to_string(),
                    });
                };
                let comparable = match rule {
                    CrossFieldRule::MustPrecede { .. } => {
                        matches!(kind, Kind::Integer | Kind::Float | Kind::Datetime)
                    }
                    CrossFieldRule::TileWithinZoom { .. } => matches!(kind, Kind::Integer),
                };
                if !comparable {
                    return Err(SchemaError::IncomparableRuleField {
                        schema: name.clone(),
                        key,
                        field: involved.to_string(),
                        kind,
                    });
                }
            }
            // MustPrecede must not mix datetime and numeric operands.
            if let CrossFieldRule::MustPrecede { lesser, greater, .. } = rule {
                let l = kind_of(lesser);
                let g = kind_of(greater);
                if (l == Some(Kind::Datetime)) != (g == Some(Kind::Datetime)) {
                    return Err(SchemaError::IncomparableRuleField {
                        schema: name.clone(),
                        key,
                        field: greater.clone(),
                        kind: g.unwrap_or(Kind::Datetime),
                    });
                }
            }
            rule_keys.insert(rule.key().to_string());
        }

        if let Some(spec) = &score {
            if !spec.base.is_finite() || spec.base < 0.0 {
                return Err(SchemaError::InvalidScore {
                    schema: name.clone(),
                    detail: format!("base weight must be finite and non-negative, got {}", spec.base),
                });
            }
            for component in &spec.components {
                if !field_names.contains(&component.field) {
                    return Err(SchemaError::InvalidScore {
                        schema: name.clone(),
                        detail: format!("component references unknown field '{}'", component.field),
                    });
                }
                if !component.weight.is_finite() || component.weight < 0.0 {
                    return Err(SchemaError::InvalidScore {
                        schema: name.clone(),
                        detail: format!(
                            "weight for field '{}' must be finite and non-negative, got {}",
                            component.field, component.weight
                        ),
                    });
                }
            }
            if spec.total_weight() <= 0.0 {
                return Err(SchemaError::InvalidScore {
                    schema: name.clone(),
                    detail: "total weight must be positive".to_string(),
                });
            }
        }

        debug!(schema = %name, fields = compiled_fields.len(), rules = rules.len(), "compiled schema");

        Ok(Self {
            name,
            strict,
            fields: compiled_fields,
            field_names,
            rules,
            rule_keys,
            score,
        })
    }

    /// Schema name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether unknown input fields are rejected.
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Declared field names, in declaration order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Validate an input mapping against this schema.
    ///
    /// Pure function: no I/O, no shared state. Invalid input is an
    /// expected outcome, enumerated in the result's `errors` — this
    /// method never fails.
    pub fn validate(&self, input: &InputMap) -> ValidationResult {
        let mut errors: Vec<FieldError> = Vec::new();
        let mut normalized = InputMap::new();
        let mut failed: HashSet<&str> = HashSet::new();

        for field in &self.fields {
            let name = field.name.as_str();
            // An explicit null is treated the same as an absent field.
            let raw = input.get(name).filter(|v| !v.is_null());
            let Some(raw) = raw else {
                if field.required {
                    errors.push(FieldError::new(name, "field is required"));
                    failed.insert(name);
                } else {
                    normalized.insert(
                        name.to_string(),
                        field.default.clone().unwrap_or(Value::Null),
                    );
                }
                continue;
            };

            let Some(mut coerced) = value::coerce(raw, field.kind) else {
                errors.push(FieldError::new(
                    name,
                    format!("invalid type, expected {}", field.kind),
                ));
                failed.insert(name);
                continue;
            };

            let before = errors.len();
            for check in &field.checks {
                apply_check(check, name, &mut coerced, &mut errors);
            }
            if errors.len() > before {
                failed.insert(name);
            }
            normalized.insert(name.to_string(), coerced);
        }

        for rule in &self.rules {
            self.eval_rule(rule, &normalized, &failed, &mut errors);
        }

        if self.strict {
            // serde_json's map iterates keys in sorted order, keeping
            // unknown-field reporting deterministic.
            for key in input.keys() {
                if !self.field_names.contains(key) {
                    errors.push(FieldError::new(key, "unknown field"));
                }
            }
        }

        if errors.is_empty() {
            let score = self.score.as_ref().map(|s| s.evaluate(&normalized));
            ValidationResult::success(normalized, score)
        } else {
            debug!(schema = %self.name, errors = errors.len(), "rejected input");
            ValidationResult::failure(errors)
        }
    }

    /// Evaluate one cross-field rule, skipping it unless every involved
    /// field is present (non-null) and individually valid.
    fn eval_rule(
        &self,
        rule: &CrossFieldRule,
        normalized: &InputMap,
        failed: &HashSet<&str>,
        errors: &mut Vec<FieldError>,
    ) {
        let ready = rule.fields().iter().all(|name| {
            !failed.contains(name) && normalized.get(*name).is_some_and(|v| !v.is_null())
        });
        if !ready {
            return;
        }

        match rule {
            CrossFieldRule::MustPrecede { lesser, greater, key } => {
                let holds = match (self.kind_of(lesser), self.kind_of(greater)) {
                    (Some(Kind::Datetime), Some(Kind::Datetime)) => {
                        match (datetime_at(normalized, lesser), datetime_at(normalized, greater)) {
                            (Some(l), Some(g)) => l < g,
                            // Canonical datetimes always re-parse; treat
                            // anything else as not evaluable.
                            _ => return,
                        }
                    }
                    _ => {
                        match (number_at(normalized, lesser), number_at(normalized, greater)) {
                            (Some(l), Some(g)) => l < g,
                            _ => return,
                        }
                    }
                };
                if !holds {
                    errors.push(FieldError::new(
                        key.clone(),
                        format!("{lesser} must be less than {greater}"),
                    ));
                }
            }
            CrossFieldRule::TileWithinZoom { x, y, zoom, key } => {
                let (Some(x_val), Some(y_val), Some(z_val)) = (
                    integer_at(normalized, x),
                    integer_at(normalized, y),
                    integer_at(normalized, zoom),
                ) else {
                    return;
                };
                if !(0..=62).contains(&z_val) {
                    // Out-of-range zoom is a per-field bound's problem.
                    return;
                }
                let extent = 1i64 << z_val;
                if !(0..extent).contains(&x_val) || !(0..extent).contains(&y_val) {
                    errors.push(FieldError::new(
                        key.clone(),
                        format!("{x} and {y} must be less than {extent} at zoom {z_val}"),
                    ));
                }
            }
        }
    }

    fn kind_of(&self, field: &str) -> Option<Kind> {
        self.fields.iter().find(|f| f.name == field).map(|f| f.kind)
    }
}

impl TryFrom<SchemaDef> for Schema {
    type Error = SchemaError;

    fn try_from(def: SchemaDef) -> Result<Self, Self::Error> {
        Schema::compile(def)
    }
}

/// Compile one field: check constraint applicability and bound
/// consistency, compile patterns and sub-schemas, vet the default.
fn compile_field(schema: &str, spec: FieldSpec) -> Result<CompiledField, SchemaError> {
    let FieldSpec { name, kind, required, default, constraints } = spec;

    for constraint in &constraints {
        if !constraint.applies_to(kind) {
            return Err(SchemaError::InapplicableConstraint {
                schema: schema.to_string(),
                field: name.clone(),
                constraint: constraint.name(),
                kind,
            });
        }
    }

    check_bounds(schema, &name, &constraints)?;

    let mut checks = Vec::with_capacity(constraints.len());
    for constraint in constraints {
        let check = match constraint {
            Constraint::Min(v) => Check::Min(v),
            Constraint::Max(v) => Check::Max(v),
            Constraint::MinLength(v) => Check::MinLength(v),
            Constraint::MaxLength(v) => Check::MaxLength(v),
            Constraint::MaxItems(v) => Check::MaxItems(v),
            Constraint::Pattern(source) => {
                // Full-match semantics: the whole string must match, so
                // the expression is wrapped in anchors. Patterns that
                // carry their own anchors are unaffected.
                let regex = Regex::new(&format!("^(?:{source})$")).map_err(|e| {
                    SchemaError::InvalidPattern {
                        schema: schema.to_string(),
                        field: name.clone(),
                        reason: e.to_string(),
                    }
                })?;
                Check::Pattern(regex)
            }
            Constraint::AllowedValues(values) => Check::AllowedValues(values),
            Constraint::NotOneOf(values) => Check::NotOneOf(values),
            Constraint::ItemKind(item_kind) => Check::ItemKind(item_kind),
            Constraint::RequiredKeys(keys) => Check::RequiredKeys(keys),
            Constraint::Nested(sub_def) => {
                let sub = Schema::compile(sub_def).map_err(|e| SchemaError::Nested {
                    schema: schema.to_string(),
                    field: name.clone(),
                    source: Box::new(e),
                })?;
                Check::Nested(Box::new(sub))
            }
        };
        checks.push(check);
    }

    // The default must satisfy the field's own kind and constraints; a
    // default the schema itself would reject is a configuration error.
    if let Some(default_value) = &default {
        if !default_value.is_null() {
            let Some(mut coerced) = value::coerce(default_value, kind) else {
                return Err(SchemaError::InvalidDefault {
                    schema: schema.to_string(),
                    field: name,
                    detail: format!("invalid type, expected {kind}"),
                });
            };
            let mut default_errors = Vec::new();
            for check in &checks {
                apply_check(check, &name, &mut coerced, &mut default_errors);
            }
            if let Some(first) = default_errors.first() {
                return Err(SchemaError::InvalidDefault {
                    schema: schema.to_string(),
                    field: name,
                    detail: first.message.clone(),
                });
            }
        }
    }

    Ok(CompiledField { name, kind, required, default, checks })
}

/// Reject contradictory bound pairs on one field.
fn check_bounds(schema: &str, field: &str, constraints: &[Constraint]) -> Result<(), SchemaError> {
    let mut min: Option<f64> = None;
    let mut max: Option<f64> = None;
    let mut min_len: Option<usize> = None;
    let mut max_len: Option<usize> = None;

    for constraint in constraints {
        match constraint {
            Constraint::Min(v) => min = Some(min.map_or(*v, |m: f64| m.max(*v))),
            Constraint::Max(v) => max = Some(max.map_or(*v, |m: f64| m.min(*v))),
            Constraint::MinLength(v) => min_len = Some(min_len.map_or(*v, |m| m.max(*v))),
            Constraint::MaxLength(v) | Constraint::MaxItems(v) => {
                max_len = Some(max_len.map_or(*v, |m| m.min(*v)))
            }
            _ => {}
        }
    }

    if let (Some(lo), Some(hi)) = (min, max) {
        if lo > hi {
            return Err(SchemaError::ContradictoryBounds {
                schema: schema.to_string(),
                field: field.to_string(),
                detail: format!("min {lo} > max {hi}"),
            });
        }
    }
    if let (Some(lo), Some(hi)) = (min_len, max_len) {
        if lo > hi {
            return Err(SchemaError::ContradictoryBounds {
                schema: schema.to_string(),
                field: field.to_string(),
                detail: format!("min length {lo} > max length {hi}"),
            });
        }
    }
    Ok(())
}

/// Evaluate one compiled check against a coerced value, appending at
/// most one error. `ItemKind` and `Nested` also rewrite the value with
/// its normalized form.
fn apply_check(check: &Check, field: &str, coerced: &mut Value, errors: &mut Vec<FieldError>) {
    match check {
        Check::Min(min) => {
            if value::as_f64(coerced).is_some_and(|v| v < *min) {
                errors.push(FieldError::new(field, format!("must be at least {min}")));
            }
        }
        Check::Max(max) => {
            if value::as_f64(coerced).is_some_and(|v| v > *max) {
                errors.push(FieldError::new(field, format!("must be at most {max}")));
            }
        }
        Check::MinLength(n) => {
            if length_of(coerced).is_some_and(|len| len < *n) {
                errors.push(FieldError::new(field, format!("length must be at least {n}")));
            }
        }
        Check::MaxLength(n) => {
            if length_of(coerced).is_some_and(|len| len > *n) {
                errors.push(FieldError::new(field, format!("length must be at most {n}")));
            }
        }
        Check::MaxItems(n) => {
            if coerced.as_array().is_some_and(|items| items.len() > *n) {
                errors.push(FieldError::new(field, format!("must have at most {n} items")));
            }
        }
        Check::Pattern(regex) => {
            if coerced.as_str().is_some_and(|s| !regex.is_match(s)) {
                errors.push(FieldError::new(field, "does not match required pattern"));
            }
        }
        Check::AllowedValues(allowed) => {
            if !allowed.iter().any(|candidate| values_equal(coerced, candidate)) {
                errors.push(FieldError::new(
                    field,
                    format!("must be one of {}", render_values(allowed)),
                ));
            }
        }
        Check::NotOneOf(excluded) => {
            if excluded.iter().any(|candidate| values_equal(coerced, candidate)) {
                errors.push(FieldError::new(
                    field,
                    format!("must not be one of {}", render_values(excluded)),
                ));
            }
        }
        Check::ItemKind(kind) => {
            if let Some(items) = coerced.as_array() {
                let coerced_items: Option<Vec<Value>> =
                    items.iter().map(|item| value::coerce(item, *kind)).collect();
                match coerced_items {
                    Some(items) => *coerced = Value::Array(items),
                    None => errors.push(FieldError::new(
                        field,
                        format!("items must be of type {kind}"),
                    )),
                }
            }
        }
        Check::RequiredKeys(keys) => {
            if let Some(entries) = coerced.as_object() {
                let missing: Vec<&String> =
                    keys.iter().filter(|k| !entries.contains_key(*k)).collect();
                if !missing.is_empty() {
                    errors.push(FieldError::new(
                        field,
                        format!(
                            "must include keys [{}]",
                            missing
                                .iter()
                                .map(|k| format!("\"{k}\""))
                                .collect::<Vec<_>>()
                                .join(", ")
                        ),
                    ));
                }
            }
        }
        Check::Nested(sub) => {
            if let Some(entries) = coerced.as_object() {
                let mut result = sub.validate(entries);
                if let Some(normalized) = result.normalized.take() {
                    *coerced = Value::Object(normalized);
                } else {
                    for error in result.errors {
                        // Rule errors keep their synthetic key; field
                        // errors are reported under a dotted path.
                        if sub.rule_keys.contains(&error.field) {
                            errors.push(error);
                        } else {
                            errors.push(FieldError::new(
                                format!("{field}.{}", error.field),
                                error.message,
                            ));
                        }
                    }
                }
            }
        }
    }
}

/// Length of a coerced string (characters), list (items), or mapping
/// (entries).
fn length_of(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(items) => Some(items.len()),
        Value::Object(entries) => Some(entries.len()),
        _ => None,
    }
}

/// Equality with numeric tolerance: integers and floats carrying the
/// same value compare equal, so `AllowedValues([10])` accepts `10.0`.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

/// Render a value set for membership error messages.
fn render_values(values: &[Value]) -> String {
    let rendered: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    format!("[{}]", rendered.join(", "))
}

fn number_at(map: &InputMap, field: &str) -> Option<f64> {
    map.get(field).and_then(value::as_f64)
}

fn integer_at(map: &InputMap, field: &str) -> Option<i64> {
    map.get(field).and_then(Value::as_i64)
}

fn datetime_at(map: &InputMap, field: &str) -> Option<Timestamp> {
    map.get(field)
        .and_then(Value::as_str)
        .and_then(|s| Timestamp::parse(s).ok())
}
