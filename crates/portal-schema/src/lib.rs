//! # portal-schema — Declarative Request Validation
//!
//! A schema-driven validator for string-keyed request records. A schema
//! is an ordered list of field specifications plus cross-field rules,
//! defined as plain data; evaluating an input mapping against it yields
//! either a normalized record or a structured list of field-level
//! errors — never an exception.
//!
//! ## Pipeline
//!
//! 1. **Presence** — required fields missing from the input are
//!    reported; optional fields receive their default (or null).
//! 2. **Coercion** — raw values are converted to the field's declared
//!    kind; failure short-circuits that field's constraint checks.
//! 3. **Constraints** — bounds, lengths, patterns, membership, item
//!    kinds, required keys, nested sub-schemas; each violated
//!    constraint reports independently.
//! 4. **Cross-field rules** — ordering and grid checks spanning several
//!    fields, evaluated only once every involved field passed on its
//!    own; violations are keyed by a synthetic name such as `bbox`.
//! 5. **Unknown fields** — silently dropped, or reported when the
//!    schema is strict.
//!
//! ## Two Error Channels
//!
//! Invalid *input* is an expected outcome and lands in
//! [`ValidationResult::errors`]. An invalid *schema* (contradictory
//! bounds, bad regex, duplicate names) is a service defect and fails
//! fast at [`Schema::compile`] time with [`SchemaError`] — it never
//! surfaces per request.
//!
//! ## Purity
//!
//! `Schema::validate` is a pure function over its inputs: no I/O, no
//! shared state, no interior mutability. A compiled `Schema` is
//! `Send + Sync` and safe to share across request handlers for the
//! lifetime of the process.

pub mod field;
pub mod result;
pub mod rule;
pub mod schema;
pub mod score;
pub mod value;

// Re-export primary types for ergonomic imports.
pub use field::{Constraint, FieldSpec};
pub use result::{FieldError, InputMap, ValidationResult};
pub use rule::CrossFieldRule;
pub use schema::{Schema, SchemaDef, SchemaError};
pub use score::{ScoreComponent, ScoreRule, ScoreSpec};
pub use value::Kind;
