//! # Field Specifications
//!
//! One field's type, required-ness, default, and constraints — plain
//! serializable data. Constraint applicability (a `Pattern` only makes
//! sense on a string field) is checked once at schema compilation, not
//! here.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::SchemaDef;
use crate::value::Kind;

/// A single constraint on a field's coerced value.
///
/// Each variant produces at most one error per evaluation; constraints
/// on the same field are evaluated independently, so one bad value can
/// report several violations at once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", content = "arg", rename_all = "snake_case")]
pub enum Constraint {
    /// Inclusive numeric lower bound.
    Min(f64),
    /// Inclusive numeric upper bound.
    Max(f64),
    /// Inclusive lower bound on string characters, list items, or
    /// mapping entries.
    MinLength(usize),
    /// Inclusive upper bound on string characters, list items, or
    /// mapping entries.
    MaxLength(usize),
    /// Upper bound on list items.
    MaxItems(usize),
    /// Regular expression the whole string must match (full-match
    /// semantics, not substring search).
    Pattern(String),
    /// The value must be a member of this set.
    AllowedValues(Vec<Value>),
    /// The value must not be a member of this set.
    NotOneOf(Vec<Value>),
    /// Every list element must coerce to this kind.
    ItemKind(Kind),
    /// The mapping must contain every one of these keys.
    RequiredKeys(Vec<String>),
    /// The mapping must validate against this sub-schema. Field errors
    /// from the sub-schema are reported with dotted paths
    /// (`location.latitude`); cross-field rule errors keep their
    /// declared synthetic key verbatim.
    Nested(SchemaDef),
}

impl Constraint {
    /// Short name used in schema configuration errors.
    pub fn name(&self) -> &'static str {
        match self {
            Constraint::Min(_) => "min",
            Constraint::Max(_) => "max",
            Constraint::MinLength(_) => "min_length",
            Constraint::MaxLength(_) => "max_length",
            Constraint::MaxItems(_) => "max_items",
            Constraint::Pattern(_) => "pattern",
            Constraint::AllowedValues(_) => "allowed_values",
            Constraint::NotOneOf(_) => "not_one_of",
            Constraint::ItemKind(_) => "item_kind",
            Constraint::RequiredKeys(_) => "required_keys",
            Constraint::Nested(_) => "nested",
        }
    }

    /// Whether this constraint can apply to a field of the given kind.
    pub(crate) fn applies_to(&self, kind: Kind) -> bool {
        match self {
            Constraint::Min(_) | Constraint::Max(_) => {
                matches!(kind, Kind::Integer | Kind::Float)
            }
            Constraint::MinLength(_) | Constraint::MaxLength(_) => {
                matches!(kind, Kind::String | Kind::List | Kind::Mapping)
            }
            Constraint::MaxItems(_) | Constraint::ItemKind(_) => matches!(kind, Kind::List),
            Constraint::Pattern(_) => matches!(kind, Kind::String),
            Constraint::AllowedValues(_) | Constraint::NotOneOf(_) => matches!(
                kind,
                Kind::Integer | Kind::Float | Kind::String | Kind::Boolean
            ),
            Constraint::RequiredKeys(_) | Constraint::Nested(_) => matches!(kind, Kind::Mapping),
        }
    }
}

/// Specification of one field in a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name, unique within its schema.
    pub name: String,
    /// Expected value kind.
    pub kind: Kind,
    /// Whether the field must be present in the input.
    pub required: bool,
    /// Value substituted when an optional field is absent. Checked
    /// against the field's own kind and constraints at compile time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Constraints on the coerced value.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<Constraint>,
}

impl FieldSpec {
    /// A required field with no constraints.
    pub fn required(name: impl Into<String>, kind: Kind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
            default: None,
            constraints: Vec::new(),
        }
    }

    /// An optional field with no default and no constraints.
    pub fn optional(name: impl Into<String>, kind: Kind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            default: None,
            constraints: Vec::new(),
        }
    }

    /// Set the default substituted when the field is absent.
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Append a constraint.
    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }
}
