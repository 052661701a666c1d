//! # User Profile Schema
//!
//! Validates user profile records and grades their completeness. The
//! score starts from a base earned by validating at all, adds weight
//! for populated optional fields (tags, metadata), and tops up for two
//! quality signals: a username of six or more characters and an email
//! under a mainstream top-level domain. A minimal valid profile scores
//! 0.4; a fully populated one scores 1.0.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use portal_schema::{
    Constraint, FieldSpec, InputMap, Kind, Schema, SchemaDef, ScoreComponent, ScoreRule, ScoreSpec,
};

use crate::{parse_record, ModelError};

/// Username shape: letters, digits, underscore, hyphen.
pub const USERNAME_PATTERN: &str = "^[a-zA-Z0-9_-]+$";

/// Pragmatic email shape check; full RFC 5322 is not the goal.
pub const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

/// Email suffixes that earn the address-quality score bonus.
pub const TRUSTED_EMAIL_SUFFIXES: [&str; 3] = [".com", ".org", ".edu"];

/// Definition of the user profile schema.
pub fn schema_def() -> SchemaDef {
    SchemaDef::new("user_profile")
        .field(FieldSpec::required("user_id", Kind::Integer).constraint(Constraint::Min(1.0)))
        .field(
            FieldSpec::required("username", Kind::String)
                .constraint(Constraint::MinLength(3))
                .constraint(Constraint::MaxLength(50))
                .constraint(Constraint::Pattern(USERNAME_PATTERN.to_string())),
        )
        .field(
            FieldSpec::required("email", Kind::String)
                .constraint(Constraint::Pattern(EMAIL_PATTERN.to_string())),
        )
        .field(
            FieldSpec::required("age", Kind::Integer)
                .constraint(Constraint::Min(13.0))
                .constraint(Constraint::Max(120.0)),
        )
        .field(FieldSpec::optional("is_active", Kind::Boolean).with_default(json!(true)))
        .field(
            FieldSpec::optional("tags", Kind::List)
                .constraint(Constraint::MaxItems(10))
                .constraint(Constraint::ItemKind(Kind::String)),
        )
        .field(FieldSpec::optional("metadata", Kind::Mapping))
        .score(ScoreSpec {
            base: 0.4,
            components: vec![
                ScoreComponent {
                    field: "tags".into(),
                    weight: 0.2,
                    rule: ScoreRule::PresentNonEmpty,
                },
                ScoreComponent {
                    field: "metadata".into(),
                    weight: 0.2,
                    rule: ScoreRule::PresentNonEmpty,
                },
                ScoreComponent {
                    field: "username".into(),
                    weight: 0.1,
                    rule: ScoreRule::MinLength(6),
                },
                ScoreComponent {
                    field: "email".into(),
                    weight: 0.1,
                    rule: ScoreRule::SuffixAny(
                        TRUSTED_EMAIL_SUFFIXES.iter().map(|s| s.to_string()).collect(),
                    ),
                },
            ],
        })
}

/// The compiled user profile schema, built on first use.
pub fn schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        schema_def()
            .compile()
            .expect("built-in user profile schema must compile")
    })
}

/// A validated user profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Unique user identifier, positive.
    pub user_id: u64,
    /// Account name, 3 to 50 characters of [`USERNAME_PATTERN`].
    pub username: String,
    /// Contact address.
    pub email: String,
    /// Age in years, 13 to 120.
    pub age: u8,
    /// Whether the account is active; defaults to `true`.
    pub is_active: bool,
    /// Optional labels, at most 10.
    pub tags: Option<Vec<String>>,
    /// Optional free-form attributes.
    pub metadata: Option<Map<String, Value>>,
}

impl UserProfile {
    /// Validate an input mapping and decode the typed profile.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::Invalid` with the field-level errors when
    /// the input does not satisfy the schema.
    pub fn parse(input: &InputMap) -> Result<Self, ModelError> {
        parse_record(schema(), input)
    }
}
