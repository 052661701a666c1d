//! Property tests for the schema evaluator: the result invariants hold
//! for arbitrary inputs, evaluation is idempotent, and the completeness
//! score is monotone in optional-field presence.

use proptest::prelude::*;
use serde_json::{json, Value};

use portal_schema::{
    Constraint, CrossFieldRule, FieldSpec, InputMap, Kind, Schema, SchemaDef, ScoreComponent,
    ScoreRule, ScoreSpec,
};

/// A profile-shaped schema exercising every evaluation stage: presence,
/// coercion, constraints, a cross-field rule, and scoring.
fn profile_schema() -> Schema {
    SchemaDef::new("profile")
        .field(FieldSpec::required("user_id", Kind::Integer).constraint(Constraint::Min(1.0)))
        .field(
            FieldSpec::required("username", Kind::String)
                .constraint(Constraint::MinLength(3))
                .constraint(Constraint::MaxLength(50))
                .constraint(Constraint::Pattern("^[a-zA-Z0-9_-]+$".to_string())),
        )
        .field(
            FieldSpec::required("age", Kind::Integer)
                .constraint(Constraint::Min(13.0))
                .constraint(Constraint::Max(120.0)),
        )
        .field(FieldSpec::optional("min_score", Kind::Float))
        .field(FieldSpec::optional("max_score", Kind::Float))
        .field(
            FieldSpec::optional("tags", Kind::List)
                .constraint(Constraint::MaxItems(10))
                .constraint(Constraint::ItemKind(Kind::String)),
        )
        .field(FieldSpec::optional("metadata", Kind::Mapping))
        .rule(CrossFieldRule::MustPrecede {
            lesser: "min_score".into(),
            greater: "max_score".into(),
            key: "score_range".into(),
        })
        .score(ScoreSpec {
            base: 0.6,
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
            ],
        })
        .compile()
        .expect("profile schema is well-formed")
}

/// Arbitrary scalar-ish JSON values, including the wrong-typed ones the
/// evaluator must reject without panicking.
fn arb_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        (-1.0e6f64..1.0e6).prop_map(|f| json!(f)),
        "[a-zA-Z0-9_ -]{0,12}".prop_map(Value::String),
        prop::collection::vec("[a-z]{0,6}".prop_map(Value::String), 0..12)
            .prop_map(Value::Array),
        prop::collection::btree_map("[a-z]{1,6}", any::<i32>().prop_map(|n| json!(n)), 0..4)
            .prop_map(|m| Value::Object(m.into_iter().collect())),
    ]
}

/// Arbitrary input mappings over a mix of declared and undeclared keys.
fn arb_input() -> impl Strategy<Value = InputMap> {
    let keys = prop::sample::subsequence(
        vec![
            "user_id", "username", "age", "min_score", "max_score", "tags", "metadata",
            "unexpected", "zz_extra",
        ],
        0..=9,
    );
    (keys, prop::collection::vec(arb_value(), 9)).prop_map(|(keys, values)| {
        keys.into_iter()
            .zip(values)
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    })
}

proptest! {
    /// The core result invariants hold for any input whatsoever.
    #[test]
    fn result_invariants(input in arb_input()) {
        let schema = profile_schema();
        let result = schema.validate(&input);
        prop_assert_eq!(result.valid, result.errors.is_empty());
        prop_assert_eq!(result.valid, result.normalized.is_some());
        if !result.valid {
            prop_assert!(result.score.is_none());
        }
    }

    /// Evaluating twice yields structurally identical results.
    #[test]
    fn evaluation_is_idempotent(input in arb_input()) {
        let schema = profile_schema();
        let first = schema.validate(&input);
        let second = schema.validate(&input);
        prop_assert_eq!(first, second);
    }

    /// Unknown fields never produce errors under a permissive schema and
    /// never leak into the normalized record.
    #[test]
    fn unknown_fields_ignored(input in arb_input()) {
        let schema = profile_schema();
        let result = schema.validate(&input);
        for error in &result.errors {
            prop_assert_ne!(&error.field, "unexpected");
            prop_assert_ne!(&error.field, "zz_extra");
        }
        if let Some(normalized) = &result.normalized {
            prop_assert!(!normalized.contains_key("unexpected"));
            prop_assert!(!normalized.contains_key("zz_extra"));
            // Successful normalization carries exactly the declared keys.
            prop_assert_eq!(normalized.len(), schema.field_names().len());
        }
    }

    /// Adding a non-empty tags list to a valid payload never lowers the
    /// completeness score.
    #[test]
    fn score_monotone_in_tags(
        user_id in 1i64..1_000_000,
        age in 13i64..=120,
        tags in prop::collection::vec("[a-z]{1,8}".prop_map(Value::String), 1..10),
    ) {
        let schema = profile_schema();
        let mut base: InputMap = InputMap::new();
        base.insert("user_id".into(), json!(user_id));
        base.insert("username".into(), json!("john_doe"));
        base.insert("age".into(), json!(age));

        let without = schema.validate(&base);
        prop_assert!(without.valid);

        let mut with = base.clone();
        with.insert("tags".into(), Value::Array(tags));
        let result = schema.validate(&with);
        prop_assert!(result.valid);

        prop_assert!(result.score.unwrap() >= without.score.unwrap());
    }
}

#[test]
fn minimal_valid_payload_scores_baseline() {
    let schema = profile_schema();
    let mut input = InputMap::new();
    input.insert("user_id".into(), json!(7));
    input.insert("username".into(), json!("abc"));
    input.insert("age".into(), json!(30));
    let result = schema.validate(&input);
    assert!(result.valid);
    // base / (base + optional weights) = 0.6 / 1.0
    assert!((result.score.unwrap() - 0.6).abs() < 1e-12);
}
