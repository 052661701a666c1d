//! # Completeness Scoring
//!
//! A declarative completeness/quality score over a validated record,
//! used by the user-profile schema variant. Required fields earn the
//! base weight by validating at all; each component adds its weight
//! when its rule holds over the normalized record. The result is
//! normalized so the maximum achievable score is exactly 1.0.
//!
//! The one hard contract is monotonicity: populating a previously
//! absent optional field never lowers the score. This holds because
//! weights are non-negative and every rule is monotone in the presence
//! of its field.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::result::InputMap;

/// Scoring rule for one component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", content = "arg", rename_all = "snake_case")]
pub enum ScoreRule {
    /// Field is present, non-null, and non-empty (strings, lists, and
    /// mappings must have at least one character/item/entry).
    PresentNonEmpty,
    /// Field is a string of at least this many characters.
    MinLength(usize),
    /// Field is a string ending with one of these suffixes.
    SuffixAny(Vec<String>),
}

/// One weighted component of a completeness score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    /// Field of the normalized record the rule inspects.
    pub field: String,
    /// Weight earned when the rule holds. Non-negative.
    pub weight: f64,
    /// The rule itself.
    pub rule: ScoreRule,
}

/// Declarative completeness score for one schema variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSpec {
    /// Weight earned by any record that validates at all.
    pub base: f64,
    /// Optional-field and quality components.
    pub components: Vec<ScoreComponent>,
}

impl ScoreSpec {
    /// Maximum raw (un-normalized) weight: base plus all components.
    pub(crate) fn total_weight(&self) -> f64 {
        self.base + self.components.iter().map(|c| c.weight).sum::<f64>()
    }

    /// Score a normalized record, in `[0, 1]`.
    pub(crate) fn evaluate(&self, normalized: &InputMap) -> f64 {
        let mut earned = self.base;
        for component in &self.components {
            let value = normalized.get(&component.field);
            if component.rule.holds(value) {
                earned += component.weight;
            }
        }
        earned / self.total_weight()
    }
}

impl ScoreRule {
    fn holds(&self, value: Option<&Value>) -> bool {
        let Some(value) = value else { return false };
        match self {
            ScoreRule::PresentNonEmpty => match value {
                Value::Null => false,
                Value::String(s) => !s.is_empty(),
                Value::Array(items) => !items.is_empty(),
                Value::Object(entries) => !entries.is_empty(),
                _ => true,
            },
            ScoreRule::MinLength(n) => value
                .as_str()
                .is_some_and(|s| s.chars().count() >= *n),
            ScoreRule::SuffixAny(suffixes) => value
                .as_str()
                .is_some_and(|s| suffixes.iter().any(|suffix| s.ends_with(suffix))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spec() -> ScoreSpec {
        ScoreSpec {
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
                    rule: ScoreRule::SuffixAny(vec![".com".into(), ".org".into()]),
                },
            ],
        }
    }

    fn record(entries: Value) -> InputMap {
        entries.as_object().unwrap().clone()
    }

    #[test]
    fn test_minimal_record_earns_base_only() {
        let score = spec().evaluate(&record(json!({
            "username": "abc",
            "email": "a@b.dev",
            "tags": null,
            "metadata": null,
        })));
        assert!((score - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_full_record_scores_one() {
        let score = spec().evaluate(&record(json!({
            "username": "john_doe",
            "email": "john@example.com",
            "tags": ["dev"],
            "metadata": {"location": "NYC"},
        })));
        assert!((score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_collections_earn_nothing() {
        let score = spec().evaluate(&record(json!({
            "username": "abc",
            "email": "a@b.dev",
            "tags": [],
            "metadata": {},
        })));
        assert!((score - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_each_component_adds_its_weight() {
        let base = spec().evaluate(&record(json!({"username": "abc", "email": "a@b.dev"})));
        let with_tags = spec().evaluate(&record(json!({
            "username": "abc",
            "email": "a@b.dev",
            "tags": ["x"],
        })));
        assert!((with_tags - base - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_quality_rules() {
        let spec = spec();
        let long_name = spec.evaluate(&record(json!({
            "username": "abcdef",
            "email": "a@b.dev",
        })));
        assert!((long_name - 0.5).abs() < 1e-12);

        let good_mail = spec.evaluate(&record(json!({
            "username": "abc",
            "email": "a@b.org",
        })));
        assert!((good_mail - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_monotonic_in_optional_fields() {
        let spec = spec();
        let without = spec.evaluate(&record(json!({"username": "abc", "email": "a@b.dev"})));
        let with = spec.evaluate(&record(json!({
            "username": "abc",
            "email": "a@b.dev",
            "metadata": {"k": "v"},
        })));
        assert!(with >= without);
    }
}
