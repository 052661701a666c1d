//! # Cross-Field Rules
//!
//! Validation rules spanning more than one field, declared once per
//! schema. A rule is evaluated only after every field it touches has
//! individually passed presence, coercion, and constraint checks —
//! constraints presume typed values, and so do relationships between
//! them. Violations are reported under the rule's synthetic key
//! (`bbox`, `date_range`, `tile`) rather than any single field name.

use serde::{Deserialize, Serialize};

/// A declarative rule over several fields of one schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum CrossFieldRule {
    /// The `lesser` field's value must be strictly less than the
    /// `greater` field's. Applies to numeric and datetime fields.
    MustPrecede {
        /// Field that must hold the smaller value.
        lesser: String,
        /// Field that must hold the larger value.
        greater: String,
        /// Synthetic key violations are reported under.
        key: String,
    },
    /// Tile column and row must fit the `2^z` grid of the zoom field.
    TileWithinZoom {
        /// Field holding the tile column.
        x: String,
        /// Field holding the tile row.
        y: String,
        /// Field holding the zoom level.
        zoom: String,
        /// Synthetic key violations are reported under.
        key: String,
    },
}

impl CrossFieldRule {
    /// The synthetic error key for this rule.
    pub fn key(&self) -> &str {
        match self {
            CrossFieldRule::MustPrecede { key, .. } => key,
            CrossFieldRule::TileWithinZoom { key, .. } => key,
        }
    }

    /// Names of the fields this rule reads.
    pub fn fields(&self) -> Vec<&str> {
        match self {
            CrossFieldRule::MustPrecede { lesser, greater, .. } => vec![lesser, greater],
            CrossFieldRule::TileWithinZoom { x, y, zoom, .. } => vec![x, y, zoom],
        }
    }
}
