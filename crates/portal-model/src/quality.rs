//! # Geospatial Point Schema and Quality Assessment
//!
//! Validates standalone geospatial observations and grades how complete
//! and trustworthy they are. Exactly-zero coordinates are rejected as a
//! near-certain sign of an unset GPS fix. The quality assessment runs a
//! fixed panel of checks over a validated point and reports the passed
//! fraction as a score in `[0, 1]`, flagging polar locations as a
//! warning rather than a failure.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use serde_json::json;

use portal_core::CoordinateCheck;
use portal_schema::{Constraint, FieldSpec, InputMap, Kind, Schema, SchemaDef};

use crate::{parse_record, ModelError};

/// Elevation range considered plausible for surface observations, in
/// meters relative to sea level.
pub const ELEVATION_RANGE_M: (f64, f64) = (-500.0, 9000.0);

/// GPS accuracy at or below this many meters counts as high accuracy.
pub const HIGH_ACCURACY_M: f64 = 10.0;

/// Definition of the geospatial point schema.
pub fn schema_def() -> SchemaDef {
    SchemaDef::new("geo_point")
        .field(
            FieldSpec::required("latitude", Kind::Float)
                .constraint(Constraint::Min(-90.0))
                .constraint(Constraint::Max(90.0))
                .constraint(Constraint::NotOneOf(vec![json!(0.0)])),
        )
        .field(
            FieldSpec::required("longitude", Kind::Float)
                .constraint(Constraint::Min(-180.0))
                .constraint(Constraint::Max(180.0))
                .constraint(Constraint::NotOneOf(vec![json!(0.0)])),
        )
        .field(
            FieldSpec::optional("elevation", Kind::Float)
                .constraint(Constraint::Min(ELEVATION_RANGE_M.0))
                .constraint(Constraint::Max(ELEVATION_RANGE_M.1)),
        )
        .field(
            FieldSpec::optional("accuracy", Kind::Float)
                .constraint(Constraint::Min(f64::MIN_POSITIVE))
                .constraint(Constraint::Max(100.0)),
        )
}

/// The compiled geospatial point schema, built on first use.
pub fn schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        schema_def()
            .compile()
            .expect("built-in geospatial point schema must compile")
    })
}

/// A validated geospatial observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Elevation in meters, when reported.
    pub elevation: Option<f64>,
    /// GPS accuracy in meters, when reported.
    pub accuracy: Option<f64>,
}

impl GeoPoint {
    /// Validate an input mapping and decode the typed point.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::Invalid` with the field-level errors when
    /// the input does not satisfy the schema.
    pub fn parse(input: &InputMap) -> Result<Self, ModelError> {
        parse_record(schema(), input)
    }
}

/// Outcome of the fixed quality-check panel over one point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityReport {
    /// Number of checks run.
    pub total_checks: usize,
    /// Checks that passed.
    pub passed_checks: usize,
    /// Checks that failed.
    pub failed_checks: usize,
    /// Non-fatal observations (polar location).
    pub warnings: usize,
    /// Passed fraction, in `[0, 1]`.
    pub score: f64,
    /// Human-readable verdict per check, keyed by check name.
    pub details: BTreeMap<String, String>,
}

/// Run the quality-check panel over a point.
///
/// The panel mirrors the service's assessment endpoint: coordinate
/// range, elevation presence and plausibility, accuracy presence and
/// grade. Points in polar regions add a warning without affecting the
/// score.
pub fn assess_point(point: &GeoPoint) -> QualityReport {
    let coords = CoordinateCheck::of(point.latitude, point.longitude);

    let coordinates_valid = coords.is_valid();
    let elevation_provided = point.elevation.is_some();
    let accuracy_provided = point.accuracy.is_some();
    let high_accuracy = point.accuracy.is_some_and(|a| a <= HIGH_ACCURACY_M);
    let reasonable_elevation = point
        .elevation
        .map_or(true, |e| (ELEVATION_RANGE_M.0..=ELEVATION_RANGE_M.1).contains(&e));

    let outcomes = [
        coordinates_valid,
        elevation_provided,
        accuracy_provided,
        high_accuracy,
        reasonable_elevation,
    ];
    let passed = outcomes.iter().filter(|ok| **ok).count();

    let mut details = BTreeMap::new();
    details.insert(
        "coordinate_validation".to_string(),
        verdict(coordinates_valid).to_string(),
    );
    details.insert(
        "elevation_check".to_string(),
        verdict(reasonable_elevation).to_string(),
    );
    details.insert(
        "accuracy_assessment".to_string(),
        if high_accuracy { "good" } else { "moderate" }.to_string(),
    );
    details.insert(
        "location_type".to_string(),
        if coords.in_polar_region { "polar" } else { "standard" }.to_string(),
    );

    QualityReport {
        total_checks: outcomes.len(),
        passed_checks: passed,
        failed_checks: outcomes.len() - passed,
        warnings: usize::from(coords.in_polar_region),
        score: passed as f64 / outcomes.len() as f64,
        details,
    }
}

fn verdict(ok: bool) -> &'static str {
    if ok {
        "passed"
    } else {
        "failed"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn input(value: Value) -> InputMap {
        value.as_object().unwrap().clone()
    }

    // ---- schema ----

    #[test]
    fn test_valid_point() {
        let point = GeoPoint::parse(&input(json!({
            "latitude": 41.2, "longitude": -104.5, "elevation": 1850.0, "accuracy": 5.0
        })))
        .unwrap();
        assert_eq!(point.latitude, 41.2);
        assert_eq!(point.accuracy, Some(5.0));
    }

    #[test]
    fn test_optional_fields_default_to_none() {
        let point = GeoPoint::parse(&input(json!({
            "latitude": 41.2, "longitude": -104.5
        })))
        .unwrap();
        assert!(point.elevation.is_none());
        assert!(point.accuracy.is_none());
    }

    #[test]
    fn test_zero_coordinates_rejected() {
        let result = schema().validate(&input(json!({
            "latitude": 0.0, "longitude": -104.5
        })));
        assert!(!result.valid);
        assert_eq!(result.errors[0].field, "latitude");
        assert_eq!(result.errors[0].message, "must not be one of [0.0]");
    }

    #[test]
    fn test_out_of_range_latitude_rejected() {
        let result = schema().validate(&input(json!({
            "latitude": 95.0, "longitude": -104.5
        })));
        assert!(!result.valid);
        assert_eq!(result.errors[0].message, "must be at most 90");
    }

    #[test]
    fn test_implausible_elevation_rejected() {
        let result = schema().validate(&input(json!({
            "latitude": 41.2, "longitude": -104.5, "elevation": 12000.0
        })));
        assert!(!result.valid);
        assert_eq!(result.errors[0].field, "elevation");
    }

    #[test]
    fn test_zero_accuracy_rejected() {
        let result = schema().validate(&input(json!({
            "latitude": 41.2, "longitude": -104.5, "accuracy": 0.0
        })));
        assert!(!result.valid);
        assert_eq!(result.errors[0].field, "accuracy");
    }

    // ---- quality panel ----

    fn point(value: Value) -> GeoPoint {
        GeoPoint::parse(&input(value)).unwrap()
    }

    #[test]
    fn test_full_point_scores_one() {
        let report = assess_point(&point(json!({
            "latitude": 41.2, "longitude": -104.5, "elevation": 1850.0, "accuracy": 5.0
        })));
        assert_eq!(report.total_checks, 5);
        assert_eq!(report.passed_checks, 5);
        assert_eq!(report.failed_checks, 0);
        assert_eq!(report.score, 1.0);
        assert_eq!(report.warnings, 0);
        assert_eq!(report.details["coordinate_validation"], "passed");
        assert_eq!(report.details["accuracy_assessment"], "good");
    }

    #[test]
    fn test_bare_point_misses_optional_checks() {
        let report = assess_point(&point(json!({
            "latitude": 41.2, "longitude": -104.5
        })));
        // Coordinates and (vacuous) elevation plausibility pass; the
        // three presence/grade checks fail.
        assert_eq!(report.passed_checks, 2);
        assert_eq!(report.failed_checks, 3);
        assert!((report.score - 0.4).abs() < 1e-12);
        assert_eq!(report.details["accuracy_assessment"], "moderate");
    }

    #[test]
    fn test_polar_point_warns() {
        let report = assess_point(&point(json!({
            "latitude": 78.2, "longitude": 15.6
        })));
        assert_eq!(report.warnings, 1);
        assert_eq!(report.details["location_type"], "polar");
    }

    #[test]
    fn test_low_accuracy_graded_moderate() {
        let report = assess_point(&point(json!({
            "latitude": 41.2, "longitude": -104.5, "accuracy": 50.0
        })));
        assert_eq!(report.details["accuracy_assessment"], "moderate");
        // accuracy_provided passes, high_accuracy fails.
        assert_eq!(report.passed_checks, 3);
    }
}
