//! # Processing Request Schema
//!
//! Validates submissions to the geospatial processing queue: client
//! request identifier, data type, priority, processing parameters, the
//! observation location as a nested geospatial point, and optional
//! tags. Also provides the deterministic duration estimate used for
//! queue scheduling hints.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use portal_schema::{Constraint, FieldSpec, InputMap, Kind, Schema, SchemaDef};

use crate::{parse_record, quality, ModelError};

/// Data types the processing pipeline accepts.
pub const DATA_TYPES: [&str; 5] = ["raster", "vector", "timeseries", "point_cloud", "metadata"];

/// Parameter keys every processing request must supply.
pub const REQUIRED_PARAMETERS: [&str; 2] = ["format", "resolution"];

/// Definition of the processing request schema.
pub fn schema_def() -> SchemaDef {
    let allowed_types = DATA_TYPES.iter().map(|t| json!(t)).collect();
    SchemaDef::new("processing_request")
        .field(
            FieldSpec::required("request_id", Kind::String)
                .constraint(Constraint::Pattern("^[a-zA-Z0-9-_]{8,64}$".to_string())),
        )
        .field(
            FieldSpec::required("data_type", Kind::String)
                .constraint(Constraint::MinLength(3))
                .constraint(Constraint::MaxLength(20))
                .constraint(Constraint::AllowedValues(allowed_types)),
        )
        .field(
            FieldSpec::required("priority", Kind::Integer)
                .constraint(Constraint::Min(1.0))
                .constraint(Constraint::Max(5.0)),
        )
        .field(
            FieldSpec::required("parameters", Kind::Mapping)
                .constraint(Constraint::MinLength(1))
                .constraint(Constraint::MaxLength(20))
                .constraint(Constraint::RequiredKeys(
                    REQUIRED_PARAMETERS.iter().map(|k| k.to_string()).collect(),
                )),
        )
        .field(
            FieldSpec::required("location", Kind::Mapping)
                .constraint(Constraint::Nested(quality::schema_def())),
        )
        .field(
            FieldSpec::optional("tags", Kind::List)
                .constraint(Constraint::MaxItems(10))
                .constraint(Constraint::ItemKind(Kind::String)),
        )
}

/// The compiled processing request schema, built on first use.
pub fn schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        schema_def()
            .compile()
            .expect("built-in processing request schema must compile")
    })
}

/// A validated processing request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingRequest {
    /// Client-supplied request identifier.
    pub request_id: String,
    /// One of [`DATA_TYPES`].
    pub data_type: String,
    /// Priority level, 1 (lowest) to 5 (highest).
    pub priority: u8,
    /// Processing parameters; always includes [`REQUIRED_PARAMETERS`].
    pub parameters: Map<String, Value>,
    /// Observation location.
    pub location: quality::GeoPoint,
    /// Optional labels, at most 10.
    pub tags: Option<Vec<String>>,
}

impl ProcessingRequest {
    /// Validate an input mapping and decode the typed request.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::Invalid` with the field-level errors when
    /// the input does not satisfy the schema.
    pub fn parse(input: &InputMap) -> Result<Self, ModelError> {
        parse_record(schema(), input)
    }

    /// Estimated processing duration for this request.
    pub fn estimated_duration_secs(&self) -> u32 {
        estimated_duration_secs(&self.data_type, &self.parameters)
    }
}

/// Deterministic duration estimate in seconds.
///
/// Base time per data type, doubled for sub-meter resolutions and
/// halved for coarse (>10) ones. The resolution parameter is read as a
/// number or numeric string; anything else leaves the base unchanged.
pub fn estimated_duration_secs(data_type: &str, parameters: &Map<String, Value>) -> u32 {
    let base: f64 = match data_type {
        "raster" => 30.0,
        "vector" => 15.0,
        "timeseries" => 45.0,
        "point_cloud" => 120.0,
        "metadata" => 5.0,
        _ => 60.0,
    };

    let resolution = parameters.get("resolution").and_then(|v| match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    });

    let scaled = match resolution {
        Some(r) if r < 1.0 => base * 2.0,
        Some(r) if r > 10.0 => base * 0.5,
        _ => base,
    };
    scaled as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(value: Value) -> InputMap {
        value.as_object().unwrap().clone()
    }

    fn valid_payload() -> Value {
        json!({
            "request_id": "proc-2023-0042",
            "data_type": "raster",
            "priority": 3,
            "parameters": {"format": "geotiff", "resolution": 10},
            "location": {"latitude": 41.2, "longitude": -104.5},
            "tags": ["survey", "gamma"],
        })
    }

    #[test]
    fn test_valid_request() {
        let request = ProcessingRequest::parse(&input(valid_payload())).unwrap();
        assert_eq!(request.data_type, "raster");
        assert_eq!(request.priority, 3);
        assert_eq!(request.location.latitude, 41.2);
        assert_eq!(request.tags.as_deref(), Some(["survey".to_string(), "gamma".to_string()].as_slice()));
    }

    #[test]
    fn test_short_request_id_rejected() {
        let mut payload = valid_payload();
        payload["request_id"] = json!("proc-1");
        let result = schema().validate(&input(payload));
        assert!(!result.valid);
        assert_eq!(result.errors[0].field, "request_id");
        assert_eq!(result.errors[0].message, "does not match required pattern");
    }

    #[test]
    fn test_unknown_data_type_rejected() {
        let mut payload = valid_payload();
        payload["data_type"] = json!("hologram");
        let result = schema().validate(&input(payload));
        assert!(!result.valid);
        assert_eq!(result.errors[0].field, "data_type");
    }

    #[test]
    fn test_priority_bounds() {
        for (priority, ok) in [(0, false), (1, true), (5, true), (6, false)] {
            let mut payload = valid_payload();
            payload["priority"] = json!(priority);
            assert_eq!(schema().validate(&input(payload)).valid, ok, "priority {priority}");
        }
    }

    #[test]
    fn test_parameters_must_include_required_keys() {
        let mut payload = valid_payload();
        payload["parameters"] = json!({"format": "geotiff"});
        let result = schema().validate(&input(payload));
        assert!(!result.valid);
        assert_eq!(result.errors[0].field, "parameters");
        assert_eq!(result.errors[0].message, r#"must include keys ["resolution"]"#);
    }

    #[test]
    fn test_empty_parameters_rejected() {
        let mut payload = valid_payload();
        payload["parameters"] = json!({});
        let result = schema().validate(&input(payload));
        assert!(!result.valid);
        // Both the size bound and the key requirement report.
        assert_eq!(result.errors.len(), 2);
        assert!(result.errors.iter().all(|e| e.field == "parameters"));
    }

    #[test]
    fn test_nested_location_errors_dotted() {
        let mut payload = valid_payload();
        payload["location"] = json!({"latitude": 95.0, "longitude": -104.5});
        let result = schema().validate(&input(payload));
        assert!(!result.valid);
        assert_eq!(result.errors[0].field, "location.latitude");
    }

    #[test]
    fn test_eleven_tags_rejected() {
        let mut payload = valid_payload();
        payload["tags"] = json!((0..11).map(|i| format!("t{i}")).collect::<Vec<_>>());
        let result = schema().validate(&input(payload));
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].field, "tags");
    }

    // ---- duration estimate ----

    #[test]
    fn test_duration_base_times() {
        let params = |resolution: Value| {
            let mut m = Map::new();
            m.insert("format".to_string(), json!("geotiff"));
            m.insert("resolution".to_string(), resolution);
            m
        };
        assert_eq!(estimated_duration_secs("raster", &params(json!(5))), 30);
        assert_eq!(estimated_duration_secs("point_cloud", &params(json!(5))), 120);
        assert_eq!(estimated_duration_secs("unknown", &params(json!(5))), 60);
    }

    #[test]
    fn test_duration_scales_with_resolution() {
        let params = |resolution: Value| {
            let mut m = Map::new();
            m.insert("resolution".to_string(), resolution);
            m
        };
        assert_eq!(estimated_duration_secs("raster", &params(json!(0.5))), 60);
        assert_eq!(estimated_duration_secs("raster", &params(json!(30))), 15);
        assert_eq!(estimated_duration_secs("raster", &params(json!("0.5"))), 60);
        // Unparseable resolution falls back to the base time.
        assert_eq!(estimated_duration_secs("raster", &params(json!("fine"))), 30);
    }

    #[test]
    fn test_duration_deterministic() {
        let request = ProcessingRequest::parse(&input(valid_payload())).unwrap();
        assert_eq!(request.estimated_duration_secs(), request.estimated_duration_secs());
    }
}
