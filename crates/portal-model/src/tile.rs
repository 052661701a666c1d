//! # Tile Request Schema
//!
//! Validates tile generation requests: column, row, zoom, and layer.
//! Per-field bounds keep the coordinates non-negative and the zoom
//! within the supported range; the `tile` cross-field rule confines the
//! coordinates to the `2^z` grid of the requested zoom.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use serde_json::json;

use portal_core::{TileCoord, TileId, MAX_ZOOM};
use portal_schema::{Constraint, CrossFieldRule, FieldSpec, InputMap, Kind, Schema, SchemaDef};

use crate::{parse_record, ModelError, SUPPORTED_LAYERS};

/// Definition of the tile request schema.
pub fn schema_def() -> SchemaDef {
    let allowed_layers = SUPPORTED_LAYERS.iter().map(|l| json!(l)).collect();
    SchemaDef::new("tile_request")
        .field(FieldSpec::required("x", Kind::Integer).constraint(Constraint::Min(0.0)))
        .field(FieldSpec::required("y", Kind::Integer).constraint(Constraint::Min(0.0)))
        .field(
            FieldSpec::required("z", Kind::Integer)
                .constraint(Constraint::Min(0.0))
                .constraint(Constraint::Max(f64::from(MAX_ZOOM))),
        )
        .field(
            FieldSpec::required("layer", Kind::String)
                .constraint(Constraint::AllowedValues(allowed_layers)),
        )
        .rule(CrossFieldRule::TileWithinZoom {
            x: "x".into(),
            y: "y".into(),
            zoom: "z".into(),
            key: "tile".into(),
        })
}

/// The compiled tile request schema, built on first use.
pub fn schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        schema_def()
            .compile()
            .expect("built-in tile request schema must compile")
    })
}

/// A validated tile request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRequest {
    /// Tile column.
    pub x: u32,
    /// Tile row.
    pub y: u32,
    /// Zoom level.
    pub z: u8,
    /// Raster layer to render.
    pub layer: String,
}

impl TileRequest {
    /// Validate an input mapping and decode the typed request.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::Invalid` with the field-level errors when
    /// the input does not satisfy the schema.
    pub fn parse(input: &InputMap) -> Result<Self, ModelError> {
        parse_record(schema(), input)
    }

    /// The tile coordinate of this request.
    ///
    /// # Errors
    ///
    /// Returns an error only for hand-built requests whose coordinates
    /// fall outside the grid; requests from [`TileRequest::parse`] have
    /// already been confined to it.
    pub fn coord(&self) -> Result<TileCoord, portal_core::CoreError> {
        TileCoord::new(self.x, self.y, self.z)
    }

    /// The derived tile identifier, e.g. `soil_ph_8_5_10`.
    pub fn tile_id(&self) -> Result<TileId, portal_core::CoreError> {
        Ok(TileId::new(&self.layer, &self.coord()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn input(value: Value) -> InputMap {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_valid_request() {
        let result = schema().validate(&input(json!({
            "x": 5, "y": 10, "z": 8, "layer": "soil_ph"
        })));
        assert!(result.valid);
        let normalized = result.normalized.unwrap();
        assert_eq!(normalized["x"], json!(5));
        assert_eq!(normalized["layer"], json!("soil_ph"));
    }

    #[test]
    fn test_all_supported_layers_accepted() {
        for layer in SUPPORTED_LAYERS {
            let result = schema().validate(&input(json!({
                "x": 1, "y": 1, "z": 5, "layer": layer
            })));
            assert!(result.valid, "layer {layer} rejected");
        }
    }

    #[test]
    fn test_unknown_layer_rejected() {
        let result = schema().validate(&input(json!({
            "x": 5, "y": 10, "z": 8, "layer": "invalid_layer"
        })));
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].field, "layer");
    }

    #[test]
    fn test_zoom_beyond_maximum_rejected() {
        let result = schema().validate(&input(json!({
            "x": 5, "y": 10, "z": 25, "layer": "soil_ph"
        })));
        assert!(!result.valid);
        assert_eq!(result.errors[0].field, "z");
        assert_eq!(result.errors[0].message, "must be at most 18");
    }

    #[test]
    fn test_negative_coordinate_rejected() {
        let result = schema().validate(&input(json!({
            "x": -1, "y": 10, "z": 8, "layer": "soil_ph"
        })));
        assert!(!result.valid);
        assert_eq!(result.errors[0].field, "x");
    }

    #[test]
    fn test_coordinates_outside_grid_rejected() {
        // Zoom 8 grid is 256x256; x=300 passes the per-field bound but
        // not the grid rule.
        let result = schema().validate(&input(json!({
            "x": 300, "y": 10, "z": 8, "layer": "soil_ph"
        })));
        assert!(!result.valid);
        assert_eq!(result.errors[0].field, "tile");
    }

    #[test]
    fn test_missing_fields_reported_in_order() {
        let result = schema().validate(&input(json!({})));
        let fields: Vec<&str> = result.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["x", "y", "z", "layer"]);
    }

    #[test]
    fn test_parse_typed_request() {
        let request = TileRequest::parse(&input(json!({
            "x": 1024, "y": 768, "z": 12, "layer": "ndvi"
        })))
        .unwrap();
        assert_eq!(request.x, 1024);
        assert_eq!(request.z, 12);
        assert_eq!(request.tile_id().unwrap().as_str(), "ndvi_12_1024_768");
    }

    #[test]
    fn test_parse_surfaces_field_errors() {
        let err = TileRequest::parse(&input(json!({
            "x": 5, "y": 10, "z": 8, "layer": "roads"
        })))
        .unwrap_err();
        assert_eq!(err.field_errors().len(), 1);
        assert_eq!(err.field_errors()[0].field, "layer");
    }

    #[test]
    fn test_extra_fields_ignored() {
        let result = schema().validate(&input(json!({
            "x": 5, "y": 10, "z": 8, "layer": "soil_ph", "format": "png"
        })));
        assert!(result.valid);
        assert!(!result.normalized.unwrap().contains_key("format"));
    }
}
