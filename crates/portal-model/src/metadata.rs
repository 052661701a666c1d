//! # Bounding-Box and Metadata Request Schemas
//!
//! The metadata endpoint accepts a bounding box, a list of layers to
//! summarize, and an optional date range. The bounding box is a nested
//! record with its own schema — ordering violations are reported under
//! the `bbox` key, date-range violations under `date_range`.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use portal_core::{BoundingBox, Timestamp};
use portal_schema::{Constraint, CrossFieldRule, FieldSpec, InputMap, Kind, Schema, SchemaDef};

use crate::{parse_record, ModelError};

/// Most layers one metadata request may summarize.
pub const MAX_LAYERS_PER_REQUEST: usize = 10;

/// Definition of the standalone bounding-box schema.
///
/// Also used as the nested sub-schema of the metadata request, where
/// its `bbox`-keyed ordering rules surface unchanged.
pub fn bbox_schema_def() -> SchemaDef {
    let longitude = |name: &str| {
        FieldSpec::required(name, Kind::Float)
            .constraint(Constraint::Min(-180.0))
            .constraint(Constraint::Max(180.0))
    };
    let latitude = |name: &str| {
        FieldSpec::required(name, Kind::Float)
            .constraint(Constraint::Min(-90.0))
            .constraint(Constraint::Max(90.0))
    };
    SchemaDef::new("bounding_box")
        .field(longitude("west"))
        .field(latitude("south"))
        .field(longitude("east"))
        .field(latitude("north"))
        .rule(CrossFieldRule::MustPrecede {
            lesser: "west".into(),
            greater: "east".into(),
            key: "bbox".into(),
        })
        .rule(CrossFieldRule::MustPrecede {
            lesser: "south".into(),
            greater: "north".into(),
            key: "bbox".into(),
        })
}

/// The compiled bounding-box schema, built on first use.
pub fn bbox_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        bbox_schema_def()
            .compile()
            .expect("built-in bounding-box schema must compile")
    })
}

/// Definition of the metadata request schema.
pub fn schema_def() -> SchemaDef {
    SchemaDef::new("metadata_request")
        .field(
            FieldSpec::required("bbox", Kind::Mapping)
                .constraint(Constraint::Nested(bbox_schema_def())),
        )
        .field(
            FieldSpec::required("layers", Kind::List)
                .constraint(Constraint::MinLength(1))
                .constraint(Constraint::MaxItems(MAX_LAYERS_PER_REQUEST))
                .constraint(Constraint::ItemKind(Kind::String)),
        )
        .field(FieldSpec::optional("start_date", Kind::Datetime))
        .field(FieldSpec::optional("end_date", Kind::Datetime))
        .rule(CrossFieldRule::MustPrecede {
            lesser: "start_date".into(),
            greater: "end_date".into(),
            key: "date_range".into(),
        })
}

/// The compiled metadata request schema, built on first use.
pub fn schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        schema_def()
            .compile()
            .expect("built-in metadata request schema must compile")
    })
}

/// A validated metadata request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataRequest {
    /// Region to summarize.
    pub bbox: BoundingBox,
    /// Layers to include, 1 to [`MAX_LAYERS_PER_REQUEST`].
    pub layers: Vec<String>,
    /// Inclusive start of the observation window.
    pub start_date: Option<Timestamp>,
    /// Inclusive end of the observation window.
    pub end_date: Option<Timestamp>,
}

impl MetadataRequest {
    /// Validate an input mapping and decode the typed request.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::Invalid` with the field-level errors when
    /// the input does not satisfy the schema.
    pub fn parse(input: &InputMap) -> Result<Self, ModelError> {
        parse_record(schema(), input)
    }
}
