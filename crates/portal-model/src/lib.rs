//! # portal-model — Request Schemas for the Portal Service
//!
//! The concrete schema variants served by the Portal tile-metadata
//! service, built on the generic evaluator in `portal-schema`:
//!
//! | Variant | Module | Record type |
//! |---------|--------|-------------|
//! | Tile request | [`tile`] | [`TileRequest`] |
//! | Bounding box | [`metadata`] | [`portal_core::BoundingBox`] |
//! | Metadata request | [`metadata`] | [`MetadataRequest`] |
//! | Geospatial point | [`quality`] | [`GeoPoint`] |
//! | Processing request | [`processing`] | [`ProcessingRequest`] |
//! | User profile | [`profile`] | [`UserProfile`] |
//!
//! Each module exposes its compiled schema behind a process-lifetime
//! accessor (`tile::schema()`, …): built on first use, immutable
//! afterwards, shared by every caller. A definition error in a built-in
//! schema is a service defect and aborts at first access rather than
//! surfacing per request.
//!
//! Each variant also offers a `parse` helper that validates an input
//! mapping and decodes the normalized record into its typed form.

pub mod metadata;
pub mod processing;
pub mod profile;
pub mod quality;
pub mod tile;

use thiserror::Error;

use portal_schema::FieldError;

pub use metadata::MetadataRequest;
pub use processing::ProcessingRequest;
pub use profile::UserProfile;
pub use quality::{GeoPoint, QualityReport};
pub use tile::TileRequest;

/// Raster layers the tile service can render.
pub const SUPPORTED_LAYERS: [&str; 4] = ["soil_ph", "organic_matter", "elevation", "ndvi"];

/// Failure to turn an input mapping into a typed request record.
#[derive(Error, Debug)]
pub enum ModelError {
    /// The input did not validate against the variant's schema.
    #[error("request validation failed with {} error(s)", .0.len())]
    Invalid(Vec<FieldError>),

    /// The normalized record did not decode into the typed form. With a
    /// well-formed schema this indicates a defect, not bad input.
    #[error("normalized record decode failed: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ModelError {
    /// The field-level errors of a validation failure, if any.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            ModelError::Invalid(errors) => errors,
            ModelError::Decode(_) => &[],
        }
    }
}

/// Validate `input` against `schema` and decode the normalized record.
pub(crate) fn parse_record<T: serde::de::DeserializeOwned>(
    schema: &portal_schema::Schema,
    input: &portal_schema::InputMap,
) -> Result<T, ModelError> {
    let mut result = schema.validate(input);
    match result.normalized.take() {
        Some(normalized) => Ok(serde_json::from_value(serde_json::Value::Object(normalized))?),
        None => Err(ModelError::Invalid(result.errors)),
    }
}
