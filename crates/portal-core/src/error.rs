//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types used by the core domain primitives. All errors
//! use `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Constructor errors carry the offending value, not just a message, so
//!   callers can report the rejected input verbatim.
//! - Timestamp errors keep the raw input string for diagnostics.

use thiserror::Error;

/// Top-level error type for Portal core domain types.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Latitude outside the valid range.
    #[error("latitude out of range [-90, 90]: {0}")]
    LatitudeOutOfRange(f64),

    /// Longitude outside the valid range.
    #[error("longitude out of range [-180, 180]: {0}")]
    LongitudeOutOfRange(f64),

    /// Bounding box edges are not strictly ordered.
    #[error("bounding box is not ordered: {0}")]
    UnorderedBounds(String),

    /// Zoom level exceeds the supported maximum.
    #[error("zoom level {zoom} exceeds maximum {max}")]
    ZoomOutOfRange {
        /// The rejected zoom level.
        zoom: u8,
        /// The maximum supported zoom level.
        max: u8,
    },

    /// Tile coordinates fall outside the grid for the zoom level.
    #[error("tile ({x}, {y}) outside {extent}x{extent} grid at zoom {zoom}")]
    TileOutOfGrid {
        /// Tile column.
        x: u32,
        /// Tile row.
        y: u32,
        /// Zoom level.
        zoom: u8,
        /// Grid extent (2^zoom) at that zoom level.
        extent: u32,
    },

    /// Timestamp string could not be parsed in any accepted form.
    #[error("invalid timestamp {input:?}: {reason}")]
    InvalidTimestamp {
        /// The raw input string.
        input: String,
        /// Why parsing failed.
        reason: String,
    },

    /// A raster sample slice contained no valid values after masking.
    #[error("raster sample contains no valid values")]
    EmptyRaster,
}
