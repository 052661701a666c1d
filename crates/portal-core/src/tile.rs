//! # Tile Grid Math
//!
//! Slippy-map tile coordinates and their geographic extents under the
//! simplified equirectangular projection used by the tile service: each
//! zoom level divides the globe into a `2^z` by `2^z` grid of square
//! tiles spanning `360 / 2^z` degrees per side, measured from the
//! south-west origin `(-180, -90)`.
//!
//! Note the latitude axis reuses the 360-degree tile span, so northern
//! rows extend past the `[-90, 90]` latitude range. [`TileBounds`] is
//! therefore plain data with no geographic range invariant — it reports
//! what the projection computes.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Maximum supported zoom level.
pub const MAX_ZOOM: u8 = 18;

/// Tile edge length in pixels, used to derive per-pixel resolution.
pub const TILE_PIXELS: u32 = 256;

/// A validated tile coordinate: column `x`, row `y`, zoom `z`.
///
/// Construction enforces `z <= MAX_ZOOM` and `x, y < 2^z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    /// Tile column, counted from the west edge.
    pub x: u32,
    /// Tile row, counted from the south edge.
    pub y: u32,
    /// Zoom level.
    pub z: u8,
}

/// Geographic extent of a tile under the simplified projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileBounds {
    /// Western edge in degrees.
    pub west: f64,
    /// Southern edge in degrees.
    pub south: f64,
    /// Eastern edge in degrees.
    pub east: f64,
    /// Northern edge in degrees.
    pub north: f64,
}

impl TileCoord {
    /// Create a tile coordinate, rejecting zooms beyond [`MAX_ZOOM`] and
    /// coordinates outside the `2^z` grid.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::ZoomOutOfRange` or `CoreError::TileOutOfGrid`.
    pub fn new(x: u32, y: u32, z: u8) -> Result<Self, CoreError> {
        if z > MAX_ZOOM {
            return Err(CoreError::ZoomOutOfRange { zoom: z, max: MAX_ZOOM });
        }
        let extent = Self::grid_extent(z);
        if x >= extent || y >= extent {
            return Err(CoreError::TileOutOfGrid { x, y, zoom: z, extent });
        }
        Ok(Self { x, y, z })
    }

    /// Number of tiles along each axis at zoom `z` (`2^z`).
    pub fn grid_extent(z: u8) -> u32 {
        1u32 << u32::from(z.min(MAX_ZOOM))
    }

    /// Degrees spanned by one tile edge at this zoom level.
    pub fn span_degrees(&self) -> f64 {
        360.0 / f64::from(Self::grid_extent(self.z))
    }

    /// Geographic extent of this tile, measured from the `(-180, -90)`
    /// grid origin.
    pub fn bounds(&self) -> TileBounds {
        let span = self.span_degrees();
        let west = -180.0 + f64::from(self.x) * span;
        let south = -90.0 + f64::from(self.y) * span;
        TileBounds {
            west,
            south,
            east: west + span,
            north: south + span,
        }
    }

    /// Per-pixel resolution in degrees for a [`TILE_PIXELS`]-wide tile.
    pub fn pixel_size(&self) -> f64 {
        self.span_degrees() / f64::from(TILE_PIXELS)
    }
}

impl std::fmt::Display for TileCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}
