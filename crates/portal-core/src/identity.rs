//! # Domain Identity Newtypes
//!
//! Newtype wrappers for the identifiers that move between the tile and
//! processing layers. These prevent accidental identifier confusion —
//! you cannot pass a `RequestId` where a `TileId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::tile::TileCoord;

/// Identifier of a generated map tile: `<layer>_<z>_<x>_<y>`.
///
/// Derived from the layer name and tile coordinate, so the same tile
/// always maps to the same identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileId(pub String);

impl TileId {
    /// Derive the identifier for a layer/coordinate pair.
    pub fn new(layer: &str, tile: &TileCoord) -> Self {
        Self(format!("{layer}_{z}_{x}_{y}", z = tile.z, x = tile.x, y = tile.y))
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Unique identifier for a submitted processing request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub String);

impl RequestId {
    /// Generate a fresh request identifier with the given prefix,
    /// e.g. `proc-7f9c0b4e-...`.
    pub fn generate(prefix: &str) -> Self {
        Self(format!("{prefix}-{}", Uuid::new_v4()))
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_id_format() {
        let tile = TileCoord::new(1024, 768, 10).unwrap();
        let id = TileId::new("soil_ph", &tile);
        assert_eq!(id.as_str(), "soil_ph_10_1024_768");
    }

    #[test]
    fn test_tile_id_deterministic() {
        let tile = TileCoord::new(5, 10, 8).unwrap();
        assert_eq!(TileId::new("ndvi", &tile), TileId::new("ndvi", &tile));
    }

    #[test]
    fn test_request_id_carries_prefix() {
        let id = RequestId::generate("proc");
        assert!(id.as_str().starts_with("proc-"));
    }

    #[test]
    fn test_request_ids_unique() {
        assert_ne!(RequestId::generate("req"), RequestId::generate("req"));
    }

    #[test]
    fn test_display_is_raw_identifier() {
        let tile = TileCoord::new(0, 0, 0).unwrap();
        let id = TileId::new("elevation", &tile);
        assert_eq!(id.to_string(), "elevation_0_0_0");
    }
}
