//! # Geographic Primitives
//!
//! Coordinate pairs, bounding boxes, and the pure geodesic helpers used
//! by the metadata and quality-assessment layers.
//!
//! ## Conventions
//!
//! - Latitudes in decimal degrees, range `[-90, 90]`.
//! - Longitudes in decimal degrees, range `[-180, 180]`.
//! - Bounding boxes are `west < east`, `south < north` — strictly ordered,
//!   enforced at construction. Degenerate (zero-area) boxes are rejected.
//! - Distances in kilometers over a spherical Earth (radius 6371 km).

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Mean Earth radius in kilometers, used by the haversine distance.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Latitude beyond which a point is classified as polar.
pub const POLAR_LATITUDE_DEG: f64 = 66.5;

/// A validated latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

impl LatLon {
    /// Create a coordinate pair, rejecting out-of-range components.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::LatitudeOutOfRange` or
    /// `CoreError::LongitudeOutOfRange` when a component falls outside
    /// its valid range. Non-finite components are rejected the same way.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoreError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(CoreError::LatitudeOutOfRange(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(CoreError::LongitudeOutOfRange(longitude));
        }
        Ok(Self { latitude, longitude })
    }

    /// True when the point lies poleward of [`POLAR_LATITUDE_DEG`].
    pub fn is_polar(&self) -> bool {
        self.latitude.abs() > POLAR_LATITUDE_DEG
    }
}

/// Great-circle distance between two points, in kilometers.
///
/// Haversine formula over a spherical Earth. Accurate to ~0.5% — plenty
/// for dashboard distance readouts, not for survey work.
pub fn haversine_km(a: &LatLon, b: &LatLon) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * h.sqrt().asin() * EARTH_RADIUS_KM
}

/// Classification of a raw coordinate pair against geographic bounds.
///
/// Unlike [`LatLon::new`], this never fails: it reports which components
/// are in range so callers can surface all problems at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinateCheck {
    /// Latitude within `[-90, 90]`.
    pub latitude_valid: bool,
    /// Longitude within `[-180, 180]`.
    pub longitude_valid: bool,
    /// Point lies poleward of the polar circle.
    pub in_polar_region: bool,
}

impl CoordinateCheck {
    /// Classify a raw coordinate pair.
    pub fn of(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude_valid: latitude.is_finite() && (-90.0..=90.0).contains(&latitude),
            longitude_valid: longitude.is_finite() && (-180.0..=180.0).contains(&longitude),
            in_polar_region: latitude.is_finite() && latitude.abs() > POLAR_LATITUDE_DEG,
        }
    }

    /// Both components in range.
    pub fn is_valid(&self) -> bool {
        self.latitude_valid && self.longitude_valid
    }
}

/// A validated geographic bounding box in decimal degrees.
///
/// Edges are strictly ordered: `west < east` and `south < north`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Western edge (minimum longitude).
    pub west: f64,
    /// Southern edge (minimum latitude).
    pub south: f64,
    /// Eastern edge (maximum longitude).
    pub east: f64,
    /// Northern edge (maximum latitude).
    pub north: f64,
}

impl BoundingBox {
    /// Create a bounding box, rejecting out-of-range or unordered edges.
    ///
    /// # Errors
    ///
    /// Returns a range error when any edge falls outside its axis range,
    /// or `CoreError::UnorderedBounds` when `west >= east` or
    /// `south >= north`.
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Result<Self, CoreError> {
        for lon in [west, east] {
            if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
                return Err(CoreError::LongitudeOutOfRange(lon));
            }
        }
        for lat in [south, north] {
            if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
                return Err(CoreError::LatitudeOutOfRange(lat));
            }
        }
        if west >= east {
            return Err(CoreError::UnorderedBounds(format!(
                "west ({west}) must be less than east ({east})"
            )));
        }
        if south >= north {
            return Err(CoreError::UnorderedBounds(format!(
                "south ({south}) must be less than north ({north})"
            )));
        }
        Ok(Self { west, south, east, north })
    }

    /// Longitudinal extent in degrees.
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// Latitudinal extent in degrees.
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// True when the point lies inside the box (edges inclusive).
    pub fn contains(&self, point: &LatLon) -> bool {
        (self.west..=self.east).contains(&point.longitude)
            && (self.south..=self.north).contains(&point.latitude)
    }
}
