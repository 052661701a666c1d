//! # portal-core — Foundational Types for the Portal Stack
//!
//! This crate is the bedrock of the Portal tile-metadata stack. It defines
//! the domain primitives shared by the validation and model layers. Every
//! other crate in the workspace depends on `portal-core`; it depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `TileId`, `RequestId`,
//!    `LatLon`, `TileCoord` — validated constructors, no bare strings or
//!    naked coordinate tuples crossing API boundaries.
//!
//! 2. **Validated construction over validated use.** Range checks live in
//!    `new()` constructors and return `CoreError`; once a value exists it
//!    is in range. Call sites never re-check.
//!
//! 3. **Naive-UTC timestamps.** The `Timestamp` type carries no timezone
//!    offset and is truncated to seconds precision — the canonical form
//!    for date-range comparisons in request records.
//!
//! 4. **Pure raster helpers.** `raster::summarize` operates on already
//!    decoded sample slices. Decoding and file I/O belong to external
//!    tooling, not this crate.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `portal-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone`, and implement `Serialize`/`Deserialize`.

pub mod error;
pub mod geo;
pub mod identity;
pub mod raster;
pub mod temporal;
pub mod tile;

// Re-export primary types for ergonomic imports.
pub use error::CoreError;
pub use geo::{haversine_km, BoundingBox, CoordinateCheck, LatLon, POLAR_LATITUDE_DEG};
pub use identity::{RequestId, TileId};
pub use raster::{summarize, RasterSummary};
pub use temporal::Timestamp;
pub use tile::{TileBounds, TileCoord, MAX_ZOOM, TILE_PIXELS};
