// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # CityJSON-Lite Geometry
//!
//! Turns CityJSON geometry entries into coordinate-resolved polygons tagged
//! with their semantic surfaces.
//!
//! ## Overview
//!
//! - **Vertex resolution**: [`VertexCache`] applies the model transform once
//!   per vertex; [`TransformedVertexResolver`] re-bases template vertices on
//!   an instance anchor
//! - **Boundary flattening**: [`read_boundaries`] walks nested boundary
//!   arrays of any depth and pairs each polygon with its semantic surface
//! - **Geometry reading**: [`GeometryReader`] adds LoD filtering, template
//!   instancing and a per-entry skip counter
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cityjson_lite_geometry::GeometryReader;
//!
//! let reader = GeometryReader::from_model(&model);
//! for object in model.city_objects.values() {
//!     let geometry = reader.read_geometry(&object.geometry);
//!     println!("{} polygons", geometry.len());
//! }
//! println!("{} entries skipped", reader.skipped_count());
//! ```

pub mod boundaries;
pub mod error;
pub mod polygon;
pub mod reader;
pub mod vertices;

#[cfg(test)]
mod fixtures;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};

// Re-export main types
pub use boundaries::{
    read_boundaries, read_boundaries_with_depth, read_geometry_boundaries, read_surface_values,
    FlatBoundaries, GeometryKind,
};
pub use error::{Error, Result};
pub use polygon::{
    polygons_to_geometry, IndexPolygon, IndexRing, MultiPolygon, Polygon, Ring, RingSet,
};
pub use reader::{GeometryReader, PolygonsWithSemantics};
pub use vertices::{TransformedVertexResolver, VertexCache, VertexResolver};
