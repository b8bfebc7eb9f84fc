// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Boundary flattening
//!
//! CityJSON nests polygons in as many list levels as the geometry type needs:
//!
//! | Type                          | Levels above a polygon |
//! |-------------------------------|------------------------|
//! | MultiSurface, CompositeSurface| 1                      |
//! | Solid                         | 2 (shells)             |
//! | MultiSolid, CompositeSolid    | 3 (solids, shells)     |
//!
//! `semantics.values` mirrors those levels and ends in a surface index or
//! `null`. A `null` at any level means "no semantics below".
//!
//! Known types are walked with an explicit depth; anything else falls back to
//! sniffing the nesting (a node whose first ring's first entry is not a list
//! is a polygon).

use crate::{Error, IndexPolygon, IndexRing, Result};
use cityjson_lite_model::SurfaceAttrs;
use serde_json::Value;

/// Geometry type, classified by boundary nesting
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    MultiPoint,
    MultiLineString,
    MultiSurface,
    CompositeSurface,
    Solid,
    MultiSolid,
    CompositeSolid,
    GeometryInstance,
    /// Any other type string
    Unknown,
}

impl GeometryKind {
    /// Classify a geometry `type` string
    pub fn from_type(type_name: &str) -> Self {
        match type_name {
            "MultiPoint" => GeometryKind::MultiPoint,
            "MultiLineString" => GeometryKind::MultiLineString,
            "MultiSurface" => GeometryKind::MultiSurface,
            "CompositeSurface" => GeometryKind::CompositeSurface,
            "Solid" => GeometryKind::Solid,
            "MultiSolid" => GeometryKind::MultiSolid,
            "CompositeSolid" => GeometryKind::CompositeSolid,
            "GeometryInstance" => GeometryKind::GeometryInstance,
            _ => GeometryKind::Unknown,
        }
    }

    /// Number of list levels above each polygon, for surface-bearing types
    pub fn depth(&self) -> Option<usize> {
        match self {
            GeometryKind::MultiSurface | GeometryKind::CompositeSurface => Some(1),
            GeometryKind::Solid => Some(2),
            GeometryKind::MultiSolid | GeometryKind::CompositeSolid => Some(3),
            _ => None,
        }
    }

    /// Check if the type has no polygons at all
    pub fn is_unsupported(&self) -> bool {
        matches!(self, GeometryKind::MultiPoint | GeometryKind::MultiLineString)
    }
}

/// Flattened boundaries: index polygons and their semantic surfaces
///
/// Both lists have the same length and the i-th entries come from the same
/// boundary.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlatBoundaries<'a> {
    pub polygons: Vec<IndexPolygon>,
    pub semantics: Vec<Option<&'a SurfaceAttrs>>,
}

impl<'a> FlatBoundaries<'a> {
    /// Number of polygons
    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    /// Check if there are no polygons
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Semantic surface type per polygon
    pub fn surface_types(&self) -> Vec<Option<&'a str>> {
        self.semantics
            .iter()
            .map(|s| s.and_then(|attrs| attrs.get("type")).and_then(Value::as_str))
            .collect()
    }

    fn push(&mut self, polygon: IndexPolygon, semantic: Option<&'a SurfaceAttrs>) {
        self.polygons.push(polygon);
        self.semantics.push(semantic);
    }
}

/// Flatten a boundary array of unknown depth
///
/// `values` is `None` when the geometry has no semantics; `surfaces` and
/// `values` must both be present for a polygon to get a semantic surface.
pub fn read_boundaries<'a>(
    boundaries: &Value,
    surfaces: Option<&'a [Value]>,
    values: Option<&Value>,
) -> Result<FlatBoundaries<'a>> {
    let mut flat = FlatBoundaries::default();
    sniff(boundaries, surfaces, non_null(values), &mut flat)?;
    Ok(flat)
}

/// Flatten a boundary array with a known number of levels above each polygon
pub fn read_boundaries_with_depth<'a>(
    boundaries: &Value,
    depth: usize,
    surfaces: Option<&'a [Value]>,
    values: Option<&Value>,
) -> Result<FlatBoundaries<'a>> {
    let mut flat = FlatBoundaries::default();
    descend(boundaries, depth, surfaces, non_null(values), &mut flat)?;
    Ok(flat)
}

/// Flatten the boundaries of a geometry entry
///
/// Reads `boundaries` and `semantics` and dispatches on the geometry type.
/// A `semantics` object must carry both `surfaces` and `values`.
pub fn read_geometry_boundaries(geometry: &Value) -> Result<FlatBoundaries<'_>> {
    let type_name = geometry
        .get("type")
        .and_then(Value::as_str)
        .ok_or(Error::MissingKey("type"))?;
    let kind = GeometryKind::from_type(type_name);
    if kind.is_unsupported() || kind == GeometryKind::GeometryInstance {
        return Err(Error::unsupported_type(type_name));
    }

    let boundaries = geometry
        .get("boundaries")
        .ok_or(Error::MissingKey("boundaries"))?;

    let (surfaces, values) = match geometry.get("semantics") {
        Some(semantics) => {
            let surfaces = semantics
                .get("surfaces")
                .ok_or(Error::MissingKey("surfaces"))?
                .as_array()
                .ok_or_else(|| Error::invalid_semantics("surfaces is not a list"))?;
            let values = semantics.get("values").ok_or(Error::MissingKey("values"))?;
            (Some(surfaces.as_slice()), Some(values))
        }
        None => (None, None),
    };

    match kind.depth() {
        Some(depth) => read_boundaries_with_depth(boundaries, depth, surfaces, values),
        None => read_boundaries(boundaries, surfaces, values),
    }
}

/// Flatten a per-polygon array of the `semantics` object
///
/// The array nests like `semantics.values`, so it is walked in step with the
/// boundaries of `geometry`: the i-th result belongs to the i-th polygon of
/// [`read_geometry_boundaries`]. A `null` at any level yields `None` for every
/// polygon below it.
pub fn read_surface_values<'v>(geometry: &Value, values: &'v Value) -> Result<Vec<Option<&'v Value>>> {
    let type_name = geometry
        .get("type")
        .and_then(Value::as_str)
        .ok_or(Error::MissingKey("type"))?;
    let boundaries = geometry
        .get("boundaries")
        .ok_or(Error::MissingKey("boundaries"))?;

    let mut out = Vec::new();
    match GeometryKind::from_type(type_name).depth() {
        Some(depth) => descend_values(boundaries, depth, non_null(Some(values)), &mut out)?,
        None => sniff_values(boundaries, non_null(Some(values)), &mut out)?,
    }
    Ok(out)
}

fn non_null(values: Option<&Value>) -> Option<&Value> {
    values.filter(|v| !v.is_null())
}

fn sniff<'a>(
    node: &Value,
    surfaces: Option<&'a [Value]>,
    values: Option<&Value>,
    out: &mut FlatBoundaries<'a>,
) -> Result<()> {
    let items = node
        .as_array()
        .ok_or_else(|| Error::malformed("boundary is not a list"))?;
    let Some(first) = items.first() else {
        return Ok(());
    };
    let leading = first
        .as_array()
        .and_then(|ring| ring.first())
        .ok_or_else(|| Error::malformed("empty ring"))?;

    if leading.is_array() {
        let slots = value_slots(values, items.len())?;
        for (i, child) in items.iter().enumerate() {
            let slot = slots.and_then(|s| non_null(s.get(i)));
            sniff(child, surfaces, slot, out)?;
        }
        Ok(())
    } else {
        let semantic = semantic_for(surfaces, values)?;
        out.push(read_polygon(node)?, semantic);
        Ok(())
    }
}

fn descend<'a>(
    node: &Value,
    depth: usize,
    surfaces: Option<&'a [Value]>,
    values: Option<&Value>,
    out: &mut FlatBoundaries<'a>,
) -> Result<()> {
    if depth == 0 {
        let semantic = semantic_for(surfaces, values)?;
        out.push(read_polygon(node)?, semantic);
        return Ok(());
    }

    let items = node
        .as_array()
        .ok_or_else(|| Error::malformed("boundary is not a list"))?;
    let slots = value_slots(values, items.len())?;
    for (i, child) in items.iter().enumerate() {
        let slot = slots.and_then(|s| non_null(s.get(i)));
        descend(child, depth - 1, surfaces, slot, out)?;
    }
    Ok(())
}

fn descend_values<'v>(
    node: &Value,
    depth: usize,
    values: Option<&'v Value>,
    out: &mut Vec<Option<&'v Value>>,
) -> Result<()> {
    if depth == 0 {
        out.push(values);
        return Ok(());
    }

    let items = node
        .as_array()
        .ok_or_else(|| Error::malformed("boundary is not a list"))?;
    let slots = value_slots(values, items.len())?;
    for (i, child) in items.iter().enumerate() {
        let slot = slots.and_then(|s| non_null(s.get(i)));
        descend_values(child, depth - 1, slot, out)?;
    }
    Ok(())
}

fn sniff_values<'v>(node: &Value, values: Option<&'v Value>, out: &mut Vec<Option<&'v Value>>) -> Result<()> {
    let items = node
        .as_array()
        .ok_or_else(|| Error::malformed("boundary is not a list"))?;
    let Some(first) = items.first() else {
        return Ok(());
    };
    let leading = first
        .as_array()
        .and_then(|ring| ring.first())
        .ok_or_else(|| Error::malformed("empty ring"))?;

    if !leading.is_array() {
        out.push(values);
        return Ok(());
    }
    let slots = value_slots(values, items.len())?;
    for (i, child) in items.iter().enumerate() {
        let slot = slots.and_then(|s| non_null(s.get(i)));
        sniff_values(child, slot, out)?;
    }
    Ok(())
}

/// Values list for the children of one boundary level
fn value_slots(values: Option<&Value>, expected: usize) -> Result<Option<&Vec<Value>>> {
    let Some(values) = values else {
        return Ok(None);
    };
    let slots = values
        .as_array()
        .ok_or_else(|| Error::invalid_semantics("values is not a list where boundaries are"))?;
    if slots.len() < expected {
        return Err(Error::invalid_semantics(format!(
            "{} values for {} boundaries",
            slots.len(),
            expected
        )));
    }
    Ok(Some(slots))
}

/// Semantic surface of one polygon
fn semantic_for<'a>(surfaces: Option<&'a [Value]>, value: Option<&Value>) -> Result<Option<&'a SurfaceAttrs>> {
    let (Some(surfaces), Some(value)) = (surfaces, value) else {
        return Ok(None);
    };
    let index = value
        .as_u64()
        .ok_or_else(|| Error::invalid_semantics(format!("expected a surface index, found {}", value)))?
        as usize;
    let surface = surfaces.get(index).ok_or_else(|| {
        Error::invalid_semantics(format!(
            "surface index {} out of range ({} surfaces)",
            index,
            surfaces.len()
        ))
    })?;
    surface
        .as_object()
        .map(Some)
        .ok_or_else(|| Error::invalid_semantics("surface is not an object"))
}

fn read_polygon(node: &Value) -> Result<IndexPolygon> {
    let rings = node
        .as_array()
        .ok_or_else(|| Error::malformed("polygon is not a list"))?;
    if rings.is_empty() {
        return Err(Error::malformed("polygon without rings"));
    }
    rings.iter().map(read_ring).collect()
}

fn read_ring(node: &Value) -> Result<IndexRing> {
    let indices = node
        .as_array()
        .ok_or_else(|| Error::malformed("ring is not a list"))?;
    if indices.is_empty() {
        return Err(Error::malformed("empty ring"));
    }
    indices
        .iter()
        .map(|i| {
            i.as_u64()
                .map(|i| i as usize)
                .ok_or_else(|| Error::malformed(format!("invalid vertex index {}", i)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use serde_json::json;

    fn flatten(geometry: &Value) -> FlatBoundaries<'_> {
        read_geometry_boundaries(geometry).unwrap()
    }

    fn sniffed(geometry: &Value) -> FlatBoundaries<'_> {
        let semantics = geometry.get("semantics");
        read_boundaries(
            &geometry["boundaries"],
            semantics
                .and_then(|s| s.get("surfaces"))
                .and_then(Value::as_array)
                .map(Vec::as_slice),
            semantics.and_then(|s| s.get("values")),
        )
        .unwrap()
    }

    #[test]
    fn test_multisurface_semantics() {
        let geometry = fixtures::multisurface_with_semantics();
        let flat = flatten(&geometry);

        assert_eq!(flat.len(), 5);
        assert_eq!(flat.semantics.len(), 5);
        assert_eq!(flat.polygons[0], vec![vec![0, 3, 2, 1]]);
        assert_eq!(
            flat.surface_types(),
            vec![
                Some("WallSurface"),
                Some("WallSurface"),
                None,
                Some("RoofSurface"),
                Some("Door")
            ]
        );
    }

    #[test]
    fn test_solid_with_semantics() {
        let geometry = fixtures::solid_with_semantics();
        let flat = flatten(&geometry);

        assert_eq!(flat.len(), 8);
        assert_eq!(
            flat.surface_types(),
            vec![
                Some("RoofSurface"),
                Some("WallSurface"),
                Some("WallSurface"),
                None,
                None,
                None,
                None,
                None
            ]
        );
    }

    #[test]
    fn test_composite_solid() {
        let geometry = fixtures::composite_solid();
        let flat = flatten(&geometry);

        assert_eq!(flat.len(), 12);
        assert!(flat.semantics.iter().all(Option::is_none));
        assert_eq!(flat.polygons[4], vec![vec![240, 243, 124]]);
        assert_eq!(flat.polygons[8], vec![vec![666, 667, 668]]);
    }

    #[test]
    fn test_sniffing_matches_depth() {
        for geometry in [
            fixtures::multisurface_with_semantics(),
            fixtures::solid_with_semantics(),
            fixtures::composite_solid(),
        ] {
            assert_eq!(sniffed(&geometry), flatten(&geometry));
        }
    }

    #[test]
    fn test_without_semantics() {
        let geometry = json!({"type": "MultiSurface", "boundaries": [[[0, 1, 2]], [[1, 2, 3]]]});
        let flat = flatten(&geometry);
        assert_eq!(flat.polygons, vec![vec![vec![0, 1, 2]], vec![vec![1, 2, 3]]]);
        assert_eq!(flat.semantics, vec![None, None]);
    }

    #[test]
    fn test_unknown_type_is_sniffed() {
        let geometry = json!({"type": "FutureSolid", "boundaries": [[[[0, 1, 2]], [[1, 2, 3]]]]});
        assert_eq!(flatten(&geometry).len(), 2);
    }

    #[test]
    fn test_short_values_is_error() {
        let geometry = json!({
            "type": "MultiSurface",
            "boundaries": [[[0, 1, 2]], [[1, 2, 3]]],
            "semantics": {"surfaces": [{"type": "WallSurface"}], "values": [0]}
        });
        assert!(matches!(
            read_geometry_boundaries(&geometry),
            Err(Error::InvalidSemantics(_))
        ));
    }

    #[test]
    fn test_surface_index_out_of_range() {
        let geometry = json!({
            "type": "MultiSurface",
            "boundaries": [[[0, 1, 2]]],
            "semantics": {"surfaces": [{"type": "WallSurface"}], "values": [3]}
        });
        assert!(read_geometry_boundaries(&geometry).is_err());
    }

    #[test]
    fn test_missing_values_is_error() {
        let geometry = json!({
            "type": "MultiSurface",
            "boundaries": [[[0, 1, 2]]],
            "semantics": {"surfaces": [{"type": "WallSurface"}]}
        });
        assert!(matches!(
            read_geometry_boundaries(&geometry),
            Err(Error::MissingKey("values"))
        ));
    }

    #[test]
    fn test_malformed_boundaries() {
        let geometry = json!({"type": "MultiSurface", "boundaries": [[[0, "a", 2]]]});
        assert!(matches!(
            read_geometry_boundaries(&geometry),
            Err(Error::MalformedBoundaries(_))
        ));

        let geometry = json!({"type": "Solid", "boundaries": [[[0, 1, 2]]]});
        assert!(read_geometry_boundaries(&geometry).is_err());
    }

    #[test]
    fn test_surface_values_follow_solid_nesting() {
        let geometry = json!({
            "type": "Solid",
            "boundaries": [[[[0, 1, 2]], [[1, 2, 3]]], [[[2, 3, 4]]]],
            "semantics": {
                "surfaces": [{"type": "WallSurface"}],
                "values": [[0, 0], null],
                "azimuth": [[90, 180], null]
            }
        });
        let azimuth = read_surface_values(&geometry, &geometry["semantics"]["azimuth"]).unwrap();

        assert_eq!(azimuth, vec![Some(&json!(90)), Some(&json!(180)), None]);
        assert_eq!(azimuth.len(), flatten(&geometry).len());
    }

    #[test]
    fn test_surface_values_of_unknown_type() {
        let geometry = json!({"type": "FutureSolid", "boundaries": [[[[0, 1, 2]], [[1, 2, 3]]]]});
        let values = json!([[1, 2]]);
        assert_eq!(
            read_surface_values(&geometry, &values).unwrap(),
            vec![Some(&json!(1)), Some(&json!(2))]
        );
    }

    #[test]
    fn test_flat_surface_values_on_solid_is_error() {
        let geometry = json!({"type": "Solid", "boundaries": [[[[0, 1, 2]], [[1, 2, 3]]]]});
        let values = json!([90, 180]);
        assert!(matches!(
            read_surface_values(&geometry, &values),
            Err(Error::InvalidSemantics(_))
        ));
    }

    #[test]
    fn test_point_geometries_unsupported() {
        let geometry = json!({"type": "MultiPoint", "boundaries": [0, 1]});
        assert!(matches!(
            read_geometry_boundaries(&geometry),
            Err(Error::UnsupportedType(_))
        ));
    }
}
