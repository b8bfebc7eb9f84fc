// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Index-space and coordinate-space polygons

use nalgebra::Point3;
use std::fmt::Write;

/// Ring of vertex indices
pub type IndexRing = Vec<usize>;

/// Polygon of index rings (ring 0 is the exterior)
pub type IndexPolygon = Vec<IndexRing>;

/// Ring of resolved points
pub type Ring = Vec<Point3<f64>>;

/// Resolved polygon as a list of rings (ring 0 is the exterior)
pub type RingSet = Vec<Ring>;

/// Polygon with an exterior ring and holes
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polygon {
    pub exterior: Ring,
    pub interiors: Vec<Ring>,
}

impl Polygon {
    /// Build a polygon from its rings; `None` if there are no rings
    pub fn from_rings(rings: RingSet) -> Option<Self> {
        let mut rings = rings.into_iter();
        let exterior = rings.next()?;
        Some(Self {
            exterior,
            interiors: rings.collect(),
        })
    }

    /// Iterate all rings, exterior first
    pub fn rings(&self) -> impl Iterator<Item = &Ring> {
        std::iter::once(&self.exterior).chain(self.interiors.iter())
    }

    /// Total number of points over all rings
    pub fn point_count(&self) -> usize {
        self.rings().map(Vec::len).sum()
    }
}

/// Collection of polygons, the geometry of every emitted feature
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MultiPolygon {
    polygons: Vec<Polygon>,
}

impl MultiPolygon {
    /// Create an empty multi-polygon
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a polygon
    pub fn push(&mut self, polygon: Polygon) {
        self.polygons.push(polygon);
    }

    /// Number of polygons
    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    /// Check if there are no polygons
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Iterate polygons
    pub fn iter(&self) -> impl Iterator<Item = &Polygon> {
        self.polygons.iter()
    }

    /// Polygons as a slice
    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    /// Well-known text (`MULTIPOLYGON Z`), rings closed on output
    pub fn to_wkt(&self) -> String {
        if self.polygons.is_empty() {
            return "MULTIPOLYGON Z EMPTY".to_string();
        }

        let mut wkt = String::from("MULTIPOLYGON Z (");
        for (p, polygon) in self.polygons.iter().enumerate() {
            if p > 0 {
                wkt.push_str(", ");
            }
            wkt.push('(');
            for (r, ring) in polygon.rings().enumerate() {
                if r > 0 {
                    wkt.push_str(", ");
                }
                write_ring(&mut wkt, ring);
            }
            wkt.push(')');
        }
        wkt.push(')');
        wkt
    }
}

fn write_ring(wkt: &mut String, ring: &Ring) {
    wkt.push('(');
    let closing = match (ring.first(), ring.last()) {
        (Some(first), Some(last)) if first != last => Some(first),
        _ => None,
    };
    for (i, p) in ring.iter().chain(closing).enumerate() {
        if i > 0 {
            wkt.push_str(", ");
        }
        let _ = write!(wkt, "{} {} {}", p.x, p.y, p.z);
    }
    wkt.push(')');
}

impl FromIterator<Polygon> for MultiPolygon {
    fn from_iter<I: IntoIterator<Item = Polygon>>(iter: I) -> Self {
        Self {
            polygons: iter.into_iter().collect(),
        }
    }
}

/// Build a multi-polygon from resolved ring sets
///
/// Ring 0 of each entry is the exterior, the others are holes. Entries
/// without rings are dropped.
pub fn polygons_to_geometry(polygons: impl IntoIterator<Item = RingSet>) -> MultiPolygon {
    polygons.into_iter().filter_map(Polygon::from_rings).collect()
}
