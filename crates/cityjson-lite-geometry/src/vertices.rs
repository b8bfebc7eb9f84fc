// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Vertex resolution
//!
//! A [`VertexCache`] converts raw vertices to real-world coordinates once, at
//! insertion. A [`TransformedVertexResolver`] borrows a resolver and shifts
//! every point by a fixed translation, which is how template geometries are
//! placed at their anchor points.

use crate::{Error, IndexPolygon, Result, Ring, RingSet};
use cityjson_lite_model::{CityModel, Transform};
use nalgebra::{Point3, Vector3};

/// Index to coordinate lookup
pub trait VertexResolver: Send + Sync {
    /// Resolve a vertex index to a real-world point
    fn resolve(&self, index: usize) -> Result<Point3<f64>>;

    /// Number of vertices
    fn len(&self) -> usize;

    /// Check if there are no vertices
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve a ring of indices
    fn resolve_ring(&self, ring: &[usize]) -> Result<Ring> {
        ring.iter().map(|&index| self.resolve(index)).collect()
    }

    /// Resolve every ring of an index polygon
    fn resolve_polygon(&self, polygon: &IndexPolygon) -> Result<RingSet> {
        polygon.iter().map(|ring| self.resolve_ring(ring)).collect()
    }
}

/// Resolved vertex array with its scale/translate transform
#[derive(Clone, Debug)]
pub struct VertexCache {
    points: Vec<Point3<f64>>,
    scale: Vector3<f64>,
    translation: Vector3<f64>,
}

impl Default for VertexCache {
    fn default() -> Self {
        Self::new()
    }
}

impl VertexCache {
    /// Create an empty cache with the identity transform
    pub fn new() -> Self {
        Self {
            points: Vec::new(),
            scale: Vector3::new(1.0, 1.0, 1.0),
            translation: Vector3::zeros(),
        }
    }

    /// Create an empty cache with a scale and translation
    pub fn with_transform(scale: [f64; 3], translate: [f64; 3]) -> Self {
        Self {
            points: Vec::new(),
            scale: Vector3::from(scale),
            translation: Vector3::from(translate),
        }
    }

    /// Create a cache from raw vertices (identity when `transform` is `None`)
    pub fn from_vertices(vertices: &[[f64; 3]], transform: Option<&Transform>) -> Self {
        let transform = transform.copied().unwrap_or_default();
        let mut cache = Self::with_transform(transform.scale, transform.translate);
        cache.extend(vertices);
        cache
    }

    /// Create the cache of a model's own vertices
    pub fn from_model(model: &CityModel) -> Self {
        Self::from_vertices(&model.vertices, model.transform.as_ref())
    }

    /// Set the scale applied to vertices added from now on
    pub fn set_scale(&mut self, scale: [f64; 3]) {
        self.scale = Vector3::from(scale);
    }

    /// Set the translation applied to vertices added from now on
    pub fn set_translation(&mut self, translate: [f64; 3]) {
        self.translation = Vector3::from(translate);
    }

    /// Convert and append a raw vertex
    #[inline]
    pub fn add_vertex(&mut self, vertex: [f64; 3]) {
        let raw = Vector3::from(vertex);
        self.points
            .push(Point3::from(raw.component_mul(&self.scale) + self.translation));
    }

    /// Convert and append raw vertices
    pub fn extend(&mut self, vertices: &[[f64; 3]]) {
        self.points.reserve(vertices.len());
        for vertex in vertices {
            self.add_vertex(*vertex);
        }
    }

    /// Resolved points
    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }
}

impl VertexResolver for VertexCache {
    #[inline]
    fn resolve(&self, index: usize) -> Result<Point3<f64>> {
        self.points
            .get(index)
            .copied()
            .ok_or_else(|| Error::index_out_of_range(index, self.points.len()))
    }

    fn len(&self) -> usize {
        self.points.len()
    }
}

/// Resolver that shifts another resolver's points by a translation
///
/// Holds only a borrow of the base resolver. Rotation and scale are not
/// applied.
#[derive(Debug)]
pub struct TransformedVertexResolver<'a, R: VertexResolver + ?Sized> {
    base: &'a R,
    translation: Vector3<f64>,
}

impl<'a, R: VertexResolver + ?Sized> TransformedVertexResolver<'a, R> {
    /// Wrap `base` with a translation
    pub fn new(base: &'a R, translation: Vector3<f64>) -> Self {
        Self { base, translation }
    }

    /// Wrap `base` so that its origin lands on `anchor`
    pub fn from_anchor(base: &'a R, anchor: Point3<f64>) -> Self {
        Self::new(base, anchor.coords)
    }

    /// The translation added to every point
    pub fn translation(&self) -> Vector3<f64> {
        self.translation
    }
}

impl<R: VertexResolver + ?Sized> VertexResolver for TransformedVertexResolver<'_, R> {
    #[inline]
    fn resolve(&self, index: usize) -> Result<Point3<f64>> {
        Ok(self.base.resolve(index)? + self.translation)
    }

    fn len(&self) -> usize {
        self.base.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_scale_and_translate() {
        let mut cache = VertexCache::with_transform([2.0, 2.0, 2.0], [1.0, 1.0, 1.0]);
        cache.add_vertex([1.0, 1.0, 1.0]);

        let p = cache.resolve(0).unwrap();
        assert_relative_eq!(p.x, 3.0);
        assert_relative_eq!(p.y, 3.0);
        assert_relative_eq!(p.z, 3.0);
    }

    #[test]
    fn test_identity_default() {
        let cache = VertexCache::from_vertices(&[[4.0, 5.0, 6.0]], None);
        assert_eq!(cache.resolve(0).unwrap(), Point3::new(4.0, 5.0, 6.0));
    }

    #[test]
    fn test_transform_set_before_insertion() {
        let mut cache = VertexCache::new();
        cache.set_scale([0.5, 0.5, 0.5]);
        cache.set_translation([10.0, 0.0, 0.0]);
        cache.add_vertex([2.0, 4.0, 6.0]);

        assert_eq!(cache.resolve(0).unwrap(), Point3::new(11.0, 2.0, 3.0));
    }

    #[test]
    fn test_index_out_of_range() {
        let cache = VertexCache::from_vertices(&[[0.0, 0.0, 0.0]], None);
        let err = cache.resolve(1).unwrap_err();
        assert!(matches!(err, Error::IndexOutOfRange { index: 1, len: 1 }));
        assert!(cache.resolve_ring(&[0, 0, 3]).is_err());
    }

    #[test]
    fn test_transformed_resolver_adds_translation() {
        let cache = VertexCache::from_vertices(&[[1.0, 2.0, 3.0], [-1.0, 0.5, 0.0]], None);

        for translation in [Vector3::new(10.0, -5.0, 2.5), Vector3::zeros()] {
            let moved = TransformedVertexResolver::new(&cache, translation);
            for i in 0..cache.len() {
                assert_eq!(
                    moved.resolve(i).unwrap(),
                    cache.resolve(i).unwrap() + translation
                );
            }
        }
    }

    #[test]
    fn test_transformed_resolver_over_trait_object() {
        let cache = VertexCache::from_vertices(&[[0.0, 0.0, 0.0]], None);
        let base: &dyn VertexResolver = &cache;
        let moved = TransformedVertexResolver::from_anchor(base, Point3::new(1.0, 2.0, 3.0));

        assert_eq!(moved.resolve(0).unwrap(), Point3::new(1.0, 2.0, 3.0));
        assert!(moved.resolve(1).is_err());
        assert_eq!(moved.len(), 1);
    }
}
