// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry Reader - resolves geometry entries into coordinate polygons
//!
//! Handles LoD filtering, geometry-template instancing and the per-entry
//! failure policy: an entry that cannot be read is counted and dropped, the
//! other entries of the same call are unaffected.

use crate::boundaries::{read_geometry_boundaries, read_surface_values};
use crate::{
    polygon, Error, MultiPolygon, Result, RingSet, TransformedVertexResolver, VertexCache,
    VertexResolver,
};
use cityjson_lite_model::{CityModel, GeometryTemplates, LodFilter, LodValue, SurfaceAttrs};
use nalgebra::Point3;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

/// Semantic keys that never come from a per-polygon array
const RESERVED_SURFACE_KEYS: &[&str] = &["type", "on_footprint_edge"];

/// Polygons of a set of geometry entries with their semantic surfaces
pub type PolygonsWithSemantics = (Vec<RingSet>, Vec<Option<SurfaceAttrs>>);

/// Reads CityJSON geometry entries
///
/// Owns the resolved vertices of the model. The template vertex cache is
/// built on the first instance that needs it and shared by every instance.
/// The reader is `Sync`, so one reader can serve parallel object processing.
pub struct GeometryReader<'a> {
    vertices: VertexCache,
    templates: Option<&'a GeometryTemplates>,
    template_vertices: OnceLock<Arc<VertexCache>>,
    lod_filter: LodFilter,
    skipped: AtomicUsize,
}

impl<'a> GeometryReader<'a> {
    /// Create a reader over a vertex cache, without templates
    pub fn new(vertices: VertexCache) -> Self {
        Self {
            vertices,
            templates: None,
            template_vertices: OnceLock::new(),
            lod_filter: LodFilter::All,
            skipped: AtomicUsize::new(0),
        }
    }

    /// Create a reader for a model (vertices, transform and templates)
    pub fn from_model(model: &'a CityModel) -> Self {
        Self::new(VertexCache::from_model(model))
            .with_geometry_templates(model.geometry_templates.as_ref())
    }

    /// Set the geometry templates used by instances
    pub fn with_geometry_templates(mut self, templates: Option<&'a GeometryTemplates>) -> Self {
        self.templates = templates;
        self.template_vertices = OnceLock::new();
        self
    }

    /// Set the active LoD selection
    pub fn with_lod_filter(mut self, filter: LodFilter) -> Self {
        self.lod_filter = filter;
        self
    }

    /// The active LoD selection
    pub fn lod_filter(&self) -> &LodFilter {
        &self.lod_filter
    }

    /// The model's resolved vertices
    pub fn vertices(&self) -> &VertexCache {
        &self.vertices
    }

    /// LoD of a geometry entry
    ///
    /// An instance takes the LoD of its template; any `lod` on the instance
    /// itself is ignored.
    pub fn get_lod(&self, geometry: &Value) -> Option<LodValue> {
        if geometry.get("type").and_then(Value::as_str) == Some("GeometryInstance") {
            let index = geometry.get("template").and_then(Value::as_u64)? as usize;
            return self.templates?.template_lod(index);
        }
        geometry.get("lod").and_then(LodValue::from_json)
    }

    /// Check if any of `geometries` has the `target` LoD (`All` always does)
    pub fn has_lod(&self, geometries: &[Value], target: &LodFilter) -> bool {
        match target {
            LodFilter::All => true,
            LodFilter::Only(_) => geometries
                .iter()
                .any(|g| target.matches(self.get_lod(g).as_ref())),
        }
    }

    /// Check if a geometry entry passes the active LoD selection
    pub fn accepts(&self, geometry: &Value) -> bool {
        self.lod_filter.matches(self.get_lod(geometry).as_ref())
    }

    /// Resolve geometry entries into coordinate polygons with semantics
    ///
    /// Entries outside the active LoD selection are ignored. Entries that fail
    /// are counted in [`skipped_count`](Self::skipped_count) and left out.
    /// `surface_keys` names extra per-polygon arrays of the `semantics` object
    /// to merge into each polygon's semantic surface.
    pub fn get_polygons<'g, I>(&self, geometries: I, surface_keys: &[String]) -> PolygonsWithSemantics
    where
        I: IntoIterator<Item = &'g Value>,
    {
        let mut polygons = Vec::new();
        let mut semantics = Vec::new();

        for geometry in geometries {
            if !self.accepts(geometry) {
                continue;
            }

            match self.read_entry(geometry, surface_keys) {
                Ok((entry_polygons, entry_semantics)) => {
                    polygons.extend(entry_polygons);
                    semantics.extend(entry_semantics);
                }
                Err(e) => {
                    self.skipped.fetch_add(1, Ordering::Relaxed);
                    log::debug!(
                        "Skipping {} geometry: {}",
                        geometry.get("type").and_then(Value::as_str).unwrap_or("untyped"),
                        e
                    );
                }
            }
        }

        (polygons, semantics)
    }

    /// Resolve geometry entries into a multi-polygon, discarding semantics
    pub fn read_geometry<'g, I>(&self, geometries: I) -> MultiPolygon
    where
        I: IntoIterator<Item = &'g Value>,
    {
        let (polygons, _) = self.get_polygons(geometries, &[]);
        self.polygons_to_geometry(polygons)
    }

    /// Build a multi-polygon from resolved ring sets
    pub fn polygons_to_geometry(&self, polygons: Vec<RingSet>) -> MultiPolygon {
        polygon::polygons_to_geometry(polygons)
    }

    /// Number of entries dropped so far
    pub fn skipped_count(&self) -> usize {
        self.skipped.load(Ordering::Relaxed)
    }

    fn read_entry(&self, geometry: &Value, surface_keys: &[String]) -> Result<PolygonsWithSemantics> {
        if geometry.get("type").and_then(Value::as_str) != Some("GeometryInstance") {
            return resolve_entry(geometry, &self.vertices, surface_keys);
        }

        let templates = self.templates.ok_or(Error::MissingTemplates)?;
        let index = geometry
            .get("template")
            .and_then(Value::as_u64)
            .ok_or(Error::MissingKey("template"))? as usize;
        let template = templates
            .templates
            .get(index)
            .ok_or(Error::UnknownTemplate(index))?;

        let anchor = self.instance_anchor(geometry)?;
        let cache = self
            .template_vertices
            .get_or_init(|| Arc::new(VertexCache::from_vertices(&templates.vertices, None)));
        let resolver = TransformedVertexResolver::from_anchor(cache.as_ref(), anchor);

        resolve_entry(template, &resolver, surface_keys)
    }

    /// World position of an instance's reference point
    fn instance_anchor(&self, geometry: &Value) -> Result<Point3<f64>> {
        let anchor = geometry
            .get("boundaries")
            .ok_or(Error::MissingKey("boundaries"))?
            .get(0)
            .and_then(Value::as_u64)
            .ok_or_else(|| Error::malformed("instance boundaries must hold one vertex index"))?;

        if let Some(matrix) = geometry.get("transformationMatrix") {
            if !is_identity_matrix(matrix) {
                log::warn!("Ignoring rotation and scale of a geometry instance; only its anchor is applied");
            }
        }

        self.vertices.resolve(anchor as usize)
    }
}

/// Flatten one entry and resolve it through `resolver`
fn resolve_entry<R: VertexResolver + ?Sized>(
    geometry: &Value,
    resolver: &R,
    surface_keys: &[String],
) -> Result<PolygonsWithSemantics> {
    let flat = read_geometry_boundaries(geometry)?;

    let polygons = flat
        .polygons
        .iter()
        .map(|p| resolver.resolve_polygon(p))
        .collect::<Result<Vec<_>>>()?;
    let mut semantics: Vec<Option<SurfaceAttrs>> =
        flat.semantics.into_iter().map(|s| s.cloned()).collect();

    merge_surface_keys(geometry, surface_keys, &mut semantics)?;
    Ok((polygons, semantics))
}

/// Merge the `semantics[key]` value of each polygon into its semantic surface
fn merge_surface_keys(
    geometry: &Value,
    surface_keys: &[String],
    semantics: &mut [Option<SurfaceAttrs>],
) -> Result<()> {
    let Some(source) = geometry.get("semantics") else {
        return Ok(());
    };

    for key in surface_keys {
        if RESERVED_SURFACE_KEYS.contains(&key.as_str()) {
            continue;
        }
        let Some(values) = source.get(key.as_str()) else {
            continue;
        };
        let values = read_surface_values(geometry, values)?;
        if values.len() != semantics.len() {
            return Err(Error::invalid_semantics(format!(
                "{} has {} values for {} polygons",
                key,
                values.len(),
                semantics.len()
            )));
        }

        for (surface, value) in semantics.iter_mut().zip(values) {
            if let (Some(surface), Some(value)) = (surface, value) {
                surface.insert(key.clone(), value.clone());
            }
        }
    }
    Ok(())
}

fn is_identity_matrix(matrix: &Value) -> bool {
    let Some(values) = matrix.as_array() else {
        return false;
    };
    values.len() == 16
        && values.iter().enumerate().all(|(i, v)| {
            let expected = if i % 5 == 0 { 1.0 } else { 0.0 };
            v.as_f64().map(|v| (v - expected).abs() < 1e-12).unwrap_or(false)
        })
}
