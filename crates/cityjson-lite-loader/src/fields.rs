// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Field schema derivation
//!
//! Every stage that depends on the model scans it once at construction, so
//! the schema is complete before the first feature is built. Keys keep the
//! order in which they are first met, walking objects in document order.

use crate::feature::{
    ATTRIBUTE_PREFIX, CHILDREN_FIELD, LOD_FIELD, PARENTS_FIELD, SEMANTIC_SURFACE_FIELD,
    SURFACE_PREFIX, TYPE_FIELD, UID_FIELD,
};
use cityjson_lite_model::{CityModel, FieldSchema};
use rustc_hash::FxHashSet;
use serde_json::Value;

/// Surface keys that never become fields
pub(crate) const EXCLUDED_SURFACE_KEYS: &[&str] = &["type", "parent", "children"];

/// Semantic keys that are not per-polygon attribute arrays
const RESERVED_SEMANTIC_KEYS: &[&str] = &["type", "on_footprint_edge"];

/// One group of fields
pub trait FieldStage: Send + Sync {
    /// Append this stage's fields
    fn extend(&self, schema: &mut FieldSchema);
}

/// Ordered field stages
#[derive(Default)]
pub struct FieldSchemaBuilder {
    stages: Vec<Box<dyn FieldStage>>,
}

impl FieldSchemaBuilder {
    /// Builder without any stage
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage
    pub fn with_stage(mut self, stage: impl FieldStage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Run every stage in order
    pub fn build(&self) -> FieldSchema {
        let mut schema = FieldSchema::new();
        for stage in &self.stages {
            stage.extend(&mut schema);
        }
        schema
    }
}

/// `uid`, `type`, `parents`, `children`
#[derive(Clone, Copy, Debug, Default)]
pub struct BaseFields;

impl FieldStage for BaseFields {
    fn extend(&self, schema: &mut FieldSchema) {
        for name in [UID_FIELD, TYPE_FIELD, PARENTS_FIELD, CHILDREN_FIELD] {
            schema.push_string(name);
        }
    }
}

/// `attribute.<key>` for every attribute key of every object
#[derive(Clone, Debug, Default)]
pub struct AttributeFields {
    keys: Vec<String>,
}

impl AttributeFields {
    /// Collect attribute keys across all objects
    pub fn from_model(model: &CityModel) -> Self {
        let mut keys: Vec<String> = Vec::new();
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        for object in model.city_objects.values() {
            for key in object.attributes.keys() {
                push_unique(&mut keys, &mut seen, key);
            }
        }
        Self { keys }
    }

    /// Discovered keys, without prefix
    pub fn keys(&self) -> &[String] {
        &self.keys
    }
}

impl FieldStage for AttributeFields {
    fn extend(&self, schema: &mut FieldSchema) {
        for key in &self.keys {
            schema.push_string(format!("{}{}", ATTRIBUTE_PREFIX, key));
        }
    }
}

/// `lod`
#[derive(Clone, Copy, Debug, Default)]
pub struct LodField;

impl FieldStage for LodField {
    fn extend(&self, schema: &mut FieldSchema) {
        schema.push_string(LOD_FIELD);
    }
}

/// `semantic_surface`
#[derive(Clone, Copy, Debug, Default)]
pub struct SemanticSurfaceField;

impl FieldStage for SemanticSurfaceField {
    fn extend(&self, schema: &mut FieldSchema) {
        schema.push_string(SEMANTIC_SURFACE_FIELD);
    }
}

/// `surface.<key>` for every semantic surface attribute in the model
///
/// Scans the surfaces of object geometries and of templates, then adds the
/// requested per-polygon keys.
#[derive(Clone, Debug, Default)]
pub struct SurfaceAttributeFields {
    keys: Vec<String>,
}

impl SurfaceAttributeFields {
    /// Collect surface keys across all geometries
    pub fn from_model(model: &CityModel, extra_keys: &[String]) -> Self {
        let mut keys: Vec<String> = Vec::new();
        let mut seen: FxHashSet<&str> = FxHashSet::default();

        let object_geometries = model.city_objects.values().flat_map(|obj| obj.geometry.iter());
        let template_geometries = model
            .geometry_templates
            .iter()
            .flat_map(|t| t.templates.iter());

        for geometry in object_geometries.chain(template_geometries) {
            let surfaces = geometry
                .get("semantics")
                .and_then(|s| s.get("surfaces"))
                .and_then(Value::as_array);
            for surface in surfaces.into_iter().flatten().filter_map(Value::as_object) {
                for key in surface.keys() {
                    if !EXCLUDED_SURFACE_KEYS.contains(&key.as_str()) {
                        push_unique(&mut keys, &mut seen, key);
                    }
                }
            }
        }

        for key in extra_keys {
            if !RESERVED_SEMANTIC_KEYS.contains(&key.as_str()) {
                push_unique(&mut keys, &mut seen, key);
            }
        }

        Self { keys }
    }

    /// Discovered keys, without prefix
    pub fn keys(&self) -> &[String] {
        &self.keys
    }
}

impl FieldStage for SurfaceAttributeFields {
    fn extend(&self, schema: &mut FieldSchema) {
        for key in &self.keys {
            schema.push_string(format!("{}{}", SURFACE_PREFIX, key));
        }
    }
}

/// Append `key` unless already collected, keeping first-seen order
fn push_unique<'m>(keys: &mut Vec<String>, seen: &mut FxHashSet<&'m str>, key: &'m str) {
    if seen.insert(key) {
        keys.push(key.to_string());
    }
}
