// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Feature records and the drafts they are built from

use cityjson_lite_geometry::{GeometryReader, MultiPolygon, RingSet};
use cityjson_lite_model::{CityObject, LodValue, ObjectId};
use serde_json::Value;
use std::collections::BTreeMap;

/// Name of the id field
pub const UID_FIELD: &str = "uid";
/// Name of the object type field
pub const TYPE_FIELD: &str = "type";
/// Name of the parents field
pub const PARENTS_FIELD: &str = "parents";
/// Name of the children field
pub const CHILDREN_FIELD: &str = "children";
/// Name of the LoD field
pub const LOD_FIELD: &str = "lod";
/// Name of the semantic surface field
pub const SEMANTIC_SURFACE_FIELD: &str = "semantic_surface";

/// Prefix of object attribute fields
pub const ATTRIBUTE_PREFIX: &str = "attribute.";
/// Prefix of semantic surface attribute fields
pub const SURFACE_PREFIX: &str = "surface.";

/// Emitted unit: one row of an output collection
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureRecord {
    /// Id of the source city object
    pub uid: ObjectId,
    /// Type of the source city object
    pub object_type: String,
    /// Other field values by field name
    pub attributes: BTreeMap<String, String>,
    /// Resolved geometry
    pub geometry: MultiPolygon,
    /// Semantic surface type (`"None"` for polygons without semantics)
    pub semantic_surface: Option<String>,
    /// LoD of the geometry entries this record was built from
    pub lod: Option<LodValue>,
}

impl FeatureRecord {
    /// Value of a field, by field name
    pub fn value(&self, field: &str) -> Option<&str> {
        match field {
            UID_FIELD => Some(self.uid.as_str()),
            TYPE_FIELD => Some(&self.object_type),
            LOD_FIELD => self.lod.as_ref().map(LodValue::as_str),
            SEMANTIC_SURFACE_FIELD => self.semantic_surface.as_deref(),
            _ => self.attributes.get(field).map(String::as_str),
        }
    }
}

/// Geometry of a draft before resolution
#[derive(Clone, Debug, PartialEq)]
pub enum DraftGeometry {
    /// Indices into the object's geometry entries, still unresolved
    Entries(Vec<usize>),
    /// Polygons already resolved by a semantic split
    Polygons(Vec<RingSet>),
}

/// Feature under construction, passed through the feature stages
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureDraft {
    pub uid: ObjectId,
    pub object_type: String,
    pub attributes: BTreeMap<String, String>,
    pub geometry: DraftGeometry,
    pub semantic_surface: Option<String>,
    pub lod: Option<LodValue>,
}

impl FeatureDraft {
    /// One draft for the whole object: id, type, relations and attributes
    pub fn base(uid: &ObjectId, object: &CityObject) -> Self {
        let mut attributes = BTreeMap::new();

        for (key, value) in &object.attributes {
            if let Some(text) = value_to_field(value) {
                attributes.insert(format!("{}{}", ATTRIBUTE_PREFIX, key), text);
            }
        }
        if !object.parents.is_empty() {
            attributes.insert(PARENTS_FIELD.to_string(), join_ids(&object.parents));
        }
        if !object.children.is_empty() {
            attributes.insert(CHILDREN_FIELD.to_string(), join_ids(&object.children));
        }

        Self {
            uid: uid.clone(),
            object_type: object.object_type.clone(),
            attributes,
            geometry: DraftGeometry::Entries((0..object.geometry.len()).collect()),
            semantic_surface: None,
            lod: None,
        }
    }

    /// Copy of this draft with other geometry
    pub fn with_geometry(&self, geometry: DraftGeometry) -> Self {
        Self {
            geometry,
            ..self.clone()
        }
    }

    /// Resolve the geometry and produce the record
    pub fn finalize(self, object: &CityObject, reader: &GeometryReader<'_>) -> FeatureRecord {
        let geometry = match self.geometry {
            DraftGeometry::Entries(indices) => {
                reader.read_geometry(indices.iter().filter_map(|&i| object.geometry.get(i)))
            }
            DraftGeometry::Polygons(polygons) => reader.polygons_to_geometry(polygons),
        };

        FeatureRecord {
            uid: self.uid,
            object_type: self.object_type,
            attributes: self.attributes,
            geometry,
            semantic_surface: self.semantic_surface,
            lod: self.lod,
        }
    }
}

/// Text of an attribute value, `None` for `null`
///
/// Strings are taken verbatim, everything else as compact JSON.
pub fn value_to_field(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn join_ids(ids: &[ObjectId]) -> String {
    ids.iter().map(ObjectId::as_str).collect::<Vec<_>>().join(",")
}
