// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CityJSON document representation
//!
//! The top level of the document is typed. Geometry entries are kept as
//! generic JSON values: their nesting depth depends on the geometry type and a
//! malformed entry must only cost that entry, not the whole document.

use crate::{LodValue, ObjectId};
use rustc_hash::FxHashMap;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// Semantic surface record (`{"type": "RoofSurface", ...}`)
pub type SurfaceAttrs = Map<String, Value>;

/// Affine transform of quantized vertices
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Per-axis scale
    pub scale: [f64; 3],
    /// Per-axis translation
    pub translate: [f64; 3],
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            scale: [1.0, 1.0, 1.0],
            translate: [0.0, 0.0, 0.0],
        }
    }
}

impl Transform {
    /// Apply the transform to a raw vertex
    #[inline]
    pub fn apply(&self, vertex: [f64; 3]) -> [f64; 3] {
        [
            vertex[0] * self.scale[0] + self.translate[0],
            vertex[1] * self.scale[1] + self.translate[1],
            vertex[2] * self.scale[2] + self.translate[2],
        ]
    }
}

/// A single city object
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CityObject {
    /// Object type (e.g. "Building", "Road")
    #[serde(rename = "type")]
    pub object_type: String,
    /// Geometry entries, untyped
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub geometry: Vec<Value>,
    /// Free-form attributes
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,
    /// Parent object ids
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<ObjectId>,
    /// Child object ids
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ObjectId>,
}

impl CityObject {
    /// Create an object of the given type without geometry
    pub fn new(object_type: impl Into<String>) -> Self {
        Self {
            object_type: object_type.into(),
            ..Default::default()
        }
    }

    /// Check if the object has any geometry entry
    pub fn has_geometry(&self) -> bool {
        !self.geometry.is_empty()
    }
}

/// `CityObjects` table in document order
///
/// Iteration order is the order of the keys in the source document, lookup by
/// id is O(1).
#[derive(Clone, Debug, Default)]
pub struct CityObjects {
    entries: Vec<(ObjectId, CityObject)>,
    index: FxHashMap<ObjectId, usize>,
}

impl CityObjects {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an object, replacing (in place) any object with the same id
    pub fn insert(&mut self, id: ObjectId, object: CityObject) {
        match self.index.get(&id) {
            Some(&pos) => self.entries[pos].1 = object,
            None => {
                self.index.insert(id.clone(), self.entries.len());
                self.entries.push((id, object));
            }
        }
    }

    /// Get an object by id
    pub fn get(&self, id: &str) -> Option<&CityObject> {
        self.index.get(id).map(|&pos| &self.entries[pos].1)
    }

    /// Check if an object exists
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Number of objects
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no objects
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(id, object)` pairs in document order
    pub fn iter(&self) -> impl Iterator<Item = (&ObjectId, &CityObject)> {
        self.entries.iter().map(|(id, obj)| (id, obj))
    }

    /// Iterate objects in document order
    pub fn values(&self) -> impl Iterator<Item = &CityObject> {
        self.entries.iter().map(|(_, obj)| obj)
    }

    /// Iterate ids in document order
    pub fn ids(&self) -> impl Iterator<Item = &ObjectId> {
        self.entries.iter().map(|(id, _)| id)
    }

    /// Entries as a slice (for parallel iteration)
    pub fn as_slice(&self) -> &[(ObjectId, CityObject)] {
        &self.entries
    }
}

impl FromIterator<(ObjectId, CityObject)> for CityObjects {
    fn from_iter<I: IntoIterator<Item = (ObjectId, CityObject)>>(iter: I) -> Self {
        let mut objects = CityObjects::new();
        for (id, object) in iter {
            objects.insert(id, object);
        }
        objects
    }
}

impl PartialEq for CityObjects {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Serialize for CityObjects {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (id, object) in &self.entries {
            map.serialize_entry(id, object)?;
        }
        map.end()
    }
}

struct CityObjectsVisitor;

impl<'de> Visitor<'de> for CityObjectsVisitor {
    type Value = CityObjects;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of city objects")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<CityObjects, A::Error> {
        let mut objects = CityObjects::new();
        while let Some((id, object)) = access.next_entry::<ObjectId, CityObject>()? {
            objects.insert(id, object);
        }
        Ok(objects)
    }
}

impl<'de> Deserialize<'de> for CityObjects {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(CityObjectsVisitor)
    }
}

/// Shared geometry prototypes
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GeometryTemplates {
    /// Template geometries, untyped
    #[serde(default)]
    pub templates: Vec<Value>,
    /// Template vertices (real coordinates, never transformed)
    #[serde(rename = "vertices-templates", default)]
    pub vertices: Vec<[f64; 3]>,
}

impl GeometryTemplates {
    /// Get the LoD of a template
    pub fn template_lod(&self, index: usize) -> Option<LodValue> {
        self.templates
            .get(index)
            .and_then(|t| t.get("lod"))
            .and_then(LodValue::from_json)
    }
}

/// Parsed CityJSON document
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CityModel {
    /// Always "CityJSON"
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    /// CityJSON version (e.g. "1.1")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Vertex transform (absent = identity)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<Transform>,
    /// City objects in document order
    #[serde(rename = "CityObjects")]
    pub city_objects: CityObjects,
    /// Raw vertices
    pub vertices: Vec<[f64; 3]>,
    /// Geometry templates
    #[serde(rename = "geometry-templates", default, skip_serializing_if = "Option::is_none")]
    pub geometry_templates: Option<GeometryTemplates>,
    /// Metadata object
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
    /// Extended metadata (`+metadata-extended` extension)
    #[serde(rename = "+metadata-extended", default, skip_serializing_if = "Option::is_none")]
    pub metadata_extended: Option<Map<String, Value>>,
}

fn default_kind() -> String {
    CityModel::KIND.to_string()
}

impl CityModel {
    /// Value of the top-level `type` key
    pub const KIND: &'static str = "CityJSON";

    /// Create an empty model with the given version
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            kind: default_kind(),
            version: Some(version.into()),
            ..Default::default()
        }
    }

    /// The transform in effect (identity when absent)
    pub fn effective_transform(&self) -> Transform {
        self.transform.unwrap_or_default()
    }

    /// Check if vertices are quantized (a transform is present)
    pub fn is_compressed(&self) -> bool {
        self.transform.is_some()
    }

    /// Vertex resolved to real-world coordinates
    pub fn real_vertex(&self, index: usize) -> Option<[f64; 3]> {
        self.vertices
            .get(index)
            .map(|v| self.effective_transform().apply(*v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_city_objects_keep_document_order() {
        let text = r#"{"b": {"type": "Road"}, "a": {"type": "Building"}, "c": {"type": "Road"}}"#;
        let objects: CityObjects = serde_json::from_str(text).unwrap();

        let ids: Vec<&str> = objects.ids().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
        assert_eq!(objects.get("a").unwrap().object_type, "Building");
    }

    #[test]
    fn test_city_objects_insert_replaces() {
        let mut objects = CityObjects::new();
        objects.insert(ObjectId::from("a"), CityObject::new("Building"));
        objects.insert(ObjectId::from("b"), CityObject::new("Road"));
        objects.insert(ObjectId::from("a"), CityObject::new("Bridge"));

        assert_eq!(objects.len(), 2);
        assert_eq!(objects.as_slice()[0].1.object_type, "Bridge");
    }

    #[test]
    fn test_city_object_defaults() {
        let object: CityObject = serde_json::from_value(json!({"type": "Building"})).unwrap();
        assert!(object.geometry.is_empty());
        assert!(object.attributes.is_empty());
        assert!(object.parents.is_empty());
        assert!(!object.has_geometry());
    }

    #[test]
    fn test_transform_apply() {
        let transform = Transform {
            scale: [2.0, 2.0, 2.0],
            translate: [1.0, 1.0, 1.0],
        };
        assert_eq!(transform.apply([1.0, 1.0, 1.0]), [3.0, 3.0, 3.0]);
        assert_eq!(Transform::default().apply([4.0, 5.0, 6.0]), [4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_template_lod() {
        let templates: GeometryTemplates = serde_json::from_value(json!({
            "templates": [{"type": "MultiSurface", "lod": 2, "boundaries": []}],
            "vertices-templates": [[0.0, 0.0, 0.0]]
        }))
        .unwrap();

        assert_eq!(templates.template_lod(0), Some(LodValue::new("2")));
        assert_eq!(templates.template_lod(1), None);
        assert_eq!(templates.vertices.len(), 1);
    }
}
