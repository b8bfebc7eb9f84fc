// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Model subsetting by object type and by extent
//!
//! Subsets keep the full vertex array, transform, templates and metadata;
//! only `CityObjects` is filtered, in document order.

use cityjson_lite_model::{CityModel, CityObjects, ObjectId};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Axis-aligned 2D box `[min_x, min_y, max_x, max_y]`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Extent2D {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Extent2D {
    /// Create an extent from its bounds
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Half-open containment test (min inclusive, max exclusive)
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && y >= self.min_y && x < self.max_x && y < self.max_y
    }
}

/// Types that come along with a selected parent type
fn companion_types(object_type: &str) -> &'static [&'static str] {
    match object_type {
        "Building" => &["BuildingInstallation", "BuildingPart"],
        "Bridge" => &[
            "BridgePart",
            "BridgeInstallation",
            "BridgeConstructionElement",
            "BridgeConstructiveElement",
        ],
        "Tunnel" => &["TunnelInstallation", "TunnelPart"],
        _ => &[],
    }
}

/// Keep (or, inverted, drop) the objects of the given types
///
/// Building, Bridge and Tunnel bring their part and installation types along.
pub fn subset_by_type<S: AsRef<str>>(model: &CityModel, types: &[S], invert: bool) -> CityModel {
    let mut wanted: FxHashSet<&str> = FxHashSet::default();
    for t in types {
        let t = t.as_ref();
        wanted.insert(t);
        wanted.extend(companion_types(t).iter().copied());
    }

    let objects = model
        .city_objects
        .iter()
        .filter(|(_, obj)| wanted.contains(obj.object_type.as_str()) != invert)
        .map(|(id, obj)| (id.clone(), obj.clone()))
        .collect();

    with_objects(model, objects)
}

/// Keep (or, inverted, drop) the objects whose centroid falls in `extent`
///
/// The direct parents and children of every kept object are kept as well.
pub fn subset_by_extent(model: &CityModel, extent: Extent2D, invert: bool) -> CityModel {
    let mut selected: FxHashSet<&ObjectId> = model
        .city_objects
        .iter()
        .filter(|(id, _)| {
            let inside = centroid(model, id.as_str())
                .map(|c| extent.contains(c[0], c[1]))
                .unwrap_or(false);
            inside != invert
        })
        .map(|(id, _)| id)
        .collect();

    let relatives: Vec<&ObjectId> = selected
        .iter()
        .filter_map(|id| model.city_objects.get(id.as_str()))
        .flat_map(|obj| obj.children.iter().chain(obj.parents.iter()))
        .filter(|id| model.city_objects.contains(id.as_str()))
        .collect();
    selected.extend(relatives);

    let objects = model
        .city_objects
        .iter()
        .filter(|(id, _)| selected.contains(id))
        .map(|(id, obj)| (id.clone(), obj.clone()))
        .collect();

    with_objects(model, objects)
}

/// Real-world 3D centroid of all vertices referenced by an object
///
/// Returns `None` when the object has no (valid) vertex reference.
pub fn centroid(model: &CityModel, id: &str) -> Option<[f64; 3]> {
    let object = model.city_objects.get(id)?;

    let mut indices = Vec::new();
    for geometry in &object.geometry {
        if let Some(boundaries) = geometry.get("boundaries") {
            collect_indices(boundaries, &mut indices);
        }
    }

    let mut sum = [0.0f64; 3];
    let mut total = 0usize;
    for index in indices {
        if let Some(v) = model.vertices.get(index) {
            sum[0] += v[0];
            sum[1] += v[1];
            sum[2] += v[2];
            total += 1;
        }
    }

    if total == 0 {
        return None;
    }

    let n = total as f64;
    Some(model.effective_transform().apply([sum[0] / n, sum[1] / n, sum[2] / n]))
}

/// Collect every vertex index of a nested boundary array
fn collect_indices(value: &Value, out: &mut Vec<usize>) {
    match value {
        Value::Array(items) => {
            for item in items {
                collect_indices(item, out);
            }
        }
        Value::Number(n) => {
            if let Some(index) = n.as_u64() {
                out.push(index as usize);
            }
        }
        _ => {}
    }
}

/// Copy of `model` with a different object table
fn with_objects(model: &CityModel, city_objects: CityObjects) -> CityModel {
    log::debug!(
        "Subset keeps {} of {} objects",
        city_objects.len(),
        model.city_objects.len()
    );
    CityModel {
        city_objects,
        ..model.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use approx::assert_relative_eq;

    fn sample() -> CityModel {
        parse(
            br#"{
                "type": "CityJSON",
                "version": "1.1",
                "transform": {"scale": [0.5, 0.5, 1.0], "translate": [100.0, 200.0, 0.0]},
                "CityObjects": {
                    "b1": {"type": "Building", "children": ["b1-part"],
                           "geometry": [{"type": "MultiSurface", "lod": 1, "boundaries": [[[0, 1, 2]]]}]},
                    "b1-part": {"type": "BuildingPart", "parents": ["b1"],
                           "geometry": [{"type": "MultiSurface", "lod": 1, "boundaries": [[[6, 7, 8]]]}]},
                    "r1": {"type": "Road",
                           "geometry": [{"type": "MultiSurface", "lod": 1, "boundaries": [[[3, 4, 5]]]}]},
                    "empty": {"type": "Road"}
                },
                "vertices": [
                    [0, 0, 0], [2, 0, 0], [2, 2, 0],
                    [40, 40, 0], [42, 40, 0], [42, 42, 0],
                    [100, 100, 0], [102, 100, 0], [102, 102, 0]
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_centroid_is_transformed() {
        let model = sample();
        let c = centroid(&model, "b1").unwrap();
        // raw centroid (4/3, 2/3, 0)
        assert_relative_eq!(c[0], 100.0 + 0.5 * 4.0 / 3.0, epsilon = 1e-9);
        assert_relative_eq!(c[1], 200.0 + 0.5 * 2.0 / 3.0, epsilon = 1e-9);
        assert_relative_eq!(c[2], 0.0);

        assert!(centroid(&model, "empty").is_none());
        assert!(centroid(&model, "missing").is_none());
    }

    #[test]
    fn test_subset_by_type_brings_parts() {
        let model = sample();
        let subset = subset_by_type(&model, &["Building"], false);
        let ids: Vec<&str> = subset.city_objects.ids().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["b1", "b1-part"]);
        assert_eq!(subset.vertices.len(), model.vertices.len());

        let inverted = subset_by_type(&model, &["Building"], true);
        let ids: Vec<&str> = inverted.city_objects.ids().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["r1", "empty"]);
    }

    #[test]
    fn test_subset_by_extent_adds_relatives() {
        let model = sample();
        // Only b1's centroid (~100.67, 200.33) falls inside
        let extent = Extent2D::new(100.0, 200.0, 110.0, 210.0);
        let subset = subset_by_extent(&model, extent, false);

        let ids: Vec<&str> = subset.city_objects.ids().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["b1", "b1-part"]);
    }

    #[test]
    fn test_extent_is_half_open() {
        let extent = Extent2D::new(0.0, 0.0, 1.0, 1.0);
        assert!(extent.contains(0.0, 0.0));
        assert!(!extent.contains(1.0, 0.5));
    }
}
