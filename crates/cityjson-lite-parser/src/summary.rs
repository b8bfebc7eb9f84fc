// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! File information shown to the user before loading

use crate::model_epsg;
use cityjson_lite_model::{CityModel, LodValue};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Document-level information about a model
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ModelSummary {
    /// CityJSON version
    pub version: Option<String>,
    /// Whether vertices are quantized (a transform is present)
    pub compressed: bool,
    /// Number of city objects
    pub object_count: usize,
    /// Distinct LoDs, sorted
    pub lods: Vec<LodValue>,
    /// EPSG code from the metadata
    pub epsg: Option<String>,
    /// Metadata merged with `+metadata-extended`
    pub metadata: Option<Map<String, Value>>,
}

impl ModelSummary {
    /// Summarize a model
    pub fn from_model(model: &CityModel) -> Self {
        let mut lods = BTreeSet::new();
        for object in model.city_objects.values() {
            for geometry in &object.geometry {
                if let Some(lod) = geometry_lod(model, geometry) {
                    lods.insert(lod);
                }
            }
        }

        let metadata = model.metadata.as_ref().map(|metadata| {
            let mut merged = metadata.clone();
            if let Some(extended) = &model.metadata_extended {
                for (key, value) in extended {
                    merged.insert(key.clone(), value.clone());
                }
            }
            merged
        });

        Self {
            version: model.version.clone(),
            compressed: model.is_compressed(),
            object_count: model.city_objects.len(),
            lods: lods.into_iter().collect(),
            epsg: model_epsg(model),
            metadata,
        }
    }

    /// Check if the model offers a LoD choice
    pub fn has_lods(&self) -> bool {
        !self.lods.is_empty()
    }
}

/// LoD of a geometry entry, following instances to their template
fn geometry_lod(model: &CityModel, geometry: &Value) -> Option<LodValue> {
    if geometry.get("type").and_then(Value::as_str) == Some("GeometryInstance") {
        let index = geometry.get("template").and_then(Value::as_u64)? as usize;
        return model.geometry_templates.as_ref()?.template_lod(index);
    }
    geometry.get("lod").and_then(LodValue::from_json)
}
