// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Named output collections

use crate::styling::LayerStyle;
use crate::FeatureRecord;
use cityjson_lite_model::FieldSchema;
use rustc_hash::FxHashMap;

/// One output collection: a fixed schema and append-only features
#[derive(Clone, Debug, PartialEq)]
pub struct LayerCollection {
    pub name: String,
    /// Geometry type string, `MultiPolygon` with an optional CRS suffix
    pub geometry_type: String,
    pub schema: FieldSchema,
    pub style: LayerStyle,
    pub features: Vec<FeatureRecord>,
}

impl LayerCollection {
    /// Number of features
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Check if the collection has no features
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Collections of one load, in creation order
#[derive(Debug, Default)]
pub struct LayerManager {
    collections: Vec<LayerCollection>,
    index: FxHashMap<String, usize>,
}

impl LayerManager {
    /// Create one empty collection per name
    pub fn new(
        names: impl IntoIterator<Item = String>,
        geometry_type: &str,
        schema: &FieldSchema,
        style: &LayerStyle,
    ) -> Self {
        let mut manager = Self::default();
        for name in names {
            if manager.index.contains_key(&name) {
                continue;
            }
            manager.index.insert(name.clone(), manager.collections.len());
            manager.collections.push(LayerCollection {
                name,
                geometry_type: geometry_type.to_string(),
                schema: schema.clone(),
                style: style.clone(),
                features: Vec::new(),
            });
        }
        manager
    }

    /// Append a feature to a collection
    ///
    /// Returns `false`, and drops the feature, if the collection does not
    /// exist.
    pub fn add_feature(&mut self, layer: &str, feature: FeatureRecord) -> bool {
        match self.index.get(layer) {
            Some(&i) => {
                self.collections[i].features.push(feature);
                true
            }
            None => {
                log::warn!("No collection named {:?} for feature {}", layer, feature.uid);
                false
            }
        }
    }

    /// Get a collection by name
    pub fn get(&self, name: &str) -> Option<&LayerCollection> {
        self.index.get(name).map(|&i| &self.collections[i])
    }

    /// Collections in creation order
    pub fn collections(&self) -> &[LayerCollection] {
        &self.collections
    }

    /// Number of collections
    pub fn len(&self) -> usize {
        self.collections.len()
    }

    /// Check if there are no collections
    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    /// Total number of features across collections
    pub fn feature_count(&self) -> usize {
        self.collections.iter().map(LayerCollection::len).sum()
    }

    /// Take the collections
    pub fn into_collections(self) -> Vec<LayerCollection> {
        self.collections
    }
}
