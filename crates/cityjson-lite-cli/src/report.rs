// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON report of a load

use cityjson_lite_loader::{FeatureRecord, LayerCollection, LayerStyle, LoadOutput, LoadSummary, StyleRule};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Serialize)]
pub struct LoadReport<'a> {
    pub summary: LoadSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub collections: Vec<CollectionReport<'a>>,
}

#[derive(Debug, Serialize)]
pub struct CollectionReport<'a> {
    pub name: &'a str,
    pub geometry_type: &'a str,
    pub fields: Vec<&'a str>,
    pub style: &'a LayerStyle,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<StyleRule>,
    pub feature_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<FeatureReport<'a>>>,
}

/// One feature as a row: field values by name plus WKT geometry
#[derive(Debug, Serialize)]
pub struct FeatureReport<'a> {
    pub values: BTreeMap<&'a str, &'a str>,
    pub wkt: String,
}

impl<'a> LoadReport<'a> {
    pub fn new(output: &'a LoadOutput, with_features: bool) -> Self {
        Self {
            summary: output.summary,
            message: output.summary.message(),
            collections: output
                .collections
                .iter()
                .map(|c| CollectionReport::new(c, with_features))
                .collect(),
        }
    }
}

impl<'a> CollectionReport<'a> {
    fn new(collection: &'a LayerCollection, with_features: bool) -> Self {
        let fields = collection.schema.names();
        let features = with_features.then(|| {
            collection
                .features
                .iter()
                .map(|f| FeatureReport::new(f, &fields))
                .collect()
        });

        Self {
            name: &collection.name,
            geometry_type: &collection.geometry_type,
            rules: collection.style.rules(),
            style: &collection.style,
            feature_count: collection.len(),
            features,
            fields,
        }
    }
}

impl<'a> FeatureReport<'a> {
    fn new(feature: &'a FeatureRecord, fields: &[&'a str]) -> Self {
        let values = fields
            .iter()
            .filter_map(|&field| feature.value(field).map(|value| (field, value)))
            .collect();

        Self {
            values,
            wkt: feature.geometry.to_wkt(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cityjson_lite_model::{LoadOptions, NullFeedback};

    const CUBE: &str = r#"{
        "type": "CityJSON",
        "version": "1.1",
        "CityObjects": {
            "id-1": {
                "type": "Building",
                "attributes": {"height": 3},
                "geometry": [{"type": "MultiSurface", "lod": 1, "boundaries": [[[0, 1, 2]]]}]
            }
        },
        "vertices": [[0, 0, 0], [1, 0, 0], [0, 1, 0]]
    }"#;

    #[test]
    fn test_report_with_features() {
        let model = cityjson_lite_parser::parse(CUBE.as_bytes()).unwrap();
        let output = cityjson_lite_loader::CityJsonLoader::new(&model, "cube")
            .with_options(LoadOptions::new())
            .load(&NullFeedback)
            .unwrap();

        let report = LoadReport::new(&output, true);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["collections"][0]["name"], "cube");
        assert_eq!(json["collections"][0]["feature_count"], 1);
        assert_eq!(json["collections"][0]["style"]["kind"], "plain");
        let feature = &json["collections"][0]["features"][0];
        assert_eq!(feature["values"]["uid"], "id-1");
        assert_eq!(feature["values"]["attribute.height"], "3");
        assert_eq!(feature["wkt"], "MULTIPOLYGON Z (((0 0 0, 1 0 0, 0 1 0, 0 0 0)))");
        assert!(json.get("message").is_none());
    }

    #[test]
    fn test_report_without_features() {
        let model = cityjson_lite_parser::parse(CUBE.as_bytes()).unwrap();
        let output = cityjson_lite_loader::CityJsonLoader::new(&model, "cube")
            .load(&NullFeedback)
            .unwrap();

        let json = serde_json::to_value(LoadReport::new(&output, false)).unwrap();
        assert!(json["collections"][0].get("features").is_none());
        assert_eq!(json["summary"]["features"], 1);
    }
}
