// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Raw document decoding and top-level validation

use cityjson_lite_model::{
    CityModel, CityObjects, GeometryTemplates, LoadError, Result, Transform,
};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Versions whose boundary/semantics layout matches the one we read
const SUPPORTED_MAJOR_VERSIONS: &[&str] = &["0", "1", "2"];

/// Top level of a CityJSON document before validation
///
/// Required keys are optional here so that their absence is reported as
/// [`LoadError::MissingKey`] instead of a generic decoding error.
#[derive(Debug, Default, Deserialize)]
pub struct RawDocument {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub version: Option<String>,
    pub transform: Option<Transform>,
    #[serde(rename = "CityObjects")]
    pub city_objects: Option<CityObjects>,
    pub vertices: Option<Vec<[f64; 3]>>,
    #[serde(rename = "geometry-templates")]
    pub geometry_templates: Option<GeometryTemplates>,
    pub metadata: Option<Map<String, Value>>,
    #[serde(rename = "+metadata-extended")]
    pub metadata_extended: Option<Map<String, Value>>,
}

impl RawDocument {
    /// Decode the top level from bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Validate and convert into a model
    pub fn into_model(self, check_version: bool) -> Result<CityModel> {
        if let Some(kind) = &self.kind {
            if kind != CityModel::KIND {
                return Err(LoadError::format(format!(
                    "expected type \"{}\", found \"{}\"",
                    CityModel::KIND,
                    kind
                )));
            }
        }

        if check_version {
            if let Some(version) = &self.version {
                let major = version.split('.').next().unwrap_or_default();
                if !SUPPORTED_MAJOR_VERSIONS.contains(&major) {
                    return Err(LoadError::unsupported_version(version.clone()));
                }
            }
        }

        let city_objects = self.city_objects.ok_or(LoadError::MissingKey("CityObjects"))?;
        let vertices = self.vertices.ok_or(LoadError::MissingKey("vertices"))?;

        log::debug!(
            "Decoded CityJSON {}: {} objects, {} vertices",
            self.version.as_deref().unwrap_or("(unversioned)"),
            city_objects.len(),
            vertices.len()
        );

        Ok(CityModel {
            kind: CityModel::KIND.to_string(),
            version: self.version,
            transform: self.transform,
            city_objects,
            vertices,
            geometry_templates: self.geometry_templates,
            metadata: self.metadata,
            metadata_extended: self.metadata_extended,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(text: &str) -> Result<CityModel> {
        RawDocument::from_slice(text.as_bytes())?.into_model(true)
    }

    #[test]
    fn test_missing_city_objects() {
        let err = decode(r#"{"type": "CityJSON", "vertices": []}"#).unwrap_err();
        assert!(matches!(err, LoadError::MissingKey("CityObjects")));
    }

    #[test]
    fn test_missing_vertices() {
        let err = decode(r#"{"type": "CityJSON", "CityObjects": {}}"#).unwrap_err();
        assert!(matches!(err, LoadError::MissingKey("vertices")));
    }

    #[test]
    fn test_wrong_type() {
        let err = decode(r#"{"type": "FeatureCollection", "CityObjects": {}, "vertices": []}"#)
            .unwrap_err();
        assert!(matches!(err, LoadError::InvalidFormat(_)));
    }

    #[test]
    fn test_unsupported_version() {
        let err = decode(r#"{"type": "CityJSON", "version": "7.0", "CityObjects": {}, "vertices": []}"#)
            .unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedVersion(_)));

        let model = RawDocument::from_slice(
            br#"{"type": "CityJSON", "version": "7.0", "CityObjects": {}, "vertices": []}"#,
        )
        .unwrap()
        .into_model(false);
        assert!(model.is_ok());
    }

    #[test]
    fn test_full_document() {
        let model = decode(
            r#"{
                "type": "CityJSON",
                "version": "1.0",
                "transform": {"scale": [0.001, 0.001, 0.001], "translate": [10.0, 20.0, 0.0]},
                "CityObjects": {"id-1": {"type": "Building", "attributes": {"height": 12.5}}},
                "vertices": [[1000, 2000, 3000]],
                "geometry-templates": {"templates": [], "vertices-templates": []},
                "metadata": {"crs": {"epsg": 7415}}
            }"#,
        )
        .unwrap();

        assert!(model.is_compressed());
        assert_eq!(model.city_objects.len(), 1);
        assert!(model.geometry_templates.is_some());
        let v = model.real_vertex(0).unwrap();
        assert!((v[0] - 11.0).abs() < 1e-9);
        assert!((v[1] - 22.0).abs() < 1e-9);
        assert!((v[2] - 3.0).abs() < 1e-9);
    }
}
