// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coordinate reference system discovery

use cityjson_lite_model::CityModel;
use serde_json::Value;

/// Geometry type of every output collection
const GEOMETRY_TYPE: &str = "MultiPolygon";

/// Find the EPSG code declared by the model
///
/// CityJSON 1.0 stores it as `metadata.crs.epsg`; 1.1 and later use
/// `metadata.referenceSystem` as an OGC URL
/// (`https://www.opengis.net/def/crs/EPSG/0/7415`) or URN
/// (`urn:ogc:def:crs:EPSG::7415`).
pub fn model_epsg(model: &CityModel) -> Option<String> {
    let metadata = model.metadata.as_ref()?;

    if let Some(epsg) = metadata.get("crs").and_then(|crs| crs.get("epsg")) {
        return match epsg {
            Value::Number(n) => Some(n.to_string()),
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            _ => None,
        };
    }

    metadata
        .get("referenceSystem")
        .and_then(Value::as_str)
        .and_then(epsg_from_reference_system)
}

/// Extract the EPSG code from a reference system URL or URN
fn epsg_from_reference_system(reference: &str) -> Option<String> {
    if !reference.to_uppercase().contains("EPSG") {
        return None;
    }

    let code = reference
        .rsplit(|c| c == '/' || c == ':')
        .find(|part| !part.is_empty())?;

    if code.chars().all(|c| c.is_ascii_digit()) {
        Some(code.to_string())
    } else {
        None
    }
}

/// Geometry type string of an output collection, with CRS when known
pub fn geometry_type_string(epsg: Option<&str>) -> String {
    match epsg {
        Some(code) => format!("{}?crs=EPSG:{}", GEOMETRY_TYPE, code),
        None => GEOMETRY_TYPE.to_string(),
    }
}
