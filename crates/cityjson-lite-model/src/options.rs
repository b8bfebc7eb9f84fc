// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Loading options

use crate::LodFilter;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How LoD information is carried into the output
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LodAs {
    /// All geometries of an object go into a single feature
    #[default]
    None,
    /// One feature per LoD, with an `lod` field
    Attributes,
    /// One feature per LoD, each LoD in its own collection
    Layers,
}

impl LodAs {
    /// Check if features are split per LoD
    pub fn splits_features(&self) -> bool {
        !matches!(self, LodAs::None)
    }
}

impl FromStr for LodAs {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "NONE" => Ok(LodAs::None),
            "ATTRIBUTES" => Ok(LodAs::Attributes),
            "LAYERS" => Ok(LodAs::Layers),
            other => Err(format!("unknown LoD mode: {}", other)),
        }
    }
}

impl fmt::Display for LodAs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LodAs::None => "NONE",
            LodAs::Attributes => "ATTRIBUTES",
            LodAs::Layers => "LAYERS",
        };
        f.write_str(s)
    }
}

/// Options that drive pipeline assembly
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Explicit EPSG code; overrides the one found in the metadata
    pub epsg: Option<String>,
    /// Copy ancestor attributes onto each object (child wins on conflict)
    pub keep_parent_attributes: bool,
    /// One collection per city object type
    pub divide_by_object: bool,
    /// LoD handling
    pub lod_as: LodAs,
    /// Active LoD selection
    pub lod: LodFilter,
    /// One feature per semantic surface type
    pub load_semantic_surfaces: bool,
    /// Attach a semantic-surface style to the collections
    pub style_semantic_surfaces: bool,
    /// Extra per-polygon semantic keys to read from the `semantics` object
    pub surface_attribute_keys: Vec<String>,
}

impl LoadOptions {
    /// Create default options (one collection, no splitting)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the EPSG code
    pub fn with_epsg(mut self, epsg: impl Into<String>) -> Self {
        self.epsg = Some(epsg.into());
        self
    }

    /// Set whether parent attributes are inherited
    pub fn with_parent_attributes(mut self, enabled: bool) -> Self {
        self.keep_parent_attributes = enabled;
        self
    }

    /// Set whether collections are split by object type
    pub fn with_divide_by_object(mut self, enabled: bool) -> Self {
        self.divide_by_object = enabled;
        self
    }

    /// Set the LoD handling
    pub fn with_lod_as(mut self, lod_as: LodAs) -> Self {
        self.lod_as = lod_as;
        self
    }

    /// Set the active LoD selection
    pub fn with_lod(mut self, lod: LodFilter) -> Self {
        self.lod = lod;
        self
    }

    /// Set whether features are split per semantic surface
    pub fn with_semantic_surfaces(mut self, enabled: bool) -> Self {
        self.load_semantic_surfaces = enabled;
        self
    }

    /// Set whether semantic-surface styling is requested
    pub fn with_semantic_styling(mut self, enabled: bool) -> Self {
        self.style_semantic_surfaces = enabled;
        self
    }

    /// Set the extra per-polygon semantic keys
    pub fn with_surface_attribute_keys(mut self, keys: Vec<String>) -> Self {
        self.surface_attribute_keys = keys;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lod_as_parse() {
        assert_eq!("layers".parse::<LodAs>().unwrap(), LodAs::Layers);
        assert_eq!("ATTRIBUTES".parse::<LodAs>().unwrap(), LodAs::Attributes);
        assert!("sideways".parse::<LodAs>().is_err());
        assert!(!LodAs::None.splits_features());
        assert!(LodAs::Layers.splits_features());
    }

    #[test]
    fn test_options_from_partial_json() {
        let options: LoadOptions =
            serde_json::from_value(json!({"lod_as": "LAYERS", "lod": "2"})).unwrap();

        assert_eq!(options.lod_as, LodAs::Layers);
        assert_eq!(options.lod, LodFilter::parse("2"));
        assert!(!options.divide_by_object);
        assert!(options.epsg.is_none());
    }

    #[test]
    fn test_options_builder() {
        let options = LoadOptions::new()
            .with_epsg("7415")
            .with_divide_by_object(true)
            .with_semantic_surfaces(true);

        assert_eq!(options.epsg.as_deref(), Some("7415"));
        assert!(options.divide_by_object);
        assert!(options.load_semantic_surfaces);
        assert!(options.lod.is_all());
    }
}
