// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Output collection naming
//!
//! The base name is the source file name. Each [`NamingStage`] multiplies the
//! names produced so far and decorates the name of each feature the same way.

use crate::FeatureRecord;
use cityjson_lite_geometry::GeometryReader;
use cityjson_lite_model::{CityModel, LodValue};
use std::collections::BTreeSet;

/// One axis of collection splitting
pub trait NamingStage: Send + Sync {
    /// Expand the names produced by the previous stages
    fn expand(&self, names: Vec<String>) -> Vec<String>;

    /// Decorate the name a feature got from the previous stages
    fn decorate(&self, name: String, feature: &FeatureRecord) -> String;
}

/// Collection naming strategy: a base name plus ordered stages
pub struct LayerNaming {
    base: String,
    stages: Vec<Box<dyn NamingStage>>,
}

impl LayerNaming {
    /// Single collection named after the file
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            stages: Vec::new(),
        }
    }

    /// Append a stage
    pub fn with_stage(mut self, stage: impl NamingStage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Number of stages after the base name
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// All collection names, sorted and deduplicated
    pub fn all_layers(&self) -> Vec<String> {
        let names = self
            .stages
            .iter()
            .fold(vec![self.base.clone()], |names, stage| stage.expand(names));

        names
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Collection a feature belongs in
    pub fn layer_for(&self, feature: &FeatureRecord) -> String {
        self.stages
            .iter()
            .fold(self.base.clone(), |name, stage| stage.decorate(name, feature))
    }
}

/// One collection per city object type: `"<name> - <type>"`
#[derive(Clone, Debug)]
pub struct TypeNaming {
    types: BTreeSet<String>,
}

impl TypeNaming {
    /// Collect the object types present in the model
    pub fn from_model(model: &CityModel) -> Self {
        Self {
            types: model
                .city_objects
                .values()
                .map(|obj| obj.object_type.clone())
                .collect(),
        }
    }

    /// Distinct object types
    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.types.iter().map(String::as_str)
    }
}

impl NamingStage for TypeNaming {
    fn expand(&self, names: Vec<String>) -> Vec<String> {
        names
            .iter()
            .flat_map(|name| self.types.iter().map(move |t| type_name(name, t)))
            .collect()
    }

    fn decorate(&self, name: String, feature: &FeatureRecord) -> String {
        type_name(&name, &feature.object_type)
    }
}

fn type_name(name: &str, object_type: &str) -> String {
    format!("{} - {}", name, object_type)
}

/// One collection per LoD: `"<name> [LoD<lod>]"`
///
/// Features without a LoD keep the undecorated name, which is also what a
/// model without any LoD produces.
#[derive(Clone, Debug)]
pub struct LodNaming {
    lods: BTreeSet<LodValue>,
    keeps_undecorated: bool,
}

impl LodNaming {
    /// Collect the LoDs of every geometry entry that passes the reader's LoD
    /// selection
    pub fn from_model(model: &CityModel, reader: &GeometryReader<'_>) -> Self {
        let mut lods = BTreeSet::new();
        let mut unlodded = false;

        for geometry in model.city_objects.values().flat_map(|obj| obj.geometry.iter()) {
            let lod = reader.get_lod(geometry);
            if !reader.lod_filter().matches(lod.as_ref()) {
                continue;
            }
            match lod {
                Some(lod) => {
                    lods.insert(lod);
                }
                None => unlodded = true,
            }
        }

        if lods.is_empty() {
            log::debug!("No LoD in the model, collections are not split by LoD");
        }

        Self {
            keeps_undecorated: unlodded || lods.is_empty(),
            lods,
        }
    }

    /// Observed LoDs, sorted
    pub fn lods(&self) -> impl Iterator<Item = &LodValue> {
        self.lods.iter()
    }
}

impl NamingStage for LodNaming {
    fn expand(&self, names: Vec<String>) -> Vec<String> {
        let mut expanded: Vec<String> = names
            .iter()
            .flat_map(|name| self.lods.iter().map(move |lod| lod_name(name, lod)))
            .collect();
        if self.keeps_undecorated {
            expanded.extend(names);
        }
        expanded
    }

    fn decorate(&self, name: String, feature: &FeatureRecord) -> String {
        match &feature.lod {
            Some(lod) => lod_name(&name, lod),
            None => name,
        }
    }
}

fn lod_name(name: &str, lod: &LodValue) -> String {
    format!("{} [LoD{}]", name, lod)
}
