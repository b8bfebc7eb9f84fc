// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Feature stages
//!
//! A city object starts as one [`FeatureDraft`]. Each [`FeatureStage`] maps
//! the drafts produced so far to new drafts; geometry is only resolved once
//! all stages have run, except by the semantic split which needs polygons to
//! group.

use crate::feature::{
    value_to_field, DraftGeometry, FeatureDraft, FeatureRecord, ATTRIBUTE_PREFIX, SURFACE_PREFIX,
};
use crate::fields::EXCLUDED_SURFACE_KEYS;
use cityjson_lite_geometry::GeometryReader;
use cityjson_lite_model::{CityModel, CityObject, LodValue, ObjectId, SurfaceAttrs};
use rustc_hash::FxHashSet;
use serde_json::Value;
use std::collections::VecDeque;

/// Label of polygons without a semantic surface
pub const NO_SURFACE: &str = "None";

/// Shared, read-only state of a load
pub struct StageContext<'a> {
    /// The model being loaded
    pub model: &'a CityModel,
    /// Geometry reader of the model
    pub reader: &'a GeometryReader<'a>,
    /// Extra per-polygon semantic keys
    pub surface_keys: &'a [String],
}

/// One axis of feature splitting or enrichment
pub trait FeatureStage: Send + Sync {
    /// Stage name, for logging
    fn name(&self) -> &'static str;

    /// Map the drafts of one object to new drafts
    fn apply(
        &self,
        drafts: Vec<FeatureDraft>,
        object: &CityObject,
        ctx: &StageContext<'_>,
    ) -> Vec<FeatureDraft>;
}

/// Ordered feature stages around the base draft
#[derive(Default)]
pub struct FeaturePipeline {
    stages: Vec<Box<dyn FeatureStage>>,
}

impl FeaturePipeline {
    /// Pipeline that emits one feature per object
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage
    pub fn with_stage(mut self, stage: impl FeatureStage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Stage names in order
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Build the records of one object
    pub fn build(&self, id: &ObjectId, object: &CityObject, ctx: &StageContext<'_>) -> Vec<FeatureRecord> {
        let drafts = self
            .stages
            .iter()
            .fold(vec![FeatureDraft::base(id, object)], |drafts, stage| {
                stage.apply(drafts, object, ctx)
            });

        drafts
            .into_iter()
            .map(|draft| draft.finalize(object, ctx.reader))
            .collect()
    }
}

/// Copy ancestor attributes onto the object; the object's own values win
///
/// An attribute the object sets to `null` stays empty.
///
/// Ancestors are visited breadth-first, nearest first, each once.
#[derive(Clone, Copy, Debug, Default)]
pub struct ParentAttributes;

impl FeatureStage for ParentAttributes {
    fn name(&self) -> &'static str {
        "parent-attributes"
    }

    fn apply(
        &self,
        mut drafts: Vec<FeatureDraft>,
        object: &CityObject,
        ctx: &StageContext<'_>,
    ) -> Vec<FeatureDraft> {
        let mut inherited: Vec<(String, String)> = Vec::new();
        let mut visited: FxHashSet<&str> = FxHashSet::default();
        let mut queue: VecDeque<&ObjectId> = object.parents.iter().collect();

        while let Some(parent_id) = queue.pop_front() {
            if !visited.insert(parent_id.as_str()) {
                continue;
            }
            let Some(parent) = ctx.model.city_objects.get(parent_id.as_str()) else {
                log::debug!("Parent {} not found", parent_id);
                continue;
            };
            for (key, value) in &parent.attributes {
                // declared on the object, even as null
                if object.attributes.contains_key(key) {
                    continue;
                }
                if let Some(text) = value_to_field(value) {
                    inherited.push((format!("{}{}", ATTRIBUTE_PREFIX, key), text));
                }
            }
            queue.extend(parent.parents.iter());
        }

        for draft in &mut drafts {
            for (key, value) in &inherited {
                draft
                    .attributes
                    .entry(key.clone())
                    .or_insert_with(|| value.clone());
            }
        }
        drafts
    }
}

/// One draft per LoD of the object's geometry entries
///
/// Entries are grouped by LoD in first-seen order; entries without LoD form
/// their own group. Groups outside the active LoD selection are dropped.
#[derive(Clone, Copy, Debug, Default)]
pub struct LodSplit;

impl FeatureStage for LodSplit {
    fn name(&self) -> &'static str {
        "lod-split"
    }

    fn apply(
        &self,
        drafts: Vec<FeatureDraft>,
        object: &CityObject,
        ctx: &StageContext<'_>,
    ) -> Vec<FeatureDraft> {
        let mut split = Vec::new();

        for draft in drafts {
            let DraftGeometry::Entries(indices) = &draft.geometry else {
                split.push(draft);
                continue;
            };

            let mut groups: Vec<(Option<LodValue>, Vec<usize>)> = Vec::new();
            for &index in indices {
                let Some(geometry) = object.geometry.get(index) else {
                    continue;
                };
                let lod = ctx.reader.get_lod(geometry);
                match groups.iter_mut().find(|(l, _)| *l == lod) {
                    Some((_, members)) => members.push(index),
                    None => groups.push((lod, vec![index])),
                }
            }

            for (lod, members) in groups {
                if !ctx.reader.lod_filter().matches(lod.as_ref()) {
                    continue;
                }
                let mut lod_draft = draft.with_geometry(DraftGeometry::Entries(members));
                lod_draft.lod = lod;
                split.push(lod_draft);
            }
        }
        split
    }
}

/// One draft per semantic surface type
///
/// Resolves the draft's entries, groups the polygons by surface type in
/// first-seen order (`"None"` for polygons without semantics) and copies the
/// attributes of the first surface of each group as `surface.<key>`.
///
/// The resulting drafts carry resolved polygons instead of geometry entries.
#[derive(Clone, Copy, Debug, Default)]
pub struct SemanticSplit;

impl FeatureStage for SemanticSplit {
    fn name(&self) -> &'static str {
        "semantic-split"
    }

    fn apply(
        &self,
        drafts: Vec<FeatureDraft>,
        object: &CityObject,
        ctx: &StageContext<'_>,
    ) -> Vec<FeatureDraft> {
        let mut split = Vec::new();

        for draft in drafts {
            let DraftGeometry::Entries(indices) = &draft.geometry else {
                split.push(draft);
                continue;
            };

            let entries = indices.iter().filter_map(|&i| object.geometry.get(i));
            let (polygons, semantics) = ctx.reader.get_polygons(entries, ctx.surface_keys);

            let mut groups: Vec<(String, Option<SurfaceAttrs>, Vec<_>)> = Vec::new();
            for (polygon, semantic) in polygons.into_iter().zip(semantics) {
                let surface = surface_label(semantic.as_ref());
                match groups.iter_mut().find(|(s, _, _)| *s == surface) {
                    Some((_, _, members)) => members.push(polygon),
                    None => groups.push((surface, semantic, vec![polygon])),
                }
            }

            for (surface, semantic, members) in groups {
                let mut surface_draft = draft.with_geometry(DraftGeometry::Polygons(members));
                if let Some(attrs) = &semantic {
                    for (key, value) in attrs {
                        if EXCLUDED_SURFACE_KEYS.contains(&key.as_str()) {
                            continue;
                        }
                        if let Some(text) = value_to_field(value) {
                            surface_draft
                                .attributes
                                .insert(format!("{}{}", SURFACE_PREFIX, key), text);
                        }
                    }
                }
                surface_draft.semantic_surface = Some(surface);
                split.push(surface_draft);
            }
        }
        split
    }
}

fn surface_label(semantic: Option<&SurfaceAttrs>) -> String {
    semantic
        .and_then(|attrs| attrs.get("type"))
        .map(|t| match t {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .unwrap_or_else(|| NO_SURFACE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use cityjson_lite_model::LodFilter;

    fn build(model: &CityModel, pipeline: &FeaturePipeline, reader: &GeometryReader<'_>, id: &str) -> Vec<FeatureRecord> {
        let keys: Vec<String> = Vec::new();
        let ctx = StageContext {
            model,
            reader,
            surface_keys: &keys,
        };
        let id = ObjectId::from(id);
        let object = model.city_objects.get(id.as_str()).unwrap();
        pipeline.build(&id, object, &ctx)
    }

    #[test]
    fn test_base_pipeline_single_feature() {
        let model = fixtures::buildings_and_roads();
        let reader = GeometryReader::from_model(&model);
        let records = build(&model, &FeaturePipeline::new(), &reader, "b1");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].object_type, "Building");
        assert_eq!(records[0].value("attribute.height"), Some("10.5"));
        // 1 polygon at LoD1 + 3 at LoD2
        assert_eq!(records[0].geometry.len(), 4);
        assert!(records[0].lod.is_none());
    }

    #[test]
    fn test_lod_split() {
        let model = fixtures::buildings_and_roads();
        let reader = GeometryReader::from_model(&model);
        let pipeline = FeaturePipeline::new().with_stage(LodSplit);
        let records = build(&model, &pipeline, &reader, "b1");

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].value("lod"), Some("1"));
        assert_eq!(records[0].geometry.len(), 1);
        assert_eq!(records[1].value("lod"), Some("2"));
        assert_eq!(records[1].geometry.len(), 3);
    }

    #[test]
    fn test_lod_split_with_filter() {
        let model = fixtures::buildings_and_roads();
        let reader = GeometryReader::from_model(&model).with_lod_filter(LodFilter::parse("2"));
        let pipeline = FeaturePipeline::new().with_stage(LodSplit);
        let records = build(&model, &pipeline, &reader, "b1");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value("lod"), Some("2"));
    }

    #[test]
    fn test_semantic_split() {
        let model = fixtures::buildings_and_roads();
        let reader = GeometryReader::from_model(&model);
        let pipeline = FeaturePipeline::new()
            .with_stage(LodSplit)
            .with_stage(SemanticSplit);
        let records = build(&model, &pipeline, &reader, "b1");

        let surfaces: Vec<(Option<&str>, Option<&str>, usize)> = records
            .iter()
            .map(|r| (r.value("lod"), r.value("semantic_surface"), r.geometry.len()))
            .collect();
        assert_eq!(
            surfaces,
            vec![
                (Some("1"), Some("None"), 1),
                (Some("2"), Some("GroundSurface"), 1),
                (Some("2"), Some("RoofSurface"), 1),
                (Some("2"), Some("WallSurface"), 1),
            ]
        );
        assert_eq!(records[2].value("surface.slope"), Some("30"));
        assert_eq!(records[2].value("attribute.height"), Some("10.5"));
    }

    #[test]
    fn test_semantic_split_groups_by_type() {
        let model = fixtures::buildings_and_roads();
        let reader = GeometryReader::from_model(&model);
        let pipeline = FeaturePipeline::new().with_stage(SemanticSplit);
        let records = build(&model, &pipeline, &reader, "r1");

        let surfaces: Vec<(Option<&str>, usize)> = records
            .iter()
            .map(|r| (r.value("semantic_surface"), r.geometry.len()))
            .collect();
        // LoD1 polygon and the LoD2 polygon without semantics share a group
        assert_eq!(surfaces, vec![(Some("None"), 2), (Some("TrafficArea"), 1)]);
        assert_eq!(records[1].value("surface.material"), Some("asphalt"));
    }

    #[test]
    fn test_parent_attributes_child_wins() {
        let model = fixtures::family();
        let reader = GeometryReader::from_model(&model);
        let pipeline = FeaturePipeline::new().with_stage(ParentAttributes);
        let records = build(&model, &pipeline, &reader, "child");

        assert_eq!(records.len(), 1);
        let record = &records[0];
        // own value
        assert_eq!(record.value("attribute.name"), Some("child"));
        // parent beats grandparent
        assert_eq!(record.value("attribute.owner"), Some("parent"));
        // only on the grandparent
        assert_eq!(record.value("attribute.city"), Some("Delft"));
        assert_eq!(record.value("parents"), Some("parent"));
    }

    #[test]
    fn test_parent_attributes_keep_child_null() {
        let model = fixtures::family();
        let reader = GeometryReader::from_model(&model);
        let pipeline = FeaturePipeline::new().with_stage(ParentAttributes);

        let child = build(&model, &pipeline, &reader, "child");
        assert_eq!(child[0].value("attribute.roof"), None);

        let parent = build(&model, &pipeline, &reader, "parent");
        assert_eq!(parent[0].value("attribute.roof"), Some("flat"));
    }

    #[test]
    fn test_stage_names() {
        let pipeline = FeaturePipeline::new()
            .with_stage(ParentAttributes)
            .with_stage(LodSplit)
            .with_stage(SemanticSplit);
        assert_eq!(
            pipeline.stage_names(),
            vec!["parent-attributes", "lod-split", "semantic-split"]
        );
    }
}
