// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pipeline assembly from [`LoadOptions`]
//!
//! Stages are appended in option order: parent attributes, then LoD, then
//! semantic surfaces. Later feature stages consume the drafts produced by
//! earlier ones, so the order is fixed here and nowhere else.

use crate::stages::{FeaturePipeline, LodSplit, ParentAttributes, SemanticSplit, StageContext};
use crate::fields::{
    AttributeFields, BaseFields, FieldSchemaBuilder, LodField, SemanticSurfaceField,
    SurfaceAttributeFields,
};
use crate::naming::{LayerNaming, LodNaming, TypeNaming};
use crate::FeatureRecord;
use cityjson_lite_geometry::GeometryReader;
use cityjson_lite_model::{CityModel, CityObject, FieldSchema, LoadOptions, LodAs, ObjectId};

/// The three pipelines of one load
pub struct LoadPipeline {
    pub naming: LayerNaming,
    pub fields: FieldSchemaBuilder,
    pub features: FeaturePipeline,
    surface_keys: Vec<String>,
}

impl LoadPipeline {
    /// Assemble naming, schema and feature stages for a model
    ///
    /// Every stage that scans the model does so here, once.
    pub fn assemble(
        model: &CityModel,
        reader: &GeometryReader<'_>,
        filename: &str,
        options: &LoadOptions,
    ) -> Self {
        let mut naming = LayerNaming::new(filename);
        if options.divide_by_object {
            naming = naming.with_stage(TypeNaming::from_model(model));
        }
        if options.lod_as == LodAs::Layers {
            naming = naming.with_stage(LodNaming::from_model(model, reader));
        }

        let mut fields = FieldSchemaBuilder::new()
            .with_stage(BaseFields)
            .with_stage(AttributeFields::from_model(model));
        if options.lod_as.splits_features() {
            fields = fields.with_stage(LodField);
        }
        if options.load_semantic_surfaces {
            fields = fields
                .with_stage(SemanticSurfaceField)
                .with_stage(SurfaceAttributeFields::from_model(
                    model,
                    &options.surface_attribute_keys,
                ));
        }

        let mut features = FeaturePipeline::new();
        if options.keep_parent_attributes {
            features = features.with_stage(ParentAttributes);
        }
        if options.lod_as.splits_features() {
            features = features.with_stage(LodSplit);
        }
        if options.load_semantic_surfaces {
            features = features.with_stage(SemanticSplit);
        }

        log::debug!(
            "Assembled pipeline: {} naming stage(s), feature stages {:?}",
            naming.stage_count(),
            features.stage_names()
        );

        Self {
            naming,
            fields,
            features,
            surface_keys: options.surface_attribute_keys.clone(),
        }
    }

    /// Collection names, sorted
    pub fn layer_names(&self) -> Vec<String> {
        self.naming.all_layers()
    }

    /// Field schema shared by every collection
    pub fn schema(&self) -> FieldSchema {
        self.fields.build()
    }

    /// Records of one object, each paired with its collection name
    pub fn build_features(
        &self,
        model: &CityModel,
        reader: &GeometryReader<'_>,
        id: &ObjectId,
        object: &CityObject,
    ) -> Vec<(String, FeatureRecord)> {
        let ctx = StageContext {
            model,
            reader,
            surface_keys: &self.surface_keys,
        };

        self.features
            .build(id, object, &ctx)
            .into_iter()
            .map(|record| (self.naming.layer_for(&record), record))
            .collect()
    }
}
