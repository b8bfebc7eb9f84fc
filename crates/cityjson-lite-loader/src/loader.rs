// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Load orchestration
//!
//! One pass over the city objects in document order. Progress is reported
//! and cancellation checked after every object.

use crate::manager::{LayerCollection, LayerManager};
use crate::pipeline::LoadPipeline;
use crate::styling::{LayerStyle, SemanticColors};
use crate::FeatureRecord;
use cityjson_lite_geometry::GeometryReader;
use cityjson_lite_model::{CityModel, LoadError, LoadFeedback, LoadOptions, Result};
use cityjson_lite_parser::{geometry_type_string, model_epsg};
use rayon::prelude::*;
use serde::Serialize;
use std::path::Path;

/// Counts reported at the end of a load
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    /// City objects that produced at least one feature
    pub objects: usize,
    pub collections: usize,
    pub features: usize,
    /// Geometry entries that could not be read
    pub skipped: usize,
}

impl LoadSummary {
    /// User-facing completion message, if there is anything to report
    pub fn message(&self) -> Option<String> {
        if self.features == 0 {
            Some("No objects to load".to_string())
        } else if self.skipped > 0 {
            Some(format!("{} geometries could not be loaded", self.skipped))
        } else {
            None
        }
    }
}

/// Result of a load
#[derive(Debug)]
pub struct LoadOutput {
    pub collections: Vec<LayerCollection>,
    pub summary: LoadSummary,
}

impl LoadOutput {
    /// Get a collection by name
    pub fn collection(&self, name: &str) -> Option<&LayerCollection> {
        self.collections.iter().find(|c| c.name == name)
    }
}

/// Loads a city model into named feature collections
pub struct CityJsonLoader<'a> {
    model: &'a CityModel,
    filename: String,
    options: LoadOptions,
    colors: SemanticColors,
}

impl<'a> CityJsonLoader<'a> {
    /// Create a loader; `filename` is the base collection name
    pub fn new(model: &'a CityModel, filename: impl Into<String>) -> Self {
        Self {
            model,
            filename: filename.into(),
            options: LoadOptions::default(),
            colors: SemanticColors::default(),
        }
    }

    /// Create a loader named after the stem of a file path
    pub fn from_path(model: &'a CityModel, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let filename = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::new(model, filename)
    }

    /// Set the load options
    pub fn with_options(mut self, options: LoadOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the semantic surface colours used by styled collections
    pub fn with_semantic_colors(mut self, colors: SemanticColors) -> Self {
        self.colors = colors;
        self
    }

    /// The load options
    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// EPSG code of the output: the option if set, else the model's
    pub fn epsg(&self) -> Option<String> {
        self.options.epsg.clone().or_else(|| model_epsg(self.model))
    }

    /// Load sequentially
    pub fn load(&self, feedback: &dyn LoadFeedback) -> Result<LoadOutput> {
        let session = self.prepare(feedback);
        let total = self.model.city_objects.len();
        let mut manager = session.manager;
        let mut objects = 0;

        for (i, (id, object)) in self.model.city_objects.iter().enumerate() {
            if session.reader.has_lod(&object.geometry, &self.options.lod) {
                let features = session
                    .pipeline
                    .build_features(self.model, &session.reader, id, object);
                objects += usize::from(!features.is_empty());
                for (layer, feature) in features {
                    manager.add_feature(&layer, feature);
                }
            }

            checkpoint(feedback, i + 1, total)?;
        }

        Ok(self.finish(manager, objects, session.reader.skipped_count(), feedback))
    }

    /// Load with the records of each object built in parallel
    ///
    /// Collection insertion stays sequential and in object order, so the
    /// output is identical to [`load`](Self::load). Cancellation is checked
    /// once per object as it is inserted.
    pub fn load_parallel(&self, feedback: &dyn LoadFeedback) -> Result<LoadOutput> {
        let session = self.prepare(feedback);
        let total = self.model.city_objects.len();
        let mut manager = session.manager;

        let per_object: Vec<Vec<(String, FeatureRecord)>> = self
            .model
            .city_objects
            .as_slice()
            .par_iter()
            .map(|(id, object)| {
                if feedback.is_cancelled()
                    || !session.reader.has_lod(&object.geometry, &self.options.lod)
                {
                    return Vec::new();
                }
                session
                    .pipeline
                    .build_features(self.model, &session.reader, id, object)
            })
            .collect();

        let mut objects = 0;
        for (i, features) in per_object.into_iter().enumerate() {
            objects += usize::from(!features.is_empty());
            for (layer, feature) in features {
                manager.add_feature(&layer, feature);
            }
            checkpoint(feedback, i + 1, total)?;
        }

        Ok(self.finish(manager, objects, session.reader.skipped_count(), feedback))
    }

    fn prepare(&self, feedback: &dyn LoadFeedback) -> Session<'a> {
        let reader = GeometryReader::from_model(self.model).with_lod_filter(self.options.lod.clone());
        let pipeline = LoadPipeline::assemble(self.model, &reader, &self.filename, &self.options);

        let epsg = self.epsg();
        match &epsg {
            Some(code) => feedback.push_info(&format!("CRS: EPSG:{}", code)),
            None => feedback.push_info("No CRS found"),
        }

        let style = LayerStyle::for_options(&self.options, &self.colors);
        let manager = LayerManager::new(
            pipeline.layer_names(),
            &geometry_type_string(epsg.as_deref()),
            &pipeline.schema(),
            &style,
        );

        log::info!(
            "Loading {} objects from {} into {} collection(s)",
            self.model.city_objects.len(),
            self.filename,
            manager.len()
        );

        Session {
            reader,
            pipeline,
            manager,
        }
    }

    fn finish(
        &self,
        manager: LayerManager,
        objects: usize,
        skipped: usize,
        feedback: &dyn LoadFeedback,
    ) -> LoadOutput {
        let summary = LoadSummary {
            objects,
            collections: manager.len(),
            features: manager.feature_count(),
            skipped,
        };

        if skipped > 0 {
            log::warn!("{} geometries could not be loaded", skipped);
        }
        log::info!(
            "Loaded {} features into {} collection(s)",
            summary.features,
            summary.collections
        );
        if let Some(message) = summary.message() {
            feedback.push_info(&message);
        }

        LoadOutput {
            collections: manager.into_collections(),
            summary,
        }
    }
}

/// Per-load state
struct Session<'a> {
    reader: GeometryReader<'a>,
    pipeline: LoadPipeline,
    manager: LayerManager,
}

fn checkpoint(feedback: &dyn LoadFeedback, done: usize, total: usize) -> Result<()> {
    feedback.set_progress(done as f32 * 100.0 / total.max(1) as f32);
    if feedback.is_cancelled() {
        log::info!("Load cancelled after {} of {} objects", done, total);
        return Err(LoadError::Cancelled);
    }
    Ok(())
}
