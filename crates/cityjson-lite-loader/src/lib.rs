// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CityJSON-Lite Loader - Feature extraction from city models
//!
//! Turns a [`CityModel`](cityjson_lite_model::CityModel) into named
//! collections of flat feature records, each collection with a fixed field
//! schema.
//!
//! # Overview
//!
//! A load is driven by [`LoadOptions`](cityjson_lite_model::LoadOptions),
//! from which three pipelines are assembled:
//!
//! - **Naming** ([`LayerNaming`]): the source file name, optionally split by
//!   object type and by LoD
//! - **Fields** ([`FieldSchemaBuilder`]): base fields, `attribute.*`, `lod`,
//!   `semantic_surface` and `surface.*`
//! - **Features** ([`FeaturePipeline`]): parent attribute inheritance, then
//!   LoD split, then semantic surface split
//!
//! Geometry entries that cannot be read are skipped and counted; the count
//! is part of the [`LoadSummary`].
//!
//! # Quick Start
//!
//! ```ignore
//! use cityjson_lite_loader::CityJsonLoader;
//! use cityjson_lite_model::{LoadOptions, LodAs, NullFeedback};
//!
//! let model = cityjson_lite_parser::load_file("delft.json")?;
//! let output = CityJsonLoader::from_path(&model, "delft.json")
//!     .with_options(LoadOptions::new().with_lod_as(LodAs::Layers))
//!     .load(&NullFeedback)?;
//!
//! for collection in &output.collections {
//!     println!("{}: {} features", collection.name, collection.len());
//! }
//! ```

pub mod feature;
pub mod fields;
pub mod loader;
pub mod manager;
pub mod naming;
pub mod pipeline;
pub mod stages;
pub mod styling;

#[cfg(test)]
mod fixtures;

pub use feature::{value_to_field, DraftGeometry, FeatureDraft, FeatureRecord};
pub use fields::{
    AttributeFields, BaseFields, FieldSchemaBuilder, FieldStage, LodField, SemanticSurfaceField,
    SurfaceAttributeFields,
};
pub use loader::{CityJsonLoader, LoadOutput, LoadSummary};
pub use manager::{LayerCollection, LayerManager};
pub use naming::{LayerNaming, LodNaming, NamingStage, TypeNaming};
pub use pipeline::LoadPipeline;
pub use stages::{FeaturePipeline, FeatureStage, LodSplit, ParentAttributes, SemanticSplit, StageContext};
pub use styling::{LayerStyle, Rgb, SemanticColors, StyleRule, SurfaceMaterial};
