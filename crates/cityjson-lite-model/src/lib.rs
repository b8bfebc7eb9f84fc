// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CityJSON-Lite Model - Shared types and traits for CityJSON extraction
//!
//! This crate provides the core data model for working with CityJSON
//! documents. The parser, geometry and loader crates all build on it.
//!
//! # Architecture
//!
//! - [`CityModel`] - The parsed document: vertices, transform, city objects,
//!   geometry templates and metadata. Geometry entries stay generic JSON so a
//!   malformed entry can be skipped on its own.
//! - [`LodValue`] / [`LodFilter`] - Level-of-detail tokens and the active
//!   LoD selection.
//! - [`FieldSchema`] - Ordered string fields of an output collection.
//! - [`LoadOptions`] - The options that drive pipeline assembly.
//! - [`LoadFeedback`] - Progress/info/cancellation sink implemented by hosts.
//!
//! # Example
//!
//! ```ignore
//! use cityjson_lite_model::{LoadOptions, LodAs, LodFilter};
//!
//! let options = LoadOptions::default()
//!     .with_lod_as(LodAs::Layers)
//!     .with_lod(LodFilter::parse("2"));
//! ```

pub mod citymodel;
pub mod error;
pub mod feedback;
pub mod options;
pub mod schema;
pub mod types;

// Re-export all public types
pub use citymodel::*;
pub use error::*;
pub use feedback::*;
pub use options::*;
pub use schema::*;
pub use types::*;
