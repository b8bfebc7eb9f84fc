// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CityJSON-Lite Parser - CityJSON document reader
//!
//! This crate turns the bytes of a `.json` file into a [`CityModel`] and
//! offers the document-level queries a host needs before loading:
//!
//! - **Parsing** with BOM stripping and required-key validation
//! - **CRS discovery** from `metadata.crs` or `metadata.referenceSystem`
//! - **File summary** (version, compression, LoDs, metadata)
//! - **Subsetting** by object type or by 2D extent
//!
//! # Example
//!
//! ```ignore
//! use cityjson_lite_parser::CityJsonParser;
//!
//! let model = CityJsonParser::new().parse(&bytes)?;
//! println!("{} objects", model.city_objects.len());
//! ```

mod crs;
mod document;
mod subset;
mod summary;

pub use crs::{geometry_type_string, model_epsg};
pub use document::RawDocument;
pub use subset::{centroid, subset_by_extent, subset_by_type, Extent2D};
pub use summary::ModelSummary;

use cityjson_lite_model::{CityModel, LoadError, ProgressCallback, Result};
use std::path::Path;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Main CityJSON parser
///
/// Parses the document in one pass and validates the top level. Geometry
/// entries are not inspected here.
#[derive(Clone, Debug)]
pub struct CityJsonParser {
    /// Whether to reject versions outside the supported range
    pub check_version: bool,
}

impl Default for CityJsonParser {
    fn default() -> Self {
        Self::new()
    }
}

impl CityJsonParser {
    /// Create a new parser with default settings
    pub fn new() -> Self {
        Self {
            check_version: true,
        }
    }

    /// Set whether the version is checked
    pub fn with_version_check(mut self, enabled: bool) -> Self {
        self.check_version = enabled;
        self
    }

    /// Parse document bytes (UTF-8, optional BOM)
    pub fn parse(&self, bytes: &[u8]) -> Result<CityModel> {
        let raw = RawDocument::from_slice(strip_bom(bytes))?;
        raw.into_model(self.check_version)
    }

    /// Parse with progress reporting
    pub fn parse_with_progress(&self, bytes: &[u8], on_progress: ProgressCallback) -> Result<CityModel> {
        on_progress("Reading document", 0.0);
        let raw = RawDocument::from_slice(strip_bom(bytes))?;

        on_progress("Validating", 60.0);
        let model = raw.into_model(self.check_version)?;

        on_progress("Complete", 100.0);
        Ok(model)
    }
}

/// Remove a leading UTF-8 byte order mark
fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
}

/// Quick parse function for simple use cases
pub fn parse(bytes: &[u8]) -> Result<CityModel> {
    CityJsonParser::new().parse(bytes)
}

/// Parse with progress reporting
pub fn parse_with_progress(
    bytes: &[u8],
    on_progress: impl Fn(&str, f32) + Send + 'static,
) -> Result<CityModel> {
    CityJsonParser::new().parse_with_progress(bytes, Box::new(on_progress))
}

/// Read and parse a file
pub fn load_file(path: impl AsRef<Path>) -> Result<CityModel> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(LoadError::from)?;
    log::debug!("Read {} bytes from {}", bytes.len(), path.display());
    parse(&bytes)
}
