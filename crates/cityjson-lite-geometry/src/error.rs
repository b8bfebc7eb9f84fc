// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for geometry reading
//!
//! These are structural errors: they cost one geometry entry and are counted
//! by the reader, they never abort a load.

use thiserror::Error;

/// Geometry reading result type
pub type Result<T> = std::result::Result<T, Error>;

/// Structural geometry errors
#[derive(Error, Debug)]
pub enum Error {
    /// Vertex index past the end of the vertex array
    #[error("Vertex index {index} out of range ({len} vertices)")]
    IndexOutOfRange { index: usize, len: usize },

    /// Boundary array with an unexpected shape
    #[error("Malformed boundaries: {0}")]
    MalformedBoundaries(String),

    /// Required key missing from a geometry entry
    #[error("Missing key: {0}")]
    MissingKey(&'static str),

    /// Semantics object that does not match the boundaries
    #[error("Invalid semantics: {0}")]
    InvalidSemantics(String),

    /// Instance referencing a template that does not exist
    #[error("Geometry template not found: {0}")]
    UnknownTemplate(usize),

    /// Instance in a model without `geometry-templates`
    #[error("Geometry instance without geometry templates")]
    MissingTemplates,

    /// Geometry type without polygons
    #[error("Unsupported geometry type: {0}")]
    UnsupportedType(String),
}

impl Error {
    /// Create a malformed boundaries error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Error::MalformedBoundaries(msg.into())
    }

    /// Create an invalid semantics error
    pub fn invalid_semantics(msg: impl Into<String>) -> Self {
        Error::InvalidSemantics(msg.into())
    }

    /// Create an index out of range error
    pub fn index_out_of_range(index: usize, len: usize) -> Self {
        Error::IndexOutOfRange { index, len }
    }

    /// Create an unsupported type error
    pub fn unsupported_type(type_name: impl Into<String>) -> Self {
        Error::UnsupportedType(type_name.into())
    }
}
