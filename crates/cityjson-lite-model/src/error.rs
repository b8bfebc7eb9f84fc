// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for loading a CityJSON document
//!
//! These are the fatal errors of a load. Problems inside a single geometry
//! entry are structural errors of the geometry crate and never reach here.

use thiserror::Error;

/// Result type alias for load operations
pub type Result<T> = std::result::Result<T, LoadError>;

/// Errors that abort loading a whole document
#[derive(Error, Debug)]
pub enum LoadError {
    /// The bytes are not valid JSON, or the top level has the wrong shape
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A required top-level key is absent
    #[error("Missing required key `{0}`")]
    MissingKey(&'static str),

    /// The document is JSON but not a CityJSON document
    #[error("Invalid CityJSON format: {0}")]
    InvalidFormat(String),

    /// CityJSON version whose structure is not supported
    #[error("Unsupported CityJSON version: {0}")]
    UnsupportedVersion(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The host cancelled the load
    #[error("Load cancelled")]
    Cancelled,
}

impl LoadError {
    /// Create a new format error
    pub fn format(msg: impl Into<String>) -> Self {
        LoadError::InvalidFormat(msg.into())
    }

    /// Create an unsupported version error
    pub fn unsupported_version(version: impl Into<String>) -> Self {
        LoadError::UnsupportedVersion(version.into())
    }

    /// Check whether the error is a host cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, LoadError::Cancelled)
    }
}
