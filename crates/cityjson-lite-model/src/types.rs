// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core identifier and level-of-detail types

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;

/// Type-safe city object identifier
///
/// Wraps the key of an entry in `CityObjects` (e.g. `"id-1"`).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub String);

impl ObjectId {
    /// Create a new object id
    pub fn new(id: impl Into<String>) -> Self {
        ObjectId(id.into())
    }

    /// Get the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectId {
    fn from(id: &str) -> Self {
        ObjectId(id.to_string())
    }
}

impl From<String> for ObjectId {
    fn from(id: String) -> Self {
        ObjectId(id)
    }
}

impl Borrow<str> for ObjectId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Level-of-detail token
///
/// CityJSON stores LoD as a number (`2`, `2.2`) or a string (`"2.2"`). The
/// value is kept as its canonical text so `2` and `"2"` are the same LoD.
/// Numeric LoDs sort numerically and before any non-numeric ones.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LodValue(String);

impl LodValue {
    /// Create a LoD from its text form
    pub fn new(lod: impl Into<String>) -> Self {
        LodValue(lod.into())
    }

    /// Read a LoD from a JSON value (number or string)
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(LodValue(n.to_string())),
            Value::String(s) => Some(LodValue(s.clone())),
            _ => None,
        }
    }

    /// Get the canonical text of this LoD
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value, if the LoD is a number
    pub fn as_f64(&self) -> Option<f64> {
        self.0.parse::<f64>().ok()
    }
}

impl fmt::Display for LodValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LodValue {
    fn from(lod: &str) -> Self {
        LodValue(lod.to_string())
    }
}

impl PartialOrd for LodValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LodValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.as_f64(), other.as_f64()) {
            (Some(a), Some(b)) => a.total_cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

/// Active LoD selection
///
/// `All` is the sentinel meaning "no LoD filter".
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LodFilter {
    /// Keep every geometry
    #[default]
    All,
    /// Keep only geometries with this LoD
    Only(LodValue),
}

impl LodFilter {
    /// Name of the "no filter" sentinel
    pub const ALL: &'static str = "All";

    /// Parse a filter from its text form (`"All"` or a LoD)
    pub fn parse(s: &str) -> Self {
        if s == Self::ALL {
            LodFilter::All
        } else {
            LodFilter::Only(LodValue::new(s))
        }
    }

    /// Check whether a geometry with the given LoD passes the filter
    ///
    /// With a specific filter, a geometry without LoD never passes.
    pub fn matches(&self, lod: Option<&LodValue>) -> bool {
        match self {
            LodFilter::All => true,
            LodFilter::Only(target) => lod == Some(target),
        }
    }

    /// Check if this is the `All` sentinel
    pub fn is_all(&self) -> bool {
        matches!(self, LodFilter::All)
    }
}

impl From<String> for LodFilter {
    fn from(s: String) -> Self {
        LodFilter::parse(&s)
    }
}

impl From<LodFilter> for String {
    fn from(filter: LodFilter) -> Self {
        match filter {
            LodFilter::All => LodFilter::ALL.to_string(),
            LodFilter::Only(lod) => lod.0,
        }
    }
}

impl fmt::Display for LodFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LodFilter::All => f.write_str(LodFilter::ALL),
            LodFilter::Only(lod) => write!(f, "{}", lod),
        }
    }
}
