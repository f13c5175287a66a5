//! Reading and datapoint types shared across the filter pipeline
//!
//! A [`Reading`] is one timestamped record from a named asset, carrying a set
//! of named datapoints. Datapoint values are typed: numeric values feed the
//! spectral pipeline, everything else passes through untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A typed scalar carried by one datapoint.
///
/// Variant order matters for deserialization: an integer literal must be
/// tried before the float variant so `5` round-trips as `Integer(5)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DatapointValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl DatapointValue {
    /// Numeric view of the value. `Text` yields `None` and is skipped by the
    /// sample extraction step rather than treated as an error.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Text(_) => None,
        }
    }
}

impl From<i64> for DatapointValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for DatapointValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for DatapointValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

/// A named value within a reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Datapoint {
    pub name: String,
    pub value: DatapointValue,
}

impl Datapoint {
    pub fn new(name: impl Into<String>, value: impl Into<DatapointValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One record flowing through the filter: an asset name, a capture
/// timestamp, and the datapoints sampled at that instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub asset: String,
    pub timestamp: DateTime<Utc>,
    pub datapoints: Vec<Datapoint>,
}

impl Reading {
    /// Create an empty reading stamped with the current time.
    pub fn new(asset: impl Into<String>) -> Self {
        Self {
            asset: asset.into(),
            timestamp: Utc::now(),
            datapoints: Vec::new(),
        }
    }

    /// Builder-style datapoint attachment.
    #[must_use]
    pub fn with_datapoint(
        mut self,
        name: impl Into<String>,
        value: impl Into<DatapointValue>,
    ) -> Self {
        self.datapoints.push(Datapoint::new(name, value));
        self
    }
}
