//! Filter configuration: parsing, partial updates, validation
//!
//! Reconfiguration payloads arrive as JSON text from the host's
//! configuration layer. Any option absent from a payload leaves the current
//! value unchanged; the merged result is validated as a whole before it
//! replaces the live configuration, so a bad payload never leaves the filter
//! half-updated.
//!
//! The host delivers option values either as native JSON types or as
//! strings (`"samples": "64"`), so numeric and boolean fields accept both.
//! Malformed text is rejected outright rather than silently defaulting.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::processing::ProcessingError;

/// Errors raised while parsing or validating a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid configuration payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("'{field}' must be a non-negative integer, got '{value}'")]
    NotNumeric { field: &'static str, value: String },

    #[error("'{field}' must be a boolean, got '{value}'")]
    NotBoolean { field: &'static str, value: String },

    #[error("'{field}' must be at least 1")]
    ZeroField { field: &'static str },

    #[error("'{field}' is a percentage and must be within 0-100, got {value}")]
    PercentRange { field: &'static str, value: usize },

    #[error(
        "{bands} bands cannot be averaged from {span} usable spectrum bins; \
         lower 'bands', raise 'samples', or relax the cutoffs"
    )]
    BandResolution { bands: usize, span: usize },

    #[error("transform setup failed: {0}")]
    Processing(#[from] ProcessingError),
}

/// Live configuration of the filter stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterConfig {
    /// When false the stage is inert: every reading passes through.
    pub enable: bool,
    /// Asset name whose readings are routed into the spectral pipeline.
    pub asset: String,
    /// Number of frequency bands averaged out of each spectrum.
    pub bands: usize,
    /// Samples accumulated per series before a transform runs.
    pub samples: usize,
    /// Percentage of the half-spectrum trimmed from the low-frequency end.
    pub low_pass: usize,
    /// Percentage of the half-spectrum trimmed from the high-frequency end.
    pub high_pass: usize,
    /// Attach the peak bin index to emitted readings as `Peak Frequency`.
    pub peak: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            enable: true,
            asset: "vibration".to_string(),
            bands: 5,
            samples: 64,
            low_pass: 0,
            high_pass: 0,
            peak: false,
        }
    }
}

impl FilterConfig {
    /// Merge a JSON reconfiguration payload onto this configuration and
    /// validate the result. `self` is never mutated; callers swap in the
    /// returned configuration only on success.
    pub fn updated(&self, payload: &str) -> Result<Self, ConfigError> {
        let update: ConfigUpdate = serde_json::from_str(payload)?;
        let mut next = self.clone();
        // An empty value means "leave unchanged", same as an absent key.
        if let Some(v) = update.enable.filter(|v| !v.is_blank()) {
            next.enable = v.into_bool("enable")?;
        }
        if let Some(v) = update.asset.filter(|v| !v.trim().is_empty()) {
            next.asset = v;
        }
        if let Some(v) = update.bands.filter(|v| !v.is_blank()) {
            next.bands = v.into_uint("bands")?;
        }
        if let Some(v) = update.samples.filter(|v| !v.is_blank()) {
            next.samples = v.into_uint("samples")?;
        }
        if let Some(v) = update.low_pass.filter(|v| !v.is_blank()) {
            next.low_pass = v.into_uint("lowPass")?;
        }
        if let Some(v) = update.high_pass.filter(|v| !v.is_blank()) {
            next.high_pass = v.into_uint("highPass")?;
        }
        if let Some(v) = update.peak.filter(|v| !v.is_blank()) {
            next.peak = v.into_bool("peak")?;
        }
        next.validate()?;
        Ok(next)
    }

    /// Check every configuration invariant, including that the cutoff trims
    /// leave enough spectrum bins to fill each band with at least one bin.
    /// A configuration that passes here cannot stall or error during
    /// ingestion.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bands == 0 {
            return Err(ConfigError::ZeroField { field: "bands" });
        }
        if self.samples == 0 {
            return Err(ConfigError::ZeroField { field: "samples" });
        }
        if self.low_pass > 100 {
            return Err(ConfigError::PercentRange {
                field: "lowPass",
                value: self.low_pass,
            });
        }
        if self.high_pass > 100 {
            return Err(ConfigError::PercentRange {
                field: "highPass",
                value: self.high_pass,
            });
        }
        let (first, last) = self.analysis_span();
        let span = last.saturating_sub(first);
        if span / self.bands == 0 {
            return Err(ConfigError::BandResolution {
                bands: self.bands,
                span,
            });
        }
        Ok(())
    }

    /// First (inclusive) and last (exclusive) half-spectrum bins analyzed
    /// after the percentage trims, using the same floor arithmetic as the
    /// band reducer.
    pub fn analysis_span(&self) -> (usize, usize) {
        let half = self.samples / 2;
        let first = self.low_pass * half / 100;
        let last = half - self.high_pass * half / 100;
        (first, last)
    }
}

// ============================================================================
// Reconfiguration payload
// ============================================================================

/// Raw partial update as deserialized from the payload. Every field is
/// optional; typed resolution happens in [`FilterConfig::updated`] so a type
/// error can name the offending field.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigUpdate {
    enable: Option<FlexValue>,
    asset: Option<String>,
    bands: Option<FlexValue>,
    samples: Option<FlexValue>,
    #[serde(rename = "lowPass")]
    low_pass: Option<FlexValue>,
    #[serde(rename = "highPass")]
    high_pass: Option<FlexValue>,
    peak: Option<FlexValue>,
}

/// A payload value that may arrive as a native JSON type or as a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum FlexValue {
    Uint(u64),
    Bool(bool),
    Text(String),
}

impl FlexValue {
    fn is_blank(&self) -> bool {
        matches!(self, Self::Text(s) if s.trim().is_empty())
    }

    fn into_uint(self, field: &'static str) -> Result<usize, ConfigError> {
        match self {
            Self::Uint(v) => Ok(v as usize),
            Self::Text(s) => s
                .trim()
                .parse::<usize>()
                .map_err(|_| ConfigError::NotNumeric { field, value: s }),
            Self::Bool(b) => Err(ConfigError::NotNumeric {
                field,
                value: b.to_string(),
            }),
        }
    }

    fn into_bool(self, field: &'static str) -> Result<bool, ConfigError> {
        match self {
            Self::Bool(v) => Ok(v),
            Self::Text(s) => {
                if s.eq_ignore_ascii_case("true") {
                    Ok(true)
                } else if s.eq_ignore_ascii_case("false") {
                    Ok(false)
                } else {
                    Err(ConfigError::NotBoolean { field, value: s })
                }
            }
            Self::Uint(v) => Err(ConfigError::NotBoolean {
                field,
                value: v.to_string(),
            }),
        }
    }
}
