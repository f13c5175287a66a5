//! Spectral processing: forward transform and band reduction
//!
//! Both halves are pure and stateless between calls; the orchestrator owns
//! all mutable state and needs no synchronization here.

mod bands;
mod transform;

pub use bands::{reduce_bands, BandSummary};
pub use transform::SpectrumTransform;

use thiserror::Error;

/// Errors in spectral processing.
#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("transform length must be at least 1")]
    EmptyTransform,

    #[error("batch length {got} does not match transform length {expected}")]
    LengthMismatch { expected: usize, got: usize },

    #[error("{bands} bands cannot be averaged from {span} usable bins")]
    BandsExceedSpan { bands: usize, span: usize },
}
