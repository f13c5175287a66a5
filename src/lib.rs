//! spectral-filter: streaming FFT band analysis for sensor readings
//!
//! A synchronous pipeline stage that buffers numeric samples per data
//! series, transforms each full batch into a frequency spectrum, and emits
//! derived readings carrying band-averaged amplitudes.
//!
//! ## Architecture
//!
//! - **Series Buffer**: per-datapoint sample accumulation with
//!   batch-boundary detection
//! - **Transform Engine**: pre-planned forward FFT over one batch
//! - **Band Reducer**: half-spectrum magnitude averaging into frequency
//!   bands, with peak detection
//! - **Filter**: owns the mutable state behind one lock, routes the record
//!   stream, and applies live reconfiguration
//!
//! The host feeds batches of [`Reading`]s to [`FftFilter::ingest`] and JSON
//! option payloads to [`FftFilter::reconfigure`]; both may be called from
//! different threads and serialize on the same lock.

pub mod buffer;
pub mod config;
pub mod filter;
pub mod processing;
pub mod types;

pub use buffer::SeriesBuffer;
pub use config::{ConfigError, FilterConfig};
pub use filter::FftFilter;
pub use processing::{reduce_bands, BandSummary, ProcessingError, SpectrumTransform};
pub use types::{Datapoint, DatapointValue, Reading};
