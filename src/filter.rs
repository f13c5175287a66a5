//! The filter stage: routes readings through buffering, transform, and
//! band reduction
//!
//! One mutex guards the whole mutable state (configuration plus sample
//! buffers). `ingest` and `reconfigure` each hold it for their full
//! duration, so concurrent callers serialize and a reconfiguration can
//! never interleave with ingestion. Both calls are synchronous and bounded
//! by input size; there are no background tasks.

use std::sync::Mutex;

use tracing::{debug, error, info};

use crate::buffer::SeriesBuffer;
use crate::config::{ConfigError, FilterConfig};
use crate::processing::{reduce_bands, ProcessingError, SpectrumTransform};
use crate::types::{Datapoint, DatapointValue, Reading};

#[derive(Debug)]
struct FilterState {
    config: FilterConfig,
    buffer: SeriesBuffer,
    transform: SpectrumTransform,
}

/// Streaming band-analysis stage.
///
/// Readings from the monitored asset are consumed: their numeric datapoints
/// are buffered per datapoint name, and each full batch is transformed and
/// emitted as one derived reading named `<asset> FFT`. Buffering is keyed by
/// datapoint name so a multi-channel asset (say x/y/z acceleration) batches
/// and transforms each channel independently. All other readings pass
/// through unchanged.
#[derive(Debug)]
pub struct FftFilter {
    state: Mutex<FilterState>,
}

impl FftFilter {
    pub fn new(config: FilterConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let transform = SpectrumTransform::new(config.samples)?;
        Ok(Self {
            state: Mutex::new(FilterState {
                config,
                buffer: SeriesBuffer::new(),
                transform,
            }),
        })
    }

    /// Process one batch of readings, returning the pass-through and derived
    /// readings in arrival order. Consumes every input exactly once; no
    /// error escapes this call.
    pub fn ingest(&self, readings: Vec<Reading>) -> Vec<Reading> {
        let mut state = self.lock_state();
        let mut out = Vec::with_capacity(readings.len());
        for reading in readings {
            if !state.config.enable || reading.asset != state.config.asset {
                out.push(reading);
                continue;
            }
            state.buffer_samples(&reading);
            state.drain_full_series(&mut out);
        }
        out
    }

    /// Parse a JSON reconfiguration payload and atomically replace the live
    /// configuration. Absent options keep their current values; on any
    /// parse or validation error the live configuration is untouched.
    ///
    /// Buffered samples survive reconfiguration — this is a live-tuning
    /// surface, not a reset. If `samples` shrinks below what a series has
    /// already accumulated, the overflow drains on the next matching ingest.
    pub fn reconfigure(&self, payload: &str) -> Result<(), ConfigError> {
        let mut state = self.lock_state();
        let next = state.config.updated(payload)?;
        if next.samples != state.config.samples {
            state.transform = SpectrumTransform::new(next.samples)?;
        }
        info!(
            asset = %next.asset,
            bands = next.bands,
            samples = next.samples,
            low_pass = next.low_pass,
            high_pass = next.high_pass,
            enable = next.enable,
            "filter reconfigured"
        );
        state.config = next;
        Ok(())
    }

    /// Snapshot of the live configuration.
    pub fn config(&self) -> FilterConfig {
        self.lock_state().config.clone()
    }

    /// Buffered sample count for one series, for observability and tests.
    pub fn buffered(&self, series: &str) -> usize {
        self.lock_state().buffer.len(series)
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, FilterState> {
        // A poisoned lock means another caller panicked mid-update; the
        // state cannot be trusted, so propagate.
        self.state
            .lock()
            .expect("filter state poisoned by a panicked thread")
    }
}

impl FilterState {
    /// Extract every numeric datapoint into the series buffer, keyed by
    /// datapoint name. Non-numeric datapoints are skipped, not errors.
    fn buffer_samples(&mut self, reading: &Reading) {
        for dp in &reading.datapoints {
            if let Some(value) = dp.value.as_f64() {
                self.buffer.append(&dp.name, value);
            }
        }
    }

    /// Scan every buffered series and emit one derived reading per full
    /// batch. Loops per series so a batch-size shrink drains accumulated
    /// overflow instead of stalling.
    fn drain_full_series(&mut self, out: &mut Vec<Reading>) {
        for name in self.buffer.names() {
            while self.buffer.is_full(&name, self.config.samples) {
                let batch = self.buffer.take_batch(&name, self.config.samples);
                match self.summarize(&name, &batch) {
                    Ok(reading) => out.push(reading),
                    // Unreachable under a validated configuration; the batch
                    // is dropped rather than letting an error cross the
                    // ingestion boundary.
                    Err(e) => {
                        error!(series = %name, error = %e, "dropping batch: spectral analysis failed");
                    }
                }
            }
        }
    }

    fn summarize(&self, series: &str, batch: &[f64]) -> Result<Reading, ProcessingError> {
        let spectrum = self.transform.compute(batch)?;
        let summary = reduce_bands(
            &spectrum,
            self.config.bands,
            self.config.low_pass,
            self.config.high_pass,
        )?;
        debug!(
            series = %series,
            samples = batch.len(),
            bands = summary.amplitudes.len(),
            peak_bin = summary.peak_bin,
            "emitting spectral summary"
        );

        let mut derived = Reading::new(format!("{} FFT", self.config.asset));
        for (band, amplitude) in summary.amplitudes.iter().enumerate() {
            derived
                .datapoints
                .push(Datapoint::new(format!("Band {band:02}"), *amplitude));
        }
        if self.config.peak {
            derived.datapoints.push(Datapoint::new(
                "Peak Frequency",
                DatapointValue::Integer(summary.peak_bin as i64),
            ));
        }
        Ok(derived)
    }
}
