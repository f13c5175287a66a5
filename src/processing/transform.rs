//! Forward FFT over one batch of real-valued samples

use std::sync::Arc;

use num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use super::ProcessingError;

/// Pre-planned forward FFT for repeated computation at a fixed batch size.
///
/// The planner's mixed-radix path handles any length, so the batch size is
/// not restricted to powers of two. Re-plan (cheaply) when the configured
/// batch size changes.
pub struct SpectrumTransform {
    fft: Arc<dyn Fft<f64>>,
    size: usize,
}

impl std::fmt::Debug for SpectrumTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpectrumTransform")
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

impl SpectrumTransform {
    pub fn new(size: usize) -> Result<Self, ProcessingError> {
        if size == 0 {
            return Err(ProcessingError::EmptyTransform);
        }
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        Ok(Self { fft, size })
    }

    pub const fn size(&self) -> usize {
        self.size
    }

    /// Transform one batch of samples into its complex spectrum.
    ///
    /// Real samples enter with zero imaginary part. The output is the raw
    /// butterfly result, unnormalized: a unit-amplitude sinusoid at bin `k`
    /// shows magnitude `size / 2` at bin `k`. The band reducer consumes
    /// these magnitudes as-is.
    pub fn compute(&self, samples: &[f64]) -> Result<Vec<Complex<f64>>, ProcessingError> {
        if samples.len() != self.size {
            return Err(ProcessingError::LengthMismatch {
                expected: self.size,
                got: samples.len(),
            });
        }

        let mut buffer: Vec<Complex<f64>> =
            samples.iter().map(|&x| Complex::new(x, 0.0)).collect();
        self.fft.process(&mut buffer);
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn rejects_zero_length() {
        assert!(matches!(
            SpectrumTransform::new(0),
            Err(ProcessingError::EmptyTransform)
        ));
    }

    #[test]
    fn rejects_length_mismatch() {
        let transform = SpectrumTransform::new(8).expect("plan");
        let err = transform.compute(&[0.0; 4]).expect_err("must reject");
        assert!(matches!(
            err,
            ProcessingError::LengthMismatch {
                expected: 8,
                got: 4
            }
        ));
    }

    #[test]
    fn zero_input_gives_zero_spectrum() {
        let transform = SpectrumTransform::new(16).expect("plan");
        let spectrum = transform.compute(&[0.0; 16]).expect("compute");
        assert_eq!(spectrum.len(), 16);
        assert!(spectrum.iter().all(|c| c.norm() == 0.0));
    }

    #[test]
    fn dc_input_concentrates_in_bin_zero() {
        let transform = SpectrumTransform::new(8).expect("plan");
        let spectrum = transform.compute(&[1.0; 8]).expect("compute");
        assert!((spectrum[0].norm() - 8.0).abs() < 1e-9);
        for bin in &spectrum[1..] {
            assert!(bin.norm() < 1e-9);
        }
    }

    #[test]
    fn sinusoid_peaks_at_its_bin() {
        let n = 64;
        let k = 5;
        let samples: Vec<f64> = (0..n)
            .map(|i| (2.0 * PI * k as f64 * i as f64 / n as f64).sin())
            .collect();

        let transform = SpectrumTransform::new(n).expect("plan");
        let spectrum = transform.compute(&samples).expect("compute");

        // Unnormalized: the sinusoid's energy lands at bins k and n-k with
        // magnitude n/2 each.
        assert!((spectrum[k].norm() - n as f64 / 2.0).abs() < 1e-6);
        for (bin, value) in spectrum.iter().enumerate().take(n / 2) {
            if bin != k {
                assert!(value.norm() < 1e-6, "unexpected energy at bin {bin}");
            }
        }
    }

    #[test]
    fn non_power_of_two_length_works() {
        let n = 48;
        let samples: Vec<f64> = (0..n)
            .map(|i| (2.0 * PI * 3.0 * i as f64 / n as f64).cos())
            .collect();

        let transform = SpectrumTransform::new(n).expect("plan");
        let spectrum = transform.compute(&samples).expect("compute");
        assert!((spectrum[3].norm() - n as f64 / 2.0).abs() < 1e-6);
    }
}
