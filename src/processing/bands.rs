//! Band reduction of a complex spectrum
//!
//! Only the first half of a real-input spectrum is meaningful (the upper
//! half mirrors it), so the reducer scans `[0, n/2)`, trims the cutoff
//! percentages off either end, and averages the remaining magnitudes into
//! contiguous bands.

use num_complex::Complex;

use super::ProcessingError;

/// Result of reducing one spectrum: per-band mean magnitudes in frequency
/// order, plus the bin index of the peak magnitude within the scanned range.
///
/// The peak is always computed; whether it is emitted on the output reading
/// is a configuration choice made by the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub struct BandSummary {
    pub amplitudes: Vec<f64>,
    pub peak_bin: usize,
}

/// Partition the usable half-spectrum into bands of equal bin count and
/// average the magnitudes within each.
///
/// All index arithmetic is integer floor division: with `half = n / 2`,
/// the scanned range is `[low_pass * half / 100, half - high_pass * half / 100)`
/// and each band covers `span / bands` bins. A band value is emitted only
/// when its bin group completes, so trailing bins that do not fill a group
/// are dropped and the emitted count is exactly `span / (span / bands)` —
/// which can differ from `bands` when the span does not divide evenly.
pub fn reduce_bands(
    spectrum: &[Complex<f64>],
    bands: usize,
    low_pass: usize,
    high_pass: usize,
) -> Result<BandSummary, ProcessingError> {
    let half = spectrum.len() / 2;
    let first = low_pass * half / 100;
    let last = half - high_pass * half / 100;
    let span = last.saturating_sub(first);
    let per_band = if bands == 0 { 0 } else { span / bands };
    if per_band == 0 {
        // Configuration validation rejects this before ingestion can see it;
        // kept as a hard error so the reducer never loops without emitting.
        return Err(ProcessingError::BandsExceedSpan { bands, span });
    }

    let mut amplitudes = Vec::with_capacity(bands);
    let mut sum = 0.0;
    let mut count = 0usize;
    let mut peak = 0.0_f64;
    let mut peak_bin = first;

    for (bin, value) in spectrum.iter().enumerate().skip(first).take(span) {
        let magnitude = value.norm();
        if magnitude > peak {
            peak = magnitude;
            peak_bin = bin;
        }
        sum += magnitude;
        count += 1;
        if count == per_band {
            amplitudes.push(sum / per_band as f64);
            sum = 0.0;
            count = 0;
        }
    }

    Ok(BandSummary {
        amplitudes,
        peak_bin,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Full spectrum whose half-range magnitudes are the bin index itself.
    fn ramp_spectrum(half: usize) -> Vec<Complex<f64>> {
        (0..half * 2)
            .map(|i| Complex::new(i.min(half * 2 - 1 - i) as f64, 0.0))
            .collect()
    }

    #[test]
    fn even_span_fills_every_band() {
        // half = 100, no trims, 10 bands of 10 bins each
        let spectrum = ramp_spectrum(100);
        let summary = reduce_bands(&spectrum, 10, 0, 0).expect("reduce");
        assert_eq!(summary.amplitudes.len(), 10);
        // band 0 averages bins 0..10 -> 4.5; band 9 averages 90..100 -> 94.5
        assert!((summary.amplitudes[0] - 4.5).abs() < 1e-9);
        assert!((summary.amplitudes[9] - 94.5).abs() < 1e-9);
    }

    #[test]
    fn uneven_span_drops_trailing_bins() {
        // half = 105, 10 bands -> 10 bins per band, bins 100..105 dropped
        let spectrum = ramp_spectrum(105);
        let summary = reduce_bands(&spectrum, 10, 0, 0).expect("reduce");
        assert_eq!(summary.amplitudes.len(), 10);
        assert!((summary.amplitudes[9] - 94.5).abs() < 1e-9);
    }

    #[test]
    fn cutoffs_trim_scanned_range() {
        // half = 100, lowPass 10% / highPass 20% -> bins [10, 80)
        let spectrum = ramp_spectrum(100);
        let summary = reduce_bands(&spectrum, 7, 10, 20).expect("reduce");
        // span 70, 7 bands of 10 bins; first band averages bins 10..20
        assert_eq!(summary.amplitudes.len(), 7);
        assert!((summary.amplitudes[0] - 14.5).abs() < 1e-9);
        // peak is the highest in-range bin, not the global half-spectrum peak
        assert_eq!(summary.peak_bin, 79);
    }

    #[test]
    fn peak_bin_tracks_maximum_magnitude() {
        let mut spectrum = vec![Complex::new(0.1, 0.0); 128];
        spectrum[23] = Complex::new(3.0, 4.0); // magnitude 5
        let summary = reduce_bands(&spectrum, 4, 0, 0).expect("reduce");
        assert_eq!(summary.peak_bin, 23);
    }

    #[test]
    fn zero_spectrum_gives_zero_bands() {
        let spectrum = vec![Complex::new(0.0, 0.0); 64];
        let summary = reduce_bands(&spectrum, 4, 0, 0).expect("reduce");
        assert_eq!(summary.amplitudes, vec![0.0; 4]);
    }

    #[test]
    fn more_bands_than_bins_is_an_error() {
        let spectrum = vec![Complex::new(1.0, 0.0); 16];
        let err = reduce_bands(&spectrum, 20, 0, 0).expect_err("must reject");
        assert!(matches!(
            err,
            ProcessingError::BandsExceedSpan { bands: 20, span: 8 }
        ));
    }
}
