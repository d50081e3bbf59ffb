use std::sync::Arc;

use rayon::prelude::*;
use rustfft::{Fft, FftPlanner, num_complex::Complex};

use crate::config::MAGNITUDE_DECIMALS;
use crate::error::SyncError;
use crate::framing::Frames;

/// One row of magnitudes per frame, `window_size / 2` columns each.
pub type Spectrogram = Vec<Vec<f64>>;

/// Computes rounded magnitude spectra of fixed-size frames.
///
/// The FFT plan is built once and shared by every worker.
#[derive(Clone)]
pub struct SpectralAnalyzer {
    window_size: usize,
    fft: Arc<dyn Fft<f64>>,
}

impl SpectralAnalyzer {
    pub fn new(window_size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(window_size);
        Self { window_size, fft }
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Magnitudes of the non-redundant half of the frame's spectrum,
    /// rounded to [`MAGNITUDE_DECIMALS`] places.
    pub fn magnitudes(&self, frame: &[f32]) -> Result<Vec<f64>, SyncError> {
        if frame.len() != self.window_size {
            return Err(SyncError::MalformedFrame {
                expected: self.window_size,
                actual: frame.len(),
            });
        }

        let mut complex_buffer: Vec<Complex<f64>> = frame
            .iter()
            .map(|&sample| Complex::new(sample as f64, 0.0))
            .collect();

        self.fft.process(&mut complex_buffer);

        let num_freq_bins = self.window_size / 2;
        Ok(complex_buffer[..num_freq_bins]
            .iter()
            .map(|c| round_to(c.norm(), MAGNITUDE_DECIMALS))
            .collect())
    }

    pub fn spectrogram(&self, frames: &Frames<'_>) -> Result<Spectrogram, SyncError> {
        let spectrogram = frames
            .par_iter()
            .map(|frame| self.magnitudes(frame))
            .collect::<Result<Spectrogram, _>>()?;

        tracing::debug!(
            "Spectrogram: {} frames x {} frequency bins",
            spectrogram.len(),
            self.window_size / 2
        );
        Ok(spectrogram)
    }
}

impl std::fmt::Debug for SpectralAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpectralAnalyzer")
            .field("window_size", &self.window_size)
            .finish_non_exhaustive()
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn cosine(window_size: usize, bin: usize, phase: f64) -> Vec<f32> {
        (0..window_size)
            .map(|n| (2.0 * PI * bin as f64 * n as f64 / window_size as f64 + phase).cos() as f32)
            .collect()
    }

    #[test]
    fn keeps_half_the_spectrum() {
        let analyzer = SpectralAnalyzer::new(64);
        let magnitudes = analyzer.magnitudes(&[0.25; 64]).unwrap();
        assert_eq!(magnitudes.len(), 32);

        let odd = SpectralAnalyzer::new(9);
        assert_eq!(odd.magnitudes(&[1.0; 9]).unwrap().len(), 4);
    }

    #[test]
    fn constant_frame_is_all_dc() {
        let analyzer = SpectralAnalyzer::new(32);
        let magnitudes = analyzer.magnitudes(&[1.0; 32]).unwrap();
        assert_eq!(magnitudes[0], 32.0);
        assert!(magnitudes[1..].iter().all(|&m| m == 0.0));
    }

    #[test]
    fn cosine_peaks_at_its_bin() {
        let analyzer = SpectralAnalyzer::new(64);
        let magnitudes = analyzer.magnitudes(&cosine(64, 5, 0.3)).unwrap();
        assert!((magnitudes[5] - 32.0).abs() < 0.011);
        for (bin, &m) in magnitudes.iter().enumerate() {
            assert!(m >= 0.0);
            if bin != 5 {
                assert!(m < 0.01, "bin {bin} has magnitude {m}");
            }
        }
    }

    #[test]
    fn magnitudes_ignore_circular_rotation() {
        let analyzer = SpectralAnalyzer::new(128);
        let frame: Vec<f32> = (0..128).map(|n| ((n * 37 % 11) as f32) - 5.0).collect();
        let mut rotated = frame.clone();
        rotated.rotate_left(29);

        let a = analyzer.magnitudes(&frame).unwrap();
        let b = analyzer.magnitudes(&rotated).unwrap();
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() <= 0.01 + 1e-9);
        }
    }

    #[test]
    fn magnitudes_are_rounded_to_two_places() {
        let analyzer = SpectralAnalyzer::new(16);
        let frame: Vec<f32> = (0..16).map(|n| (n as f32 * 0.731).sin()).collect();
        for m in analyzer.magnitudes(&frame).unwrap() {
            assert!(((m * 100.0).round() - m * 100.0).abs() < 1e-6);
        }
    }

    #[test]
    fn rejects_wrong_frame_length() {
        let analyzer = SpectralAnalyzer::new(16);
        assert!(matches!(
            analyzer.magnitudes(&[0.0; 15]),
            Err(SyncError::MalformedFrame {
                expected: 16,
                actual: 15
            })
        ));
    }

    #[test]
    fn spectrogram_has_one_row_per_frame() {
        let signal: Vec<f32> = (0..1000).map(|n| (n as f32 * 0.05).sin()).collect();
        let frames = Frames::new(&signal, 64, 16).unwrap();
        let analyzer = SpectralAnalyzer::new(64);
        let spectrogram = analyzer.spectrogram(&frames).unwrap();
        assert_eq!(spectrogram.len(), frames.len());
        assert!(spectrogram.iter().all(|row| row.len() == 32));
    }

    #[test]
    fn mismatched_frames_are_malformed() {
        let signal = vec![0.0f32; 256];
        let frames = Frames::new(&signal, 32, 0).unwrap();
        let analyzer = SpectralAnalyzer::new(64);
        assert!(matches!(
            analyzer.spectrogram(&frames),
            Err(SyncError::MalformedFrame { .. })
        ));
    }
}
