//! Estimates the offset between two recordings of the same source by
//! matching spectral landmarks.
//!
//! Each signal is framed, turned into a magnitude spectrogram, and reduced
//! to the strongest cells of every spectro-temporal block. Landmarks that
//! share a frequency index then vote for the frame offset between them.
//!
//! ```no_run
//! use audiosync::{SyncParams, audio::read_audio, synchronize};
//!
//! let base = read_audio("take1.wav")?;
//! let other = read_audio("take2.wav")?;
//! let delay = synchronize(&base.samples, &other.samples, &SyncParams::default())?;
//! println!("take2 lags take1 by {delay} frames");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod audio;
pub mod config;
pub mod delay;
pub mod error;
pub mod framing;
pub mod peaks;
pub mod report;
pub mod spectrum;
pub mod visualize;

pub use config::SyncParams;
pub use delay::{Alignment, DelayHistogram};
pub use error::{AudioError, SyncError};
pub use peaks::PeakMap;
pub use spectrum::{SpectralAnalyzer, Spectrogram};

use framing::Frames;

/// Magnitude spectrogram of `signal`.
pub fn spectrogram(signal: &[f32], params: &SyncParams) -> Result<Spectrogram, SyncError> {
    params.validate()?;
    let analyzer = SpectralAnalyzer::new(params.window_size);
    compute_spectrogram(signal, &analyzer, params)
}

/// Landmarks of `signal`, keyed by frequency index.
pub fn fingerprint(signal: &[f32], params: &SyncParams) -> Result<PeakMap, SyncError> {
    params.validate()?;
    let analyzer = SpectralAnalyzer::new(params.window_size);
    landmarks(signal, &analyzer, params)
}

/// Frame offset of `other` relative to `base` together with its vote
/// support. Positive means `other` starts later.
pub fn align(base: &[f32], other: &[f32], params: &SyncParams) -> Result<Alignment, SyncError> {
    params.validate()?;
    let analyzer = SpectralAnalyzer::new(params.window_size);

    let (base_peaks, other_peaks) = rayon::join(
        || landmarks(base, &analyzer, params),
        || landmarks(other, &analyzer, params),
    );
    let alignment = delay::estimate_delay(&base_peaks?, &other_peaks?)?;

    tracing::info!(
        "Estimated delay: {} frames ({} of {} votes, {:.1}%)",
        alignment.delay,
        alignment.votes,
        alignment.total_votes,
        alignment.confidence()
    );
    if alignment.match_quality() == "Low" {
        tracing::warn!("Delay is weakly supported; the recordings may not overlap");
    }
    Ok(alignment)
}

/// Delay of `other` relative to `base`, in frames of `params.step_size()`
/// samples.
pub fn synchronize(base: &[f32], other: &[f32], params: &SyncParams) -> Result<i64, SyncError> {
    align(base, other, params).map(|alignment| alignment.delay)
}

fn compute_spectrogram(
    signal: &[f32],
    analyzer: &SpectralAnalyzer,
    params: &SyncParams,
) -> Result<Spectrogram, SyncError> {
    let frames = Frames::new(signal, params.window_size, params.overlap)?;
    tracing::debug!(
        "Framed {} samples into {} windows ({} padding)",
        signal.len(),
        frames.len(),
        frames.padding_len()
    );
    analyzer.spectrogram(&frames)
}

fn landmarks(
    signal: &[f32],
    analyzer: &SpectralAnalyzer,
    params: &SyncParams,
) -> Result<PeakMap, SyncError> {
    let spectrogram = compute_spectrogram(signal, analyzer, params)?;
    peaks::extract_peaks(
        &spectrogram,
        params.spectral_band,
        params.temporal_band,
        params.peaks_per_bin,
    )
}
