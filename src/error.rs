//! Error types for the alignment pipeline and the audio reader.

use thiserror::Error;

/// Failures of a synchronization run. None of them are retried: the
/// pipeline is deterministic, so the same inputs fail the same way.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The window does not advance: zero-sized, or overlap swallows it.
    #[error("invalid window configuration: window_size={window_size}, overlap={overlap}")]
    InvalidWindowConfiguration { window_size: usize, overlap: usize },

    /// A spectro-temporal block of zero width or height.
    #[error("invalid bin configuration: spectral_band={spectral_band}, temporal_band={temporal_band}")]
    InvalidBinConfiguration {
        spectral_band: usize,
        temporal_band: usize,
    },

    /// A frame of the wrong length reached the spectral analyzer.
    #[error("malformed frame: expected {expected} samples, got {actual}")]
    MalformedFrame { expected: usize, actual: usize },

    /// The two landmark sets share no frequency index.
    #[error("cannot synchronize: no common landmarks between the two signals")]
    NoCommonLandmarks,
}

/// Failures while reading audio from disk.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("audio file declares zero channels")]
    NoChannels,
}
