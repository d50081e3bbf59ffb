use crate::error::SyncError;

// Analysis Parameters
pub const WINDOW_SIZE: usize = 1024;
pub const OVERLAP: usize = 0;
pub const MAGNITUDE_DECIMALS: i32 = 2;

// Landmark Selection Parameters
pub const SPECTRAL_BAND: usize = 512;
pub const TEMPORAL_BAND: usize = 43;
pub const PEAKS_PER_BIN: usize = 7;

// Alignment Quality Parameters
pub const HIGH_CONFIDENCE_THRESHOLD: f64 = 15.0;
pub const MEDIUM_CONFIDENCE_THRESHOLD: f64 = 5.0;

/// Parameters shared by every stage of one synchronization run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncParams {
    /// Samples per analysis frame.
    pub window_size: usize,
    /// Samples shared by consecutive frames.
    pub overlap: usize,
    /// Frequency bins per spectro-temporal block.
    pub spectral_band: usize,
    /// Frames per spectro-temporal block.
    pub temporal_band: usize,
    /// Landmarks kept per block.
    pub peaks_per_bin: usize,
}

impl Default for SyncParams {
    fn default() -> Self {
        Self {
            window_size: WINDOW_SIZE,
            overlap: OVERLAP,
            spectral_band: SPECTRAL_BAND,
            temporal_band: TEMPORAL_BAND,
            peaks_per_bin: PEAKS_PER_BIN,
        }
    }
}

impl SyncParams {
    /// Distance in samples between the starts of consecutive frames.
    ///
    /// Only meaningful once [`SyncParams::validate`] has passed.
    pub fn step_size(&self) -> usize {
        self.window_size.saturating_sub(self.overlap)
    }

    /// Number of magnitudes kept per frame.
    pub fn spectrum_len(&self) -> usize {
        self.window_size / 2
    }

    pub fn validate(&self) -> Result<(), SyncError> {
        if self.window_size == 0 || self.overlap >= self.window_size {
            return Err(SyncError::InvalidWindowConfiguration {
                window_size: self.window_size,
                overlap: self.overlap,
            });
        }
        if self.spectral_band == 0 || self.temporal_band == 0 {
            return Err(SyncError::InvalidBinConfiguration {
                spectral_band: self.spectral_band,
                temporal_band: self.temporal_band,
            });
        }
        Ok(())
    }
}
