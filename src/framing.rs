//! Splits a signal into fixed-size, evenly spaced analysis frames.
//!
//! Frames are views into one contiguous buffer (`offset = index * step_size`),
//! so a long recording is never copied once per frame. The buffer is the
//! caller's slice itself unless trailing zeros are needed, in which case a
//! single padded copy is made.

use std::borrow::Cow;

use rayon::prelude::*;

use crate::error::SyncError;

/// Number of full frames a signal of `len` samples yields.
///
/// Signals shorter than one window yield no frames.
pub fn num_windows(len: usize, window_size: usize, step_size: usize) -> usize {
    if len < window_size {
        0
    } else {
        (len - window_size) / step_size + 1
    }
}

/// Trailing zeros needed so the last frame is full length.
pub fn padding_len(len: usize, window_size: usize, step_size: usize) -> usize {
    match num_windows(len, window_size, step_size) {
        0 => 0,
        n => ((n - 1) * step_size + window_size).saturating_sub(len),
    }
}

#[derive(Debug, Clone)]
pub struct Frames<'a> {
    buffer: Cow<'a, [f32]>,
    window_size: usize,
    step_size: usize,
    num_windows: usize,
    padding: usize,
}

impl<'a> Frames<'a> {
    pub fn new(signal: &'a [f32], window_size: usize, overlap: usize) -> Result<Self, SyncError> {
        if window_size == 0 || overlap >= window_size {
            return Err(SyncError::InvalidWindowConfiguration {
                window_size,
                overlap,
            });
        }
        let step_size = window_size - overlap;
        let num_windows = num_windows(signal.len(), window_size, step_size);
        let padding = padding_len(signal.len(), window_size, step_size);

        let buffer = if padding == 0 {
            Cow::Borrowed(signal)
        } else {
            let mut padded = Vec::with_capacity(signal.len() + padding);
            padded.extend_from_slice(signal);
            padded.resize(signal.len() + padding, 0.0);
            Cow::Owned(padded)
        };

        Ok(Self {
            buffer,
            window_size,
            step_size,
            num_windows,
            padding,
        })
    }

    pub fn len(&self) -> usize {
        self.num_windows
    }

    pub fn is_empty(&self) -> bool {
        self.num_windows == 0
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn step_size(&self) -> usize {
        self.step_size
    }

    /// Zeros appended after the signal's last sample.
    pub fn padding_len(&self) -> usize {
        self.padding
    }

    pub fn get(&self, index: usize) -> Option<&[f32]> {
        if index >= self.num_windows {
            return None;
        }
        let start = index * self.step_size;
        self.buffer.get(start..start + self.window_size)
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &[f32]> + '_ {
        (0..self.num_windows).map(move |index| self.frame_at(index))
    }

    pub fn par_iter(&self) -> impl IndexedParallelIterator<Item = &[f32]> + '_ {
        (0..self.num_windows)
            .into_par_iter()
            .map(move |index| self.frame_at(index))
    }

    // index < num_windows guarantees the range lies inside the (padded) buffer
    fn frame_at(&self, index: usize) -> &[f32] {
        let start = index * self.step_size;
        &self.buffer[start..start + self.window_size]
    }
}
