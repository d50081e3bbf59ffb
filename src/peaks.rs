//! Landmark selection.
//!
//! The magnitude matrix is cut into a grid of spectro-temporal blocks and
//! only the strongest few cells of each block survive. Survivors are then
//! indexed by frequency alone: which temporal block a landmark came from is
//! forgotten, and the frequency index becomes the join key between two
//! recordings.

use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeMap, BinaryHeap};

use rayon::prelude::*;

use crate::error::SyncError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BinKey {
    pub temporal_block: usize,
    pub spectral_block: usize,
}

impl BinKey {
    pub fn of(
        frame_index: usize,
        frequency_index: usize,
        spectral_band: usize,
        temporal_band: usize,
    ) -> Self {
        Self {
            temporal_block: frame_index / temporal_band,
            spectral_block: frequency_index / spectral_band,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakRecord {
    pub magnitude: f64,
    pub frame_index: usize,
    pub frequency_index: usize,
}

/// Ranks records by magnitude; among equal magnitudes the cell scanned
/// first (lower frame, then lower frequency) ranks higher.
#[derive(Debug, Clone, Copy)]
struct Ranked(PeakRecord);

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .magnitude
            .total_cmp(&other.0.magnitude)
            .then_with(|| {
                (other.0.frame_index, other.0.frequency_index)
                    .cmp(&(self.0.frame_index, self.0.frequency_index))
            })
    }
}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked {}

/// Keeps the `capacity` strongest records pushed into it.
///
/// Backed by a min-heap of at most `capacity` entries, so each push costs
/// O(log capacity) and nothing is ever fully sorted until the end.
#[derive(Debug, Clone)]
pub struct TopK {
    capacity: usize,
    heap: BinaryHeap<Reverse<Ranked>>,
}

impl TopK {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            heap: BinaryHeap::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, record: PeakRecord) {
        if self.capacity == 0 {
            return;
        }
        let candidate = Ranked(record);
        if self.heap.len() < self.capacity {
            self.heap.push(Reverse(candidate));
            return;
        }
        if let Some(Reverse(weakest)) = self.heap.peek() {
            if candidate > *weakest {
                self.heap.pop();
                self.heap.push(Reverse(candidate));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Strongest first.
    pub fn into_sorted_vec(self) -> Vec<PeakRecord> {
        // ascending order of Reverse<_> is descending order of rank
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse(Ranked(record))| record)
            .collect()
    }
}

/// Landmark frames grouped by exact frequency index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeakMap {
    landmarks: BTreeMap<usize, Vec<usize>>,
}

impl PeakMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flattens per-bin selections into a frequency-keyed map, visiting bins
    /// in key order.
    pub fn from_bins(bins: &BTreeMap<BinKey, Vec<PeakRecord>>) -> Self {
        let mut peaks = Self::new();
        for records in bins.values() {
            for record in records {
                peaks.insert(record.frequency_index, record.frame_index);
            }
        }
        peaks
    }

    pub fn insert(&mut self, frequency_index: usize, frame_index: usize) {
        self.landmarks
            .entry(frequency_index)
            .or_default()
            .push(frame_index);
    }

    pub fn frames(&self, frequency_index: usize) -> Option<&[usize]> {
        self.landmarks.get(&frequency_index).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &[usize])> + '_ {
        self.landmarks
            .iter()
            .map(|(&frequency_index, frames)| (frequency_index, frames.as_slice()))
    }

    /// Number of distinct frequency indices.
    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    /// Total number of landmarks across all frequencies.
    pub fn landmark_count(&self) -> usize {
        self.landmarks.values().map(Vec::len).sum()
    }
}

impl FromIterator<(usize, usize)> for PeakMap {
    fn from_iter<I: IntoIterator<Item = (usize, usize)>>(iter: I) -> Self {
        let mut peaks = Self::new();
        for (frequency_index, frame_index) in iter {
            peaks.insert(frequency_index, frame_index);
        }
        peaks
    }
}

/// Selects the `peaks_per_bin` strongest cells of every spectro-temporal
/// block. Blocks without candidates are absent from the result.
pub fn select_bin_peaks(
    spectrogram: &[Vec<f64>],
    spectral_band: usize,
    temporal_band: usize,
    peaks_per_bin: usize,
) -> Result<BTreeMap<BinKey, Vec<PeakRecord>>, SyncError> {
    if spectral_band == 0 || temporal_band == 0 {
        return Err(SyncError::InvalidBinConfiguration {
            spectral_band,
            temporal_band,
        });
    }

    let bins = spectrogram
        .par_chunks(temporal_band)
        .enumerate()
        .map(|(temporal_block, rows)| {
            let first_frame = temporal_block * temporal_band;
            let mut selectors: Vec<TopK> = Vec::new();

            for (row, magnitudes) in rows.iter().enumerate() {
                for (frequency_index, &magnitude) in magnitudes.iter().enumerate() {
                    let spectral_block = frequency_index / spectral_band;
                    if spectral_block >= selectors.len() {
                        selectors.resize_with(spectral_block + 1, || TopK::new(peaks_per_bin));
                    }
                    selectors[spectral_block].push(PeakRecord {
                        magnitude,
                        frame_index: first_frame + row,
                        frequency_index,
                    });
                }
            }

            selectors
                .into_iter()
                .enumerate()
                .filter(|(_, selector)| !selector.is_empty())
                .map(|(spectral_block, selector)| {
                    let key = BinKey {
                        temporal_block,
                        spectral_block,
                    };
                    (key, selector.into_sorted_vec())
                })
                .collect::<Vec<_>>()
        })
        .flatten()
        .collect();

    Ok(bins)
}

/// Landmarks of one spectrogram, keyed by frequency index.
pub fn extract_peaks(
    spectrogram: &[Vec<f64>],
    spectral_band: usize,
    temporal_band: usize,
    peaks_per_bin: usize,
) -> Result<PeakMap, SyncError> {
    let bins = select_bin_peaks(spectrogram, spectral_band, temporal_band, peaks_per_bin)?;
    let peaks = PeakMap::from_bins(&bins);

    tracing::debug!(
        "Selected {} landmarks over {} frequencies from {} bins",
        peaks.landmark_count(),
        peaks.len(),
        bins.len()
    );
    Ok(peaks)
}
