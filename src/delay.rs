//! Delay voting between two landmark sets.
//!
//! Every pair of landmarks sharing a frequency index votes for the frame
//! offset between them; the offset with the most votes wins.

use std::collections::BTreeMap;

use rayon::prelude::*;

use crate::config::{HIGH_CONFIDENCE_THRESHOLD, MEDIUM_CONFIDENCE_THRESHOLD};
use crate::error::SyncError;
use crate::peaks::PeakMap;

/// Vote counts per candidate offset (`other_frame - base_frame`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DelayHistogram {
    votes: BTreeMap<i64, usize>,
}

impl DelayHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Votes every landmark pair that shares a frequency index.
    ///
    /// Shared frequencies are split across workers, each filling its own
    /// partial histogram; partials are summed at the end.
    pub fn from_peak_maps(base: &PeakMap, other: &PeakMap) -> Self {
        let shared: Vec<(&[usize], &[usize])> = other
            .iter()
            .filter_map(|(frequency_index, other_frames)| {
                base.frames(frequency_index)
                    .map(|base_frames| (base_frames, other_frames))
            })
            .collect();

        shared
            .par_iter()
            .fold(Self::new, |mut histogram, (base_frames, other_frames)| {
                for &other_frame in *other_frames {
                    for &base_frame in *base_frames {
                        histogram.record(other_frame as i64 - base_frame as i64);
                    }
                }
                histogram
            })
            .reduce(Self::new, Self::merge)
    }

    pub fn record(&mut self, offset: i64) {
        *self.votes.entry(offset).or_default() += 1;
    }

    pub fn merge(mut self, other: Self) -> Self {
        for (offset, count) in other.votes {
            *self.votes.entry(offset).or_default() += count;
        }
        self
    }

    pub fn votes(&self, offset: i64) -> usize {
        self.votes.get(&offset).copied().unwrap_or(0)
    }

    pub fn total_votes(&self) -> usize {
        self.votes.values().sum()
    }

    /// Number of distinct offsets that received a vote.
    pub fn len(&self) -> usize {
        self.votes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, usize)> + '_ {
        self.votes.iter().map(|(&offset, &count)| (offset, count))
    }

    /// Most voted offset and its vote count.
    ///
    /// Ties go to the offset closest to zero, then to the lower offset.
    pub fn mode(&self) -> Option<(i64, usize)> {
        self.iter().max_by(|(a, a_count), (b, b_count)| {
            a_count
                .cmp(b_count)
                .then_with(|| b.unsigned_abs().cmp(&a.unsigned_abs()))
                .then_with(|| b.cmp(a))
        })
    }
}

/// Winning offset of a delay vote, in frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alignment {
    /// Positive when `other` starts later than `base`.
    pub delay: i64,
    pub votes: usize,
    pub total_votes: usize,
}

impl Alignment {
    /// Share of all votes won by the chosen offset, in percent.
    pub fn confidence(&self) -> f64 {
        if self.total_votes == 0 {
            return 0.0;
        }
        (self.votes as f64 / self.total_votes as f64 * 100.0).min(100.0)
    }

    pub fn match_quality(&self) -> &'static str {
        let confidence = self.confidence();
        if confidence > HIGH_CONFIDENCE_THRESHOLD {
            "High"
        } else if confidence > MEDIUM_CONFIDENCE_THRESHOLD {
            "Medium"
        } else {
            "Low"
        }
    }
}

pub fn estimate_delay(base: &PeakMap, other: &PeakMap) -> Result<Alignment, SyncError> {
    let histogram = DelayHistogram::from_peak_maps(base, other);
    let (delay, votes) = histogram.mode().ok_or(SyncError::NoCommonLandmarks)?;
    let total_votes = histogram.total_votes();

    tracing::debug!(
        "Delay histogram: {} offsets, {} votes; winner {} with {} votes",
        histogram.len(),
        total_votes,
        delay,
        votes
    );

    Ok(Alignment {
        delay,
        votes,
        total_votes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn votes_other_minus_base() {
        let base: PeakMap = [(10, 2), (10, 5), (20, 7)].into_iter().collect();
        let other: PeakMap = [(10, 4), (20, 9), (30, 1)].into_iter().collect();
        let histogram = DelayHistogram::from_peak_maps(&base, &other);

        // freq 10: 4-2, 4-5; freq 20: 9-7; freq 30 unmatched
        assert_eq!(histogram.votes(2), 2);
        assert_eq!(histogram.votes(-1), 1);
        assert_eq!(histogram.total_votes(), 3);
        assert_eq!(histogram.mode(), Some((2, 2)));
    }

    #[test]
    fn identical_maps_vote_for_zero() {
        let peaks: PeakMap = [(3, 0), (3, 4), (8, 1), (8, 2), (8, 6)].into_iter().collect();
        let alignment = estimate_delay(&peaks, &peaks).unwrap();
        assert_eq!(alignment.delay, 0);
        assert_eq!(alignment.votes, 5);
        assert_eq!(alignment.total_votes, 13);
    }

    #[test]
    fn ties_prefer_smallest_magnitude_offset() {
        let mut histogram = DelayHistogram::new();
        for offset in [-3, 3, 2, 5, 5] {
            histogram.record(offset);
        }
        assert_eq!(histogram.mode(), Some((5, 2)));

        histogram.record(-3);
        histogram.record(3);
        histogram.record(2);
        assert_eq!(histogram.mode(), Some((2, 2)));

        let mut symmetric = DelayHistogram::new();
        symmetric.record(4);
        symmetric.record(-4);
        assert_eq!(symmetric.mode(), Some((-4, 1)));
    }

    #[test]
    fn disjoint_maps_have_no_common_landmarks() {
        let base: PeakMap = [(1, 0), (2, 3)].into_iter().collect();
        let other: PeakMap = [(5, 0), (6, 3)].into_iter().collect();
        assert!(matches!(
            estimate_delay(&base, &other),
            Err(SyncError::NoCommonLandmarks)
        ));
        assert!(matches!(
            estimate_delay(&PeakMap::new(), &base),
            Err(SyncError::NoCommonLandmarks)
        ));
    }

    #[test]
    fn merge_sums_partial_histograms() {
        let mut left = DelayHistogram::new();
        left.record(1);
        left.record(2);
        let mut right = DelayHistogram::new();
        right.record(2);
        right.record(-7);

        let merged = left.merge(right);
        assert_eq!(merged.votes(2), 2);
        assert_eq!(merged.votes(-7), 1);
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn confidence_and_quality() {
        let strong = Alignment {
            delay: 3,
            votes: 40,
            total_votes: 100,
        };
        assert_eq!(strong.confidence(), 40.0);
        assert_eq!(strong.match_quality(), "High");

        let medium = Alignment {
            votes: 10,
            ..strong
        };
        assert_eq!(medium.match_quality(), "Medium");

        let weak = Alignment {
            votes: 2,
            ..strong
        };
        assert_eq!(weak.match_quality(), "Low");
    }
}
