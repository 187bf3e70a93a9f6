//! Bounded in-memory history of ingested samples and produced estimates

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::core::{
    epoch_millis, Algorithm, PositionOutcome, RangeSet, RangingSample, MAX_ANCHORS,
};

/// Default cap on each history kept in memory
pub const DEFAULT_HISTORY_CAP: usize = 10_000;

/// One raw sample as consumed by the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    pub sequence: u64,
    pub tag_id: String,
    pub ranges: RangeSet,
    pub rssi: [Option<f64>; MAX_ANCHORS],
    pub session_id: u64,
    pub recorded_at_ms: u64,
}

/// One accepted estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateRecord {
    pub sequence: u64,
    pub tag_id: String,
    pub x: f64,
    pub y: f64,
    pub algorithm: Algorithm,
    pub anchors_used: usize,
    pub session_id: u64,
    pub recorded_at_ms: u64,
}

/// Counters and held-record sizes
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct StoreStatistics {
    pub samples_recorded: u64,
    pub estimates_accepted: u64,
    pub estimates_suppressed: u64,
    pub samples_held: usize,
    pub estimates_held: usize,
}

/// Keeps what the pipeline consumed and produced, newest last, evicting the
/// oldest records once the cap is reached.
///
/// Suppressed outcomes are counted but not stored: only accepted estimates
/// enter the history, mirroring the debounce contract that suppressed
/// updates leave no trace in state.
#[derive(Debug)]
pub struct ReadingStore {
    samples: VecDeque<SampleRecord>,
    estimates: VecDeque<EstimateRecord>,
    history_cap: usize,
    sequence_counter: u64,
    samples_recorded: u64,
    estimates_accepted: u64,
    estimates_suppressed: u64,
}

impl ReadingStore {
    pub fn new() -> Self {
        Self::with_history_cap(DEFAULT_HISTORY_CAP)
    }

    pub fn with_history_cap(history_cap: usize) -> Self {
        Self {
            samples: VecDeque::new(),
            estimates: VecDeque::new(),
            history_cap,
            sequence_counter: 0,
            samples_recorded: 0,
            estimates_accepted: 0,
            estimates_suppressed: 0,
        }
    }

    /// Record one raw sample; returns its sequence number
    pub fn record_sample(&mut self, sample: &RangingSample, session_id: u64) -> u64 {
        let sequence = self.next_sequence();
        self.samples.push_back(SampleRecord {
            sequence,
            tag_id: sample.tag_id.clone(),
            ranges: sample.ranges,
            rssi: sample.rssi,
            session_id,
            recorded_at_ms: epoch_millis(),
        });
        if self.samples.len() > self.history_cap {
            self.samples.pop_front();
        }
        self.samples_recorded += 1;
        sequence
    }

    /// Record an estimation outcome. Accepted estimates are stored and
    /// their sequence number returned; suppressed ones only bump a counter.
    pub fn record_outcome(
        &mut self,
        tag_id: &str,
        outcome: &PositionOutcome,
        session_id: u64,
    ) -> Option<u64> {
        match outcome {
            PositionOutcome::Accepted(estimate) => {
                let sequence = self.next_sequence();
                self.estimates.push_back(EstimateRecord {
                    sequence,
                    tag_id: tag_id.to_string(),
                    x: estimate.x,
                    y: estimate.y,
                    algorithm: estimate.algorithm,
                    anchors_used: estimate.anchors_used,
                    session_id,
                    recorded_at_ms: epoch_millis(),
                });
                if self.estimates.len() > self.history_cap {
                    self.estimates.pop_front();
                }
                self.estimates_accepted += 1;
                Some(sequence)
            }
            PositionOutcome::Suppressed { .. } => {
                self.estimates_suppressed += 1;
                None
            }
        }
    }

    /// Most recent samples, newest first
    pub fn recent_samples(&self, count: usize) -> Vec<&SampleRecord> {
        self.samples.iter().rev().take(count).collect()
    }

    /// Most recent accepted estimates, newest first
    pub fn recent_estimates(&self, count: usize) -> Vec<&EstimateRecord> {
        self.estimates.iter().rev().take(count).collect()
    }

    /// Most recent accepted estimates for one tag, newest first
    pub fn estimates_for_tag(&self, tag_id: &str, count: usize) -> Vec<&EstimateRecord> {
        self.estimates
            .iter()
            .rev()
            .filter(|record| record.tag_id == tag_id)
            .take(count)
            .collect()
    }

    pub fn statistics(&self) -> StoreStatistics {
        StoreStatistics {
            samples_recorded: self.samples_recorded,
            estimates_accepted: self.estimates_accepted,
            estimates_suppressed: self.estimates_suppressed,
            samples_held: self.samples.len(),
            estimates_held: self.estimates.len(),
        }
    }

    /// Drop all held records; counters keep their totals
    pub fn clear(&mut self) {
        self.samples.clear();
        self.estimates.clear();
    }

    fn next_sequence(&mut self) -> u64 {
        self.sequence_counter += 1;
        self.sequence_counter
    }
}

impl Default for ReadingStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{PositionEstimate, RangeSet};

    fn sample(tag: &str) -> RangingSample {
        let mut ranges = RangeSet::empty();
        ranges.set(0, Some(50.0));
        RangingSample::new(tag, ranges)
    }

    fn accepted(x: f64, y: f64) -> PositionOutcome {
        PositionOutcome::Accepted(PositionEstimate {
            x,
            y,
            algorithm: Algorithm::Basic,
            anchors_used: 3,
        })
    }

    #[test]
    fn test_samples_are_recorded_in_sequence() {
        let mut store = ReadingStore::new();
        let first = store.record_sample(&sample("a"), 1);
        let second = store.record_sample(&sample("b"), 1);

        assert_eq!(first, 1);
        assert_eq!(second, 2);

        let recent = store.recent_samples(10);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].tag_id, "b");
        assert_eq!(recent[1].tag_id, "a");
    }

    #[test]
    fn test_accepted_outcomes_are_stored() {
        let mut store = ReadingStore::new();
        let sequence = store.record_outcome("3", &accepted(50.0, 50.0), 7);
        assert!(sequence.is_some());

        let recent = store.recent_estimates(10);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].tag_id, "3");
        assert_eq!(recent[0].x, 50.0);
        assert_eq!(recent[0].session_id, 7);
        assert_eq!(recent[0].algorithm, Algorithm::Basic);
    }

    #[test]
    fn test_suppressed_outcomes_are_counted_not_stored() {
        let mut store = ReadingStore::new();
        let suppressed = PositionOutcome::Suppressed {
            x: 51.0,
            y: 51.0,
            dx: 1.0,
            dy: 1.0,
        };
        assert_eq!(store.record_outcome("3", &suppressed, 1), None);

        let stats = store.statistics();
        assert_eq!(stats.estimates_suppressed, 1);
        assert_eq!(stats.estimates_accepted, 0);
        assert_eq!(stats.estimates_held, 0);
    }

    #[test]
    fn test_history_cap_evicts_oldest() {
        let mut store = ReadingStore::with_history_cap(2);
        store.record_sample(&sample("a"), 1);
        store.record_sample(&sample("b"), 1);
        store.record_sample(&sample("c"), 1);

        let recent = store.recent_samples(10);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].tag_id, "c");
        assert_eq!(recent[1].tag_id, "b");

        // The running total is unaffected by eviction
        assert_eq!(store.statistics().samples_recorded, 3);
    }

    #[test]
    fn test_estimates_for_tag_filters() {
        let mut store = ReadingStore::new();
        store.record_outcome("a", &accepted(10.0, 10.0), 1);
        store.record_outcome("b", &accepted(20.0, 20.0), 1);
        store.record_outcome("a", &accepted(30.0, 30.0), 1);

        let for_a = store.estimates_for_tag("a", 10);
        assert_eq!(for_a.len(), 2);
        assert_eq!(for_a[0].x, 30.0);
        assert_eq!(for_a[1].x, 10.0);
    }

    #[test]
    fn test_clear_keeps_counters() {
        let mut store = ReadingStore::new();
        store.record_sample(&sample("a"), 1);
        store.record_outcome("a", &accepted(10.0, 10.0), 1);
        store.clear();

        let stats = store.statistics();
        assert_eq!(stats.samples_held, 0);
        assert_eq!(stats.estimates_held, 0);
        assert_eq!(stats.samples_recorded, 1);
        assert_eq!(stats.estimates_accepted, 1);
    }
}
