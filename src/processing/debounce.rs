//! Per-tag debouncing of position updates

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use parking_lot::Mutex;

use crate::core::DEBOUNCE_THRESHOLD_CM;

const SHARD_COUNT: usize = 16;

/// Decision for one proposed position update
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DebounceDecision {
    /// Movement is real; the new position is now the stored state
    Accepted,
    /// Displacement stayed under the threshold on both axes; state untouched
    Suppressed { dx: f64, dy: f64 },
}

/// Suppresses updates whose displacement is measurement noise rather than
/// movement.
///
/// The last accepted (x, y) per tag lives in a sharded map. The
/// check-then-update for a tag runs under its shard's lock, so concurrent
/// updates for the same tag serialize while unrelated tags stay independent.
pub struct DebounceFilter {
    shards: Vec<Mutex<HashMap<String, (f64, f64)>>>,
    threshold_cm: f64,
}

impl DebounceFilter {
    pub fn new() -> Self {
        Self::with_threshold(DEBOUNCE_THRESHOLD_CM)
    }

    pub fn with_threshold(threshold_cm: f64) -> Self {
        let shards = (0..SHARD_COUNT)
            .map(|_| Mutex::new(HashMap::new()))
            .collect();
        Self {
            shards,
            threshold_cm,
        }
    }

    /// Decide atomically whether the update represents real movement.
    ///
    /// The first sighting of a tag is always accepted. Afterwards an update
    /// is suppressed iff it moved less than the threshold on BOTH axes;
    /// clearing the threshold on a single axis is enough to accept.
    pub fn should_accept(&self, tag_id: &str, x: f64, y: f64) -> DebounceDecision {
        let mut shard = self.shard_for(tag_id).lock();
        match shard.get(tag_id) {
            Some(&(last_x, last_y)) => {
                let dx = (x - last_x).abs();
                let dy = (y - last_y).abs();
                if dx < self.threshold_cm && dy < self.threshold_cm {
                    DebounceDecision::Suppressed { dx, dy }
                } else {
                    shard.insert(tag_id.to_string(), (x, y));
                    DebounceDecision::Accepted
                }
            }
            None => {
                shard.insert(tag_id.to_string(), (x, y));
                DebounceDecision::Accepted
            }
        }
    }

    /// Last accepted position for a tag, if it has ever been seen
    pub fn last_position(&self, tag_id: &str) -> Option<(f64, f64)> {
        self.shard_for(tag_id).lock().get(tag_id).copied()
    }

    /// Number of tags currently remembered
    pub fn tracked_tags(&self) -> usize {
        self.shards.iter().map(|shard| shard.lock().len()).sum()
    }

    /// Forget every remembered position
    pub fn clear(&self) {
        for shard in &self.shards {
            shard.lock().clear();
        }
    }

    fn shard_for(&self, tag_id: &str) -> &Mutex<HashMap<String, (f64, f64)>> {
        let mut hasher = DefaultHasher::new();
        tag_id.hash(&mut hasher);
        &self.shards[(hasher.finish() as usize) % self.shards.len()]
    }
}

impl Default for DebounceFilter {
    fn default() -> Self {
        Self::new()
    }
}
