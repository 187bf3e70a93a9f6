//! Core data types for the positioning pipeline

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::core::constants::MAX_ANCHORS;

/// Wall-clock milliseconds since the Unix epoch
pub fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// 2D point in workspace coordinates (cm)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point (cm)
    pub fn distance_to(&self, other: &Point2) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// One ranging sample: 8 slots of optional tag-to-anchor distances (cm)
///
/// A slot is valid iff it is present, finite and strictly positive.
/// Non-positive readings count as absent for algorithm selection.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RangeSet {
    slots: [Option<f64>; MAX_ANCHORS],
}

impl RangeSet {
    /// Range set with all slots absent
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_slots(slots: [Option<f64>; MAX_ANCHORS]) -> Self {
        Self { slots }
    }

    /// Raw slot value, `None` if the index is out of bounds or absent
    pub fn get(&self, index: usize) -> Option<f64> {
        self.slots.get(index).copied().flatten()
    }

    pub fn set(&mut self, index: usize, distance: Option<f64>) {
        if index < MAX_ANCHORS {
            self.slots[index] = distance;
        }
    }

    /// Whether the slot holds a finite, strictly positive distance
    pub fn is_valid(&self, index: usize) -> bool {
        matches!(self.get(index), Some(d) if d.is_finite() && d > 0.0)
    }

    /// Valid (anchor index, distance) pairs in slot order
    pub fn valid_pairs(&self) -> Vec<(usize, f64)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| match slot {
                Some(d) if d.is_finite() && *d > 0.0 => Some((i, *d)),
                _ => None,
            })
            .collect()
    }

    /// Number of valid slots
    pub fn valid_count(&self) -> usize {
        (0..MAX_ANCHORS).filter(|&i| self.is_valid(i)).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        self.slots.iter().copied()
    }
}

impl From<[Option<f64>; MAX_ANCHORS]> for RangeSet {
    fn from(slots: [Option<f64>; MAX_ANCHORS]) -> Self {
        Self { slots }
    }
}

/// Session-supplied workspace dimensions (cm)
///
/// Absent axes resolve to the workspace default. Present values pass
/// through unchanged; degenerate axes are guarded downstream.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CalibrationLengths {
    pub kx: Option<f64>,
    pub ky: Option<f64>,
}

impl CalibrationLengths {
    pub fn new(kx: f64, ky: f64) -> Self {
        Self {
            kx: Some(kx),
            ky: Some(ky),
        }
    }

    /// Calibration with both axes absent
    pub fn absent() -> Self {
        Self::default()
    }

    /// Resolve both axes, substituting `default_cm` for absent or
    /// non-finite values
    pub fn resolved_or(&self, default_cm: f64) -> (f64, f64) {
        let resolve = |axis: Option<f64>| match axis {
            Some(v) if v.is_finite() => v,
            _ => default_cm,
        };
        (resolve(self.kx), resolve(self.ky))
    }
}

/// Which solver produced an estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// Overdetermined least-squares multilateration (4+ anchors)
    LeastSquares,
    /// Closed-form trilateration over anchors 0-2
    Basic,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::LeastSquares => "least_squares",
            Algorithm::Basic => "basic",
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Final bounded position, rounded to two decimal places
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionEstimate {
    /// X coordinate (cm)
    pub x: f64,
    /// Y coordinate (cm)
    pub y: f64,
    /// Solver that produced the coordinates
    pub algorithm: Algorithm,
    /// Valid anchors consumed by that solver
    pub anchors_used: usize,
}

/// Result of one orchestrated estimation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PositionOutcome {
    /// Estimate passed the debounce filter and was stored
    Accepted(PositionEstimate),
    /// Estimate moved less than the threshold on both axes
    Suppressed { x: f64, y: f64, dx: f64, dy: f64 },
}

impl PositionOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, PositionOutcome::Accepted(_))
    }

    /// The (possibly suppressed) coordinates
    pub fn position(&self) -> (f64, f64) {
        match self {
            PositionOutcome::Accepted(estimate) => (estimate.x, estimate.y),
            PositionOutcome::Suppressed { x, y, .. } => (*x, *y),
        }
    }
}

/// One decoded wire sample: tag identifier, ranges and optional RSSI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangingSample {
    pub tag_id: String,
    pub ranges: RangeSet,
    pub rssi: [Option<f64>; MAX_ANCHORS],
}

impl RangingSample {
    pub fn new(tag_id: impl Into<String>, ranges: RangeSet) -> Self {
        Self {
            tag_id: tag_id.into(),
            ranges,
            rssi: [None; MAX_ANCHORS],
        }
    }

    pub fn with_rssi(mut self, rssi: [Option<f64>; MAX_ANCHORS]) -> Self {
        self.rssi = rssi;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_set_validity() {
        let mut ranges = RangeSet::empty();
        ranges.set(0, Some(57.0));
        ranges.set(1, Some(0.0));
        ranges.set(2, Some(-3.5));
        ranges.set(3, Some(f64::NAN));

        assert!(ranges.is_valid(0));
        assert!(!ranges.is_valid(1));
        assert!(!ranges.is_valid(2));
        assert!(!ranges.is_valid(3));
        assert!(!ranges.is_valid(4));
        assert_eq!(ranges.valid_count(), 1);
        assert_eq!(ranges.valid_pairs(), vec![(0, 57.0)]);
    }

    #[test]
    fn test_range_set_out_of_bounds_get() {
        let ranges = RangeSet::from_slots([Some(10.0); MAX_ANCHORS]);
        assert_eq!(ranges.get(7), Some(10.0));
        assert_eq!(ranges.get(8), None);
    }

    #[test]
    fn test_calibration_resolution() {
        let cal = CalibrationLengths::new(100.0, 80.0);
        assert_eq!(cal.resolved_or(114.0), (100.0, 80.0));

        let partial = CalibrationLengths {
            kx: None,
            ky: Some(90.0),
        };
        assert_eq!(partial.resolved_or(114.0), (114.0, 90.0));

        let absent = CalibrationLengths::absent();
        assert_eq!(absent.resolved_or(114.0), (114.0, 114.0));

        // A present zero is kept; only absence and non-finite values default
        let zeroed = CalibrationLengths::new(0.0, f64::NAN);
        assert_eq!(zeroed.resolved_or(114.0), (0.0, 114.0));
    }

    #[test]
    fn test_algorithm_tags() {
        assert_eq!(Algorithm::LeastSquares.as_str(), "least_squares");
        assert_eq!(Algorithm::Basic.as_str(), "basic");
    }

    #[test]
    fn test_outcome_position() {
        let accepted = PositionOutcome::Accepted(PositionEstimate {
            x: 12.0,
            y: 34.0,
            algorithm: Algorithm::Basic,
            anchors_used: 3,
        });
        assert!(accepted.is_accepted());
        assert_eq!(accepted.position(), (12.0, 34.0));

        let suppressed = PositionOutcome::Suppressed {
            x: 12.5,
            y: 34.5,
            dx: 0.5,
            dy: 0.5,
        };
        assert!(!suppressed.is_accepted());
        assert_eq!(suppressed.position(), (12.5, 34.5));
    }
}
