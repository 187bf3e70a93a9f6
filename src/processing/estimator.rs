//! The estimation pipeline: algorithm selection, boundary correction,
//! rounding and debouncing

use log::debug;

use crate::algorithms::{analytic, boundary, least_squares, AnchorLayout, SolverOutcome};
use crate::core::{
    Algorithm, CalibrationLengths, PositionEstimate, PositionOutcome, RangeSet,
    BOUNDARY_MARGIN_CM, COORDINATE_DECIMALS, DEBOUNCE_THRESHOLD_CM, DEFAULT_DISTANCE_CM,
    MIN_ANCHORS_LEAST_SQUARES, WORKSPACE_DEFAULT_CM,
};
use crate::processing::debounce::{DebounceDecision, DebounceFilter};

/// Tunable policy constants for the pipeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimatorPolicy {
    /// Workspace edge substituted for absent calibration axes (cm)
    pub workspace_default_cm: f64,
    /// Distance substituted on the degenerate fallback path (cm)
    pub fallback_distance_cm: f64,
    /// Clearance kept from the workspace edges (cm)
    pub boundary_margin_cm: f64,
    /// Per-axis movement below which updates are suppressed (cm)
    pub debounce_threshold_cm: f64,
}

impl Default for EstimatorPolicy {
    fn default() -> Self {
        Self {
            workspace_default_cm: WORKSPACE_DEFAULT_CM,
            fallback_distance_cm: DEFAULT_DISTANCE_CM,
            boundary_margin_cm: BOUNDARY_MARGIN_CM,
            debounce_threshold_cm: DEBOUNCE_THRESHOLD_CM,
        }
    }
}

/// Orchestrates one position estimation end to end.
///
/// The solver stages are pure; the only state is the per-tag debounce map,
/// which the filter guards internally, so a shared estimator can serve
/// concurrent callers.
pub struct PositionEstimator {
    policy: EstimatorPolicy,
    debounce: DebounceFilter,
}

impl PositionEstimator {
    pub fn new() -> Self {
        Self::with_policy(EstimatorPolicy::default())
    }

    pub fn with_policy(policy: EstimatorPolicy) -> Self {
        Self {
            debounce: DebounceFilter::with_threshold(policy.debounce_threshold_cm),
            policy,
        }
    }

    pub fn policy(&self) -> &EstimatorPolicy {
        &self.policy
    }

    /// Estimate one tag position from a ranging sample and the session
    /// calibration.
    ///
    /// With 4 or more valid ranges the least-squares solver runs over all
    /// of them; a degenerate system falls back to analytic trilateration
    /// with substituted distances. With fewer, the analytic solver sees the
    /// raw values of slots 0-2 and degrades to the workspace center when
    /// they are not all positive. The result is clamped, rounded to two
    /// decimals and debounced per tag. This call never fails.
    pub fn estimate_position(
        &self,
        tag_id: &str,
        ranges: &RangeSet,
        calibration: &CalibrationLengths,
    ) -> PositionOutcome {
        let layout = AnchorLayout::with_default(calibration, self.policy.workspace_default_cm);
        let pairs = ranges.valid_pairs();

        let (raw_x, raw_y, algorithm, anchors_used) = if pairs.len() >= MIN_ANCHORS_LEAST_SQUARES {
            match least_squares::solve(&pairs, &layout) {
                SolverOutcome::Solved { x, y } => (x, y, Algorithm::LeastSquares, pairs.len()),
                SolverOutcome::Degenerate => {
                    debug!(
                        "least-squares degenerate for tag {}, falling back to analytic",
                        tag_id
                    );
                    let (x, y) = analytic::solve_with_substitution(
                        ranges,
                        &layout,
                        self.policy.fallback_distance_cm,
                    );
                    (x, y, Algorithm::Basic, 3)
                }
            }
        } else {
            // Only slots 0-2 matter here; fewer than three positive readings
            // degrade to the workspace center inside the solver.
            let (x, y) = analytic::solve(ranges.get(0), ranges.get(1), ranges.get(2), &layout);
            let used = (0..3).filter(|&i| ranges.is_valid(i)).count();
            (x, y, Algorithm::Basic, used)
        };

        let (clamped_x, clamped_y) =
            boundary::clamp_with_margin(raw_x, raw_y, &layout, self.policy.boundary_margin_cm);
        let x = round_coordinate(clamped_x);
        let y = round_coordinate(clamped_y);

        match self.debounce.should_accept(tag_id, x, y) {
            DebounceDecision::Accepted => PositionOutcome::Accepted(PositionEstimate {
                x,
                y,
                algorithm,
                anchors_used,
            }),
            DebounceDecision::Suppressed { dx, dy } => PositionOutcome::Suppressed { x, y, dx, dy },
        }
    }

    /// Last accepted position for a tag
    pub fn last_position(&self, tag_id: &str) -> Option<(f64, f64)> {
        self.debounce.last_position(tag_id)
    }

    /// Forget all per-tag debounce state
    pub fn reset(&self) {
        self.debounce.clear();
    }
}

impl Default for PositionEstimator {
    fn default() -> Self {
        Self::new()
    }
}

fn round_coordinate(value: f64) -> f64 {
    let multiplier = 10_f64.powi(COORDINATE_DECIMALS);
    (value * multiplier).round() / multiplier
}
