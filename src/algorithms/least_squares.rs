//! Least-squares multilateration for four or more anchors

use log::warn;
use nalgebra::{DMatrix, DVector};

use crate::algorithms::layout::AnchorLayout;
use crate::core::{MIN_ANCHORS_SOLVER, SVD_EPSILON};

/// Outcome of the least-squares solve
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SolverOutcome {
    /// System solved; coordinates are not yet bounded to the workspace
    Solved { x: f64, y: f64 },
    /// Too few usable anchors or the numeric solve failed
    Degenerate,
}

/// Solve the linearized multilateration system over valid
/// (anchor index, distance) pairs.
///
/// The first pair acts as the reference; subtracting its squared-distance
/// equation from every other pair's yields one linear row each. The stacked
/// system is solved through SVD, which returns the minimum-norm solution
/// even for rank-deficient geometry. No rank check is performed.
pub fn solve(pairs: &[(usize, f64)], layout: &AnchorLayout) -> SolverOutcome {
    if pairs.len() < MIN_ANCHORS_SOLVER {
        return SolverOutcome::Degenerate;
    }

    let (reference_index, r0) = pairs[0];
    let reference = layout.positions[reference_index];

    let rows = pairs.len() - 1;
    let mut a_matrix = DMatrix::zeros(rows, 2);
    let mut b_vector = DVector::zeros(rows);

    for (row, &(index, distance)) in pairs.iter().skip(1).enumerate() {
        let anchor = layout.positions[index];
        a_matrix[(row, 0)] = 2.0 * (anchor.x - reference.x);
        a_matrix[(row, 1)] = 2.0 * (anchor.y - reference.y);
        b_vector[row] = r0.powi(2) - distance.powi(2) + anchor.x.powi(2)
            - reference.x.powi(2)
            + anchor.y.powi(2)
            - reference.y.powi(2);
    }

    let svd = a_matrix.svd(true, true);
    match svd.solve(&b_vector, SVD_EPSILON) {
        Ok(solution) => {
            let (x, y) = (solution[0], solution[1]);
            if x.is_finite() && y.is_finite() {
                SolverOutcome::Solved { x, y }
            } else {
                warn!("least-squares solution is non-finite, treating as degenerate");
                SolverOutcome::Degenerate
            }
        }
        Err(reason) => {
            warn!("least-squares SVD solve failed: {}", reason);
            SolverOutcome::Degenerate
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CalibrationLengths, Point2};

    fn ranges_from(layout: &AnchorLayout, truth: Point2, indices: &[usize]) -> Vec<(usize, f64)> {
        indices
            .iter()
            .map(|&i| (i, layout.positions[i].distance_to(&truth)))
            .collect()
    }

    #[test]
    fn test_noiseless_recovery_four_anchors() {
        let layout = AnchorLayout::from_calibration(&CalibrationLengths::absent());
        let truth = Point2::new(30.5, 40.25);
        let pairs = ranges_from(&layout, truth, &[0, 1, 2, 3]);

        match solve(&pairs, &layout) {
            SolverOutcome::Solved { x, y } => {
                assert!((x - truth.x).abs() < 1e-6);
                assert!((y - truth.y).abs() < 1e-6);
            }
            SolverOutcome::Degenerate => panic!("expected a solved outcome"),
        }
    }

    #[test]
    fn test_noiseless_recovery_all_anchors() {
        let layout = AnchorLayout::from_calibration(&CalibrationLengths::new(200.0, 150.0));
        let truth = Point2::new(123.0, 61.5);
        let pairs = ranges_from(&layout, truth, &[0, 1, 2, 3, 4, 5, 6, 7]);

        match solve(&pairs, &layout) {
            SolverOutcome::Solved { x, y } => {
                assert!((x - truth.x).abs() < 1e-6);
                assert!((y - truth.y).abs() < 1e-6);
            }
            SolverOutcome::Degenerate => panic!("expected a solved outcome"),
        }
    }

    #[test]
    fn test_too_few_pairs_is_degenerate() {
        let layout = AnchorLayout::from_calibration(&CalibrationLengths::absent());
        let pairs = vec![(0, 50.0), (1, 60.0)];
        assert_eq!(solve(&pairs, &layout), SolverOutcome::Degenerate);
    }

    #[test]
    fn test_collinear_anchors_yield_minimum_norm_solution() {
        // Anchors 0, 1 and 5 all sit on the x axis, so the system carries
        // no information about y; the SVD answer keeps y at 0.
        let layout = AnchorLayout::from_calibration(&CalibrationLengths::absent());
        let truth = Point2::new(30.0, 40.0);
        let pairs = ranges_from(&layout, truth, &[0, 1, 5]);

        match solve(&pairs, &layout) {
            SolverOutcome::Solved { x, y } => {
                assert!((x - 30.0).abs() < 1e-6);
                assert!(y.abs() < 1e-6);
            }
            SolverOutcome::Degenerate => panic!("rank-deficient system must still solve"),
        }
    }
}
