//! Closed-form trilateration over the three reference anchors

use log::debug;

use crate::algorithms::layout::AnchorLayout;
use crate::core::RangeSet;

/// Solve for (x, y) from the distances to anchors 0, 1 and 2.
///
/// All three distances must be strictly positive; otherwise the workspace
/// center is returned as the degraded answer. The solution is exact only
/// for the axis-aligned placement the layout formula produces, and is not
/// yet bounded to the workspace.
pub fn solve(
    r0: Option<f64>,
    r1: Option<f64>,
    r2: Option<f64>,
    layout: &AnchorLayout,
) -> (f64, f64) {
    match (positive(r0), positive(r1), positive(r2)) {
        (Some(r0), Some(r1), Some(r2)) => solve_positive(r0, r1, r2, layout),
        _ => {
            debug!("analytic solve lacks three positive ranges, returning workspace center");
            layout.center()
        }
    }
}

/// Degenerate-path variant: slots 0-2 that are missing or non-positive are
/// replaced by `default_distance_cm` before solving.
pub fn solve_with_substitution(
    ranges: &RangeSet,
    layout: &AnchorLayout,
    default_distance_cm: f64,
) -> (f64, f64) {
    let fill = |index: usize| match positive(ranges.get(index)) {
        Some(distance) => distance,
        None => default_distance_cm,
    };
    solve_positive(fill(0), fill(1), fill(2), layout)
}

fn positive(range: Option<f64>) -> Option<f64> {
    range.filter(|d| d.is_finite() && *d > 0.0)
}

fn solve_positive(r0: f64, r1: f64, r2: f64, layout: &AnchorLayout) -> (f64, f64) {
    // Anchor 0 sits at the origin, anchor 1 on the x axis, anchor 2 on the
    // y axis, so the squared-distance differences decouple per axis.
    let x1 = layout.positions[1].x;
    let y2 = layout.positions[2].y;

    let x = if x1 == 0.0 {
        layout.fallback_half_axis()
    } else {
        (r0.powi(2) - r1.powi(2) + x1.powi(2)) / (2.0 * x1)
    };
    let y = if y2 == 0.0 {
        layout.fallback_half_axis()
    } else {
        (r0.powi(2) - r2.powi(2) + y2.powi(2)) / (2.0 * y2)
    };

    (x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CalibrationLengths;

    fn default_layout() -> AnchorLayout {
        AnchorLayout::from_calibration(&CalibrationLengths::absent())
    }

    #[test]
    fn test_symmetric_ranges_hit_workspace_center() {
        // Equidistant from anchors 0, 1 and 2 at 57 * sqrt(2)
        let r = 57.0 * 2.0_f64.sqrt();
        let (x, y) = solve(Some(r), Some(r), Some(r), &default_layout());

        assert!((x - 57.0).abs() < 0.1);
        assert!((y - 57.0).abs() < 0.1);
    }

    #[test]
    fn test_known_position_recovery() {
        // True position (30, 40) against the default layout
        let layout = default_layout();
        let p = crate::core::Point2::new(30.0, 40.0);
        let r0 = layout.positions[0].distance_to(&p);
        let r1 = layout.positions[1].distance_to(&p);
        let r2 = layout.positions[2].distance_to(&p);

        let (x, y) = solve(Some(r0), Some(r1), Some(r2), &layout);
        assert!((x - 30.0).abs() < 1e-9);
        assert!((y - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_range_returns_center() {
        let layout = default_layout();
        assert_eq!(solve(Some(50.0), None, Some(60.0), &layout), (57.0, 57.0));
        assert_eq!(solve(None, None, None, &layout), (57.0, 57.0));
    }

    #[test]
    fn test_non_positive_range_returns_center() {
        let layout = default_layout();
        assert_eq!(
            solve(Some(50.0), Some(0.0), Some(60.0), &layout),
            (57.0, 57.0)
        );
        assert_eq!(
            solve(Some(50.0), Some(-1.0), Some(60.0), &layout),
            (57.0, 57.0)
        );
    }

    #[test]
    fn test_zero_axis_uses_half_axis_fallback() {
        let layout = AnchorLayout::from_calibration(&CalibrationLengths::new(0.0, 100.0));
        let (x, y) = solve(Some(50.0), Some(50.0), Some(60.0), &layout);

        assert_eq!(x, 57.0);
        // y axis is intact: (50^2 - 60^2 + 100^2) / 200
        assert!((y - 44.5).abs() < 1e-9);
    }

    #[test]
    fn test_substitution_fills_missing_slots() {
        let layout = default_layout();
        let mut ranges = RangeSet::empty();
        ranges.set(0, Some(80.0));

        let (x, y) = solve_with_substitution(&ranges, &layout, 50.0);
        let expected_x = (80.0_f64.powi(2) - 50.0_f64.powi(2) + 114.0_f64.powi(2)) / 228.0;
        assert!((x - expected_x).abs() < 1e-9);
        assert!((y - expected_x).abs() < 1e-9);
    }

    #[test]
    fn test_substitution_of_all_slots_lands_on_center() {
        // Three equal substituted distances put the solution at (L/2, L/2)
        let layout = default_layout();
        let (x, y) = solve_with_substitution(&RangeSet::empty(), &layout, 50.0);
        assert!((x - 57.0).abs() < 1e-9);
        assert!((y - 57.0).abs() < 1e-9);
    }
}
