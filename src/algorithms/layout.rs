//! Anchor layout resolution from calibration lengths

use crate::core::{CalibrationLengths, Point2, MAX_ANCHORS, WORKSPACE_DEFAULT_CM};

/// Positions of the 8 anchors and the workspace they span
///
/// Derived from the calibration pair by a fixed formula: anchor 0 at the
/// origin, anchors 1-3 on the far corners, anchors 4-7 on edge midpoints
/// and the center. Rebuilt on every estimation call, never cached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorLayout {
    /// Anchor coordinates indexed by slot (cm)
    pub positions: [Point2; MAX_ANCHORS],
    /// Workspace extent along x (cm)
    pub width_cm: f64,
    /// Workspace extent along y (cm)
    pub height_cm: f64,
    /// Default edge the layout was resolved against (cm)
    pub default_edge_cm: f64,
}

impl AnchorLayout {
    /// Resolve the layout with the standard workspace default
    pub fn from_calibration(calibration: &CalibrationLengths) -> Self {
        Self::with_default(calibration, WORKSPACE_DEFAULT_CM)
    }

    /// Resolve the layout, substituting `default_cm` for absent axes
    pub fn with_default(calibration: &CalibrationLengths, default_cm: f64) -> Self {
        let (kx, ky) = calibration.resolved_or(default_cm);
        let positions = [
            Point2::new(0.0, 0.0),
            Point2::new(kx, 0.0),
            Point2::new(0.0, ky),
            Point2::new(kx, ky),
            Point2::new(kx / 2.0, ky / 2.0),
            Point2::new(kx / 2.0, 0.0),
            Point2::new(0.0, ky / 2.0),
            Point2::new(kx, ky / 2.0),
        ];
        Self {
            positions,
            width_cm: kx,
            height_cm: ky,
            default_edge_cm: default_cm,
        }
    }

    /// Workspace center, the degraded-output coordinate
    pub fn center(&self) -> (f64, f64) {
        (self.width_cm / 2.0, self.height_cm / 2.0)
    }

    /// Fallback coordinate for a degenerate layout axis
    pub fn fallback_half_axis(&self) -> f64 {
        self.default_edge_cm / 2.0
    }
}
