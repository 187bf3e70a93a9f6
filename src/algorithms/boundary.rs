//! Workspace boundary correction

use crate::algorithms::layout::AnchorLayout;
use crate::core::BOUNDARY_MARGIN_CM;

/// Clamp a raw estimate component-wise into the workspace, keeping
/// `margin_cm` of clearance from every edge. The lower bound wins when the
/// workspace is narrower than two margins, so the call never faults.
pub fn clamp_with_margin(x: f64, y: f64, layout: &AnchorLayout, margin_cm: f64) -> (f64, f64) {
    (
        x.min(layout.width_cm - margin_cm).max(margin_cm),
        y.min(layout.height_cm - margin_cm).max(margin_cm),
    )
}

/// Clamp with the standard margin
pub fn clamp_to_workspace(x: f64, y: f64, layout: &AnchorLayout) -> (f64, f64) {
    clamp_with_margin(x, y, layout, BOUNDARY_MARGIN_CM)
}
