//! Policy constants and system parameters

/// Number of ranging slots in a sample, one per anchor index 0-7
pub const MAX_ANCHORS: usize = 8;

/// Workspace edge length used when a calibration axis is absent (cm)
pub const WORKSPACE_DEFAULT_CM: f64 = 114.0;

/// Distance substituted for a missing slot on the degenerate fallback path (cm)
pub const DEFAULT_DISTANCE_CM: f64 = 50.0;

/// Margin kept between an estimate and the workspace edge (cm)
pub const BOUNDARY_MARGIN_CM: f64 = 2.0;

/// Per-axis displacement below which a position update is suppressed (cm)
pub const DEBOUNCE_THRESHOLD_CM: f64 = 5.0;

/// Minimum valid ranges required to route through the least-squares solver
pub const MIN_ANCHORS_LEAST_SQUARES: usize = 4;

/// Minimum anchor pairs for the least-squares system to be solvable
pub const MIN_ANCHORS_SOLVER: usize = 3;

/// Singular values below this are treated as zero when solving via SVD
pub const SVD_EPSILON: f64 = 1e-10;

/// Decimal places kept on emitted coordinates
pub const COORDINATE_DECIMALS: i32 = 2;
