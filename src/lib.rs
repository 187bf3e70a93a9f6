//! UWB Indoor Positioning
//!
//! An ultra-wideband indoor positioning pipeline that turns raw anchor
//! distance reports into debounced 2D workspace coordinates.

pub mod algorithms;
pub mod api;
pub mod core;
pub mod processing;
pub mod session;
pub mod utils;
pub mod validation;

// Re-export commonly used types
pub use crate::core::{
    Algorithm, CalibrationLengths, Point2, PositionEstimate, PositionOutcome, RangeSet,
    RangingSample, DEFAULT_DISTANCE_CM, WORKSPACE_DEFAULT_CM,
};
pub use crate::algorithms::{AnchorLayout, SolverOutcome};
pub use crate::processing::{
    DebounceFilter, EstimateRecord, EstimatorPolicy, PositionEstimator, ReadingStore,
    SampleParser, SampleRecord,
};
pub use crate::session::{SessionManager, SessionStatus, SurveySession};
pub use crate::validation::{ErrorReporter, SampleValidator, ValidationError};
pub use crate::utils::config::PositioningConfig;
pub use crate::api::{
    ApiError, ApiResult, CsvFormatter, HealthReport, IngestSummary, JsonFormatter,
    OutputFormat, PositioningService, ServiceStatistics, TextFormatter,
};
