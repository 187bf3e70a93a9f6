//! Service API and output formatting
//!
//! This module bundles the positioning pipeline behind a synchronous
//! facade and provides JSON, CSV and plain-text renderings of stored
//! estimates.

pub mod blocking;
pub mod formatting;
pub mod types;

// Re-export commonly used API types
pub use blocking::PositioningService;
pub use formatting::{CsvFormatter, JsonFormatter, TextFormatter};
pub use types::{
    ApiError, ApiResult, HealthReport, IngestSummary, OutputFormat, ServiceStatistics,
};
