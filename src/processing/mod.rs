//! Sample processing: wire decoding, the estimation pipeline, per-tag
//! debouncing and the reading history

pub mod debounce;
pub mod estimator;
pub mod parser;
pub mod store;

pub use debounce::{DebounceDecision, DebounceFilter};
pub use estimator::{EstimatorPolicy, PositionEstimator};
pub use parser::{parse_calibration_text, ParseError, SampleParser};
pub use store::{EstimateRecord, ReadingStore, SampleRecord, StoreStatistics};
