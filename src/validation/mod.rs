//! Input validation and error diagnostics

pub mod data;
pub mod error;

pub use data::{BatchValidation, SampleValidator, ValidationConfig, ValidationError};
pub use error::{ErrorRecord, ErrorReporter};
