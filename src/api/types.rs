//! Shared types for the service facade

use std::fmt;

use serde::Serialize;

use crate::core::PositionOutcome;
use crate::processing::parser::ParseError;
use crate::processing::store::StoreStatistics;
use crate::session::{SessionCounts, SessionError};
use crate::utils::config::ConfigError;
use crate::validation::data::ValidationError;

/// Convenient result alias for facade operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors surfaced by the service facade
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Payload could not be decoded
    Parse { details: String },
    /// A sample failed validation
    Validation { details: String },
    /// Ingest requires an active survey session
    NoActiveSession,
    /// A session is already running
    SessionConflict { active_id: u64 },
    /// Unknown session identifier
    UnknownSession { id: u64 },
    /// A configuration parameter was rejected
    Configuration { parameter: String, reason: String },
    /// Rendering an output failed
    Serialization { details: String },
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Parse { details } => write!(f, "Parse error: {}", details),
            ApiError::Validation { details } => write!(f, "Validation error: {}", details),
            ApiError::NoActiveSession => write!(f, "No active survey session"),
            ApiError::SessionConflict { active_id } => {
                write!(f, "Survey session {} is already active", active_id)
            }
            ApiError::UnknownSession { id } => write!(f, "Unknown survey session {}", id),
            ApiError::Configuration { parameter, reason } => {
                write!(f, "Configuration error for '{}': {}", parameter, reason)
            }
            ApiError::Serialization { details } => write!(f, "Serialization error: {}", details),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<ParseError> for ApiError {
    fn from(error: ParseError) -> Self {
        ApiError::Parse {
            details: error.to_string(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(error: ValidationError) -> Self {
        ApiError::Validation {
            details: error.to_string(),
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::AlreadyActive { active_id } => ApiError::SessionConflict { active_id },
            SessionError::NoActiveSession => ApiError::NoActiveSession,
            SessionError::NotFound { id } => ApiError::UnknownSession { id },
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(error: ConfigError) -> Self {
        match error {
            ConfigError::InvalidParameter {
                parameter, reason, ..
            } => ApiError::Configuration { parameter, reason },
            ConfigError::IoError { message } => ApiError::Configuration {
                parameter: "config_file".to_string(),
                reason: message,
            },
            ConfigError::SerializationError { message } => ApiError::Serialization {
                details: message,
            },
        }
    }
}

/// Counters maintained across the service lifetime
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ServiceStatistics {
    pub batches_ingested: u64,
    pub samples_ingested: u64,
    pub samples_rejected: u64,
    pub estimates_accepted: u64,
    pub estimates_suppressed: u64,
    pub sessions_started: u64,
    pub error_count: u64,
    pub uptime_ms: u64,
}

/// Point-in-time service health
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HealthReport {
    pub readings_enabled: bool,
    pub sessions: SessionCounts,
    pub store: StoreStatistics,
    pub total_errors: u64,
}

/// Formats for rendered estimate listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Csv,
    Text,
}

/// Summary of one ingest call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestSummary {
    /// Elements in the batch payload
    pub received: usize,
    /// Samples that parsed, validated and went through the pipeline
    pub saved: usize,
    /// Elements dropped by parsing or validation
    pub rejected: usize,
    /// One outcome per saved sample, in batch order
    pub outcomes: Vec<PositionOutcome>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_error_conversion() {
        let api_error: ApiError = SessionError::AlreadyActive { active_id: 3 }.into();
        assert_eq!(api_error, ApiError::SessionConflict { active_id: 3 });

        let api_error: ApiError = SessionError::NoActiveSession.into();
        assert_eq!(api_error, ApiError::NoActiveSession);
    }

    #[test]
    fn test_config_error_conversion_keeps_parameter() {
        let api_error: ApiError = ConfigError::InvalidParameter {
            parameter: "max_range_cm".to_string(),
            value: "-1".to_string(),
            reason: "must be positive".to_string(),
        }
        .into();

        assert_eq!(
            api_error,
            ApiError::Configuration {
                parameter: "max_range_cm".to_string(),
                reason: "must be positive".to_string()
            }
        );
    }

    #[test]
    fn test_error_display() {
        let error = ApiError::Parse {
            details: "bad field".to_string(),
        };
        assert_eq!(error.to_string(), "Parse error: bad field");
        assert_eq!(ApiError::NoActiveSession.to_string(), "No active survey session");
    }
}
