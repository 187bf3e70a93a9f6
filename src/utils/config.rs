//! Runtime configuration for the positioning service

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{
    BOUNDARY_MARGIN_CM, DEBOUNCE_THRESHOLD_CM, DEFAULT_DISTANCE_CM, WORKSPACE_DEFAULT_CM,
};
use crate::processing::estimator::EstimatorPolicy;
use crate::processing::store::DEFAULT_HISTORY_CAP;
use crate::validation::data::ValidationConfig;

/// Tunable policy for the whole service
///
/// Defaults mirror the named constants in `core::constants`; deployments
/// override them through a JSON file or by building the struct directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositioningConfig {
    /// Workspace edge substituted for absent calibration axes (cm)
    pub workspace_default_cm: f64,
    /// Distance substituted on the degenerate fallback path (cm)
    pub fallback_distance_cm: f64,
    /// Clearance kept from the workspace edges (cm)
    pub boundary_margin_cm: f64,
    /// Per-axis movement below which updates are suppressed (cm)
    pub debounce_threshold_cm: f64,
    /// Longest plausible range accepted by the validator (cm)
    pub max_range_cm: f64,
    /// Records kept per history before the oldest are evicted
    pub history_cap: usize,
    /// Reject string-encoded numbers in wire payloads
    pub strict_numeric_parsing: bool,
}

impl Default for PositioningConfig {
    fn default() -> Self {
        Self {
            workspace_default_cm: WORKSPACE_DEFAULT_CM,
            fallback_distance_cm: DEFAULT_DISTANCE_CM,
            boundary_margin_cm: BOUNDARY_MARGIN_CM,
            debounce_threshold_cm: DEBOUNCE_THRESHOLD_CM,
            max_range_cm: 10_000.0,
            history_cap: DEFAULT_HISTORY_CAP,
            strict_numeric_parsing: false,
        }
    }
}

impl PositioningConfig {
    /// Load and validate a configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content = fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
            message: format!("Failed to read config file '{}': {}", path_str, e),
        })?;

        let config: PositioningConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::SerializationError {
                message: format!("Failed to parse config file '{}': {}", path_str, e),
            })?;

        let validation = config.validate();
        if !validation.is_valid {
            return Err(validation.errors.into_iter().next().unwrap_or(
                ConfigError::InvalidParameter {
                    parameter: "unknown".to_string(),
                    value: String::new(),
                    reason: "Validation failed".to_string(),
                },
            ));
        }

        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::SerializationError {
                message: format!("Failed to serialize config: {}", e),
            })?;

        fs::write(&path, content).map_err(|e| ConfigError::IoError {
            message: format!("Failed to write config file '{}': {}", path_str, e),
        })
    }

    /// Check the parameters for consistency
    pub fn validate(&self) -> ConfigValidation {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let mut suggestions = Vec::new();

        if !self.workspace_default_cm.is_finite() || self.workspace_default_cm <= 0.0 {
            errors.push(ConfigError::InvalidParameter {
                parameter: "workspace_default_cm".to_string(),
                value: self.workspace_default_cm.to_string(),
                reason: "Workspace default edge must be a positive length".to_string(),
            });
        }

        if !self.fallback_distance_cm.is_finite() || self.fallback_distance_cm <= 0.0 {
            errors.push(ConfigError::InvalidParameter {
                parameter: "fallback_distance_cm".to_string(),
                value: self.fallback_distance_cm.to_string(),
                reason: "Fallback distance must be a positive length".to_string(),
            });
        }

        if !self.boundary_margin_cm.is_finite() || self.boundary_margin_cm < 0.0 {
            errors.push(ConfigError::InvalidParameter {
                parameter: "boundary_margin_cm".to_string(),
                value: self.boundary_margin_cm.to_string(),
                reason: "Boundary margin cannot be negative".to_string(),
            });
        } else if self.boundary_margin_cm * 2.0 >= self.workspace_default_cm {
            warnings.push(
                "Boundary margins overlap across the default workspace; estimates collapse to the lower margin".to_string(),
            );
            suggestions.push("Reduce boundary_margin_cm or enlarge workspace_default_cm".to_string());
        }

        if !self.debounce_threshold_cm.is_finite() || self.debounce_threshold_cm < 0.0 {
            errors.push(ConfigError::InvalidParameter {
                parameter: "debounce_threshold_cm".to_string(),
                value: self.debounce_threshold_cm.to_string(),
                reason: "Debounce threshold cannot be negative".to_string(),
            });
        } else if self.debounce_threshold_cm == 0.0 {
            warnings.push("Zero debounce threshold accepts every update".to_string());
        } else if self.debounce_threshold_cm > 50.0 {
            warnings.push("Very large debounce threshold hides real movement".to_string());
            suggestions.push("Keep debounce_threshold_cm near the ranging noise floor".to_string());
        }

        if !self.max_range_cm.is_finite() || self.max_range_cm <= 0.0 {
            errors.push(ConfigError::InvalidParameter {
                parameter: "max_range_cm".to_string(),
                value: self.max_range_cm.to_string(),
                reason: "Range ceiling must be a positive length".to_string(),
            });
        }

        if self.history_cap == 0 {
            warnings.push("Zero history cap retains no records".to_string());
        }

        ConfigValidation {
            is_valid: errors.is_empty(),
            errors,
            warnings,
            suggestions,
        }
    }

    /// Policy slice consumed by the estimation pipeline
    pub fn estimator_policy(&self) -> EstimatorPolicy {
        EstimatorPolicy {
            workspace_default_cm: self.workspace_default_cm,
            fallback_distance_cm: self.fallback_distance_cm,
            boundary_margin_cm: self.boundary_margin_cm,
            debounce_threshold_cm: self.debounce_threshold_cm,
        }
    }

    /// Bounds slice consumed by the sample validator
    pub fn validation_config(&self) -> ValidationConfig {
        ValidationConfig {
            max_range_cm: self.max_range_cm,
            ..Default::default()
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A parameter value is out of range or inconsistent
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },
    /// Reading or writing the config file failed
    IoError { message: String },
    /// The config file is not valid JSON for this schema
    SerializationError { message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidParameter {
                parameter,
                value,
                reason,
            } => write!(f, "Invalid parameter '{}' = '{}': {}", parameter, value, reason),
            ConfigError::IoError { message } => write!(f, "IO error: {}", message),
            ConfigError::SerializationError { message } => {
                write!(f, "Serialization error: {}", message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Outcome of validating a configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValidation {
    pub is_valid: bool,
    pub errors: Vec<ConfigError>,
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,
}
