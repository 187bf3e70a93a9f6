//! Ranging sample validation ahead of estimation

use std::fmt;

use crate::core::{RangingSample, MAX_ANCHORS};

/// Bounds applied to incoming samples
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationConfig {
    /// Longest plausible tag-to-anchor distance (cm)
    pub max_range_cm: f64,
    /// Longest accepted tag identifier
    pub max_tag_id_len: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_range_cm: 10_000.0,
            max_tag_id_len: 64,
        }
    }
}

/// Why a sample was rejected
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Tag identifier is empty or whitespace
    EmptyTagId,
    /// Tag identifier exceeds the configured length
    TagIdTooLong { length: usize, max: usize },
    /// A range slot holds NaN or infinity
    NonFiniteRange { slot: usize },
    /// A range slot exceeds the plausibility ceiling
    RangeTooLarge { slot: usize, value: f64, max: f64 },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyTagId => write!(f, "Tag identifier is empty"),
            ValidationError::TagIdTooLong { length, max } => {
                write!(f, "Tag identifier of {} chars exceeds the {} limit", length, max)
            }
            ValidationError::NonFiniteRange { slot } => {
                write!(f, "Range slot {} is not a finite number", slot)
            }
            ValidationError::RangeTooLarge { slot, value, max } => {
                write!(
                    f,
                    "Range slot {} of {:.1} cm exceeds the {:.1} cm ceiling",
                    slot, value, max
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Result of validating one batch
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BatchValidation {
    pub valid_samples: Vec<RangingSample>,
    pub rejected: Vec<(usize, ValidationError)>,
    pub warnings: Vec<String>,
}

/// Validates samples against the configured bounds.
///
/// A sample without a single valid range still passes (the pipeline
/// degrades it to the workspace center); the batch result carries a
/// warning for it instead.
#[derive(Debug, Clone, Default)]
pub struct SampleValidator {
    config: ValidationConfig,
}

impl SampleValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ValidationConfig) -> Self {
        Self { config }
    }

    pub fn validate_sample(&self, sample: &RangingSample) -> Result<(), ValidationError> {
        let tag = sample.tag_id.trim();
        if tag.is_empty() {
            return Err(ValidationError::EmptyTagId);
        }
        if tag.len() > self.config.max_tag_id_len {
            return Err(ValidationError::TagIdTooLong {
                length: tag.len(),
                max: self.config.max_tag_id_len,
            });
        }

        for slot in 0..MAX_ANCHORS {
            if let Some(distance) = sample.ranges.get(slot) {
                if !distance.is_finite() {
                    return Err(ValidationError::NonFiniteRange { slot });
                }
                if distance > self.config.max_range_cm {
                    return Err(ValidationError::RangeTooLarge {
                        slot,
                        value: distance,
                        max: self.config.max_range_cm,
                    });
                }
            }
        }

        Ok(())
    }

    pub fn validate_batch(&self, samples: Vec<RangingSample>) -> BatchValidation {
        let mut result = BatchValidation::default();
        for (index, sample) in samples.into_iter().enumerate() {
            match self.validate_sample(&sample) {
                Ok(()) => {
                    if sample.ranges.valid_count() == 0 {
                        result.warnings.push(format!(
                            "sample {} for tag '{}' has no valid ranges",
                            index, sample.tag_id
                        ));
                    }
                    result.valid_samples.push(sample);
                }
                Err(error) => result.rejected.push((index, error)),
            }
        }
        result
    }
}
