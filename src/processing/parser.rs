//! Wire payload decoding: ranging samples and calibration text

use std::fmt;

use log::warn;
use serde_json::Value;

use crate::core::{CalibrationLengths, RangeSet, RangingSample, MAX_ANCHORS};

/// Errors produced while decoding wire payloads
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Payload is not syntactically valid JSON
    InvalidJson { details: String },
    /// Payload is valid JSON but not an object or an array of objects
    UnexpectedShape { found: String },
    /// A required field is absent
    MissingField { field: String },
    /// A field is present but cannot be interpreted
    InvalidField { field: String, value: String },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::InvalidJson { details } => {
                write!(f, "Invalid JSON payload: {}", details)
            }
            ParseError::UnexpectedShape { found } => {
                write!(f, "Expected an object or array of objects, found {}", found)
            }
            ParseError::MissingField { field } => {
                write!(f, "Missing required field '{}'", field)
            }
            ParseError::InvalidField { field, value } => {
                write!(f, "Field '{}' has unusable value '{}'", field, value)
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Decoder for ranging-sample payloads.
///
/// Field values arrive in mixed encodings depending on the tag firmware:
/// JSON numbers, numeric strings or null. The lenient default accepts all
/// of them; strict mode rejects string-encoded numbers.
#[derive(Debug, Clone)]
pub struct SampleParser {
    strict_numeric: bool,
}

impl SampleParser {
    pub fn new() -> Self {
        Self {
            strict_numeric: false,
        }
    }

    pub fn set_strict_numeric(&mut self, strict: bool) {
        self.strict_numeric = strict;
    }

    /// Decode a single sample object
    pub fn parse_sample(&self, payload: &str) -> Result<RangingSample, ParseError> {
        let value: Value = serde_json::from_str(payload).map_err(|e| ParseError::InvalidJson {
            details: e.to_string(),
        })?;
        self.sample_from_value(&value)
    }

    /// Decode a batch payload: a JSON array of sample objects, or a single
    /// object treated as a batch of one.
    ///
    /// Element failures are returned in place, so one bad element never
    /// discards the rest of the batch.
    pub fn parse_batch(
        &self,
        payload: &str,
    ) -> Result<Vec<Result<RangingSample, ParseError>>, ParseError> {
        let value: Value = serde_json::from_str(payload).map_err(|e| ParseError::InvalidJson {
            details: e.to_string(),
        })?;
        match &value {
            Value::Array(items) => {
                Ok(items.iter().map(|item| self.sample_from_value(item)).collect())
            }
            Value::Object(_) => Ok(vec![self.sample_from_value(&value)]),
            other => Err(ParseError::UnexpectedShape {
                found: json_type_name(other).to_string(),
            }),
        }
    }

    /// Decode one sample from an already-parsed JSON value
    pub fn sample_from_value(&self, value: &Value) -> Result<RangingSample, ParseError> {
        let object = value.as_object().ok_or_else(|| ParseError::UnexpectedShape {
            found: json_type_name(value).to_string(),
        })?;

        let tag_value = object
            .get("tag_number")
            .or_else(|| object.get("tag_id"))
            .or_else(|| object.get("tag"))
            .ok_or_else(|| ParseError::MissingField {
                field: "tag_number".to_string(),
            })?;
        let tag_id = match tag_value {
            Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            other => {
                return Err(ParseError::InvalidField {
                    field: "tag_number".to_string(),
                    value: other.to_string(),
                })
            }
        };

        let mut ranges = RangeSet::empty();
        let mut rssi = [None; MAX_ANCHORS];
        for slot in 0..MAX_ANCHORS {
            let range_field = format!("da{}", slot);
            if let Some(raw) = object.get(&range_field) {
                // Non-positive readings mean "no ranging" and become absent
                let distance = self.numeric(raw, &range_field)?;
                ranges.set(slot, distance.filter(|d| d.is_finite() && *d > 0.0));
            }
            let rssi_field = format!("rssi{}", slot);
            if let Some(raw) = object.get(&rssi_field) {
                rssi[slot] = self.numeric(raw, &rssi_field)?;
            }
        }

        Ok(RangingSample::new(tag_id, ranges).with_rssi(rssi))
    }

    fn numeric(&self, value: &Value, field: &str) -> Result<Option<f64>, ParseError> {
        match value {
            Value::Null => Ok(None),
            Value::Number(n) => Ok(n.as_f64()),
            Value::String(s) if !self.strict_numeric => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Ok(None);
                }
                trimmed
                    .parse::<f64>()
                    .map(Some)
                    .map_err(|_| ParseError::InvalidField {
                        field: field.to_string(),
                        value: s.clone(),
                    })
            }
            other => Err(ParseError::InvalidField {
                field: field.to_string(),
                value: other.to_string(),
            }),
        }
    }
}

impl Default for SampleParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse calibration text of the form `kx=<number>&ky=<number>`.
///
/// Keys are case-insensitive and values are trimmed. Unparseable or missing
/// values leave that axis absent; this never fails.
pub fn parse_calibration_text(raw: &str) -> CalibrationLengths {
    let mut calibration = CalibrationLengths::absent();
    for pair in raw.split('&') {
        let (key, value) = match pair.split_once('=') {
            Some(parts) => parts,
            None => continue,
        };
        let trimmed = value.trim();
        let parsed = trimmed.parse::<f64>().ok();
        if parsed.is_none() && !trimmed.is_empty() {
            warn!(
                "unparseable calibration value '{}' for key '{}'",
                trimmed,
                key.trim()
            );
        }
        match key.trim().to_ascii_lowercase().as_str() {
            "kx" => calibration.kx = parsed,
            "ky" => calibration.ky = parsed,
            _ => {}
        }
    }
    calibration
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
