//! Synchronous service facade over the whole positioning stack

use std::collections::HashMap;
use std::time::Instant;

use log::{info, warn};

use crate::api::formatting::{CsvFormatter, JsonFormatter, TextFormatter};
use crate::api::types::{ApiError, ApiResult, HealthReport, IngestSummary, ServiceStatistics};
use crate::core::{CalibrationLengths, PositionOutcome, RangeSet, RangingSample};
use crate::processing::estimator::PositionEstimator;
use crate::processing::parser::{parse_calibration_text, SampleParser};
use crate::processing::store::{EstimateRecord, ReadingStore};
use crate::session::{SessionManager, SessionStatus, SurveySession};
use crate::utils::config::PositioningConfig;
use crate::validation::data::SampleValidator;
use crate::validation::error::{ErrorRecord, ErrorReporter};

/// One object owning parser, validator, estimator, session manager, store
/// and error reporter.
///
/// Ingest is gated on an active survey session and uses the calibration
/// that session captured; batches are processed with per-item tolerance so
/// a bad element is counted and skipped, never fatal.
pub struct PositioningService {
    config: PositioningConfig,
    parser: SampleParser,
    validator: SampleValidator,
    estimator: PositionEstimator,
    sessions: SessionManager,
    store: ReadingStore,
    reporter: ErrorReporter,
    statistics: ServiceStatistics,
    started_at: Instant,
}

impl PositioningService {
    /// Service with the default policy
    pub fn new() -> Self {
        Self::build(PositioningConfig::default())
    }

    /// Service with a custom policy; rejects invalid configurations
    pub fn with_config(config: PositioningConfig) -> ApiResult<Self> {
        let validation = config.validate();
        if let Some(error) = validation.errors.into_iter().next() {
            return Err(error.into());
        }
        for warning in &validation.warnings {
            warn!("configuration warning: {}", warning);
        }
        Ok(Self::build(config))
    }

    fn build(config: PositioningConfig) -> Self {
        let mut parser = SampleParser::new();
        parser.set_strict_numeric(config.strict_numeric_parsing);

        Self {
            parser,
            validator: SampleValidator::with_config(config.validation_config()),
            estimator: PositionEstimator::with_policy(config.estimator_policy()),
            sessions: SessionManager::new(),
            store: ReadingStore::with_history_cap(config.history_cap),
            reporter: ErrorReporter::new(),
            statistics: ServiceStatistics::default(),
            started_at: Instant::now(),
            config,
        }
    }

    pub fn config(&self) -> &PositioningConfig {
        &self.config
    }

    // --- session operations ---

    pub fn start_session(&mut self) -> ApiResult<u64> {
        let session = self.sessions.start_session()?;
        self.statistics.sessions_started += 1;
        Ok(session.id)
    }

    pub fn finish_session(&mut self) -> ApiResult<u64> {
        let session = self.sessions.finish_session()?;
        Ok(session.id)
    }

    pub fn session_status(&self) -> SessionStatus {
        self.sessions.status()
    }

    pub fn session_history(&self, limit: usize) -> Vec<SurveySession> {
        self.sessions.history(limit).into_iter().copied().collect()
    }

    pub fn session(&self, id: u64) -> ApiResult<SurveySession> {
        self.sessions
            .session(id)
            .copied()
            .ok_or(ApiError::UnknownSession { id })
    }

    /// Parse raw `kx=…&ky=…` text and adopt it for future sessions
    pub fn update_calibration(&mut self, raw: &str) -> CalibrationLengths {
        let calibration = parse_calibration_text(raw);
        self.sessions.set_calibration(calibration);
        calibration
    }

    pub fn set_calibration(&mut self, calibration: CalibrationLengths) {
        self.sessions.set_calibration(calibration);
    }

    pub fn calibration(&self) -> CalibrationLengths {
        *self.sessions.calibration()
    }

    // --- ingest ---

    /// Ingest a JSON batch payload through the full pipeline.
    ///
    /// Fails outright when no session is active or the payload is not
    /// decodable at all; individual bad elements are skipped and counted.
    pub fn ingest_batch(&mut self, payload: &str) -> ApiResult<IngestSummary> {
        let (session_id, calibration) = self.active_session_context()?;

        let parsed = match self.parser.parse_batch(payload) {
            Ok(items) => items,
            Err(error) => {
                self.note_error("parse", error.to_string());
                return Err(error.into());
            }
        };
        self.statistics.batches_ingested += 1;

        let mut summary = IngestSummary {
            received: parsed.len(),
            saved: 0,
            rejected: 0,
            outcomes: Vec::new(),
        };

        for (index, item) in parsed.into_iter().enumerate() {
            let sample = match item {
                Ok(sample) => sample,
                Err(error) => {
                    summary.rejected += 1;
                    self.statistics.samples_rejected += 1;
                    self.note_error("parse", format!("sample {}: {}", index, error));
                    continue;
                }
            };
            if let Err(error) = self.validator.validate_sample(&sample) {
                summary.rejected += 1;
                self.statistics.samples_rejected += 1;
                self.note_error("validation", format!("sample {}: {}", index, error));
                continue;
            }

            let outcome = self.process_sample(&sample, &calibration, session_id);
            summary.saved += 1;
            summary.outcomes.push(outcome);
        }

        info!(
            "ingested batch: {} received, {} saved, {} rejected",
            summary.received, summary.saved, summary.rejected
        );
        Ok(summary)
    }

    /// Ingest one already-decoded sample
    pub fn ingest_sample(&mut self, sample: RangingSample) -> ApiResult<PositionOutcome> {
        let (session_id, calibration) = self.active_session_context()?;

        if let Err(error) = self.validator.validate_sample(&sample) {
            self.statistics.samples_rejected += 1;
            self.note_error("validation", error.to_string());
            return Err(error.into());
        }

        Ok(self.process_sample(&sample, &calibration, session_id))
    }

    /// One-shot estimation against the current calibration. Bypasses the
    /// session gate and records nothing, but shares the debounce state.
    pub fn estimate_position(&self, tag_id: &str, ranges: &RangeSet) -> PositionOutcome {
        self.estimator
            .estimate_position(tag_id, ranges, self.sessions.calibration())
    }

    // --- views ---

    pub fn recent_estimates(&self, count: usize) -> Vec<EstimateRecord> {
        self.store
            .recent_estimates(count)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn estimates_for_tag(&self, tag_id: &str, count: usize) -> Vec<EstimateRecord> {
        self.store
            .estimates_for_tag(tag_id, count)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn recent_estimates_json(&self, count: usize, pretty: bool) -> ApiResult<String> {
        JsonFormatter::new(pretty)
            .format(&self.store.recent_estimates(count))
            .map_err(|e| ApiError::Serialization {
                details: e.to_string(),
            })
    }

    pub fn recent_estimates_csv(&self, count: usize, include_header: bool) -> String {
        CsvFormatter::new(include_header).format(&self.store.recent_estimates(count))
    }

    pub fn recent_estimates_text(&self, count: usize, compact: bool) -> String {
        TextFormatter::new(compact).format(&self.store.recent_estimates(count))
    }

    // --- health and statistics ---

    pub fn statistics(&self) -> ServiceStatistics {
        let mut statistics = self.statistics;
        statistics.uptime_ms = self.started_at.elapsed().as_millis() as u64;
        statistics
    }

    pub fn reset_statistics(&mut self) {
        self.statistics = ServiceStatistics::default();
    }

    pub fn health_report(&self) -> HealthReport {
        HealthReport {
            readings_enabled: self.sessions.status().readings_enabled,
            sessions: self.sessions.counts(),
            store: self.store.statistics(),
            total_errors: self.reporter.total_errors(),
        }
    }

    pub fn recent_errors(&self, count: usize) -> Vec<ErrorRecord> {
        self.reporter
            .recent_errors(count)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Error counts per category over the service lifetime
    pub fn error_statistics(&self) -> &HashMap<String, u64> {
        self.reporter.statistics()
    }

    /// Forget all per-tag debounce state
    pub fn reset_debounce(&self) {
        self.estimator.reset();
    }

    // --- internals ---

    fn active_session_context(&mut self) -> ApiResult<(u64, CalibrationLengths)> {
        match self.sessions.active_session() {
            Some(session) => Ok((session.id, session.calibration)),
            None => {
                self.note_error("session", "ingest rejected: no active session".to_string());
                Err(ApiError::NoActiveSession)
            }
        }
    }

    fn process_sample(
        &mut self,
        sample: &RangingSample,
        calibration: &CalibrationLengths,
        session_id: u64,
    ) -> PositionOutcome {
        self.store.record_sample(sample, session_id);
        self.statistics.samples_ingested += 1;

        let outcome = self
            .estimator
            .estimate_position(&sample.tag_id, &sample.ranges, calibration);
        match &outcome {
            PositionOutcome::Accepted(_) => self.statistics.estimates_accepted += 1,
            PositionOutcome::Suppressed { .. } => self.statistics.estimates_suppressed += 1,
        }
        self.store.record_outcome(&sample.tag_id, &outcome, session_id);

        outcome
    }

    fn note_error(&mut self, category: &str, message: String) {
        warn!("{}: {}", category, message);
        self.statistics.error_count += 1;
        self.reporter.report(category, message);
    }
}

impl Default for PositioningService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Algorithm;

    #[test]
    fn test_ingest_requires_active_session() {
        let mut service = PositioningService::new();
        let result = service.ingest_batch(r#"[{"tag_number": "1", "da0": 10}]"#);

        assert_eq!(result, Err(ApiError::NoActiveSession));
        assert_eq!(service.statistics().error_count, 1);
        assert_eq!(service.health_report().total_errors, 1);
    }

    #[test]
    fn test_batch_flow_with_per_item_tolerance() {
        let mut service = PositioningService::new();
        service.update_calibration("kx=100&ky=100");
        let session_id = service.start_session().unwrap();
        assert_eq!(session_id, 1);

        let summary = service
            .ingest_batch(
                r#"[
                    {"tag_number": "9", "da0": 10},
                    {"da0": 20},
                    {"tag_number": "9", "da0": 10, "da1": 90}
                ]"#,
            )
            .unwrap();

        assert_eq!(summary.received, 3);
        assert_eq!(summary.saved, 2);
        assert_eq!(summary.rejected, 1);
        assert_eq!(summary.outcomes.len(), 2);

        // Under a 100x100 workspace both readings degrade to the center;
        // the second one is therefore suppressed
        match summary.outcomes[0] {
            PositionOutcome::Accepted(estimate) => {
                assert_eq!((estimate.x, estimate.y), (50.0, 50.0));
                assert_eq!(estimate.algorithm, Algorithm::Basic);
            }
            PositionOutcome::Suppressed { .. } => panic!("first outcome must be accepted"),
        }
        assert!(!summary.outcomes[1].is_accepted());

        let statistics = service.statistics();
        assert_eq!(statistics.batches_ingested, 1);
        assert_eq!(statistics.samples_ingested, 2);
        assert_eq!(statistics.samples_rejected, 1);
        assert_eq!(statistics.estimates_accepted, 1);
        assert_eq!(statistics.estimates_suppressed, 1);
        assert_eq!(statistics.error_count, 1);

        let errors = service.recent_errors(5);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].category, "parse");
        assert_eq!(service.error_statistics().get("parse"), Some(&1));
    }

    #[test]
    fn test_undecodable_batch_is_fatal() {
        let mut service = PositioningService::new();
        service.start_session().unwrap();

        let result = service.ingest_batch("not json");
        assert!(matches!(result, Err(ApiError::Parse { .. })));
        assert_eq!(service.statistics().batches_ingested, 0);
    }

    #[test]
    fn test_session_lifecycle_through_facade() {
        let mut service = PositioningService::new();
        assert!(!service.session_status().readings_enabled);

        let id = service.start_session().unwrap();
        assert!(service.session_status().readings_enabled);
        assert_eq!(
            service.start_session(),
            Err(ApiError::SessionConflict { active_id: id })
        );

        assert_eq!(service.finish_session(), Ok(id));
        assert_eq!(service.finish_session(), Err(ApiError::NoActiveSession));
        assert_eq!(service.session(id).unwrap().id, id);
        assert_eq!(service.session(99), Err(ApiError::UnknownSession { id: 99 }));
        assert_eq!(service.statistics().sessions_started, 1);
    }

    #[test]
    fn test_sessions_use_captured_calibration() {
        let mut service = PositioningService::new();
        service.update_calibration("kx=100&ky=100");
        service.start_session().unwrap();

        // A mid-session recalibration must not move the center
        service.update_calibration("kx=200&ky=200");

        let outcome = service
            .ingest_sample(RangingSample::new("5", RangeSet::empty()))
            .unwrap();
        match outcome {
            PositionOutcome::Accepted(estimate) => {
                assert_eq!((estimate.x, estimate.y), (50.0, 50.0));
            }
            PositionOutcome::Suppressed { .. } => panic!("first estimate must be accepted"),
        }
    }

    #[test]
    fn test_invalid_sample_is_rejected() {
        let mut service = PositioningService::new();
        service.start_session().unwrap();

        let result = service.ingest_sample(RangingSample::new("  ", RangeSet::empty()));
        assert!(matches!(result, Err(ApiError::Validation { .. })));
        assert_eq!(service.statistics().samples_rejected, 1);
    }

    #[test]
    fn test_formatted_views() {
        let mut service = PositioningService::new();
        service.start_session().unwrap();
        service
            .ingest_batch(r#"[{"tag_number": "3", "da0": 80.61, "da1": 80.61, "da2": 80.61}]"#)
            .unwrap();

        let csv = service.recent_estimates_csv(10, true);
        assert!(csv.starts_with(CsvFormatter::header()));
        assert_eq!(csv.lines().count(), 2);

        let json = service.recent_estimates_json(10, false).unwrap();
        let parsed: Vec<EstimateRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].tag_id, "3");

        let text = service.recent_estimates_text(10, true);
        assert!(text.contains("3: ("));
    }

    #[test]
    fn test_one_shot_estimation_without_session() {
        let service = PositioningService::new();
        let mut ranges = RangeSet::empty();
        ranges.set(0, Some(50.0));

        let outcome = service.estimate_position("solo", &ranges);
        assert_eq!(outcome.position(), (57.0, 57.0));
    }

    #[test]
    fn test_with_config_rejects_bad_parameters() {
        let config = PositioningConfig {
            fallback_distance_cm: 0.0,
            ..Default::default()
        };
        let result = PositioningService::with_config(config);
        assert!(matches!(
            result,
            Err(ApiError::Configuration { parameter, .. }) if parameter == "fallback_distance_cm"
        ));
    }

    #[test]
    fn test_reset_statistics() {
        let mut service = PositioningService::new();
        service.start_session().unwrap();
        service
            .ingest_batch(r#"[{"tag_number": "1", "da0": 10}]"#)
            .unwrap();
        assert_eq!(service.statistics().samples_ingested, 1);

        service.reset_statistics();
        assert_eq!(service.statistics().samples_ingested, 0);
        assert_eq!(service.statistics().sessions_started, 0);
    }

    #[test]
    fn test_reset_debounce_allows_resighting() {
        let mut service = PositioningService::new();
        service.start_session().unwrap();

        let payload = r#"[{"tag_number": "1", "da0": 10}]"#;
        assert!(service.ingest_batch(payload).unwrap().outcomes[0].is_accepted());
        assert!(!service.ingest_batch(payload).unwrap().outcomes[0].is_accepted());

        service.reset_debounce();
        assert!(service.ingest_batch(payload).unwrap().outcomes[0].is_accepted());
    }
}
