//! Survey session lifecycle and calibration custody
//!
//! A survey session is the unit of measurement work: ingest is enabled only
//! while one is active, and each session captures the calibration lengths
//! it was started with.

use std::fmt;

use log::info;
use serde::{Deserialize, Serialize};

use crate::core::{epoch_millis, CalibrationLengths};

/// Default number of sessions returned by history queries
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// One measurement session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurveySession {
    pub id: u64,
    pub started_at_ms: u64,
    pub finished_at_ms: Option<u64>,
    /// Calibration captured when the session started; immutable afterwards
    pub calibration: CalibrationLengths,
}

impl SurveySession {
    pub fn is_active(&self) -> bool {
        self.finished_at_ms.is_none()
    }
}

/// Session lifecycle errors
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionError {
    /// A session is already running
    AlreadyActive { active_id: u64 },
    /// No session is running
    NoActiveSession,
    /// Unknown session identifier
    NotFound { id: u64 },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::AlreadyActive { active_id } => {
                write!(f, "Session {} is already active", active_id)
            }
            SessionError::NoActiveSession => write!(f, "No active session"),
            SessionError::NotFound { id } => write!(f, "Session {} not found", id),
        }
    }
}

impl std::error::Error for SessionError {}

/// Totals over all sessions ever started
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SessionCounts {
    pub total: usize,
    pub active: usize,
    pub finished: usize,
}

/// Point-in-time lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SessionStatus {
    pub session_active: bool,
    pub readings_enabled: bool,
    pub active_id: Option<u64>,
}

/// Owns the session list and the most recently supplied calibration.
///
/// At most one session is active at a time. Updating the calibration while
/// a session runs affects future sessions only; the running one keeps what
/// it captured.
#[derive(Debug)]
pub struct SessionManager {
    sessions: Vec<SurveySession>,
    calibration: CalibrationLengths,
    next_id: u64,
}

impl SessionManager {
    pub fn new() -> Self {
        Self {
            sessions: Vec::new(),
            calibration: CalibrationLengths::absent(),
            next_id: 1,
        }
    }

    /// Calibration that the next session will capture
    pub fn calibration(&self) -> &CalibrationLengths {
        &self.calibration
    }

    pub fn set_calibration(&mut self, calibration: CalibrationLengths) {
        info!(
            "calibration updated: kx={:?} ky={:?}",
            calibration.kx, calibration.ky
        );
        self.calibration = calibration;
    }

    /// Open a new session; fails while another is active
    pub fn start_session(&mut self) -> Result<SurveySession, SessionError> {
        if let Some(active) = self.active_session() {
            return Err(SessionError::AlreadyActive {
                active_id: active.id,
            });
        }

        let session = SurveySession {
            id: self.next_id,
            started_at_ms: epoch_millis(),
            finished_at_ms: None,
            calibration: self.calibration,
        };
        self.next_id += 1;
        info!("survey session {} started", session.id);
        self.sessions.push(session);
        Ok(session)
    }

    /// Close the active session; fails when none is running
    pub fn finish_session(&mut self) -> Result<SurveySession, SessionError> {
        let session = self
            .sessions
            .iter_mut()
            .find(|session| session.is_active())
            .ok_or(SessionError::NoActiveSession)?;
        session.finished_at_ms = Some(epoch_millis());
        info!("survey session {} finished", session.id);
        Ok(*session)
    }

    pub fn active_session(&self) -> Option<&SurveySession> {
        self.sessions.iter().find(|session| session.is_active())
    }

    pub fn status(&self) -> SessionStatus {
        let active_id = self.active_session().map(|session| session.id);
        SessionStatus {
            session_active: active_id.is_some(),
            readings_enabled: active_id.is_some(),
            active_id,
        }
    }

    /// Past and present sessions, most recent first
    pub fn history(&self, limit: usize) -> Vec<&SurveySession> {
        self.sessions.iter().rev().take(limit).collect()
    }

    pub fn session(&self, id: u64) -> Option<&SurveySession> {
        self.sessions.iter().find(|session| session.id == id)
    }

    pub fn counts(&self) -> SessionCounts {
        let active = self.active_session().map_or(0, |_| 1);
        SessionCounts {
            total: self.sessions.len(),
            active,
            finished: self.sessions.len() - active,
        }
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}
