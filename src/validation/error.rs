//! Error reporting and diagnostics history

use std::collections::HashMap;

use serde::Serialize;

use crate::core::epoch_millis;

/// One reported error
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorRecord {
    pub id: u64,
    pub category: String,
    pub message: String,
    pub occurred_at_ms: u64,
}

/// Bounded error history with per-category counters.
///
/// Feeds the health and diagnostics surfaces; reporting never fails and
/// never interrupts the pipeline that hit the error.
#[derive(Debug)]
pub struct ErrorReporter {
    history: Vec<ErrorRecord>,
    error_counter: u64,
    max_history_size: usize,
    statistics: HashMap<String, u64>,
}

impl ErrorReporter {
    pub fn new() -> Self {
        Self::with_history_size(1000)
    }

    pub fn with_history_size(max_history_size: usize) -> Self {
        Self {
            history: Vec::new(),
            error_counter: 0,
            max_history_size,
            statistics: HashMap::new(),
        }
    }

    /// Record one error; returns its report id
    pub fn report(&mut self, category: &str, message: impl Into<String>) -> u64 {
        self.error_counter += 1;
        *self.statistics.entry(category.to_string()).or_insert(0) += 1;

        self.history.push(ErrorRecord {
            id: self.error_counter,
            category: category.to_string(),
            message: message.into(),
            occurred_at_ms: epoch_millis(),
        });
        if self.history.len() > self.max_history_size {
            self.history.remove(0);
        }

        self.error_counter
    }

    /// Most recent errors, newest first
    pub fn recent_errors(&self, count: usize) -> Vec<&ErrorRecord> {
        self.history.iter().rev().take(count).collect()
    }

    /// Errors reported over the reporter's lifetime
    pub fn total_errors(&self) -> u64 {
        self.error_counter
    }

    /// Error counts per category
    pub fn statistics(&self) -> &HashMap<String, u64> {
        &self.statistics
    }

    /// Drop the history and category counts; the lifetime total remains
    pub fn clear_history(&mut self) {
        self.history.clear();
        self.statistics.clear();
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}
