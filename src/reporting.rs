//! Error sink: every report goes to the log and to in-memory counters that a
//! dev overlay can read back.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use tracing::error;

/// Reports kept for `recent()`
pub const RECENT_LIMIT: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ErrorKey {
    pub code: String,
    pub component: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub code: String,
    pub component: String,
    pub message: String,
    pub reported_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct ReporterState {
    counts: HashMap<ErrorKey, u64>,
    recent: VecDeque<ErrorReport>,
}

#[derive(Debug, Default)]
pub struct ErrorReporter {
    state: Mutex<ReporterState>,
}

impl ErrorReporter {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, ReporterState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn report(&self, code: &str, component: &str, message: impl Into<String>) {
        let message = message.into();
        error!(code, component, "{}", message);

        let mut state = self.state();
        let key = ErrorKey {
            code: code.to_string(),
            component: component.to_string(),
        };
        *state.counts.entry(key).or_insert(0) += 1;

        if state.recent.len() == RECENT_LIMIT {
            state.recent.pop_front();
        }
        state.recent.push_back(ErrorReport {
            code: code.to_string(),
            component: component.to_string(),
            message,
            reported_at: Utc::now(),
        });
    }

    /// Convenience for anything implementing `Display`, e.g. `anyhow::Error`
    pub fn report_error(&self, code: &str, component: &str, err: &dyn std::fmt::Display) {
        self.report(code, component, err.to_string());
    }

    pub fn count(&self, code: &str, component: &str) -> u64 {
        let key = ErrorKey {
            code: code.to_string(),
            component: component.to_string(),
        };
        self.state().counts.get(&key).copied().unwrap_or(0)
    }

    pub fn counts(&self) -> HashMap<ErrorKey, u64> {
        self.state().counts.clone()
    }

    pub fn total(&self) -> u64 {
        self.state().counts.values().sum()
    }

    /// Most frequent keys, ties broken by code then component
    pub fn top(&self, n: usize) -> Vec<(ErrorKey, u64)> {
        let mut entries: Vec<(ErrorKey, u64)> = self.counts().into_iter().collect();
        entries.sort_by(|a, b| {
            b.1.cmp(&a.1)
                .then_with(|| a.0.code.cmp(&b.0.code))
                .then_with(|| a.0.component.cmp(&b.0.component))
        });
        entries.truncate(n);
        entries
    }

    /// Newest last
    pub fn recent(&self) -> Vec<ErrorReport> {
        self.state().recent.iter().cloned().collect()
    }

    pub fn reset(&self) {
        let mut state = self.state();
        state.counts.clear();
        state.recent.clear();
    }
}
