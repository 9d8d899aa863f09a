//! Per-session engine configuration.

use std::time::Duration;
use tiller_core::{SessionMode, DEFAULT_CANDIDATE_CAP};

/// Tunables for one session's resolution engine.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub mode: SessionMode,
    /// Upper bound of the implicit existence wait.
    pub implicit_timeout: Duration,
    /// Re-poll interval inside the implicit wait.
    pub poll_interval: Duration,
    /// Default candidate cap for accessibility lookups.
    pub candidate_cap: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            mode: SessionMode::w3c(),
            implicit_timeout: Duration::from_millis(3000),
            poll_interval: Duration::from_millis(500),
            candidate_cap: DEFAULT_CANDIDATE_CAP,
        }
    }
}

impl SessionConfig {
    pub fn new(mode: SessionMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn with_implicit_timeout(mut self, timeout: Duration) -> Self {
        self.implicit_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_candidate_cap(mut self, cap: usize) -> Self {
        self.candidate_cap = cap;
        self
    }
}
