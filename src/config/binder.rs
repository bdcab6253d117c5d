//! Binder timing configuration.

use serde::Deserialize;
use std::time::Duration;

use super::defaults::{
    default_close_inactivity_period_secs, default_flush_period_ms, default_kick_period_ms,
    default_mailbox_capacity, default_retention_period_secs,
};

/// Timing knobs shared by every document actor.
#[derive(Debug, Clone, Deserialize)]
pub struct BinderConfig {
    /// Seconds an applied transform is retained for rebasing late edits.
    #[serde(default = "default_retention_period_secs")]
    pub retention_period_secs: u64,
    /// Milliseconds between periodic flushes to storage.
    #[serde(default = "default_flush_period_ms")]
    pub flush_period_ms: u64,
    /// Milliseconds a subscriber may take to accept a broadcast before it is
    /// disconnected.
    #[serde(default = "default_kick_period_ms")]
    pub kick_period_ms: u64,
    /// Pending requests buffered per document before callers wait.
    #[serde(default = "default_mailbox_capacity")]
    pub mailbox_capacity: usize,
    /// Seconds without a live subscriber before a document is closed.
    /// Zero keeps documents open until the curator closes.
    #[serde(default = "default_close_inactivity_period_secs")]
    pub close_inactivity_period_secs: u64,
}

impl Default for BinderConfig {
    fn default() -> Self {
        Self {
            retention_period_secs: default_retention_period_secs(),
            flush_period_ms: default_flush_period_ms(),
            kick_period_ms: default_kick_period_ms(),
            mailbox_capacity: default_mailbox_capacity(),
            close_inactivity_period_secs: default_close_inactivity_period_secs(),
        }
    }
}

impl BinderConfig {
    pub fn retention_period(&self) -> Duration {
        Duration::from_secs(self.retention_period_secs)
    }

    /// Never shorter than a millisecond, since the flush timer cannot tick
    /// with a zero period.
    pub fn flush_period(&self) -> Duration {
        Duration::from_millis(self.flush_period_ms.max(1))
    }

    pub fn kick_period(&self) -> Duration {
        Duration::from_millis(self.kick_period_ms)
    }

    pub fn close_inactivity_period(&self) -> Option<Duration> {
        (self.close_inactivity_period_secs > 0)
            .then(|| Duration::from_secs(self.close_inactivity_period_secs))
    }
}
