//! Progressive escalation tracking per user.
//!
//! Repeated step-up challenges inside a fifteen-minute window escalate: once
//! a user has been stepped up [`ESC_MIN_STEPUPS`] times and their next score
//! reaches [`ESC_RISK_THRESH`], the decision is forced to a block. A block
//! resets the user's slate.

use std::collections::HashMap;

/// Step-up look-back window in milliseconds.
pub const ESC_WINDOW_MS: i64 = 900_000;

/// Step-ups inside the window required to force a block.
pub const ESC_MIN_STEPUPS: usize = 3;

/// Minimum score for the forced block to fire.
pub const ESC_RISK_THRESH: u32 = 60;

/// Per-user step-up timestamps.
#[derive(Debug, Clone, Default)]
pub struct EscalationTracker {
    step_ups: HashMap<String, Vec<i64>>,
}

impl EscalationTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a step-up decision at `timestamp`, pruning entries older than
    /// the window first.
    pub fn record_step_up(&mut self, user_id: &str, timestamp: i64) {
        let cutoff = timestamp - ESC_WINDOW_MS;
        let entries = self.step_ups.entry(user_id.to_string()).or_default();
        entries.retain(|&t| t > cutoff);
        entries.push(timestamp);
    }

    /// Records a block decision, clearing the user's step-up slate.
    pub fn record_block(&mut self, user_id: &str) {
        self.step_ups.remove(user_id);
    }

    /// True when the user has at least [`ESC_MIN_STEPUPS`] step-ups inside
    /// the window ending at `timestamp` and `score` reaches
    /// [`ESC_RISK_THRESH`].
    #[must_use]
    pub fn should_force_block(&self, user_id: &str, score: u32, timestamp: i64) -> bool {
        if score < ESC_RISK_THRESH {
            return false;
        }
        let cutoff = timestamp - ESC_WINDOW_MS;
        self.step_ups
            .get(user_id)
            .is_some_and(|entries| entries.iter().filter(|&&t| t > cutoff).count() >= ESC_MIN_STEPUPS)
    }
}
