//! Rolling latency monitor for evaluation processing times.
//!
//! Keeps the ten most recent samples and flags a breach when their mean
//! exceeds the 200 ms budget. The budget is observed, never enforced: a
//! breach is a signal to operators, not an interrupt.

use std::collections::VecDeque;

use serde::Serialize;

/// Number of samples retained.
pub const LATENCY_WINDOW: usize = 10;

/// Rolling-average budget in milliseconds.
pub const MAX_LATENCY_MS: f64 = 200.0;

/// Bounded queue of recent processing-time samples.
#[derive(Debug, Clone, Default)]
pub struct LatencyMonitor {
    samples: VecDeque<f64>,
}

/// Snapshot of the monitor for reporting.
#[derive(Debug, Clone, Serialize)]
pub struct LatencyStats {
    /// Mean of the retained samples, 0 when empty.
    pub average: f64,
    /// True when the mean exceeds the budget.
    pub breach: bool,
    /// The retained samples, oldest first.
    pub history: Vec<f64>,
}

impl LatencyMonitor {
    /// Creates an empty monitor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a processing-time sample in milliseconds, evicting the oldest
    /// sample past the window.
    pub fn record(&mut self, ms: f64) {
        self.samples.push_back(ms);
        while self.samples.len() > LATENCY_WINDOW {
            self.samples.pop_front();
        }
    }

    /// Arithmetic mean of the retained samples, or 0 when empty.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn average(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }

    /// True when the rolling average exceeds [`MAX_LATENCY_MS`].
    #[must_use]
    pub fn is_breach(&self) -> bool {
        self.average() > MAX_LATENCY_MS
    }

    /// Snapshot for reporting.
    #[must_use]
    pub fn stats(&self) -> LatencyStats {
        LatencyStats {
            average: self.average(),
            breach: self.is_breach(),
            history: self.samples.iter().copied().collect(),
        }
    }
}
