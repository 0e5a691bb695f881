//! Coordinated-attack detection over a global short window.
//!
//! The detector keeps an insertion-ordered buffer of recent events across all
//! users, hard-capped to bound memory. A transaction clusters with a
//! coordinated burst when at least [`COORD_MIN_USERS`] distinct users hit the
//! same merchant category with near-identical amounts inside the two-minute
//! window.
//!
//! Callers record before detecting, so the transaction under evaluation
//! counts toward its own cluster.

use std::collections::{HashSet, VecDeque};

use crate::model::Transaction;

/// Cluster look-back window in milliseconds.
pub const COORD_WINDOW_MS: i64 = 120_000;

/// Minimum distinct users for a cluster.
pub const COORD_MIN_USERS: usize = 5;

/// Inclusive amount tolerance around the probe amount.
pub const COORD_AMOUNT_VARIANCE: f64 = 0.05;

/// Score amplification applied by the aggregator when a cluster fires.
pub const COORD_MULTIPLIER: f64 = 1.25;

/// Hard cap on retained events.
pub const COORD_EVENT_CAP: usize = 5000;

/// One recorded transaction, reduced to the fields the cluster query needs.
#[derive(Debug, Clone)]
struct CoordEvent {
    user_id: String,
    merchant_category: String,
    amount: u64,
    timestamp: i64,
}

/// Global short-window event buffer with a cluster query.
#[derive(Debug, Clone, Default)]
pub struct CoordinationDetector {
    events: VecDeque<CoordEvent>,
}

impl CoordinationDetector {
    /// Creates an empty detector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a transaction: prunes events that fell out of the window
    /// relative to the transaction's timestamp, appends the new event, and
    /// enforces the hard cap by evicting the oldest events.
    pub fn record(&mut self, tx: &Transaction) {
        let cutoff = tx.timestamp - COORD_WINDOW_MS;
        self.events.retain(|event| event.timestamp > cutoff);
        self.events.push_back(CoordEvent {
            user_id: tx.user_id.clone(),
            merchant_category: tx.merchant_category().to_string(),
            amount: tx.amount,
            timestamp: tx.timestamp,
        });
        while self.events.len() > COORD_EVENT_CAP {
            self.events.pop_front();
        }
    }

    /// Returns true when the probe transaction clusters with at least
    /// [`COORD_MIN_USERS`] distinct users on the same merchant category with
    /// amounts within the inclusive tolerance band, inside the window.
    ///
    /// The window filter is re-applied here so the query stays correct even
    /// when called without a preceding [`record`](Self::record).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn detect(&self, tx: &Transaction) -> bool {
        let cutoff = tx.timestamp - COORD_WINDOW_MS;
        let category = tx.merchant_category();
        let low = tx.amount as f64 * (1.0 - COORD_AMOUNT_VARIANCE);
        let high = tx.amount as f64 * (1.0 + COORD_AMOUNT_VARIANCE);

        let cluster_users: HashSet<&str> = self
            .events
            .iter()
            .filter(|event| {
                event.timestamp > cutoff
                    && event.merchant_category == category
                    && (event.amount as f64) >= low
                    && (event.amount as f64) <= high
            })
            .map(|event| event.user_id.as_str())
            .collect();

        cluster_users.len() >= COORD_MIN_USERS
    }

    /// Number of retained events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True when no events are retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
