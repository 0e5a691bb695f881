//! Velocity risk: burst frequency, one-rupee spam, and failed attempts.

use super::RiskSignal;
use crate::model::{ReasonCode, Transaction, UserProfile};

/// Ceiling for the velocity component score.
pub const VELOCITY_CEILING: u32 = 65;

/// Look-back window for the user's recent transactions.
pub const VELOCITY_WINDOW_MS: i64 = 600_000;

const BURST_LIMIT: usize = 5;
const BURST_POINTS: u32 = 30;
const ONE_RUPEE_LIMIT: usize = 3;
const ONE_RUPEE_POINTS: u32 = 30;
const FAILED_ATTEMPTS_LIMIT: u32 = 3;
const FAILED_ATTEMPTS_POINTS: u32 = 35;

/// Scores a transaction against the user's ten-minute history window and the
/// profile's recent failed-attempt counter.
///
/// `history` is the user's retained transactions in insertion order, not
/// including the transaction under evaluation.
#[must_use]
pub fn evaluate(tx: &Transaction, profile: &UserProfile, history: &[&Transaction]) -> RiskSignal {
    let mut signal = RiskSignal::none();
    let cutoff = tx.timestamp - VELOCITY_WINDOW_MS;
    let window: Vec<&&Transaction> = history.iter().filter(|t| t.timestamp > cutoff).collect();

    if window.len() > BURST_LIMIT {
        signal.add(
            BURST_POINTS,
            format!(
                "{}: {} transactions in the last 10 minutes",
                ReasonCode::VelocityLimit,
                window.len()
            ),
        );
    }

    if tx.amount == 1 {
        let one_rupee = window.iter().filter(|t| t.amount == 1).count();
        if one_rupee > ONE_RUPEE_LIMIT {
            signal.add(
                ONE_RUPEE_POINTS,
                format!(
                    "{}: \u{20b9}1 spam burst, {one_rupee} one-rupee transactions in 10 minutes",
                    ReasonCode::VelocityLimit
                ),
            );
        }
    }

    if profile.failed_attempts_last_10_min > FAILED_ATTEMPTS_LIMIT {
        signal.add(
            FAILED_ATTEMPTS_POINTS,
            format!(
                "{}: {} failed attempts in the last 10 minutes",
                ReasonCode::VelocityLimit,
                profile.failed_attempts_last_10_min
            ),
        );
    }

    signal.clamp_to(VELOCITY_CEILING)
}
