//! Amount risk: hard limits and spend spikes, applied as exclusive tiers.

use super::RiskSignal;
use crate::model::{ReasonCode, Transaction, UserProfile};

/// Ceiling for the amount component score.
pub const AMOUNT_CEILING: u32 = 75;

const OVER_MAX_POINTS: u32 = 75;
const OVER_DAILY_POINTS: u32 = 45;
const SPIKE_POINTS: u32 = 20;
const SPIKE_FACTOR: u64 = 3;

/// Scores a transaction's amount against the profile's limits.
///
/// The tiers are exclusive: only the first matching rule fires.
#[must_use]
pub fn evaluate(tx: &Transaction, profile: &UserProfile) -> RiskSignal {
    let mut signal = RiskSignal::none();

    if tx.amount > profile.max_transaction_amount {
        signal.add(
            OVER_MAX_POINTS,
            format!(
                "{}: \u{20b9}{} exceeds max transaction amount \u{20b9}{}",
                ReasonCode::VelocityLimit,
                tx.amount,
                profile.max_transaction_amount
            ),
        );
    } else if tx.amount > profile.daily_transaction_limit {
        signal.add(
            OVER_DAILY_POINTS,
            format!(
                "{}: \u{20b9}{} exceeds daily limit \u{20b9}{}",
                ReasonCode::VelocityLimit,
                tx.amount,
                profile.daily_transaction_limit
            ),
        );
    } else if tx.amount > SPIKE_FACTOR * profile.avg_transaction_amount {
        signal.add(
            SPIKE_POINTS,
            format!(
                "{}: amount spike, \u{20b9}{} over {SPIKE_FACTOR}x average \u{20b9}{}",
                ReasonCode::BehavioralShift,
                tx.amount,
                profile.avg_transaction_amount
            ),
        );
    }

    signal.clamp_to(AMOUNT_CEILING)
}
