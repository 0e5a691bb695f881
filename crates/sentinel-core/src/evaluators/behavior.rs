//! Behavioral risk: unusual hours, dormancy, KYC state, and the
//! risk-category multiplier.

use chrono::{DateTime, Timelike};

use super::RiskSignal;
use crate::model::{AccountStatus, KycStatus, ReasonCode, RiskCategory, Transaction, UserProfile};

/// Ceiling for the behavioral component score.
pub const BEHAVIOR_CEILING: u32 = 65;

/// Multiplier applied to the summed base score for high-risk users.
pub const HIGH_RISK_MULTIPLIER: f64 = 1.2;

/// Multiplier applied to the summed base score for medium-risk users.
pub const MEDIUM_RISK_MULTIPLIER: f64 = 1.1;

const UNUSUAL_HOUR_POINTS: u32 = 10;
const DORMANT_POINTS: u32 = 45;
const KYC_FAILED_POINTS: u32 = 35;
const KYC_PENDING_POINTS: u32 = 10;

/// Scores a transaction against the user's behavioral profile and yields the
/// risk-category multiplier the aggregator applies to the summed base score.
///
/// The hour-of-day check uses UTC unconditionally so that identical inputs
/// score identically on every host.
#[must_use]
pub fn evaluate(tx: &Transaction, profile: &UserProfile) -> RiskSignal {
    let mut signal = RiskSignal::none();

    if let Some(hour) = utc_hour(tx.timestamp) {
        let [start, end] = profile.usual_login_times;
        if hour < start || hour > end {
            signal.add(
                UNUSUAL_HOUR_POINTS,
                format!(
                    "{}: hour {hour} outside usual login window {start}-{end}",
                    ReasonCode::BehavioralShift
                ),
            );
        }
    }

    if profile.account_status == AccountStatus::Dormant {
        signal.add(
            DORMANT_POINTS,
            format!(
                "{}: transaction on a dormant account",
                ReasonCode::BehavioralShift
            ),
        );
    }

    match profile.kyc_status {
        KycStatus::Failed => signal.add(
            KYC_FAILED_POINTS,
            format!("{}: KYC verification failed", ReasonCode::BehavioralShift),
        ),
        KycStatus::Pending => signal.add(
            KYC_PENDING_POINTS,
            format!("{}: KYC verification pending", ReasonCode::BehavioralShift),
        ),
        KycStatus::Verified => {},
    }

    let mut signal = signal.clamp_to(BEHAVIOR_CEILING);
    signal.multiplier = match profile.risk_category {
        RiskCategory::High => HIGH_RISK_MULTIPLIER,
        RiskCategory::Medium => MEDIUM_RISK_MULTIPLIER,
        RiskCategory::Low => 1.0,
    };
    signal
}

/// UTC hour of day (0-23) for a millisecond epoch timestamp, or `None` if the
/// timestamp is outside the representable range.
fn utc_hour(timestamp_ms: i64) -> Option<u32> {
    DateTime::from_timestamp_millis(timestamp_ms).map(|dt| dt.hour())
}
