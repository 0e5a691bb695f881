//! Device risk: unregistered devices and rapid device switching.

use std::collections::HashSet;

use super::RiskSignal;
use crate::model::{ReasonCode, Transaction, UserProfile};

/// Ceiling for the device component score.
pub const DEVICE_CEILING: u32 = 55;

/// Look-back window for the set of recently seen devices.
pub const DEVICE_WINDOW_MS: i64 = 300_000;

const UNREGISTERED_POINTS: u32 = 25;
const MULTI_DEVICE_POINTS: u32 = 30;

/// Scores a transaction's device against the registered device and the set of
/// distinct devices the user has used in the last five minutes.
///
/// `recent_devices` is assembled by the aggregator and always includes the
/// current transaction's device.
#[must_use]
pub fn evaluate(
    tx: &Transaction,
    profile: &UserProfile,
    recent_devices: &HashSet<&str>,
) -> RiskSignal {
    let mut signal = RiskSignal::none();

    if tx.device_id != profile.registered_device_id {
        signal.add(
            UNREGISTERED_POINTS,
            format!(
                "{}: device {} is not the registered device {}",
                ReasonCode::BehavioralShift,
                tx.device_id,
                profile.registered_device_id
            ),
        );
    }

    if recent_devices.len() > 1 {
        signal.add(
            MULTI_DEVICE_POINTS,
            format!(
                "{}: {} distinct devices in the last 5 minutes",
                ReasonCode::BehavioralShift,
                recent_devices.len()
            ),
        );
    }

    signal.clamp_to(DEVICE_CEILING)
}
