//! Network risk: VPN exits and unclassified transports.

use super::RiskSignal;
use crate::model::{NetworkType, ReasonCode, Transaction};

/// Ceiling for the network component score.
pub const NETWORK_CEILING: u32 = 30;

const VPN_POINTS: u32 = 20;
const UNKNOWN_POINTS: u32 = 10;

/// Scores the transaction's network transport.
#[must_use]
pub fn evaluate(tx: &Transaction) -> RiskSignal {
    let mut signal = RiskSignal::none();

    match tx.network_type {
        NetworkType::Vpn => signal.add(
            VPN_POINTS,
            format!("{}: transaction arrived over a VPN", ReasonCode::BehavioralShift),
        ),
        NetworkType::Unknown => signal.add(
            UNKNOWN_POINTS,
            format!(
                "{}: network transport could not be classified",
                ReasonCode::BehavioralShift
            ),
        ),
        NetworkType::Wifi | NetworkType::FourG | NetworkType::FiveG => {},
    }

    signal.clamp_to(NETWORK_CEILING)
}
