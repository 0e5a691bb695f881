//! Property tests for the score bound and the decision mapping.

use proptest::prelude::*;
use sentinel_core::engine::{SentinelEngine, THRESHOLD_BLOCK, THRESHOLD_PASS};
use sentinel_core::model::{
    AccountStatus, Decision, GeoPoint, KycStatus, NetworkType, ReasonCode, RiskCategory,
    Transaction, UserProfile, REASON_PRIORITY,
};

/// 2024-01-15T10:00:00Z.
const T0: i64 = 1_705_312_800_000;

fn arb_network() -> impl Strategy<Value = NetworkType> {
    prop_oneof![
        Just(NetworkType::Wifi),
        Just(NetworkType::FourG),
        Just(NetworkType::FiveG),
        Just(NetworkType::Vpn),
        Just(NetworkType::Unknown),
    ]
}

fn arb_profile() -> impl Strategy<Value = UserProfile> {
    (
        prop_oneof![
            Just(KycStatus::Verified),
            Just(KycStatus::Pending),
            Just(KycStatus::Failed)
        ],
        prop_oneof![
            Just(RiskCategory::Low),
            Just(RiskCategory::Medium),
            Just(RiskCategory::High)
        ],
        prop_oneof![
            Just(AccountStatus::Active),
            Just(AccountStatus::Dormant),
            Just(AccountStatus::Blocked)
        ],
        0_u32..6,
    )
        .prop_map(|(kyc_status, risk_category, account_status, failed)| {
            let mut profile = UserProfile::default_for("user_prop");
            profile.registered_city = "Mumbai".to_string();
            profile.kyc_status = kyc_status;
            profile.risk_category = risk_category;
            profile.account_status = account_status;
            profile.failed_attempts_last_10_min = failed;
            profile
        })
}

#[derive(Debug, Clone)]
struct TxShape {
    amount: u64,
    offset_ms: i64,
    device: u8,
    city: u8,
    network: NetworkType,
}

fn arb_tx_shape() -> impl Strategy<Value = TxShape> {
    (0_u64..200_000, 0_i64..600_000, 0_u8..3, 0_u8..2, arb_network()).prop_map(
        |(amount, offset_ms, device, city, network)| TxShape {
            amount,
            offset_ms,
            device,
            city,
            network,
        },
    )
}

fn build_tx(index: usize, shape: &TxShape) -> Transaction {
    let (city, lat, lon) = if shape.city == 0 {
        ("Mumbai", 19.0760, 72.8777)
    } else {
        ("Delhi", 28.6139, 77.2090)
    };
    Transaction {
        transaction_id: format!("tx-{index}"),
        user_id: "user_prop".to_string(),
        amount: shape.amount,
        timestamp: T0 + shape.offset_ms,
        device_id: format!("dev_{}", shape.device),
        ip_address: "203.0.113.7".to_string(),
        location: GeoPoint {
            lat,
            lon,
            city: city.to_string(),
        },
        merchant_id: "merchant_001".to_string(),
        merchant_category: None,
        network_type: shape.network,
        session_id: "sess-prop".to_string(),
    }
}

proptest! {
    #[test]
    fn score_bounds_and_decision_mapping_hold(
        profile in arb_profile(),
        shapes in prop::collection::vec(arb_tx_shape(), 1..20),
    ) {
        let mut engine = SentinelEngine::new();
        for (i, shape) in shapes.iter().enumerate() {
            let result = engine.evaluate(build_tx(i, shape), &profile);

            prop_assert!(result.final_risk_score <= 100);

            if profile.account_status == AccountStatus::Blocked {
                prop_assert_eq!(result.final_risk_score, 100);
                prop_assert_eq!(result.decision, Decision::Block);
                prop_assert_eq!(result.reason_code, ReasonCode::BlockedUser);
                continue;
            }

            match result.decision {
                Decision::Approve => {
                    prop_assert!(result.final_risk_score < THRESHOLD_PASS);
                    prop_assert_eq!(result.reason_code, ReasonCode::Ok);
                }
                Decision::StepUp => {
                    prop_assert!(result.final_risk_score >= THRESHOLD_PASS);
                    prop_assert!(result.final_risk_score < THRESHOLD_BLOCK);
                }
                Decision::Block => {
                    // Blocks below the block threshold come only from the
                    // secondary check or the escalation override.
                    prop_assert!(result.final_risk_score >= THRESHOLD_PASS);
                    if result.escalation_override {
                        prop_assert!(result.final_risk_score >= THRESHOLD_BLOCK);
                    }
                }
            }

            if result.final_risk_score >= THRESHOLD_BLOCK {
                prop_assert_eq!(result.decision, Decision::Block);
            }

            // Every reasoning line carries a code from the closed set.
            for line in &result.reasoning {
                let tagged = REASON_PRIORITY.iter().any(|code| code.tags(line))
                    || ReasonCode::BlockedUser.tags(line);
                prop_assert!(tagged, "untagged reasoning line: {line}");
            }
        }
    }
}
