//! End-to-end decision scenarios: a clean baseline, impossible travel, the
//! blocked-account short-circuit, a coordinated burst, progressive
//! escalation, and ledger tamper detection.
//!
//! All timestamps are fixed epoch milliseconds and the hour-of-day logic is
//! UTC, so every expectation here is exact.

use sentinel_core::engine::SentinelEngine;
use sentinel_core::ledger::ImmutableLedger;
use sentinel_core::model::{
    AccountStatus, ComponentScores, Decision, GeoPoint, KycStatus, NetworkType, ReasonCode,
    Transaction, UserProfile,
};

/// 2024-01-15T10:00:00Z.
const T0: i64 = 1_705_312_800_000;

fn mumbai_profile() -> UserProfile {
    UserProfile {
        user_id: "user_123".to_string(),
        registered_city: "Mumbai".to_string(),
        registered_device_id: "dev_iphone_13_001".to_string(),
        avg_transaction_amount: 2000,
        max_transaction_amount: 50_000,
        daily_transaction_limit: 100_000,
        avg_transactions_per_day: 5,
        kyc_status: KycStatus::Verified,
        risk_category: sentinel_core::model::RiskCategory::Low,
        account_status: AccountStatus::Active,
        usual_login_times: [8, 23],
        last_login: None,
        failed_attempts_last_10_min: 0,
    }
}

fn mumbai_tx(id: &str, amount: u64, timestamp: i64) -> Transaction {
    Transaction {
        transaction_id: id.to_string(),
        user_id: "user_123".to_string(),
        amount,
        timestamp,
        device_id: "dev_iphone_13_001".to_string(),
        ip_address: "203.0.113.7".to_string(),
        location: GeoPoint {
            lat: 19.0760,
            lon: 72.8777,
            city: "Mumbai".to_string(),
        },
        merchant_id: "merchant_001".to_string(),
        merchant_category: None,
        network_type: NetworkType::FourG,
        session_id: "sess-1".to_string(),
    }
}

#[test]
fn baseline_clean_transaction_approves() {
    let mut engine = SentinelEngine::new();
    let result = engine.evaluate(mumbai_tx("tx-1", 1500, T0), &mumbai_profile());

    assert_eq!(result.component_scores, ComponentScores::default());
    assert_eq!(result.final_risk_score, 0);
    assert_eq!(result.decision, Decision::Approve);
    assert_eq!(result.reason_code, ReasonCode::Ok);
    assert!(result.reasoning.is_empty());
}

#[test]
fn impossible_travel_steps_up_with_geo_reason() {
    let mut engine = SentinelEngine::new();
    let profile = mumbai_profile();
    engine.evaluate(mumbai_tx("tx-1", 1500, T0), &profile);

    // Sixty seconds later the same device reports from Delhi, ~1148 km away.
    let mut delhi = mumbai_tx("tx-2", 1500, T0 + 60_000);
    delhi.location = GeoPoint {
        lat: 28.6139,
        lon: 77.2090,
        city: "Delhi".to_string(),
    };
    let result = engine.evaluate(delhi, &profile);

    // City mismatch (+10) and impossible speed (+55), clamped at the geo
    // ceiling.
    assert_eq!(result.component_scores.geo, 65);
    assert_eq!(result.final_risk_score, 65);
    assert_eq!(result.decision, Decision::StepUp);
    assert_eq!(result.reason_code, ReasonCode::GeoImpossible);
    assert!(result
        .reasoning
        .iter()
        .any(|reason| ReasonCode::GeoImpossible.tags(reason)));
}

#[test]
fn blocked_account_short_circuits() {
    let mut engine = SentinelEngine::new();
    let mut profile = mumbai_profile();
    profile.account_status = AccountStatus::Blocked;

    let result = engine.evaluate(mumbai_tx("tx-1", 42, T0), &profile);

    assert_eq!(result.final_risk_score, 100);
    assert_eq!(result.decision, Decision::Block);
    assert_eq!(result.reason_code, ReasonCode::BlockedUser);
    assert_eq!(result.component_scores, ComponentScores::default());
    assert!(
        engine.get_history("user_123").is_empty(),
        "blocked attempts must not enter history"
    );
}

#[test]
fn coordinated_burst_amplifies_and_flags() {
    let mut engine = SentinelEngine::new();

    // Four distinct low-risk users hit the same merchant category for the
    // same amount inside thirty seconds.
    for i in 0..4 {
        let user = format!("user_{i}");
        let mut tx = mumbai_tx(&format!("tx-{i}"), 999, T0 + i * 5000);
        tx.user_id.clone_from(&user);
        tx.device_id = "dev_unknown".to_string();
        tx.location.city = "Unknown".to_string();
        tx.merchant_category = Some("M1".to_string());
        let result = engine.evaluate(tx, &UserProfile::default_for(&user));
        assert!(!result.coordinated_attack);
    }

    // The fifth distinct user completes the cluster.
    let mut fifth = mumbai_tx("tx-5", 999, T0 + 25_000);
    fifth.user_id = "user_4".to_string();
    fifth.device_id = "dev_unknown".to_string();
    fifth.location.city = "Unknown".to_string();
    fifth.merchant_category = Some("M1".to_string());
    let result = engine.evaluate(fifth, &UserProfile::default_for("user_4"));

    assert!(result.coordinated_attack);
    assert!(result
        .reasoning
        .iter()
        .any(|reason| ReasonCode::CoordinatedAttack.tags(reason)));
    // A clean profile contributes no base score, so amplification leaves 0.
    assert_eq!(result.final_risk_score, 0);
    assert_eq!(result.decision, Decision::Approve);
}

#[test]
fn coordinated_burst_blocks_a_risky_participant() {
    let mut engine = SentinelEngine::new();

    for i in 0..4 {
        let user = format!("user_{i}");
        let mut tx = mumbai_tx(&format!("tx-{i}"), 999, T0 + i * 5000);
        tx.user_id.clone_from(&user);
        tx.device_id = "dev_unknown".to_string();
        tx.location.city = "Unknown".to_string();
        tx.merchant_category = Some("M1".to_string());
        engine.evaluate(tx, &UserProfile::default_for(&user));
    }

    // The fifth participant is dormant with failed KYC: 45 + 35 clamps to
    // the behavioral ceiling of 65, then amplifies to floor(65 * 1.25) = 81.
    let mut profile = UserProfile::default_for("user_4");
    profile.account_status = AccountStatus::Dormant;
    profile.kyc_status = KycStatus::Failed;

    let mut fifth = mumbai_tx("tx-5", 999, T0 + 25_000);
    fifth.user_id = "user_4".to_string();
    fifth.device_id = "dev_unknown".to_string();
    fifth.location.city = "Unknown".to_string();
    fifth.merchant_category = Some("M1".to_string());
    let result = engine.evaluate(fifth, &profile);

    assert!(result.coordinated_attack);
    assert_eq!(result.component_scores.behavioral, 65);
    assert_eq!(result.final_risk_score, 81);
    assert_eq!(result.decision, Decision::Block);
    assert_eq!(result.reason_code, ReasonCode::CoordinatedAttack);
}

#[test]
fn repeated_step_ups_escalate_to_a_forced_block() {
    let mut engine = SentinelEngine::new();
    let mut profile = mumbai_profile();
    profile.daily_transaction_limit = 20_000;

    // Three over-the-daily-limit transactions, each scoring 45: step-ups.
    for i in 0..3 {
        let result = engine.evaluate(
            mumbai_tx(&format!("tx-{i}"), 25_000, T0 + i * 60_000),
            &profile,
        );
        assert_eq!(result.final_risk_score, 45);
        assert_eq!(result.decision, Decision::StepUp);
        assert!(!result.escalation_override);
    }

    // The fourth lands at 65 (over daily limit +45, VPN +20): with three
    // step-ups inside fifteen minutes the decision escalates to a block and
    // the score is raised to the block threshold.
    let mut fourth = mumbai_tx("tx-3", 25_000, T0 + 180_000);
    fourth.network_type = NetworkType::Vpn;
    let result = engine.evaluate(fourth, &profile);

    assert!(result.escalation_override);
    assert_eq!(result.decision, Decision::Block);
    assert_eq!(result.reason_code, ReasonCode::EscalationOverride);
    assert!(result.final_risk_score >= 70);
    assert!(result
        .reasoning
        .iter()
        .any(|reason| ReasonCode::EscalationOverride.tags(reason)));

    // The block cleared the slate: the same mid-band score steps up again.
    let mut fifth = mumbai_tx("tx-4", 25_000, T0 + 240_000);
    fifth.network_type = NetworkType::Vpn;
    let result = engine.evaluate(fifth, &profile);
    assert_eq!(result.decision, Decision::StepUp);
    assert!(!result.escalation_override);
}

#[test]
fn tampered_ledger_is_detected_and_refused() {
    let mut engine = SentinelEngine::new();
    let mut ledger = ImmutableLedger::new();
    let profile = mumbai_profile();

    for i in 0..3 {
        let result = engine.evaluate(
            mumbai_tx(&format!("tx-{i}"), 1500, T0 + i * 3_600_000),
            &profile,
        );
        ledger
            .verify_and_append(&result)
            .expect("intact chain accepts appends");
    }
    assert_eq!(ledger.len(), 4);
    assert!(ledger.verify_integrity());

    // Tamper with an entry in an exported copy and reconstruct.
    let mut tampered = ledger.chain().to_vec();
    tampered[1].final_risk_score = 99;
    let mut tampered = ImmutableLedger::from_entries(tampered);

    assert!(!tampered.verify_integrity());
    let next = engine.evaluate(mumbai_tx("tx-next", 1500, T0 + 4 * 3_600_000), &profile);
    let err = tampered
        .verify_and_append(&next)
        .expect_err("broken chain must refuse appends");
    assert!(matches!(
        err,
        sentinel_core::ledger::LedgerError::ChainMismatch { index: 1 }
    ));
    assert_eq!(tampered.len(), 4, "failed append must not mutate the chain");
}

#[test]
fn identical_streams_produce_identical_results() {
    let stream = |engine: &mut SentinelEngine| {
        let mut results = Vec::new();
        let profile = mumbai_profile();
        results.push(engine.evaluate(mumbai_tx("tx-1", 1500, T0), &profile));
        let mut delhi = mumbai_tx("tx-2", 7000, T0 + 60_000);
        delhi.location = GeoPoint {
            lat: 28.6139,
            lon: 77.2090,
            city: "Delhi".to_string(),
        };
        delhi.network_type = NetworkType::Vpn;
        results.push(engine.evaluate(delhi, &profile));
        let mut pending = mumbai_profile();
        pending.kyc_status = KycStatus::Pending;
        results.push(engine.evaluate(mumbai_tx("tx-3", 60_000, T0 + 120_000), &pending));
        results
    };

    let mut first_engine = SentinelEngine::new();
    let mut second_engine = SentinelEngine::new();
    let first = stream(&mut first_engine);
    let second = stream(&mut second_engine);

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(&second) {
        // Identical modulo wall-clock measurements.
        let mut a = a.clone();
        let mut b = b.clone();
        a.processing_time_ms = 0.0;
        b.processing_time_ms = 0.0;
        a.latency_breach = false;
        b.latency_breach = false;
        assert_eq!(a, b);
    }
}
