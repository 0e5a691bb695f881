//! The sentinel aggregator: context assembly, combination, and the decision
//! state machine.
//!
//! [`SentinelEngine`] owns all cross-transaction state (rolling history, the
//! coordination detector, the escalation tracker, and the latency monitor)
//! and evaluates transactions strictly in submission order. Every evaluation
//! runs to completion before the next begins, so all state mutations are
//! serialized; a multi-threaded host must confine an engine to one thread or
//! wrap it in a single mutex.
//!
//! # Evaluation protocol
//!
//! 1. Blocked accounts short-circuit to a score-100 block (the attempt is not
//!    added to history; whether blocked attempts should feed later velocity
//!    windows is an open product question).
//! 2. Context is assembled from the user's retained history: last
//!    transaction, ten-minute velocity window, five-minute device set.
//! 3. The six evaluators run; their clamped scores are summed and the
//!    behavioral multiplier is applied (floored).
//! 4. The coordination detector records then detects; a cluster amplifies
//!    the base score by 1.25 (floored).
//! 5. The final score is clamped to `[0, 100]` and mapped to a decision,
//!    with the escalation override and the secondary pre-OTP check applied
//!    in the step-up band.
//! 6. Trackers, history, and the latency monitor are updated.

use std::collections::{HashSet, VecDeque};
use std::time::Instant;

use tracing::{debug, warn};

use crate::coord::{CoordinationDetector, COORD_MULTIPLIER};
use crate::escalation::EscalationTracker;
use crate::evaluators::device::DEVICE_WINDOW_MS;
use crate::evaluators::velocity::VELOCITY_WINDOW_MS;
use crate::evaluators::{amount, behavior, device, geo, network, velocity};
use crate::latency::{LatencyMonitor, LatencyStats};
use crate::model::{
    primary_reason_code, AccountStatus, ComponentScores, Decision, FinalRiskResult, ReasonCode,
    Transaction, UserProfile,
};

/// Scores below this approve outright.
pub const THRESHOLD_PASS: u32 = 40;

/// Scores at or above this block outright.
pub const THRESHOLD_BLOCK: u32 = 70;

/// Global cap on retained history across all users.
pub const HISTORY_CAP: usize = 1000;

/// Score assigned to transactions on administratively blocked accounts.
const BLOCKED_ACCOUNT_SCORE: u32 = 100;

/// Ten-minute transaction count above which the secondary pre-OTP check
/// refuses to step up.
const SECONDARY_VELOCITY_LIMIT: usize = 8;

/// Five-minute distinct-device count above which the secondary pre-OTP check
/// refuses to step up.
const SECONDARY_DEVICE_LIMIT: usize = 2;

/// Context distilled from the user's retained history, reduced to the plain
/// values the decision logic needs after the evaluators have run.
struct EvaluationContext {
    components: ComponentScores,
    reasoning: Vec<String>,
    multiplier: f64,
    window_count_10m: usize,
    recent_device_count: usize,
}

/// The risk-scoring engine.
#[derive(Debug, Default)]
pub struct SentinelEngine {
    history: VecDeque<Transaction>,
    coord: CoordinationDetector,
    escalation: EscalationTracker,
    latency: LatencyMonitor,
}

impl SentinelEngine {
    /// Creates an engine with empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluates one transaction against its user profile, returning the
    /// decision record and updating all cross-transaction state.
    pub fn evaluate(&mut self, tx: Transaction, profile: &UserProfile) -> FinalRiskResult {
        let started = Instant::now();

        if profile.account_status == AccountStatus::Blocked {
            let reasoning = vec![format!(
                "{}: account {} is blocked",
                ReasonCode::BlockedUser,
                tx.user_id
            )];
            debug!(
                transaction_id = %tx.transaction_id,
                user_id = %tx.user_id,
                "blocked account short-circuit"
            );
            return self.finish(
                Outcome {
                    tx: &tx,
                    final_score: BLOCKED_ACCOUNT_SCORE,
                    components: ComponentScores::default(),
                    decision: Decision::Block,
                    reason_code: ReasonCode::BlockedUser,
                    reasoning,
                    coordinated: false,
                    escalation_override: false,
                    // Blocked attempts are kept out of history; see module docs.
                    record_history: false,
                },
                started,
            );
        }

        let ctx = self.assemble_and_score(&tx, profile);
        let EvaluationContext {
            components,
            mut reasoning,
            multiplier,
            window_count_10m,
            recent_device_count,
        } = ctx;

        let mut base_score = components.total();
        if multiplier > 1.0 {
            base_score = scale_floor(base_score, multiplier);
        }

        self.coord.record(&tx);
        let coordinated = self.coord.detect(&tx);
        if coordinated {
            base_score = scale_floor(base_score, COORD_MULTIPLIER);
            reasoning.push(format!(
                "{}: amount cluster across distinct users at merchant category {}",
                ReasonCode::CoordinatedAttack,
                tx.merchant_category()
            ));
        }

        let mut final_score = base_score.min(100);
        let mut escalation_override = false;

        let (decision, reason_code) = if final_score >= THRESHOLD_BLOCK {
            let code = if coordinated {
                ReasonCode::CoordinatedAttack
            } else {
                primary_reason_code(&reasoning)
            };
            (Decision::Block, code)
        } else if final_score >= THRESHOLD_PASS {
            if self
                .escalation
                .should_force_block(&tx.user_id, final_score, tx.timestamp)
            {
                escalation_override = true;
                final_score = final_score.max(THRESHOLD_BLOCK);
                reasoning.push(format!(
                    "{}: repeated step-ups within 15 minutes escalated to a block",
                    ReasonCode::EscalationOverride
                ));
                (Decision::Block, ReasonCode::EscalationOverride)
            } else {
                let velocity_fail = window_count_10m > SECONDARY_VELOCITY_LIMIT;
                let device_fail = recent_device_count > SECONDARY_DEVICE_LIMIT;
                let coord_fail = self.coord.detect(&tx);
                let esc_fail =
                    self.escalation
                        .should_force_block(&tx.user_id, THRESHOLD_BLOCK, tx.timestamp);
                let code = primary_reason_code(&reasoning);
                if velocity_fail || device_fail || coord_fail || esc_fail {
                    (Decision::Block, code)
                } else {
                    (Decision::StepUp, code)
                }
            }
        } else {
            (Decision::Approve, ReasonCode::Ok)
        };

        match decision {
            Decision::StepUp => self.escalation.record_step_up(&tx.user_id, tx.timestamp),
            Decision::Block => self.escalation.record_block(&tx.user_id),
            Decision::Approve => {},
        }

        self.finish(
            Outcome {
                tx: &tx,
                final_score,
                components,
                decision,
                reason_code,
                reasoning,
                coordinated,
                escalation_override,
                record_history: true,
            },
            started,
        )
    }

    /// Retained transactions for one user, in insertion order.
    #[must_use]
    pub fn get_history(&self, user_id: &str) -> Vec<Transaction> {
        self.history
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Snapshot of the rolling latency monitor.
    #[must_use]
    pub fn latency_stats(&self) -> LatencyStats {
        self.latency.stats()
    }

    /// Assembles per-user context and runs the six evaluators, returning only
    /// plain values so the borrow of `self.history` ends here.
    fn assemble_and_score(&self, tx: &Transaction, profile: &UserProfile) -> EvaluationContext {
        let user_history: Vec<&Transaction> = self
            .history
            .iter()
            .filter(|t| t.user_id == tx.user_id)
            .collect();
        let last_tx = user_history.last().copied();

        let device_cutoff = tx.timestamp - DEVICE_WINDOW_MS;
        let mut recent_devices: HashSet<&str> = user_history
            .iter()
            .filter(|t| t.timestamp > device_cutoff)
            .map(|t| t.device_id.as_str())
            .collect();
        recent_devices.insert(tx.device_id.as_str());

        let velocity_cutoff = tx.timestamp - VELOCITY_WINDOW_MS;
        let window_count_10m = user_history
            .iter()
            .filter(|t| t.timestamp > velocity_cutoff)
            .count();

        let geo_signal = geo::evaluate(tx, profile, last_tx);
        let velocity_signal = velocity::evaluate(tx, profile, &user_history);
        let device_signal = device::evaluate(tx, profile, &recent_devices);
        let amount_signal = amount::evaluate(tx, profile);
        let network_signal = network::evaluate(tx);
        let behavior_signal = behavior::evaluate(tx, profile);

        let components = ComponentScores {
            geo: geo_signal.score,
            velocity: velocity_signal.score,
            device: device_signal.score,
            amount: amount_signal.score,
            network: network_signal.score,
            behavioral: behavior_signal.score,
        };

        let mut reasoning = Vec::new();
        reasoning.extend(geo_signal.reasons);
        reasoning.extend(velocity_signal.reasons);
        reasoning.extend(device_signal.reasons);
        reasoning.extend(amount_signal.reasons);
        reasoning.extend(network_signal.reasons);
        reasoning.extend(behavior_signal.reasons);

        EvaluationContext {
            components,
            reasoning,
            multiplier: behavior_signal.multiplier,
            window_count_10m,
            recent_device_count: recent_devices.len(),
        }
    }

    /// Builds the result record, updates history and the latency monitor,
    /// and emits the decision trace.
    fn finish(&mut self, outcome: Outcome<'_>, started: Instant) -> FinalRiskResult {
        let Outcome {
            tx,
            final_score,
            components,
            decision,
            reason_code,
            reasoning,
            coordinated,
            escalation_override,
            record_history,
        } = outcome;

        if record_history {
            self.history.push_back(tx.clone());
            while self.history.len() > HISTORY_CAP {
                self.history.pop_front();
            }
        }

        let processing_time_ms = started.elapsed().as_secs_f64() * 1000.0;
        self.latency.record(processing_time_ms);
        let latency_breach = self.latency.is_breach();
        if latency_breach {
            warn!(
                average_ms = self.latency.average(),
                "rolling latency budget exceeded"
            );
        }

        debug!(
            transaction_id = %tx.transaction_id,
            user_id = %tx.user_id,
            score = final_score,
            decision = %decision,
            reason = %reason_code,
            "transaction scored"
        );

        FinalRiskResult {
            transaction_id: tx.transaction_id.clone(),
            user_id: tx.user_id.clone(),
            amount: tx.amount,
            timestamp: tx.timestamp,
            final_risk_score: final_score,
            component_scores: components,
            decision,
            reasoning,
            reason_code,
            processing_time_ms,
            latency_breach,
            coordinated_attack: coordinated,
            escalation_override,
        }
    }
}

/// A fully decided evaluation, ready to be recorded.
struct Outcome<'a> {
    tx: &'a Transaction,
    final_score: u32,
    components: ComponentScores,
    decision: Decision,
    reason_code: ReasonCode,
    reasoning: Vec<String>,
    coordinated: bool,
    escalation_override: bool,
    record_history: bool,
}

/// Multiplies a score by a factor and floors the result.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scale_floor(score: u32, factor: f64) -> u32 {
    (f64::from(score) * factor).floor() as u32
}
