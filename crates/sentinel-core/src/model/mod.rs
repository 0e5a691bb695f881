//! Wire-visible data model for the risk engine.
//!
//! All closed vocabularies (decision, reason codes, KYC/risk/account status,
//! network type) are sum types with explicit serde renames pinning the wire
//! strings. Downstream systems key off [`ReasonCode`] alone, so its string
//! forms are part of the public contract and must never drift.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The three terminal decisions for a scored transaction.
///
/// `StepUp` signals to downstream that an out-of-band challenge (e.g. OTP)
/// should be issued before the transaction proceeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    /// Allow the transaction.
    Approve,
    /// Challenge the user out-of-band before allowing.
    StepUp,
    /// Reject the transaction.
    Block,
}

impl Decision {
    /// Returns the wire string for this decision.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Approve => "APPROVE",
            Self::StepUp => "STEP_UP",
            Self::Block => "BLOCK",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Machine-readable label attached to every reasoning line and returned as
/// the result's primary reason.
///
/// The set is closed: downstream systems (OTP issuance, case management)
/// dispatch on these strings and nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReasonCode {
    /// Transaction frequency or amount limits exceeded.
    #[serde(rename = "ERR_VELOCITY_LIMIT")]
    VelocityLimit,
    /// Location inconsistent with the user's registered city or physically
    /// impossible travel speed.
    #[serde(rename = "ERR_GEO_IMPOSSIBLE")]
    GeoImpossible,
    /// Behaviour deviates from the user's established profile.
    #[serde(rename = "ERR_BEHAVIORAL_SHIFT")]
    BehavioralShift,
    /// The transaction clusters with a coordinated multi-user burst.
    #[serde(rename = "ERR_COORDINATED_ATTACK")]
    CoordinatedAttack,
    /// Repeated step-ups escalated into a forced block.
    #[serde(rename = "ERR_ESCALATION_OVERRIDE")]
    EscalationOverride,
    /// The audit chain failed verification.
    #[serde(rename = "ERR_CHAIN_MISMATCH")]
    ChainMismatch,
    /// The account is administratively blocked.
    #[serde(rename = "ERR_BLOCKED_USER")]
    BlockedUser,
    /// No risk signal fired.
    #[serde(rename = "OK")]
    Ok,
}

impl ReasonCode {
    /// Returns the wire string for this reason code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::VelocityLimit => "ERR_VELOCITY_LIMIT",
            Self::GeoImpossible => "ERR_GEO_IMPOSSIBLE",
            Self::BehavioralShift => "ERR_BEHAVIORAL_SHIFT",
            Self::CoordinatedAttack => "ERR_COORDINATED_ATTACK",
            Self::EscalationOverride => "ERR_ESCALATION_OVERRIDE",
            Self::ChainMismatch => "ERR_CHAIN_MISMATCH",
            Self::BlockedUser => "ERR_BLOCKED_USER",
            Self::Ok => "OK",
        }
    }

    /// Returns true if `reason` is a reasoning line carrying this code, i.e.
    /// starts with `"CODE: "`-style prefix (`CODE` followed by a colon).
    #[must_use]
    pub fn tags(self, reason: &str) -> bool {
        reason
            .strip_prefix(self.as_str())
            .is_some_and(|rest| rest.starts_with(':'))
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reason codes in descending priority, used to pick the primary code for a
/// result from its reasoning lines.
pub const REASON_PRIORITY: [ReasonCode; 6] = [
    ReasonCode::ChainMismatch,
    ReasonCode::EscalationOverride,
    ReasonCode::CoordinatedAttack,
    ReasonCode::GeoImpossible,
    ReasonCode::VelocityLimit,
    ReasonCode::BehavioralShift,
];

/// Selects the highest-priority reason code present in `reasons`.
///
/// Each reasoning line is prefix-tagged with its code; the first code in
/// [`REASON_PRIORITY`] order that tags any line wins. Returns
/// [`ReasonCode::Ok`] when no line carries a code.
#[must_use]
pub fn primary_reason_code(reasons: &[String]) -> ReasonCode {
    for code in REASON_PRIORITY {
        if reasons.iter().any(|reason| code.tags(reason)) {
            return code;
        }
    }
    ReasonCode::Ok
}

/// Network transport the transaction arrived over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum NetworkType {
    /// Wi-Fi.
    #[serde(rename = "WIFI")]
    Wifi,
    /// Cellular 4G.
    #[serde(rename = "4G")]
    FourG,
    /// Cellular 5G.
    #[serde(rename = "5G")]
    FiveG,
    /// A VPN exit.
    #[serde(rename = "VPN")]
    Vpn,
    /// Transport could not be classified.
    #[serde(rename = "UNKNOWN")]
    #[default]
    Unknown,
}

/// KYC verification state of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KycStatus {
    /// Identity verified.
    #[default]
    Verified,
    /// Verification in progress.
    Pending,
    /// Verification failed.
    Failed,
}

/// Operator-assigned risk tier for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskCategory {
    /// Normal user.
    #[default]
    Low,
    /// Elevated scrutiny; scores are multiplied by 1.1.
    Medium,
    /// High scrutiny; scores are multiplied by 1.2.
    High,
}

/// Administrative state of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    /// Account in normal use.
    #[default]
    Active,
    /// No recent activity; sudden use is a risk signal.
    Dormant,
    /// Administratively blocked; every transaction is rejected outright.
    Blocked,
}

/// A geographic point with its reported city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
    /// Reported city name.
    pub city: String,
}

/// A single payment transaction entering the engine.
///
/// Transactions are immutable inputs; after evaluation each is retained in
/// the engine's bounded rolling history (except for blocked accounts) and
/// evicted FIFO past the cap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Opaque transaction identifier.
    pub transaction_id: String,
    /// The paying user.
    pub user_id: String,
    /// Amount in whole rupees.
    pub amount: u64,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Originating device identifier.
    pub device_id: String,
    /// Originating IP address.
    pub ip_address: String,
    /// Reported location.
    pub location: GeoPoint,
    /// Receiving merchant.
    pub merchant_id: String,
    /// Merchant category; falls back to `merchant_id` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_category: Option<String>,
    /// Network transport.
    pub network_type: NetworkType,
    /// Client session identifier.
    pub session_id: String,
}

impl Transaction {
    /// Returns the merchant category, defaulting to the merchant id when the
    /// category is absent.
    #[must_use]
    pub fn merchant_category(&self) -> &str {
        self.merchant_category.as_deref().unwrap_or(&self.merchant_id)
    }
}

/// A user profile, read from the external profile store per evaluation and
/// treated as immutable for the duration of one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// The user this profile belongs to.
    pub user_id: String,
    /// City the user registered from.
    pub registered_city: String,
    /// Device the user registered with.
    pub registered_device_id: String,
    /// Average transaction amount in rupees.
    pub avg_transaction_amount: u64,
    /// Hard per-transaction ceiling in rupees.
    pub max_transaction_amount: u64,
    /// Daily spend limit in rupees.
    pub daily_transaction_limit: u64,
    /// Average transactions per day.
    pub avg_transactions_per_day: u32,
    /// KYC verification state.
    pub kyc_status: KycStatus,
    /// Operator-assigned risk tier.
    pub risk_category: RiskCategory,
    /// Administrative account state.
    pub account_status: AccountStatus,
    /// Inclusive `[start, end]` hour pair (0-23) of the user's usual login
    /// window.
    pub usual_login_times: [u32; 2],
    /// Last login, milliseconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<i64>,
    /// Failed authentication attempts in the last ten minutes.
    pub failed_attempts_last_10_min: u32,
}

impl UserProfile {
    /// Builds a profile carrying the documented ingest defaults for every
    /// optional column.
    #[must_use]
    pub fn default_for(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            registered_city: "Unknown".to_string(),
            registered_device_id: "dev_unknown".to_string(),
            avg_transaction_amount: 1000,
            max_transaction_amount: 50_000,
            daily_transaction_limit: 100_000,
            avg_transactions_per_day: 5,
            kyc_status: KycStatus::Verified,
            risk_category: RiskCategory::Low,
            account_status: AccountStatus::Active,
            usual_login_times: [8, 22],
            last_login: None,
            failed_attempts_last_10_min: 0,
        }
    }
}

/// Per-evaluator clamped scores, reported alongside the final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ComponentScores {
    /// Geo evaluator score (ceiling 65).
    pub geo: u32,
    /// Velocity evaluator score (ceiling 65).
    pub velocity: u32,
    /// Device evaluator score (ceiling 55).
    pub device: u32,
    /// Amount evaluator score (ceiling 75).
    pub amount: u32,
    /// Network evaluator score (ceiling 30).
    pub network: u32,
    /// Behavioral evaluator score (ceiling 65).
    pub behavioral: u32,
}

impl ComponentScores {
    /// Sum of all six component scores, before multipliers and clamping.
    #[must_use]
    pub const fn total(self) -> u32 {
        self.geo + self.velocity + self.device + self.amount + self.network + self.behavioral
    }
}

/// The outcome of evaluating one transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalRiskResult {
    /// Identifier of the evaluated transaction.
    pub transaction_id: String,
    /// The paying user.
    pub user_id: String,
    /// Amount in whole rupees.
    pub amount: u64,
    /// Transaction timestamp, milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Final risk score, always within `[0, 100]`.
    pub final_risk_score: u32,
    /// Per-evaluator clamped scores.
    pub component_scores: ComponentScores,
    /// Terminal decision.
    pub decision: Decision,
    /// Ordered human-readable reasoning lines, each prefixed by its code.
    pub reasoning: Vec<String>,
    /// The single primary machine-readable reason.
    pub reason_code: ReasonCode,
    /// Wall time spent evaluating, in milliseconds.
    pub processing_time_ms: f64,
    /// True if the rolling average processing time exceeds the budget.
    pub latency_breach: bool,
    /// True if the transaction clustered with a coordinated burst.
    pub coordinated_attack: bool,
    /// True if repeated step-ups escalated this decision into a block.
    pub escalation_override: bool,
}
