//! # sentinel-core
//!
//! Core library for Sentinel - a real-time transaction risk-scoring and audit
//! engine for high-volume payment streams.
//!
//! This crate provides the deterministic decision core: six independent risk
//! evaluators, cross-transaction state (rolling history, coordination
//! detection, progressive escalation, latency monitoring), the score-to-
//! decision state machine, and a tamper-evident hash-chained decision ledger.
//!
//! ## Features
//!
//! - **Scoring pipeline**: Six pure evaluators combined under a documented
//!   weighting, multiplier, and amplification rule set
//! - **Cross-transaction state**: Per-user rolling history, a global
//!   coordination detector, a per-user escalation tracker, and a rolling
//!   latency monitor
//! - **Decision state machine**: Score thresholds with override paths for
//!   blocked accounts, escalation, and coordinated amplification
//! - **Tamper-evident ledger**: A linear hash-chained log of decisions with a
//!   verify-before-append mode
//!
//! All operations are synchronous and bounded; the engine owns all mutable
//! state and is intended to be confined to a single thread (or wrapped in one
//! mutex by a multi-threaded host).
//!
//! ## Example
//!
//! ```rust
//! use sentinel_core::engine::SentinelEngine;
//! use sentinel_core::ledger::ImmutableLedger;
//! use sentinel_core::model::{GeoPoint, NetworkType, Transaction, UserProfile};
//!
//! let mut engine = SentinelEngine::new();
//! let mut ledger = ImmutableLedger::new();
//!
//! let profile = UserProfile::default_for("user_123");
//! let tx = Transaction {
//!     transaction_id: "tx-1".to_string(),
//!     user_id: "user_123".to_string(),
//!     amount: 900,
//!     timestamp: 1_705_312_800_000,
//!     device_id: "dev_unknown".to_string(),
//!     ip_address: "10.0.0.1".to_string(),
//!     location: GeoPoint {
//!         lat: 19.0760,
//!         lon: 72.8777,
//!         city: "Unknown".to_string(),
//!     },
//!     merchant_id: "merchant_001".to_string(),
//!     merchant_category: None,
//!     network_type: NetworkType::FourG,
//!     session_id: "sess-1".to_string(),
//! };
//!
//! let result = engine.evaluate(tx, &profile);
//! let entry = ledger.verify_and_append(&result).expect("fresh chain verifies");
//! assert_eq!(entry.index, 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod canonical;
pub mod coord;
pub mod engine;
pub mod escalation;
pub mod evaluators;
pub mod hash;
pub mod latency;
pub mod ledger;
pub mod model;

/// Re-export commonly used types at the crate root.
pub use engine::SentinelEngine;
pub use ledger::{ImmutableLedger, LedgerEntry, LedgerError};
pub use model::{
    ComponentScores, Decision, FinalRiskResult, ReasonCode, Transaction, UserProfile,
};
