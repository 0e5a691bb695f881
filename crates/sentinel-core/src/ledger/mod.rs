//! Tamper-evident decision ledger.
//!
//! The ledger is a single-writer, append-only linear hash chain. Every entry
//! binds its position, its predecessor's hash, the transaction id, and the
//! final score into `current_hash`; mutating any of those fields in any
//! earlier entry breaks verification from that point on.
//!
//! # Chain invariants
//!
//! - `entry[i].previous_hash == entry[i-1].current_hash` for every `i > 0`
//! - `entry[i].current_hash == H(index ‖ previous_hash ‖ transaction_id ‖
//!   final_risk_score)` where `‖` is string concatenation
//! - `entry[i].data_hash == H(canonical_json(result))`, an integrity
//!   side-channel over the full result body; it is deliberately not folded
//!   into `current_hash` (folding it in would change every chain hash and
//!   requires a versioned format bump)
//!
//! A fresh ledger initializes with a genesis entry at index 0 carrying
//! sentinel values, so the chain is never empty.
//!
//! # Append modes
//!
//! - [`ImmutableLedger::append`]: trusts the in-memory chain and links the
//!   next entry. Infallible.
//! - [`ImmutableLedger::verify_and_append`]: re-verifies the whole chain
//!   first and refuses to append to a broken one, without mutating anything.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::canonical::canonical_json;
use crate::hash::sha256_hex;
use crate::model::FinalRiskResult;

/// `previous_hash` sentinel of the genesis entry.
pub const GENESIS_PREVIOUS_HASH: &str = "0";

/// `transaction_id` sentinel of the genesis entry.
pub const GENESIS_TRANSACTION_ID: &str = "00000000-0000-0000-0000-000000000000";

/// `decision` sentinel of the genesis entry.
pub const GENESIS_DECISION: &str = "GENESIS";

/// `data_hash` sentinel of the genesis entry.
pub const GENESIS_DATA_HASH: &str = "0";

/// One link of the decision chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Zero-based, contiguous position in the chain.
    pub index: u64,
    /// Identifier of the recorded transaction (sentinel at index 0).
    pub transaction_id: String,
    /// Ingestion time in milliseconds since the Unix epoch (not the
    /// transaction's own timestamp).
    pub timestamp: i64,
    /// Final risk score of the recorded decision.
    pub final_risk_score: u32,
    /// Decision wire string; `"GENESIS"` only at index 0.
    pub decision: String,
    /// `current_hash` of the predecessor entry.
    pub previous_hash: String,
    /// Hash binding this entry to its position and predecessor.
    pub current_hash: String,
    /// Hash of the canonical serialization of the full result body.
    pub data_hash: String,
}

/// Errors surfaced by the defensive append path.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LedgerError {
    /// The chain failed verification; nothing was appended.
    #[error("ERR_CHAIN_MISMATCH: hash chain broken at entry {index}")]
    ChainMismatch {
        /// Index of the first entry that failed verification.
        index: u64,
    },
}

/// A single-writer, append-only hash-chained decision log.
#[derive(Debug, Clone)]
pub struct ImmutableLedger {
    chain: Vec<LedgerEntry>,
}

impl Default for ImmutableLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl ImmutableLedger {
    /// Creates a ledger holding only the genesis entry.
    #[must_use]
    pub fn new() -> Self {
        let genesis = LedgerEntry {
            index: 0,
            transaction_id: GENESIS_TRANSACTION_ID.to_string(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            final_risk_score: 0,
            decision: GENESIS_DECISION.to_string(),
            previous_hash: GENESIS_PREVIOUS_HASH.to_string(),
            current_hash: chain_hash(0, GENESIS_PREVIOUS_HASH, GENESIS_DECISION, 0),
            data_hash: GENESIS_DATA_HASH.to_string(),
        };
        Self {
            chain: vec![genesis],
        }
    }

    /// Reconstructs a ledger from an exported chain, e.g. for offline
    /// re-verification. The entries are taken as-is; call
    /// [`verify_integrity`](Self::verify_integrity) to check them.
    #[must_use]
    pub fn from_entries(entries: Vec<LedgerEntry>) -> Self {
        Self { chain: entries }
    }

    /// Appends a decision, linking it to the current chain tip.
    pub fn append(&mut self, result: &FinalRiskResult) -> &LedgerEntry {
        let index = self.chain.len() as u64;
        let previous_hash = self.latest_hash().to_string();
        let entry = LedgerEntry {
            index,
            transaction_id: result.transaction_id.clone(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            final_risk_score: result.final_risk_score,
            decision: result.decision.as_str().to_string(),
            current_hash: chain_hash(
                index,
                &previous_hash,
                &result.transaction_id,
                result.final_risk_score,
            ),
            previous_hash,
            data_hash: sha256_hex(canonical_json(result)),
        };
        debug!(
            index,
            transaction_id = %entry.transaction_id,
            decision = %entry.decision,
            "ledger entry appended"
        );
        self.chain.push(entry);
        self.chain.last().expect("chain is never empty after push")
    }

    /// Walks the chain and checks both hash invariants, returning false on
    /// the first mismatch.
    #[must_use]
    pub fn verify_integrity(&self) -> bool {
        self.first_mismatch().is_none()
    }

    /// Verifies the chain and appends only if it is intact.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::ChainMismatch`] without mutating the chain when
    /// verification fails.
    pub fn verify_and_append(
        &mut self,
        result: &FinalRiskResult,
    ) -> Result<&LedgerEntry, LedgerError> {
        if let Some(index) = self.first_mismatch() {
            warn!(index, "refusing to append to a broken chain");
            return Err(LedgerError::ChainMismatch { index });
        }
        Ok(self.append(result))
    }

    /// Hash of the chain tip.
    #[must_use]
    pub fn latest_hash(&self) -> &str {
        &self
            .chain
            .last()
            .expect("ledger always contains the genesis entry")
            .current_hash
    }

    /// Read-only view of the chain.
    #[must_use]
    pub fn chain(&self) -> &[LedgerEntry] {
        &self.chain
    }

    /// Number of entries, including genesis.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// True when the ledger holds no entries at all (only possible for a
    /// reconstructed chain).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Index of the first entry violating a chain invariant, if any.
    fn first_mismatch(&self) -> Option<u64> {
        for i in 1..self.chain.len() {
            let entry = &self.chain[i];
            let previous = &self.chain[i - 1];
            if entry.previous_hash != previous.current_hash {
                return Some(entry.index);
            }
            let expected = chain_hash(
                entry.index,
                &entry.previous_hash,
                &entry.transaction_id,
                entry.final_risk_score,
            );
            if entry.current_hash != expected {
                return Some(entry.index);
            }
        }
        None
    }
}

/// The chain hash: SHA-256 over the concatenation of the entry's index,
/// predecessor hash, transaction id, and final score.
#[must_use]
pub fn chain_hash(index: u64, previous_hash: &str, transaction_id: &str, score: u32) -> String {
    sha256_hex(format!("{index}{previous_hash}{transaction_id}{score}"))
}
