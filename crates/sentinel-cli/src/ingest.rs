//! Profile and transaction ingest for the replay driver.
//!
//! The engine core never reads files; this module adapts the two external
//! feed formats onto the core data model:
//!
//! - **Profiles**: a CSV with a header row. Only `user_id` is required;
//!   every other column falls back to the documented defaults. Malformed
//!   rows are skipped with a counted warning; a missing `user_id` column
//!   fails the whole batch.
//! - **Transactions**: JSON lines. Only `user_id` and `amount` are required;
//!   missing fields are defaulted (fresh UUID, current wall clock, the
//!   profile's registered device and city).

use std::collections::HashMap;
use std::io::Read;

use serde::Deserialize;
use sentinel_core::model::{GeoPoint, NetworkType, Transaction, UserProfile};
use thiserror::Error;
use tracing::warn;

/// Errors that fail an ingest batch outright.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IngestError {
    /// The CSV header lacks a required column.
    #[error("profile sheet is missing the required column '{column}'")]
    MissingColumn {
        /// Name of the missing column.
        column: &'static str,
    },

    /// The CSV could not be read at all.
    #[error("failed to read profile sheet: {0}")]
    Csv(#[from] csv::Error),
}

/// One CSV row; everything but `user_id` is optional.
#[derive(Debug, Deserialize)]
struct ProfileRow {
    user_id: String,
    registered_city: Option<String>,
    registered_device_id: Option<String>,
    avg_transaction_amount: Option<u64>,
    max_transaction_amount: Option<u64>,
    daily_transaction_limit: Option<u64>,
    avg_transactions_per_day: Option<u32>,
    kyc_status: Option<sentinel_core::model::KycStatus>,
    risk_category: Option<sentinel_core::model::RiskCategory>,
    account_status: Option<sentinel_core::model::AccountStatus>,
    usual_login_start: Option<u32>,
    usual_login_end: Option<u32>,
    failed_attempts_last_10_min: Option<u32>,
}

impl ProfileRow {
    fn into_profile(self) -> UserProfile {
        let defaults = UserProfile::default_for(&self.user_id);
        UserProfile {
            user_id: self.user_id,
            registered_city: self.registered_city.unwrap_or(defaults.registered_city),
            registered_device_id: self
                .registered_device_id
                .unwrap_or(defaults.registered_device_id),
            avg_transaction_amount: self
                .avg_transaction_amount
                .unwrap_or(defaults.avg_transaction_amount),
            max_transaction_amount: self
                .max_transaction_amount
                .unwrap_or(defaults.max_transaction_amount),
            daily_transaction_limit: self
                .daily_transaction_limit
                .unwrap_or(defaults.daily_transaction_limit),
            avg_transactions_per_day: self
                .avg_transactions_per_day
                .unwrap_or(defaults.avg_transactions_per_day),
            kyc_status: self.kyc_status.unwrap_or(defaults.kyc_status),
            risk_category: self.risk_category.unwrap_or(defaults.risk_category),
            account_status: self.account_status.unwrap_or(defaults.account_status),
            usual_login_times: [
                self.usual_login_start.unwrap_or(defaults.usual_login_times[0]),
                self.usual_login_end.unwrap_or(defaults.usual_login_times[1]),
            ],
            last_login: None,
            failed_attempts_last_10_min: self
                .failed_attempts_last_10_min
                .unwrap_or(defaults.failed_attempts_last_10_min),
        }
    }
}

/// The loaded profile store.
#[derive(Debug, Default)]
pub struct ProfileBook {
    profiles: HashMap<String, UserProfile>,
    /// Rows skipped because they failed to parse.
    pub skipped_rows: usize,
}

impl ProfileBook {
    /// Loads profiles from CSV.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::MissingColumn`] when the header lacks
    /// `user_id`, or [`IngestError::Csv`] when the sheet is unreadable.
    /// Individual malformed rows are skipped and counted, not fatal.
    pub fn from_csv(reader: impl Read) -> Result<Self, IngestError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        if !csv_reader.headers()?.iter().any(|header| header == "user_id") {
            return Err(IngestError::MissingColumn { column: "user_id" });
        }

        let mut book = Self::default();
        for (line, row) in csv_reader.deserialize::<ProfileRow>().enumerate() {
            match row {
                Ok(row) => {
                    let profile = row.into_profile();
                    book.profiles.insert(profile.user_id.clone(), profile);
                },
                Err(err) => {
                    book.skipped_rows += 1;
                    warn!(line = line + 2, %err, "skipping malformed profile row");
                },
            }
        }
        Ok(book)
    }

    /// Number of loaded profiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// True when no profiles loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Looks up a user's profile.
    #[must_use]
    pub fn get(&self, user_id: &str) -> Option<&UserProfile> {
        self.profiles.get(user_id)
    }
}

/// One JSONL transaction row; only `user_id` and `amount` are required.
#[derive(Debug, Deserialize)]
pub struct TransactionRow {
    /// The paying user.
    pub user_id: String,
    /// Amount in whole rupees.
    pub amount: u64,
    transaction_id: Option<String>,
    timestamp: Option<i64>,
    device_id: Option<String>,
    ip_address: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    city: Option<String>,
    merchant_id: Option<String>,
    merchant_category: Option<String>,
    network_type: Option<NetworkType>,
    session_id: Option<String>,
}

impl TransactionRow {
    /// Resolves the row into a full transaction, defaulting missing fields
    /// from the profile and the current wall clock.
    #[must_use]
    pub fn into_transaction(self, profile: &UserProfile) -> Transaction {
        Transaction {
            transaction_id: self
                .transaction_id
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            user_id: self.user_id,
            amount: self.amount,
            timestamp: self
                .timestamp
                .unwrap_or_else(|| chrono::Utc::now().timestamp_millis()),
            device_id: self
                .device_id
                .unwrap_or_else(|| profile.registered_device_id.clone()),
            ip_address: self.ip_address.unwrap_or_else(|| "0.0.0.0".to_string()),
            location: GeoPoint {
                lat: self.lat.unwrap_or(0.0),
                lon: self.lon.unwrap_or(0.0),
                city: self
                    .city
                    .unwrap_or_else(|| profile.registered_city.clone()),
            },
            merchant_id: self
                .merchant_id
                .unwrap_or_else(|| "merchant_unknown".to_string()),
            merchant_category: self.merchant_category,
            network_type: self.network_type.unwrap_or_default(),
            session_id: self
                .session_id
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
        }
    }
}
