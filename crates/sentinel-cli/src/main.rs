//! Replay driver for the sentinel risk engine.
//!
//! Feeds a transaction stream through the engine in submission order,
//! audit-appends every decision with chain verification, and reports the
//! outcome as JSON. A separate subcommand re-verifies an exported chain
//! offline.

mod ingest;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use sentinel_core::engine::SentinelEngine;
use sentinel_core::latency::LatencyStats;
use sentinel_core::ledger::{ImmutableLedger, LedgerEntry};
use sentinel_core::model::{Decision, UserProfile};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::ingest::{ProfileBook, TransactionRow};

#[derive(Debug, Parser)]
#[command(name = "sentinel", version, about = "Transaction risk scoring replay driver")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Replay a transaction stream through the engine and the audit ledger.
    Replay {
        /// Profile sheet (CSV with a header row).
        #[arg(long)]
        profiles: PathBuf,
        /// Transaction stream (one JSON object per line).
        #[arg(long)]
        transactions: PathBuf,
        /// Write the resulting audit chain to this file.
        #[arg(long)]
        ledger_out: Option<PathBuf>,
    },
    /// Re-verify an exported audit chain.
    Verify {
        /// Chain export produced by `replay --ledger-out`.
        #[arg(long)]
        ledger: PathBuf,
    },
}

#[derive(Debug, Default, Serialize)]
struct ReplayReport {
    total: usize,
    approved: usize,
    step_up: usize,
    blocked: usize,
    coordinated_attacks: usize,
    escalation_overrides: usize,
    skipped_transactions: usize,
    skipped_profile_rows: usize,
    defaulted_profiles: usize,
    latency: Option<LatencyStats>,
    chain_length: usize,
    chain_verified: bool,
}

#[derive(Debug, Serialize)]
struct VerifyReport {
    entries: usize,
    verified: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    match Cli::parse().command {
        Command::Replay {
            profiles,
            transactions,
            ledger_out,
        } => replay(&profiles, &transactions, ledger_out.as_deref()),
        Command::Verify { ledger } => verify(&ledger),
    }
}

fn replay(
    profiles: &std::path::Path,
    transactions: &std::path::Path,
    ledger_out: Option<&std::path::Path>,
) -> anyhow::Result<()> {
    let sheet = File::open(profiles)
        .with_context(|| format!("failed to open profile sheet {}", profiles.display()))?;
    let book = ProfileBook::from_csv(sheet).context("failed to load profile sheet")?;
    info!(
        profiles = book.len(),
        skipped = book.skipped_rows,
        "profile sheet loaded"
    );

    let stream = File::open(transactions)
        .with_context(|| format!("failed to open transaction stream {}", transactions.display()))?;

    let mut engine = SentinelEngine::new();
    let mut ledger = ImmutableLedger::new();
    let mut report = ReplayReport {
        skipped_profile_rows: book.skipped_rows,
        ..ReplayReport::default()
    };

    for (line_no, line) in BufReader::new(stream).lines().enumerate() {
        let line = line.context("failed to read transaction stream")?;
        if line.trim().is_empty() {
            continue;
        }
        let row: TransactionRow = match serde_json::from_str(&line) {
            Ok(row) => row,
            Err(err) => {
                report.skipped_transactions += 1;
                warn!(line = line_no + 1, %err, "skipping malformed transaction row");
                continue;
            },
        };

        let profile = match book.get(&row.user_id) {
            Some(profile) => profile.clone(),
            None => {
                report.defaulted_profiles += 1;
                UserProfile::default_for(&row.user_id)
            },
        };

        let tx = row.into_transaction(&profile);
        let result = engine.evaluate(tx, &profile);
        match result.decision {
            Decision::Approve => report.approved += 1,
            Decision::StepUp => report.step_up += 1,
            Decision::Block => report.blocked += 1,
        }
        if result.coordinated_attack {
            report.coordinated_attacks += 1;
        }
        if result.escalation_override {
            report.escalation_overrides += 1;
        }
        report.total += 1;

        ledger
            .verify_and_append(&result)
            .context("audit chain refused the decision")?;
    }

    report.latency = Some(engine.latency_stats());
    report.chain_length = ledger.len();
    report.chain_verified = ledger.verify_integrity();

    if let Some(path) = ledger_out {
        let chain = serde_json::to_string_pretty(ledger.chain())?;
        std::fs::write(path, chain)
            .with_context(|| format!("failed to write chain export {}", path.display()))?;
        info!(path = %path.display(), entries = ledger.len(), "audit chain exported");
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn verify(ledger: &std::path::Path) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(ledger)
        .with_context(|| format!("failed to read chain export {}", ledger.display()))?;
    let entries: Vec<LedgerEntry> =
        serde_json::from_str(&raw).context("chain export is not a valid entry list")?;
    let chain = ImmutableLedger::from_entries(entries);

    let report = VerifyReport {
        entries: chain.len(),
        verified: chain.verify_integrity(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.verified {
        warn!("audit chain failed verification");
        std::process::exit(1);
    }
    Ok(())
}
