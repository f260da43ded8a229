//! # cashflow-settlement
//!
//! Peer-to-peer debt settlement with late-payment accrual.
//!
//! Given a batch of raw transaction records, this engine normalizes them,
//! orders them in time, inflates overdue debts with simple interest and a
//! flat penalty, and computes a small set of transfers that clears every
//! party's net balance.
//!
//! ## Architecture
//!
//! - **core** — Parties, transactions, balances, money and date helpers
//! - **ingest** — Validation of untyped records into canonical transactions
//! - **schedule** — Chronological ordering and late-payment accrual
//! - **optimization** — Greedy transfer minimization and run summaries
//! - **pipeline** — The four stages wired together
//! - **simulation** — Random batches for stress testing

pub mod core;
pub mod ingest;
pub mod optimization;
pub mod pipeline;
pub mod schedule;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::core::balances::Balances;
    pub use crate::core::party::PartyId;
    pub use crate::core::transaction::{RawTransaction, SettlementTransfer, Transaction};
    pub use crate::ingest::validator::{validate, validate_with_report, ValidationReport};
    pub use crate::optimization::minimizer::{balances, minimize};
    pub use crate::optimization::summary::SettlementSummary;
    pub use crate::pipeline::{PipelineConfig, SettleError, SettlementPipeline, SettlementReport};
    pub use crate::schedule::chronology::sort_chronologically;
    pub use crate::schedule::constraints::{apply_constraints, apply_constraints_at};
}
