//! End-to-end settlement: validate, order, accrue, minimize.

use crate::core::transaction::{RawTransaction, SettlementTransfer, Transaction};
use crate::ingest::validator::{validate_with_report, Rejection};
use crate::optimization::minimizer::minimize;
use crate::optimization::summary::SettlementSummary;
use crate::schedule::chronology::sort_chronologically;
use crate::schedule::constraints::apply_constraints;
use chrono::{DateTime, NaiveDateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced to callers of the settlement pipeline.
///
/// The individual stages never fail; malformed records and dates degrade
/// to documented defaults. These errors cover the conditions a caller has
/// to react to.
#[derive(Debug, Error)]
pub enum SettleError {
    #[error("no valid transactions provided ({rejected} rejected)")]
    NoValidTransactions { rejected: usize },
    #[error("unparseable date: {0:?}")]
    UnparseableDate(String),
    #[error("invalid transaction batch: {0}")]
    InvalidBatch(#[from] serde_json::Error),
}

/// Settings for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Instant the debts are considered paid. `None` means now.
    pub payment_date: Option<NaiveDateTime>,
    /// Accrue interest and penalties on overdue transactions.
    pub apply_constraints: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            payment_date: None,
            apply_constraints: true,
        }
    }
}

/// Everything a settlement run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementReport {
    pub id: Uuid,
    pub computed_at: DateTime<Utc>,
    /// Payment instant used for accrual.
    pub payment_date: NaiveDateTime,
    pub rejected: Vec<Rejection>,
    /// Validated transactions in chronological order, after accrual.
    pub adjusted: Vec<Transaction>,
    pub transfers: Vec<SettlementTransfer>,
    pub summary: SettlementSummary,
}

/// Runs the four settlement stages in order.
///
/// # Examples
///
/// ```
/// use cashflow_settlement::core::transaction::RawTransaction;
/// use cashflow_settlement::pipeline::{PipelineConfig, SettlementPipeline};
///
/// let batch = vec![
///     RawTransaction::new().with("sender", "A").with("receiver", "B").with("amount", 100),
///     RawTransaction::new().with("sender", "B").with("receiver", "C").with("amount", 100),
/// ];
/// let report = SettlementPipeline::new(PipelineConfig::default()).run(&batch).unwrap();
/// assert_eq!(report.transfers.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SettlementPipeline {
    config: PipelineConfig,
}

impl SettlementPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Settle a batch of raw records.
    ///
    /// Fails only when validation leaves nothing to settle.
    pub fn run(&self, records: &[RawTransaction]) -> Result<SettlementReport, SettleError> {
        let report = validate_with_report(records);
        if report.is_empty() {
            warn!(
                "batch of {} records has no valid transactions",
                records.len()
            );
            return Err(SettleError::NoValidTransactions {
                rejected: report.rejected.len(),
            });
        }

        let payment_date = self
            .config
            .payment_date
            .unwrap_or_else(|| Utc::now().naive_utc());

        let ordered = sort_chronologically(&report.accepted);
        let adjusted = if self.config.apply_constraints {
            apply_constraints(&ordered, Some(payment_date))
        } else {
            ordered
        };
        let transfers = minimize(&adjusted);
        let summary = SettlementSummary::from_stages(&report.accepted, &adjusted, &transfers);

        let id = Uuid::new_v4();
        info!(
            "settlement {}: {} transactions -> {} transfers",
            id,
            adjusted.len(),
            transfers.len()
        );

        Ok(SettlementReport {
            id,
            computed_at: Utc::now(),
            payment_date,
            rejected: report.rejected,
            adjusted,
            transfers,
            summary,
        })
    }
}
