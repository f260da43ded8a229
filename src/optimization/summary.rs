use crate::core::balances::Balances;
use crate::core::transaction::{SettlementTransfer, Transaction};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How much money a settlement run actually has to move, compared with
/// paying every transaction individually.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementSummary {
    /// Transactions that went into the minimizer.
    pub transaction_count: usize,
    /// Distinct parties across those transactions.
    pub party_count: usize,
    /// Transfers emitted by the minimizer.
    pub transfer_count: usize,
    /// Sum of adjusted transaction amounts (what gross settlement would move).
    pub gross_total: Decimal,
    /// Interest and penalties added by the constraint stage.
    pub accrued_total: Decimal,
    /// Sum of the emitted transfers.
    pub settled_total: Decimal,
}

impl SettlementSummary {
    /// Summarize a run from the validated batch, its adjusted copy, and the
    /// resulting transfers.
    pub fn from_stages(
        validated: &[Transaction],
        adjusted: &[Transaction],
        transfers: &[SettlementTransfer],
    ) -> Self {
        let original_total = saturating_total(validated.iter().map(|t| t.amount()));
        let gross_total = saturating_total(adjusted.iter().map(|t| t.amount()));
        SettlementSummary {
            transaction_count: adjusted.len(),
            party_count: Balances::from_transactions(adjusted).party_count(),
            transfer_count: transfers.len(),
            gross_total,
            accrued_total: gross_total - original_total,
            settled_total: saturating_total(transfers.iter().map(|t| t.amount)),
        }
    }

    /// Amount saved by settling net instead of gross.
    pub fn savings(&self) -> Decimal {
        self.gross_total - self.settled_total
    }

    /// Savings as a fraction of gross, in `[0, 1]`.
    pub fn savings_ratio(&self) -> f64 {
        if self.gross_total == Decimal::ZERO {
            return 0.0;
        }
        (self.savings() / self.gross_total).to_f64().unwrap_or(0.0)
    }
}

/// Totals are informational; a batch too large to sum pins at `Decimal::MAX`.
fn saturating_total(amounts: impl Iterator<Item = Decimal>) -> Decimal {
    amounts.fold(Decimal::ZERO, Decimal::saturating_add)
}

impl std::fmt::Display for SettlementSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Settlement Summary ===")?;
        writeln!(f, "Transactions:   {}", self.transaction_count)?;
        writeln!(f, "Parties:        {}", self.party_count)?;
        writeln!(f, "Transfers:      {}", self.transfer_count)?;
        writeln!(f, "Gross Total:    {}", self.gross_total)?;
        writeln!(f, "Accrued:        {}", self.accrued_total)?;
        writeln!(f, "Settled Total:  {}", self.settled_total)?;
        writeln!(f, "Savings:        {:.1}%", self.savings_ratio() * 100.0)?;
        Ok(())
    }
}
