use crate::core::money::round_cents;
use crate::core::temporal::{days_late, parse_instant};
use crate::core::transaction::Transaction;
use crate::pipeline::SettleError;
use chrono::{NaiveDateTime, Utc};
use log::{debug, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Late-payment charges owed on one transaction at a given instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accrual {
    /// Payment instant is strictly after the due instant.
    pub late: bool,
    /// Whole days late, truncated.
    pub days_late: i64,
    /// Simple interest: `amount * interest_rate * days_late`.
    pub interest: Decimal,
    /// Flat penalty, charged once regardless of how late.
    pub penalty: Decimal,
}

impl Accrual {
    /// Interest plus penalty, pinned at `Decimal::MAX`.
    pub fn total(&self) -> Decimal {
        self.interest.saturating_add(self.penalty)
    }
}

/// Work out what a transaction accrues if paid at `at`.
///
/// A transaction with no due date, an unparseable due date, or a due date
/// at or after `at` accrues nothing.
pub fn assess(tx: &Transaction, at: NaiveDateTime) -> Accrual {
    let Some(due) = tx.parsed_due_date() else {
        return Accrual::default();
    };
    let Some(days) = days_late(due, at) else {
        return Accrual::default();
    };

    let interest = tx
        .amount()
        .checked_mul(tx.interest_rate())
        .and_then(|v| v.checked_mul(Decimal::from(days)))
        .unwrap_or_else(|| {
            warn!(
                "interest on {} -> {} overflows, charging penalty only",
                tx.sender(),
                tx.receiver()
            );
            Decimal::ZERO
        });

    Accrual {
        late: true,
        days_late: days,
        interest,
        penalty: tx.penalty(),
    }
}

/// Inflate overdue amounts with simple interest and a flat penalty.
///
/// `payment_date` is the instant the debts are considered paid; `None`
/// means now (UTC). Each transaction that is late and actually accrues
/// something gets a new amount rounded to cents, ties away from zero.
/// A total too small to survive rounding keeps its exact value, so no
/// adjusted amount is ever zero. Everything else is returned unchanged.
/// The input is never modified.
///
/// # Examples
///
/// ```
/// use cashflow_settlement::core::party::PartyId;
/// use cashflow_settlement::core::temporal::parse_instant;
/// use cashflow_settlement::core::transaction::Transaction;
/// use cashflow_settlement::schedule::constraints::apply_constraints;
/// use rust_decimal_macros::dec;
///
/// let overdue = Transaction::new(PartyId::new("A"), PartyId::new("B"), dec!(100))
///     .with_due_date("2024-01-01")
///     .with_interest_rate(dec!(0.01))
///     .with_penalty(dec!(5));
///
/// let adjusted = apply_constraints(&[overdue], parse_instant("2024-01-11"));
/// assert_eq!(adjusted[0].amount(), dec!(115.00));
/// ```
pub fn apply_constraints(
    transactions: &[Transaction],
    payment_date: Option<NaiveDateTime>,
) -> Vec<Transaction> {
    let at = payment_date.unwrap_or_else(|| Utc::now().naive_utc());
    transactions.iter().map(|tx| adjust(tx, at)).collect()
}

/// [`apply_constraints`] with the payment date given as an ISO-8601 string.
pub fn apply_constraints_at(
    transactions: &[Transaction],
    payment_date: &str,
) -> Result<Vec<Transaction>, SettleError> {
    let at = parse_instant(payment_date)
        .ok_or_else(|| SettleError::UnparseableDate(payment_date.to_string()))?;
    Ok(apply_constraints(transactions, Some(at)))
}

fn adjust(tx: &Transaction, at: NaiveDateTime) -> Transaction {
    let accrual = assess(tx, at);
    if accrual.total() == Decimal::ZERO {
        return tx.clone();
    }
    match tx.amount().checked_add(accrual.total()) {
        Some(total) => {
            let rounded = round_cents(total);
            let adjusted = if rounded > Decimal::ZERO { rounded } else { total };
            debug!(
                "{} -> {}: {} days late, {} becomes {}",
                tx.sender(),
                tx.receiver(),
                accrual.days_late,
                tx.amount(),
                adjusted
            );
            tx.with_amount(adjusted)
        }
        None => {
            warn!(
                "accrual on {} -> {} overflows, amount left unchanged",
                tx.sender(),
                tx.receiver()
            );
            tx.clone()
        }
    }
}
