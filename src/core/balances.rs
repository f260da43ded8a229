use crate::core::money::EPSILON;
use crate::core::party::PartyId;
use crate::core::transaction::Transaction;
use log::warn;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Net balance of each party across a batch of transactions.
///
/// A positive balance means the party is owed money (net creditor).
/// A negative balance means the party owes money (net debtor).
///
/// Every transaction moves the same amount out of one balance and into
/// another, so the balances of a batch always sum to zero.
///
/// No position, and no partial sum of positions, can exceed the gross
/// amount applied so far. A transaction that would push that gross amount
/// past [`Decimal::MAX`] is skipped with a warning, which keeps every
/// later aggregate free of overflow.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Balances {
    positions: BTreeMap<PartyId, Decimal>,
    #[serde(skip)]
    gross: Decimal,
}

impl Balances {
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregate a batch of transactions.
    pub fn from_transactions<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Self {
        let mut balances = Self::new();
        for tx in transactions {
            balances.apply(tx);
        }
        balances
    }

    /// Apply a transaction: sender loses, receiver gains.
    ///
    /// Returns `false` when the transaction was skipped because the batch's
    /// gross amount would overflow.
    pub fn apply(&mut self, tx: &Transaction) -> bool {
        if tx.is_self_transfer() {
            self.positions.entry(tx.sender().clone()).or_insert(Decimal::ZERO);
            return true;
        }
        let Some(gross) = self.gross.checked_add(tx.amount()) else {
            warn!(
                "{} -> {} ({}) overflows the batch total, skipped",
                tx.sender(),
                tx.receiver(),
                tx.amount()
            );
            return false;
        };
        self.gross = gross;
        *self
            .positions
            .entry(tx.sender().clone())
            .or_insert(Decimal::ZERO) -= tx.amount();
        *self
            .positions
            .entry(tx.receiver().clone())
            .or_insert(Decimal::ZERO) += tx.amount();
        true
    }

    /// Net position of a party. Unknown parties are flat.
    pub fn position(&self, party: &PartyId) -> Decimal {
        self.positions.get(party).copied().unwrap_or(Decimal::ZERO)
    }

    /// All positions, ordered by party.
    pub fn iter(&self) -> impl Iterator<Item = (&PartyId, Decimal)> {
        self.positions.iter().map(|(p, &v)| (p, v))
    }

    pub fn party_count(&self) -> usize {
        self.positions.len()
    }

    /// Parties owing more than epsilon, with the magnitude they owe.
    pub fn debtors(&self) -> Vec<(PartyId, Decimal)> {
        self.positions
            .iter()
            .filter(|(_, v)| **v < -EPSILON)
            .map(|(p, v)| (p.clone(), v.abs()))
            .collect()
    }

    /// Parties owed more than epsilon.
    pub fn creditors(&self) -> Vec<(PartyId, Decimal)> {
        self.positions
            .iter()
            .filter(|(_, v)| **v > EPSILON)
            .map(|(p, v)| (p.clone(), *v))
            .collect()
    }

    /// Sum of all positions is zero.
    pub fn is_balanced(&self) -> bool {
        self.positions.values().sum::<Decimal>().abs() <= EPSILON
    }

    /// Total amount that has to move to clear every balance
    /// (sum of positive positions, equal to the sum of |negative| ones).
    pub fn total_outstanding(&self) -> Decimal {
        self.positions
            .values()
            .filter(|v| **v > EPSILON)
            .sum()
    }
}
