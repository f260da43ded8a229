use crate::core::balances::Balances;
use crate::core::money::{round_cents, EPSILON};
use crate::core::party::PartyId;
use crate::core::transaction::{SettlementTransfer, Transaction};
use log::{debug, info};
use rust_decimal::Decimal;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Parties keyed by the magnitude of their open balance, largest first.
///
/// Equal magnitudes pop in ascending party order, which keeps the output
/// reproducible when balances tie exactly.
struct PartyQueue {
    heap: BinaryHeap<(Decimal, Reverse<PartyId>)>,
}

impl PartyQueue {
    fn new(positions: Vec<(PartyId, Decimal)>) -> Self {
        Self {
            heap: positions
                .into_iter()
                .map(|(party, magnitude)| (magnitude, Reverse(party)))
                .collect(),
        }
    }

    fn push(&mut self, party: PartyId, magnitude: Decimal) {
        self.heap.push((magnitude, Reverse(party)));
    }

    fn pop(&mut self) -> Option<(PartyId, Decimal)> {
        self.heap.pop().map(|(magnitude, Reverse(party))| (party, magnitude))
    }
}

/// Net balance of every party in a batch.
pub fn balances(transactions: &[Transaction]) -> Balances {
    Balances::from_transactions(transactions)
}

/// Compute a small set of transfers that clears the batch's net balances.
///
/// See [`settle_balances`] for the matching rule.
///
/// # Examples
///
/// ```
/// use cashflow_settlement::core::party::PartyId;
/// use cashflow_settlement::core::transaction::Transaction;
/// use cashflow_settlement::optimization::minimizer::minimize;
/// use rust_decimal_macros::dec;
///
/// // A owes B, B owes C the same amount: A can pay C directly.
/// let transfers = minimize(&[
///     Transaction::new(PartyId::new("A"), PartyId::new("B"), dec!(100)),
///     Transaction::new(PartyId::new("B"), PartyId::new("C"), dec!(100)),
/// ]);
/// assert_eq!(transfers.len(), 1);
/// assert_eq!(transfers[0].sender.as_str(), "A");
/// assert_eq!(transfers[0].receiver.as_str(), "C");
/// assert_eq!(transfers[0].amount, dec!(100));
/// ```
pub fn minimize(transactions: &[Transaction]) -> Vec<SettlementTransfer> {
    settle_balances(&balances(transactions))
}

/// Greedily match the largest debtor with the largest creditor.
///
/// # Algorithm
///
/// 1. Parties below `-ε` are debtors, above `+ε` creditors; the rest are
///    already settled.
/// 2. Pop the largest debtor and the largest creditor and move
///    `min(|debt|, credit)` between them.
/// 3. Whichever side still has more than `ε` left goes back in its queue.
/// 4. Stop once either queue runs dry.
///
/// Each round settles at least one party, so `n` unsettled parties need at
/// most `n - 1` transfers. This is a heuristic: the exact minimum number
/// of transfers is NP-hard to find in general, and greedy matching can
/// miss it when subsets of debtors and creditors cancel exactly.
///
/// Transfers are rounded to cents. A transfer that rounds to zero is not
/// emitted, though the balances it covers are still considered cleared.
pub fn settle_balances(balances: &Balances) -> Vec<SettlementTransfer> {
    let mut debtors = PartyQueue::new(balances.debtors());
    let mut creditors = PartyQueue::new(balances.creditors());
    let mut transfers = Vec::new();

    while let (Some((debtor, debt)), Some((creditor, credit))) = (debtors.pop(), creditors.pop()) {
        let transfer = debt.min(credit);
        let amount = round_cents(transfer);
        if amount > Decimal::ZERO {
            debug!("{} pays {} {}", debtor, creditor, amount);
            transfers.push(SettlementTransfer {
                sender: debtor.clone(),
                receiver: creditor.clone(),
                amount,
            });
        } else {
            debug!("{} -> {} rounds to zero ({}), skipped", debtor, creditor, transfer);
        }

        let remaining_debt = debt - transfer;
        let remaining_credit = credit - transfer;
        if remaining_debt > EPSILON {
            debtors.push(debtor, remaining_debt);
        }
        if remaining_credit > EPSILON {
            creditors.push(creditor, remaining_credit);
        }
    }

    info!(
        "settled {} parties with {} transfers",
        balances.party_count(),
        transfers.len()
    );
    transfers
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn tx(from: &str, to: &str, amount: Decimal) -> Transaction {
        Transaction::new(PartyId::new(from), PartyId::new(to), amount)
    }

    fn transfer(from: &str, to: &str, amount: Decimal) -> SettlementTransfer {
        SettlementTransfer {
            sender: PartyId::new(from),
            receiver: PartyId::new(to),
            amount,
        }
    }

    #[test]
    fn test_transitive_chain_collapses() {
        let result = minimize(&[tx("A", "B", dec!(100)), tx("B", "C", dec!(100))]);
        assert_eq!(result, vec![transfer("A", "C", dec!(100))]);
    }

    #[test]
    fn test_two_debtors_one_creditor() {
        let result = minimize(&[tx("A", "B", dec!(50)), tx("C", "B", dec!(30))]);
        assert_eq!(
            result,
            vec![transfer("A", "B", dec!(50)), transfer("C", "B", dec!(30))]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(minimize(&[]).is_empty());
    }

    #[test]
    fn test_perfect_cycle_needs_nothing() {
        let result = minimize(&[
            tx("A", "B", dec!(100)),
            tx("B", "C", dec!(100)),
            tx("C", "A", dec!(100)),
        ]);
        assert!(result.is_empty());
    }

    #[test]
    fn test_self_transfer_is_ignored() {
        assert!(minimize(&[tx("A", "A", dec!(40))]).is_empty());
        let result = minimize(&[tx("A", "A", dec!(40)), tx("A", "B", dec!(10))]);
        assert_eq!(result, vec![transfer("A", "B", dec!(10))]);
    }

    #[test]
    fn test_bilateral_offsets() {
        let result = minimize(&[tx("A", "B", dec!(100)), tx("B", "A", dec!(60))]);
        assert_eq!(result, vec![transfer("A", "B", dec!(40))]);
    }

    #[test]
    fn test_ties_break_by_party_id() {
        let result = minimize(&[
            tx("Y", "Q", dec!(10)),
            tx("X", "P", dec!(10)),
        ]);
        assert_eq!(
            result,
            vec![transfer("X", "P", dec!(10)), transfer("Y", "Q", dec!(10))]
        );
    }

    #[test]
    fn test_split_debt_across_creditors() {
        // D owes 90 in total; creditors are owed 60 and 30.
        let result = minimize(&[tx("D", "E", dec!(60)), tx("D", "F", dec!(30))]);
        assert_eq!(
            result,
            vec![transfer("D", "E", dec!(60)), transfer("D", "F", dec!(30))]
        );
    }

    #[test]
    fn test_largest_matched_first() {
        let result = minimize(&[
            tx("A", "X", dec!(10)),
            tx("B", "X", dec!(70)),
            tx("C", "Y", dec!(40)),
            tx("A", "Y", dec!(20)),
        ]);
        // Balances: A -30, B -70, C -40, X +80, Y +60
        assert_eq!(result[0], transfer("B", "X", dec!(70)));
        assert_eq!(result.len(), 4);
    }

    #[test]
    fn test_conservation_and_bound() {
        let parties = ["A", "B", "C", "D", "E"];
        let mut txs = Vec::new();
        for (i, from) in parties.iter().enumerate() {
            for (j, to) in parties.iter().enumerate() {
                if i != j {
                    txs.push(tx(from, to, Decimal::from((i + 1) * (j + 2) * 7) / dec!(3)));
                }
            }
        }
        let balances = balances(&txs);
        let result = minimize(&txs);

        let unsettled = balances.debtors().len() + balances.creditors().len();
        assert!(result.len() < unsettled);

        let mut paid: HashMap<PartyId, Decimal> = HashMap::new();
        let mut received: HashMap<PartyId, Decimal> = HashMap::new();
        for t in &result {
            assert!(t.amount > Decimal::ZERO);
            *paid.entry(t.sender.clone()).or_default() += t.amount;
            *received.entry(t.receiver.clone()).or_default() += t.amount;
        }
        for (party, owed) in balances.debtors() {
            assert!((paid[&party] - owed).abs() <= dec!(0.01) * Decimal::from(parties.len()));
        }
        for (party, due) in balances.creditors() {
            assert!((received[&party] - due).abs() <= dec!(0.01) * Decimal::from(parties.len()));
        }
    }

    #[test]
    fn test_dust_below_epsilon_is_dropped() {
        let mut balances = Balances::new();
        balances.apply(&tx("A", "B", dec!(0.0000000001)));
        assert!(settle_balances(&balances).is_empty());
    }

    #[test]
    fn test_huge_amounts_do_not_panic() {
        let huge = dec!(50000000000000000000000000000);
        let result = minimize(&[tx("A", "B", huge), tx("C", "B", huge)]);
        assert_eq!(result, vec![transfer("A", "B", huge)]);
    }

    #[test]
    fn test_sub_cent_transfer_not_emitted() {
        let result = minimize(&[tx("A", "B", dec!(0.001))]);
        assert!(result.is_empty());
    }
}
