use crate::core::transaction::Transaction;

/// Order transactions by timestamp, earliest first.
///
/// A missing or unparseable timestamp sorts before every real instant.
/// The sort is stable, so transactions with equal (or equally missing)
/// timestamps keep their input order.
pub fn sort_chronologically(transactions: &[Transaction]) -> Vec<Transaction> {
    let mut ordered = transactions.to_vec();
    // `None < Some(_)`, so undated transactions lead.
    ordered.sort_by_key(|tx| tx.parsed_timestamp());
    ordered
}
