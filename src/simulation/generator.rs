//! Random transaction batches for stress tests, benchmarks and demos.
//!
//! Batches come out as raw records so they exercise the whole pipeline,
//! validator included. A configurable share of them is deliberately
//! malformed.

use crate::core::transaction::RawTransaction;
use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Shape of a generated batch.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Number of distinct parties.
    pub party_count: usize,
    /// Number of records to emit.
    pub transaction_count: usize,
    /// Smallest well-formed amount.
    pub min_amount: Decimal,
    /// Largest well-formed amount.
    pub max_amount: Decimal,
    /// Share of records that carry a due date and late-payment terms.
    pub overdue_ratio: f64,
    /// Share of records that are malformed on purpose.
    pub malformed_ratio: f64,
    /// Earliest timestamp.
    pub start: NaiveDate,
    /// Timestamps fall within this many days after `start`.
    pub span_days: i64,
    /// Fixed seed for reproducible batches.
    pub seed: Option<u64>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            party_count: 10,
            transaction_count: 30,
            min_amount: Decimal::from(1),
            max_amount: Decimal::from(1_000),
            overdue_ratio: 0.25,
            malformed_ratio: 0.0,
            start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            span_days: 90,
            seed: None,
        }
    }
}

/// Generate a batch of raw transaction records.
pub fn generate_random_batch(config: &BatchConfig) -> Vec<RawTransaction> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let parties: Vec<String> = (0..config.party_count.max(2))
        .map(|i| format!("PARTY-{:03}", i))
        .collect();

    let min_cents = to_cents(config.min_amount).max(1);
    let max_cents = to_cents(config.max_amount).max(min_cents);

    (0..config.transaction_count)
        .map(|_| {
            let sender_idx = rng.gen_range(0..parties.len());
            let mut receiver_idx = rng.gen_range(0..parties.len());
            while receiver_idx == sender_idx {
                receiver_idx = rng.gen_range(0..parties.len());
            }

            let amount = Decimal::new(rng.gen_range(min_cents..=max_cents), 2);
            let day = config.start + Duration::days(rng.gen_range(0..config.span_days.max(1)));
            let timestamp = day.and_hms_opt(rng.gen_range(0..24), 0, 0).unwrap_or_default();

            let mut raw = RawTransaction::new()
                .with("sender", parties[sender_idx].as_str())
                .with("receiver", parties[receiver_idx].as_str())
                .with("amount", amount.to_string())
                .with("timestamp", timestamp.format("%Y-%m-%dT%H:%M:%S").to_string());

            if rng.gen_bool(probability(config.overdue_ratio)) {
                let due = day + Duration::days(rng.gen_range(1..30));
                let rate = Decimal::new(rng.gen_range(1..=20), 3);
                let penalty = Decimal::new(rng.gen_range(0..=2_000), 2);
                raw = raw
                    .with("due_date", due.format("%Y-%m-%d").to_string())
                    .with("interest_rate", rate.to_string())
                    .with("penalty", penalty.to_string());
            }

            if rng.gen_bool(probability(config.malformed_ratio)) {
                raw = corrupt(raw, &mut rng);
            }
            raw
        })
        .collect()
}

fn corrupt(raw: RawTransaction, rng: &mut StdRng) -> RawTransaction {
    match rng.gen_range(0..4) {
        0 => raw.with("receiver", ""),
        1 => raw.with("amount", "-1"),
        2 => raw.with("penalty", "n/a"),
        _ => raw.with("amount", serde_json::Value::Null),
    }
}

/// Clamp a ratio into a valid probability; NaN counts as never.
fn probability(ratio: f64) -> f64 {
    if ratio.is_nan() {
        0.0
    } else {
        ratio.clamp(0.0, 1.0)
    }
}

fn to_cents(amount: Decimal) -> i64 {
    (amount * Decimal::from(100)).trunc().to_i64().unwrap_or(1)
}
