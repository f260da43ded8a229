use crate::core::money::parse_decimal;
use crate::core::party::PartyId;
use crate::core::transaction::{RawTransaction, Transaction};
use crate::pipeline::SettleError;
use log::{debug, info};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Why a raw record was left out of the canonical batch.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum RejectReason {
    #[error("record is not a JSON object")]
    NotAnObject,
    #[error("missing required field `{0}`")]
    MissingField(String),
    #[error("field `{0}` must be a non-empty string")]
    InvalidParty(String),
    #[error("field `{0}` is not numeric")]
    NonNumeric(String),
    #[error("amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),
    #[error("field `{field}` must not be negative, got {value}")]
    NegativeValue { field: String, value: Decimal },
}

/// A dropped record and its position in the input batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    pub index: usize,
    pub reason: RejectReason,
}

/// Outcome of validating a batch: what was kept and what was dropped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub accepted: Vec<Transaction>,
    pub rejected: Vec<Rejection>,
}

impl ValidationReport {
    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }
}

/// Normalize raw records into canonical transactions.
///
/// Ingestion is best-effort: malformed records are skipped, never fatal,
/// and the output keeps the relative order of the records that survive.
/// Use [`validate_with_report`] to find out what was skipped and why.
///
/// # Examples
///
/// ```
/// use cashflow_settlement::core::transaction::RawTransaction;
/// use cashflow_settlement::ingest::validator::validate;
///
/// let batch = vec![
///     RawTransaction::new().with("sender", "A").with("receiver", "B").with("amount", 10),
///     RawTransaction::new().with("sender", "A").with("receiver", "B").with("amount", -3),
/// ];
/// assert_eq!(validate(&batch).len(), 1);
/// ```
pub fn validate(records: &[RawTransaction]) -> Vec<Transaction> {
    validate_with_report(records).accepted
}

/// Like [`validate`], plus the index and reason of every dropped record.
pub fn validate_with_report(records: &[RawTransaction]) -> ValidationReport {
    let mut report = ValidationReport::default();
    for (index, raw) in records.iter().enumerate() {
        match validate_record(raw) {
            Ok(tx) => report.accepted.push(tx),
            Err(reason) => {
                debug!("dropping record {}: {}", index, reason);
                report.rejected.push(Rejection { index, reason });
            }
        }
    }
    info!(
        "validated {} records: {} accepted, {} rejected",
        records.len(),
        report.accepted.len(),
        report.rejected.len()
    );
    report
}

/// Normalize a single record.
pub fn validate_record(raw: &RawTransaction) -> Result<Transaction, RejectReason> {
    if !raw.is_object() {
        return Err(RejectReason::NotAnObject);
    }

    let sender = party(raw, "sender")?;
    let receiver = party(raw, "receiver")?;

    let amount_value = raw
        .field("amount")
        .ok_or_else(|| RejectReason::MissingField("amount".into()))?;
    let amount =
        parse_decimal(amount_value).ok_or_else(|| RejectReason::NonNumeric("amount".into()))?;
    if amount <= Decimal::ZERO {
        return Err(RejectReason::NonPositiveAmount(amount));
    }

    let interest_rate = optional_non_negative(raw, "interest_rate")?;
    let penalty = optional_non_negative(raw, "penalty")?;

    Ok(Transaction::new(sender, receiver, amount)
        .with_interest_rate(interest_rate)
        .with_penalty(penalty)
        .with_optional_dates(opaque_string(raw, "timestamp"), opaque_string(raw, "due_date")))
}

/// Load a batch of raw records from JSON.
///
/// Accepts a bare array of records or an object wrapping them as
/// `{ "transactions": [...] }`.
pub fn parse_batch(json: &str) -> Result<Vec<RawTransaction>, SettleError> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Batch {
        List(Vec<RawTransaction>),
        Wrapped { transactions: Vec<RawTransaction> },
    }

    let batch: Batch = serde_json::from_str(json)?;
    Ok(match batch {
        Batch::List(records) => records,
        Batch::Wrapped { transactions } => transactions,
    })
}

fn party(raw: &RawTransaction, field: &str) -> Result<PartyId, RejectReason> {
    match raw.field(field) {
        None => Err(RejectReason::MissingField(field.into())),
        Some(Value::String(s)) if !s.is_empty() => Ok(PartyId::new(s.as_str())),
        Some(_) => Err(RejectReason::InvalidParty(field.into())),
    }
}

fn optional_non_negative(raw: &RawTransaction, field: &str) -> Result<Decimal, RejectReason> {
    let Some(value) = raw.field(field) else {
        return Ok(Decimal::ZERO);
    };
    let parsed = parse_decimal(value).ok_or_else(|| RejectReason::NonNumeric(field.into()))?;
    if parsed < Decimal::ZERO {
        return Err(RejectReason::NegativeValue {
            field: field.into(),
            value: parsed,
        });
    }
    Ok(parsed)
}

fn opaque_string(raw: &RawTransaction, field: &str) -> Option<String> {
    raw.field(field).and_then(Value::as_str).map(str::to_string)
}
