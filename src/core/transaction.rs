use crate::core::party::PartyId;
use crate::core::temporal::parse_instant;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// An untyped transaction record as supplied by the caller.
///
/// Nothing about the shape is trusted: fields may be missing, null, of the
/// wrong JSON type, or the record may not be an object at all. The
/// validator turns these into canonical [`Transaction`]s.
///
/// # Examples
///
/// ```
/// use cashflow_settlement::core::transaction::RawTransaction;
///
/// let raw = RawTransaction::new()
///     .with("sender", "alice")
///     .with("receiver", "bob")
///     .with("amount", "25.00");
///
/// assert_eq!(raw.field("sender").and_then(|v| v.as_str()), Some("alice"));
/// assert!(raw.field("due_date").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawTransaction(Value);

impl RawTransaction {
    /// An empty record.
    pub fn new() -> Self {
        Self(Value::Object(Map::new()))
    }

    /// Set a field, turning a non-object record into an object first.
    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Self {
        if !self.0.is_object() {
            self.0 = Value::Object(Map::new());
        }
        if let Value::Object(map) = &mut self.0 {
            map.insert(field.to_string(), value.into());
        }
        self
    }

    /// Look up a field. JSON `null` reads the same as a missing field.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name).filter(|v| !v.is_null())
    }

    pub fn is_object(&self) -> bool {
        self.0.is_object()
    }
}

impl Default for RawTransaction {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Value> for RawTransaction {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<&Transaction> for RawTransaction {
    fn from(tx: &Transaction) -> Self {
        let mut raw = RawTransaction::new()
            .with("sender", tx.sender.as_str())
            .with("receiver", tx.receiver.as_str())
            .with("amount", tx.amount.to_string())
            .with("interest_rate", tx.interest_rate.to_string())
            .with("penalty", tx.penalty.to_string());
        if let Some(ts) = &tx.timestamp {
            raw = raw.with("timestamp", ts.as_str());
        }
        if let Some(due) = &tx.due_date {
            raw = raw.with("due_date", due.as_str());
        }
        raw
    }
}

/// A validated transfer of `amount` from `sender` to `receiver`.
///
/// Guarantees: both parties are non-empty, `amount` is positive, and
/// `interest_rate` and `penalty` are non-negative numbers (zero when the
/// raw record left them out). `timestamp` and `due_date` are carried as
/// the caller wrote them; parsing happens in the stages that need them.
///
/// Transactions are never mutated in place. Stages that change an amount
/// hand back a new copy.
///
/// # Examples
///
/// ```
/// use cashflow_settlement::core::transaction::Transaction;
/// use cashflow_settlement::core::party::PartyId;
/// use rust_decimal_macros::dec;
///
/// let tx = Transaction::new(PartyId::new("alice"), PartyId::new("bob"), dec!(40))
///     .with_due_date("2024-06-01")
///     .with_interest_rate(dec!(0.01));
///
/// assert_eq!(tx.amount(), dec!(40));
/// assert_eq!(tx.due_date(), Some("2024-06-01"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    sender: PartyId,
    receiver: PartyId,
    amount: Decimal,
    timestamp: Option<String>,
    due_date: Option<String>,
    interest_rate: Decimal,
    penalty: Decimal,
}

impl Transaction {
    /// Create a transaction with no dates and no late-payment terms.
    ///
    /// # Panics
    ///
    /// Panics if `amount` is not positive or either party is empty.
    pub fn new(sender: PartyId, receiver: PartyId, amount: Decimal) -> Self {
        assert!(
            amount > Decimal::ZERO,
            "Transaction amount must be positive, got {}",
            amount
        );
        assert!(
            !sender.is_empty() && !receiver.is_empty(),
            "Transaction parties must be non-empty"
        );
        Self {
            sender,
            receiver,
            amount,
            timestamp: None,
            due_date: None,
            interest_rate: Decimal::ZERO,
            penalty: Decimal::ZERO,
        }
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    pub fn with_due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = Some(due_date.into());
        self
    }

    /// Daily simple-interest rate applied once the due date has passed.
    pub fn with_interest_rate(mut self, rate: Decimal) -> Self {
        self.interest_rate = rate;
        self
    }

    /// Flat fee added once when the due date has passed.
    pub fn with_penalty(mut self, penalty: Decimal) -> Self {
        self.penalty = penalty;
        self
    }

    pub(crate) fn with_optional_dates(
        mut self,
        timestamp: Option<String>,
        due_date: Option<String>,
    ) -> Self {
        self.timestamp = timestamp;
        self.due_date = due_date;
        self
    }

    /// Copy of this transaction carrying a different amount.
    pub(crate) fn with_amount(&self, amount: Decimal) -> Self {
        debug_assert!(amount > Decimal::ZERO, "amount must be positive");
        Self {
            amount,
            ..self.clone()
        }
    }

    // --- Accessors ---

    pub fn sender(&self) -> &PartyId {
        &self.sender
    }

    pub fn receiver(&self) -> &PartyId {
        &self.receiver
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn timestamp(&self) -> Option<&str> {
        self.timestamp.as_deref()
    }

    pub fn due_date(&self) -> Option<&str> {
        self.due_date.as_deref()
    }

    pub fn interest_rate(&self) -> Decimal {
        self.interest_rate
    }

    pub fn penalty(&self) -> Decimal {
        self.penalty
    }

    /// The timestamp as an instant, if present and parseable.
    pub fn parsed_timestamp(&self) -> Option<NaiveDateTime> {
        self.timestamp.as_deref().and_then(parse_instant)
    }

    /// The due date as an instant, if present and parseable.
    pub fn parsed_due_date(&self) -> Option<NaiveDateTime> {
        self.due_date.as_deref().and_then(parse_instant)
    }

    pub fn is_self_transfer(&self) -> bool {
        self.sender == self.receiver
    }
}

/// One payment that clears part of the outstanding net balances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementTransfer {
    /// The net debtor who pays.
    pub sender: PartyId,
    /// The net creditor who is paid.
    pub receiver: PartyId,
    /// Always positive, rounded to cents.
    pub amount: Decimal,
}

impl fmt::Display for SettlementTransfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}: {}", self.sender, self.receiver, self.amount)
    }
}
