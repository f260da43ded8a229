//! Monetary helpers shared by every pipeline stage.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde_json::Value;
use std::str::FromStr;

/// Residual balances at or below this magnitude count as settled.
///
/// Absorbs accumulation noise only; it is not a business threshold.
pub const EPSILON: Decimal = dec!(0.000000001);

/// Decimal places kept on adjusted amounts and settlement transfers.
pub const CENT_PLACES: u32 = 2;

/// Round to whole cents, ties away from zero (2.345 -> 2.35, -2.345 -> -2.35).
pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(CENT_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// True when `amount` is indistinguishable from zero.
pub fn is_settled(amount: Decimal) -> bool {
    amount.abs() <= EPSILON
}

/// Parse a JSON value into a decimal.
///
/// Accepts JSON numbers and numeric strings, including scientific
/// notation. Booleans, arrays, objects and null are not numbers.
pub fn parse_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(Decimal::from(i));
            }
            parse_decimal_str(&n.to_string())
        }
        Value::String(s) => parse_decimal_str(s.trim()),
        _ => None,
    }
}

fn parse_decimal_str(s: &str) -> Option<Decimal> {
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}
