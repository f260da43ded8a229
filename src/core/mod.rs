//! Foundational types: parties, transactions, balances, money and dates.

pub mod balances;
pub mod money;
pub mod party;
pub mod temporal;
pub mod transaction;
