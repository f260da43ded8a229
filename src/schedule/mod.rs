//! Time-dependent stages: chronological ordering and late-payment accrual.

pub mod chronology;
pub mod constraints;
