//! Debt minimization and settlement reporting.

pub mod minimizer;
pub mod summary;
