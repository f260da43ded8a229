//! Turning untyped input records into canonical transactions.

pub mod validator;
