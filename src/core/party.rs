use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a party that sends or receives funds.
///
/// Parties are opaque strings: a person's name, an account handle, or any
/// other label the caller uses consistently across a batch.
///
/// # Examples
///
/// ```
/// use cashflow_settlement::core::party::PartyId;
///
/// let alice = PartyId::new("alice");
/// let bob = PartyId::new("bob");
/// assert_ne!(alice, bob);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartyId(String);

impl PartyId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the string representation of this party ID.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PartyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for PartyId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for PartyId {
    fn from(s: String) -> Self {
        Self(s)
    }
}
