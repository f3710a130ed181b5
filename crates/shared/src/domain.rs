use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Key of the durable "this client already confirmed" flag.
pub const CONFIRMATION_FLAG_KEY: &str = "isConfirmed";

/// Sum of every party size recorded by the endpoint.
pub type AttendeeTotal = u64;

/// Number of people covered by one confirmation. Never below one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct PartySize(u32);

impl PartySize {
    pub const MIN: PartySize = PartySize(1);

    pub fn new(value: u32) -> Option<Self> {
        (value >= Self::MIN.0).then_some(Self(value))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn increment(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    pub fn decrement(self) -> Self {
        Self(self.0.saturating_sub(1).max(Self::MIN.0))
    }
}

impl Default for PartySize {
    fn default() -> Self {
        Self::MIN
    }
}

impl fmt::Display for PartySize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for PartySize {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("party size must be at least 1, got {value}"))
    }
}

impl From<PartySize> for u32 {
    fn from(value: PartySize) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationRecord {
    pub recorded_at: DateTime<Utc>,
    pub party_size: PartySize,
}
