// Entry Entity - one recorded savings event
//
// Identity: EntryId (UUID v4, assigned at creation, never changes)
// Values: timestamp, source, sum (immutable - there is no update path)

use super::source::Source;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Whole USD units
pub type Amount = u64;

/// Largest sum a single entry may carry (SQLite INTEGER is signed 64-bit)
pub const MAX_SUM: Amount = i64::MAX as Amount;

// ============================================================================
// ENTRY ID
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(Uuid);

impl EntryId {
    pub fn new() -> Self {
        EntryId(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for EntryId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(EntryId)
    }
}

// ============================================================================
// ENTRY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    id: EntryId,
    timestamp: DateTime<Utc>,
    source: Source,
    sum: Amount,
}

impl Entry {
    /// Create a new entry stamped with the current time
    pub fn new(source: Source, sum: Amount) -> Self {
        Self::at(Utc::now(), source, sum)
    }

    /// Create a new entry with an explicit creation time
    pub fn at(timestamp: DateTime<Utc>, source: Source, sum: Amount) -> Self {
        Entry {
            id: EntryId::new(),
            timestamp,
            source,
            sum,
        }
    }

    /// Rebuild a stored entry (database rows only)
    pub(crate) fn restore(id: EntryId, timestamp: DateTime<Utc>, source: Source, sum: Amount) -> Self {
        Entry {
            id,
            timestamp,
            source,
            sum,
        }
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn sum(&self) -> Amount {
        self.sum
    }
}
