use serde::{Deserialize, Serialize};
use std::fmt;

/// Ledger-assigned activity id. Ids start at 1; the ledger uses 0 to mean
/// "no such activity", so 0 is rejected at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityId(u64);

impl ActivityId {
    pub fn new(value: u64) -> Result<Self, String> {
        if value == 0 {
            return Err("Activity id 0 is reserved by the ledger".to_string());
        }
        Ok(Self(value))
    }

    pub fn get(&self) -> u64 {
        self.0
    }

    /// Range check against the ledger's current total count.
    pub fn in_range(&self, total_count: u64) -> bool {
        self.0 >= 1 && self.0 <= total_count
    }
}

impl fmt::Display for ActivityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
