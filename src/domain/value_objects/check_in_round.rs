use serde::{Deserialize, Serialize};

/// Raw values at or above this are the "never checked in" sentinel.
///
/// The contracts encode the sentinel as a value near the top of the counter's
/// range, and not identically across variants, so conversion is a threshold
/// comparison rather than an equality test.
pub const ROUND_SENTINEL_MIN: u128 = u64::MAX as u128;

/// A check-in round counter with the wire sentinel made explicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckInRound {
    Never,
    Round(u64),
}

impl CheckInRound {
    /// Decode a raw wire counter using the threshold rule.
    pub fn from_raw(raw: u128) -> Self {
        Self::from_raw_with_min(raw, ROUND_SENTINEL_MIN)
    }

    /// Decode with a contract-variant-specific sentinel floor.
    pub fn from_raw_with_min(raw: u128, sentinel_min: u128) -> Self {
        if raw >= sentinel_min {
            CheckInRound::Never
        } else {
            CheckInRound::Round(raw as u64)
        }
    }

    /// Decode a participation tuple's round counter. Some contract variants
    /// report an in-range raw value (observed: 0) even when the participant
    /// has never checked in; the tuple's own `hasCheckedInEver` flag
    /// disambiguates those.
    pub fn from_wire(raw: u128, has_checked_in_ever: bool, sentinel_min: u128) -> Self {
        if !has_checked_in_ever {
            return CheckInRound::Never;
        }
        Self::from_raw_with_min(raw, sentinel_min)
    }

    pub fn round(&self) -> Option<u64> {
        match self {
            CheckInRound::Never => None,
            CheckInRound::Round(n) => Some(*n),
        }
    }

    pub fn is_never(&self) -> bool {
        matches!(self, CheckInRound::Never)
    }

    /// The further-progressed of two counters. `Never` loses to any round.
    pub fn later(self, other: CheckInRound) -> CheckInRound {
        match (self, other) {
            (CheckInRound::Never, b) => b,
            (a, CheckInRound::Never) => a,
            (CheckInRound::Round(a), CheckInRound::Round(b)) => CheckInRound::Round(a.max(b)),
        }
    }
}
