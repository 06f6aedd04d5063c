use super::activity::ActivityRecord;
use super::participation::ParticipationRecord;
use crate::shared::decimal;
use serde::{Deserialize, Serialize};

/// One activity as held in the local cache: the ledger record, the user's
/// participation snapshot if any, and when it last passed validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedEntry {
    pub activity: ActivityRecord,
    pub participation: Option<ParticipationRecord>,
    #[serde(with = "decimal")]
    pub last_validated_at: i64,
}

impl CachedEntry {
    pub fn new(activity: ActivityRecord, validated_at: i64) -> Self {
        Self {
            activity,
            participation: None,
            last_validated_at: validated_at,
        }
    }

    /// Cache key: contract address when known, numeric id otherwise.
    pub fn key(&self) -> String {
        entry_key(
            Some(self.activity.contract_address.as_str()),
            Some(self.activity.id.get()),
        )
        .unwrap_or_else(|| self.activity.id.to_string())
    }

    pub fn with_participation(mut self, participation: ParticipationRecord) -> Self {
        self.participation = Some(participation);
        self
    }
}

/// Key derivation shared by the store and the reconciler, usable on loose
/// (not yet validated) rows where either field may be missing.
pub fn entry_key(contract_address: Option<&str>, id: Option<u64>) -> Option<String> {
    match contract_address {
        Some(addr) if !addr.is_empty() => Some(addr.to_ascii_lowercase()),
        _ => id.map(|id| id.to_string()),
    }
}
