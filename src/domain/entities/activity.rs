use crate::domain::value_objects::{ActivityId, ContractAddress, UserAddress};
use crate::shared::decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncentiveKind {
    DepositPool,
    NftPool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    Private,
}

/// Lifecycle flag read from the per-activity contract. Authoritative over
/// anything inferred locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleStatus {
    Scheduled,
    Active,
    Settled,
}

/// An activity as registered on the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub id: ActivityId,
    pub contract_address: ContractAddress,
    pub creator_address: UserAddress,
    pub creator_display_name: String,
    pub title: String,
    pub description: String,
    #[serde(with = "decimal")]
    pub created_at: i64,
    pub visibility: Visibility,
    pub incentive_kind: IncentiveKind,
}

impl ActivityRecord {
    /// A metadata read that comes back with an empty title or the zero
    /// contract address is a hole left by a redeployed ledger, not a record.
    pub fn is_structurally_valid(&self) -> bool {
        !self.title.is_empty() && !self.contract_address.is_zero()
    }
}

/// Display ordering: newest first, ties broken by ascending id so repeated
/// reconciliations produce identical output.
pub fn sort_for_display(records: &mut [ActivityRecord]) {
    records.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u64, created_at: i64) -> ActivityRecord {
        ActivityRecord {
            id: ActivityId::new(id).unwrap(),
            contract_address: ContractAddress::new(format!("0x{:040x}", id)).unwrap(),
            creator_address: UserAddress::new(format!("0x{:040x}", 0xbeefu64)).unwrap(),
            creator_display_name: "creator".to_string(),
            title: format!("activity {id}"),
            description: String::new(),
            created_at,
            visibility: Visibility::Public,
            incentive_kind: IncentiveKind::DepositPool,
        }
    }

    #[test]
    fn sorts_newest_first_with_id_tiebreak() {
        let mut records = vec![record(3, 100), record(1, 200), record(2, 100)];
        sort_for_display(&mut records);
        let ids: Vec<u64> = records.iter().map(|r| r.id.get()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn empty_title_is_structurally_invalid() {
        let mut r = record(1, 10);
        r.title.clear();
        assert!(!r.is_structurally_valid());
    }

    #[test]
    fn zero_contract_address_is_structurally_invalid() {
        let mut r = record(1, 10);
        r.contract_address = ContractAddress::zero();
        assert!(!r.is_structurally_valid());
    }
}
