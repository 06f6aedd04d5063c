//! Read-only boundary to the on-chain registry and per-activity contracts.
//!
//! Every call is fallible and independently timed out by the caller; nothing
//! here assumes ordering between concurrent reads. Implementations return
//! wire-shaped values; decoding into domain types happens in
//! `infrastructure::ledger`.

use crate::domain::entities::{LifecycleStatus, RoundCounters};
use crate::shared::error::AppError;
use async_trait::async_trait;

/// Activity metadata as the registry returns it. A redeployed registry can
/// answer with zeroed tuples for ids it no longer knows, so every field is
/// kept raw until validated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawActivityMetadata {
    pub id: u64,
    pub contract_address: String,
    pub creator_address: String,
    pub creator_display_name: String,
    pub title: String,
    pub description: String,
    pub created_at: i64,
    /// 0 = public, 1 = private.
    pub visibility: u8,
    /// 0 = deposit pool, 1 = NFT pool.
    pub incentive_kind: u8,
}

/// Participation tuple as a per-activity contract returns it. The round
/// counter stays raw here; the sentinel is decoded per contract variant.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawParticipation {
    pub joined: bool,
    pub eliminated: bool,
    pub last_check_in_round: u128,
    pub reward_claimed: bool,
    pub is_winner: bool,
    pub has_checked_in_ever: bool,
    pub is_completed: bool,
}

#[async_trait]
pub trait LedgerReader: Send + Sync {
    async fn total_activity_count(&self) -> Result<u64, AppError>;

    /// `Ok(None)` when the registry explicitly reports no record for the id.
    async fn activity_metadata(&self, id: u64) -> Result<Option<RawActivityMetadata>, AppError>;

    /// Registered id for a contract; 0 means the registry does not know it.
    async fn activity_id_for_contract(&self, contract_address: &str) -> Result<u64, AppError>;

    async fn lifecycle_status(&self, contract_address: &str) -> Result<LifecycleStatus, AppError>;

    async fn participation(
        &self,
        contract_address: &str,
        user_address: &str,
    ) -> Result<RawParticipation, AppError>;

    async fn round_counters(&self, contract_address: &str) -> Result<RoundCounters, AppError>;
}
