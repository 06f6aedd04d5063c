//! Per-incentive-kind capability table.
//!
//! The two contract variants expose the same logical operations under
//! different method names and with different sentinel encodings. Everything
//! kind-specific lives in this one table so the rest of the crate never
//! branches on the kind.

use crate::domain::entities::IncentiveKind;
use crate::domain::value_objects::ROUND_SENTINEL_MIN;

#[derive(Debug, Clone, Copy)]
pub struct KindCapabilities {
    pub join_method: &'static str,
    pub check_in_method: &'static str,
    pub status_method: &'static str,
    pub participation_method: &'static str,
    /// Raw round values at or above this decode to "never checked in".
    pub sentinel_min: u128,
}

const DEPOSIT_POOL: KindCapabilities = KindCapabilities {
    join_method: "joinActivity",
    check_in_method: "checkIn",
    status_method: "getActivityStatus",
    participation_method: "getUserInfo",
    sentinel_min: ROUND_SENTINEL_MIN,
};

const NFT_POOL: KindCapabilities = KindCapabilities {
    join_method: "joinNftActivity",
    check_in_method: "nftCheckIn",
    status_method: "getNftActivityStatus",
    participation_method: "getNftUserInfo",
    sentinel_min: ROUND_SENTINEL_MIN,
};

pub fn capabilities(kind: IncentiveKind) -> &'static KindCapabilities {
    match kind {
        IncentiveKind::DepositPool => &DEPOSIT_POOL,
        IncentiveKind::NftPool => &NFT_POOL,
    }
}
