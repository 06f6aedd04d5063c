//! Typed view over the raw `LedgerReader` port.
//!
//! Applies the per-read timeout, decodes wire tuples into domain types, and
//! turns structurally empty registry answers into explicit `None` so the
//! reconciler can tell "the ledger says no" apart from "the read failed".

use crate::application::ports::{LedgerReader, RawActivityMetadata, RawParticipation};
use crate::domain::entities::{
    ActivityRecord, IncentiveKind, LifecycleStatus, ParticipationRecord, RoundCounters, Visibility,
};
use crate::domain::value_objects::{ActivityId, CheckInRound, ContractAddress, UserAddress};
use crate::shared::error::AppError;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::kinds::capabilities;

#[derive(Clone)]
pub struct LedgerView {
    reader: Arc<dyn LedgerReader>,
    read_timeout: Duration,
}

impl LedgerView {
    pub fn new(reader: Arc<dyn LedgerReader>, read_timeout: Duration) -> Self {
        Self {
            reader,
            read_timeout,
        }
    }

    async fn timed<T, F>(&self, what: &str, fut: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        match tokio::time::timeout(self.read_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(AppError::Timeout(format!(
                "{what} did not answer within {:?}",
                self.read_timeout
            ))),
        }
    }

    pub async fn total_count(&self) -> Result<u64, AppError> {
        self.timed("total_activity_count", self.reader.total_activity_count())
            .await
    }

    /// `Ok(None)` is the explicit negative: the registry answered and the id
    /// has no usable record behind it. Transport failures stay `Err`.
    pub async fn activity(&self, id: u64) -> Result<Option<ActivityRecord>, AppError> {
        let raw = self
            .timed("activity_metadata", self.reader.activity_metadata(id))
            .await?;
        Ok(raw.and_then(decode_metadata))
    }

    /// Registered id for a contract address; `Ok(0)` means unregistered.
    pub async fn registered_id(&self, address: &ContractAddress) -> Result<u64, AppError> {
        self.timed(
            "activity_id_for_contract",
            self.reader.activity_id_for_contract(address.as_str()),
        )
        .await
    }

    pub async fn lifecycle(&self, address: &ContractAddress) -> Result<LifecycleStatus, AppError> {
        self.timed(
            "lifecycle_status",
            self.reader.lifecycle_status(address.as_str()),
        )
        .await
    }

    pub async fn counters(&self, address: &ContractAddress) -> Result<RoundCounters, AppError> {
        self.timed("round_counters", self.reader.round_counters(address.as_str()))
            .await
    }

    pub async fn participation(
        &self,
        address: &ContractAddress,
        user: &UserAddress,
        kind: IncentiveKind,
    ) -> Result<ParticipationRecord, AppError> {
        let caps = capabilities(kind);
        debug!(
            contract = %address,
            method = caps.participation_method,
            "reading participation tuple"
        );
        let raw = self
            .timed(
                caps.participation_method,
                self.reader.participation(address.as_str(), user.as_str()),
            )
            .await?;
        Ok(decode_participation(raw, caps.sentinel_min))
    }
}

/// Wire tuple -> domain record. Any structural defect (zeroed address, empty
/// title, unknown discriminant) yields `None`: the registry answered, but
/// with a hole, and the reconciler must treat that as an invalid record.
fn decode_metadata(raw: RawActivityMetadata) -> Option<ActivityRecord> {
    let id = ActivityId::new(raw.id).ok()?;
    let contract_address = ContractAddress::new(raw.contract_address).ok()?;
    let creator_address = UserAddress::new(raw.creator_address).ok()?;
    let visibility = match raw.visibility {
        0 => Visibility::Public,
        1 => Visibility::Private,
        _ => return None,
    };
    let incentive_kind = match raw.incentive_kind {
        0 => IncentiveKind::DepositPool,
        1 => IncentiveKind::NftPool,
        _ => return None,
    };

    let record = ActivityRecord {
        id,
        contract_address,
        creator_address,
        creator_display_name: raw.creator_display_name,
        title: raw.title,
        description: raw.description,
        created_at: raw.created_at,
        visibility,
        incentive_kind,
    };
    record.is_structurally_valid().then_some(record)
}

fn decode_participation(raw: RawParticipation, sentinel_min: u128) -> ParticipationRecord {
    ParticipationRecord {
        joined: raw.joined,
        eliminated: raw.eliminated,
        last_check_in_round: CheckInRound::from_wire(
            raw.last_check_in_round,
            raw.has_checked_in_ever,
            sentinel_min,
        ),
        reward_claimed: raw.reward_claimed,
        is_winner: raw.is_winner,
        has_checked_in_ever: raw.has_checked_in_ever,
        is_completed: raw.is_completed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    fn metadata(id: u64) -> RawActivityMetadata {
        RawActivityMetadata {
            id,
            contract_address: format!("0x{:040x}", id),
            creator_address: format!("0x{:040x}", 0xfeedu64),
            creator_display_name: "alice".to_string(),
            title: "morning run".to_string(),
            description: String::new(),
            created_at: 1_700_000_000,
            visibility: 0,
            incentive_kind: 0,
        }
    }

    struct StubReader {
        metadata: Option<RawActivityMetadata>,
        slow: bool,
    }

    #[async_trait]
    impl LedgerReader for StubReader {
        async fn total_activity_count(&self) -> Result<u64, AppError> {
            if self.slow {
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
            Ok(1)
        }

        async fn activity_metadata(
            &self,
            _id: u64,
        ) -> Result<Option<RawActivityMetadata>, AppError> {
            Ok(self.metadata.clone())
        }

        async fn activity_id_for_contract(&self, _contract: &str) -> Result<u64, AppError> {
            Ok(0)
        }

        async fn lifecycle_status(&self, _contract: &str) -> Result<LifecycleStatus, AppError> {
            Ok(LifecycleStatus::Active)
        }

        async fn participation(
            &self,
            _contract: &str,
            _user: &str,
        ) -> Result<RawParticipation, AppError> {
            Ok(RawParticipation {
                joined: true,
                last_check_in_round: u128::MAX,
                ..RawParticipation::default()
            })
        }

        async fn round_counters(&self, _contract: &str) -> Result<RoundCounters, AppError> {
            Ok(RoundCounters {
                current_round: 0,
                total_rounds: 5,
            })
        }
    }

    fn view(reader: StubReader) -> LedgerView {
        LedgerView::new(Arc::new(reader), Duration::from_millis(50))
    }

    #[tokio::test]
    async fn valid_metadata_decodes_to_record() {
        let view = view(StubReader {
            metadata: Some(metadata(3)),
            slow: false,
        });
        let record = view.activity(3).await.unwrap().unwrap();
        assert_eq!(record.id.get(), 3);
        assert_eq!(record.incentive_kind, IncentiveKind::DepositPool);
    }

    #[tokio::test]
    async fn zeroed_metadata_is_explicit_none() {
        let mut raw = metadata(3);
        raw.title.clear();
        let view = view(StubReader {
            metadata: Some(raw),
            slow: false,
        });
        assert!(view.activity(3).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unknown_kind_discriminant_is_explicit_none() {
        let mut raw = metadata(3);
        raw.incentive_kind = 9;
        let view = view(StubReader {
            metadata: Some(raw),
            slow: false,
        });
        assert!(view.activity(3).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn slow_reads_surface_as_timeout() {
        let view = view(StubReader {
            metadata: None,
            slow: true,
        });
        let err = view.total_count().await.unwrap_err();
        assert!(matches!(err, AppError::Timeout(_)));
    }

    #[tokio::test]
    async fn participation_decodes_the_sentinel() {
        let view = view(StubReader {
            metadata: None,
            slow: false,
        });
        let address = ContractAddress::new(format!("0x{:040x}", 1u64)).unwrap();
        let user = UserAddress::new(format!("0x{:040x}", 2u64)).unwrap();
        let participation = view
            .participation(&address, &user, IncentiveKind::DepositPool)
            .await
            .unwrap();
        assert!(participation.joined);
        assert_eq!(participation.last_check_in_round, CheckInRound::Never);
    }
}
