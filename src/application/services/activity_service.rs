//! User-facing queries and optimistic mutation writes over the cache.
//!
//! Mutations here never talk to the ledger; they record the effect of a
//! transaction the caller already saw confirmed, so the UI reflects it
//! immediately even if the next reconciliation pass raced the confirmation.

use crate::domain::entities::{ActivityRecord, ParticipationRecord, RoundCounters};
use crate::domain::services::categorizer::{
    bucket_for_record, outcome_for, DisplayBucket, OutcomeGroup,
};
use crate::domain::services::eligibility::{self, CheckInEligibility};
use crate::domain::value_objects::{CheckInRound, ContractAddress, UserAddress};
use crate::infrastructure::ledger::LedgerView;
use crate::infrastructure::storage::RecordStore;
use crate::shared::error::{AppError, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// One activity as the UI consumes it: the record plus everything derived.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ActivityView {
    pub record: ActivityRecord,
    pub participation: Option<ParticipationRecord>,
    pub bucket: DisplayBucket,
    pub outcome: Option<OutcomeGroup>,
}

pub struct ActivityService {
    ledger: LedgerView,
    store: Arc<RecordStore>,
}

impl ActivityService {
    pub fn new(ledger: LedgerView, store: Arc<RecordStore>) -> Self {
        Self { ledger, store }
    }

    fn cached(&self, user: &UserAddress, address: &ContractAddress) -> Result<ActivityRecord> {
        self.store
            .get_all(user)?
            .into_iter()
            .filter_map(|entry| entry.activity)
            .find(|record| record.contract_address == *address)
            .ok_or_else(|| AppError::NotFound(format!("no cached activity at {address}")))
    }

    /// Record a confirmed join. Flag-union write; reconciliation cannot undo it.
    pub fn record_joined(&self, user: &UserAddress, address: &ContractAddress) -> Result<()> {
        debug!(%address, "recording confirmed join");
        self.store.upsert_participation(
            user,
            address.as_str(),
            ParticipationRecord {
                joined: true,
                ..ParticipationRecord::default()
            },
        )
    }

    /// Record a confirmed check-in for `round`.
    pub fn record_check_in(
        &self,
        user: &UserAddress,
        address: &ContractAddress,
        round: u64,
    ) -> Result<()> {
        debug!(%address, round, "recording confirmed check-in");
        self.store.upsert_participation(
            user,
            address.as_str(),
            ParticipationRecord {
                joined: true,
                has_checked_in_ever: true,
                last_check_in_round: CheckInRound::Round(round),
                ..ParticipationRecord::default()
            },
        )
    }

    /// Record a confirmed reward claim.
    pub fn record_reward_claimed(
        &self,
        user: &UserAddress,
        address: &ContractAddress,
    ) -> Result<()> {
        debug!(%address, "recording confirmed reward claim");
        self.store.upsert_participation(
            user,
            address.as_str(),
            ParticipationRecord {
                joined: true,
                reward_claimed: true,
                ..ParticipationRecord::default()
            },
        )
    }

    /// Live eligibility for one activity: fresh lifecycle, counters and
    /// participation reads, merged with the local snapshot. Counter reads
    /// that fail degrade to the all-negative answer instead of erroring.
    pub async fn eligibility_for(
        &self,
        user: &UserAddress,
        address: &ContractAddress,
    ) -> Result<CheckInEligibility> {
        let record = self.cached(user, address)?;

        let counters: Option<RoundCounters> = match self.ledger.counters(address).await {
            Ok(counters) => Some(counters),
            Err(err) => {
                debug!(%address, %err, "round counters unreadable");
                None
            }
        };

        // Same policy as unreadable counters: never guess, answer not
        // eligible instead of erroring.
        let flag = match self.ledger.lifecycle(address).await {
            Ok(flag) => flag,
            Err(err) => {
                debug!(%address, %err, "lifecycle unreadable");
                return Ok(CheckInEligibility::default());
            }
        };
        let status = counters.map_or(flag, |c| c.effective_status(flag));

        let local = self
            .store
            .participation(user, address.as_str())?
            .unwrap_or_default();
        let participation = match self
            .ledger
            .participation(address, user, record.incentive_kind)
            .await
        {
            Ok(remote) => local.merged_with_remote(&remote),
            Err(err) => {
                debug!(%address, %err, "participation unreadable, using local snapshot");
                local
            }
        };

        Ok(eligibility::evaluate(&participation, counters.as_ref(), status))
    }

    /// Cached records joined with participation, classified for display.
    pub fn classified(&self, user: &UserAddress) -> Result<Vec<ActivityView>> {
        let mut views: Vec<ActivityView> = Vec::new();
        for entry in self.store.get_all(user)? {
            let Some(record) = entry.activity else {
                continue;
            };
            views.push(ActivityView {
                bucket: bucket_for_record(&record),
                // Outcome needs a live lifecycle read; grouped views fill it.
                outcome: None,
                participation: entry.participation,
                record,
            });
        }
        views.sort_by(|a, b| {
            b.record
                .created_at
                .cmp(&a.record.created_at)
                .then(a.record.id.cmp(&b.record.id))
        });
        Ok(views)
    }

    /// Cached records grouped by display bucket.
    pub fn grouped_by_bucket(
        &self,
        user: &UserAddress,
    ) -> Result<HashMap<DisplayBucket, Vec<ActivityView>>> {
        let mut groups: HashMap<DisplayBucket, Vec<ActivityView>> = HashMap::new();
        for view in self.classified(user)? {
            groups.entry(view.bucket).or_default().push(view);
        }
        Ok(groups)
    }

    /// Joined activities grouped by outcome, using live lifecycle reads.
    /// Activities whose lifecycle cannot be read are skipped for this pass.
    pub async fn grouped_by_outcome(
        &self,
        user: &UserAddress,
    ) -> Result<HashMap<OutcomeGroup, Vec<ActivityView>>> {
        let mut groups: HashMap<OutcomeGroup, Vec<ActivityView>> = HashMap::new();
        for mut view in self.classified(user)? {
            let Some(participation) = view.participation else {
                continue;
            };
            let address = view.record.contract_address.clone();
            let flag = match self.ledger.lifecycle(&address).await {
                Ok(flag) => flag,
                Err(err) => {
                    debug!(%address, %err, "lifecycle unreadable, skipping for grouping");
                    continue;
                }
            };
            let status = match self.ledger.counters(&address).await {
                Ok(counters) => counters.effective_status(flag),
                Err(_) => flag,
            };
            if let Some(outcome) = outcome_for(status, &participation) {
                view.outcome = Some(outcome);
                groups.entry(outcome).or_default().push(view);
            }
        }
        Ok(groups)
    }
}
