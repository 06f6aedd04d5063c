//! Reconciles the local record store against the ledger.
//!
//! A pass serves the cached snapshot first, then validates every cached row
//! against the registry with bounded concurrency, prunes rows the ledger
//! explicitly disowns, folds in newly registered activities, and publishes
//! the settled list. Failure to reach the ledger leaves the cache untouched:
//! invalidation always requires an explicit negative answer, never the mere
//! absence of a positive one.

use crate::domain::entities::{sort_for_display, ActivityRecord, CachedEntry, ParticipationRecord};
use crate::domain::value_objects::{ContractAddress, UserAddress};
use crate::infrastructure::ledger::LedgerView;
use crate::infrastructure::storage::{LooseEntry, RecordStore};
use crate::shared::config::SyncConfig;
use crate::shared::error::Result;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Advisory status for the UI. A single failed pass stays silent; only a
/// streak at or past the escalation threshold should become a visible banner.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ReconcileStatus {
    pub is_reconciling: bool,
    pub last_success: Option<i64>,
    pub consecutive_failures: u32,
    pub last_error: Option<String>,
    pub escalated: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ReconcileReport {
    pub records: Vec<ActivityRecord>,
    pub removed: usize,
    pub refreshed: usize,
    pub merged_new: usize,
    pub unverified: usize,
    pub superseded: bool,
}

enum Validation {
    /// The ledger confirmed the row; carry the refreshed entry. `stale_key`
    /// is the key the row was cached under when it differs from the
    /// refreshed entry's key (an id-keyed row gaining its contract address);
    /// the old key is removed so the row migrates instead of duplicating.
    Valid {
        entry: Box<CachedEntry>,
        stale_key: Option<String>,
    },
    /// The ledger explicitly disowned the row.
    Invalid { key: String, reason: &'static str },
    /// Every read that could have settled the question failed; keep as-is.
    Unverified(Box<LooseEntry>),
}

pub struct ReconcileService {
    ledger: LedgerView,
    store: Arc<RecordStore>,
    config: SyncConfig,
    /// Bumped whenever the active user changes; passes started under an
    /// older generation discard their results instead of writing them into
    /// the new user's scope.
    generation: AtomicU64,
    active_user: RwLock<Option<UserAddress>>,
    status: RwLock<ReconcileStatus>,
    settled_tx: watch::Sender<Vec<ActivityRecord>>,
}

impl ReconcileService {
    pub fn new(ledger: LedgerView, store: Arc<RecordStore>, config: SyncConfig) -> Self {
        let (settled_tx, _) = watch::channel(Vec::new());
        Self {
            ledger,
            store,
            config,
            generation: AtomicU64::new(0),
            active_user: RwLock::new(None),
            status: RwLock::new(ReconcileStatus::default()),
            settled_tx,
        }
    }

    /// Cached view, served before any ledger traffic. Possibly stale.
    pub fn snapshot(&self, user: &UserAddress) -> Result<Vec<ActivityRecord>> {
        self.store.snapshot(user)
    }

    /// Observers get every settled (non-superseded, successful) list.
    pub fn subscribe(&self) -> watch::Receiver<Vec<ActivityRecord>> {
        self.settled_tx.subscribe()
    }

    pub async fn status(&self) -> ReconcileStatus {
        self.status.read().await.clone()
    }

    pub async fn set_active_user(&self, user: Option<UserAddress>) {
        let mut active = self.active_user.write().await;
        *active = user;
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub async fn active_user(&self) -> Option<UserAddress> {
        self.active_user.read().await.clone()
    }

    pub async fn reconcile(&self, user: &UserAddress) -> Result<ReconcileReport> {
        let pass = Uuid::new_v4();
        let generation = self.generation.load(Ordering::SeqCst);
        self.status.write().await.is_reconciling = true;

        let result = self.run_pass(user, pass, generation).await;

        let mut status = self.status.write().await;
        status.is_reconciling = false;
        match &result {
            Ok(report) if !report.superseded => {
                status.last_success = Some(chrono::Utc::now().timestamp());
                status.consecutive_failures = 0;
                status.last_error = None;
                status.escalated = false;
            }
            Ok(_) => {}
            Err(err) => {
                status.consecutive_failures += 1;
                status.last_error = Some(err.to_string());
                status.escalated =
                    status.consecutive_failures >= self.config.failure_escalation_threshold;
            }
        }
        drop(status);

        result
    }

    async fn run_pass(
        &self,
        user: &UserAddress,
        pass: Uuid,
        generation: u64,
    ) -> Result<ReconcileReport> {
        // An unreachable registry aborts the pass with the cache untouched.
        let total_count = self.ledger.total_count().await.map_err(|err| {
            warn!(%pass, %err, "total count read failed, leaving cache untouched");
            err
        })?;

        let entries = self.store.get_all(user)?;
        info!(%pass, %user, total_count, cached = entries.len(), "reconciling");

        let validations: Vec<Validation> = stream::iter(
            entries
                .into_iter()
                .map(|entry| self.validate_entry(entry, total_count, user)),
        )
        .buffer_unordered(self.config.max_concurrent_reads)
        .collect()
        .await;

        let mut removals: Vec<String> = Vec::new();
        let mut upserts: Vec<CachedEntry> = Vec::new();
        let mut kept: Vec<ActivityRecord> = Vec::new();
        let mut known_ids: HashSet<u64> = HashSet::new();
        let mut unverified = 0usize;
        let mut pruned = 0usize;

        for validation in validations {
            match validation {
                Validation::Valid { entry, stale_key } => {
                    known_ids.insert(entry.activity.id.get());
                    if let Some(old_key) = stale_key {
                        debug!(%pass, old_key, "re-keying row under its contract address");
                        removals.push(old_key);
                    }
                    upserts.push(*entry);
                }
                Validation::Invalid { key, reason } => {
                    debug!(%pass, key, reason, "pruning cache row");
                    pruned += 1;
                    removals.push(key);
                }
                Validation::Unverified(entry) => {
                    unverified += 1;
                    if let Some(id) = entry.id {
                        known_ids.insert(id);
                    }
                    if let Some(activity) = entry.activity {
                        kept.push(activity);
                    }
                }
            }
        }

        // Newly registered ids since the last pass.
        let fresh: Vec<ActivityRecord> = stream::iter(
            (1..=total_count)
                .filter(|id| !known_ids.contains(id))
                .map(|id| self.ledger.activity(id)),
        )
        .buffer_unordered(self.config.max_concurrent_reads)
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .filter_map(|read| match read {
            Ok(found) => found,
            Err(err) => {
                // Soft failure: the id will be retried next pass.
                debug!(%pass, %err, "skipping undiscoverable activity");
                None
            }
        })
        .collect();

        let removed = pruned;
        let refreshed = upserts.len();
        let merged_new = fresh.len();
        let now = chrono::Utc::now().timestamp();
        for activity in fresh {
            upserts.push(CachedEntry::new(activity, now));
        }

        // A pass started for a user who is no longer active must not touch
        // that scope; drop everything on the floor.
        if self.generation.load(Ordering::SeqCst) != generation {
            info!(%pass, %user, "pass superseded, discarding results");
            return Ok(ReconcileReport {
                superseded: true,
                ..ReconcileReport::default()
            });
        }

        self.store.apply_batch(user, &removals, &upserts)?;

        let mut records: Vec<ActivityRecord> =
            upserts.into_iter().map(|entry| entry.activity).collect();
        records.extend(kept);
        sort_for_display(&mut records);

        self.settled_tx.send_replace(records.clone());
        info!(
            %pass,
            removed,
            refreshed,
            merged_new,
            unverified,
            total = records.len(),
            "reconciliation settled"
        );

        Ok(ReconcileReport {
            records,
            removed,
            refreshed,
            merged_new,
            unverified,
            superseded: false,
        })
    }

    /// Decide one cached row's fate. Invalidation requires an explicit
    /// negative from the ledger; any read failure keeps the row.
    async fn validate_entry(
        &self,
        entry: LooseEntry,
        total_count: u64,
        user: &UserAddress,
    ) -> Validation {
        let key = entry.key.clone();

        // Nothing to verify against: malformed, gone.
        if entry.id.is_none() && entry.contract_address.is_none() {
            return Validation::Invalid {
                key,
                reason: "no id or contract address",
            };
        }

        if let Some(id) = entry.id {
            if id == 0 || id > total_count {
                return Validation::Invalid {
                    key,
                    reason: "id outside ledger range",
                };
            }
        }

        let address = match entry.contract_address.as_deref() {
            Some(raw) => match ContractAddress::new(raw.to_string()) {
                Ok(addr) if !addr.is_zero() => Some(addr),
                _ => {
                    // An unparseable or zero address with no id to fall back
                    // on cannot ever validate.
                    if entry.id.is_none() {
                        return Validation::Invalid {
                            key,
                            reason: "unusable contract address",
                        };
                    }
                    None
                }
            },
            None => None,
        };

        // Contract-to-id agreement; a redeployed registry no longer knows
        // old contracts.
        let mut effective_id = entry.id;
        if let Some(addr) = &address {
            match self.ledger.registered_id(addr).await {
                Ok(0) => {
                    return Validation::Invalid {
                        key,
                        reason: "contract not registered",
                    }
                }
                Ok(registered) => {
                    if let Some(id) = entry.id {
                        if registered != id {
                            return Validation::Invalid {
                                key,
                                reason: "registered id disagrees",
                            };
                        }
                    }
                    if registered > total_count {
                        return Validation::Invalid {
                            key,
                            reason: "registered id outside ledger range",
                        };
                    }
                    effective_id = Some(registered);
                }
                Err(err) => {
                    debug!(%err, key, "registered-id read failed, keeping row");
                    return Validation::Unverified(Box::new(entry));
                }
            }
        }

        let Some(id) = effective_id else {
            return Validation::Unverified(Box::new(entry));
        };

        let metadata = match self.ledger.activity(id).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                return Validation::Invalid {
                    key,
                    reason: "registry has no usable record for id",
                }
            }
            Err(err) => {
                debug!(%err, key, "metadata read failed, keeping row");
                return Validation::Unverified(Box::new(entry));
            }
        };

        if let Some(addr) = &address {
            if metadata.contract_address != *addr {
                return Validation::Invalid {
                    key,
                    reason: "contract address disagrees with registry",
                };
            }
        }

        // Refresh the participation snapshot, best effort. The remote read
        // is folded in with local mutation flags winning, so an optimistic
        // write from a just-confirmed transaction survives.
        let participation = match self
            .ledger
            .participation(&metadata.contract_address, user, metadata.incentive_kind)
            .await
        {
            Ok(remote) => {
                let local = entry.participation.unwrap_or_default();
                let merged = local.merged_with_remote(&remote);
                (merged != ParticipationRecord::default()).then_some(merged)
            }
            Err(err) => {
                debug!(%err, key, "participation read failed, keeping local snapshot");
                entry.participation
            }
        };

        let mut refreshed = CachedEntry::new(metadata, chrono::Utc::now().timestamp());
        refreshed.participation = participation;
        let stale_key = (refreshed.key() != key).then_some(key);
        Validation::Valid {
            entry: Box::new(refreshed),
            stale_key,
        }
    }

    /// Periodic refresh for the active user, in the background.
    pub fn schedule(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let service = Arc::clone(self);
        let interval_secs = service.config.sync_interval_secs;
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(tokio::time::Duration::from_secs(interval_secs));
            loop {
                interval.tick().await;
                let Some(user) = service.active_user().await else {
                    continue;
                };
                if let Err(err) = service.reconcile(&user).await {
                    // Transient by policy; the status snapshot decides when
                    // the UI escalates.
                    warn!(%err, "scheduled reconciliation failed");
                }
            }
        })
    }
}
