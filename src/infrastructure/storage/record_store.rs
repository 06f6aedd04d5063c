//! The local record store: one global collection of known activities plus a
//! per-user collection of participation snapshots, both persisted through the
//! injected `StorageBackend` on every mutation.
//!
//! Rows are stored loose (every field optional or defaulted) because the
//! cache may hold records written by older builds or left behind by a
//! redeployed ledger; parsing into domain types happens on read and a row
//! that fails to parse is surfaced as-is so the reconciler can prune it.

use crate::application::ports::StorageBackend;
use crate::domain::entities::{
    entry_key, sort_for_display, ActivityRecord, CachedEntry, IncentiveKind, ParticipationRecord,
    Visibility,
};
use crate::domain::value_objects::{ActivityId, ContractAddress, UserAddress};
use crate::shared::decimal;
use crate::shared::error::{AppError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::warn;

const ACTIVITIES_KEY: &str = "habitpool/activities";

fn participations_key(user: &UserAddress) -> String {
    format!("habitpool/participations/{user}")
}

/// Persisted activity row. Deliberately loose; see module docs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StoredActivity {
    #[serde(default, with = "decimal::opt")]
    pub id: Option<u64>,
    #[serde(default)]
    pub contract_address: Option<String>,
    #[serde(default)]
    pub creator_address: String,
    #[serde(default)]
    pub creator_display_name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, with = "decimal::opt")]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub visibility: Option<Visibility>,
    #[serde(default)]
    pub incentive_kind: Option<IncentiveKind>,
    #[serde(default, with = "decimal::opt")]
    pub last_validated_at: Option<i64>,
}

impl StoredActivity {
    pub fn from_record(record: &ActivityRecord, validated_at: i64) -> Self {
        Self {
            id: Some(record.id.get()),
            contract_address: Some(record.contract_address.as_str().to_string()),
            creator_address: record.creator_address.as_str().to_string(),
            creator_display_name: record.creator_display_name.clone(),
            title: record.title.clone(),
            description: record.description.clone(),
            created_at: Some(record.created_at),
            visibility: Some(record.visibility),
            incentive_kind: Some(record.incentive_kind),
            last_validated_at: Some(validated_at),
        }
    }

    /// Parse into a full domain record; `None` when any required field is
    /// missing or malformed.
    pub fn parse(&self) -> Option<ActivityRecord> {
        Some(ActivityRecord {
            id: ActivityId::new(self.id?).ok()?,
            contract_address: ContractAddress::new(self.contract_address.clone()?).ok()?,
            creator_address: UserAddress::new(self.creator_address.clone()).ok()?,
            creator_display_name: self.creator_display_name.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            created_at: self.created_at?,
            visibility: self.visibility?,
            incentive_kind: self.incentive_kind?,
        })
    }

    pub fn key(&self) -> Option<String> {
        entry_key(self.contract_address.as_deref(), self.id)
    }
}

/// A cache row as handed to the reconciler: raw identity fields plus the
/// parsed record when the row is well formed.
#[derive(Debug, Clone)]
pub struct LooseEntry {
    pub key: String,
    pub id: Option<u64>,
    pub contract_address: Option<String>,
    pub activity: Option<ActivityRecord>,
    pub participation: Option<ParticipationRecord>,
    pub last_validated_at: Option<i64>,
}

pub struct RecordStore {
    backend: Arc<dyn StorageBackend>,
    /// Every mutation is a read-modify-write over the backend; the backend
    /// only guarantees atomicity per call, so writers must not interleave.
    write_lock: Mutex<()>,
}

impl RecordStore {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            backend,
            write_lock: Mutex::new(()),
        }
    }

    fn lock_writes(&self) -> Result<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| AppError::Storage("record store write lock poisoned".to_string()))
    }

    fn read_map<T: DeserializeOwned>(&self, key: &str) -> Result<BTreeMap<String, T>> {
        let Some(bytes) = self.backend.get(key)? else {
            return Ok(BTreeMap::new());
        };
        match serde_json::from_slice(&bytes) {
            Ok(map) => Ok(map),
            Err(err) => {
                // Corrupt persisted bytes degrade to an empty collection; the
                // next reconciliation repopulates it from the ledger.
                warn!(key, %err, "discarding unreadable cache collection");
                Ok(BTreeMap::new())
            }
        }
    }

    fn write_map<T: Serialize>(&self, key: &str, map: &BTreeMap<String, T>) -> Result<()> {
        let bytes = serde_json::to_vec(map)?;
        self.backend.set(key, &bytes)
    }

    /// Every cache row relevant to `user`: all known activities joined with
    /// the user's participation snapshots, plus orphan participation rows
    /// whose activity is gone (the reconciler decides their fate).
    pub fn get_all(&self, user: &UserAddress) -> Result<Vec<LooseEntry>> {
        let activities: BTreeMap<String, StoredActivity> = self.read_map(ACTIVITIES_KEY)?;
        let mut participations: BTreeMap<String, ParticipationRecord> =
            self.read_map(&participations_key(user))?;

        let mut entries = Vec::with_capacity(activities.len());
        for (key, row) in activities {
            let participation = participations.remove(&key);
            entries.push(LooseEntry {
                key,
                id: row.id,
                contract_address: row.contract_address.clone(),
                activity: row.parse(),
                participation,
                last_validated_at: row.last_validated_at,
            });
        }

        // Orphans: participation without a matching activity row.
        for (key, participation) in participations {
            let contract_address = key.starts_with("0x").then(|| key.clone());
            let id = key.parse::<u64>().ok();
            entries.push(LooseEntry {
                key,
                id,
                contract_address,
                activity: None,
                participation: Some(participation),
                last_validated_at: None,
            });
        }

        Ok(entries)
    }

    /// Fast path for display: only the rows that parse, newest first.
    pub fn snapshot(&self, user: &UserAddress) -> Result<Vec<ActivityRecord>> {
        let mut records: Vec<ActivityRecord> = self
            .get_all(user)?
            .into_iter()
            .filter_map(|entry| entry.activity)
            .collect();
        sort_for_display(&mut records);
        Ok(records)
    }

    pub fn participation(
        &self,
        user: &UserAddress,
        key: &str,
    ) -> Result<Option<ParticipationRecord>> {
        let participations: BTreeMap<String, ParticipationRecord> =
            self.read_map(&participations_key(user))?;
        Ok(participations.get(key).copied())
    }

    /// Insert or update one entry. Participation is merged, never replaced,
    /// so a write racing with a reconciliation pass cannot lose flags.
    pub fn upsert(&self, user: &UserAddress, entry: &CachedEntry) -> Result<()> {
        let _guard = self.lock_writes()?;
        let key = entry.key();

        let mut activities: BTreeMap<String, StoredActivity> = self.read_map(ACTIVITIES_KEY)?;
        activities.insert(
            key.clone(),
            StoredActivity::from_record(&entry.activity, entry.last_validated_at),
        );
        self.write_map(ACTIVITIES_KEY, &activities)?;

        if let Some(participation) = entry.participation {
            self.merge_participation(user, &key, participation)?;
        }
        Ok(())
    }

    /// User-action write path: merge a participation snapshot under `key`.
    pub fn upsert_participation(
        &self,
        user: &UserAddress,
        key: &str,
        participation: ParticipationRecord,
    ) -> Result<()> {
        let _guard = self.lock_writes()?;
        self.merge_participation(user, key, participation)
    }

    /// Caller must hold the write lock.
    fn merge_participation(
        &self,
        user: &UserAddress,
        key: &str,
        participation: ParticipationRecord,
    ) -> Result<()> {
        let storage_key = participations_key(user);
        let mut participations: BTreeMap<String, ParticipationRecord> =
            self.read_map(&storage_key)?;
        let merged = match participations.get(key) {
            Some(existing) => existing.or_merge(&participation),
            None => participation,
        };
        participations.insert(key.to_string(), merged);
        self.write_map(&storage_key, &participations)
    }

    pub fn remove(&self, user: &UserAddress, key: &str) -> Result<()> {
        self.apply_batch(user, &[key.to_string()], &[])?;
        Ok(())
    }

    /// Remove every row whose key satisfies the predicate.
    pub fn remove_all<F>(&self, user: &UserAddress, predicate: F) -> Result<usize>
    where
        F: Fn(&str) -> bool,
    {
        let _guard = self.lock_writes()?;
        let activities: BTreeMap<String, StoredActivity> = self.read_map(ACTIVITIES_KEY)?;
        let participations: BTreeMap<String, ParticipationRecord> =
            self.read_map(&participations_key(user))?;
        let removals: Vec<String> = activities
            .keys()
            .chain(participations.keys())
            .filter(|key| predicate(key))
            .cloned()
            .collect();
        let count = removals.len();
        self.apply_batch_locked(user, &removals, &[])?;
        Ok(count)
    }

    /// One batched mutation: delete `removals`, then merge in `upserts`.
    /// Each collection is written at most once, and not at all when nothing
    /// changed, so an idempotent reconciliation is also write-free.
    pub fn apply_batch(
        &self,
        user: &UserAddress,
        removals: &[String],
        upserts: &[CachedEntry],
    ) -> Result<bool> {
        let _guard = self.lock_writes()?;
        self.apply_batch_locked(user, removals, upserts)
    }

    /// Caller must hold the write lock.
    fn apply_batch_locked(
        &self,
        user: &UserAddress,
        removals: &[String],
        upserts: &[CachedEntry],
    ) -> Result<bool> {
        let mut activities: BTreeMap<String, StoredActivity> = self.read_map(ACTIVITIES_KEY)?;
        let storage_key = participations_key(user);
        let mut participations: BTreeMap<String, ParticipationRecord> =
            self.read_map(&storage_key)?;

        let before_activities = activities.clone();
        let before_participations = participations.clone();

        for key in removals {
            activities.remove(key);
            participations.remove(key);
        }

        for entry in upserts {
            let key = entry.key();
            let mut row = StoredActivity::from_record(&entry.activity, entry.last_validated_at);
            // A row whose content is unchanged keeps its old validation
            // stamp, so a no-op reconciliation stays write-free.
            if let Some(existing) = activities.get(&key) {
                let mut existing_restamped = existing.clone();
                existing_restamped.last_validated_at = row.last_validated_at;
                if existing_restamped == row {
                    row.last_validated_at = existing.last_validated_at;
                }
            }
            activities.insert(key.clone(), row);
            if let Some(participation) = entry.participation {
                let merged = match participations.get(&key) {
                    Some(existing) => existing.or_merge(&participation),
                    None => participation,
                };
                participations.insert(key, merged);
            }
        }

        let mut changed = false;
        if activities != before_activities {
            self.write_map(ACTIVITIES_KEY, &activities)?;
            changed = true;
        }
        if participations != before_participations {
            self.write_map(&storage_key, &participations)?;
            changed = true;
        }
        Ok(changed)
    }
}
