//! Display-only classification of activities. Two orthogonal groupings apply
//! to every record: a themed bucket derived from the description text (with
//! the incentive kind as fallback), and an outcome group derived from
//! lifecycle plus participation. Neither affects correctness of the cache.

use crate::domain::entities::{ActivityRecord, IncentiveKind, LifecycleStatus, ParticipationRecord};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayBucket {
    Professional,
    Lifestyle,
    Wealth,
    Uncategorized,
}

/// Partition by lifecycle + participation outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeGroup {
    InProgress,
    Completed,
    Eliminated,
}

/// Ordered keyword groups; the first group with a hit wins. Keywords are
/// matched case-insensitively as substrings of the description.
const KEYWORD_GROUPS: &[(DisplayBucket, &[&str])] = &[
    (
        DisplayBucket::Professional,
        &["团队", "比赛", "竞赛", "职业", "team", "match", "league", "contest"],
    ),
    (
        DisplayBucket::Lifestyle,
        &["打卡", "健康", "运动", "健身", "habit", "daily", "fitness", "workout"],
    ),
    (
        DisplayBucket::Wealth,
        &["存款", "理财", "储蓄", "saving", "deposit", "stake", "budget"],
    ),
];

impl IncentiveKind {
    /// Bucket used when no description keyword matches.
    pub fn fallback_bucket(&self) -> DisplayBucket {
        match self {
            IncentiveKind::DepositPool => DisplayBucket::Wealth,
            IncentiveKind::NftPool => DisplayBucket::Lifestyle,
        }
    }
}

pub fn bucket_for(description: &str, kind: Option<IncentiveKind>) -> DisplayBucket {
    let haystack = description.to_lowercase();
    for (bucket, keywords) in KEYWORD_GROUPS {
        if keywords.iter().any(|kw| haystack.contains(kw)) {
            return *bucket;
        }
    }
    match kind {
        Some(kind) => kind.fallback_bucket(),
        None => DisplayBucket::Uncategorized,
    }
}

pub fn bucket_for_record(record: &ActivityRecord) -> DisplayBucket {
    bucket_for(&record.description, Some(record.incentive_kind))
}

/// `None` means the record belongs to no outcome group (e.g. settled without
/// the user ever completing, or never joined).
pub fn outcome_for(
    status: LifecycleStatus,
    participation: &ParticipationRecord,
) -> Option<OutcomeGroup> {
    if participation.eliminated {
        return Some(OutcomeGroup::Eliminated);
    }
    if status == LifecycleStatus::Settled && participation.is_completed {
        return Some(OutcomeGroup::Completed);
    }
    if participation.joined
        && matches!(status, LifecycleStatus::Scheduled | LifecycleStatus::Active)
    {
        return Some(OutcomeGroup::InProgress);
    }
    None
}
