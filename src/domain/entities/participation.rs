use super::activity::LifecycleStatus;
use crate::domain::value_objects::CheckInRound;
use serde::{Deserialize, Serialize};

/// Per-user participation state read from a per-activity contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipationRecord {
    pub joined: bool,
    pub eliminated: bool,
    pub last_check_in_round: CheckInRound,
    pub reward_claimed: bool,
    pub is_winner: bool,
    pub has_checked_in_ever: bool,
    pub is_completed: bool,
}

impl Default for ParticipationRecord {
    fn default() -> Self {
        Self {
            joined: false,
            eliminated: false,
            last_check_in_round: CheckInRound::Never,
            reward_claimed: false,
            is_winner: false,
            has_checked_in_ever: false,
            is_completed: false,
        }
    }
}

impl ParticipationRecord {
    /// Fold a freshly read remote record into a locally cached one.
    ///
    /// The remote read is authoritative for outcome flags, but a local write
    /// made right after a confirmed transaction may be ahead of a
    /// reconciliation pass that started before the transaction landed, so
    /// locally known mutation flags and the further-progressed round counter
    /// win the merge.
    pub fn merged_with_remote(&self, remote: &ParticipationRecord) -> ParticipationRecord {
        ParticipationRecord {
            joined: self.joined || remote.joined,
            eliminated: remote.eliminated,
            last_check_in_round: self.last_check_in_round.later(remote.last_check_in_round),
            reward_claimed: self.reward_claimed || remote.reward_claimed,
            is_winner: remote.is_winner,
            has_checked_in_ever: self.has_checked_in_ever || remote.has_checked_in_ever,
            is_completed: remote.is_completed,
        }
    }

    /// Flag-union merge for two locally held snapshots of the same
    /// participation. Used by the store's read-modify-write path, where
    /// neither side may lose a mutation the other has already seen.
    pub fn or_merge(&self, other: &ParticipationRecord) -> ParticipationRecord {
        ParticipationRecord {
            joined: self.joined || other.joined,
            eliminated: self.eliminated || other.eliminated,
            last_check_in_round: self.last_check_in_round.later(other.last_check_in_round),
            reward_claimed: self.reward_claimed || other.reward_claimed,
            is_winner: self.is_winner || other.is_winner,
            has_checked_in_ever: self.has_checked_in_ever || other.has_checked_in_ever,
            is_completed: self.is_completed || other.is_completed,
        }
    }
}

/// Round counters read from a per-activity contract.
///
/// `current_round` is 0-based; while the activity is Active it stays below
/// `total_rounds`. A current round at or past the total means the activity is
/// over even if the lifecycle flag has not caught up yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundCounters {
    pub current_round: u64,
    pub total_rounds: u64,
}

impl RoundCounters {
    pub fn is_exhausted(&self) -> bool {
        self.current_round >= self.total_rounds
    }

    /// The contract's lifecycle flag can lag the counters; exhausted rounds
    /// override it.
    pub fn effective_status(&self, flag: LifecycleStatus) -> LifecycleStatus {
        if self.is_exhausted() {
            LifecycleStatus::Settled
        } else {
            flag
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_keeps_local_mutation_flags() {
        let local = ParticipationRecord {
            joined: true,
            has_checked_in_ever: true,
            last_check_in_round: CheckInRound::Round(4),
            ..ParticipationRecord::default()
        };
        // Stale remote read from before the join confirmed.
        let remote = ParticipationRecord::default();

        let merged = local.merged_with_remote(&remote);
        assert!(merged.joined);
        assert!(merged.has_checked_in_ever);
        assert_eq!(merged.last_check_in_round, CheckInRound::Round(4));
    }

    #[test]
    fn merge_takes_remote_outcome_flags() {
        let local = ParticipationRecord {
            joined: true,
            ..ParticipationRecord::default()
        };
        let remote = ParticipationRecord {
            joined: true,
            eliminated: true,
            is_winner: false,
            is_completed: true,
            last_check_in_round: CheckInRound::Round(6),
            has_checked_in_ever: true,
            ..ParticipationRecord::default()
        };

        let merged = local.merged_with_remote(&remote);
        assert!(merged.eliminated);
        assert!(merged.is_completed);
        assert_eq!(merged.last_check_in_round, CheckInRound::Round(6));
    }

    #[test]
    fn or_merge_unions_flags_and_takes_the_later_round() {
        let a = ParticipationRecord {
            joined: true,
            last_check_in_round: CheckInRound::Round(1),
            has_checked_in_ever: true,
            ..ParticipationRecord::default()
        };
        let b = ParticipationRecord {
            reward_claimed: true,
            last_check_in_round: CheckInRound::Round(3),
            has_checked_in_ever: true,
            ..ParticipationRecord::default()
        };
        let merged = a.or_merge(&b);
        assert!(merged.joined);
        assert!(merged.reward_claimed);
        assert_eq!(merged.last_check_in_round, CheckInRound::Round(3));
    }

    #[test]
    fn exhausted_counters_override_a_lagging_flag() {
        let counters = RoundCounters {
            current_round: 5,
            total_rounds: 5,
        };
        assert_eq!(
            counters.effective_status(LifecycleStatus::Active),
            LifecycleStatus::Settled
        );
        let running = RoundCounters {
            current_round: 2,
            total_rounds: 5,
        };
        assert_eq!(
            running.effective_status(LifecycleStatus::Active),
            LifecycleStatus::Active
        );
    }

    #[test]
    fn exhausted_counters_mean_settled() {
        assert!(RoundCounters {
            current_round: 5,
            total_rounds: 5
        }
        .is_exhausted());
        assert!(!RoundCounters {
            current_round: 4,
            total_rounds: 5
        }
        .is_exhausted());
    }
}
