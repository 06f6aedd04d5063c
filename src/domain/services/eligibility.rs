//! Check-in eligibility, derived purely from a participation record and the
//! contract's round counters. No ledger access happens here; callers pass
//! `None` for counters they could not read and get the all-negative result.

use crate::domain::entities::{LifecycleStatus, ParticipationRecord, RoundCounters};
use crate::domain::value_objects::CheckInRound;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInEligibility {
    pub is_today_checked_in: bool,
    pub can_check_in: bool,
    pub consecutive_days: u64,
}

pub fn evaluate(
    participation: &ParticipationRecord,
    counters: Option<&RoundCounters>,
    status: LifecycleStatus,
) -> CheckInEligibility {
    // Never guess: unreadable counters mean not eligible, zero streak.
    let Some(counters) = counters else {
        return CheckInEligibility::default();
    };

    let is_today_checked_in = participation.joined
        && match participation.last_check_in_round {
            CheckInRound::Never => false,
            CheckInRound::Round(last) => last == counters.current_round,
        };

    let round_allows = match participation.last_check_in_round {
        // First-ever check-in only lands in the first round.
        CheckInRound::Never => counters.current_round == 0,
        // Behind is fine (catch up), ahead or same-round is not.
        CheckInRound::Round(last) => last < counters.current_round,
    };

    let can_check_in = status == LifecycleStatus::Active
        && participation.joined
        && !participation.eliminated
        && !counters.is_exhausted()
        && !is_today_checked_in
        && round_allows;

    // The streak counts completed check-ins; the round index is 0-based.
    let consecutive_days = match participation.last_check_in_round {
        CheckInRound::Never => 0,
        CheckInRound::Round(last) => last + 1,
    };

    CheckInEligibility {
        is_today_checked_in,
        can_check_in,
        consecutive_days,
    }
}
