pub mod activity;
pub mod cached_entry;
pub mod participation;

pub use activity::{sort_for_display, ActivityRecord, IncentiveKind, LifecycleStatus, Visibility};
pub use cached_entry::{entry_key, CachedEntry};
pub use participation::{ParticipationRecord, RoundCounters};
