pub mod entities;
pub mod services;
pub mod value_objects;

pub use entities::{
    ActivityRecord, CachedEntry, IncentiveKind, LifecycleStatus, ParticipationRecord,
    RoundCounters, Visibility,
};
pub use value_objects::{ActivityId, CheckInRound, ContractAddress, UserAddress};
