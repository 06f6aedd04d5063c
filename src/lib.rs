//! Client-side reconciliation core for on-chain check-in activities.
//!
//! The crate keeps a local cache of activity records and per-user
//! participation snapshots, serves it instantly, and continuously reconciles
//! it against the authoritative on-chain registry through an injected
//! [`LedgerReader`]. The cache is advisory: reads fail open, invalidation
//! requires an explicit negative answer from the ledger, and user-confirmed
//! mutations are merged so they survive racing refreshes.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;
pub mod state;

pub use application::ports::{LedgerReader, RawActivityMetadata, RawParticipation, StorageBackend};
pub use application::services::{
    ActivityService, ActivityView, ReconcileReport, ReconcileService, ReconcileStatus,
};
pub use domain::entities::{
    ActivityRecord, CachedEntry, IncentiveKind, LifecycleStatus, ParticipationRecord,
    RoundCounters, Visibility,
};
pub use domain::services::{CheckInEligibility, DisplayBucket, OutcomeGroup};
pub use domain::value_objects::{ActivityId, CheckInRound, ContractAddress, UserAddress};
pub use shared::config::AppConfig;
pub use shared::error::{AppError, Result};
pub use state::AppState;

pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "habitpool=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
