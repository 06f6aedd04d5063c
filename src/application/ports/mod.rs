pub mod ledger;
pub mod storage;

pub use ledger::{LedgerReader, RawActivityMetadata, RawParticipation};
pub use storage::StorageBackend;
