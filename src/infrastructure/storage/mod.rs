pub mod file_storage;
pub mod memory_storage;
pub mod record_store;

pub use file_storage::FileStorage;
pub use memory_storage::MemoryStorage;
pub use record_store::{LooseEntry, RecordStore, StoredActivity};
