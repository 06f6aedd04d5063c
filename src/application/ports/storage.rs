//! Persistence substrate boundary: a synchronous key-value byte store.
//!
//! The core defines only the logical schema on top of this (collections
//! serialized as JSON, one global plus one per user); the substrate is
//! whatever the host platform provides.

use crate::shared::error::AppError;

pub trait StorageBackend: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, AppError>;
    fn set(&self, key: &str, bytes: &[u8]) -> Result<(), AppError>;
    fn remove(&self, key: &str) -> Result<(), AppError>;
}
