pub mod config;
pub mod decimal;
pub mod error;

pub use config::{AppConfig, StorageConfig, SyncConfig};
pub use error::{AppError, Result};
