use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub sync: SyncConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Timeout applied to every individual ledger read, in seconds.
    pub read_timeout_secs: u64,
    /// Maximum number of ledger reads in flight during one reconciliation pass.
    pub max_concurrent_reads: usize,
    /// How many reconciliation passes may fail in a row before the advisory
    /// status asks the UI to show a persistent error.
    pub failure_escalation_threshold: u32,
    pub auto_sync: bool,
    pub sync_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory for the on-disk cache. Empty string selects the platform
    /// data dir at runtime.
    pub data_dir: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sync: SyncConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            read_timeout_secs: 4,
            max_concurrent_reads: 8,
            failure_escalation_threshold: 3,
            auto_sync: false,
            sync_interval_secs: 300,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: String::new(),
        }
    }
}

impl SyncConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }
}
