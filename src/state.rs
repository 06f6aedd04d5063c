use crate::application::services::{ActivityService, ReconcileService};
use crate::application::ports::{LedgerReader, StorageBackend};
use crate::domain::value_objects::UserAddress;
use crate::infrastructure::ledger::LedgerView;
use crate::infrastructure::storage::{FileStorage, RecordStore};
use crate::shared::config::AppConfig;
use std::sync::Arc;

/// Application-wide state: the wired-up services plus their shared store.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<RecordStore>,
    pub reconciler: Arc<ReconcileService>,
    pub activities: Arc<ActivityService>,
}

impl AppState {
    /// Wire the default stack: file-backed store, injected ledger reader.
    pub fn new(config: AppConfig, reader: Arc<dyn LedgerReader>) -> anyhow::Result<Self> {
        let backend: Arc<dyn StorageBackend> = Arc::new(FileStorage::new(&config.storage)?);
        Ok(Self::with_backend(config, reader, backend))
    }

    /// Wiring with an explicit storage backend, used by tests and embedders.
    pub fn with_backend(
        config: AppConfig,
        reader: Arc<dyn LedgerReader>,
        backend: Arc<dyn StorageBackend>,
    ) -> Self {
        let store = Arc::new(RecordStore::new(backend));
        let ledger = LedgerView::new(reader, config.sync.read_timeout());
        let reconciler = Arc::new(ReconcileService::new(
            ledger.clone(),
            store.clone(),
            config.sync.clone(),
        ));
        let activities = Arc::new(ActivityService::new(ledger, store.clone()));
        Self {
            config,
            store,
            reconciler,
            activities,
        }
    }

    /// Switch the active user. In-flight reconciliation passes for the
    /// previous user discard their results; with auto-sync enabled the next
    /// scheduled tick refreshes the new user's scope.
    pub async fn set_active_user(&self, user: Option<UserAddress>) {
        self.reconciler.set_active_user(user).await;
    }

    /// Start the periodic refresh loop when the config asks for one.
    pub fn start_background_sync(&self) -> Option<tokio::task::JoinHandle<()>> {
        self.config
            .sync
            .auto_sync
            .then(|| self.reconciler.schedule())
    }
}
