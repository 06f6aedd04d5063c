pub mod activity_service;
pub mod reconcile_service;

pub use activity_service::{ActivityService, ActivityView};
pub use reconcile_service::{ReconcileReport, ReconcileService, ReconcileStatus};
