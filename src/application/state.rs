use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::CONFIG;
use crate::services::notification::NotificationService;
use crate::services::questionnaire::{DbDraftStore, SharedDraftStore};

/// Database connection type alias
pub type DbConn = DatabaseConnection;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub db: DbConn,
    pub notification: NotificationService,
    pub drafts: SharedDraftStore,
}

impl AppState {
    /// State for a running server: drafts in the database, channels from config
    pub fn new(db: DbConn) -> Self {
        let drafts: SharedDraftStore = Arc::new(DbDraftStore::new(db.clone(), CONFIG.drafts.ttl()));
        Self {
            notification: NotificationService::from_config(&CONFIG.notifications),
            drafts,
            db,
        }
    }

    pub fn with_parts(
        db: DbConn,
        notification: NotificationService,
        drafts: SharedDraftStore,
    ) -> Self {
        Self {
            db,
            notification,
            drafts,
        }
    }
}
