pub mod announcement_service;
pub mod document_service;
pub mod leave_request_service;

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::AuthService;
use crate::blob::BlobStore;
use crate::config::Settings;
use crate::repository::*;

pub use announcement_service::AnnouncementService;
pub use document_service::DocumentService;
pub use leave_request_service::LeaveRequestService;

/// Wires the lifecycle managers, identity provider, and blob store for an
/// embedding application.
pub struct ServiceContext {
    pub announcements: AnnouncementService,
    pub documents: DocumentService,
    pub leave_requests: LeaveRequestService,
    pub auth_service: Arc<AuthService>,
    pub db_pool: SqlitePool,
}

impl ServiceContext {
    pub fn new(db_pool: SqlitePool, blob_store: Arc<dyn BlobStore>, settings: &Settings) -> Self {
        let announcement_repo = Arc::new(SqliteAnnouncementRepository::new(db_pool.clone()));
        let document_repo = Arc::new(SqliteDocumentRepository::new(db_pool.clone()));
        let leave_request_repo = Arc::new(SqliteLeaveRequestRepository::new(db_pool.clone()));

        let auth_service = Arc::new(AuthService::new(
            db_pool.clone(),
            settings.auth.session_duration_hours,
        ));

        Self {
            announcements: AnnouncementService::new(announcement_repo),
            documents: DocumentService::new(document_repo, blob_store.clone()),
            leave_requests: LeaveRequestService::new(leave_request_repo, blob_store),
            auth_service,
            db_pool,
        }
    }
}
