use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::*;
use crate::error::Result;

pub mod announcement_repository;
pub mod document_repository;
pub mod leave_request_repository;
pub mod user_repository;

pub use announcement_repository::SqliteAnnouncementRepository;
pub use document_repository::SqliteDocumentRepository;
pub use leave_request_repository::SqliteLeaveRequestRepository;
pub use user_repository::SqliteUserRepository;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: User) -> Result<User>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
}

#[async_trait]
pub trait AnnouncementRepository: Send + Sync {
    async fn create(&self, announcement: Announcement) -> Result<Announcement>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Announcement>>;
    /// Newest-created-first, pre-filtered by the caller's visibility scope.
    async fn list(&self, filter: &AnnouncementFilter) -> Result<Vec<Announcement>>;
    async fn update(&self, id: Uuid, announcement: Announcement) -> Result<Announcement>;
    async fn delete(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait DocumentRepository: Send + Sync {
    async fn create(&self, document: Document) -> Result<Document>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Document>>;
    async fn list(&self, filter: &DocumentFilter) -> Result<Vec<Document>>;
    async fn update(&self, id: Uuid, document: Document) -> Result<Document>;
    async fn delete(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait LeaveRequestRepository: Send + Sync {
    async fn create(&self, request: LeaveRequest) -> Result<LeaveRequest>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<LeaveRequest>>;
    async fn list(&self, filter: &LeaveRequestFilter) -> Result<Vec<LeaveRequest>>;
    async fn update(&self, id: Uuid, request: LeaveRequest) -> Result<LeaveRequest>;
    /// Write the review transition only if the request is still pending.
    /// Returns whether the write landed; a `false` means some other review
    /// got there first (or the row is gone) and the caller must re-read.
    async fn review(
        &self,
        id: Uuid,
        status: LeaveStatus,
        reviewed_by: Uuid,
        review_date: DateTime<Utc>,
        comments: Option<String>,
    ) -> Result<bool>;
    async fn delete(&self, id: Uuid) -> Result<()>;
}
