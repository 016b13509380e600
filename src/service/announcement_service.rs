use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    domain::{Announcement, AnnouncementFilter, Priority, Principal, Role},
    error::{AppError, Result},
    policy,
    repository::AnnouncementRepository,
    validation::{validate_announcement, AnnouncementInput},
};

/// Roles allowed to create, edit, and delete announcements.
const AUTHOR_ROLES: &[Role] = &[Role::Hod, Role::Faculty];

pub struct AnnouncementService {
    repo: Arc<dyn AnnouncementRepository>,
}

impl AnnouncementService {
    pub fn new(repo: Arc<dyn AnnouncementRepository>) -> Self {
        Self { repo }
    }

    /// List announcements visible to the principal, newest first. Students
    /// only see announcements addressed to them or to everyone.
    pub async fn list(
        &self,
        principal: Option<&Principal>,
        priority: Option<Priority>,
    ) -> Result<Vec<Announcement>> {
        let principal = policy::require_authenticated(principal)?;

        let filter = AnnouncementFilter {
            audience: (principal.role == Role::User).then_some(Role::User),
            priority,
        };
        self.repo.list(&filter).await
    }

    pub async fn fetch(&self, principal: Option<&Principal>, id: Uuid) -> Result<Announcement> {
        let principal = policy::require_authenticated(principal)?;

        let announcement = self.load(id).await?;
        // An announcement outside the caller's audience is reported as
        // missing, not forbidden.
        if !policy::can_view_announcement(principal, &announcement) {
            return Err(not_found());
        }
        Ok(announcement)
    }

    pub async fn create(
        &self,
        principal: Option<&Principal>,
        input: AnnouncementInput,
    ) -> Result<Announcement> {
        let principal = policy::require_authenticated(principal)?;
        policy::require_role(principal, AUTHOR_ROLES).require()?;

        let fields = validate_announcement(input)?;
        let now = Utc::now();

        self.repo
            .create(Announcement {
                id: Uuid::new_v4(),
                title: fields.title,
                body: fields.body,
                target_role: fields.target_role,
                priority: fields.priority,
                created_by: principal.id,
                created_at: now,
                updated_at: now,
            })
            .await
    }

    pub async fn update(
        &self,
        principal: Option<&Principal>,
        id: Uuid,
        input: AnnouncementInput,
    ) -> Result<Announcement> {
        let principal = policy::require_authenticated(principal)?;
        policy::require_role(principal, AUTHOR_ROLES).require()?;

        let fields = validate_announcement(input)?;

        let mut announcement = self.load(id).await?;
        policy::edit_announcement(principal, &announcement).require()?;

        announcement.title = fields.title;
        announcement.body = fields.body;
        announcement.target_role = fields.target_role;
        announcement.priority = fields.priority;

        self.repo.update(id, announcement).await
    }

    pub async fn delete(&self, principal: Option<&Principal>, id: Uuid) -> Result<()> {
        let principal = policy::require_authenticated(principal)?;
        policy::require_role(principal, AUTHOR_ROLES).require()?;

        let announcement = self.load(id).await?;
        policy::edit_announcement(principal, &announcement).require()?;

        self.repo.delete(id).await
    }

    async fn load(&self, id: Uuid) -> Result<Announcement> {
        self.repo.find_by_id(id).await?.ok_or_else(not_found)
    }
}

fn not_found() -> AppError {
    AppError::NotFound("Announcement not found!".to_string())
}
