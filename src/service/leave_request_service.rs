use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    blob::{BlobStore, Download, UploadedFile},
    domain::{
        LeaveRequest, LeaveRequestFilter, LeaveStatus, Principal, ReviewDecision, Role,
    },
    error::{AppError, Result},
    policy,
    repository::LeaveRequestRepository,
    validation::{validate_leave_request, validate_review_comments, LeaveRequestInput},
};

const REVIEWER_ROLES: &[Role] = &[Role::Hod, Role::Faculty];

pub struct LeaveRequestService {
    repo: Arc<dyn LeaveRequestRepository>,
    blobs: Arc<dyn BlobStore>,
}

impl LeaveRequestService {
    pub fn new(repo: Arc<dyn LeaveRequestRepository>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { repo, blobs }
    }

    /// List leave requests in the principal's scope, newest first: students
    /// see their own, faculty the ones assigned to them, the hod everything.
    pub async fn list(
        &self,
        principal: Option<&Principal>,
        status: Option<LeaveStatus>,
    ) -> Result<Vec<LeaveRequest>> {
        let principal = policy::require_authenticated(principal)?;

        let mut filter = LeaveRequestFilter {
            status,
            ..Default::default()
        };
        match principal.role {
            Role::User => filter.requested_by = Some(principal.id),
            Role::Faculty => filter.class_teacher = Some(principal.username.clone()),
            Role::Hod => {}
        }

        self.repo.list(&filter).await
    }

    pub async fn fetch(&self, principal: Option<&Principal>, id: Uuid) -> Result<LeaveRequest> {
        let principal = policy::require_authenticated(principal)?;

        let request = self.load(id).await?;
        // Requests outside the caller's scope are reported as missing.
        if !policy::can_view_leave_request(principal, &request) {
            return Err(not_found());
        }
        Ok(request)
    }

    /// Submit a new leave request. Students only; starts out pending.
    pub async fn create(
        &self,
        principal: Option<&Principal>,
        input: LeaveRequestInput,
        attachment: Option<UploadedFile>,
    ) -> Result<LeaveRequest> {
        let principal = policy::require_authenticated(principal)?;
        policy::require_role(principal, &[Role::User]).require()?;

        let fields = validate_leave_request(input, Utc::now())?;

        let (attachment_ref, attachment_name) = match attachment {
            Some(file) => {
                let blob = self.blobs.store(&file.file_name, &file.data).await?;
                (Some(blob), Some(file.file_name))
            }
            None => (None, None),
        };

        let now = Utc::now();
        self.repo
            .create(LeaveRequest {
                id: Uuid::new_v4(),
                title: fields.title,
                reason: fields.reason,
                from_date: fields.from_date,
                to_date: fields.to_date,
                class_teacher: fields.class_teacher,
                attachment_ref,
                attachment_name,
                requested_by: principal.id,
                status: LeaveStatus::Pending,
                reviewed_by: None,
                review_date: None,
                review_comments: None,
                created_at: now,
                updated_at: now,
            })
            .await
    }

    /// Edit a pending request. Only the owner may edit, and only while the
    /// request has not been reviewed. A new attachment replaces the old one;
    /// the old blob is removed only after the record write succeeds.
    pub async fn update(
        &self,
        principal: Option<&Principal>,
        id: Uuid,
        input: LeaveRequestInput,
        attachment: Option<UploadedFile>,
    ) -> Result<LeaveRequest> {
        let principal = policy::require_authenticated(principal)?;
        policy::require_role(principal, &[Role::User]).require()?;

        let fields = validate_leave_request(input, Utc::now())?;

        let mut request = self.load(id).await?;
        policy::mutate_leave_request(principal, &request).require()?;

        request.title = fields.title;
        request.reason = fields.reason;
        request.from_date = fields.from_date;
        request.to_date = fields.to_date;
        request.class_teacher = fields.class_teacher;

        let mut replaced_blob = None;
        if let Some(file) = attachment {
            let new_ref = self.blobs.store(&file.file_name, &file.data).await?;
            replaced_blob = request.attachment_ref.replace(new_ref);
            request.attachment_name = Some(file.file_name);
        }

        let updated = self.repo.update(id, request).await?;

        if let Some(old) = replaced_blob {
            if let Err(e) = self.blobs.delete(&old).await {
                tracing::warn!(
                    blob = old.as_str(),
                    "failed to delete replaced attachment: {}",
                    e
                );
            }
        }

        Ok(updated)
    }

    /// Withdraw a pending request. Attachment cleanup is reported but never
    /// blocks record deletion.
    pub async fn delete(&self, principal: Option<&Principal>, id: Uuid) -> Result<()> {
        let principal = policy::require_authenticated(principal)?;
        policy::require_role(principal, &[Role::User]).require()?;

        let request = self.load(id).await?;
        policy::mutate_leave_request(principal, &request).require()?;

        if let Some(ref blob) = request.attachment_ref {
            if let Err(e) = self.blobs.delete(blob).await {
                tracing::warn!(
                    blob = blob.as_str(),
                    "failed to delete attachment: {}",
                    e
                );
            }
        }

        self.repo.delete(id).await
    }

    /// Approve or reject a pending request. The transition is single-shot:
    /// once a request leaves `pending` no further review can touch it, and
    /// of two concurrent reviews only the first write wins.
    pub async fn review(
        &self,
        principal: Option<&Principal>,
        id: Uuid,
        decision: ReviewDecision,
        comments: Option<&str>,
    ) -> Result<LeaveRequest> {
        let principal = policy::require_authenticated(principal)?;
        policy::require_role(principal, REVIEWER_ROLES).require()?;

        let comments = validate_review_comments(comments)?;

        let request = self.load(id).await?;
        policy::review_leave_request(principal, &request).require()?;

        if request.status != LeaveStatus::Pending {
            return Err(AppError::AlreadyReviewed);
        }

        let landed = self
            .repo
            .review(id, decision.status(), principal.id, Utc::now(), comments)
            .await?;

        if !landed {
            // Lost the race: someone reviewed (or deleted) the request
            // between our read and the conditional write.
            return match self.repo.find_by_id(id).await? {
                Some(_) => Err(AppError::AlreadyReviewed),
                None => Err(not_found()),
            };
        }

        self.load(id).await
    }

    pub async fn download_attachment(
        &self,
        principal: Option<&Principal>,
        id: Uuid,
    ) -> Result<Download> {
        let request = self.fetch(principal, id).await?;

        let Some(ref blob) = request.attachment_ref else {
            return Err(AppError::NotFound("No attachment found!".to_string()));
        };
        let reader = self.blobs.resolve(blob).await?;

        Ok(Download {
            file_name: request
                .attachment_name
                .unwrap_or_else(|| "attachment".to_string()),
            content_type: "application/octet-stream".to_string(),
            reader,
        })
    }

    async fn load(&self, id: Uuid) -> Result<LeaveRequest> {
        self.repo.find_by_id(id).await?.ok_or_else(not_found)
    }
}

fn not_found() -> AppError {
    AppError::NotFound("Leave request not found!".to_string())
}
