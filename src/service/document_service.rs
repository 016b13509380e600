use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    blob::{BlobStore, Download, UploadedFile},
    domain::{Category, Document, DocumentFilter, Principal, Role},
    error::{AppError, Result},
    policy,
    repository::DocumentRepository,
    validation::{validate_document, DocumentInput},
};

const UPLOADER_ROLES: &[Role] = &[Role::Hod, Role::Faculty];

pub struct DocumentService {
    repo: Arc<dyn DocumentRepository>,
    blobs: Arc<dyn BlobStore>,
}

impl DocumentService {
    pub fn new(repo: Arc<dyn DocumentRepository>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { repo, blobs }
    }

    /// List documents visible to the principal, newest first. Students only
    /// see public documents.
    pub async fn list(
        &self,
        principal: Option<&Principal>,
        category: Option<Category>,
    ) -> Result<Vec<Document>> {
        let principal = policy::require_authenticated(principal)?;

        let filter = DocumentFilter {
            public_only: principal.role == Role::User,
            category,
        };
        self.repo.list(&filter).await
    }

    pub async fn fetch(&self, principal: Option<&Principal>, id: Uuid) -> Result<Document> {
        let principal = policy::require_authenticated(principal)?;

        let document = self.load(id).await?;
        // Private documents are reported as missing to students.
        if !policy::can_view_document(principal, &document) {
            return Err(not_found());
        }
        Ok(document)
    }

    /// Upload a new document. The file is mandatory and its blob write is
    /// fatal on failure; a record is never created without its file.
    pub async fn create(
        &self,
        principal: Option<&Principal>,
        input: DocumentInput,
        file: UploadedFile,
    ) -> Result<Document> {
        let principal = policy::require_authenticated(principal)?;
        policy::require_role(principal, UPLOADER_ROLES).require()?;

        let fields = validate_document(input)?;

        let file_ref = self.blobs.store(&file.file_name, &file.data).await?;
        let now = Utc::now();

        self.repo
            .create(Document {
                id: Uuid::new_v4(),
                title: fields.title,
                description: fields.description,
                file_name: file.file_name,
                file_ref,
                file_type: file.content_type,
                file_size: file.data.len() as i64,
                category: fields.category,
                is_public: fields.is_public,
                uploaded_by: principal.id,
                created_at: now,
                updated_at: now,
            })
            .await
    }

    /// Update a document, optionally replacing its file. The old blob is
    /// removed only after the record write succeeds, so the record never
    /// points at a deleted blob.
    pub async fn update(
        &self,
        principal: Option<&Principal>,
        id: Uuid,
        input: DocumentInput,
        file: Option<UploadedFile>,
    ) -> Result<Document> {
        let principal = policy::require_authenticated(principal)?;
        policy::require_role(principal, UPLOADER_ROLES).require()?;

        let fields = validate_document(input)?;

        let mut document = self.load(id).await?;
        policy::edit_document(principal, &document).require()?;

        document.title = fields.title;
        document.description = fields.description;
        document.category = fields.category;
        document.is_public = fields.is_public;

        let mut replaced_blob = None;
        if let Some(file) = file {
            let new_ref = self.blobs.store(&file.file_name, &file.data).await?;
            replaced_blob = Some(document.file_ref.clone());
            document.file_name = file.file_name;
            document.file_ref = new_ref;
            document.file_type = file.content_type;
            document.file_size = file.data.len() as i64;
        }

        let updated = self.repo.update(id, document).await?;

        if let Some(old) = replaced_blob {
            if let Err(e) = self.blobs.delete(&old).await {
                tracing::warn!(blob = old.as_str(), "failed to delete replaced file: {}", e);
            }
        }

        Ok(updated)
    }

    /// Delete a document and its file. A failed blob delete is reported but
    /// does not block removal of the record.
    pub async fn delete(&self, principal: Option<&Principal>, id: Uuid) -> Result<()> {
        let principal = policy::require_authenticated(principal)?;
        policy::require_role(principal, UPLOADER_ROLES).require()?;

        let document = self.load(id).await?;
        policy::edit_document(principal, &document).require()?;

        if let Err(e) = self.blobs.delete(&document.file_ref).await {
            tracing::warn!(
                blob = document.file_ref.as_str(),
                "failed to delete document file: {}",
                e
            );
        }

        self.repo.delete(id).await
    }

    pub async fn download(&self, principal: Option<&Principal>, id: Uuid) -> Result<Download> {
        let document = self.fetch(principal, id).await?;
        let reader = self.blobs.resolve(&document.file_ref).await?;

        Ok(Download {
            file_name: document.file_name,
            content_type: document.file_type,
            reader,
        })
    }

    async fn load(&self, id: Uuid) -> Result<Document> {
        self.repo.find_by_id(id).await?.ok_or_else(not_found)
    }
}

fn not_found() -> AppError {
    AppError::NotFound("Document not found!".to_string())
}
