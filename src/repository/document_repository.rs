use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    blob::BlobRef,
    domain::{Category, Document, DocumentFilter},
    error::{AppError, Result},
    repository::DocumentRepository,
};

#[derive(FromRow)]
struct DocumentRow {
    id: String,
    title: String,
    description: Option<String>,
    file_name: String,
    file_ref: String,
    file_type: String,
    file_size: i64,
    category: String,
    is_public: i32,
    uploaded_by: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

pub struct SqliteDocumentRepository {
    pool: SqlitePool,
}

impl SqliteDocumentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_document(row: DocumentRow) -> Result<Document> {
        Ok(Document {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            title: row.title,
            description: row.description,
            file_name: row.file_name,
            file_ref: BlobRef::new(row.file_ref),
            file_type: row.file_type,
            file_size: row.file_size,
            category: Category::parse(&row.category)
                .ok_or_else(|| AppError::Database(format!("Invalid category: {}", row.category)))?,
            is_public: row.is_public != 0,
            uploaded_by: Uuid::parse_str(&row.uploaded_by)
                .map_err(|e| AppError::Database(e.to_string()))?,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }
}

#[async_trait]
impl DocumentRepository for SqliteDocumentRepository {
    async fn create(&self, document: Document) -> Result<Document> {
        let id_str = document.id.to_string();
        let uploaded_by_str = document.uploaded_by.to_string();
        let is_public_int = if document.is_public { 1i32 } else { 0i32 };
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO documents (
                id, title, description, file_name, file_ref, file_type, file_size,
                category, is_public, uploaded_by, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id_str)
        .bind(&document.title)
        .bind(&document.description)
        .bind(&document.file_name)
        .bind(document.file_ref.as_str())
        .bind(&document.file_type)
        .bind(document.file_size)
        .bind(document.category.as_str())
        .bind(is_public_int)
        .bind(&uploaded_by_str)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(document.id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve created document".to_string()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Document>> {
        let id_str = id.to_string();
        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, title, description, file_name, file_ref, file_type, file_size,
                   category, is_public, uploaded_by, created_at, updated_at
            FROM documents
            WHERE id = ?
            "#,
        )
        .bind(id_str)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_document(r)?)),
            None => Ok(None),
        }
    }

    async fn list(&self, filter: &DocumentFilter) -> Result<Vec<Document>> {
        let mut sql = String::from(
            "SELECT id, title, description, file_name, file_ref, file_type, file_size, \
             category, is_public, uploaded_by, created_at, updated_at \
             FROM documents WHERE 1 = 1",
        );

        if filter.public_only {
            sql.push_str(" AND is_public = 1");
        }
        if filter.category.is_some() {
            sql.push_str(" AND category = ?");
        }
        sql.push_str(" ORDER BY created_at DESC");

        let mut query = sqlx::query_as::<_, DocumentRow>(&sql);
        if let Some(category) = filter.category {
            query = query.bind(category.as_str());
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_document).collect()
    }

    async fn update(&self, id: Uuid, document: Document) -> Result<Document> {
        let id_str = id.to_string();
        let is_public_int = if document.is_public { 1i32 } else { 0i32 };
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            UPDATE documents
            SET title = ?, description = ?, file_name = ?, file_ref = ?,
                file_type = ?, file_size = ?, category = ?, is_public = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&document.title)
        .bind(&document.description)
        .bind(&document.file_name)
        .bind(document.file_ref.as_str())
        .bind(&document.file_type)
        .bind(document.file_size)
        .bind(document.category.as_str())
        .bind(is_public_int)
        .bind(now)
        .bind(&id_str)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve updated document".to_string()))
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let id_str = id.to_string();
        sqlx::query("DELETE FROM documents WHERE id = ?")
            .bind(&id_str)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}
