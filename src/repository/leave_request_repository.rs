use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    blob::BlobRef,
    domain::{LeaveReason, LeaveRequest, LeaveRequestFilter, LeaveStatus},
    error::{AppError, Result},
    repository::LeaveRequestRepository,
};

#[derive(FromRow)]
struct LeaveRequestRow {
    id: String,
    title: String,
    reason: String,
    from_date: NaiveDateTime,
    to_date: NaiveDateTime,
    class_teacher: String,
    attachment_ref: Option<String>,
    attachment_name: Option<String>,
    requested_by: String,
    status: String,
    reviewed_by: Option<String>,
    review_date: Option<NaiveDateTime>,
    review_comments: Option<String>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

pub struct SqliteLeaveRequestRepository {
    pool: SqlitePool,
}

impl SqliteLeaveRequestRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_leave_request(row: LeaveRequestRow) -> Result<LeaveRequest> {
        Ok(LeaveRequest {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            title: row.title,
            reason: LeaveReason::parse(&row.reason)
                .ok_or_else(|| AppError::Database(format!("Invalid reason: {}", row.reason)))?,
            from_date: DateTime::from_naive_utc_and_offset(row.from_date, Utc),
            to_date: DateTime::from_naive_utc_and_offset(row.to_date, Utc),
            class_teacher: row.class_teacher,
            attachment_ref: row.attachment_ref.map(BlobRef::new),
            attachment_name: row.attachment_name,
            requested_by: Uuid::parse_str(&row.requested_by)
                .map_err(|e| AppError::Database(e.to_string()))?,
            status: LeaveStatus::parse(&row.status)
                .ok_or_else(|| AppError::Database(format!("Invalid status: {}", row.status)))?,
            reviewed_by: row
                .reviewed_by
                .map(|s| Uuid::parse_str(&s).map_err(|e| AppError::Database(e.to_string())))
                .transpose()?,
            review_date: row
                .review_date
                .map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc)),
            review_comments: row.review_comments,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }
}

const SELECT_COLUMNS: &str = "id, title, reason, from_date, to_date, class_teacher, \
     attachment_ref, attachment_name, requested_by, status, reviewed_by, review_date, \
     review_comments, created_at, updated_at";

#[async_trait]
impl LeaveRequestRepository for SqliteLeaveRequestRepository {
    async fn create(&self, request: LeaveRequest) -> Result<LeaveRequest> {
        let id_str = request.id.to_string();
        let requested_by_str = request.requested_by.to_string();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO leave_requests (
                id, title, reason, from_date, to_date, class_teacher,
                attachment_ref, attachment_name, requested_by, status,
                reviewed_by, review_date, review_comments, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, NULL, NULL, NULL, ?, ?)
            "#,
        )
        .bind(&id_str)
        .bind(&request.title)
        .bind(request.reason.as_str())
        .bind(request.from_date.naive_utc())
        .bind(request.to_date.naive_utc())
        .bind(&request.class_teacher)
        .bind(request.attachment_ref.as_ref().map(|b| b.as_str().to_string()))
        .bind(&request.attachment_name)
        .bind(&requested_by_str)
        .bind(request.status.as_str())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(request.id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created leave request".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<LeaveRequest>> {
        let id_str = id.to_string();
        let sql = format!("SELECT {} FROM leave_requests WHERE id = ?", SELECT_COLUMNS);
        let row = sqlx::query_as::<_, LeaveRequestRow>(&sql)
            .bind(id_str)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_leave_request(r)?)),
            None => Ok(None),
        }
    }

    async fn list(&self, filter: &LeaveRequestFilter) -> Result<Vec<LeaveRequest>> {
        let mut sql = format!("SELECT {} FROM leave_requests WHERE 1 = 1", SELECT_COLUMNS);

        if filter.requested_by.is_some() {
            sql.push_str(" AND requested_by = ?");
        }
        if filter.class_teacher.is_some() {
            sql.push_str(" AND class_teacher = ?");
        }
        if filter.status.is_some() {
            sql.push_str(" AND status = ?");
        }
        sql.push_str(" ORDER BY created_at DESC");

        let mut query = sqlx::query_as::<_, LeaveRequestRow>(&sql);
        if let Some(requested_by) = filter.requested_by {
            query = query.bind(requested_by.to_string());
        }
        if let Some(ref class_teacher) = filter.class_teacher {
            query = query.bind(class_teacher.clone());
        }
        if let Some(status) = filter.status {
            query = query.bind(status.as_str());
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_leave_request).collect()
    }

    async fn update(&self, id: Uuid, request: LeaveRequest) -> Result<LeaveRequest> {
        let id_str = id.to_string();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            UPDATE leave_requests
            SET title = ?, reason = ?, from_date = ?, to_date = ?, class_teacher = ?,
                attachment_ref = ?, attachment_name = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&request.title)
        .bind(request.reason.as_str())
        .bind(request.from_date.naive_utc())
        .bind(request.to_date.naive_utc())
        .bind(&request.class_teacher)
        .bind(request.attachment_ref.as_ref().map(|b| b.as_str().to_string()))
        .bind(&request.attachment_name)
        .bind(now)
        .bind(&id_str)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve updated leave request".to_string())
        })
    }

    async fn review(
        &self,
        id: Uuid,
        status: LeaveStatus,
        reviewed_by: Uuid,
        review_date: DateTime<Utc>,
        comments: Option<String>,
    ) -> Result<bool> {
        let id_str = id.to_string();
        let reviewed_by_str = reviewed_by.to_string();
        let now = Utc::now().naive_utc();

        // The `status = 'pending'` predicate makes the transition
        // single-shot: whichever concurrent review lands first wins and the
        // loser sees zero affected rows.
        let result = sqlx::query(
            r#"
            UPDATE leave_requests
            SET status = ?, reviewed_by = ?, review_date = ?, review_comments = ?, updated_at = ?
            WHERE id = ? AND status = 'pending'
            "#,
        )
        .bind(status.as_str())
        .bind(&reviewed_by_str)
        .bind(review_date.naive_utc())
        .bind(&comments)
        .bind(now)
        .bind(&id_str)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let id_str = id.to_string();
        sqlx::query("DELETE FROM leave_requests WHERE id = ?")
            .bind(&id_str)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}
