use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Announcement, AnnouncementFilter, Priority, Role, TargetRole},
    error::{AppError, Result},
    repository::AnnouncementRepository,
};

#[derive(FromRow)]
struct AnnouncementRow {
    id: String,
    title: String,
    body: String,
    target_role: String,
    priority: String,
    created_by: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

pub struct SqliteAnnouncementRepository {
    pool: SqlitePool,
}

impl SqliteAnnouncementRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_announcement(row: AnnouncementRow) -> Result<Announcement> {
        Ok(Announcement {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            title: row.title,
            body: row.body,
            target_role: TargetRole::parse(&row.target_role).ok_or_else(|| {
                AppError::Database(format!("Invalid target role: {}", row.target_role))
            })?,
            priority: Priority::parse(&row.priority)
                .ok_or_else(|| AppError::Database(format!("Invalid priority: {}", row.priority)))?,
            created_by: Uuid::parse_str(&row.created_by)
                .map_err(|e| AppError::Database(e.to_string()))?,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }
}

#[async_trait]
impl AnnouncementRepository for SqliteAnnouncementRepository {
    async fn create(&self, announcement: Announcement) -> Result<Announcement> {
        let id_str = announcement.id.to_string();
        let created_by_str = announcement.created_by.to_string();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO announcements (
                id, title, body, target_role, priority, created_by, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id_str)
        .bind(&announcement.title)
        .bind(&announcement.body)
        .bind(announcement.target_role.as_str())
        .bind(announcement.priority.as_str())
        .bind(&created_by_str)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(announcement.id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created announcement".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Announcement>> {
        let id_str = id.to_string();
        let row = sqlx::query_as::<_, AnnouncementRow>(
            r#"
            SELECT id, title, body, target_role, priority, created_by, created_at, updated_at
            FROM announcements
            WHERE id = ?
            "#,
        )
        .bind(id_str)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_announcement(r)?)),
            None => Ok(None),
        }
    }

    async fn list(&self, filter: &AnnouncementFilter) -> Result<Vec<Announcement>> {
        let mut sql = String::from(
            "SELECT id, title, body, target_role, priority, created_by, created_at, updated_at \
             FROM announcements WHERE 1 = 1",
        );

        // Only the student audience is restricted; hod and faculty see all.
        if filter.audience == Some(Role::User) {
            sql.push_str(" AND target_role IN ('user', 'all')");
        }
        if filter.priority.is_some() {
            sql.push_str(" AND priority = ?");
        }
        sql.push_str(" ORDER BY created_at DESC");

        let mut query = sqlx::query_as::<_, AnnouncementRow>(&sql);
        if let Some(priority) = filter.priority {
            query = query.bind(priority.as_str());
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_announcement).collect()
    }

    async fn update(&self, id: Uuid, announcement: Announcement) -> Result<Announcement> {
        let id_str = id.to_string();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            UPDATE announcements
            SET title = ?, body = ?, target_role = ?, priority = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&announcement.title)
        .bind(&announcement.body)
        .bind(announcement.target_role.as_str())
        .bind(announcement.priority.as_str())
        .bind(now)
        .bind(&id_str)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve updated announcement".to_string())
        })
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let id_str = id.to_string();
        sqlx::query("DELETE FROM announcements WHERE id = ?")
            .bind(&id_str)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}
