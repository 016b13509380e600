use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Role, User},
    error::{AppError, Result},
    repository::UserRepository,
};

#[derive(FromRow)]
struct UserRow {
    id: String,
    email: String,
    username: String,
    password_hash: String,
    role: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_user(row: UserRow) -> Result<User> {
        Ok(User {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            email: row.email,
            username: row.username,
            password_hash: row.password_hash,
            role: Role::parse(&row.role)
                .ok_or_else(|| AppError::Database(format!("Invalid role: {}", row.role)))?,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }

    async fn find_by_column(&self, column: &str, value: &str) -> Result<Option<User>> {
        let sql = format!(
            "SELECT id, email, username, password_hash, role, created_at, updated_at \
             FROM users WHERE {} = ?",
            column
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_user(r)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create(&self, user: User) -> Result<User> {
        let id_str = user.id.to_string();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO users (id, email, username, password_hash, role, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id_str)
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(user.id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve created user".to_string()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        self.find_by_column("id", &id.to_string()).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        self.find_by_column("username", username).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        self.find_by_column("email", email).await
    }
}
