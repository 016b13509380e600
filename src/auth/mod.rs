//! Identity and session provider. Issues opaque session tokens and answers
//! "who is the current principal" for a token. Transport (cookies, headers)
//! is the embedding application's concern, not this crate's.

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    domain::{CreateUserRequest, Principal, User},
    error::{AppError, Result},
    repository::{SqliteUserRepository, UserRepository},
};

pub mod session;

use session::SessionStore;

pub struct AuthService {
    session_store: SessionStore,
    users: SqliteUserRepository,
    session_duration_hours: i64,
}

impl AuthService {
    pub fn new(pool: SqlitePool, session_duration_hours: i64) -> Self {
        Self {
            session_store: SessionStore::new(pool.clone()),
            users: SqliteUserRepository::new(pool),
            session_duration_hours,
        }
    }

    pub async fn verify_password(password: &str, hash: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::Internal(format!("Invalid password hash: {}", e)))?;

        let argon2 = Argon2::default();

        Ok(argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    pub async fn hash_password(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        Ok(password_hash.to_string())
    }

    pub async fn register(&self, request: CreateUserRequest) -> Result<User> {
        if self.users.find_by_email(&request.email).await?.is_some() {
            return Err(AppError::validation(
                "A user with that email already exists.",
            ));
        }
        if self
            .users
            .find_by_username(&request.username)
            .await?
            .is_some()
        {
            return Err(AppError::validation(
                "A user with that username already exists.",
            ));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: request.email,
            username: request.username,
            password_hash: Self::hash_password(&request.password).await?,
            role: request.role,
            created_at: now,
            updated_at: now,
        };

        self.users.create(user).await
    }

    /// Authenticate and open a session. Returns the principal and the raw
    /// token; only a hash of the token is stored.
    pub async fn login(&self, username: &str, password: &str) -> Result<(Principal, String)> {
        let user = match self.users.find_by_username(username).await? {
            Some(user) => Some(user),
            None => self.users.find_by_email(username).await?,
        };

        let Some(user) = user else {
            return Err(AppError::Unauthenticated);
        };
        if !Self::verify_password(password, &user.password_hash).await? {
            return Err(AppError::Unauthenticated);
        }

        let token = generate_token();
        let expires_at = Utc::now() + Duration::hours(self.session_duration_hours);
        self.session_store
            .create(user.id, &token, expires_at)
            .await?;

        Ok((user.principal(), token))
    }

    /// Resolve a session token to the current principal, if any. The role
    /// is re-read from the user record, so it is fixed for the request but
    /// not baked into the token.
    pub async fn current_principal(&self, token: &str) -> Result<Option<Principal>> {
        let Some(session) = self.session_store.find_by_token(token).await? else {
            return Ok(None);
        };

        let user = self.users.find_by_id(session.user_id).await?;
        Ok(user.map(|u| u.principal()))
    }

    pub async fn logout(&self, token: &str) -> Result<()> {
        self.session_store.delete_by_token(token).await
    }

    pub async fn cleanup_expired_sessions(&self) -> Result<u64> {
        self.session_store.cleanup_expired().await
    }
}

fn generate_token() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
