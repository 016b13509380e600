use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An authenticated actor for the duration of one request. Always passed
/// explicitly into lifecycle calls, never read from ambient state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Hod,
    Faculty,
    /// Students. The original data model calls this role "user".
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Hod => "hod",
            Role::Faculty => "faculty",
            Role::User => "user",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "hod" => Some(Role::Hod),
            "faculty" => Some(Role::Faculty),
            "user" => Some(Role::User),
            _ => None,
        }
    }
}

/// Account record backing the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn principal(&self) -> Principal {
        Principal {
            id: self.id,
            username: self.username.clone(),
            role: self.role,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    pub role: Role,
}
