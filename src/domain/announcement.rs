use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Role;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Announcement {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub target_role: TargetRole,
    pub priority: Priority,
    /// Set once at creation and never reassigned.
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Audience an announcement is addressed to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TargetRole {
    User,
    Faculty,
    All,
}

impl TargetRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetRole::User => "user",
            TargetRole::Faculty => "faculty",
            TargetRole::All => "all",
        }
    }

    pub fn parse(s: &str) -> Option<TargetRole> {
        match s {
            "user" => Some(TargetRole::User),
            "faculty" => Some(TargetRole::Faculty),
            "all" => Some(TargetRole::All),
            _ => None,
        }
    }

    /// Whether a principal with the given role is part of this audience.
    /// Only the student role is restricted; hod and faculty read everything.
    pub fn visible_to(&self, role: Role) -> bool {
        match role {
            Role::User => matches!(self, TargetRole::User | TargetRole::All),
            Role::Hod | Role::Faculty => true,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn parse(s: &str) -> Option<Priority> {
        match s {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

/// Clean field set produced by validation, ready for the lifecycle manager.
#[derive(Debug, Clone)]
pub struct NewAnnouncement {
    pub title: String,
    pub body: String,
    pub target_role: TargetRole,
    pub priority: Priority,
}

#[derive(Debug, Clone, Default)]
pub struct AnnouncementFilter {
    /// Restrict to announcements addressed to this audience member.
    pub audience: Option<Role>,
    pub priority: Option<Priority>,
}
