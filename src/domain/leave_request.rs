use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::blob::BlobRef;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveRequest {
    pub id: Uuid,
    pub title: String,
    pub reason: LeaveReason,
    pub from_date: DateTime<Utc>,
    pub to_date: DateTime<Utc>,
    /// Username of the faculty member who may review this request.
    pub class_teacher: String,
    pub attachment_ref: Option<BlobRef>,
    pub attachment_name: Option<String>,
    pub requested_by: Uuid,
    pub status: LeaveStatus,
    pub reviewed_by: Option<Uuid>,
    pub review_date: Option<DateTime<Utc>>,
    pub review_comments: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LeaveRequest {
    /// Days of leave, counting both the start and end date. Partial days
    /// round up.
    pub fn number_of_days(&self) -> i64 {
        let secs = self
            .to_date
            .signed_duration_since(self.from_date)
            .num_seconds();
        secs.div_euclid(86_400) + i64::from(secs.rem_euclid(86_400) > 0) + 1
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LeaveReason {
    Sick,
    Personal,
    Academic,
}

impl LeaveReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveReason::Sick => "sick",
            LeaveReason::Personal => "personal",
            LeaveReason::Academic => "academic",
        }
    }

    pub fn parse(s: &str) -> Option<LeaveReason> {
        match s {
            "sick" => Some(LeaveReason::Sick),
            "personal" => Some(LeaveReason::Personal),
            "academic" => Some(LeaveReason::Academic),
            _ => None,
        }
    }
}

/// `Pending` is the sole initial state; `Approved` and `Rejected` are
/// terminal. The only transition is a single review.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

impl LeaveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveStatus::Pending => "pending",
            LeaveStatus::Approved => "approved",
            LeaveStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<LeaveStatus> {
        match s {
            "pending" => Some(LeaveStatus::Pending),
            "approved" => Some(LeaveStatus::Approved),
            "rejected" => Some(LeaveStatus::Rejected),
            _ => None,
        }
    }
}

/// Outcome of a review. Deliberately not `LeaveStatus`: a review can never
/// set a request back to pending.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReviewDecision {
    Approved,
    Rejected,
}

impl ReviewDecision {
    pub fn status(&self) -> LeaveStatus {
        match self {
            ReviewDecision::Approved => LeaveStatus::Approved,
            ReviewDecision::Rejected => LeaveStatus::Rejected,
        }
    }
}

/// Clean field set produced by validation.
#[derive(Debug, Clone)]
pub struct NewLeaveRequest {
    pub title: String,
    pub reason: LeaveReason,
    pub from_date: DateTime<Utc>,
    pub to_date: DateTime<Utc>,
    pub class_teacher: String,
}

#[derive(Debug, Clone, Default)]
pub struct LeaveRequestFilter {
    /// Restrict to requests created by this principal (student scope).
    pub requested_by: Option<Uuid>,
    /// Restrict to requests assigned to this class teacher (faculty scope).
    pub class_teacher: Option<String>,
    pub status: Option<LeaveStatus>,
}
