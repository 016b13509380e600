//! Pure authorization decisions. Nothing here touches the database or the
//! blob store; callers load the record first and ask for a verdict.
//!
//! Disclosure policy: read-side checks return a bare yes/no so lifecycle
//! managers can surface `NotFound` for records outside a principal's
//! visibility scope. Write-side checks return a `Decision` whose deny
//! reason is shown to the caller.

use crate::domain::{Announcement, Document, LeaveRequest, LeaveStatus, Principal, Role};
use crate::error::{AppError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(String),
}

impl Decision {
    fn deny(reason: &str) -> Decision {
        Decision::Deny(reason.to_string())
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// Turn a deny into a `Forbidden` error at the lifecycle boundary.
    pub fn require(self) -> Result<()> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(AppError::Forbidden(reason)),
        }
    }
}

/// Rule 1: no principal, no access. Evaluated before any role, validation,
/// or ownership check.
pub fn require_authenticated(principal: Option<&Principal>) -> Result<&Principal> {
    principal.ok_or(AppError::Unauthenticated)
}

/// Rule 2: the action requires one of the listed roles.
pub fn require_role(principal: &Principal, allowed: &[Role]) -> Decision {
    if allowed.contains(&principal.role) {
        Decision::Allow
    } else {
        Decision::deny("You don't have permission to access this resource.")
    }
}

pub fn can_view_announcement(principal: &Principal, announcement: &Announcement) -> bool {
    announcement.target_role.visible_to(principal.role)
}

/// Hod edits anything; faculty only their own announcements.
pub fn edit_announcement(principal: &Principal, announcement: &Announcement) -> Decision {
    if principal.role == Role::Faculty && announcement.created_by != principal.id {
        return Decision::deny("You can only edit your own announcements!");
    }
    Decision::Allow
}

pub fn can_view_document(principal: &Principal, document: &Document) -> bool {
    principal.role != Role::User || document.is_public
}

pub fn edit_document(principal: &Principal, document: &Document) -> Decision {
    if principal.role == Role::Faculty && document.uploaded_by != principal.id {
        return Decision::deny("You can only edit your own documents!");
    }
    Decision::Allow
}

/// Who may read a leave request (and, rule 6, its attachment): the
/// creator, the assigned class teacher, or the hod.
pub fn can_view_leave_request(principal: &Principal, request: &LeaveRequest) -> bool {
    match principal.role {
        Role::Hod => true,
        Role::Faculty => request.class_teacher == principal.username,
        Role::User => request.requested_by == principal.id,
    }
}

/// Rules 3 and 5: a student may edit or delete only their own request, and
/// only while it is still pending.
pub fn mutate_leave_request(principal: &Principal, request: &LeaveRequest) -> Decision {
    if request.requested_by != principal.id {
        return Decision::deny("You can only edit your own leave requests!");
    }
    if request.status != LeaveStatus::Pending {
        return Decision::deny("You can only edit pending leave requests!");
    }
    Decision::Allow
}

/// Rule 4: hod reviews anything; faculty only requests assigned to them.
pub fn review_leave_request(principal: &Principal, request: &LeaveRequest) -> Decision {
    match principal.role {
        Role::Hod => Decision::Allow,
        Role::Faculty if request.class_teacher == principal.username => Decision::Allow,
        Role::Faculty => Decision::deny("You can only review requests assigned to you!"),
        Role::User => Decision::deny("You don't have permission to access this resource."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LeaveReason, Priority, TargetRole};
    use chrono::Utc;
    use uuid::Uuid;

    fn principal(role: Role, username: &str) -> Principal {
        Principal {
            id: Uuid::new_v4(),
            username: username.to_string(),
            role,
        }
    }

    fn announcement(created_by: Uuid, target_role: TargetRole) -> Announcement {
        Announcement {
            id: Uuid::new_v4(),
            title: "Exam schedule".to_string(),
            body: "Schedule is out on the notice board.".to_string(),
            target_role,
            priority: Priority::Low,
            created_by,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn leave_request(requested_by: Uuid, class_teacher: &str, status: LeaveStatus) -> LeaveRequest {
        LeaveRequest {
            id: Uuid::new_v4(),
            title: "Fever".to_string(),
            reason: LeaveReason::Sick,
            from_date: Utc::now(),
            to_date: Utc::now(),
            class_teacher: class_teacher.to_string(),
            attachment_ref: None,
            attachment_name: None,
            requested_by,
            status,
            reviewed_by: None,
            review_date: None,
            review_comments: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn unauthenticated_is_rejected_first() {
        let err = require_authenticated(None).unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated));
    }

    #[test]
    fn role_gate() {
        let student = principal(Role::User, "asha");
        assert!(require_role(&student, &[Role::Hod, Role::Faculty])
            .require()
            .is_err());
        assert!(require_role(&student, &[Role::User]).require().is_ok());
    }

    #[test]
    fn student_only_sees_targeted_announcements() {
        let student = principal(Role::User, "asha");
        let faculty = principal(Role::Faculty, "drsmith");

        let for_faculty = announcement(Uuid::new_v4(), TargetRole::Faculty);
        let for_all = announcement(Uuid::new_v4(), TargetRole::All);

        assert!(!can_view_announcement(&student, &for_faculty));
        assert!(can_view_announcement(&student, &for_all));
        assert!(can_view_announcement(&faculty, &for_faculty));
    }

    #[test]
    fn faculty_cannot_edit_someone_elses_announcement() {
        let owner = principal(Role::Faculty, "drsmith");
        let other = principal(Role::Faculty, "drjones");
        let hod = principal(Role::Hod, "head");

        let a = announcement(owner.id, TargetRole::All);

        assert!(edit_announcement(&owner, &a).is_allowed());
        assert!(!edit_announcement(&other, &a).is_allowed());
        assert!(edit_announcement(&hod, &a).is_allowed());
    }

    #[test]
    fn reviewer_matrix() {
        let student = principal(Role::User, "asha");
        let assigned = principal(Role::Faculty, "drsmith");
        let unassigned = principal(Role::Faculty, "drjones");
        let hod = principal(Role::Hod, "head");

        let req = leave_request(student.id, "drsmith", LeaveStatus::Pending);

        assert!(review_leave_request(&hod, &req).is_allowed());
        assert!(review_leave_request(&assigned, &req).is_allowed());
        assert_eq!(
            review_leave_request(&unassigned, &req),
            Decision::Deny("You can only review requests assigned to you!".to_string())
        );
        assert!(!review_leave_request(&student, &req).is_allowed());
    }

    #[test]
    fn owner_mutation_requires_pending() {
        let student = principal(Role::User, "asha");
        let pending = leave_request(student.id, "drsmith", LeaveStatus::Pending);
        let approved = leave_request(student.id, "drsmith", LeaveStatus::Approved);
        let someone_elses = leave_request(Uuid::new_v4(), "drsmith", LeaveStatus::Pending);

        assert!(mutate_leave_request(&student, &pending).is_allowed());
        assert_eq!(
            mutate_leave_request(&student, &approved),
            Decision::Deny("You can only edit pending leave requests!".to_string())
        );
        assert!(!mutate_leave_request(&student, &someone_elses).is_allowed());
    }

    #[test]
    fn leave_request_visibility() {
        let owner = principal(Role::User, "asha");
        let other_student = principal(Role::User, "ben");
        let assigned = principal(Role::Faculty, "drsmith");
        let unassigned = principal(Role::Faculty, "drjones");
        let hod = principal(Role::Hod, "head");
        let req = leave_request(owner.id, "drsmith", LeaveStatus::Pending);

        assert!(can_view_leave_request(&owner, &req));
        assert!(can_view_leave_request(&assigned, &req));
        assert!(can_view_leave_request(&hod, &req));
        assert!(!can_view_leave_request(&other_student, &req));
        assert!(!can_view_leave_request(&unassigned, &req));
    }
}
