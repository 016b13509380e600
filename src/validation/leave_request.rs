use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::{LeaveReason, NewLeaveRequest};
use crate::error::{AppError, Result};

use super::{optional_text, parse_date, required_text};

/// Raw submitted fields. Unknown keys (status, requested_by, ...) are
/// dropped during deserialization, so callers cannot smuggle them in.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeaveRequestInput {
    pub title: Option<String>,
    pub reason: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub class_teacher: Option<String>,
}

/// `now` is injected so the past-date rule is testable; the comparison is
/// at day granularity, so a leave starting today is valid.
pub fn validate_leave_request(
    input: LeaveRequestInput,
    now: DateTime<Utc>,
) -> Result<NewLeaveRequest> {
    let mut messages = Vec::new();

    let title = required_text(input.title.as_deref(), "Title", 3, 100, &mut messages);

    let reason = match input.reason.as_deref().map(str::trim) {
        None => {
            messages.push("Reason is required.".to_string());
            None
        }
        Some(raw) => {
            let parsed = LeaveReason::parse(raw);
            if parsed.is_none() {
                messages.push("Reason must be one of: sick, personal, or academic.".to_string());
            }
            parsed
        }
    };

    let from_date = match input.from_date.as_deref() {
        None => {
            messages.push("From date is required.".to_string());
            None
        }
        Some(raw) => match parse_date(raw) {
            None => {
                messages.push("From date is not a valid date.".to_string());
                None
            }
            Some(date) => {
                if date.date_naive() < now.date_naive() {
                    messages.push("From date cannot be in the past.".to_string());
                }
                Some(date)
            }
        },
    };

    let to_date = match input.to_date.as_deref() {
        None => {
            messages.push("To date is required.".to_string());
            None
        }
        Some(raw) => match parse_date(raw) {
            None => {
                messages.push("To date is not a valid date.".to_string());
                None
            }
            Some(date) => Some(date),
        },
    };

    if let (Some(from), Some(to)) = (from_date, to_date) {
        if to < from {
            messages.push("To date must be after from date.".to_string());
        }
    }

    let class_teacher = required_text(
        input.class_teacher.as_deref(),
        "Class teacher name",
        2,
        50,
        &mut messages,
    );

    if !messages.is_empty() {
        return Err(AppError::Validation(messages));
    }

    Ok(NewLeaveRequest {
        title: title.unwrap(),
        reason: reason.unwrap(),
        from_date: from_date.unwrap(),
        to_date: to_date.unwrap(),
        class_teacher: class_teacher.unwrap(),
    })
}

/// Review comments travel outside the main schema: optional, blank collapses
/// to `None`, capped at 500 characters.
pub fn validate_review_comments(raw: Option<&str>) -> Result<Option<String>> {
    let mut messages = Vec::new();
    let comments = optional_text(raw, "Comments", 500, &mut messages);
    if !messages.is_empty() {
        return Err(AppError::Validation(messages));
    }
    Ok(comments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn valid_input() -> LeaveRequestInput {
        LeaveRequestInput {
            title: Some("Fever".to_string()),
            reason: Some("sick".to_string()),
            from_date: Some("2026-03-02".to_string()),
            to_date: Some("2026-03-04".to_string()),
            class_teacher: Some("Dr. Smith".to_string()),
        }
    }

    #[test]
    fn accepts_valid_input() {
        let clean = validate_leave_request(valid_input(), now()).unwrap();
        assert_eq!(clean.reason, LeaveReason::Sick);
        assert_eq!(clean.class_teacher, "Dr. Smith");
        assert_eq!(clean.to_date - clean.from_date, Duration::days(2));
    }

    #[test]
    fn to_date_before_from_date_is_flagged() {
        let mut input = valid_input();
        input.to_date = Some("2026-03-01".to_string());
        let AppError::Validation(messages) = validate_leave_request(input, now()).unwrap_err()
        else {
            panic!("expected validation failure");
        };
        assert!(messages.iter().any(|m| m.contains("To date")));
    }

    #[test]
    fn past_from_date_is_rejected() {
        let mut input = valid_input();
        input.from_date = Some("2026-02-27".to_string());
        let AppError::Validation(messages) = validate_leave_request(input, now()).unwrap_err()
        else {
            panic!("expected validation failure");
        };
        assert!(messages
            .iter()
            .any(|m| m == "From date cannot be in the past."));
    }

    #[test]
    fn leave_starting_today_is_valid() {
        let mut input = valid_input();
        input.from_date = Some("2026-03-01".to_string());
        input.to_date = Some("2026-03-01".to_string());
        assert!(validate_leave_request(input, now()).is_ok());
    }

    #[test]
    fn collects_every_violation() {
        let input = LeaveRequestInput {
            title: None,
            reason: Some("vacation".to_string()),
            from_date: Some("not-a-date".to_string()),
            to_date: None,
            class_teacher: Some("X".to_string()),
        };
        let AppError::Validation(messages) = validate_leave_request(input, now()).unwrap_err()
        else {
            panic!("expected validation failure");
        };
        assert_eq!(messages.len(), 5);
    }

    #[test]
    fn review_comments_bounds() {
        assert_eq!(validate_review_comments(None).unwrap(), None);
        assert_eq!(validate_review_comments(Some("  ")).unwrap(), None);
        assert_eq!(
            validate_review_comments(Some("Get well soon")).unwrap(),
            Some("Get well soon".to_string())
        );
        assert!(validate_review_comments(Some(&"x".repeat(501))).is_err());
    }
}
