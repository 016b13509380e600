use serde::Deserialize;

use crate::domain::{NewAnnouncement, Priority, TargetRole};
use crate::error::{AppError, Result};

use super::required_text;

/// Raw submitted fields. Unknown keys are dropped during deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnnouncementInput {
    pub title: Option<String>,
    pub body: Option<String>,
    pub target_role: Option<String>,
    pub priority: Option<String>,
}

/// Fill defaults for absent fields. Present-but-empty values are left alone
/// so the constraint check can flag them.
pub fn apply_defaults(mut input: AnnouncementInput) -> AnnouncementInput {
    if input.priority.is_none() {
        input.priority = Some("low".to_string());
    }
    input
}

pub fn validate_announcement(input: AnnouncementInput) -> Result<NewAnnouncement> {
    let input = apply_defaults(input);
    let mut messages = Vec::new();

    let title = required_text(input.title.as_deref(), "Title", 3, 100, &mut messages);
    let body = required_text(input.body.as_deref(), "Content", 10, 1000, &mut messages);

    let target_role = match input.target_role.as_deref().map(str::trim) {
        None => {
            messages.push("Target audience is required.".to_string());
            None
        }
        Some(raw) => {
            let parsed = TargetRole::parse(raw);
            if parsed.is_none() {
                messages
                    .push("Target audience must be one of: user, faculty, or all.".to_string());
            }
            parsed
        }
    };

    let priority = match input.priority.as_deref().map(str::trim) {
        // Unreachable after apply_defaults, but the check stays total.
        None => {
            messages.push("Priority is required.".to_string());
            None
        }
        Some(raw) => {
            let parsed = Priority::parse(raw);
            if parsed.is_none() {
                messages.push("Priority must be one of: low, medium, or high.".to_string());
            }
            parsed
        }
    };

    if !messages.is_empty() {
        return Err(AppError::Validation(messages));
    }

    Ok(NewAnnouncement {
        title: title.unwrap(),
        body: body.unwrap(),
        target_role: target_role.unwrap(),
        priority: priority.unwrap(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_input() -> AnnouncementInput {
        AnnouncementInput {
            title: Some("Exam schedule".to_string()),
            body: Some("The mid-term schedule has been posted.".to_string()),
            target_role: Some("all".to_string()),
            priority: Some("high".to_string()),
        }
    }

    #[test]
    fn accepts_valid_input() {
        let clean = validate_announcement(valid_input()).unwrap();
        assert_eq!(clean.target_role, TargetRole::All);
        assert_eq!(clean.priority, Priority::High);
    }

    #[test]
    fn priority_defaults_when_absent() {
        let mut input = valid_input();
        input.priority = None;
        let clean = validate_announcement(input).unwrap();
        assert_eq!(clean.priority, Priority::Low);
    }

    #[test]
    fn empty_priority_is_not_defaulted() {
        let mut input = valid_input();
        input.priority = Some("".to_string());
        let err = validate_announcement(input).unwrap_err();
        let AppError::Validation(messages) = err else {
            panic!("expected validation failure");
        };
        assert!(messages
            .iter()
            .any(|m| m == "Priority must be one of: low, medium, or high."));
    }

    #[test]
    fn collects_every_violation() {
        let input = AnnouncementInput {
            title: Some("ab".to_string()),
            body: Some("too short".to_string()),
            target_role: Some("everyone".to_string()),
            priority: Some("urgent".to_string()),
        };
        let AppError::Validation(messages) = validate_announcement(input).unwrap_err() else {
            panic!("expected validation failure");
        };
        assert_eq!(messages.len(), 4);
    }

    #[test]
    fn unknown_fields_are_stripped() {
        let input: AnnouncementInput = serde_json::from_value(serde_json::json!({
            "title": "Exam schedule",
            "body": "The mid-term schedule has been posted.",
            "target_role": "all",
            "created_by": "not-yours-to-set"
        }))
        .unwrap();
        assert!(validate_announcement(input).is_ok());
    }

    #[test]
    fn trims_whitespace() {
        let mut input = valid_input();
        input.title = Some("  Exam schedule  ".to_string());
        let clean = validate_announcement(input).unwrap();
        assert_eq!(clean.title, "Exam schedule");
    }
}
