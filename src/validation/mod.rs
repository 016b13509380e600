//! Per-entity validators. Each follows the same three ordered steps:
//! unknown fields are stripped when the raw input is deserialized, defaults
//! are applied by an explicit pure function (only for absent fields, never
//! for present-but-empty ones), then constraints are checked without
//! short-circuiting so the caller gets every violation at once.

use chrono::{DateTime, NaiveDate, Utc};

pub mod announcement;
pub mod document;
pub mod leave_request;

pub use announcement::{validate_announcement, AnnouncementInput};
pub use document::{validate_document, DocumentInput};
pub use leave_request::{validate_leave_request, validate_review_comments, LeaveRequestInput};

/// Check a required, trimmed string field. Pushes messages for missing or
/// out-of-bounds values and returns the clean value when there is one.
fn required_text(
    value: Option<&str>,
    label: &str,
    min: usize,
    max: usize,
    messages: &mut Vec<String>,
) -> Option<String> {
    let Some(raw) = value else {
        messages.push(format!("{} is required.", label));
        return None;
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        messages.push(format!("{} cannot be empty.", label));
        return None;
    }
    if trimmed.chars().count() < min {
        messages.push(format!(
            "{} should be at least {} characters long.",
            label, min
        ));
        return None;
    }
    if trimmed.chars().count() > max {
        messages.push(format!("{} should not exceed {} characters.", label, max));
        return None;
    }
    Some(trimmed.to_string())
}

/// Optional text field: absent or blank becomes `None`, over-long is a
/// violation.
fn optional_text(
    value: Option<&str>,
    label: &str,
    max: usize,
    messages: &mut Vec<String>,
) -> Option<String> {
    let trimmed = value.map(str::trim).filter(|s| !s.is_empty())?;
    if trimmed.chars().count() > max {
        messages.push(format!("{} should not exceed {} characters.", label, max));
        return None;
    }
    Some(trimmed.to_string())
}

/// Coerce a submitted date string. Accepts a bare date (HTML date inputs)
/// or a full RFC 3339 timestamp; bare dates land at midnight UTC.
fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Coerce a submitted boolean string, the way form payloads spell them.
fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Some(true),
        "false" | "0" | "off" | "no" => Some(false),
        _ => None,
    }
}
