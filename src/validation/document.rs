use serde::Deserialize;

use crate::domain::{Category, NewDocument};
use crate::error::{AppError, Result};

use super::{optional_text, parse_bool, required_text};

/// Raw submitted fields. File metadata never comes through here; the
/// lifecycle manager takes it from the actual upload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub is_public: Option<String>,
}

pub fn apply_defaults(mut input: DocumentInput) -> DocumentInput {
    if input.category.is_none() {
        input.category = Some("other".to_string());
    }
    if input.is_public.is_none() {
        input.is_public = Some("true".to_string());
    }
    input
}

pub fn validate_document(input: DocumentInput) -> Result<NewDocument> {
    let input = apply_defaults(input);
    let mut messages = Vec::new();

    let title = required_text(input.title.as_deref(), "Title", 3, 100, &mut messages);
    let description = optional_text(input.description.as_deref(), "Description", 500, &mut messages);

    let category = match input.category.as_deref().map(str::trim) {
        None => None,
        Some(raw) => {
            let parsed = Category::parse(raw);
            if parsed.is_none() {
                messages.push(
                    "Category must be one of: syllabus, notes, assignments, notices, forms, or other."
                        .to_string(),
                );
            }
            parsed
        }
    };

    let is_public = match input.is_public.as_deref() {
        None => None,
        Some(raw) => {
            let parsed = parse_bool(raw);
            if parsed.is_none() {
                messages.push("isPublic must be a boolean.".to_string());
            }
            parsed
        }
    };

    if !messages.is_empty() {
        return Err(AppError::Validation(messages));
    }

    Ok(NewDocument {
        title: title.unwrap(),
        description,
        category: category.unwrap(),
        is_public: is_public.unwrap(),
    })
}
