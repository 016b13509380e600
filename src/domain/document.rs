use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::blob::BlobRef;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    /// Original name of the uploaded file, shown on download.
    pub file_name: String,
    pub file_ref: BlobRef,
    pub file_type: String,
    pub file_size: i64,
    pub category: Category,
    /// Students may only see/download public documents.
    pub is_public: bool,
    pub uploaded_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Syllabus,
    Notes,
    Assignments,
    Notices,
    Forms,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Syllabus => "syllabus",
            Category::Notes => "notes",
            Category::Assignments => "assignments",
            Category::Notices => "notices",
            Category::Forms => "forms",
            Category::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Category> {
        match s {
            "syllabus" => Some(Category::Syllabus),
            "notes" => Some(Category::Notes),
            "assignments" => Some(Category::Assignments),
            "notices" => Some(Category::Notices),
            "forms" => Some(Category::Forms),
            "other" => Some(Category::Other),
            _ => None,
        }
    }
}

/// Clean field set produced by validation. File metadata is attached by the
/// lifecycle manager from the actual upload, not from caller-submitted fields.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub title: String,
    pub description: Option<String>,
    pub category: Category,
    pub is_public: bool,
}

#[derive(Debug, Clone, Default)]
pub struct DocumentFilter {
    pub public_only: bool,
    pub category: Option<Category>,
}
