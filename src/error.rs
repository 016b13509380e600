use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("You must be signed in first!")]
    Unauthenticated,

    #[error("{0}")]
    Forbidden(String),

    #[error("Validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("This leave request has already been reviewed!")]
    AlreadyReviewed,

    #[error("Blob store error: {0}")]
    BlobStore(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Convenience constructor for single-message validation failures.
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(vec![msg.into()])
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}
