use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum CommentServiceError {
    #[error("dependency error: {0}")]
    Dependency(String),
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("comment not found")]
    NotFound,
}

impl From<CommentServiceError> for AppError {
    fn from(err: CommentServiceError) -> Self {
        match err {
            CommentServiceError::Invalid(msg) => AppError::BadRequest(msg),
            CommentServiceError::NotFound => AppError::NotFound("Comment not found".to_string()),
            CommentServiceError::Dependency(msg) => AppError::Internal(msg),
        }
    }
}
