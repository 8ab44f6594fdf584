pub mod articles;
pub mod comments;
pub mod health;
pub mod tts;

use axum::http::{Method, Uri};
use uuid::Uuid;

use crate::domain::voice::{Language, Speaker};
use crate::error::AppError;

/// Fallback for unmatched routes
pub async fn not_found(method: Method, uri: Uri) -> AppError {
    AppError::NotFound(format!("Route {} {} does not exist", method, uri.path()))
}

pub(crate) fn parse_comment_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| AppError::BadRequest(format!("Invalid comment id format: {}", raw)))
}

pub(crate) fn parse_article_id(raw: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| AppError::BadRequest(format!("Invalid article id: {}", raw)))
}

pub(crate) fn parse_speaker(raw: &str) -> Result<Speaker, AppError> {
    raw.parse::<Speaker>().map_err(AppError::BadRequest)
}

/// Missing `lang` means English
pub(crate) fn parse_language(raw: Option<&str>) -> Result<Language, AppError> {
    match raw {
        None => Ok(Language::default()),
        Some(code) => code.parse::<Language>().map_err(AppError::BadRequest),
    }
}
