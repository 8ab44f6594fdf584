use crate::domain::voice::Language;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Article {
    pub id: i64,
    pub title: Option<String>,
    pub content: String,
    pub language: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Article {
    /// Declared language, English when missing or unrecognized
    pub fn language(&self) -> Language {
        self.language
            .as_deref()
            .and_then(|code| code.parse().ok())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "text")]
#[sqlx(rename_all = "lowercase")]
pub enum GenerationStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "processing")]
    Processing,
    #[serde(rename = "completed")]
    Completed,
    #[serde(rename = "failed")]
    Failed,
}

impl std::fmt::Display for GenerationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationStatus::Pending => write!(f, "pending"),
            GenerationStatus::Processing => write!(f, "processing"),
            GenerationStatus::Completed => write!(f, "completed"),
            GenerationStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Row of `voice_generations`, one per (article, speaker)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRecord {
    pub id: Uuid,
    pub article_id: i64,
    pub speaker: String,
    pub status: GenerationStatus,
    pub audio_urls: Vec<String>,
    pub segments_count: i32,
    /// Whole seconds spent producing the segments
    pub processing_time: Option<i32>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Outcome of an article generation request
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleGeneration {
    pub record: GenerationRecord,
    /// True when an earlier completed generation was returned untouched
    pub reused: bool,
}
