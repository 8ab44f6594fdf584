use crate::domain::voice::{preview_with_limit, Language, Speaker};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;
use uuid::Uuid;

const LIST_PREVIEW_CHARS: usize = 100;

/// Order in which a batch walks the judges of a comment
pub const GENERATION_ORDER: [Speaker; 4] = [
    Speaker::WuEnda,
    Speaker::PaulGraham,
    Speaker::FeiFeiLi,
    Speaker::SamAltman,
];

/// Row of `judge_comments`: one submission reviewed by four judges in two languages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub gmail: Option<String>,
    pub github_repo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub comment_en_ng: Option<String>,
    pub comment_en_paul: Option<String>,
    pub comment_en_li: Option<String>,
    pub comment_en_sam: Option<String>,
    pub comment_cn_ng: Option<String>,
    pub comment_cn_paul: Option<String>,
    pub comment_cn_li: Option<String>,
    pub comment_cn_sam: Option<String>,
}

impl Comment {
    /// Raw column for a judge and language, blank or not
    pub fn text_for(&self, speaker: Speaker, language: Language) -> Option<&str> {
        let column = match (language, speaker) {
            (Language::English, Speaker::WuEnda) => &self.comment_en_ng,
            (Language::English, Speaker::PaulGraham) => &self.comment_en_paul,
            (Language::English, Speaker::FeiFeiLi) => &self.comment_en_li,
            (Language::English, Speaker::SamAltman) => &self.comment_en_sam,
            (Language::Chinese, Speaker::WuEnda) => &self.comment_cn_ng,
            (Language::Chinese, Speaker::PaulGraham) => &self.comment_cn_paul,
            (Language::Chinese, Speaker::FeiFeiLi) => &self.comment_cn_li,
            (Language::Chinese, Speaker::SamAltman) => &self.comment_cn_sam,
        };
        column.as_deref()
    }

    /// Text worth synthesizing: `None` when the column is missing or whitespace only
    pub fn spoken_text(&self, speaker: Speaker, language: Language) -> Option<&str> {
        self.text_for(speaker, language)
            .filter(|text| !text.trim().is_empty())
    }

    pub fn previews(&self, language: Language) -> BTreeMap<Speaker, TextPreview> {
        GENERATION_ORDER
            .into_iter()
            .map(|speaker| (speaker, TextPreview::of(self.text_for(speaker, language))))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextPreview {
    pub has_text: bool,
    pub preview: Option<String>,
    pub length: usize,
}

impl TextPreview {
    pub fn of(text: Option<&str>) -> Self {
        match text {
            Some(text) => Self {
                has_text: !text.trim().is_empty(),
                preview: Some(preview_with_limit(text, LIST_PREVIEW_CHARS)),
                length: text.chars().count(),
            },
            None => Self {
                has_text: false,
                preview: None,
                length: 0,
            },
        }
    }
}

/// Row of GET /api/comments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentSummary {
    pub id: Uuid,
    pub gmail: Option<String>,
    pub github_repo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "hasAudio")]
    pub has_audio: BTreeMap<Speaker, bool>,
    #[serde(rename = "textPreviews")]
    pub text_previews: BTreeMap<Speaker, TextPreview>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

impl Pagination {
    pub fn new(page: i64, limit: i64, total: i64, query: Option<String>) -> Self {
        let total_pages = if limit > 0 { (total + limit - 1) / limit } else { 0 };
        Self {
            page,
            limit,
            total,
            total_pages,
            query,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentPage {
    pub data: Vec<CommentSummary>,
    pub pagination: Pagination,
}

/// Per-language text statistics of one comment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentStats {
    pub id: Uuid,
    pub gmail: Option<String>,
    pub github_repo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub english: BTreeMap<Speaker, TextPreview>,
    pub chinese: BTreeMap<Speaker, TextPreview>,
    pub total_characters: usize,
}

impl From<&Comment> for CommentStats {
    fn from(comment: &Comment) -> Self {
        let english = comment.previews(Language::English);
        let chinese = comment.previews(Language::Chinese);
        let total_characters = english
            .values()
            .chain(chinese.values())
            .map(|preview| preview.length)
            .sum();

        Self {
            id: comment.id,
            gmail: comment.gmail.clone(),
            github_repo_url: comment.github_repo_url.clone(),
            created_at: comment.created_at,
            english,
            chinese,
            total_characters,
        }
    }
}
