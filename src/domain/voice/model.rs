use super::language::Language;
use super::speaker::Speaker;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const PREVIEW_CHARS: usize = 50;

/// Result of synthesizing one piece of text with one voice.
/// Never mutated after creation; regenerating produces a new artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioArtifact {
    pub audio_url: String,
    pub speaker: Speaker,
    pub voice_id: String,
    pub text_preview: String,
    pub text_length: usize,
    pub timestamp: DateTime<Utc>,
    /// Set when the artifact came from the simulated provider
    #[serde(default)]
    pub mock: bool,
}

/// First 50 characters of the text, with an ellipsis when truncated
pub fn text_preview(text: &str) -> String {
    preview_with_limit(text, PREVIEW_CHARS)
}

pub fn preview_with_limit(text: &str, limit: usize) -> String {
    if text.chars().count() > limit {
        let head: String = text.chars().take(limit).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

/// Cached audio for one (comment, speaker, language)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentAudio {
    pub comment_id: String,
    pub language: Language,
    pub text: String,
    #[serde(flatten)]
    pub artifact: AudioArtifact,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedSpeaker {
    pub speaker: Speaker,
    pub error: String,
    pub language: Language,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchStatistics {
    pub total: usize,
    pub generated: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Aggregate outcome of generating every speaker of one comment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    pub success: bool,
    pub comment_id: String,
    pub language: Language,
    pub audios: BTreeMap<Speaker, CommentAudio>,
    pub generated: Vec<Speaker>,
    pub failed: Vec<FailedSpeaker>,
    pub skipped: Vec<Speaker>,
    /// Seconds spent on the whole batch
    pub total_time: f64,
    pub statistics: BatchStatistics,
    pub message: String,
}

/// Cached English audio for a comment, split by availability
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedAudioSummary {
    pub audios: BTreeMap<Speaker, CommentAudio>,
    pub available_speakers: Vec<Speaker>,
    pub missing_speakers: Vec<Speaker>,
}

/// Per-comment outcome of a warmup run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarmupOutcome {
    pub comment_id: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
