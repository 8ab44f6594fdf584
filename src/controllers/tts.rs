use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    controllers::{parse_article_id, parse_speaker},
    domain::{
        article::ArticleVoiceServiceApi,
        voice::{AudioArtifact, Speaker, SpeakerInfo, VoiceServiceError},
    },
    error::{AppError, AppResult},
    infrastructure::provider::VoiceProvider,
};

/// Article id sent either as a JSON number or a numeric string
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextId {
    Number(i64),
    Text(String),
}

/// Request for POST /api/tts
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TtsRequest {
    pub text_id: Option<TextId>,
    pub text: Option<String>,
    pub speaker: Option<String>,
}

/// Request for POST /api/tts/:speaker
#[derive(Debug, Serialize, Deserialize)]
pub struct SpeakerTtsRequest {
    pub text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TtsResponse {
    pub success: bool,
    pub audio_url: String,
    pub text_preview: String,
    pub speaker: Speaker,
    pub voice_id: String,
    pub timestamp: DateTime<Utc>,
    pub mock: bool,
}

impl From<AudioArtifact> for TtsResponse {
    fn from(artifact: AudioArtifact) -> Self {
        Self {
            success: true,
            audio_url: artifact.audio_url,
            text_preview: artifact.text_preview,
            speaker: artifact.speaker,
            voice_id: artifact.voice_id,
            timestamp: artifact.timestamp,
            mock: artifact.mock,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SpeakersResponse {
    pub success: bool,
    pub speakers: Vec<SpeakerInfo>,
    pub total: usize,
}

pub struct TtsController {
    provider: Arc<dyn VoiceProvider>,
    article_service: Arc<dyn ArticleVoiceServiceApi>,
}

impl TtsController {
    pub fn new(provider: Arc<dyn VoiceProvider>, article_service: Arc<dyn ArticleVoiceServiceApi>) -> Self {
        Self {
            provider,
            article_service,
        }
    }

    /// POST /api/tts - Synthesize stored article text or inline text
    pub async fn synthesize(
        State(controller): State<Arc<TtsController>>,
        Json(request): Json<TtsRequest>,
    ) -> AppResult<Json<TtsResponse>> {
        let speaker = request.speaker.as_deref().ok_or_else(|| {
            AppError::BadRequest(format!(
                "Missing required parameter: speaker. Supported: {}",
                Speaker::supported_names()
            ))
        })?;
        let speaker = parse_speaker(speaker)?;

        let text = match (request.text_id, request.text) {
            (Some(_), Some(_)) => {
                return Err(AppError::BadRequest(
                    "Provide either textId or text, not both".to_string(),
                ))
            }
            (None, None) => {
                return Err(AppError::BadRequest(
                    "One of textId or text is required".to_string(),
                ))
            }
            (None, Some(text)) => text,
            (Some(text_id), None) => {
                let article_id = match text_id {
                    TextId::Number(id) => id,
                    TextId::Text(raw) => parse_article_id(&raw)?,
                };
                let article = controller.article_service.find_article(article_id).await?;
                tracing::debug!(article_id, title = ?article.title, "Synthesizing stored article text");
                article.content
            }
        };

        controller.speak(&text, speaker).await
    }

    /// POST /api/tts/:speaker - Shortcut with the speaker in the path
    pub async fn synthesize_for_speaker(
        State(controller): State<Arc<TtsController>>,
        Path(speaker): Path<String>,
        Json(request): Json<SpeakerTtsRequest>,
    ) -> AppResult<Json<TtsResponse>> {
        let speaker = parse_speaker(&speaker)?;
        let text = request
            .text
            .ok_or_else(|| AppError::BadRequest("Missing required parameter: text".to_string()))?;

        controller.speak(&text, speaker).await
    }

    /// GET /api/tts/speakers - Speakers with a configured voice
    pub async fn speakers(State(controller): State<Arc<TtsController>>) -> Json<SpeakersResponse> {
        let speakers = controller.provider.speakers();
        Json(SpeakersResponse {
            success: true,
            total: speakers.len(),
            speakers,
        })
    }

    async fn speak(&self, text: &str, speaker: Speaker) -> AppResult<Json<TtsResponse>> {
        if text.trim().is_empty() {
            return Err(VoiceServiceError::EmptyText.into());
        }

        let artifact = self
            .provider
            .synthesize(text, speaker)
            .await
            .map_err(VoiceServiceError::from)?;

        Ok(Json(TtsResponse::from(artifact)))
    }
}
