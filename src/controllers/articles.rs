use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    controllers::{parse_article_id, parse_speaker},
    domain::article::{ArticleVoiceServiceApi, GenerationRecord},
    error::{AppError, AppResult},
};

/// Request for POST /api/articles/:id/voice
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleVoiceRequest {
    pub speaker: Option<String>,
    #[serde(default)]
    pub force_regenerate: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ArticleVoiceResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: GenerationRecord,
}

pub struct ArticleController {
    article_service: Arc<dyn ArticleVoiceServiceApi>,
}

impl ArticleController {
    pub fn new(article_service: Arc<dyn ArticleVoiceServiceApi>) -> Self {
        Self { article_service }
    }

    /// POST /api/articles/:id/voice - Narrate an article, reusing finished audio
    pub async fn generate_voice(
        State(controller): State<Arc<ArticleController>>,
        Path(id): Path<String>,
        Json(request): Json<ArticleVoiceRequest>,
    ) -> AppResult<Json<ArticleVoiceResponse>> {
        let article_id = parse_article_id(&id)?;
        let speaker = request
            .speaker
            .as_deref()
            .ok_or_else(|| AppError::BadRequest("Missing required parameter: speaker".to_string()))?;
        let speaker = parse_speaker(speaker)?;

        let generation = controller
            .article_service
            .generate(article_id, speaker, request.force_regenerate)
            .await?;

        let message = if generation.reused {
            "Voice already exists"
        } else {
            "Voice generation completed"
        };

        Ok(Json(ArticleVoiceResponse {
            success: true,
            message: Some(message.to_string()),
            data: generation.record,
        }))
    }

    /// GET /api/articles/:id/voice/:speaker - Latest generation record
    pub async fn voice_status(
        State(controller): State<Arc<ArticleController>>,
        Path((id, speaker)): Path<(String, String)>,
    ) -> AppResult<Json<ArticleVoiceResponse>> {
        let article_id = parse_article_id(&id)?;
        let speaker = parse_speaker(&speaker)?;

        let record = controller.article_service.status(article_id, speaker).await?;

        Ok(Json(ArticleVoiceResponse {
            success: true,
            message: None,
            data: record,
        }))
    }
}
