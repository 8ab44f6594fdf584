use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::{
    controllers::{parse_comment_id, parse_language, parse_speaker},
    domain::{
        comment::{Comment, CommentServiceApi, CommentStats, CommentSummary, Pagination},
        voice::{
            BatchResult, CacheStats, CommentAudio, Language, Speaker, VoiceServiceApi, WarmupOutcome,
            WarmupServiceApi, DEFAULT_WARMUP_LIMIT, MAX_WARMUP_LIMIT,
        },
    },
    error::AppResult,
};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LanguageQuery {
    pub lang: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WarmupRequest {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct CommentListResponse {
    pub success: bool,
    pub data: Vec<CommentSummary>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub struct CommentDetailResponse {
    pub success: bool,
    pub data: Comment,
    pub stats: CommentStats,
}

#[derive(Debug, Serialize)]
pub struct CommentMetadata {
    pub gmail: Option<String>,
    pub github_repo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioStatistics {
    pub available: usize,
    pub missing: usize,
    pub available_speakers: Vec<Speaker>,
    pub missing_speakers: Vec<Speaker>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentAudioListResponse {
    pub success: bool,
    pub comment_id: String,
    pub audios: BTreeMap<Speaker, CommentAudio>,
    pub metadata: CommentMetadata,
    pub statistics: AudioStatistics,
}

#[derive(Debug, Serialize)]
pub struct SpeakerAudioResponse {
    pub success: bool,
    #[serde(flatten)]
    pub audio: CommentAudio,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheClearedResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_id: Option<String>,
    pub cleared_count: usize,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct CacheStatsResponse {
    pub success: bool,
    pub cache: CacheStats,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct WarmupResponse {
    pub success: bool,
    pub results: Vec<WarmupOutcome>,
    pub message: String,
}

pub struct CommentController {
    comment_service: Arc<dyn CommentServiceApi>,
    voice_service: Arc<dyn VoiceServiceApi>,
    warmup_service: Arc<dyn WarmupServiceApi>,
}

impl CommentController {
    pub fn new(
        comment_service: Arc<dyn CommentServiceApi>,
        voice_service: Arc<dyn VoiceServiceApi>,
        warmup_service: Arc<dyn WarmupServiceApi>,
    ) -> Self {
        Self {
            comment_service,
            voice_service,
            warmup_service,
        }
    }

    /// GET /api/comments?page&limit&search
    pub async fn list_comments(
        State(controller): State<Arc<CommentController>>,
        Query(query): Query<ListQuery>,
    ) -> AppResult<Json<CommentListResponse>> {
        // Unparseable numbers fall back to defaults
        let page = query.page.and_then(|p| p.trim().parse::<i64>().ok());
        let limit = query.limit.and_then(|l| l.trim().parse::<i64>().ok());

        let result = controller
            .comment_service
            .list_comments(page, limit, query.search)
            .await?;

        Ok(Json(CommentListResponse {
            success: true,
            data: result.data,
            pagination: result.pagination,
        }))
    }

    /// GET /api/comments/:id
    pub async fn get_comment(
        State(controller): State<Arc<CommentController>>,
        Path(id): Path<String>,
    ) -> AppResult<Json<CommentDetailResponse>> {
        let comment_id = parse_comment_id(&id)?;
        let (comment, stats) = controller.comment_service.comment_stats(comment_id).await?;

        Ok(Json(CommentDetailResponse {
            success: true,
            data: comment,
            stats,
        }))
    }

    /// GET /api/comments/:id/audio - Cached English audio for every judge
    pub async fn list_audio(
        State(controller): State<Arc<CommentController>>,
        Path(id): Path<String>,
    ) -> AppResult<Json<CommentAudioListResponse>> {
        let comment_id = parse_comment_id(&id)?;
        let (comment, summary) = controller
            .voice_service
            .cached_audio(comment_id, Language::English)
            .await?;

        Ok(Json(CommentAudioListResponse {
            success: true,
            comment_id: comment_id.to_string(),
            audios: summary.audios,
            metadata: CommentMetadata {
                gmail: comment.gmail,
                github_repo_url: comment.github_repo_url,
                created_at: comment.created_at,
            },
            statistics: AudioStatistics {
                available: summary.available_speakers.len(),
                missing: summary.missing_speakers.len(),
                available_speakers: summary.available_speakers,
                missing_speakers: summary.missing_speakers,
            },
        }))
    }

    /// GET /api/comments/:id/audio/:speaker?lang=en|cn - Generated on demand when not cached
    pub async fn speaker_audio(
        State(controller): State<Arc<CommentController>>,
        Path((id, speaker)): Path<(String, String)>,
        Query(query): Query<LanguageQuery>,
    ) -> AppResult<Json<SpeakerAudioResponse>> {
        let comment_id = parse_comment_id(&id)?;
        let speaker = parse_speaker(&speaker)?;
        let language = parse_language(query.lang.as_deref())?;

        let audio = controller
            .voice_service
            .generate_one(comment_id, speaker, language)
            .await?;

        Ok(Json(SpeakerAudioResponse {
            success: true,
            audio,
        }))
    }

    /// POST /api/comments/:id/generate-all?lang=en|cn
    pub async fn generate_all(
        State(controller): State<Arc<CommentController>>,
        Path(id): Path<String>,
        Query(query): Query<LanguageQuery>,
    ) -> AppResult<Json<BatchResult>> {
        let comment_id = parse_comment_id(&id)?;
        let language = parse_language(query.lang.as_deref())?;

        let result = controller
            .voice_service
            .generate_all(comment_id, language)
            .await?;

        Ok(Json(result))
    }

    /// DELETE /api/comments/:id/cache
    pub async fn clear_comment_cache(
        State(controller): State<Arc<CommentController>>,
        Path(id): Path<String>,
    ) -> AppResult<Json<CacheClearedResponse>> {
        let comment_id = parse_comment_id(&id)?;
        let cleared = controller.voice_service.invalidate(comment_id).await;

        Ok(Json(CacheClearedResponse {
            success: true,
            comment_id: Some(comment_id.to_string()),
            cleared_count: cleared,
            message: format!("Cleared {} cached audio entries", cleared),
        }))
    }

    /// DELETE /api/comments/cache
    pub async fn clear_all_cache(
        State(controller): State<Arc<CommentController>>,
    ) -> AppResult<Json<CacheClearedResponse>> {
        let cleared = controller.voice_service.clear_cache().await;

        Ok(Json(CacheClearedResponse {
            success: true,
            comment_id: None,
            cleared_count: cleared,
            message: format!("Cleared {} cached audio entries", cleared),
        }))
    }

    /// GET /api/comments/cache/stats
    pub async fn cache_stats(State(controller): State<Arc<CommentController>>) -> Json<CacheStatsResponse> {
        Json(CacheStatsResponse {
            success: true,
            cache: controller.voice_service.cache_stats(),
            timestamp: Utc::now(),
        })
    }

    /// POST /api/comments/cache/warmup {limit}
    pub async fn warmup(
        State(controller): State<Arc<CommentController>>,
        body: Option<Json<WarmupRequest>>,
    ) -> AppResult<Json<WarmupResponse>> {
        let limit = body
            .and_then(|Json(request)| request.limit)
            .filter(|limit| *limit > 0)
            .map(|limit| (limit as usize).min(MAX_WARMUP_LIMIT))
            .unwrap_or(DEFAULT_WARMUP_LIMIT);

        let results = controller.warmup_service.warmup(limit).await?;

        Ok(Json(WarmupResponse {
            success: true,
            message: format!("Cache warmup finished, processed {} comments", results.len()),
            results,
        }))
    }
}
