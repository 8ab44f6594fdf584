use super::error::VoiceServiceError;
use super::language::Language;
use super::model::WarmupOutcome;
use super::service::VoiceServiceApi;
use crate::infrastructure::repositories::CommentRepository;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_WARMUP_LIMIT: usize = 5;
pub const MAX_WARMUP_LIMIT: usize = 10;

/// Pre-generates English audio for the newest comments
pub struct WarmupService {
    comment_repo: Arc<dyn CommentRepository>,
    voice_service: Arc<dyn VoiceServiceApi>,
    between_subjects: Duration,
}

impl WarmupService {
    pub fn new(
        comment_repo: Arc<dyn CommentRepository>,
        voice_service: Arc<dyn VoiceServiceApi>,
        between_subjects: Duration,
    ) -> Self {
        Self {
            comment_repo,
            voice_service,
            between_subjects,
        }
    }
}

#[async_trait]
pub trait WarmupServiceApi: Send + Sync {
    /// Run a batch over the `limit` most recent comments, one after another.
    /// A failing comment is reported in its outcome and does not stop the run.
    async fn warmup(&self, limit: usize) -> Result<Vec<WarmupOutcome>, VoiceServiceError>;
}

#[async_trait]
impl WarmupServiceApi for WarmupService {
    async fn warmup(&self, limit: usize) -> Result<Vec<WarmupOutcome>, VoiceServiceError> {
        let limit = limit.clamp(1, MAX_WARMUP_LIMIT);
        let (comments, _) = self
            .comment_repo
            .list_recent(limit as i64, 0)
            .await
            .map_err(|e| VoiceServiceError::Dependency(e.to_string()))?;

        tracing::info!(limit = limit, found = comments.len(), "Starting cache warmup");

        let mut outcomes = Vec::with_capacity(comments.len());
        for (index, comment) in comments.iter().enumerate() {
            if index > 0 && !self.between_subjects.is_zero() {
                tokio::time::sleep(self.between_subjects).await;
            }

            let outcome = match self.voice_service.generate_all(comment.id, Language::English).await {
                Ok(result) => WarmupOutcome {
                    comment_id: comment.id.to_string(),
                    success: result.success,
                    generated: Some(result.generated.len()),
                    error: None,
                },
                Err(err) => {
                    tracing::warn!(comment_id = %comment.id, error = %err, "Warmup failed for comment");
                    WarmupOutcome {
                        comment_id: comment.id.to_string(),
                        success: false,
                        generated: None,
                        error: Some(err.to_string()),
                    }
                }
            };
            outcomes.push(outcome);
        }

        tracing::info!(processed = outcomes.len(), "Cache warmup completed");
        Ok(outcomes)
    }
}
