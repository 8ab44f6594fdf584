use super::model::{Article, ArticleGeneration, GenerationRecord};
use crate::domain::voice::{
    chunk_text, InFlightSet, Speaker, SubjectId, VoiceServiceError, DEFAULT_CHUNK_LENGTH,
};
use crate::infrastructure::provider::VoiceProvider;
use crate::infrastructure::repositories::{ArticleRepository, GenerationRepository};
use crate::infrastructure::storage::{AudioStorage, AUDIO_CONTENT_TYPE};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

const ALL_SEGMENTS_FAILED: &str = "all voice segments failed to generate";

/// Chunked article narration persisted to object storage and tracked in generation records
pub struct ArticleVoiceService {
    article_repo: Arc<dyn ArticleRepository>,
    generation_repo: Arc<dyn GenerationRepository>,
    provider: Arc<dyn VoiceProvider>,
    storage: Arc<dyn AudioStorage>,
    in_flight: InFlightSet,
    between_chunks: Duration,
}

impl ArticleVoiceService {
    pub fn new(
        article_repo: Arc<dyn ArticleRepository>,
        generation_repo: Arc<dyn GenerationRepository>,
        provider: Arc<dyn VoiceProvider>,
        storage: Arc<dyn AudioStorage>,
        in_flight: InFlightSet,
        between_chunks: Duration,
    ) -> Self {
        Self {
            article_repo,
            generation_repo,
            provider,
            storage,
            in_flight,
            between_chunks,
        }
    }
}

#[async_trait]
pub trait ArticleVoiceServiceApi: Send + Sync {
    /// Narrate an article with one speaker.
    ///
    /// A completed earlier generation is returned as is unless `force_regenerate` is set.
    /// Segments that fail are skipped; the generation fails only when none succeed.
    async fn generate(
        &self,
        article_id: i64,
        speaker: Speaker,
        force_regenerate: bool,
    ) -> Result<ArticleGeneration, VoiceServiceError>;

    async fn status(&self, article_id: i64, speaker: Speaker) -> Result<GenerationRecord, VoiceServiceError>;

    async fn find_article(&self, article_id: i64) -> Result<Article, VoiceServiceError>;
}

#[async_trait]
impl ArticleVoiceServiceApi for ArticleVoiceService {
    async fn generate(
        &self,
        article_id: i64,
        speaker: Speaker,
        force_regenerate: bool,
    ) -> Result<ArticleGeneration, VoiceServiceError> {
        if !force_regenerate {
            let existing = self
                .generation_repo
                .find_completed(article_id, speaker)
                .await
                .map_err(|e| VoiceServiceError::Dependency(e.to_string()))?;

            if let Some(record) = existing {
                tracing::info!(article_id, speaker = %speaker, "Reusing completed article voice");
                return Ok(ArticleGeneration {
                    record,
                    reused: true,
                });
            }
        }

        let article = self.find_article(article_id).await?;

        if self.provider.voice_id(speaker).is_none() {
            return Err(VoiceServiceError::UnknownSpeaker(speaker.to_string()));
        }

        let subject = SubjectId::article(article_id);
        let _claim = self
            .in_flight
            .try_claim_target(&subject, speaker, article.language())
            .ok_or_else(|| {
                VoiceServiceError::AlreadyInProgress(format!("{}_{}", subject, speaker))
            })?;

        let record = self
            .generation_repo
            .begin(article_id, speaker)
            .await
            .map_err(|e| VoiceServiceError::Dependency(e.to_string()))?;

        let chunks = chunk_text(&article.content, DEFAULT_CHUNK_LENGTH);
        tracing::info!(
            article_id,
            speaker = %speaker,
            segments = chunks.len(),
            "Starting article voice generation"
        );

        let started = Instant::now();
        let mut audio_urls = Vec::with_capacity(chunks.len());

        for (index, chunk) in chunks.iter().enumerate() {
            if index > 0 && !self.between_chunks.is_zero() {
                tokio::time::sleep(self.between_chunks).await;
            }

            match self.render_segment(article_id, speaker, index, chunk).await {
                Ok(url) => {
                    tracing::debug!(article_id, segment = index + 1, audio_url = %url, "Segment completed");
                    audio_urls.push(url);
                }
                Err(err) => {
                    tracing::warn!(
                        article_id,
                        segment = index + 1,
                        total = chunks.len(),
                        error = %err,
                        "Segment failed, continuing"
                    );
                }
            }
        }

        let processing_time = started.elapsed().as_secs_f64().round() as i32;

        if audio_urls.is_empty() {
            self.generation_repo
                .fail(record.id, ALL_SEGMENTS_FAILED, processing_time)
                .await
                .map_err(|e| VoiceServiceError::Dependency(e.to_string()))?;

            tracing::error!(article_id, speaker = %speaker, "Article voice generation failed");
            return Err(VoiceServiceError::GenerationFailed(ALL_SEGMENTS_FAILED.to_string()));
        }

        let record = self
            .generation_repo
            .complete(record.id, &audio_urls, processing_time)
            .await
            .map_err(|e| VoiceServiceError::Dependency(e.to_string()))?;

        tracing::info!(
            article_id,
            speaker = %speaker,
            segments = audio_urls.len(),
            processing_time_secs = processing_time,
            "Article voice generation completed"
        );

        Ok(ArticleGeneration {
            record,
            reused: false,
        })
    }

    async fn status(&self, article_id: i64, speaker: Speaker) -> Result<GenerationRecord, VoiceServiceError> {
        self.generation_repo
            .find_latest(article_id, speaker)
            .await
            .map_err(|e| VoiceServiceError::Dependency(e.to_string()))?
            .ok_or_else(|| {
                VoiceServiceError::NotFound(format!("voice generation for article {} ({})", article_id, speaker))
            })
    }

    async fn find_article(&self, article_id: i64) -> Result<Article, VoiceServiceError> {
        self.article_repo
            .find_by_id(article_id)
            .await
            .map_err(|e| VoiceServiceError::Dependency(e.to_string()))?
            .ok_or_else(|| VoiceServiceError::NotFound(format!("article {}", article_id)))
    }
}

impl ArticleVoiceService {
    /// Synthesize one chunk and move its audio into storage, returning the stored url
    async fn render_segment(
        &self,
        article_id: i64,
        speaker: Speaker,
        index: usize,
        chunk: &str,
    ) -> Result<String, VoiceServiceError> {
        let artifact = self.provider.synthesize(chunk, speaker).await?;

        // Simulated audio has nothing worth copying
        if artifact.mock {
            return Ok(artifact.audio_url);
        }

        let bytes = self.provider.download(&artifact.audio_url).await?;
        let path = segment_path(article_id, speaker, index);

        self.storage
            .upload(&path, bytes, AUDIO_CONTENT_TYPE)
            .await
            .map_err(|e| VoiceServiceError::StorageUploadFailed(e.to_string()))
    }
}

fn segment_path(article_id: i64, speaker: Speaker, index: usize) -> String {
    format!(
        "articles/{}/{}_part{:02}_{}.mp3",
        article_id,
        speaker,
        index + 1,
        Utc::now().timestamp_millis()
    )
}
