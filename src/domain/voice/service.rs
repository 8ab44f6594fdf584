use super::cache::{AudioCache, AudioKey, CacheStats};
use super::error::VoiceServiceError;
use super::in_flight::SubjectId;
use super::language::Language;
use super::model::{
    AudioArtifact, BatchResult, BatchStatistics, CachedAudioSummary, CommentAudio, FailedSpeaker,
};
use super::speaker::Speaker;
use crate::domain::comment::{Comment, GENERATION_ORDER};
use crate::infrastructure::provider::VoiceProvider;
use crate::infrastructure::repositories::CommentRepository;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use uuid::Uuid;

/// Sequential delays that keep provider traffic under its rate limits
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pacing {
    pub between_speakers: Duration,
    pub between_chunks: Duration,
    pub between_subjects: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            between_speakers: Duration::from_secs(2),
            between_chunks: Duration::from_secs(2),
            between_subjects: Duration::from_secs(5),
        }
    }
}

impl Pacing {
    pub fn none() -> Self {
        Self {
            between_speakers: Duration::ZERO,
            between_chunks: Duration::ZERO,
            between_subjects: Duration::ZERO,
        }
    }
}

/// Generates and caches judge comment audio, one artifact per judge and language
pub struct VoiceService {
    comment_repo: Arc<dyn CommentRepository>,
    provider: Arc<dyn VoiceProvider>,
    cache: AudioCache,
    pacing: Pacing,
}

impl VoiceService {
    pub fn new(
        comment_repo: Arc<dyn CommentRepository>,
        provider: Arc<dyn VoiceProvider>,
        cache: AudioCache,
        pacing: Pacing,
    ) -> Self {
        Self {
            comment_repo,
            provider,
            cache,
            pacing,
        }
    }
}

#[async_trait]
pub trait VoiceServiceApi: Send + Sync {
    /// Generate every judge's audio for one comment.
    ///
    /// Individual speaker failures are recorded in the result; only a missing comment or
    /// a concurrent batch on the same comment fail the whole call.
    async fn generate_all(
        &self,
        comment_id: Uuid,
        language: Language,
    ) -> Result<BatchResult, VoiceServiceError>;

    /// Cached audio for one judge, synthesized on demand when missing
    async fn generate_one(
        &self,
        comment_id: Uuid,
        speaker: Speaker,
        language: Language,
    ) -> Result<CommentAudio, VoiceServiceError>;

    async fn cached_audio(
        &self,
        comment_id: Uuid,
        language: Language,
    ) -> Result<(Comment, CachedAudioSummary), VoiceServiceError>;

    async fn invalidate(&self, comment_id: Uuid) -> usize;

    async fn clear_cache(&self) -> usize;

    fn cache_stats(&self) -> CacheStats;
}

#[async_trait]
impl VoiceServiceApi for VoiceService {
    async fn generate_all(
        &self,
        comment_id: Uuid,
        language: Language,
    ) -> Result<BatchResult, VoiceServiceError> {
        let started = Instant::now();
        let subject = SubjectId::from(comment_id);
        let comment = self.find_comment(comment_id).await?;

        let _claim = self
            .cache
            .in_flight()
            .try_claim_subject(&subject)
            .ok_or_else(|| VoiceServiceError::AlreadyInProgress(subject.to_string()))?;

        tracing::info!(comment_id = %comment_id, language = %language, "Starting batch voice generation");

        let mut audios = BTreeMap::new();
        let mut generated = Vec::new();
        let mut failed = Vec::new();
        let mut skipped = Vec::new();
        let mut provider_called = false;

        for speaker in GENERATION_ORDER {
            let Some(text) = comment.spoken_text(speaker, language) else {
                tracing::debug!(comment_id = %comment_id, speaker = %speaker, "No text, skipping speaker");
                skipped.push(speaker);
                continue;
            };

            let key = AudioKey::new(subject.clone(), speaker, language);
            if let Some(cached) = self.cache.get(&key).await {
                tracing::debug!(cache_key = %key, "Using cached audio");
                audios.insert(speaker, cached);
                generated.push(speaker);
                continue;
            }

            if provider_called && !self.pacing.between_speakers.is_zero() {
                tokio::time::sleep(self.pacing.between_speakers).await;
            }
            provider_called = true;

            match self.provider.synthesize(text, speaker).await {
                Ok(artifact) => {
                    let audio = comment_audio(comment_id, language, text, artifact);
                    self.cache.put(key, audio.clone()).await;
                    audios.insert(speaker, audio);
                    generated.push(speaker);
                }
                Err(err) => {
                    tracing::warn!(
                        comment_id = %comment_id,
                        speaker = %speaker,
                        error = %err,
                        "Speaker generation failed, continuing with the rest"
                    );
                    failed.push(FailedSpeaker {
                        speaker,
                        error: err.to_string(),
                        language,
                    });
                }
            }
        }

        let statistics = BatchStatistics {
            total: GENERATION_ORDER.len(),
            generated: generated.len(),
            failed: failed.len(),
            skipped: skipped.len(),
        };
        let message = format!(
            "{} audio generation finished: {} generated, {} failed, {} skipped",
            language.display_name(),
            statistics.generated,
            statistics.failed,
            statistics.skipped
        );
        let total_time = started.elapsed().as_secs_f64();

        tracing::info!(
            comment_id = %comment_id,
            generated = statistics.generated,
            failed = statistics.failed,
            skipped = statistics.skipped,
            total_time_secs = total_time,
            "Batch voice generation completed"
        );

        Ok(BatchResult {
            success: !generated.is_empty(),
            comment_id: comment_id.to_string(),
            language,
            audios,
            generated,
            failed,
            skipped,
            total_time,
            statistics,
            message,
        })
    }

    async fn generate_one(
        &self,
        comment_id: Uuid,
        speaker: Speaker,
        language: Language,
    ) -> Result<CommentAudio, VoiceServiceError> {
        let subject = SubjectId::from(comment_id);
        let key = AudioKey::new(subject.clone(), speaker, language);

        if let Some(cached) = self.cache.get(&key).await {
            tracing::debug!(cache_key = %key, "Using cached audio");
            return Ok(cached);
        }

        let comment = self.find_comment(comment_id).await?;
        let text = comment
            .spoken_text(speaker, language)
            .ok_or_else(|| VoiceServiceError::NoContent {
                speaker: speaker.to_string(),
                language: language.to_string(),
            })?;

        let _claim = self
            .cache
            .in_flight()
            .try_claim_target(&subject, speaker, language)
            .ok_or_else(|| VoiceServiceError::AlreadyInProgress(key.to_string()))?;

        tracing::info!(cache_key = %key, "Generating audio on demand");

        let artifact = self.provider.synthesize(text, speaker).await?;
        let audio = comment_audio(comment_id, language, text, artifact);
        self.cache.put(key, audio.clone()).await;

        Ok(audio)
    }

    async fn cached_audio(
        &self,
        comment_id: Uuid,
        language: Language,
    ) -> Result<(Comment, CachedAudioSummary), VoiceServiceError> {
        let comment = self.find_comment(comment_id).await?;
        let subject = SubjectId::from(comment_id);

        let mut summary = CachedAudioSummary {
            audios: BTreeMap::new(),
            available_speakers: Vec::new(),
            missing_speakers: Vec::new(),
        };

        for speaker in GENERATION_ORDER {
            if comment.spoken_text(speaker, language).is_none() {
                continue;
            }
            let key = AudioKey::new(subject.clone(), speaker, language);
            match self.cache.get(&key).await {
                Some(audio) => {
                    summary.audios.insert(speaker, audio);
                    summary.available_speakers.push(speaker);
                }
                None => summary.missing_speakers.push(speaker),
            }
        }

        Ok((comment, summary))
    }

    async fn invalidate(&self, comment_id: Uuid) -> usize {
        self.cache.invalidate(&SubjectId::from(comment_id)).await
    }

    async fn clear_cache(&self) -> usize {
        self.cache.clear().await
    }

    fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

impl VoiceService {
    async fn find_comment(&self, comment_id: Uuid) -> Result<Comment, VoiceServiceError> {
        self.comment_repo
            .find_by_id(comment_id)
            .await
            .map_err(|e| VoiceServiceError::Dependency(e.to_string()))?
            .ok_or_else(|| VoiceServiceError::NotFound(format!("comment {}", comment_id)))
    }
}

fn comment_audio(comment_id: Uuid, language: Language, text: &str, artifact: AudioArtifact) -> CommentAudio {
    CommentAudio {
        comment_id: comment_id.to_string(),
        language,
        text: text.to_string(),
        artifact,
    }
}
