//! In-memory collaborators shared by unit and e2e tests

use crate::domain::article::{Article, GenerationRecord, GenerationStatus};
use crate::domain::comment::Comment;
use crate::domain::voice::{text_preview, AudioArtifact, Speaker, SpeakerInfo, VoiceMap};
use crate::error::{AppError, AppResult};
use crate::infrastructure::provider::{ProviderError, ProviderHealth, VoiceProvider};
use crate::infrastructure::repositories::{ArticleRepository, CommentRepository, GenerationRepository};
use crate::infrastructure::storage::{AudioStorage, StorageError};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::time::Duration;
use tokio::time::Instant;
use uuid::Uuid;

pub struct FakeProvider {
    voices: VoiceMap,
    failing: HashSet<Speaker>,
    delay: Duration,
    mock: bool,
    calls: Mutex<Vec<(Instant, Speaker, String)>>,
    downloads: Mutex<Vec<String>>,
}

impl FakeProvider {
    pub const MOCK_URL: &'static str = "https://audio.example.com/mock.wav";

    pub fn new() -> Self {
        Self::with_speakers(&Speaker::ALL)
    }

    pub fn with_speakers(speakers: &[Speaker]) -> Self {
        let voices = speakers.iter().fold(VoiceMap::new(), |voices, speaker| {
            voices.with_voice(*speaker, format!("voice-{}", speaker))
        });

        Self {
            voices,
            failing: HashSet::new(),
            delay: Duration::ZERO,
            mock: false,
            calls: Mutex::new(Vec::new()),
            downloads: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_for(mut self, speaker: Speaker) -> Self {
        self.failing.insert(speaker);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn mocked(mut self) -> Self {
        self.mock = true;
        self
    }

    pub fn calls(&self) -> Vec<(Speaker, String)> {
        self.calls
            .lock()
            .iter()
            .map(|(_, speaker, text)| (*speaker, text.clone()))
            .collect()
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().iter().map(|(at, _, _)| *at).collect()
    }

    pub fn downloads(&self) -> Vec<String> {
        self.downloads.lock().clone()
    }
}

#[async_trait]
impl VoiceProvider for FakeProvider {
    async fn synthesize(&self, text: &str, speaker: Speaker) -> Result<AudioArtifact, ProviderError> {
        let voice_id = self
            .voice_id(speaker)
            .ok_or_else(|| ProviderError::UnknownSpeaker(speaker.to_string()))?;

        let call_number = {
            let mut calls = self.calls.lock();
            calls.push((Instant::now(), speaker, text.to_string()));
            calls.len()
        };

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if self.failing.contains(&speaker) {
            return Err(ProviderError::Rejected {
                status: 500,
                body: "synthesis failed".to_string(),
            });
        }

        let audio_url = if self.mock {
            Self::MOCK_URL.to_string()
        } else {
            format!("https://audio.example.com/{}/{}.mp3", speaker, call_number)
        };

        Ok(AudioArtifact {
            audio_url,
            speaker,
            voice_id,
            text_preview: text_preview(text),
            text_length: text.chars().count(),
            timestamp: Utc::now(),
            mock: self.mock,
        })
    }

    async fn download(&self, audio_url: &str) -> Result<Vec<u8>, ProviderError> {
        self.downloads.lock().push(audio_url.to_string());
        Ok(b"ID3-fake-audio".to_vec())
    }

    fn speakers(&self) -> Vec<SpeakerInfo> {
        self.voices
            .speakers()
            .into_iter()
            .map(|speaker| SpeakerInfo {
                name: speaker,
                voice_id: format!("voice-{}", speaker),
                display_name: speaker.display_name().to_string(),
            })
            .collect()
    }

    fn voice_id(&self, speaker: Speaker) -> Option<String> {
        self.voices.voice_id(speaker).map(str::to_string)
    }

    fn is_mock(&self) -> bool {
        self.mock
    }

    async fn health_check(&self) -> ProviderHealth {
        if self.mock {
            ProviderHealth::Mock
        } else {
            ProviderHealth::Healthy
        }
    }
}

#[derive(Default)]
pub struct InMemoryCommentRepository {
    comments: Mutex<Vec<Comment>>,
}

impl InMemoryCommentRepository {
    pub fn with(comments: Vec<Comment>) -> Self {
        Self {
            comments: Mutex::new(comments),
        }
    }

    fn page(mut rows: Vec<Comment>, limit: i64, offset: i64) -> (Vec<Comment>, i64) {
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = rows.len() as i64;
        let page = rows
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        (page, total)
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Comment>> {
        Ok(self.comments.lock().iter().find(|c| c.id == id).cloned())
    }

    async fn list_recent(&self, limit: i64, offset: i64) -> AppResult<(Vec<Comment>, i64)> {
        let rows = self.comments.lock().clone();
        Ok(Self::page(rows, limit, offset))
    }

    async fn search(&self, query: &str, limit: i64, offset: i64) -> AppResult<(Vec<Comment>, i64)> {
        let needle = query.to_lowercase();
        let rows = self
            .comments
            .lock()
            .iter()
            .filter(|c| {
                [
                    &c.gmail,
                    &c.github_repo_url,
                    &c.comment_en_ng,
                    &c.comment_en_paul,
                    &c.comment_en_li,
                    &c.comment_en_sam,
                ]
                .into_iter()
                .flatten()
                .any(|field| field.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect();
        Ok(Self::page(rows, limit, offset))
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryArticleRepository {
    articles: Vec<Article>,
}

impl InMemoryArticleRepository {
    pub fn with(articles: Vec<Article>) -> Self {
        Self { articles }
    }
}

#[async_trait]
impl ArticleRepository for InMemoryArticleRepository {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Article>> {
        Ok(self.articles.iter().find(|a| a.id == id).cloned())
    }
}

#[derive(Default)]
pub struct InMemoryGenerationRepository {
    records: Mutex<Vec<GenerationRecord>>,
}

impl InMemoryGenerationRepository {
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    fn update(&self, id: Uuid, apply: impl FnOnce(&mut GenerationRecord)) -> AppResult<GenerationRecord> {
        let mut records = self.records.lock();
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::NotFound(format!("generation {}", id)))?;
        apply(record);
        record.updated_at = Utc::now();
        Ok(record.clone())
    }
}

#[async_trait]
impl GenerationRepository for InMemoryGenerationRepository {
    async fn find_completed(&self, article_id: i64, speaker: Speaker) -> AppResult<Option<GenerationRecord>> {
        Ok(self
            .records
            .lock()
            .iter()
            .find(|r| {
                r.article_id == article_id
                    && r.speaker == speaker.as_str()
                    && r.status == GenerationStatus::Completed
            })
            .cloned())
    }

    async fn find_latest(&self, article_id: i64, speaker: Speaker) -> AppResult<Option<GenerationRecord>> {
        Ok(self
            .records
            .lock()
            .iter()
            .find(|r| r.article_id == article_id && r.speaker == speaker.as_str())
            .cloned())
    }

    async fn begin(&self, article_id: i64, speaker: Speaker) -> AppResult<GenerationRecord> {
        let mut records = self.records.lock();
        let now = Utc::now();

        if let Some(record) = records
            .iter_mut()
            .find(|r| r.article_id == article_id && r.speaker == speaker.as_str())
        {
            record.status = GenerationStatus::Processing;
            record.audio_urls.clear();
            record.segments_count = 0;
            record.processing_time = None;
            record.error_message = None;
            record.completed_at = None;
            record.updated_at = now;
            return Ok(record.clone());
        }

        let record = GenerationRecord {
            id: Uuid::new_v4(),
            article_id,
            speaker: speaker.as_str().to_string(),
            status: GenerationStatus::Processing,
            audio_urls: Vec::new(),
            segments_count: 0,
            processing_time: None,
            error_message: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        };
        records.push(record.clone());
        Ok(record)
    }

    async fn complete(
        &self,
        id: Uuid,
        audio_urls: &[String],
        processing_time: i32,
    ) -> AppResult<GenerationRecord> {
        self.update(id, |record| {
            record.status = GenerationStatus::Completed;
            record.audio_urls = audio_urls.to_vec();
            record.segments_count = audio_urls.len() as i32;
            record.processing_time = Some(processing_time);
            record.completed_at = Some(Utc::now());
        })
    }

    async fn fail(&self, id: Uuid, error_message: &str, processing_time: i32) -> AppResult<GenerationRecord> {
        self.update(id, |record| {
            record.status = GenerationStatus::Failed;
            record.error_message = Some(error_message.to_string());
            record.processing_time = Some(processing_time);
        })
    }
}

#[derive(Default)]
pub struct RecordingStorage {
    uploads: Mutex<Vec<String>>,
    fail_next: Mutex<bool>,
}

impl RecordingStorage {
    pub fn paths(&self) -> Vec<String> {
        self.uploads.lock().clone()
    }

    pub fn fail_next_upload(&self) {
        *self.fail_next.lock() = true;
    }
}

#[async_trait]
impl AudioStorage for RecordingStorage {
    async fn upload(&self, path: &str, _bytes: Vec<u8>, _content_type: &str) -> Result<String, StorageError> {
        let should_fail = std::mem::take(&mut *self.fail_next.lock());
        if should_fail {
            return Err(StorageError::Rejected {
                status: 503,
                body: "bucket unavailable".to_string(),
            });
        }

        self.uploads.lock().push(path.to_string());
        Ok(format!("https://storage.example.com/{}", path))
    }
}
