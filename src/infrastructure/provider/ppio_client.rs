use super::error::ProviderError;
use super::transport::{SpeechTransport, VoiceCloneRequest};
use super::{ProviderHealth, VoiceProvider};
use crate::domain::voice::{text_preview, AudioArtifact, Speaker, SpeakerInfo, VoiceMap};
use async_trait::async_trait;
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "speech-02-hd";
pub const DEFAULT_MOCK_AUDIO_URL: &str = "https://www2.cs.uic.edu/~i101/SoundFiles/BabyElephantWalk60.wav";
/// The provider recommends staying under 500 characters per call
pub const MAX_TEXT_LENGTH: usize = 500;

const SENTENCE_TERMINATORS: [char; 6] = ['.', '!', '?', '。', '！', '？'];

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub model: String,
    pub max_text_length: usize,
    /// Additional attempts after the first failed one
    pub max_retries: u32,
    /// Attempt `n` waits `n` of these before retrying
    pub backoff_unit: Duration,
    pub mock_mode: bool,
    pub mock_audio_url: String,
    pub mock_delay: Duration,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_text_length: MAX_TEXT_LENGTH,
            max_retries: 3,
            backoff_unit: Duration::from_secs(2),
            mock_mode: false,
            mock_audio_url: DEFAULT_MOCK_AUDIO_URL.to_string(),
            mock_delay: Duration::from_secs(1),
        }
    }
}

/// Client for the PPIO MiniMax voice-cloning API
pub struct PpioClient {
    transport: Arc<dyn SpeechTransport>,
    voices: VoiceMap,
    settings: ProviderSettings,
}

impl PpioClient {
    pub fn new(transport: Arc<dyn SpeechTransport>, voices: VoiceMap, settings: ProviderSettings) -> Self {
        if settings.mock_mode {
            tracing::warn!("Voice provider running in mock mode, no audio will be synthesized");
        }

        Self {
            transport,
            voices,
            settings,
        }
    }

    /// Run a transport call, retrying classified network failures with linear backoff
    async fn with_retries<T, F, Fut>(&self, operation: &str, mut call: F) -> Result<T, ProviderError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;

            match call().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt <= self.settings.max_retries => {
                    let delay = self.settings.backoff_unit * attempt;
                    tracing::warn!(
                        operation = operation,
                        attempt = attempt,
                        max_attempts = self.settings.max_retries + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Voice provider call failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => {
                    tracing::error!(
                        operation = operation,
                        attempt = attempt,
                        retryable = err.is_retryable(),
                        error = %err,
                        "Voice provider call failed"
                    );
                    return Err(err);
                }
            }
        }
    }

    async fn mock_artifact(&self, prepared: &str, source_length: usize, speaker: Speaker, voice_id: String) -> AudioArtifact {
        tokio::time::sleep(self.settings.mock_delay).await;

        tracing::info!(
            speaker = %speaker,
            audio_url = %self.settings.mock_audio_url,
            "Mock mode, returning sample audio"
        );

        AudioArtifact {
            audio_url: self.settings.mock_audio_url.clone(),
            speaker,
            voice_id,
            text_preview: text_preview(prepared),
            text_length: source_length,
            timestamp: Utc::now(),
            mock: true,
        }
    }
}

#[async_trait]
impl VoiceProvider for PpioClient {
    async fn synthesize(&self, text: &str, speaker: Speaker) -> Result<AudioArtifact, ProviderError> {
        let voice_id = self
            .voices
            .voice_id(speaker)
            .ok_or_else(|| ProviderError::UnknownSpeaker(speaker.to_string()))?
            .to_string();

        let prepared = preprocess_text(text, self.settings.max_text_length)?;
        let source_length = text.chars().count();

        tracing::info!(
            speaker = %speaker,
            voice_id = %voice_id,
            text_length = prepared.chars().count(),
            "Starting voice synthesis"
        );

        if self.settings.mock_mode {
            return Ok(self.mock_artifact(&prepared, source_length, speaker, voice_id).await);
        }

        let request = VoiceCloneRequest {
            voice_id: voice_id.clone(),
            text: prepared.clone(),
            model: self.settings.model.clone(),
            need_noise_reduction: true,
            need_volume_normalization: true,
        };

        let start_time = std::time::Instant::now();
        let response = self
            .with_retries("synthesize", || self.transport.send(&request))
            .await?;

        let audio_url = response
            .demo_audio_url
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| {
                tracing::error!(speaker = %speaker, "Provider response has no audio url");
                ProviderError::MissingAudioUrl
            })?;

        tracing::info!(
            provider = "ppio",
            speaker = %speaker,
            latency_ms = start_time.elapsed().as_millis() as u64,
            audio_url = %audio_url,
            "Voice synthesis completed"
        );

        Ok(AudioArtifact {
            audio_url,
            speaker,
            voice_id: response.voice_id.unwrap_or(voice_id),
            text_preview: text_preview(&prepared),
            text_length: source_length,
            timestamp: Utc::now(),
            mock: false,
        })
    }

    async fn download(&self, audio_url: &str) -> Result<Vec<u8>, ProviderError> {
        self.with_retries("download", || self.transport.download(audio_url))
            .await
    }

    fn speakers(&self) -> Vec<SpeakerInfo> {
        self.voices
            .speakers()
            .into_iter()
            .filter_map(|speaker| {
                self.voices.voice_id(speaker).map(|voice_id| SpeakerInfo {
                    name: speaker,
                    voice_id: voice_id.to_string(),
                    display_name: speaker.display_name().to_string(),
                })
            })
            .collect()
    }

    fn voice_id(&self, speaker: Speaker) -> Option<String> {
        self.voices.voice_id(speaker).map(str::to_string)
    }

    fn is_mock(&self) -> bool {
        self.settings.mock_mode
    }

    async fn health_check(&self) -> ProviderHealth {
        if self.settings.mock_mode {
            return ProviderHealth::Mock;
        }

        match self.transport.probe().await {
            Ok(()) => ProviderHealth::Healthy,
            Err(err) => {
                tracing::warn!(error = %err, "Voice provider health probe failed");
                ProviderHealth::Unhealthy(err.to_string())
            }
        }
    }
}

/// Normalize text for a single provider call.
///
/// Collapses whitespace and, past `max_length` characters, truncates; the cut moves back to
/// the last sentence terminator when one exists in the final 20% of the allowed length.
pub fn preprocess_text(text: &str, max_length: usize) -> Result<String, ProviderError> {
    let cleaned = WHITESPACE.replace_all(text.trim(), " ").into_owned();
    if cleaned.is_empty() {
        return Err(ProviderError::EmptyText);
    }

    if cleaned.chars().count() <= max_length {
        return Ok(cleaned);
    }

    let truncated: String = cleaned.chars().take(max_length).collect();
    let last_break = truncated
        .chars()
        .enumerate()
        .filter(|(_, c)| SENTENCE_TERMINATORS.contains(c))
        .map(|(index, _)| index)
        .last();

    tracing::debug!(
        original_length = cleaned.chars().count(),
        max_length = max_length,
        "Text too long for one provider call, truncating"
    );

    match last_break {
        Some(index) if index * 5 > max_length * 4 => Ok(truncated.chars().take(index + 1).collect()),
        _ => Ok(truncated),
    }
}
