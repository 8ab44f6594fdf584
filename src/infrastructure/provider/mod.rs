pub mod error;
pub mod ppio_client;
pub mod transport;

pub use error::{ProviderError, TransportErrorKind};
pub use ppio_client::{preprocess_text, PpioClient, ProviderSettings};
pub use transport::{HttpSpeechTransport, SpeechTransport, VoiceCloneRequest, VoiceCloneResponse};

use crate::domain::voice::{AudioArtifact, Speaker, SpeakerInfo};
use async_trait::async_trait;
use serde::Serialize;

/// Reachability of the voice provider, as reported by health checks
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderHealth {
    Healthy,
    Mock,
    Unhealthy(String),
}

impl ProviderHealth {
    pub fn is_available(&self) -> bool {
        !matches!(self, ProviderHealth::Unhealthy(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProviderHealth::Healthy => "available",
            ProviderHealth::Mock => "mock",
            ProviderHealth::Unhealthy(_) => "unavailable",
        }
    }
}

/// Text-to-speech provider seen by the generation services.
///
/// Implementations own speaker resolution, text preprocessing and retries; a returned
/// error means the provider gave up on this text and the caller may move on.
#[async_trait]
pub trait VoiceProvider: Send + Sync {
    async fn synthesize(&self, text: &str, speaker: Speaker) -> Result<AudioArtifact, ProviderError>;

    async fn download(&self, audio_url: &str) -> Result<Vec<u8>, ProviderError>;

    /// Speakers with a configured voice id
    fn speakers(&self) -> Vec<SpeakerInfo>;

    fn voice_id(&self, speaker: Speaker) -> Option<String>;

    fn is_mock(&self) -> bool;

    async fn health_check(&self) -> ProviderHealth;
}
