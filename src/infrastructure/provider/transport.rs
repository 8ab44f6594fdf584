use super::error::ProviderError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const USER_AGENT: &str = concat!("judge-voice-backend/", env!("CARGO_PKG_VERSION"));
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Body of a voice-cloning synthesis call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceCloneRequest {
    pub voice_id: String,
    pub text: String,
    pub model: String,
    pub need_noise_reduction: bool,
    pub need_volume_normalization: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VoiceCloneResponse {
    #[serde(default)]
    pub voice_id: Option<String>,
    #[serde(default)]
    pub demo_audio_url: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Raw wire access to the voice provider.
///
/// Implementations perform exactly one attempt per call; retry policy lives in the client.
#[async_trait]
pub trait SpeechTransport: Send + Sync {
    async fn send(&self, request: &VoiceCloneRequest) -> Result<VoiceCloneResponse, ProviderError>;

    /// Fetch the bytes behind an audio url returned by `send`
    async fn download(&self, audio_url: &str) -> Result<Vec<u8>, ProviderError>;

    /// Cheap reachability check of the provider endpoint
    async fn probe(&self) -> Result<(), ProviderError>;
}

/// HTTPS transport for the PPIO voice-cloning endpoint
pub struct HttpSpeechTransport {
    http_client: reqwest::Client,
    api_url: String,
    api_token: String,
}

impl HttpSpeechTransport {
    pub fn new(api_url: String, api_token: String, timeout: Duration) -> Result<Self, ProviderError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http_client,
            api_url,
            api_token,
        })
    }
}

#[async_trait]
impl SpeechTransport for HttpSpeechTransport {
    async fn send(&self, request: &VoiceCloneRequest) -> Result<VoiceCloneResponse, ProviderError> {
        let response = self
            .http_client
            .post(&self.api_url)
            .bearer_auth(&self.api_token)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(ProviderError::Rejected {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        serde_json::from_slice::<VoiceCloneResponse>(&body)
            .map_err(|e| ProviderError::Malformed(e.to_string()))
    }

    async fn download(&self, audio_url: &str) -> Result<Vec<u8>, ProviderError> {
        let response = self.http_client.get(audio_url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.bytes().await?.to_vec())
    }

    async fn probe(&self) -> Result<(), ProviderError> {
        // Any HTTP answer counts as reachable
        self.http_client
            .request(reqwest::Method::OPTIONS, &self.api_url)
            .bearer_auth(&self.api_token)
            .timeout(PROBE_TIMEOUT)
            .send()
            .await?;
        Ok(())
    }
}
