use async_trait::async_trait;
use std::time::Duration;

pub const AUDIO_CONTENT_TYPE: &str = "audio/mpeg";
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage is not configured")]
    NotConfigured,
    #[error("upload rejected: {status} - {body}")]
    Rejected { status: u16, body: String },
    #[error("storage request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Object storage for finished audio files
#[async_trait]
pub trait AudioStorage: Send + Sync {
    /// Store `bytes` under `path`, replacing any existing object, and return its public url
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, StorageError>;
}

/// Supabase Storage REST client
pub struct SupabaseStorage {
    http_client: reqwest::Client,
    base_url: String,
    service_key: Option<String>,
    bucket: String,
}

impl SupabaseStorage {
    pub fn new(base_url: String, service_key: Option<String>, bucket: String) -> Result<Self, StorageError> {
        let http_client = reqwest::Client::builder().timeout(UPLOAD_TIMEOUT).build()?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key,
            bucket,
        })
    }

    pub fn object_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url,
            self.bucket,
            encode_path(path)
        )
    }

    pub fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url,
            self.bucket,
            encode_path(path)
        )
    }
}

#[async_trait]
impl AudioStorage for SupabaseStorage {
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, StorageError> {
        let service_key = self.service_key.as_deref().ok_or(StorageError::NotConfigured)?;
        let size = bytes.len();

        let response = self
            .http_client
            .post(self.object_url(path))
            .bearer_auth(service_key)
            .header("apikey", service_key)
            .header("x-upsert", "true")
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(path = %path, status = status.as_u16(), "Audio upload rejected");
            return Err(StorageError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(path = %path, bytes = size, bucket = %self.bucket, "Audio uploaded");
        Ok(self.public_url(path))
    }
}

/// Percent-encode each segment, keeping the separators
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
