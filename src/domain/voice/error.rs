use crate::error::AppError;
use crate::infrastructure::provider::ProviderError;

#[derive(Debug, thiserror::Error)]
pub enum VoiceServiceError {
    #[error("unsupported speaker: {0}")]
    UnknownSpeaker(String),
    #[error("text cannot be empty")]
    EmptyText,
    #[error("provider response is missing the audio url")]
    MissingAudioUrl,
    #[error("voice provider unreachable: {0}")]
    ProviderTransport(String),
    #[error("voice provider rejected the request: {0}")]
    ProviderRejected(String),
    #[error("voice generation already in progress for {0}, try again later")]
    AlreadyInProgress(String),
    #[error("{speaker} has no {language} text")]
    NoContent { speaker: String, language: String },
    #[error("{0} not found")]
    NotFound(String),
    #[error("audio upload failed: {0}")]
    StorageUploadFailed(String),
    #[error("voice generation failed: {0}")]
    GenerationFailed(String),
    #[error("dependency error: {0}")]
    Dependency(String),
}

impl From<ProviderError> for VoiceServiceError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::UnknownSpeaker(speaker) => VoiceServiceError::UnknownSpeaker(speaker),
            ProviderError::EmptyText => VoiceServiceError::EmptyText,
            ProviderError::MissingAudioUrl => VoiceServiceError::MissingAudioUrl,
            ProviderError::Transport { .. } => VoiceServiceError::ProviderTransport(err.to_string()),
            ProviderError::Rejected { .. }
            | ProviderError::Malformed(_)
            | ProviderError::Request(_) => VoiceServiceError::ProviderRejected(err.to_string()),
        }
    }
}

impl From<VoiceServiceError> for AppError {
    fn from(err: VoiceServiceError) -> Self {
        match err {
            VoiceServiceError::UnknownSpeaker(_) | VoiceServiceError::EmptyText => {
                AppError::BadRequest(err.to_string())
            }
            VoiceServiceError::NotFound(what) => AppError::NotFound(what),
            VoiceServiceError::NoContent { .. } => AppError::NotFound(err.to_string()),
            VoiceServiceError::AlreadyInProgress(_) => AppError::Conflict(err.to_string()),
            VoiceServiceError::MissingAudioUrl
            | VoiceServiceError::ProviderTransport(_)
            | VoiceServiceError::ProviderRejected(_)
            | VoiceServiceError::StorageUploadFailed(_) => AppError::ExternalService(err.to_string()),
            VoiceServiceError::GenerationFailed(msg) | VoiceServiceError::Dependency(msg) => {
                AppError::Internal(msg)
            }
        }
    }
}
