pub mod cache;
pub mod chunker;
pub mod error;
pub mod in_flight;
pub mod language;
pub mod model;
pub mod service;
pub mod speaker;
pub mod warmup;

pub use cache::{AudioCache, AudioKey, CacheStats};
pub use chunker::{chunk_text, DEFAULT_CHUNK_LENGTH};
pub use error::VoiceServiceError;
pub use in_flight::{InFlightGuard, InFlightSet, SubjectId};
pub use language::Language;
pub use model::{
    preview_with_limit, text_preview, AudioArtifact, BatchResult, BatchStatistics,
    CachedAudioSummary, CommentAudio, FailedSpeaker, WarmupOutcome,
};
pub use service::{Pacing, VoiceService, VoiceServiceApi};
pub use speaker::{Speaker, SpeakerInfo, VoiceMap};
pub use warmup::{WarmupService, WarmupServiceApi, DEFAULT_WARMUP_LIMIT, MAX_WARMUP_LIMIT};
