pub mod model;
pub mod service;

pub use model::{Article, ArticleGeneration, GenerationRecord, GenerationStatus};
pub use service::{ArticleVoiceService, ArticleVoiceServiceApi};
