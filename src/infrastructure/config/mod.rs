use crate::domain::voice::{Pacing, Speaker, VoiceMap};
use crate::infrastructure::provider::ProviderSettings;
use crate::infrastructure::provider::ppio_client::{DEFAULT_MOCK_AUDIO_URL, DEFAULT_MODEL, MAX_TEXT_LENGTH};
use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_PPIO_API_URL: &str = "https://api.ppinfra.com/v3/minimax-voice-cloning";
pub const DEFAULT_STORAGE_BUCKET: &str = "voice-articles";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub log_format: LogFormat,
    /// `None` or `*` allows any origin
    pub allowed_origin: Option<String>,
    // Voice provider
    pub ppio_api_url: String,
    pub ppio_api_token: Option<String>,
    pub mock_mode: bool,
    pub mock_audio_url: String,
    pub mock_delay_ms: u64,
    pub provider_timeout_secs: u64,
    pub provider_max_retries: u32,
    pub provider_backoff_ms: u64,
    pub voices: VoiceMap,
    // Pacing
    pub speaker_pacing_ms: u64,
    pub chunk_pacing_ms: u64,
    pub warmup_pacing_ms: u64,
    // Object storage
    pub supabase_url: String,
    pub supabase_service_role_key: Option<String>,
    pub storage_bucket: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let mut voices = VoiceMap::new();
        for (var, speaker) in [
            ("VOICE_SAM_ALTMAN", Speaker::SamAltman),
            ("VOICE_FEIFEILI", Speaker::FeiFeiLi),
            ("VOICE_WUENDA", Speaker::WuEnda),
            ("VOICE_PAUL_GRAHAM", Speaker::PaulGraham),
        ] {
            if let Ok(voice_id) = env::var(var) {
                voices.insert(speaker, voice_id);
            }
        }

        let environment = match env::var("ENVIRONMENT").as_deref() {
            Ok("production") => Environment::Production,
            _ => Environment::Development,
        };
        // Production logs default to json
        let default_log_format = match environment {
            Environment::Production => "json",
            Environment::Development => "pretty",
        };

        let config = Config {
            database_url: env::var("DATABASE_URL")?,
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", 10)?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_or("PORT", 8080)?,
            environment,
            log_format: match env::var("LOG_FORMAT").as_deref().unwrap_or(default_log_format) {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
            allowed_origin: non_empty("ALLOWED_ORIGIN"),
            ppio_api_url: env::var("PPIO_API_URL").unwrap_or_else(|_| DEFAULT_PPIO_API_URL.to_string()),
            ppio_api_token: non_empty("PPIO_API_TOKEN"),
            mock_mode: flag("ENABLE_MOCK_MODE"),
            mock_audio_url: env::var("MOCK_AUDIO_URL").unwrap_or_else(|_| DEFAULT_MOCK_AUDIO_URL.to_string()),
            mock_delay_ms: parse_or("MOCK_DELAY_MS", 1000)?,
            provider_timeout_secs: parse_or("PROVIDER_TIMEOUT_SECS", 90)?,
            provider_max_retries: parse_or("PROVIDER_MAX_RETRIES", 3)?,
            provider_backoff_ms: parse_or("PROVIDER_BACKOFF_MS", 2000)?,
            voices,
            speaker_pacing_ms: parse_or("SPEAKER_PACING_MS", 2000)?,
            chunk_pacing_ms: parse_or("CHUNK_PACING_MS", 2000)?,
            warmup_pacing_ms: parse_or("WARMUP_PACING_MS", 5000)?,
            supabase_url: env::var("SUPABASE_URL").unwrap_or_default(),
            supabase_service_role_key: non_empty("SUPABASE_SERVICE_ROLE_KEY"),
            storage_bucket: env::var("STORAGE_BUCKET").unwrap_or_else(|_| DEFAULT_STORAGE_BUCKET.to_string()),
        };

        Ok(config)
    }

    /// Mock mode is forced when no provider token is configured
    pub fn is_mock_mode(&self) -> bool {
        self.mock_mode || self.ppio_api_token.is_none()
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }

    pub fn provider_settings(&self) -> ProviderSettings {
        ProviderSettings {
            model: DEFAULT_MODEL.to_string(),
            max_text_length: MAX_TEXT_LENGTH,
            max_retries: self.provider_max_retries,
            backoff_unit: Duration::from_millis(self.provider_backoff_ms),
            mock_mode: self.is_mock_mode(),
            mock_audio_url: self.mock_audio_url.clone(),
            mock_delay: Duration::from_millis(self.mock_delay_ms),
        }
    }

    pub fn pacing(&self) -> Pacing {
        Pacing {
            between_speakers: Duration::from_millis(self.speaker_pacing_ms),
            between_chunks: Duration::from_millis(self.chunk_pacing_ms),
            between_subjects: Duration::from_millis(self.warmup_pacing_ms),
        }
    }
}

fn non_empty(var: &str) -> Option<String> {
    env::var(var).ok().filter(|value| !value.trim().is_empty())
}

fn flag(var: &str) -> bool {
    env::var(var)
        .map(|value| value.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn parse_or<T>(var: &str, default: T) -> Result<T, Box<dyn std::error::Error>>
where
    T: FromStr,
    T::Err: std::error::Error + 'static,
{
    match env::var(var) {
        Ok(value) => Ok(value.trim().parse::<T>()?),
        Err(_) => Ok(default),
    }
}
