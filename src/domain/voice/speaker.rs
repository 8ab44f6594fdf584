use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Voice personas a comment can be read by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    SamAltman,
    #[serde(rename = "feifeili")]
    FeiFeiLi,
    #[serde(rename = "wuenda")]
    WuEnda,
    PaulGraham,
}

impl Speaker {
    pub const ALL: [Speaker; 4] = [
        Speaker::SamAltman,
        Speaker::FeiFeiLi,
        Speaker::WuEnda,
        Speaker::PaulGraham,
    ];

    /// Stable identifier used in URLs, cache keys and the database
    pub fn as_str(&self) -> &'static str {
        match self {
            Speaker::SamAltman => "sam_altman",
            Speaker::FeiFeiLi => "feifeili",
            Speaker::WuEnda => "wuenda",
            Speaker::PaulGraham => "paul_graham",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Speaker::SamAltman => "Sam Altman",
            Speaker::FeiFeiLi => "李飞飞",
            Speaker::WuEnda => "吴恩达",
            Speaker::PaulGraham => "Paul Graham",
        }
    }

    pub fn supported_names() -> String {
        Speaker::ALL
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for Speaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Speaker {
    type Err = String;

    /// Accepts both `paul_graham` and the URL slug form `paul-graham`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Speaker::ALL
            .into_iter()
            .find(|speaker| speaker.as_str() == normalized)
            .ok_or_else(|| {
                format!(
                    "Unsupported speaker: {}. Supported speakers: {}",
                    s,
                    Speaker::supported_names()
                )
            })
    }
}

/// Speaker to provider voice id mapping, loaded once from configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VoiceMap(HashMap<Speaker, String>);

impl VoiceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_voice(mut self, speaker: Speaker, voice_id: impl Into<String>) -> Self {
        self.insert(speaker, voice_id);
        self
    }

    /// Blank voice ids are treated as not configured
    pub fn insert(&mut self, speaker: Speaker, voice_id: impl Into<String>) {
        let voice_id = voice_id.into();
        if !voice_id.trim().is_empty() {
            self.0.insert(speaker, voice_id.trim().to_string());
        }
    }

    pub fn voice_id(&self, speaker: Speaker) -> Option<&str> {
        self.0.get(&speaker).map(String::as_str)
    }

    /// Configured speakers in their canonical order
    pub fn speakers(&self) -> Vec<Speaker> {
        Speaker::ALL
            .into_iter()
            .filter(|speaker| self.0.contains_key(speaker))
            .collect()
    }
}

/// Entry of GET /api/tts/speakers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeakerInfo {
    pub name: Speaker,
    pub voice_id: String,
    pub display_name: String,
}
