use super::in_flight::{InFlightSet, SubjectId};
use super::language::Language;
use super::model::CommentAudio;
use super::speaker::Speaker;
use moka::future::Cache;
use serde::{Deserialize, Serialize};

/// Cache key for one synthesized (subject, speaker, language)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AudioKey {
    pub subject: SubjectId,
    pub speaker: Speaker,
    pub language: Language,
}

impl AudioKey {
    pub fn new(subject: SubjectId, speaker: Speaker, language: Language) -> Self {
        Self {
            subject,
            speaker,
            language,
        }
    }
}

impl std::fmt::Display for AudioKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}_{}", self.subject, self.speaker, self.language)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub total_cached: usize,
    pub active_generations: usize,
    pub cache_keys: Vec<String>,
}

/// Process-lifetime audio cache plus the in-flight set guarding generation.
///
/// Entries never expire on their own; only `invalidate` and `clear` remove them.
/// Nothing here survives a restart.
#[derive(Clone)]
pub struct AudioCache {
    entries: Cache<AudioKey, CommentAudio>,
    in_flight: InFlightSet,
}

impl Default for AudioCache {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioCache {
    pub fn new() -> Self {
        Self {
            entries: Cache::builder().build(),
            in_flight: InFlightSet::new(),
        }
    }

    pub fn in_flight(&self) -> &InFlightSet {
        &self.in_flight
    }

    pub async fn get(&self, key: &AudioKey) -> Option<CommentAudio> {
        self.entries.get(key).await
    }

    pub fn has(&self, key: &AudioKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Last write wins; artifacts are immutable so overlapping writes are harmless
    pub async fn put(&self, key: AudioKey, audio: CommentAudio) {
        self.entries.insert(key, audio).await;
    }

    /// Remove every speaker × language entry of a subject, returning how many existed
    pub async fn invalidate(&self, subject: &SubjectId) -> usize {
        let mut removed = 0;
        for speaker in Speaker::ALL {
            for language in Language::ALL {
                let key = AudioKey::new(subject.clone(), speaker, language);
                if self.entries.remove(&key).await.is_some() {
                    removed += 1;
                }
            }
        }

        tracing::info!(subject = %subject, removed, "Comment audio cache invalidated");
        removed
    }

    /// Drop every cached entry, returning how many there were
    pub async fn clear(&self) -> usize {
        let keys: Vec<AudioKey> = self
            .entries
            .iter()
            .map(|(key, _)| key.as_ref().clone())
            .collect();

        let mut removed = 0;
        for key in keys {
            if self.entries.remove(&key).await.is_some() {
                removed += 1;
            }
        }

        tracing::info!(removed, "Audio cache cleared");
        removed
    }

    pub fn stats(&self) -> CacheStats {
        let mut cache_keys: Vec<String> = self
            .entries
            .iter()
            .map(|(key, _)| key.to_string())
            .collect();
        cache_keys.sort();

        CacheStats {
            total_cached: cache_keys.len(),
            active_generations: self.in_flight.len(),
            cache_keys,
        }
    }
}
