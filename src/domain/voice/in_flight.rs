use super::language::Language;
use super::speaker::Speaker;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Identifier of a text-bearing record (a comment UUID or `article-<id>`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(String);

impl SubjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn article(article_id: i64) -> Self {
        Self(format!("article-{}", article_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<uuid::Uuid> for SubjectId {
    fn from(id: uuid::Uuid) -> Self {
        Self(id.to_string())
    }
}

#[derive(Debug)]
enum Claim {
    /// A batch over every speaker of the subject
    Subject,
    /// Individual (speaker, language) targets
    Targets(HashSet<(Speaker, Language)>),
}

/// Generations currently running, used only for mutual exclusion.
///
/// A subject-wide claim excludes every other claim on that subject; a target claim
/// excludes the subject-wide claim and the same target. The loser of a race is told
/// immediately instead of waiting.
#[derive(Debug, Clone, Default)]
pub struct InFlightSet {
    claims: Arc<Mutex<HashMap<SubjectId, Claim>>>,
}

impl InFlightSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the whole subject; `None` when any generation for it is already running
    pub fn try_claim_subject(&self, subject: &SubjectId) -> Option<InFlightGuard> {
        let mut claims = self.claims.lock();
        if claims.contains_key(subject) {
            return None;
        }
        claims.insert(subject.clone(), Claim::Subject);

        Some(InFlightGuard {
            claims: self.claims.clone(),
            subject: subject.clone(),
            target: None,
        })
    }

    /// Claim a single (speaker, language) target of a subject
    pub fn try_claim_target(
        &self,
        subject: &SubjectId,
        speaker: Speaker,
        language: Language,
    ) -> Option<InFlightGuard> {
        let mut claims = self.claims.lock();
        match claims
            .entry(subject.clone())
            .or_insert_with(|| Claim::Targets(HashSet::new()))
        {
            Claim::Subject => return None,
            Claim::Targets(targets) => {
                if !targets.insert((speaker, language)) {
                    return None;
                }
            }
        }

        Some(InFlightGuard {
            claims: self.claims.clone(),
            subject: subject.clone(),
            target: Some((speaker, language)),
        })
    }

    pub fn is_in_flight(&self, subject: &SubjectId) -> bool {
        self.claims.lock().contains_key(subject)
    }

    /// Number of running generations (a subject-wide batch counts once)
    pub fn len(&self) -> usize {
        self.claims
            .lock()
            .values()
            .map(|claim| match claim {
                Claim::Subject => 1,
                Claim::Targets(targets) => targets.len(),
            })
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Releases its claim when dropped, including on early returns and panics
#[derive(Debug)]
pub struct InFlightGuard {
    claims: Arc<Mutex<HashMap<SubjectId, Claim>>>,
    subject: SubjectId,
    target: Option<(Speaker, Language)>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut claims = self.claims.lock();
        match self.target {
            None => {
                claims.remove(&self.subject);
            }
            Some(target) => {
                let now_empty = match claims.get_mut(&self.subject) {
                    Some(Claim::Targets(targets)) => {
                        targets.remove(&target);
                        targets.is_empty()
                    }
                    _ => false,
                };
                if now_empty {
                    claims.remove(&self.subject);
                }
            }
        }
    }
}
