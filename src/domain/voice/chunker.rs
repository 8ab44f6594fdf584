use once_cell::sync::Lazy;
use regex::Regex;

/// Upper bound for a single provider call, in characters
pub const DEFAULT_CHUNK_LENGTH: usize = 500;

/// Smallest limit that fits one character plus the trailing `.`
pub const MIN_CHUNK_LENGTH: usize = 2;

/// ASCII and full-width sentence terminators
static SENTENCE_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?。！？]").expect("sentence boundary pattern is valid"));

/// Split text into ordered, sentence-respecting chunks of at most `max_length` characters.
///
/// Sentences are accumulated greedily; every chunk ends with a `.` so the provider sees a
/// normalized sentence boundary. Text without any sentence content falls back to a single
/// chunk holding its first `max_length` characters. Lengths are counted in chars, not bytes.
/// Limits below [`MIN_CHUNK_LENGTH`] cannot hold any chunk and yield nothing.
pub fn chunk_text(text: &str, max_length: usize) -> Vec<String> {
    if max_length < MIN_CHUNK_LENGTH {
        return Vec::new();
    }

    let sentences: Vec<String> = SENTENCE_BOUNDARY
        .split(text)
        .map(normalize_whitespace)
        .filter(|sentence| !sentence.is_empty())
        .collect();

    if sentences.is_empty() {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }
        return vec![trimmed.chars().take(max_length).collect()];
    }

    // Room for the sentence itself once the trailing '.' is accounted for
    let piece_limit = max_length - 1;

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for sentence in sentences {
        for piece in split_oversized(&sentence, piece_limit) {
            let piece_len = piece.chars().count();
            let separator = usize::from(!current.is_empty());

            if !current.is_empty() && current_len + separator + piece_len >= max_length {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }

            if !current.is_empty() {
                current.push(' ');
                current_len += 1;
            }
            current.push_str(&piece);
            current.push('.');
            current_len += piece_len + 1;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

fn normalize_whitespace(sentence: &str) -> String {
    sentence.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Break a sentence that cannot fit in one chunk at word boundaries, hard-splitting
/// words that are longer than the limit on their own.
fn split_oversized(sentence: &str, limit: usize) -> Vec<String> {
    if sentence.chars().count() <= limit {
        return vec![sentence.to_string()];
    }

    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in sentence.split(' ') {
        let word_len = word.chars().count();

        if word_len > limit {
            if !current.is_empty() {
                pieces.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            for part in chars.chunks(limit) {
                pieces.push(part.iter().collect());
            }
            continue;
        }

        let separator = usize::from(!current.is_empty());
        if current_len + separator + word_len > limit {
            pieces.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() {
        pieces.push(current);
    }

    pieces
}
