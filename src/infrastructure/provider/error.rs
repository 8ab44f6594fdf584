use std::error::Error as StdError;
use std::io;

/// Network failures worth retrying. Anything not listed here surfaces immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Timeout,
    ConnectionReset,
    Dns,
    Tls,
}

impl std::fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TransportErrorKind::Timeout => "timeout",
            TransportErrorKind::ConnectionReset => "connection reset",
            TransportErrorKind::Dns => "dns failure",
            TransportErrorKind::Tls => "tls failure",
        };
        f.write_str(name)
    }
}

impl TransportErrorKind {
    /// Walk an error chain looking for a retryable network failure
    pub fn classify(err: &(dyn StdError + 'static)) -> Option<TransportErrorKind> {
        let mut current: Option<&(dyn StdError + 'static)> = Some(err);

        while let Some(error) = current {
            if let Some(io_error) = error.downcast_ref::<io::Error>() {
                if let Some(kind) = Self::from_io_kind(io_error.kind()) {
                    return Some(kind);
                }
            }
            if let Some(kind) = Self::from_message(&error.to_string()) {
                return Some(kind);
            }
            current = error.source();
        }

        None
    }

    fn from_io_kind(kind: io::ErrorKind) -> Option<TransportErrorKind> {
        match kind {
            io::ErrorKind::TimedOut => Some(TransportErrorKind::Timeout),
            io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::UnexpectedEof => Some(TransportErrorKind::ConnectionReset),
            _ => None,
        }
    }

    fn from_message(message: &str) -> Option<TransportErrorKind> {
        let message = message.to_lowercase();

        if message.contains("timed out") || message.contains("timeout") {
            Some(TransportErrorKind::Timeout)
        } else if message.contains("connection reset")
            || message.contains("socket disconnected")
            || message.contains("connection closed before message completed")
        {
            Some(TransportErrorKind::ConnectionReset)
        } else if message.contains("dns error") || message.contains("failed to lookup address") {
            Some(TransportErrorKind::Dns)
        } else if message.contains("tls") || message.contains("ssl") {
            Some(TransportErrorKind::Tls)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    #[error("unsupported speaker: {0}")]
    UnknownSpeaker(String),
    #[error("text cannot be empty")]
    EmptyText,
    #[error("provider response is missing the audio url")]
    MissingAudioUrl,
    #[error("transport error ({kind}): {message}")]
    Transport {
        kind: TransportErrorKind,
        message: String,
    },
    #[error("provider call failed: {status} - {body}")]
    Rejected { status: u16, body: String },
    #[error("malformed provider response: {0}")]
    Malformed(String),
    #[error("provider request failed: {0}")]
    Request(String),
}

impl ProviderError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProviderError::Transport { .. })
    }

    pub fn transport(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        ProviderError::Transport {
            kind,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            Some(TransportErrorKind::Timeout)
        } else {
            TransportErrorKind::classify(&err)
        };

        match kind {
            Some(kind) => ProviderError::transport(kind, err.to_string()),
            None if err.is_decode() => ProviderError::Malformed(err.to_string()),
            None => ProviderError::Request(err.to_string()),
        }
    }
}
