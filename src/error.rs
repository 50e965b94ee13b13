use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArcadeError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Unexpected status {status} for {url}")]
    UnexpectedStatus {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("Format error: {0}")]
    Format(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("{candidates} tables match ROM {rom}")]
    AmbiguousTable { rom: String, candidates: usize },
}

/// Coarse classification used by callers that only care about the policy
/// (retry, skip, abort) and not the concrete cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Format,
    NotFound,
    Storage,
}

impl ArcadeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ArcadeError::Network(_) | ArcadeError::UnexpectedStatus { .. } => ErrorKind::Network,
            ArcadeError::Serialization(_)
            | ArcadeError::Archive(_)
            | ArcadeError::Format(_)
            | ArcadeError::AmbiguousTable { .. } => ErrorKind::Format,
            ArcadeError::NotFound(_) => ErrorKind::NotFound,
            ArcadeError::Io(_) => ErrorKind::Storage,
        }
    }
}

pub type Result<T> = std::result::Result<T, ArcadeError>;
