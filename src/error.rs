//! Error types for tubechat.

use serde::Serialize;
use thiserror::Error;

/// Why a transcript could not be obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptIssue {
    /// The video has captions turned off entirely.
    Disabled,
    /// Captions exist, but none in an accepted language (or the video is gone).
    NotFound,
}

impl std::fmt::Display for TranscriptIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranscriptIssue::Disabled => write!(f, "transcripts are disabled"),
            TranscriptIssue::NotFound => write!(f, "no transcript found"),
        }
    }
}

/// Library-level error type for tubechat operations.
#[derive(Error, Debug)]
pub enum TubechatError {
    #[error("Invalid video reference: {0}")]
    InvalidReference(String),

    #[error("Transcript unavailable for {video_id}: {issue}")]
    TranscriptUnavailable {
        video_id: String,
        issue: TranscriptIssue,
    },

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Dimension mismatch at position {position}: expected {expected}, found {found}")]
    DimensionMismatch {
        expected: usize,
        found: usize,
        position: usize,
    },

    #[error("No session for video: {0}")]
    SessionNotFound(String),

    #[error("Retrieval failed: {0}")]
    RetrievalFailed(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Machine-distinguishable error kind, independent of message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidReference,
    TranscriptUnavailable,
    Provider,
    DimensionMismatch,
    SessionNotFound,
    RetrievalFailed,
    InvalidInput,
    Internal,
}

impl ErrorKind {
    /// HTTP status code used when this kind reaches the request boundary.
    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::InvalidReference | ErrorKind::InvalidInput => 400,
            ErrorKind::SessionNotFound => 404,
            ErrorKind::TranscriptUnavailable => 422,
            ErrorKind::Provider | ErrorKind::RetrievalFailed => 502,
            ErrorKind::DimensionMismatch | ErrorKind::Internal => 500,
        }
    }

    /// Whether the failure is transient and worth retrying.
    pub fn is_transient(self) -> bool {
        matches!(self, ErrorKind::Provider | ErrorKind::RetrievalFailed)
    }
}

impl TubechatError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TubechatError::InvalidReference(_) => ErrorKind::InvalidReference,
            TubechatError::TranscriptUnavailable { .. } => ErrorKind::TranscriptUnavailable,
            TubechatError::Provider(_) | TubechatError::Http(_) | TubechatError::ToolNotFound(_) => {
                ErrorKind::Provider
            }
            TubechatError::DimensionMismatch { .. } => ErrorKind::DimensionMismatch,
            TubechatError::SessionNotFound(_) => ErrorKind::SessionNotFound,
            TubechatError::RetrievalFailed(_) => ErrorKind::RetrievalFailed,
            TubechatError::InvalidInput(_) => ErrorKind::InvalidInput,
            TubechatError::Config(_)
            | TubechatError::Io(_)
            | TubechatError::Json(_)
            | TubechatError::TomlParse(_) => ErrorKind::Internal,
        }
    }
}

/// Result type alias for tubechat operations.
pub type Result<T> = std::result::Result<T, TubechatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_do_not_depend_on_message() {
        let a = TubechatError::Provider("timeout".to_string());
        let b = TubechatError::Provider("rate limited".to_string());
        assert_eq!(a.kind(), b.kind());
        assert!(a.kind().is_transient());

        let missing = TubechatError::SessionNotFound("abc".to_string());
        assert_eq!(missing.kind(), ErrorKind::SessionNotFound);
        assert_eq!(missing.kind().status_code(), 404);
    }

    #[test]
    fn test_transcript_unavailable_message() {
        let err = TubechatError::TranscriptUnavailable {
            video_id: "dQw4w9WgXcQ".to_string(),
            issue: TranscriptIssue::Disabled,
        };
        assert_eq!(err.kind(), ErrorKind::TranscriptUnavailable);
        assert!(err.to_string().contains("disabled"));
        assert!(!err.kind().is_transient());
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::DimensionMismatch).unwrap();
        assert_eq!(json, "\"dimension_mismatch\"");
    }
}
