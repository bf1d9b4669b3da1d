//! Error types for the pitchscore-core library.

use thiserror::Error;

use crate::models::Category;

/// Main error type for the pitchscore library.
#[derive(Error, Debug)]
pub enum PitchError {
    /// The document could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Remote model scoring failed.
    #[error("remote scoring error: {0}")]
    Remote(#[from] RemoteScoreError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while turning document bytes into text.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The PDF could not be parsed.
    #[error("failed to parse PDF: {0}")]
    Pdf(String),

    /// The PDF is encrypted with a non-empty password.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The zip container of a slide deck could not be opened.
    #[error("failed to open slide archive: {0}")]
    Archive(String),

    /// A part required by the slide deck format is absent.
    #[error("slide archive is missing part: {0}")]
    MissingPart(String),

    /// A slide deck XML part is malformed.
    #[error("malformed XML in {part}: {reason}")]
    Xml { part: String, reason: String },

    /// No decoder accepted the bytes.
    #[error("unsupported or corrupt document ({})", .attempts.join("; "))]
    Unrecognized { attempts: Vec<String> },
}

/// Errors from the remote model scoring path.
///
/// None of these reach the end caller: the analyzer logs them and falls back
/// to the keyword heuristic.
#[derive(Error, Debug)]
pub enum RemoteScoreError {
    /// Remote scoring was requested without an API key.
    #[error("no API key configured for remote scoring")]
    MissingCredentials,

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    /// Network failure or timeout.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-success HTTP status.
    #[error("upstream returned status={status} body={body}")]
    Upstream { status: u16, body: String },

    /// The completion body or its content was not valid JSON.
    #[error("invalid response JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The completion carried no message content.
    #[error("completion contained no message content")]
    EmptyCompletion,

    /// The model's JSON had no `scores` object.
    #[error("model reply has no scores object")]
    MissingScores,

    /// A category score could not be read as a number.
    #[error("invalid score for {category}: {value}")]
    InvalidScore { category: Category, value: String },
}

impl RemoteScoreError {
    /// Stable label used as the `cause` field when a fallback is logged.
    pub fn kind(&self) -> &'static str {
        match self {
            RemoteScoreError::MissingCredentials => "missing_credentials",
            RemoteScoreError::Client(_) => "client",
            RemoteScoreError::Request(e) if e.is_timeout() => "timeout",
            RemoteScoreError::Request(_) => "network",
            RemoteScoreError::Upstream { .. } => "http_status",
            RemoteScoreError::InvalidJson(_) => "invalid_json",
            RemoteScoreError::EmptyCompletion => "empty_completion",
            RemoteScoreError::MissingScores => "missing_scores",
            RemoteScoreError::InvalidScore { .. } => "invalid_score",
        }
    }
}

/// Result type for the pitchscore library.
pub type Result<T> = std::result::Result<T, PitchError>;
