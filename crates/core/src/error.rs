use thiserror::Error;

/// Errors produced while talking to the document store or while
/// translating its responses into domain entities.
///
/// Transport failures, decode failures and semantic failures (a parsed
/// response reporting an unsuccessful outcome) are kept as distinct
/// variants so callers can map each one to its own HTTP status.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("resource not found")]
    NotFound,

    /// The insert response parsed fine but the store did not report
    /// a "created" result.
    #[error("document not created: store reported result {0:?}")]
    NotCreated(String),

    #[error("failed to decode store response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("malformed store response: {0}")]
    Malformed(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("unhandled store error: {0}")]
    Unhandled(String),
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;
