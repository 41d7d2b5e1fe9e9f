use thiserror::Error;

/// Failure of any remote call (issue service or draft provider).
///
/// The `Display` text is what ends up on the status line.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {body}")]
    Status { status: u16, body: String },

    #[error("GraphQL errors: {}", messages.join(", "))]
    GraphQl { messages: Vec<String> },

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("empty response from API")]
    EmptyResponse,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("no API key configured")]
    MissingCredential,

    #[error("{0}")]
    Provider(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;
