//! Error types for the API client.

/// Errors that can occur when talking to the VPBX API or decoding its payloads.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The HTTP request itself failed (connection, TLS, timeout).
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The response body was not the JSON or CSV shape we expect.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
    /// A statistics row could not be decoded.
    #[error("Malformed record on line {line}: {reason}")]
    MalformedRecord { line: u64, reason: String },
    /// Statistics key is invalid, unknown or expired (HTTP 404).
    #[error("Data not found, invalid or expired key")]
    NotFound,
    /// Statistics export is still running (HTTP 204); retry after a delay.
    #[error("Data not ready, retry after {} seconds", crate::STATS_RETRY_DELAY.as_secs())]
    NotReady,
    /// The API returned a status this client has no mapping for.
    #[error("Unknown provider error, status {status}: {body}")]
    Provider { status: u16, body: String },
    /// User lookup returned no users.
    #[error("User {0} not found")]
    UserNotFound(String),
    /// The key request succeeded but the key was empty.
    #[error("Provider returned an empty statistics key")]
    EmptyKey,
    /// The configured base URL does not form a valid endpoint URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// A request payload could not be encoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Whether repeating the identical call later can succeed.
    ///
    /// Only [`Error::NotReady`] qualifies; everything else needs a new key,
    /// new credentials or a fix on the caller side.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NotReady)
    }
}
