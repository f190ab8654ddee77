//! Error types for mediasync.

use thiserror::Error;

/// Errors surfaced by the file store client.
#[derive(Debug, Error)]
pub enum MediaSyncError {
    /// An operation needed credentials that were never configured.
    #[error("missing credentials: {0}")]
    MissingCredentials(&'static str),

    /// The file store rejected the login exchange; carries the raw body.
    #[error("login rejected by file store: {0}")]
    LoginRejected(String),

    /// A listing call failed for a non-recoverable reason, including an
    /// authorization failure that survived one token refresh.
    #[error("listing failed with status {status}: {body}")]
    ListFailed { status: u16, body: String },

    /// A call exceeded its timeout budget.
    #[error("file store request timed out")]
    Timeout,

    /// Every download-URL strategy was exhausted for this path.
    #[error("no download url for {path}: {body}")]
    Unresolvable { path: String, body: String },

    #[error(transparent)]
    Http(reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl MediaSyncError {
    /// Classify a transport failure: deadline expiries become [`Timeout`],
    /// everything else stays a transport error.
    ///
    /// [`Timeout`]: MediaSyncError::Timeout
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            MediaSyncError::Timeout
        } else {
            MediaSyncError::Http(err)
        }
    }
}

pub type Result<T> = std::result::Result<T, MediaSyncError>;
