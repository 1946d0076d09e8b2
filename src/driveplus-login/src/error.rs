//! Error types for driveplus-login.

use thiserror::Error;

/// Authentication errors.
///
/// `Clone` so that one refresh outcome can be handed to every caller waiting
/// on the same in-flight refresh.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// The refresh endpoint rejected the refresh token.
    #[error("Token refresh failed with status {status}: {body}")]
    Refresh { status: u16, body: String },

    /// The code-exchange endpoint rejected the authorization code.
    #[error("Authorization code exchange failed with status {status}: {body}")]
    Exchange { status: u16, body: String },

    /// A refresh is due but no refresh token is stored.
    #[error("Access token expired and no refresh token is stored")]
    MissingRefreshToken,

    /// Transport failure or an unreadable response body.
    #[error("Token API request failed: {0}")]
    Request(String),

    /// The session store could not be read or written.
    #[error("Session storage error: {0}")]
    Storage(String),

    /// The OAuth redirect URL is unusable.
    #[error("Invalid OAuth redirect: {0}")]
    InvalidRedirect(String),

    /// The redirect carried a different `state` than the one issued.
    #[error("OAuth state mismatch")]
    StateMismatch,
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        AuthError::Request(err.to_string())
    }
}

/// Session store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error while reading or writing the session file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The session file is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        AuthError::Storage(err.to_string())
    }
}

/// Result type for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;
