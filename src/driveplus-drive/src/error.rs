//! Error types for driveplus-drive.

use driveplus_login::AuthError;
use thiserror::Error;

/// File-provider errors.
#[derive(Debug, Error)]
pub enum DriveError {
    /// No access token is stored.
    #[error("Not logged in")]
    Unauthenticated,

    /// An access token could not be obtained.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The file API answered with a non-success status.
    #[error("{operation} failed with status {status}: {body}")]
    Status {
        operation: &'static str,
        status: u16,
        body: String,
    },

    /// Transport failure.
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The stored document is not a JSON list of links.
    #[error("Malformed metadata document: {0}")]
    MalformedDocument(#[from] serde_json::Error),
}

impl DriveError {
    /// Whether the failure is an authorization problem rather than a remote one.
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            DriveError::Unauthenticated
                | DriveError::Auth(_)
                | DriveError::Status {
                    status: 401 | 403,
                    ..
                }
        )
    }
}

/// Result type for file-provider operations.
pub type Result<T> = std::result::Result<T, DriveError>;
